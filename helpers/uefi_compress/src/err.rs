//! Error types for compression.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use core::fmt;

/// Errors reported by [`compress`](crate::compress) and [`compress_into`](crate::compress_into).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressError {
    /// The destination cannot hold the compressed image; `required` bytes are needed.
    BufferTooSmall {
        /// Size of the complete compressed image.
        required: usize,
    },
    /// The input is too large for the 32-bit size fields of the image header.
    InputTooLarge(usize),
}

impl fmt::Display for CompressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressError::BufferTooSmall { required } => {
                write!(f, "destination buffer too small, {required} bytes required")
            }
            CompressError::InputTooLarge(size) => write!(f, "input of {size} bytes is too large to compress"),
        }
    }
}

impl core::error::Error for CompressError {}
