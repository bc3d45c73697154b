//! Error types for the section definitions and header codec.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use core::fmt;

use r_efi::efi;

/// Errors produced while building or parsing section headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderError {
    /// A size does not fit in the 24-bit size field of the common section header.
    SizeOutOfRange(u32),
    /// The section type is reserved or unknown.
    InvalidSectionType(u8),
    /// The compression type is neither `NOT_COMPRESSED` nor `STANDARD_COMPRESSION`.
    InvalidCompressionType(u8),
    /// The buffer is too short for the header or for the size recorded in it.
    Truncated,
    /// A header field is inconsistent with the rest of the header.
    InvalidHeader,
    /// A GUID string is malformed.
    InvalidGuid,
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderError::SizeOutOfRange(size) => write!(f, "size {size:#x} does not fit in a 24-bit section size"),
            HeaderError::InvalidSectionType(value) => write!(f, "invalid section type {value:#04x}"),
            HeaderError::InvalidCompressionType(value) => write!(f, "invalid compression type {value:#04x}"),
            HeaderError::Truncated => write!(f, "section buffer is truncated"),
            HeaderError::InvalidHeader => write!(f, "section header is malformed"),
            HeaderError::InvalidGuid => write!(f, "GUID must be formatted as 00000000-0000-0000-0000-000000000000"),
        }
    }
}

impl core::error::Error for HeaderError {}

impl From<scroll::Error> for HeaderError {
    fn from(value: scroll::Error) -> Self {
        match value {
            scroll::Error::TooBig { .. } | scroll::Error::BadOffset(_) => HeaderError::Truncated,
            _ => HeaderError::InvalidHeader,
        }
    }
}

impl From<HeaderError> for efi::Status {
    fn from(value: HeaderError) -> Self {
        match value {
            HeaderError::SizeOutOfRange(_) => efi::Status::BAD_BUFFER_SIZE,
            HeaderError::InvalidSectionType(_) | HeaderError::InvalidGuid => efi::Status::INVALID_PARAMETER,
            HeaderError::InvalidCompressionType(_) => efi::Status::UNSUPPORTED,
            HeaderError::Truncated | HeaderError::InvalidHeader => efi::Status::VOLUME_CORRUPTED,
        }
    }
}
