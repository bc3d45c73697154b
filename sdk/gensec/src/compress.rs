//! Compression algorithm seam used by compression sections.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
#[cfg(any(test, feature = "mockall"))]
use mockall::automock;

use crate::SectionError;

/// A compression algorithm with a measure-then-fill interface.
///
/// Calling [`compress`](Compress::compress) with a destination that is too small (for example an empty one)
/// returns `Err(SectionError::BufferTooSmall(required))` where `required` is the size of the complete output.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait Compress {
    /// Compress `source` into `destination` and return the number of bytes written.
    fn compress(&self, source: &[u8], destination: &mut [u8]) -> Result<usize, SectionError>;
}

/// The UEFI standard (EFI 1.1) compression algorithm, used for `PI_STD` compression sections.
#[cfg(feature = "uefi_compress")]
#[derive(Debug, Default, Clone, Copy)]
pub struct UefiCompress;

#[cfg(feature = "uefi_compress")]
impl Compress for UefiCompress {
    fn compress(&self, source: &[u8], destination: &mut [u8]) -> Result<usize, SectionError> {
        Ok(uefi_compress::compress_into(source, destination)?)
    }
}
