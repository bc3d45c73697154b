//! Error types and conversions for the section generator.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use core::fmt;

use gensec_pi::HeaderError;
use r_efi::efi;

/// Error definitions for section generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionError {
    /// An option or input combination is invalid for the requested section.
    InvalidArgument,
    /// The section requires at least one input and none were given.
    InputMissing,
    /// An input blob does not exist.
    NotFound,
    /// Reading an input or writing the output failed.
    IoError,
    /// A buffer could not be allocated.
    OutOfResources,
    /// The section would be this many bytes, which does not fit the 24-bit section size.
    SizeLimitExceeded(usize),
    /// The compression type or GUID-defined attribute is not supported.
    UnsupportedSubtype,
    /// The destination buffer is smaller than the reported number of bytes.
    BufferTooSmall(usize),
}

impl fmt::Display for SectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionError::InvalidArgument => write!(f, "invalid parameter"),
            SectionError::InputMissing => write!(f, "missing input files"),
            SectionError::NotFound => write!(f, "input file not found"),
            SectionError::IoError => write!(f, "file read or write failed"),
            SectionError::OutOfResources => write!(f, "memory cannot be allocated"),
            SectionError::SizeLimitExceeded(size) => {
                write!(f, "section size {size:#x} exceeds the maximum section size of 0xFFFFFF bytes")
            }
            SectionError::UnsupportedSubtype => write!(f, "unsupported section subtype"),
            SectionError::BufferTooSmall(required) => write!(f, "buffer too small, {required} bytes required"),
        }
    }
}

impl core::error::Error for SectionError {}

/// Header codec failures are caller errors.
///
/// The encoders reject oversized sections with [`SectionError::SizeLimitExceeded`] before a header is built, so an
/// out of range 24-bit size only reaches this conversion from direct codec use.
impl From<HeaderError> for SectionError {
    fn from(value: HeaderError) -> Self {
        match value {
            HeaderError::InvalidCompressionType(_) => SectionError::UnsupportedSubtype,
            HeaderError::SizeOutOfRange(_)
            | HeaderError::InvalidSectionType(_)
            | HeaderError::Truncated
            | HeaderError::InvalidHeader
            | HeaderError::InvalidGuid => SectionError::InvalidArgument,
        }
    }
}

#[cfg(feature = "uefi_compress")]
impl From<uefi_compress::CompressError> for SectionError {
    fn from(value: uefi_compress::CompressError) -> Self {
        match value {
            uefi_compress::CompressError::BufferTooSmall { required } => SectionError::BufferTooSmall(required),
            uefi_compress::CompressError::InputTooLarge(size) => SectionError::SizeLimitExceeded(size),
        }
    }
}

impl From<SectionError> for efi::Status {
    fn from(value: SectionError) -> Self {
        match value {
            SectionError::InvalidArgument | SectionError::InputMissing => efi::Status::INVALID_PARAMETER,
            SectionError::NotFound => efi::Status::NOT_FOUND,
            SectionError::IoError => efi::Status::DEVICE_ERROR,
            SectionError::OutOfResources => efi::Status::OUT_OF_RESOURCES,
            SectionError::SizeLimitExceeded(_) => efi::Status::BAD_BUFFER_SIZE,
            SectionError::UnsupportedSubtype => efi::Status::UNSUPPORTED,
            SectionError::BufferTooSmall(_) => efi::Status::BUFFER_TOO_SMALL,
        }
    }
}
