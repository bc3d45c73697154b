//! Output sinks for generated sections.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use alloc::vec::Vec;

use crate::SectionError;

/// Ordered, append-only destination for section bytes. Opening and closing the destination is up to the caller.
pub trait SectionSink {
    /// Append `bytes` to the output.
    fn write(&mut self, bytes: &[u8]) -> Result<(), SectionError>;
}

impl SectionSink for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), SectionError> {
        self.try_reserve(bytes.len()).map_err(|_| SectionError::OutOfResources)?;
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// Adapts any [`std::io::Write`] into a [`SectionSink`].
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct WriteSink<W: std::io::Write> {
    writer: W,
    written: usize,
}

#[cfg(feature = "std")]
impl<W: std::io::Write> WriteSink<W> {
    /// Wraps `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of bytes written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes the writer and returns it.
    pub fn into_inner(mut self) -> Result<W, SectionError> {
        self.writer.flush().map_err(|err| {
            log::error!("Error writing file: {err}");
            SectionError::IoError
        })?;
        Ok(self.writer)
    }
}

#[cfg(feature = "std")]
impl<W: std::io::Write> SectionSink for WriteSink<W> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), SectionError> {
        self.writer.write_all(bytes).map_err(|err| {
            log::error!("Error writing file: {err}");
            SectionError::IoError
        })?;
        self.written += bytes.len();
        Ok(())
    }
}
