//! Input blob sources.
//!
//! Sections are built from named blobs. A [`BlobSource`] reports the size of a blob and copies its content into
//! a caller-provided buffer, which lets the aggregator measure all inputs before reading any of them.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use alloc::{collections::BTreeMap, string::String, vec::Vec};

#[cfg(any(test, feature = "mockall"))]
use mockall::automock;

use crate::SectionError;

/// Provides the content of named input blobs.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait BlobSource {
    /// Size of the blob `name` in bytes.
    ///
    /// # Returns
    /// - `Err(SectionError::NotFound)` if the blob does not exist
    /// - `Err(SectionError::IoError)` if the size cannot be determined
    fn blob_size(&self, name: &str) -> Result<usize, SectionError>;

    /// Copy the content of blob `name` into `destination`, which is exactly [`blob_size`](Self::blob_size) bytes.
    fn read_blob(&self, name: &str, destination: &mut [u8]) -> Result<(), SectionError>;
}

/// Blob source backed by in-memory buffers.
#[derive(Debug, Default, Clone)]
pub struct MemoryBlobSource {
    blobs: BTreeMap<String, Vec<u8>>,
}

impl MemoryBlobSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the blob `name`.
    pub fn with_blob(mut self, name: &str, data: &[u8]) -> Self {
        self.insert(name, data);
        self
    }

    /// Adds (or replaces) the blob `name`.
    pub fn insert(&mut self, name: &str, data: &[u8]) {
        self.blobs.insert(String::from(name), data.to_vec());
    }
}

impl BlobSource for MemoryBlobSource {
    fn blob_size(&self, name: &str) -> Result<usize, SectionError> {
        self.blobs.get(name).map(Vec::len).ok_or_else(|| {
            log::error!("Error opening file {name}");
            SectionError::NotFound
        })
    }

    fn read_blob(&self, name: &str, destination: &mut [u8]) -> Result<(), SectionError> {
        let blob = self.blobs.get(name).ok_or(SectionError::NotFound)?;
        if blob.len() != destination.len() {
            Err(SectionError::InvalidArgument)?;
        }
        destination.copy_from_slice(blob);
        Ok(())
    }
}

#[cfg(feature = "std")]
pub use file::FileBlobSource;

#[cfg(feature = "std")]
mod file {
    use std::{
        fs::{self, File},
        io::{self, Read},
    };

    use super::BlobSource;
    use crate::SectionError;

    /// Blob source reading files; blob names are file paths.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct FileBlobSource;

    fn map_io_error(name: &str, error: io::Error) -> SectionError {
        log::error!("Error opening file {name}: {error}");
        match error.kind() {
            io::ErrorKind::NotFound => SectionError::NotFound,
            _ => SectionError::IoError,
        }
    }

    impl BlobSource for FileBlobSource {
        fn blob_size(&self, name: &str) -> Result<usize, SectionError> {
            let metadata = fs::metadata(name).map_err(|err| map_io_error(name, err))?;
            if !metadata.is_file() {
                log::error!("Error opening file {name}: not a regular file");
                Err(SectionError::IoError)?;
            }
            usize::try_from(metadata.len()).map_err(|_| SectionError::OutOfResources)
        }

        fn read_blob(&self, name: &str, destination: &mut [u8]) -> Result<(), SectionError> {
            let mut file = File::open(name).map_err(|err| map_io_error(name, err))?;
            file.read_exact(destination).map_err(|err| {
                log::error!("Error reading file {name}: {err}");
                SectionError::IoError
            })
        }
    }

}
