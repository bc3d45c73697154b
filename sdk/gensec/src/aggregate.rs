//! Content aggregation for sections built from several input blobs.
//!
//! Inputs are concatenated in order. Each input after the first starts on a 4-byte boundary, with zero bytes
//! inserted in front of it as needed; no padding follows the last input.
//!
//! Aggregation follows a measure-then-fill protocol: [`get_section_contents`] with a buffer that is too small
//! (typically empty) reports the required length as [`SectionError::BufferTooSmall`], and a second call with a
//! buffer of that length fills it.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use alloc::vec::Vec;

use crate::{sink::SectionSink, source::BlobSource, SectionError};

/// Required alignment of every input after the first.
pub const INPUT_ALIGNMENT: usize = 4;

/// Aggregates `inputs` into `buffer`.
///
/// Returns the aggregated length on success. If `buffer` is too small, returns
/// `Err(SectionError::BufferTooSmall(required))`; in that case the inputs that happened to fit may have been
/// copied, but the buffer content is otherwise unspecified. Empty inputs are never read.
pub fn get_section_contents(
    source: &dyn BlobSource,
    inputs: &[&str],
    buffer: &mut [u8],
) -> Result<usize, SectionError> {
    if inputs.is_empty() {
        log::error!("Invalid parameter: no input files");
        Err(SectionError::InputMissing)?;
    }

    let mut size = 0usize;
    for (index, name) in inputs.iter().enumerate() {
        let blob_size = source.blob_size(name)?;
        log::debug!("the input file name is {name}");
        log::debug!("the size of input file is {blob_size} bytes");

        if index > 0 {
            for _ in 0..padding_for(size) {
                if let Some(pad) = buffer.get_mut(size) {
                    *pad = 0;
                }
                size += 1;
            }
        }

        let end = size.checked_add(blob_size).ok_or(SectionError::OutOfResources)?;
        if blob_size > 0 && end <= buffer.len() {
            source.read_blob(name, &mut buffer[size..end])?;
        }
        size = end;
    }

    if size > buffer.len() {
        return Err(SectionError::BufferTooSmall(size));
    }
    Ok(size)
}

/// Aggregates `inputs` into a newly allocated buffer.
pub fn read_section_contents(source: &dyn BlobSource, inputs: &[&str]) -> Result<Vec<u8>, SectionError> {
    let required = match get_section_contents(source, inputs, &mut []) {
        Ok(size) => size,
        Err(SectionError::BufferTooSmall(required)) => required,
        Err(err) => return Err(err),
    };

    let mut contents = Vec::new();
    contents.try_reserve_exact(required).map_err(|_| {
        log::error!("Resource: memory cannot be allocated");
        SectionError::OutOfResources
    })?;
    contents.resize(required, 0);

    let size = get_section_contents(source, inputs, &mut contents)?;
    contents.truncate(size);
    Ok(contents)
}

/// Writes the aggregated `inputs` with no section header (`EFI_SECTION_ALL`).
pub fn encode_all(source: &dyn BlobSource, inputs: &[&str], sink: &mut dyn SectionSink) -> Result<usize, SectionError> {
    let contents = read_section_contents(source, inputs)?;
    sink.write(&contents)?;
    log::info!("the size of the created section file is {} bytes", contents.len());
    Ok(contents.len())
}

/// Number of zero bytes needed to align `size` for the next input.
pub fn padding_for(size: usize) -> usize {
    (INPUT_ALIGNMENT - size % INPUT_ALIGNMENT) % INPUT_ALIGNMENT
}
