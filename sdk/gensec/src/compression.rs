//! Compression encapsulation sections.
//!
//! The inputs are aggregated and either stored as-is (`PI_NONE`) or compressed with the standard compression
//! algorithm (`PI_STD`), then written behind an `EFI_COMPRESSION_SECTION` header recording the uncompressed
//! length.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use alloc::vec::Vec;

use gensec_pi::{
    header::{CommonHeader, Compression, SectionHeader, MAX_SECTION_SIZE},
    section::{CompressionType, Type},
};

use crate::{aggregate::read_section_contents, compress::Compress, sink::SectionSink, source::BlobSource, SectionError};

fn compress_contents(compressor: &dyn Compress, contents: &[u8]) -> Result<Vec<u8>, SectionError> {
    let required = match compressor.compress(contents, &mut []) {
        Ok(written) => written,
        Err(SectionError::BufferTooSmall(required)) => required,
        Err(err) => {
            log::error!("Compression failed: {err}");
            return Err(err);
        }
    };

    let mut compressed = Vec::new();
    compressed.try_reserve_exact(required).map_err(|_| {
        log::error!("Resource: memory cannot be allocated");
        SectionError::OutOfResources
    })?;
    compressed.resize(required, 0);

    let written = compressor.compress(contents, &mut compressed).inspect_err(|err| {
        log::error!("Compression failed: {err}");
    })?;
    compressed.truncate(written);
    Ok(compressed)
}

/// Aggregates `inputs`, compresses them as `compression_type` says and writes a compression section to `sink`.
///
/// `compressor` is only consulted for [`CompressionType::StandardCompression`]; requesting standard compression
/// without one is [`SectionError::UnsupportedSubtype`]. Returns the size of the section.
pub fn encode_compression(
    source: &dyn BlobSource,
    inputs: &[&str],
    compression_type: CompressionType,
    compressor: Option<&dyn Compress>,
    sink: &mut dyn SectionSink,
) -> Result<usize, SectionError> {
    let contents = read_section_contents(source, inputs)?;

    let compressed;
    let payload = match compression_type {
        CompressionType::NotCompressed => contents.as_slice(),
        CompressionType::StandardCompression => {
            let compressor = compressor.ok_or_else(|| {
                log::error!("Invalid parameter: no compressor available for {compression_type}");
                SectionError::UnsupportedSubtype
            })?;
            compressed = compress_contents(compressor, &contents)?;
            compressed.as_slice()
        }
    };
    log::debug!("the original section size is {} bytes", contents.len());

    let total = Compression::SIZE + payload.len();
    if total >= MAX_SECTION_SIZE {
        log::error!("Invalid parameter: the size of compression section {total:#x} exceeds the maximum");
        Err(SectionError::SizeLimitExceeded(total))?;
    }
    let uncompressed_length =
        u32::try_from(contents.len()).map_err(|_| SectionError::SizeLimitExceeded(contents.len()))?;

    let header = Compression {
        common: CommonHeader::new(Type::Compression, total)?,
        uncompressed_length,
        compression_type,
    };
    sink.write(&header.serialize()?)?;
    sink.write(payload)?;
    log::info!("the size of the created section file is {total} bytes");
    Ok(total)
}
