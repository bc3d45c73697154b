//! Section requests and the generator that dispatches them to the encoders.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use alloc::string::String;

use gensec_pi::section::{CompressionType, GuidedSectionAttributes, Type};
use r_efi::efi;

use crate::{
    aggregate, compress::Compress, compression, guid_defined, leaf, sink::SectionSink, source::BlobSource, string,
    SectionError,
};

/// A fully validated description of the section to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionRequest {
    /// Aggregate the inputs without a section header.
    All,
    /// Wrap a single input in a leaf section of the given type.
    Leaf(Type),
    /// Wrap the aggregated inputs in a compression section.
    Compression(CompressionType),
    /// Wrap the aggregated inputs in a GUID-defined section.
    GuidDefined {
        /// Section definition GUID; `None` (or the CRC32/all-zero GUID) selects a CRC32 section.
        vendor_guid: Option<efi::Guid>,
        /// Attributes of a generic GUID-defined section. Ignored for CRC32 sections.
        attributes: GuidedSectionAttributes,
    },
    /// Emit a version section. Takes no inputs.
    Version {
        /// Build number
        build_number: u16,
        /// Version string
        name: String,
    },
    /// Emit a user interface section. Takes no inputs.
    UserInterface {
        /// File name
        name: String,
    },
}

impl SectionRequest {
    /// Section type produced by this request.
    pub fn section_type(&self) -> Type {
        match self {
            SectionRequest::All => Type::All,
            SectionRequest::Leaf(section_type) => *section_type,
            SectionRequest::Compression(_) => Type::Compression,
            SectionRequest::GuidDefined { .. } => Type::GuidDefined,
            SectionRequest::Version { .. } => Type::Version,
            SectionRequest::UserInterface { .. } => Type::UserInterface,
        }
    }
}

/// Generates sections from a blob source, one section per [`generate`](SectionGenerator::generate) call.
pub struct SectionGenerator<'a> {
    source: &'a dyn BlobSource,
    compressor: Option<&'a dyn Compress>,
}

impl<'a> SectionGenerator<'a> {
    /// Creates a generator reading inputs from `source`. Without a compressor, standard compression is unsupported.
    pub fn new(source: &'a dyn BlobSource) -> Self {
        Self { source, compressor: None }
    }

    /// Use `compressor` for standard compression sections.
    pub fn with_compressor(mut self, compressor: &'a dyn Compress) -> Self {
        self.compressor = Some(compressor);
        self
    }

    /// Generates the section described by `request` from `inputs` and writes it to `sink`.
    ///
    /// Returns the number of bytes written. On error, bytes already written to `sink` are not rolled back.
    pub fn generate(
        &self,
        request: &SectionRequest,
        inputs: &[&str],
        sink: &mut dyn SectionSink,
    ) -> Result<usize, SectionError> {
        log::debug!("Section type is {}", request.section_type());
        match request {
            SectionRequest::All => aggregate::encode_all(self.source, inputs, sink),
            SectionRequest::Leaf(section_type) => leaf::encode_leaf(self.source, inputs, *section_type, sink),
            SectionRequest::Compression(compression_type) => {
                compression::encode_compression(self.source, inputs, *compression_type, self.compressor, sink)
            }
            SectionRequest::GuidDefined { vendor_guid, attributes } => {
                guid_defined::encode_guid_defined(self.source, inputs, *vendor_guid, *attributes, sink)
            }
            SectionRequest::Version { build_number, name } => string::encode_version(*build_number, name, sink),
            SectionRequest::UserInterface { name } => string::encode_user_interface(name, sink),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compress::MockCompress, source::MemoryBlobSource};
    use gensec_pi::header::{CommonHeader, SectionHeader};

    fn source() -> MemoryBlobSource {
        MemoryBlobSource::new().with_blob("pe", &[0x4D, 0x5A, 0x00, 0x00, 0x01]).with_blob("raw", &[0xAB; 3])
    }

    #[test]
    fn dispatches_each_request() {
        let source = source();
        let generator = SectionGenerator::new(&source);

        let cases = [
            (SectionRequest::All, alloc::vec!["pe", "raw"], 11),
            (SectionRequest::Leaf(Type::Pe32), alloc::vec!["pe"], 9),
            (SectionRequest::Compression(CompressionType::NotCompressed), alloc::vec!["raw"], 12),
            (
                SectionRequest::GuidDefined { vendor_guid: None, attributes: GuidedSectionAttributes::empty() },
                alloc::vec!["raw"],
                31,
            ),
            (SectionRequest::Version { build_number: 1, name: String::from("A") }, alloc::vec![], 10),
            (SectionRequest::UserInterface { name: String::from("A") }, alloc::vec![], 8),
        ];
        for (request, inputs, expected_size) in cases {
            let mut sink = Vec::new();
            assert_eq!(generator.generate(&request, &inputs, &mut sink), Ok(expected_size), "{request:?}");
            assert_eq!(sink.len(), expected_size);
            if request != SectionRequest::All {
                let (header, _) = CommonHeader::parse(&sink).unwrap();
                assert_eq!(header.section_type, request.section_type());
            }
        }
    }

    #[test]
    fn leaf_request_for_non_leaf_type_is_invalid() {
        let source = source();
        let generator = SectionGenerator::new(&source);
        let mut sink = Vec::new();
        assert_eq!(
            generator.generate(&SectionRequest::Leaf(Type::GuidDefined), &["raw"], &mut sink),
            Err(SectionError::InvalidArgument)
        );
    }

    #[test]
    fn standard_compression_uses_the_configured_compressor() {
        let source = source();
        let mut compressor = MockCompress::new();
        compressor.expect_compress().times(2).returning(|_: &[u8], destination: &mut [u8]| {
            if destination.is_empty() {
                return Err(SectionError::BufferTooSmall(1));
            }
            destination[0] = 0x5A;
            Ok(1)
        });

        let mut sink = Vec::new();
        let request = SectionRequest::Compression(CompressionType::StandardCompression);
        assert_eq!(
            SectionGenerator::new(&source).generate(&request, &["raw"], &mut sink),
            Err(SectionError::UnsupportedSubtype)
        );
        let generator = SectionGenerator::new(&source).with_compressor(&compressor);
        assert_eq!(generator.generate(&request, &["raw"], &mut sink), Ok(10));
        assert_eq!(sink, [0x0A, 0x00, 0x00, 0x01, 0x03, 0x00, 0x00, 0x00, 0x01, 0x5A]);
    }

    #[test]
    fn request_section_types() {
        assert_eq!(SectionRequest::All.section_type(), Type::All);
        assert_eq!(SectionRequest::Leaf(Type::Raw).section_type(), Type::Raw);
        let guid_defined =
            SectionRequest::GuidDefined { vendor_guid: None, attributes: GuidedSectionAttributes::empty() };
        assert_eq!(guid_defined.section_type(), Type::GuidDefined);
    }
}
