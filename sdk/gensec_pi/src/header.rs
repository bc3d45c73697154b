//! Section header layouts and their byte-level codec.
//!
//! Based on PI Specification V1.8A Section 3.2.4.1 (`EFI_COMMON_SECTION_HEADER`) and Section 3.2.5
//! (`EFI_COMPRESSION_SECTION`, `EFI_GUID_DEFINED_SECTION`, `EFI_VERSION_SECTION`).
//!
//! Every layout implements `scroll`'s [`TryIntoCtx`](scroll::ctx::TryIntoCtx) and
//! [`TryFromCtx`](scroll::ctx::TryFromCtx) with a little-endian context, so headers can be written to and read
//! from byte buffers with `pwrite_with`/`pread_with`. The [`SectionHeader`] trait adds the size bookkeeping shared
//! by all variants.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use alloc::{vec, vec::Vec};

use r_efi::efi;
use scroll::{ctx, Endian, Pread, Pwrite, LE};

use crate::{
    guid,
    section::{CompressionType, GuidedSectionAttributes, Type},
    HeaderError,
};

/// Sections must be strictly smaller than this; the size has to fit the 24-bit header field.
pub const MAX_SECTION_SIZE: usize = 0x1000000;

/// Encode `value` as a 3-byte little-endian integer.
///
/// Returns `SizeOutOfRange` if `value` does not fit in 24 bits.
pub fn encode_u24_le(value: u32) -> Result<[u8; 3], HeaderError> {
    if value as usize >= MAX_SECTION_SIZE {
        Err(HeaderError::SizeOutOfRange(value))?;
    }
    let bytes = value.to_le_bytes();
    Ok([bytes[0], bytes[1], bytes[2]])
}

/// Decode a 3-byte little-endian integer.
pub fn decode_u24_le(bytes: [u8; 3]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0])
}

const SIZE_OUT_OF_RANGE: scroll::Error =
    scroll::Error::BadInput { size: 3, msg: "section size does not fit in 24 bits" };

/// Sizing and parsing shared by every section header layout.
pub trait SectionHeader:
    Copy + ctx::TryIntoCtx<Endian, Error = scroll::Error> + for<'a> ctx::TryFromCtx<'a, Endian, Error = scroll::Error>
{
    /// Number of bytes occupied by the serialized header.
    const SIZE: usize;

    /// The common header at the start of this layout.
    fn common(&self) -> &CommonHeader;

    /// Offset of the section payload from the start of the section.
    fn payload_offset(&self) -> usize {
        Self::SIZE
    }

    /// Serialize the header into a new buffer of exactly [`Self::SIZE`](SectionHeader::SIZE) bytes.
    fn serialize(&self) -> Result<Vec<u8>, HeaderError> {
        let mut buffer = vec![0u8; Self::SIZE];
        buffer[..].pwrite_with(*self, 0, LE)?;
        Ok(buffer)
    }

    /// Parse a serialized section, returning the header and the payload it describes.
    ///
    /// Bytes of `section` beyond the size recorded in the common header are ignored.
    fn parse(section: &[u8]) -> Result<(Self, &[u8]), HeaderError> {
        let header: Self = section.pread_with(0, LE)?;
        let size = header.common().section_size();
        let offset = header.payload_offset();
        if size < offset {
            Err(HeaderError::InvalidHeader)?;
        }
        if section.len() < size {
            Err(HeaderError::Truncated)?;
        }
        Ok((header, &section[offset..size]))
    }
}

/// `EFI_COMMON_SECTION_HEADER`: 24-bit size (including the header) followed by the section type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommonHeader {
    /// Section type identifier
    pub section_type: Type,
    /// Total section size in bytes, header included
    pub size: u32,
}

impl CommonHeader {
    /// Build a common header, validating that `size` fits in the 24-bit size field.
    pub fn new(section_type: Type, size: usize) -> Result<Self, HeaderError> {
        let size = u32::try_from(size).map_err(|_| HeaderError::SizeOutOfRange(u32::MAX))?;
        encode_u24_le(size)?;
        Ok(Self { section_type, size })
    }

    /// Total section size in bytes.
    pub fn section_size(&self) -> usize {
        self.size as usize
    }
}

impl SectionHeader for CommonHeader {
    const SIZE: usize = 4;

    fn common(&self) -> &CommonHeader {
        self
    }
}

impl ctx::TryIntoCtx<Endian> for CommonHeader {
    type Error = scroll::Error;

    fn try_into_ctx(self, dst: &mut [u8], le: Endian) -> Result<usize, Self::Error> {
        let size = encode_u24_le(self.size).map_err(|_| SIZE_OUT_OF_RANGE)?;
        let offset = &mut 0;
        for byte in size {
            dst.gwrite_with(byte, offset, le)?;
        }
        dst.gwrite_with(self.section_type.raw(), offset, le)?;
        Ok(*offset)
    }
}

impl<'a> ctx::TryFromCtx<'a, Endian> for CommonHeader {
    type Error = scroll::Error;

    fn try_from_ctx(src: &'a [u8], le: Endian) -> Result<(Self, usize), Self::Error> {
        let offset = &mut 0;
        let mut size = [0u8; 3];
        for byte in size.iter_mut() {
            *byte = src.gread_with(offset, le)?;
        }
        let raw_type: u8 = src.gread_with(offset, le)?;
        let section_type =
            Type::try_from(raw_type).map_err(|_| scroll::Error::BadInput { size: 1, msg: "unknown section type" })?;
        Ok((CommonHeader { section_type, size: decode_u24_le(size) }, *offset))
    }
}

/// `EFI_COMPRESSION_SECTION`: common header, uncompressed length and compression type (packed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compression {
    /// Common section header
    pub common: CommonHeader,
    /// Length of the payload once decompressed
    pub uncompressed_length: u32,
    /// Compression algorithm type
    pub compression_type: CompressionType,
}

impl SectionHeader for Compression {
    const SIZE: usize = CommonHeader::SIZE + 5;

    fn common(&self) -> &CommonHeader {
        &self.common
    }
}

impl ctx::TryIntoCtx<Endian> for Compression {
    type Error = scroll::Error;

    fn try_into_ctx(self, dst: &mut [u8], le: Endian) -> Result<usize, Self::Error> {
        let offset = &mut 0;
        dst.gwrite_with(self.common, offset, le)?;
        dst.gwrite_with(self.uncompressed_length, offset, le)?;
        dst.gwrite_with(self.compression_type as u8, offset, le)?;
        Ok(*offset)
    }
}

impl<'a> ctx::TryFromCtx<'a, Endian> for Compression {
    type Error = scroll::Error;

    fn try_from_ctx(src: &'a [u8], le: Endian) -> Result<(Self, usize), Self::Error> {
        let offset = &mut 0;
        let common: CommonHeader = src.gread_with(offset, le)?;
        let uncompressed_length: u32 = src.gread_with(offset, le)?;
        let raw_compression_type: u8 = src.gread_with(offset, le)?;
        let compression_type = CompressionType::try_from(raw_compression_type)
            .map_err(|_| scroll::Error::BadInput { size: 1, msg: "unknown compression type" })?;
        Ok((Compression { common, uncompressed_length, compression_type }, *offset))
    }
}

/// `EFI_GUID_DEFINED_SECTION`: common header, definition GUID, data offset and attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuidDefined {
    /// Common section header
    pub common: CommonHeader,
    /// GUID identifying the section format
    pub section_definition_guid: efi::Guid,
    /// Offset to section data from start of the section
    pub data_offset: u16,
    /// Section attributes
    pub attributes: GuidedSectionAttributes,
}

impl SectionHeader for GuidDefined {
    const SIZE: usize = CommonHeader::SIZE + 20;

    fn common(&self) -> &CommonHeader {
        &self.common
    }

    fn payload_offset(&self) -> usize {
        self.data_offset as usize
    }

    fn parse(section: &[u8]) -> Result<(Self, &[u8]), HeaderError> {
        let header: Self = section.pread_with(0, LE)?;
        let size = header.common.section_size();
        let offset = header.payload_offset();
        if offset < Self::SIZE || size < offset {
            Err(HeaderError::InvalidHeader)?;
        }
        if section.len() < size {
            Err(HeaderError::Truncated)?;
        }
        Ok((header, &section[offset..size]))
    }
}

impl ctx::TryIntoCtx<Endian> for GuidDefined {
    type Error = scroll::Error;

    fn try_into_ctx(self, dst: &mut [u8], le: Endian) -> Result<usize, Self::Error> {
        let offset = &mut 0;
        dst.gwrite_with(self.common, offset, le)?;
        for byte in self.section_definition_guid.as_bytes() {
            dst.gwrite_with(*byte, offset, le)?;
        }
        dst.gwrite_with(self.data_offset, offset, le)?;
        dst.gwrite_with(self.attributes.bits(), offset, le)?;
        Ok(*offset)
    }
}

impl<'a> ctx::TryFromCtx<'a, Endian> for GuidDefined {
    type Error = scroll::Error;

    fn try_from_ctx(src: &'a [u8], le: Endian) -> Result<(Self, usize), Self::Error> {
        let offset = &mut 0;
        let common: CommonHeader = src.gread_with(offset, le)?;
        let mut guid_bytes = [0u8; 16];
        for byte in guid_bytes.iter_mut() {
            *byte = src.gread_with(offset, le)?;
        }
        let data_offset: u16 = src.gread_with(offset, le)?;
        let attributes: u16 = src.gread_with(offset, le)?;
        Ok((
            GuidDefined {
                common,
                section_definition_guid: efi::Guid::from_bytes(&guid_bytes),
                data_offset,
                attributes: GuidedSectionAttributes::from_bits_retain(attributes),
            },
            *offset,
        ))
    }
}

/// GUID-defined header of a CRC32 section: the generic header followed by the CRC32 of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc32GuidDefined {
    /// GUID-defined header, always carrying [`guid::CRC32_SECTION`]
    pub guid_defined: GuidDefined,
    /// CRC32 of the section payload
    pub crc32: u32,
}

impl Crc32GuidDefined {
    /// Build a CRC32 section header for a payload of `payload_size` bytes.
    ///
    /// The GUID, data offset and `AUTH_STATUS_VALID` attribute are fixed by the CRC32 section format.
    pub fn new(payload_size: usize, crc32: u32) -> Result<Self, HeaderError> {
        let total = payload_size.checked_add(Self::SIZE).ok_or(HeaderError::SizeOutOfRange(u32::MAX))?;
        Ok(Self {
            guid_defined: GuidDefined {
                common: CommonHeader::new(Type::GuidDefined, total)?,
                section_definition_guid: guid::CRC32_SECTION,
                data_offset: Self::SIZE as u16,
                attributes: GuidedSectionAttributes::AUTH_STATUS_VALID,
            },
            crc32,
        })
    }
}

impl SectionHeader for Crc32GuidDefined {
    const SIZE: usize = GuidDefined::SIZE + 4;

    fn common(&self) -> &CommonHeader {
        &self.guid_defined.common
    }
}

impl ctx::TryIntoCtx<Endian> for Crc32GuidDefined {
    type Error = scroll::Error;

    fn try_into_ctx(self, dst: &mut [u8], le: Endian) -> Result<usize, Self::Error> {
        let offset = &mut 0;
        dst.gwrite_with(self.guid_defined, offset, le)?;
        dst.gwrite_with(self.crc32, offset, le)?;
        Ok(*offset)
    }
}

impl<'a> ctx::TryFromCtx<'a, Endian> for Crc32GuidDefined {
    type Error = scroll::Error;

    fn try_from_ctx(src: &'a [u8], le: Endian) -> Result<(Self, usize), Self::Error> {
        let offset = &mut 0;
        let guid_defined: GuidDefined = src.gread_with(offset, le)?;
        if guid_defined.section_definition_guid != guid::CRC32_SECTION {
            Err(scroll::Error::BadInput { size: 16, msg: "not a CRC32 GUID-defined section" })?;
        }
        if guid_defined.data_offset as usize != Self::SIZE {
            Err(scroll::Error::BadInput { size: 2, msg: "unexpected CRC32 section data offset" })?;
        }
        let crc32: u32 = src.gread_with(offset, le)?;
        Ok((Crc32GuidDefined { guid_defined, crc32 }, *offset))
    }
}

/// `EFI_VERSION_SECTION`: common header followed by the build number. The version string follows the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    /// Common section header
    pub common: CommonHeader,
    /// Build number
    pub build_number: u16,
}

impl SectionHeader for Version {
    const SIZE: usize = CommonHeader::SIZE + 2;

    fn common(&self) -> &CommonHeader {
        &self.common
    }
}

impl ctx::TryIntoCtx<Endian> for Version {
    type Error = scroll::Error;

    fn try_into_ctx(self, dst: &mut [u8], le: Endian) -> Result<usize, Self::Error> {
        let offset = &mut 0;
        dst.gwrite_with(self.common, offset, le)?;
        dst.gwrite_with(self.build_number, offset, le)?;
        Ok(*offset)
    }
}

impl<'a> ctx::TryFromCtx<'a, Endian> for Version {
    type Error = scroll::Error;

    fn try_from_ctx(src: &'a [u8], le: Endian) -> Result<(Self, usize), Self::Error> {
        let offset = &mut 0;
        let common: CommonHeader = src.gread_with(offset, le)?;
        let build_number: u16 = src.gread_with(offset, le)?;
        Ok((Version { common, build_number }, *offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u24_encoding() {
        assert_eq!(encode_u24_le(0x0E), Ok([0x0E, 0x00, 0x00]));
        assert_eq!(encode_u24_le(0x123456), Ok([0x56, 0x34, 0x12]));
        assert_eq!(encode_u24_le(0xFFFFFF), Ok([0xFF, 0xFF, 0xFF]));
        assert_eq!(encode_u24_le(0x1000000), Err(HeaderError::SizeOutOfRange(0x1000000)));
        assert_eq!(decode_u24_le([0x56, 0x34, 0x12]), 0x123456);
        assert_eq!(decode_u24_le([0xFF, 0xFF, 0xFF]), 0xFFFFFF);
    }

    #[test]
    fn common_header_layout() {
        let header = CommonHeader::new(Type::Raw, 14).unwrap();
        assert_eq!(header.serialize().unwrap(), [0x0E, 0x00, 0x00, 0x19]);

        let (parsed, rest) = CommonHeader::parse(&[0x06, 0x00, 0x00, 0x10, 0xAA, 0xBB, 0xCC]).unwrap();
        assert_eq!(parsed, CommonHeader { section_type: Type::Pe32, size: 6 });
        assert_eq!(rest, &[0xAA, 0xBB]);
    }

    #[test]
    fn common_header_rejects_oversize() {
        assert_eq!(CommonHeader::new(Type::Raw, MAX_SECTION_SIZE), Err(HeaderError::SizeOutOfRange(0x1000000)));
        assert!(CommonHeader::new(Type::Raw, MAX_SECTION_SIZE - 1).is_ok());

        let header = CommonHeader { section_type: Type::Raw, size: 0x1000000 };
        assert_eq!(header.serialize(), Err(HeaderError::InvalidHeader));
    }

    #[test]
    fn common_header_parse_errors() {
        assert_eq!(CommonHeader::parse(&[0x04, 0x00]), Err(HeaderError::Truncated));
        assert_eq!(CommonHeader::parse(&[0x08, 0x00, 0x00, 0x19, 0x00]), Err(HeaderError::Truncated));
        assert_eq!(CommonHeader::parse(&[0x02, 0x00, 0x00, 0x19]), Err(HeaderError::InvalidHeader));
        assert_eq!(CommonHeader::parse(&[0x04, 0x00, 0x00, 0x03]), Err(HeaderError::InvalidHeader));
    }

    #[test]
    fn compression_header_layout() {
        let header = Compression {
            common: CommonHeader::new(Type::Compression, 17).unwrap(),
            uncompressed_length: 8,
            compression_type: CompressionType::NotCompressed,
        };
        let bytes = header.serialize().unwrap();
        assert_eq!(bytes, [0x11, 0x00, 0x00, 0x01, 0x08, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(bytes.len(), Compression::SIZE);

        let mut section = bytes.clone();
        section.extend_from_slice(b"AAAABBBB");
        let (parsed, payload) = Compression::parse(&section).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(payload, b"AAAABBBB");
    }

    #[test]
    fn compression_header_rejects_unknown_type() {
        let section = [0x09, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x02];
        assert_eq!(Compression::parse(&section), Err(HeaderError::InvalidHeader));
    }

    #[test]
    fn guid_defined_header_layout() {
        let guid = efi::Guid::from_bytes(&[
            0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF,
        ]);
        let header = GuidDefined {
            common: CommonHeader::new(Type::GuidDefined, 28).unwrap(),
            section_definition_guid: guid,
            data_offset: 24,
            attributes: GuidedSectionAttributes::PROCESSING_REQUIRED,
        };
        let bytes = header.serialize().unwrap();
        assert_eq!(
            bytes,
            [
                0x1C, 0x00, 0x00, 0x02, //Header
                0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, //GUID
                0x18, 0x00, //Data offset
                0x01, 0x00, //Attributes
            ]
        );

        let mut section = bytes.clone();
        section.extend_from_slice(&[0x04, 0x15, 0x19, 0x80]);
        let (parsed, payload) = GuidDefined::parse(&section).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(payload, &[0x04, 0x15, 0x19, 0x80]);
    }

    #[test]
    fn guid_defined_payload_starts_at_data_offset() {
        let section: [u8; 32] = [
            0x20, 0x00, 0x00, 0x02, //Header
            0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, //GUID
            0x1C, 0x00, //Data offset
            0x12, 0x34, //Attributes
            0x00, 0x01, 0x02, 0x03, //GUID-specific fields
            0x04, 0x15, 0x19, 0x80, //Data
        ];
        let (parsed, payload) = GuidDefined::parse(&section).unwrap();
        assert_eq!(parsed.data_offset, 0x1C);
        assert_eq!(parsed.attributes.bits(), 0x3412);
        assert_eq!(payload, &[0x04, 0x15, 0x19, 0x80]);

        let mut bad_offset = section;
        bad_offset[20] = 0x10;
        assert_eq!(GuidDefined::parse(&bad_offset), Err(HeaderError::InvalidHeader));
    }

    #[test]
    fn crc32_header_layout() {
        let header = Crc32GuidDefined::new(100, 0xDEADBEEF).unwrap();
        assert_eq!(header.common().section_size(), 128);
        let bytes = header.serialize().unwrap();
        assert_eq!(bytes.len(), 28);
        assert_eq!(&bytes[0..4], &[0x80, 0x00, 0x00, 0x02]);
        assert_eq!(&bytes[4..20], guid::CRC32_SECTION.as_bytes());
        assert_eq!(&bytes[20..22], &[0x1C, 0x00]);
        assert_eq!(&bytes[22..24], &[0x02, 0x00]);
        assert_eq!(&bytes[24..28], &[0xEF, 0xBE, 0xAD, 0xDE]);

        let mut section = bytes.clone();
        section.extend_from_slice(&[0x5A; 100]);
        let (parsed, payload) = Crc32GuidDefined::parse(&section).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(payload.len(), 100);
    }

    #[test]
    fn crc32_header_requires_crc32_guid() {
        let generic = GuidDefined {
            common: CommonHeader::new(Type::GuidDefined, 28).unwrap(),
            section_definition_guid: guid::ZERO,
            data_offset: 28,
            attributes: GuidedSectionAttributes::AUTH_STATUS_VALID,
        };
        let mut section = generic.serialize().unwrap();
        section.extend_from_slice(&[0u8; 4]);
        assert_eq!(Crc32GuidDefined::parse(&section), Err(HeaderError::InvalidHeader));
    }

    #[test]
    fn version_header_layout() {
        let section: [u8; 14] = [0x0E, 0x00, 0x00, 0x14, 0x34, 0x12, 0x31, 0x00, 0x2E, 0x00, 0x30, 0x00, 0x00, 0x00];
        let (parsed, payload) = Version::parse(&section).unwrap();
        assert_eq!(parsed.build_number, 0x1234);
        assert_eq!(parsed.common.section_type, Type::Version);
        assert_eq!(payload, &[0x31, 0x00, 0x2E, 0x00, 0x30, 0x00, 0x00, 0x00]);
        assert_eq!(parsed.serialize().unwrap(), &section[..Version::SIZE]);
    }
}
