//! Firmware File System (FFS) Section Definitions
//!
//! Based on the values defined in the UEFI Platform Initialization (PI) Specification V1.8A Section 3.2.4
//! Firmware File Section.
//!
//! Every section type, compression type and GUID-defined attribute has a canonical name as used by the EDK II
//! build tools (for example `EFI_SECTION_RAW`, `PI_STD`, `PROCESSING_REQUIRED`). The mapping between values and
//! names is a total function over the enumerations below, and the reverse lookup is case-insensitive.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use core::fmt;

use bitflags::bitflags;

use crate::HeaderError;

/// Type alias for section type identifiers
pub type EfiSectionType = u8;

/// Firmware File System Section Types
/// Note: Typically called `EFI_SECTION_*` in EDK II code.
pub mod raw_type {
    /// Pseudo type. Used as a wild card to select all types; sections of this type carry no header.
    pub const ALL: u8 = 0x00;
    /// Encapsulated section type constants
    pub mod encapsulated {
        /// Compression encapsulated section
        pub const COMPRESSION: u8 = 0x01;
        /// GUID-defined encapsulated section
        pub const GUID_DEFINED: u8 = 0x02;
    }
    /// PE32 executable section
    pub const PE32: u8 = 0x10;
    /// Position-independent code section
    pub const PIC: u8 = 0x11;
    /// Terse executable section
    pub const TE: u8 = 0x12;
    /// DXE dependency expression section
    pub const DXE_DEPEX: u8 = 0x13;
    /// Version information section
    pub const VERSION: u8 = 0x14;
    /// User interface string section
    pub const USER_INTERFACE: u8 = 0x15;
    /// Compatibility16 section
    pub const COMPATIBILITY16: u8 = 0x16;
    /// Firmware volume image section
    pub const FIRMWARE_VOLUME_IMAGE: u8 = 0x17;
    /// Freeform GUID subtype section
    pub const FREEFORM_SUBTYPE_GUID: u8 = 0x18;
    /// Raw data section
    pub const RAW: u8 = 0x19;
    /// PEI dependency expression section
    pub const PEI_DEPEX: u8 = 0x1B;
    /// MM dependency expression section
    pub const MM_DEPEX: u8 = 0x1C;
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
/// Section type enumeration for firmware file sections
pub enum Type {
    /// All section types (passthrough, no header)
    All = raw_type::ALL,
    /// Compression section
    Compression = raw_type::encapsulated::COMPRESSION,
    /// GUID-defined section
    GuidDefined = raw_type::encapsulated::GUID_DEFINED,
    /// PE32 executable
    Pe32 = raw_type::PE32,
    /// Position-independent code
    Pic = raw_type::PIC,
    /// Terse executable
    Te = raw_type::TE,
    /// DXE dependency expression
    DxeDepex = raw_type::DXE_DEPEX,
    /// Version information
    Version = raw_type::VERSION,
    /// User interface string
    UserInterface = raw_type::USER_INTERFACE,
    /// Compatibility16 binary
    Compatibility16 = raw_type::COMPATIBILITY16,
    /// Firmware volume image
    FirmwareVolumeImage = raw_type::FIRMWARE_VOLUME_IMAGE,
    /// Freeform GUID subtype
    FreeformSubtypeGuid = raw_type::FREEFORM_SUBTYPE_GUID,
    /// Raw data
    Raw = raw_type::RAW,
    /// PEI dependency expression
    PeiDepex = raw_type::PEI_DEPEX,
    /// MM dependency expression
    MmDepex = raw_type::MM_DEPEX,
}

impl Type {
    /// Every section type, in discriminant order.
    pub const ALL_TYPES: [Type; 15] = [
        Type::All,
        Type::Compression,
        Type::GuidDefined,
        Type::Pe32,
        Type::Pic,
        Type::Te,
        Type::DxeDepex,
        Type::Version,
        Type::UserInterface,
        Type::Compatibility16,
        Type::FirmwareVolumeImage,
        Type::FreeformSubtypeGuid,
        Type::Raw,
        Type::PeiDepex,
        Type::MmDepex,
    ];

    /// The raw section type as stored in the common header.
    pub const fn raw(self) -> EfiSectionType {
        self as EfiSectionType
    }

    /// Canonical EDK II name of the section type.
    pub const fn name(self) -> &'static str {
        match self {
            Type::All => "EFI_SECTION_ALL",
            Type::Compression => "EFI_SECTION_COMPRESSION",
            Type::GuidDefined => "EFI_SECTION_GUID_DEFINED",
            Type::Pe32 => "EFI_SECTION_PE32",
            Type::Pic => "EFI_SECTION_PIC",
            Type::Te => "EFI_SECTION_TE",
            Type::DxeDepex => "EFI_SECTION_DXE_DEPEX",
            Type::Version => "EFI_SECTION_VERSION",
            Type::UserInterface => "EFI_SECTION_USER_INTERFACE",
            Type::Compatibility16 => "EFI_SECTION_COMPATIBILITY16",
            Type::FirmwareVolumeImage => "EFI_SECTION_FIRMWARE_VOLUME_IMAGE",
            Type::FreeformSubtypeGuid => "EFI_SECTION_FREEFORM_SUBTYPE_GUID",
            Type::Raw => "EFI_SECTION_RAW",
            Type::PeiDepex => "EFI_SECTION_PEI_DEPEX",
            Type::MmDepex => "EFI_SECTION_MM_DEPEX",
        }
    }

    /// Look up a section type by its canonical name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Type> {
        Self::ALL_TYPES.into_iter().find(|section_type| section_type.name().eq_ignore_ascii_case(name))
    }

    /// Whether sections of this type encapsulate other sections.
    pub const fn is_encapsulation(self) -> bool {
        matches!(self, Type::Compression | Type::GuidDefined)
    }

    /// Whether sections of this type are built from a single opaque blob wrapped in a common header.
    pub const fn is_common_leaf(self) -> bool {
        !matches!(self, Type::All | Type::Compression | Type::GuidDefined | Type::Version | Type::UserInterface)
    }
}

impl TryFrom<u8> for Type {
    type Error = HeaderError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL_TYPES
            .into_iter()
            .find(|section_type| section_type.raw() == value)
            .ok_or(HeaderError::InvalidSectionType(value))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compression algorithm identifiers for `EFI_COMPRESSION_SECTION`
pub mod compression {
    /// No compression applied
    pub const NOT_COMPRESSED: u8 = 0x00;
    /// Standard compression (EFI 1.1 compression algorithm)
    pub const STANDARD_COMPRESSION: u8 = 0x01;
}

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
/// Compression type stored in the compression section header.
pub enum CompressionType {
    /// Payload is stored as-is.
    NotCompressed = compression::NOT_COMPRESSED,
    /// Payload is compressed with the standard (EFI 1.1) compression algorithm.
    StandardCompression = compression::STANDARD_COMPRESSION,
}

impl CompressionType {
    /// Canonical name of the compression type.
    pub const fn name(self) -> &'static str {
        match self {
            CompressionType::NotCompressed => "PI_NONE",
            CompressionType::StandardCompression => "PI_STD",
        }
    }

    /// Look up a compression type by its canonical name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<CompressionType> {
        [CompressionType::NotCompressed, CompressionType::StandardCompression]
            .into_iter()
            .find(|compression_type| compression_type.name().eq_ignore_ascii_case(name))
    }
}

impl TryFrom<u8> for CompressionType {
    type Error = HeaderError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            compression::NOT_COMPRESSED => Ok(CompressionType::NotCompressed),
            compression::STANDARD_COMPRESSION => Ok(CompressionType::StandardCompression),
            other => Err(HeaderError::InvalidCompressionType(other)),
        }
    }
}

impl fmt::Display for CompressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Attributes of an `EFI_GUID_DEFINED_SECTION`.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct GuidedSectionAttributes: u16 {
        /// The section content must be processed by the GUID-specific extraction before use.
        const PROCESSING_REQUIRED = 0x01;
        /// The section carries authentication information (e.g. a CRC32).
        const AUTH_STATUS_VALID = 0x02;
    }
}

impl GuidedSectionAttributes {
    /// Look up a single attribute flag by its canonical name, ignoring ASCII case.
    ///
    /// The exact-case lookup is the `from_name` generated by `bitflags`.
    pub fn from_name_ignore_case(name: &str) -> Option<GuidedSectionAttributes> {
        Self::all().iter_names().find(|(flag_name, _)| flag_name.eq_ignore_ascii_case(name)).map(|(_, flag)| flag)
    }
}
