//! User-facing section options and their validation.
//!
//! [`SectionConfig`] collects options as a user supplies them (section type, compression, vendor GUID,
//! attributes, name, build number and inputs) and [`SectionConfig::to_request`] turns them into a validated
//! [`SectionRequest`], applying the defaults of the command line tool:
//!
//! - no section type means `EFI_SECTION_ALL`
//! - compression sections default to `PI_STD`
//! - GUID-defined sections without attributes get `PROCESSING_REQUIRED`
//!
//! The `parse_*` helpers convert option strings and are usable directly as `clap` value parsers.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use alloc::{string::String, vec::Vec};

use gensec_pi::{
    guid::{self, GuidDisplay},
    section::{CompressionType, GuidedSectionAttributes, Type},
};
use r_efi::efi;

use crate::{SectionError, SectionRequest};

/// Largest accepted build number of a version section.
pub const MAX_BUILD_NUMBER: i64 = 9999;

/// Options describing one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionConfig {
    /// Section type to generate
    pub section_type: Type,
    /// Compression of a compression section
    pub compression_type: CompressionType,
    /// Vendor GUID of a GUID-defined section
    pub vendor_guid: Option<efi::Guid>,
    /// Attributes of a GUID-defined section; empty means `PROCESSING_REQUIRED`
    pub attributes: GuidedSectionAttributes,
    /// Version string or user interface name
    pub name: Option<String>,
    /// Build number of a version section
    pub build_number: i64,
    /// Input blob names, in order
    pub inputs: Vec<String>,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            section_type: Type::All,
            compression_type: CompressionType::StandardCompression,
            vendor_guid: None,
            attributes: GuidedSectionAttributes::empty(),
            name: None,
            build_number: 0,
            inputs: Vec::new(),
        }
    }
}

impl SectionConfig {
    /// The inputs as string slices, as taken by [`SectionGenerator::generate`](crate::SectionGenerator::generate).
    pub fn input_names(&self) -> Vec<&str> {
        self.inputs.iter().map(String::as_str).collect()
    }

    /// Validate the options and build the request they describe.
    pub fn to_request(&self) -> Result<SectionRequest, SectionError> {
        log::info!("Section type is {}", self.section_type);
        for (index, input) in self.inputs.iter().enumerate() {
            log::info!("the {index}th input file name is {input}");
        }

        match self.section_type {
            Type::Version => {
                if !(0..=MAX_BUILD_NUMBER).contains(&self.build_number) {
                    log::error!("Invalid option value: {} is not in 0~{MAX_BUILD_NUMBER}", self.build_number);
                    Err(SectionError::InvalidArgument)?;
                }
                log::info!("Version section number is {}", self.build_number);
                let build_number = u16::try_from(self.build_number).map_err(|_| SectionError::InvalidArgument)?;
                return Ok(SectionRequest::Version { build_number, name: self.name.clone().unwrap_or_default() });
            }
            Type::UserInterface => {
                let name = self.name.clone().filter(|name| !name.is_empty()).ok_or_else(|| {
                    log::error!("Missing option: user interface string");
                    SectionError::InvalidArgument
                })?;
                log::info!("UI section string name is {name}");
                return Ok(SectionRequest::UserInterface { name });
            }
            _ => {}
        }

        if self.inputs.is_empty() {
            log::error!("Missing options: input files");
            Err(SectionError::InputMissing)?;
        }

        Ok(match self.section_type {
            Type::All => SectionRequest::All,
            Type::Compression => {
                log::info!("Compress method is {}", self.compression_type);
                SectionRequest::Compression(self.compression_type)
            }
            Type::GuidDefined => {
                let attributes = if self.attributes.is_empty() {
                    GuidedSectionAttributes::PROCESSING_REQUIRED
                } else {
                    self.attributes
                };
                if let Some(vendor_guid) = &self.vendor_guid {
                    log::info!("Vendor Guid is {}", GuidDisplay(vendor_guid));
                }
                for (name, _) in attributes.iter_names() {
                    log::info!("Guid Attribute is {name}");
                }
                SectionRequest::GuidDefined { vendor_guid: self.vendor_guid, attributes }
            }
            leaf => SectionRequest::Leaf(leaf),
        })
    }
}

/// Parse a section type name such as `EFI_SECTION_RAW`, ignoring case.
pub fn parse_section_type(name: &str) -> Result<Type, SectionError> {
    Type::from_name(name).ok_or_else(|| {
        log::error!("Invalid option value: SectionType = {name}");
        SectionError::InvalidArgument
    })
}

/// Parse a compression type name (`PI_NONE` or `PI_STD`), ignoring case.
pub fn parse_compression_type(name: &str) -> Result<CompressionType, SectionError> {
    CompressionType::from_name(name).ok_or_else(|| {
        log::error!("Invalid option value: --compress = {name}");
        SectionError::UnsupportedSubtype
    })
}

/// Parse a GUID-defined attribute name (`PROCESSING_REQUIRED` or `AUTH_STATUS_VALID`), ignoring case.
pub fn parse_attribute(name: &str) -> Result<GuidedSectionAttributes, SectionError> {
    GuidedSectionAttributes::from_name_ignore_case(name).ok_or_else(|| {
        log::error!("Invalid option value: --attributes = {name}");
        SectionError::UnsupportedSubtype
    })
}

/// Parse a vendor GUID in registry format.
pub fn parse_vendor_guid(text: &str) -> Result<efi::Guid, SectionError> {
    guid::parse_guid(text).map_err(|err| {
        log::error!("Invalid option value: --vendor = {text}: {err}");
        SectionError::InvalidArgument
    })
}
