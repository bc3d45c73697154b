//! GUID-defined encapsulation sections.
//!
//! Without a vendor GUID (or with the CRC32 or all-zero GUID) the section is a CRC32 section: the aggregated
//! payload is preceded by its CRC32 and the attributes are forced to `AUTH_STATUS_VALID`. Any other vendor GUID
//! produces a generic GUID-defined section carrying the caller's attributes.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use gensec_pi::{
    guid::{self, GuidDisplay},
    header::{CommonHeader, Crc32GuidDefined, GuidDefined, SectionHeader, MAX_SECTION_SIZE},
    section::{GuidedSectionAttributes, Type},
};
use r_efi::efi;

use crate::{aggregate::read_section_contents, sink::SectionSink, source::BlobSource, SectionError};

/// The vendor GUID to place in the header, or `None` when the section is a CRC32 section.
fn generic_vendor_guid(vendor_guid: Option<efi::Guid>) -> Option<efi::Guid> {
    vendor_guid.filter(|vendor_guid| *vendor_guid != guid::CRC32_SECTION && !guid::is_zero(vendor_guid))
}

fn check_size(total: usize) -> Result<(), SectionError> {
    if total >= MAX_SECTION_SIZE {
        log::error!("Invalid parameter: the size of GUID-defined section {total:#x} exceeds the maximum");
        Err(SectionError::SizeLimitExceeded(total))?;
    }
    Ok(())
}

/// Aggregates `inputs` and writes them as a GUID-defined section to `sink`, returning the size of the section.
pub fn encode_guid_defined(
    source: &dyn BlobSource,
    inputs: &[&str],
    vendor_guid: Option<efi::Guid>,
    attributes: GuidedSectionAttributes,
    sink: &mut dyn SectionSink,
) -> Result<usize, SectionError> {
    let contents = read_section_contents(source, inputs)?;

    let total = match generic_vendor_guid(vendor_guid) {
        None => {
            let total = Crc32GuidDefined::SIZE + contents.len();
            check_size(total)?;
            let crc32 = crc32fast::hash(&contents);
            log::debug!("the CRC32 of the section content is {crc32:#010x}");
            let header = Crc32GuidDefined::new(contents.len(), crc32)?;
            sink.write(&header.serialize()?)?;
            total
        }
        Some(vendor_guid) => {
            let total = GuidDefined::SIZE + contents.len();
            check_size(total)?;
            log::debug!("the vendor GUID is {}", GuidDisplay(&vendor_guid));
            let header = GuidDefined {
                common: CommonHeader::new(Type::GuidDefined, total)?,
                section_definition_guid: vendor_guid,
                data_offset: GuidDefined::SIZE as u16,
                attributes,
            };
            sink.write(&header.serialize()?)?;
            total
        }
    };
    sink.write(&contents)?;
    log::info!("the size of the created section file is {total} bytes");
    Ok(total)
}
