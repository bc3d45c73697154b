//! Leaf sections: a single input blob behind a common section header.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use gensec_pi::{
    header::{CommonHeader, SectionHeader, MAX_SECTION_SIZE},
    section::Type,
};

use crate::{aggregate::read_section_contents, sink::SectionSink, source::BlobSource, SectionError};

/// Wraps the single blob in `inputs` in a `section_type` section and writes it to `sink`.
///
/// Returns the size of the section. Leaf sections take exactly one input; `section_type` must be one of the
/// types whose payload is an opaque blob (not an encapsulation, version, user interface or `EFI_SECTION_ALL`).
pub fn encode_leaf(
    source: &dyn BlobSource,
    inputs: &[&str],
    section_type: Type,
    sink: &mut dyn SectionSink,
) -> Result<usize, SectionError> {
    if !section_type.is_common_leaf() {
        log::error!("Invalid parameter: {section_type} is not a leaf section type");
        Err(SectionError::InvalidArgument)?;
    }
    if inputs.len() != 1 {
        log::error!("Invalid parameter: only one input file is allowed for a leaf section, {} given", inputs.len());
        Err(SectionError::InvalidArgument)?;
    }

    let contents = read_section_contents(source, inputs)?;
    let total = CommonHeader::SIZE + contents.len();
    if total >= MAX_SECTION_SIZE {
        log::error!("Invalid parameter: the size of {section_type} section {total:#x} exceeds the maximum");
        Err(SectionError::SizeLimitExceeded(total))?;
    }

    let header = CommonHeader::new(section_type, total)?;
    sink.write(&header.serialize()?)?;
    sink.write(&contents)?;
    log::info!("the size of the created section file is {total} bytes");
    Ok(total)
}
