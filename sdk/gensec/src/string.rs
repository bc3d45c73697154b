//! Version and user interface sections.
//!
//! Both carry a null-terminated UTF-16LE string; the version section prefixes it with a build number.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use alloc::vec::Vec;
use core::iter;

use gensec_pi::{
    header::{CommonHeader, SectionHeader, Version, MAX_SECTION_SIZE},
    section::Type,
};

use crate::{sink::SectionSink, SectionError};

/// Encodes `name` as UTF-16LE followed by a null terminator.
pub fn utf16_with_terminator(name: &str) -> Vec<u8> {
    name.encode_utf16().chain(iter::once(0)).flat_map(u16::to_le_bytes).collect()
}

fn check_size(section_type: Type, total: usize) -> Result<(), SectionError> {
    if total >= MAX_SECTION_SIZE {
        log::error!("Invalid parameter: the size of {section_type} section {total:#x} exceeds the maximum");
        Err(SectionError::SizeLimitExceeded(total))?;
    }
    Ok(())
}

/// Writes an `EFI_SECTION_VERSION` section with `build_number` and `name` to `sink`.
pub fn encode_version(build_number: u16, name: &str, sink: &mut dyn SectionSink) -> Result<usize, SectionError> {
    let name = utf16_with_terminator(name);
    let total = Version::SIZE + name.len();
    check_size(Type::Version, total)?;

    let header = Version { common: CommonHeader::new(Type::Version, total)?, build_number };
    sink.write(&header.serialize()?)?;
    sink.write(&name)?;
    log::info!("the size of the created section file is {total} bytes");
    Ok(total)
}

/// Writes an `EFI_SECTION_USER_INTERFACE` section naming the file `name` to `sink`.
///
/// The name must not be empty.
pub fn encode_user_interface(name: &str, sink: &mut dyn SectionSink) -> Result<usize, SectionError> {
    if name.is_empty() {
        log::error!("Missing option: user interface string");
        Err(SectionError::InvalidArgument)?;
    }
    let name = utf16_with_terminator(name);
    let total = CommonHeader::SIZE + name.len();
    check_size(Type::UserInterface, total)?;

    let header = CommonHeader::new(Type::UserInterface, total)?;
    sink.write(&header.serialize()?)?;
    sink.write(&name)?;
    log::info!("the size of the created section file is {total} bytes");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_utf16(bytes: &[u8]) -> String {
        let units: Vec<u16> = bytes.chunks_exact(2).map(|pair| u16::from_le_bytes([pair[0], pair[1]])).collect();
        let (terminator, text) = units.split_last().unwrap();
        assert_eq!(*terminator, 0);
        String::from_utf16(text).unwrap()
    }

    #[test]
    fn version_section_layout() {
        let mut sink = Vec::new();
        assert_eq!(encode_version(0x1234, "1.0", &mut sink), Ok(14));
        assert_eq!(
            sink,
            [
                0x0E, 0x00, 0x00, 0x14, //Header
                0x34, 0x12, //Build number
                0x31, 0x00, 0x2E, 0x00, 0x30, 0x00, 0x00, 0x00, //"1.0"
            ]
        );
    }

    #[test]
    fn version_section_decodes() {
        let mut sink = Vec::new();
        encode_version(9999, "Release Build", &mut sink).unwrap();
        let (header, name) = Version::parse(&sink).unwrap();
        assert_eq!(header.build_number, 9999);
        assert_eq!(decode_utf16(name), "Release Build");
    }

    #[test]
    fn version_section_with_empty_name_keeps_terminator() {
        let mut sink = Vec::new();
        assert_eq!(encode_version(0, "", &mut sink), Ok(8));
        assert_eq!(sink, [0x08, 0x00, 0x00, 0x14, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn user_interface_section_decodes() {
        let mut sink = Vec::new();
        assert_eq!(encode_user_interface("DxeCore", &mut sink), Ok(20));
        let (header, name) = CommonHeader::parse(&sink).unwrap();
        assert_eq!(header.section_type, Type::UserInterface);
        assert_eq!(decode_utf16(name), "DxeCore");
    }

    #[test]
    fn user_interface_requires_a_name() {
        let mut sink = Vec::new();
        assert_eq!(encode_user_interface("", &mut sink), Err(SectionError::InvalidArgument));
        assert!(sink.is_empty());
    }

    #[test]
    fn non_ascii_names_use_utf16() {
        assert_eq!(utf16_with_terminator("é"), [0xE9, 0x00, 0x00, 0x00]);
        assert_eq!(utf16_with_terminator("𝄞"), [0x34, 0xD8, 0x1E, 0xDD, 0x00, 0x00]);
    }

    #[test]
    fn oversized_name_is_rejected() {
        let name = "x".repeat(MAX_SECTION_SIZE / 2);
        let mut sink = Vec::new();
        assert_eq!(
            encode_user_interface(&name, &mut sink),
            Err(SectionError::SizeLimitExceeded(MAX_SECTION_SIZE + 6))
        );
        assert!(sink.is_empty());
    }
}
