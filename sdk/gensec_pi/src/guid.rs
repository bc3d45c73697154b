//! Well-known section GUIDs and GUID text helpers.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use core::fmt;

use r_efi::efi;

use crate::HeaderError;

/// `EFI_CRC32_GUIDED_SECTION_EXTRACTION_PROTOCOL_GUID`: GUID-defined sections carrying a CRC32 of their content.
pub const CRC32_SECTION: efi::Guid =
    efi::Guid::from_fields(0xFC1BCDB0, 0x7D31, 0x49aa, 0x93, 0x6A, &[0xA4, 0x60, 0x0D, 0x9D, 0xD0, 0x83]);

/// The all-zero GUID, treated by the section tools as "no GUID specified".
pub const ZERO: efi::Guid = efi::Guid::from_fields(0, 0, 0, 0, 0, &[0; 6]);

/// Parse a GUID in registry format (`00000000-0000-0000-0000-000000000000`).
///
/// Braces and the simple (undashed) form are accepted as well. The result uses the mixed-endian
/// in-memory layout of `EFI_GUID`.
pub fn parse_guid(text: &str) -> Result<efi::Guid, HeaderError> {
    let uuid = uuid::Uuid::parse_str(text.trim()).map_err(|_| HeaderError::InvalidGuid)?;
    Ok(efi::Guid::from_bytes(&uuid.to_bytes_le()))
}

/// Whether `guid` is the all-zero GUID.
pub fn is_zero(guid: &efi::Guid) -> bool {
    guid.as_bytes() == ZERO.as_bytes()
}

/// Displays an `efi::Guid` in registry format with upper-case hex digits.
pub struct GuidDisplay<'a>(pub &'a efi::Guid);

impl fmt::Display for GuidDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (time_low, time_mid, time_hi_and_version, clk_seq_hi_res, clk_seq_low, node) = self.0.as_fields();
        write!(f, "{time_low:08X}-{time_mid:04X}-{time_hi_and_version:04X}-{clk_seq_hi_res:02X}{clk_seq_low:02X}-")?;
        for byte in node {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}
