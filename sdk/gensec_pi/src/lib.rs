//! Firmware file section definitions as described in the UEFI Platform Initialization Specification.
//!
//! This crate provides the section type, compression type and GUID-defined attribute enumerations
//! used by firmware file sections, the well-known section GUIDs, and a little-endian codec for the
//! section header layouts.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod err;
pub mod guid;
pub mod header;
pub mod section;

pub use err::HeaderError;
