//! Generation of firmware file sections as described in the UEFI Platform Initialization Specification.
//!
//! A section is built from one or more named input blobs:
//!
//! - leaf sections (`EFI_SECTION_RAW`, `EFI_SECTION_PE32`, ...) wrap a single blob in a common header,
//! - compression and GUID-defined sections encapsulate the aggregated inputs,
//! - version and user interface sections carry a string and take no inputs,
//! - `EFI_SECTION_ALL` writes the aggregated inputs without any header.
//!
//! Inputs come from a [`BlobSource`](source::BlobSource) and the section is written to a
//! [`SectionSink`](sink::SectionSink). [`SectionConfig`] validates user options into a [`SectionRequest`] and
//! [`SectionGenerator`] runs the matching encoder.
//!
//! ## Example
//!
//! ```
//! use gensec::{source::MemoryBlobSource, SectionConfig, SectionGenerator};
//! use gensec_pi::section::Type;
//!
//! let source = MemoryBlobSource::new().with_blob("payload.bin", &[0xAA; 10]);
//! let config = SectionConfig {
//!     section_type: Type::Raw,
//!     inputs: vec![String::from("payload.bin")],
//!     ..Default::default()
//! };
//! let request = config.to_request().unwrap();
//!
//! let mut section = Vec::new();
//! let size = SectionGenerator::new(&source).generate(&request, &config.input_names(), &mut section).unwrap();
//! assert_eq!(size, 14);
//! assert_eq!(&section[..4], &[0x0E, 0x00, 0x00, 0x19]);
//! ```
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

extern crate alloc;

pub mod aggregate;
pub mod compress;
pub mod compression;
pub mod config;
pub mod err;
pub mod guid_defined;
pub mod leaf;
pub mod request;
pub mod sink;
pub mod source;
pub mod string;

pub use config::SectionConfig;
pub use err::SectionError;
pub use request::{SectionGenerator, SectionRequest};
