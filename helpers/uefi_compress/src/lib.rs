//! Implementation of the UEFI standard compression algorithm (EFI 1.1 compression).
//!
//! The format is an LZ77 stream whose literals, match lengths and match positions are Huffman coded in
//! blocks. A compressed image starts with two little-endian `u32` values, the compressed payload size and the
//! original size, followed by the payload bitstream (most significant bit first) and [`TRAILING_ZEROS`] zero
//! bytes. Images are decoded by the standard UEFI decompressor.
//!
//! ## Example
//!
//! ```
//! use uefi_decompress::{decompress_into_with_algo, DecompressionAlgorithm};
//!
//! let data = b"firmware firmware firmware firmware";
//! let image = uefi_compress::compress(data).unwrap();
//!
//! let mut decompressed = vec![0u8; data.len()];
//! decompress_into_with_algo(&image, &mut decompressed, DecompressionAlgorithm::UefiDecompress).unwrap();
//! assert_eq!(decompressed, data);
//! ```
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod bits;
mod compress;
mod err;
mod huffman;

pub use compress::{compress, compress_into};
pub use err::CompressError;

/// Size of the image header: compressed size followed by original size.
pub const HEADER_SIZE: usize = 8;

/// Zero bytes following the bitstream, counted in the compressed size.
///
/// Decoders peek up to 16 bits from the start of each code, so the last code must be followed by at least two
/// bytes of image.
pub const TRAILING_ZEROS: usize = 4;

// Minimum match length is THRESHOLD; shorter repeats are emitted as literals.
const THRESHOLD: usize = 3;
const MAX_MATCH: usize = 256;
const WINDOW_BITS: u32 = 13;
const WINDOW_SIZE: usize = 1 << WINDOW_BITS;

// Literal/length alphabet: 256 literals followed by match lengths THRESHOLD..=MAX_MATCH.
const NC: usize = u8::MAX as usize + MAX_MATCH + 2 - THRESHOLD;
const CBIT: u8 = 9;
// Position alphabet: bit length of (distance - 1).
const NP: usize = WINDOW_BITS as usize + 1;
const PBIT: u8 = 4;
// Code-length alphabet used to transmit the literal/length code lengths.
const NT: usize = 16 + 3;
const TBIT: u8 = 5;

const MAX_CODE_LENGTH: u8 = 16;
