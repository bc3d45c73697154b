//! MSB-first bit packing.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use alloc::vec::Vec;

use bitvec::{field::BitField, order::Msb0, vec::BitVec};

/// Packs values into bytes, most significant bit first.
#[derive(Default)]
pub(crate) struct BitWriter {
    bits: BitVec<u8, Msb0>,
}

impl BitWriter {
    /// Append the low `count` bits of `value`.
    pub(crate) fn put(&mut self, count: u8, value: u32) {
        if count == 0 {
            return;
        }
        let start = self.bits.len();
        self.bits.resize(start + count as usize, false);
        self.bits[start..].store_be(value);
    }

    /// Flush the pending bits, zero padding the last byte.
    pub(crate) fn finish(mut self) -> Vec<u8> {
        let padded = self.bits.len().next_multiple_of(8);
        self.bits.resize(padded, false);
        self.bits.into_vec()
    }
}
