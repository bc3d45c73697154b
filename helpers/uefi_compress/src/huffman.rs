//! Canonical Huffman codes limited to 16-bit code lengths.
//!
//! Codes are assigned in symbol order within each length, shortest lengths first, which is the assignment the
//! UEFI decompressor reconstructs from the transmitted code lengths.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use alloc::{collections::BinaryHeap, vec, vec::Vec};
use core::cmp::Reverse;

use crate::MAX_CODE_LENGTH;

const NIL: usize = usize::MAX;

/// Number of symbols with a non-zero frequency.
pub(crate) fn used_symbols(frequencies: &[u32]) -> usize {
    frequencies.iter().filter(|frequency| **frequency > 0).count()
}

/// Huffman code lengths for `frequencies`, each at most 16 bits.
///
/// Fewer than two used symbols need no code at all, so every length is zero in that case.
pub(crate) fn code_lengths(frequencies: &[u32]) -> Vec<u8> {
    let mut lengths = vec![0u8; frequencies.len()];
    if used_symbols(frequencies) < 2 {
        return lengths;
    }

    let mut weights = frequencies.to_vec();
    loop {
        assign_lengths(&weights, &mut lengths);
        if lengths.iter().all(|length| *length <= MAX_CODE_LENGTH) {
            return lengths;
        }
        // Flatten the distribution until the tree is shallow enough.
        for weight in weights.iter_mut().filter(|weight| **weight > 0) {
            *weight = (*weight).div_ceil(2);
        }
    }
}

fn assign_lengths(weights: &[u32], lengths: &mut [u8]) {
    let mut parent = vec![NIL; weights.len()];
    let mut heap = BinaryHeap::new();
    for (symbol, weight) in weights.iter().enumerate().filter(|(_, weight)| **weight > 0) {
        heap.push(Reverse((*weight as u64, symbol)));
    }

    while heap.len() > 1 {
        let (Some(Reverse((left_weight, left))), Some(Reverse((right_weight, right)))) = (heap.pop(), heap.pop())
        else {
            break;
        };
        let node = parent.len();
        parent.push(NIL);
        parent[left] = node;
        parent[right] = node;
        heap.push(Reverse((left_weight + right_weight, node)));
    }

    for (symbol, length) in lengths.iter_mut().enumerate() {
        *length = 0;
        if weights[symbol] == 0 {
            continue;
        }
        let mut depth = 0u32;
        let mut node = symbol;
        while parent[node] != NIL {
            node = parent[node];
            depth += 1;
        }
        *length = depth.min(u8::MAX as u32) as u8;
    }
}

/// Canonical codes for `lengths`. Symbols with a zero length get code zero and are never emitted.
pub(crate) fn canonical_codes(lengths: &[u8]) -> Vec<u16> {
    let mut count = [0u32; MAX_CODE_LENGTH as usize + 2];
    for length in lengths.iter().filter(|length| **length > 0) {
        count[*length as usize] += 1;
    }
    let mut next = [0u32; MAX_CODE_LENGTH as usize + 2];
    for length in 1..=MAX_CODE_LENGTH as usize {
        next[length + 1] = (next[length] + count[length]) << 1;
    }

    lengths
        .iter()
        .map(|length| match *length {
            0 => 0,
            length => {
                let code = next[length as usize];
                next[length as usize] += 1;
                code as u16
            }
        })
        .collect()
}
