//! Compressor: greedy LZ77 over a hash-chained window, then per-block Huffman coding.
//!
//! ## License
//!
//! Copyright (c) Microsoft Corporation.
//!
//! SPDX-License-Identifier: Apache-2.0
//!
use alloc::{vec, vec::Vec};

use crate::{
    bits::BitWriter,
    huffman::{canonical_codes, code_lengths, used_symbols},
    CompressError, CBIT, HEADER_SIZE, MAX_MATCH, NC, NP, NT, PBIT, TBIT, THRESHOLD, TRAILING_ZEROS, WINDOW_SIZE,
};

const HASH_BITS: u32 = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;
const MAX_CHAIN: usize = 256;
const NIL: usize = usize::MAX;

/// Tokens per Huffman block.
const BLOCK_TOKENS: usize = 0x4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Literal(u8),
    /// `position` is the match distance minus one.
    Match { length: usize, position: usize },
}

impl Token {
    fn symbol(self) -> usize {
        match self {
            Token::Literal(byte) => byte as usize,
            Token::Match { length, .. } => length + u8::MAX as usize + 1 - THRESHOLD,
        }
    }
}

/// Number of significant bits in a match position, which is the symbol of the position code.
fn position_symbol(position: usize) -> usize {
    (usize::BITS - position.leading_zeros()) as usize
}

struct Matcher<'a> {
    data: &'a [u8],
    head: Vec<usize>,
    prev: Vec<usize>,
}

impl<'a> Matcher<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, head: vec![NIL; HASH_SIZE], prev: vec![NIL; WINDOW_SIZE] }
    }

    fn hash(&self, position: usize) -> usize {
        let bytes = &self.data[position..position + THRESHOLD];
        (((bytes[0] as usize) << 10) ^ ((bytes[1] as usize) << 5) ^ bytes[2] as usize) & (HASH_SIZE - 1)
    }

    fn insert(&mut self, position: usize) {
        if position + THRESHOLD > self.data.len() {
            return;
        }
        let hash = self.hash(position);
        self.prev[position & (WINDOW_SIZE - 1)] = self.head[hash];
        self.head[hash] = position;
    }

    /// Longest earlier occurrence of the bytes at `position` within the window, as `(length, distance)`.
    fn longest_match(&self, position: usize) -> Option<(usize, usize)> {
        if position + THRESHOLD > self.data.len() {
            return None;
        }
        let limit = MAX_MATCH.min(self.data.len() - position);
        let mut best = (0, 0);
        let mut candidate = self.head[self.hash(position)];
        let mut chain = 0;

        while candidate != NIL && chain < MAX_CHAIN {
            let distance = position - candidate;
            if distance > WINDOW_SIZE {
                break;
            }
            let length = self.data[candidate..]
                .iter()
                .zip(&self.data[position..position + limit])
                .take_while(|(earlier, current)| earlier == current)
                .count();
            if length > best.0 {
                best = (length, distance);
                if length == limit {
                    break;
                }
            }
            let next = self.prev[candidate & (WINDOW_SIZE - 1)];
            if next == NIL || next >= candidate {
                break;
            }
            candidate = next;
            chain += 1;
        }

        (best.0 >= THRESHOLD).then_some(best)
    }
}

fn tokenize(data: &[u8]) -> Vec<Token> {
    let mut matcher = Matcher::new(data);
    let mut tokens = Vec::new();
    let mut position = 0;
    while position < data.len() {
        match matcher.longest_match(position) {
            Some((length, distance)) => {
                tokens.push(Token::Match { length, position: distance - 1 });
                for covered in position..position + length {
                    matcher.insert(covered);
                }
                position += length;
            }
            None => {
                tokens.push(Token::Literal(data[position]));
                matcher.insert(position);
                position += 1;
            }
        }
    }
    tokens
}

/// Trimmed length of a code length table.
fn transmitted(lengths: &[u8]) -> usize {
    lengths.iter().rposition(|length| *length != 0).map_or(0, |last| last + 1)
}

/// Walk the literal/length code lengths the way they are transmitted, reporting each code-length symbol and
/// any extra bits that follow it.
fn for_each_length_symbol(c_lengths: &[u8], mut emit: impl FnMut(usize, Option<(u8, u32)>)) {
    let n = transmitted(c_lengths);
    let mut i = 0;
    while i < n {
        let length = c_lengths[i] as usize;
        i += 1;
        if length != 0 {
            emit(length + 2, None);
            continue;
        }
        let mut run = 1;
        while i < n && c_lengths[i] == 0 {
            i += 1;
            run += 1;
        }
        match run {
            1..=2 => (0..run).for_each(|_| emit(0, None)),
            3..=18 => emit(1, Some((4, run as u32 - 3))),
            19 => {
                emit(0, None);
                emit(1, Some((4, 15)));
            }
            _ => emit(2, Some((CBIT, run as u32 - 20))),
        }
    }
}

fn write_pt_lengths(writer: &mut BitWriter, lengths: &[u8], nbit: u8, special: Option<usize>) {
    let n = transmitted(lengths);
    writer.put(nbit, n as u32);
    let mut i = 0;
    while i < n {
        let length = lengths[i];
        i += 1;
        if length <= 6 {
            writer.put(3, length as u32);
        } else {
            // Lengths above six are sent as a run of ones terminated by a zero.
            writer.put(length - 3, (1 << (length - 3)) - 2);
        }
        if Some(i) == special {
            while i < 6 && lengths[i] == 0 {
                i += 1;
            }
            writer.put(2, (i as u32 - 3) & 3);
        }
    }
}

fn write_single(writer: &mut BitWriter, nbit: u8, frequencies: &[u32]) {
    let symbol = frequencies.iter().position(|frequency| *frequency > 0).unwrap_or(0);
    writer.put(nbit, 0);
    writer.put(nbit, symbol as u32);
}

fn encode_block(tokens: &[Token], writer: &mut BitWriter) {
    let mut c_freq = [0u32; NC];
    let mut p_freq = [0u32; NP];
    for token in tokens {
        c_freq[token.symbol()] += 1;
        if let Token::Match { position, .. } = token {
            p_freq[position_symbol(*position)] += 1;
        }
    }

    writer.put(16, tokens.len() as u32);

    let c_lengths = code_lengths(&c_freq);
    let c_codes = canonical_codes(&c_lengths);
    if used_symbols(&c_freq) >= 2 {
        let mut t_freq = [0u32; NT];
        for_each_length_symbol(&c_lengths, |symbol, _| t_freq[symbol] += 1);
        let t_lengths = code_lengths(&t_freq);
        let t_codes = canonical_codes(&t_lengths);
        if used_symbols(&t_freq) >= 2 {
            write_pt_lengths(writer, &t_lengths, TBIT, Some(3));
        } else {
            write_single(writer, TBIT, &t_freq);
        }
        writer.put(CBIT, transmitted(&c_lengths) as u32);
        for_each_length_symbol(&c_lengths, |symbol, extra| {
            writer.put(t_lengths[symbol], t_codes[symbol] as u32);
            if let Some((count, value)) = extra {
                writer.put(count, value);
            }
        });
    } else {
        writer.put(TBIT, 0);
        writer.put(TBIT, 0);
        write_single(writer, CBIT, &c_freq);
    }

    let p_lengths = code_lengths(&p_freq);
    let p_codes = canonical_codes(&p_lengths);
    if used_symbols(&p_freq) >= 2 {
        write_pt_lengths(writer, &p_lengths, PBIT, None);
    } else {
        write_single(writer, PBIT, &p_freq);
    }

    for token in tokens {
        let symbol = token.symbol();
        writer.put(c_lengths[symbol], c_codes[symbol] as u32);
        if let Token::Match { position, .. } = *token {
            let p_symbol = position_symbol(position);
            writer.put(p_lengths[p_symbol], p_codes[p_symbol] as u32);
            if p_symbol > 1 {
                writer.put(p_symbol as u8 - 1, (position & ((1 << (p_symbol - 1)) - 1)) as u32);
            }
        }
    }
}

/// Frame the bitstream in `writer` as an image of `original_size` bytes.
fn image(original_size: u32, writer: BitWriter) -> Result<Vec<u8>, CompressError> {
    let mut payload = writer.finish();
    payload.resize(payload.len() + TRAILING_ZEROS, 0);

    let compressed_size =
        u32::try_from(payload.len()).map_err(|_| CompressError::InputTooLarge(original_size as usize))?;
    let mut image = Vec::with_capacity(HEADER_SIZE + payload.len());
    image.extend_from_slice(&compressed_size.to_le_bytes());
    image.extend_from_slice(&original_size.to_le_bytes());
    image.extend_from_slice(&payload);
    Ok(image)
}

/// Compress `source` into a newly allocated image.
///
/// ## Errors
///
/// Returns [`CompressError::InputTooLarge`] if `source` does not fit the 32-bit size fields of the image header.
pub fn compress(source: &[u8]) -> Result<Vec<u8>, CompressError> {
    let original_size = u32::try_from(source.len()).map_err(|_| CompressError::InputTooLarge(source.len()))?;

    let tokens = tokenize(source);
    let mut writer = BitWriter::default();
    if tokens.is_empty() {
        encode_block(&[], &mut writer);
    }
    for block in tokens.chunks(BLOCK_TOKENS) {
        encode_block(block, &mut writer);
    }
    image(original_size, writer)
}

/// Compress `source` into `destination`, returning the size of the image.
///
/// ## Errors
///
/// Returns [`CompressError::BufferTooSmall`] with the size of the complete image if `destination` is shorter
/// than it. `destination` is left untouched in that case.
pub fn compress_into(source: &[u8], destination: &mut [u8]) -> Result<usize, CompressError> {
    let image = compress(source)?;
    if destination.len() < image.len() {
        Err(CompressError::BufferTooSmall { required: image.len() })?;
    }
    destination[..image.len()].copy_from_slice(&image);
    Ok(image.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use uefi_decompress::{decompress_into_with_algo, DecompressError, DecompressionAlgorithm};

    fn decompress(image: &[u8]) -> Result<Vec<u8>, DecompressError> {
        let original_size = u32::from_le_bytes(image[4..8].try_into().unwrap()) as usize;
        let mut data = vec![0u8; original_size];
        decompress_into_with_algo(image, &mut data, DecompressionAlgorithm::UefiDecompress)?;
        Ok(data)
    }

    fn assert_round_trip(data: &[u8]) {
        let image = compress(data).unwrap();
        let compressed_size = u32::from_le_bytes(image[0..4].try_into().unwrap()) as usize;
        assert_eq!(compressed_size, image.len() - HEADER_SIZE);
        assert_eq!(&image[image.len() - TRAILING_ZEROS..], &[0; TRAILING_ZEROS]);
        match decompress(&image) {
            Ok(decompressed) => assert_eq!(decompressed, data, "length {}", data.len()),
            Err(err) => panic!("{err:?} decompressing {} bytes: {image:02X?}", data.len()),
        }
    }

    #[test]
    fn single_literal_image() {
        let image = compress(&[0x41]).unwrap();
        assert_eq!(
            image,
            [
                0x0B, 0x00, 0x00, 0x00, //Compressed size
                0x01, 0x00, 0x00, 0x00, //Original size
                0x00, 0x01, //Block size
                0x00, 0x00, 0x04, 0x10, 0x00, //Trees and (zero-length) codes
                0x00, 0x00, 0x00, 0x00, //Trailing zeros
            ]
        );
        assert_eq!(decompress(&image).unwrap(), [0x41]);
    }

    #[test]
    fn empty_input() {
        let image = compress(&[]).unwrap();
        assert_eq!(&image[4..8], &[0, 0, 0, 0]);
        assert_round_trip(&[]);
    }

    #[test]
    fn short_code_at_the_end_decodes() {
        // The last code of these images ends right before a byte boundary.
        assert_round_trip(&[0, 1, 2]);
        assert_round_trip(b"AB");
        assert_round_trip(&[0xFF; 4]);
    }

    #[test]
    fn every_short_length_decodes() {
        let mut rng = StdRng::seed_from_u64(0x0E_D6E5);
        let mut random = vec![0u8; 600];
        rng.fill(&mut random[..]);
        let counting: Vec<u8> = (0..600u32).map(|i| i as u8).collect();
        let text = b"SECTION ".repeat(75);

        for length in 0..600 {
            assert_round_trip(&random[..length]);
            assert_round_trip(&counting[..length]);
            assert_round_trip(&text[..length]);
        }
    }

    #[test]
    fn boundary_lengths_decode() {
        let mut rng = StdRng::seed_from_u64(0xB0_0DA2);
        let mut data = vec![0u8; 2 * WINDOW_SIZE + MAX_MATCH + 2];
        rng.fill(&mut data[..]);
        for length in [
            HEADER_SIZE - 1,
            HEADER_SIZE,
            HEADER_SIZE + 1,
            MAX_MATCH - 1,
            MAX_MATCH,
            MAX_MATCH + 1,
            WINDOW_SIZE - 1,
            WINDOW_SIZE,
            WINDOW_SIZE + 1,
            2 * WINDOW_SIZE + MAX_MATCH + 2,
        ] {
            assert_round_trip(&data[..length]);
            assert_round_trip(&vec![0xA5; length]);
        }
    }

    #[test]
    fn text_shrinks() {
        let text = b"EFI_SECTION_RAW EFI_SECTION_PE32 EFI_SECTION_RAW EFI_SECTION_TE EFI_SECTION_RAW ".repeat(64);
        let image = compress(&text).unwrap();
        assert!(image.len() < text.len() / 4);
        assert_round_trip(&text);
    }

    #[test]
    fn random_data_decodes() {
        let mut rng = StdRng::seed_from_u64(0x5EC7_1011);
        for size in [1usize, 2, 3, 255, 4096, 70_000] {
            let mut data = vec![0u8; size];
            rng.fill(&mut data[..]);
            assert_round_trip(&data);
        }
        // Random bytes are mostly literals, so this spans several blocks.
        let mut data = vec![0u8; 3 * BLOCK_TOKENS];
        rng.fill(&mut data[..]);
        assert!(tokenize(&data).len() > 2 * BLOCK_TOKENS);
        assert_round_trip(&data);
    }

    #[test]
    fn structured_data_decodes() {
        // Mix of short-alphabet runs and far repeats, spanning several blocks and window positions.
        let mut rng = StdRng::seed_from_u64(42);
        let mut data = Vec::new();
        while data.len() < 200_000 {
            match rng.gen_range(0..4) {
                0 => data.extend(core::iter::repeat(rng.gen::<u8>()).take(rng.gen_range(1..700))),
                1 if data.len() > 10 => {
                    let start = rng.gen_range(0..data.len() - 5);
                    let end = (start + rng.gen_range(3..300)).min(data.len());
                    let repeat = data[start..end].to_vec();
                    data.extend_from_slice(&repeat);
                }
                _ => data.extend((0..rng.gen_range(1..40)).map(|_| rng.gen_range(b'a'..=b'f'))),
            }
        }
        let image = compress(&data).unwrap();
        assert!(image.len() < data.len());
        assert_round_trip(&data);
    }

    #[test]
    fn tokenizer_finds_repeats() {
        let tokens = tokenize(b"abcabcabcX");
        assert_eq!(
            tokens,
            [
                Token::Literal(b'a'),
                Token::Literal(b'b'),
                Token::Literal(b'c'),
                Token::Match { length: 6, position: 2 },
                Token::Literal(b'X'),
            ]
        );
    }

    #[test]
    fn matches_are_capped() {
        let data = [0x5Au8; 600];
        let tokens = tokenize(&data);
        assert_eq!(tokens[0], Token::Literal(0x5A));
        assert_eq!(tokens[1], Token::Match { length: MAX_MATCH, position: 0 });
        assert_eq!(tokens[2], Token::Match { length: MAX_MATCH, position: 0 });
        assert_eq!(tokens[3], Token::Match { length: 600 - 1 - 2 * MAX_MATCH, position: 0 });
        assert_eq!(Token::Match { length: MAX_MATCH, position: 0 }.symbol(), NC - 1);
        assert_eq!(Token::Match { length: THRESHOLD, position: 0 }.symbol(), 256);
    }

    #[test]
    fn position_symbols() {
        assert_eq!(position_symbol(0), 0);
        assert_eq!(position_symbol(1), 1);
        assert_eq!(position_symbol(2), 2);
        assert_eq!(position_symbol(3), 2);
        assert_eq!(position_symbol(WINDOW_SIZE - 1), NP - 1);
    }

    #[test]
    fn compress_into_reports_required_size() {
        let source = b"The quick brown fox jumps over the lazy dog. The quick brown fox.";
        let image = compress(source).unwrap();

        let mut small = [0xEEu8; 8];
        assert_eq!(compress_into(source, &mut small), Err(CompressError::BufferTooSmall { required: image.len() }));
        assert_eq!(small, [0xEE; 8]);

        let mut exact = vec![0u8; image.len() + 4];
        assert_eq!(compress_into(source, &mut exact), Ok(image.len()));
        assert_eq!(&exact[..image.len()], image.as_slice());
    }

    #[test]
    fn back_reference_before_start_is_rejected() {
        let mut writer = BitWriter::default();
        encode_block(&[Token::Literal(b'A'), Token::Match { length: 3, position: 1 }], &mut writer);
        let invalid = image(4, writer).unwrap();
        assert!(matches!(decompress(&invalid), Err(DecompressError::MalformedSrcData)));

        // The same block is valid once the reference points at the literal.
        let mut writer = BitWriter::default();
        encode_block(&[Token::Literal(b'A'), Token::Match { length: 3, position: 0 }], &mut writer);
        let valid = image(4, writer).unwrap();
        assert_eq!(decompress(&valid).unwrap(), b"AAAA");
    }
}
