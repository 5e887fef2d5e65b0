//! Unpacking of block state palette indices from section long arrays
//!
//! Minecraft stores the palette index of each of the 4096 blocks of a chunk section as fixed width
//! unsigned integers packed into 64 bit words, least significant bits first. Two conventions exist:
//!
//! - **Dense** (1.13 to 1.15): the values form one contiguous bit string, so a value may start in one
//!   word and end in the next. The width follows from the length of the array.
//! - **Padded** (1.16 onwards): each word holds `64 / bits` whole values and its remaining high bits
//!   are unused. The width follows from the size of the palette.
//!
//! The words are taken as `i64` since that is how they are decoded from a `TAG_Long_Array`, but are
//! treated as unsigned bit strings throughout.

use tracing::{instrument, trace};

use crate::error::{Error, Result};

/// Number of blocks in one 16x16x16 section
pub const INDICES_PER_SECTION: usize = 4096;

/// Number of values produced by each call to [`DenseIndexDecoder::next64`]
pub const BLOCK_LEN: usize = 64;

#[inline(always)]
fn mask(bits: usize) -> u64 {
    u64::MAX >> (64 - bits)
}

/// Width of one densely packed index, derived from the length of the array
pub fn bits_per_index(words: &[i64]) -> usize {
    words.len() * 64 / INDICES_PER_SECTION
}

/// Extract the densely packed value at `index`
///
/// Index `i` of a block is `x | (z << 4) | (y << 8)`.
///
/// # Panics
///
/// Panics if `bits` is not in `1..=64` or if the value lies past the end of `words`.
pub fn extract_dense(words: &[i64], index: usize, bits: usize) -> u64 {
    let start_bit = (bits * index) & 63;
    let start_word = (bits * index) >> 6;
    let end_word = (bits * (index + 1) - 1) >> 6;

    let low = (words[start_word] as u64) >> start_bit;
    if start_word == end_word {
        low & mask(bits)
    } else {
        (low | (words[end_word] as u64) << (64 - start_bit)) & mask(bits)
    }
}

/// Width of one padded index for a palette of `palette_size` entries, never less than 4
pub fn padded_bits_per_index(palette_size: usize) -> usize {
    let needed = usize::BITS - palette_size.saturating_sub(1).leading_zeros();
    (needed as usize).max(4)
}

/// Unpack all 4096 padded values of a section
///
/// Values past the 4096th, and words past the last one needed, are ignored.
#[instrument(skip(words), fields(words = words.len()), err)]
pub fn extract_padded(words: &[i64], palette_size: usize) -> Result<Vec<u64>> {
    if palette_size == 0 {
        return Err(Error::InvalidPaletteSize(palette_size));
    }

    let bits = padded_bits_per_index(palette_size);
    let per_word = 64 / bits;
    if words.len() < INDICES_PER_SECTION.div_ceil(per_word) {
        return Err(Error::InvalidWordCount(words.len()));
    }
    trace!(bits, per_word, "unpacking padded indices");

    let mut out = vec![0u64; INDICES_PER_SECTION];
    match bits {
        4 => unpack_padded::<4>(words, &mut out),
        5 => unpack_padded::<5>(words, &mut out),
        6 => unpack_padded::<6>(words, &mut out),
        _ => unpack_padded_with(words, &mut out, bits),
    }
    Ok(out)
}

fn unpack_padded<const BITS: usize>(words: &[i64], out: &mut [u64]) {
    unpack_padded_with(words, out, BITS)
}

#[inline(always)]
fn unpack_padded_with(words: &[i64], out: &mut [u64], bits: usize) {
    // the final word may hold fewer values than the others, chunks_mut stops there
    for (values, word) in out.chunks_mut(64 / bits).zip(words) {
        let word = *word as u64;
        for (k, value) in values.iter_mut().enumerate() {
            *value = (word >> (k * bits)) & mask(bits);
        }
    }
}

fn unpack_dense<const BITS: usize>(block: &[i64], out: &mut [u64; BLOCK_LEN]) {
    unpack_dense_with(block, out, BITS)
}

#[inline(always)]
fn unpack_dense_with(block: &[i64], out: &mut [u64; BLOCK_LEN], bits: usize) {
    for (i, value) in out.iter_mut().enumerate() {
        *value = extract_dense(block, i, bits);
    }
}

/// Streaming decoder for densely packed sections
///
/// Every 64 consecutive values occupy exactly `bits` words, so the array is decoded one such block
/// at a time into a buffer that is reused between calls.
///
/// ```
/// # fn doit() -> anvil_region::error::Result<()>
/// # {
/// use anvil_region::palette::DenseIndexDecoder;
///
/// let words = vec![0x1111_1111_1111_1111i64; 256];
/// let mut decoder = DenseIndexDecoder::new(&words)?;
/// assert_eq!(decoder.bits_per_index(), 4);
///
/// let mut count = 0;
/// while let Some(block) = decoder.next64() {
///     assert!(block.iter().all(|v| *v == 1));
///     count += block.len();
/// }
/// assert_eq!(count, 4096);
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct DenseIndexDecoder<'a> {
    words: &'a [i64],
    bits: usize,
    block: usize,
    buffer: [u64; BLOCK_LEN],
}

impl<'a> DenseIndexDecoder<'a> {
    /// Create a decoder, the length of `words` must be a non-zero multiple of 64 of at most 4096
    pub fn new(words: &'a [i64]) -> Result<Self> {
        if words.is_empty() || words.len() % BLOCK_LEN != 0 || words.len() > INDICES_PER_SECTION {
            return Err(Error::InvalidWordCount(words.len()));
        }

        Ok(DenseIndexDecoder {
            words,
            bits: bits_per_index(words),
            block: 0,
            buffer: [0; BLOCK_LEN],
        })
    }

    pub fn bits_per_index(&self) -> usize {
        self.bits
    }

    /// Decode the next 64 values, `None` once all 4096 have been produced
    ///
    /// The returned buffer is overwritten by the following call.
    pub fn next64(&mut self) -> Option<&[u64; BLOCK_LEN]> {
        if self.block == INDICES_PER_SECTION / BLOCK_LEN {
            return None;
        }

        let bits = self.bits;
        let block = &self.words[self.block * bits..(self.block + 1) * bits];
        match bits {
            4 => unpack_dense::<4>(block, &mut self.buffer),
            5 => unpack_dense::<5>(block, &mut self.buffer),
            6 => unpack_dense::<6>(block, &mut self.buffer),
            _ => unpack_dense_with(block, &mut self.buffer, bits),
        }

        self.block += 1;
        Some(&self.buffer)
    }

    /// Decode every remaining value
    pub fn decode_all(mut self) -> Vec<u64> {
        let mut out = Vec::with_capacity(INDICES_PER_SECTION);
        while let Some(block) = self.next64() {
            out.extend_from_slice(block);
        }
        out
    }
}
