//! Word-level bit kernels.
//!
//! Every bit-twiddling primitive used by the rank/select layer and the
//! sparse encoding lives here. Bit `i` of a word is `(w >> i) & 1`, so
//! position 0 of a bit vector is the least significant bit of word 0.

/// Number of bits in a storage word.
pub const WORD_BITS: usize = 64;

/// Mask with the lowest `n` bits set (`n` in `0..=64`).
#[inline]
pub fn lo_mask(n: usize) -> u64 {
    if n >= WORD_BITS {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

/// Number of bits needed to write `x` in binary; 0 for 0.
///
/// Equivalent to `floor(log2 x) + 1` for `x > 0`.
#[inline]
pub fn bit_len(x: u64) -> u8 {
    (WORD_BITS as u32 - x.leading_zeros()) as u8
}

/// Population count of a word.
#[inline]
pub fn popcount(w: u64) -> u32 {
    w.count_ones()
}

/// Position of the `k`-th set bit (0-based) in `w`.
///
/// The caller guarantees `k < popcount(w)`.
#[inline]
pub fn select_in_word(mut w: u64, k: u32) -> u32 {
    debug_assert!(k < w.count_ones());
    for _ in 0..k {
        w &= w - 1;
    }
    w.trailing_zeros()
}

/// Marks every position `i` with `bit[i-1] == 1` and `bit[i] == 0`.
///
/// `carry` is the bit preceding position 0 of this word.
#[inline]
pub fn map10(w: u64, carry: u64) -> u64 {
    ((w << 1) | carry) & !w
}

/// Marks every position `i` with `bit[i-1] == 0` and `bit[i] == 1`.
#[inline]
pub fn map01(w: u64, carry: u64) -> u64 {
    !((w << 1) | carry) & w
}

/// Number of `u64` words needed to hold `bits` bits.
#[inline]
pub fn words_for(bits: usize) -> usize {
    bits.div_ceil(WORD_BITS)
}

/// Read `width` bits starting at absolute bit offset `offset`.
#[inline]
pub fn read_bits(data: &[u64], offset: usize, width: u8) -> u64 {
    let width = width as usize;
    let word = offset / WORD_BITS;
    let shift = offset % WORD_BITS;
    let mut value = data[word] >> shift;
    if shift + width > WORD_BITS {
        value |= data[word + 1] << (WORD_BITS - shift);
    }
    value & lo_mask(width)
}

/// Write the lowest `width` bits of `value` at absolute bit offset `offset`.
#[inline]
pub fn write_bits(data: &mut [u64], offset: usize, width: u8, value: u64) {
    let width = width as usize;
    let value = value & lo_mask(width);
    let word = offset / WORD_BITS;
    let shift = offset % WORD_BITS;
    let mask = lo_mask(width) << shift;
    data[word] = (data[word] & !mask) | (value << shift);
    if shift + width > WORD_BITS {
        let spill = shift + width - WORD_BITS;
        let hi_mask = lo_mask(spill);
        data[word + 1] = (data[word + 1] & !hi_mask) | (value >> (WORD_BITS - shift));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_len() {
        assert_eq!(bit_len(0), 0);
        assert_eq!(bit_len(1), 1);
        assert_eq!(bit_len(2), 2);
        assert_eq!(bit_len(255), 8);
        assert_eq!(bit_len(256), 9);
        assert_eq!(bit_len(u64::MAX), 64);
    }

    #[test]
    fn test_select_in_word() {
        let w = 0b1010_0110u64;
        assert_eq!(select_in_word(w, 0), 1);
        assert_eq!(select_in_word(w, 1), 2);
        assert_eq!(select_in_word(w, 2), 5);
        assert_eq!(select_in_word(w, 3), 7);
    }

    #[test]
    fn test_pattern_maps() {
        // bits (lsb first): 1 1 0 0 1 0
        let w = 0b01_0011u64;
        // "10" ends at positions 2 and 5
        assert_eq!(map10(w, 0) & lo_mask(6), 0b10_0100);
        // "01" ends at position 4; carry 1 suppresses position 0
        assert_eq!(map01(w, 1) & lo_mask(6), 0b01_0000);
        // with carry 0 position 0 would count as "01"
        assert_eq!(map01(w, 0) & lo_mask(6), 0b01_0001);
    }

    #[test]
    fn test_read_write_across_words() {
        let mut data = vec![0u64; 2];
        write_bits(&mut data, 60, 10, 0b11_0110_1011);
        assert_eq!(read_bits(&data, 60, 10), 0b11_0110_1011);
        write_bits(&mut data, 0, 64, u64::MAX);
        assert_eq!(read_bits(&data, 0, 64), u64::MAX);
        assert_eq!(read_bits(&data, 60, 10), 0b11_0110_1111);
    }
}
