//! Width-parameterized integer sequences.
//!
//! [`IntVector`] packs `len` integers of `width` bits each (1 to 64) into
//! 64-bit words. It is the storage unit for texts, suffix arrays, LCP
//! arrays and, at width 1, bit vectors.
//!
//! ## Modules
//!
//! - `serialize`: binary layout (header + packed payload), vbyte and
//!   variable-length encodings
//! - `coder`: universal codes used by the variable-length encoding
//! - `buffer`: streaming reader/writer with a bounded window

pub mod buffer;
pub mod coder;
pub mod serialize;

pub use buffer::{IntVectorReader, IntVectorWriter, DEFAULT_BUFFER_SIZE};
pub use coder::{Coder, EliasDelta, EliasGamma};
pub use serialize::Encoding;

use crate::bits::{self, WORD_BITS};

/// A bit vector is an integer vector of width 1.
pub type BitVector = IntVector;

/// Packed array of fixed-width unsigned integers.
///
/// Bits past `len * width` in the last word are always zero.
#[derive(Clone, PartialEq, Eq)]
pub struct IntVector {
    len: usize,
    width: u8,
    data: Vec<u64>,
}

impl IntVector {
    /// `len` copies of `value` stored with `width` bits each.
    pub fn new(len: usize, value: u64, width: u8) -> Self {
        let width = clamp_width(width);
        let mut v = Self {
            len,
            width,
            data: vec![0; bits::words_for(len * width as usize)],
        };
        if value != 0 {
            for i in 0..len {
                v.set(i, value);
            }
        }
        v
    }

    /// Empty vector with the given element width.
    pub fn with_width(width: u8) -> Self {
        Self::new(0, 0, width)
    }

    /// All-zero bit vector of `len` bits.
    pub fn bit_vector(len: usize) -> BitVector {
        Self::new(len, 0, 1)
    }

    /// Bit vector from booleans.
    pub fn from_bools(bools: &[bool]) -> BitVector {
        let mut bv = Self::bit_vector(bools.len());
        for (i, &b) in bools.iter().enumerate() {
            if b {
                bv.set_bit(i, true);
            }
        }
        bv
    }

    /// Bit vector over raw words; bits at `len` and above are cleared.
    pub fn from_words(mut words: Vec<u64>, len: usize) -> BitVector {
        words.resize(bits::words_for(len), 0);
        let mut bv = Self {
            len,
            width: 1,
            data: words,
        };
        bv.clear_tail();
        bv
    }

    /// Bit-compressed copy of `values` (width = bits of the maximum).
    pub fn from_slice(values: &[u64]) -> Self {
        let max = values.iter().copied().max().unwrap_or(0);
        let mut v = Self::new(values.len(), 0, bits::bit_len(max).max(1));
        for (i, &x) in values.iter().enumerate() {
            v.set(i, x);
        }
        v
    }

    /// Byte sequence stored at width 8.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut v = Self::new(bytes.len(), 0, 8);
        for (i, &b) in bytes.iter().enumerate() {
            v.set(i, b as u64);
        }
        v
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Number of payload bits (`len * width`).
    #[inline]
    pub fn bit_size(&self) -> usize {
        self.len * self.width as usize
    }

    /// Backing words, little end first.
    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.data
    }

    /// Element `i`. Panics if `i >= len`.
    #[inline]
    pub fn get(&self, i: usize) -> u64 {
        assert!(i < self.len, "index {} out of bounds (len {})", i, self.len);
        bits::read_bits(&self.data, i * self.width as usize, self.width)
    }

    /// Element `i`, or `None` past the end.
    #[inline]
    pub fn try_get(&self, i: usize) -> Option<u64> {
        (i < self.len).then(|| self.get(i))
    }

    /// Overwrite element `i` with the low `width` bits of `value`.
    #[inline]
    pub fn set(&mut self, i: usize, value: u64) {
        assert!(i < self.len, "index {} out of bounds (len {})", i, self.len);
        debug_assert!(
            value <= bits::lo_mask(self.width as usize),
            "value {} does not fit in {} bits",
            value,
            self.width
        );
        bits::write_bits(&mut self.data, i * self.width as usize, self.width, value);
    }

    #[inline]
    pub fn get_bit(&self, i: usize) -> bool {
        debug_assert_eq!(self.width, 1);
        assert!(i < self.len, "index {} out of bounds (len {})", i, self.len);
        (self.data[i / WORD_BITS] >> (i % WORD_BITS)) & 1 == 1
    }

    #[inline]
    pub fn set_bit(&mut self, i: usize, bit: bool) {
        debug_assert_eq!(self.width, 1);
        assert!(i < self.len, "index {} out of bounds (len {})", i, self.len);
        let mask = 1u64 << (i % WORD_BITS);
        if bit {
            self.data[i / WORD_BITS] |= mask;
        } else {
            self.data[i / WORD_BITS] &= !mask;
        }
    }

    /// Append one element.
    pub fn push(&mut self, value: u64) {
        let needed = bits::words_for((self.len + 1) * self.width as usize);
        if needed > self.data.len() {
            self.data.push(0);
        }
        self.len += 1;
        self.set(self.len - 1, value);
    }

    /// Grow with zeros or truncate to `len` elements.
    pub fn resize(&mut self, len: usize) {
        self.len = len;
        self.data.resize(bits::words_for(len * self.width as usize), 0);
        self.clear_tail();
    }

    /// Re-pack every element with a new width; values are truncated to fit.
    pub fn set_width(&mut self, width: u8) {
        let width = clamp_width(width);
        if width == self.width {
            return;
        }
        let mut packed = IntVector::new(self.len, 0, width);
        let mask = bits::lo_mask(width as usize);
        for i in 0..self.len {
            packed.set(i, self.get(i) & mask);
        }
        *self = packed;
    }

    /// Shrink the width to the fewest bits holding the maximum element.
    pub fn bit_compress(&mut self) {
        let max = self.max_value();
        self.set_width(bits::bit_len(max).max(1));
    }

    pub fn max_value(&self) -> u64 {
        self.iter().max().unwrap_or(0)
    }

    /// Number of set bits over the whole payload.
    pub fn count_ones(&self) -> usize {
        self.data.iter().map(|w| bits::popcount(*w) as usize).sum()
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter { v: self, pos: 0 }
    }

    pub fn to_vec(&self) -> Vec<u64> {
        self.iter().collect()
    }

    /// Approximate heap size in bytes.
    pub fn heap_size(&self) -> usize {
        self.data.len() * 8
    }

    fn clear_tail(&mut self) {
        let bits_used = self.bit_size();
        let rem = bits_used % WORD_BITS;
        if rem != 0 {
            if let Some(last) = self.data.last_mut() {
                *last &= bits::lo_mask(rem);
            }
        }
    }
}

fn clamp_width(width: u8) -> u8 {
    width.clamp(1, WORD_BITS as u8)
}

impl Default for IntVector {
    fn default() -> Self {
        Self::with_width(64)
    }
}

impl std::fmt::Debug for IntVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntVector")
            .field("len", &self.len)
            .field("width", &self.width)
            .field("values", &self.iter().take(32).collect::<Vec<_>>())
            .finish()
    }
}

/// Iterator over the elements of an [`IntVector`].
pub struct Iter<'a> {
    v: &'a IntVector,
    pos: usize,
}

impl Iterator for Iter<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let item = self.v.try_get(self.pos)?;
        self.pos += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.v.len - self.pos;
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a IntVector {
    type Item = u64;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_widths() {
        for width in [1u8, 3, 7, 8, 13, 32, 63, 64] {
            let mask = bits::lo_mask(width as usize);
            let mut v = IntVector::new(100, 0, width);
            for i in 0..100 {
                v.set(i, (i as u64 * 0x9E37_79B9_7F4A_7C15) & mask);
            }
            for i in 0..100 {
                assert_eq!(v.get(i), (i as u64 * 0x9E37_79B9_7F4A_7C15) & mask);
            }
        }
    }

    #[test]
    fn test_fill_value() {
        let v = IntVector::new(10, 5, 3);
        assert!(v.iter().all(|x| x == 5));
        assert_eq!(v.bit_size(), 30);
    }

    #[test]
    fn test_push_and_resize_keep_tail_clear() {
        let mut bv = IntVector::bit_vector(0);
        for i in 0..70 {
            bv.push((i % 2) as u64);
        }
        assert_eq!(bv.len(), 70);
        assert_eq!(bv.count_ones(), 35);

        bv.resize(65);
        assert_eq!(bv.count_ones(), 32);
        assert_eq!(bv.words()[1] >> 1, 0);

        bv.resize(128);
        assert_eq!(bv.count_ones(), 32);
        assert!(!bv.get_bit(127));
    }

    #[test]
    fn test_from_words_masks_tail() {
        let bv = IntVector::from_words(vec![u64::MAX, u64::MAX], 70);
        assert_eq!(bv.count_ones(), 70);
        assert_eq!(bv.words()[1], 0b11_1111);
    }

    #[test]
    fn test_bit_compress() {
        let mut v = IntVector::new(4, 0, 64);
        v.set(0, 3);
        v.set(3, 1000);
        v.bit_compress();
        assert_eq!(v.width(), 10);
        assert_eq!(v.to_vec(), vec![3, 0, 0, 1000]);

        let mut zeros = IntVector::new(3, 0, 64);
        zeros.bit_compress();
        assert_eq!(zeros.width(), 1);
    }

    #[test]
    fn test_from_slice_and_bytes() {
        let v = IntVector::from_slice(&[6, 5, 3, 1, 0, 4, 2]);
        assert_eq!(v.width(), 3);
        assert_eq!(v.to_vec(), vec![6, 5, 3, 1, 0, 4, 2]);

        let t = IntVector::from_bytes(b"banana\0");
        assert_eq!(t.width(), 8);
        assert_eq!(t.get(0), b'b' as u64);
        assert_eq!(t.get(6), 0);
    }

    #[test]
    fn test_equality_ignores_capacity() {
        let mut a = IntVector::from_slice(&[1, 2, 3]);
        a.push(2);
        let b = IntVector::from_slice(&[1, 2, 3, 2]);
        assert_eq!(a.len(), b.len());
        assert_eq!(a, b);
    }

    #[test]
    #[should_panic]
    fn test_get_out_of_bounds_panics() {
        let v = IntVector::new(3, 0, 8);
        v.get(3);
    }
}
