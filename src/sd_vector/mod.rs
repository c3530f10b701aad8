//! Sparse bit vector (Elias-Fano style high/low split).
//!
//! A vector of `n` bits with `m` ones stores each one position `p` as
//!
//! - a low part `p & (2^wl - 1)` in an [`IntVector`] of width `wl`
//! - a high part `p >> wl`, encoded by setting bit `(p >> wl) + k` of a bit
//!   vector of `m + 2^logm` bits, where `k` is the index of the one
//!
//! Select over the high vector recovers positions; select over its zeros
//! locates the bucket of ones sharing a high part, which rank searches by
//! low part.

mod builder;

pub use builder::SdVectorBuilder;

use builder::{high_part, split_widths};

use crate::bits::{self, WORD_BITS};
use crate::error::{Error, Result};
use crate::int_vector::serialize::read_u64_le;
use crate::int_vector::{BitVector, IntVector};
use crate::rank_select::{BitPattern, SelectIndex};
use crate::storage::Storage;
use std::io::Write;

/// Immutable sparse bit vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdVector {
    len: usize,
    wl: u8,
    low: IntVector,
    high: BitVector,
    high_1_select: SelectIndex,
    high_0_select: SelectIndex,
}

impl SdVector {
    /// Consume a full builder. The builder is left in its default (empty)
    /// state.
    pub fn from_builder(builder: &mut SdVectorBuilder) -> Result<Self> {
        if !builder.is_full() {
            return Err(Error::Precondition(format!(
                "builder is not full ({} of {} items)",
                builder.items(),
                builder.capacity()
            )));
        }
        let b = std::mem::take(builder);
        Ok(Self::from_parts(b.len, b.wl, b.low, b.high))
    }

    /// Sparse copy of a plain bit vector.
    pub fn from_bit_vector(bv: &BitVector) -> Self {
        let len = bv.len();
        let ones = bv.count_ones();
        let (wl, logm) = split_widths(len, ones);
        let mut low = IntVector::new(ones, 0, wl.max(1));
        let mut high = IntVector::bit_vector(ones + (1usize << logm));
        let mask = bits::lo_mask(wl as usize);
        let mut k = 0;
        for (idx, &word) in bv.words().iter().enumerate() {
            let mut w = word;
            while w != 0 {
                let pos = idx * WORD_BITS + w.trailing_zeros() as usize;
                w &= w - 1;
                high.set_bit(high_part(pos, wl) + k, true);
                low.set(k, pos as u64 & mask);
                k += 1;
            }
        }
        Self::from_parts(len, wl, low, high)
    }

    /// Vector of `len` bits with ones at `positions` (strictly increasing).
    pub fn from_positions<I>(len: usize, positions: I) -> Result<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        let positions: Vec<usize> = positions.into_iter().collect();
        let mut builder = SdVectorBuilder::new(len, positions.len())?;
        for pos in positions {
            builder.push(pos)?;
        }
        Self::from_builder(&mut builder)
    }

    fn from_parts(len: usize, wl: u8, low: IntVector, high: BitVector) -> Self {
        let high_1_select = SelectIndex::build(&high, BitPattern::One);
        let high_0_select = SelectIndex::build(&high, BitPattern::Zero);
        Self {
            len,
            wl,
            low,
            high,
            high_1_select,
            high_0_select,
        }
    }

    /// Length of the logical bit vector.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of ones.
    pub fn count_ones(&self) -> usize {
        self.low.len()
    }

    /// Width of the low part.
    pub fn low_width(&self) -> u8 {
        self.wl
    }

    /// Bit `i` of the logical vector.
    pub fn get(&self, i: usize) -> Result<bool> {
        if i >= self.len {
            return Err(Error::out_of_range(i, self.len));
        }
        Ok(self.rank_unchecked(i + 1) > self.rank_unchecked(i))
    }

    /// Ones in `[0, i)`, `i <= len`.
    pub fn rank(&self, i: usize) -> Result<usize> {
        if i > self.len {
            return Err(Error::out_of_range(i, self.len));
        }
        Ok(self.rank_unchecked(i))
    }

    /// Position of the `j`-th one, `j` in `[1, count_ones]`.
    pub fn select(&self, j: usize) -> Result<usize> {
        let m = self.count_ones();
        if j == 0 || j > m {
            return Err(Error::out_of_range(j, m));
        }
        let p = self.high_1_select.select_unchecked(self.high.words(), j);
        let k = j - 1;
        Ok(self.position(p - k, k))
    }

    /// Positions of all ones in increasing order.
    pub fn iter(&self) -> Ones<'_> {
        Ones {
            sd: self,
            word: 0,
            bits: self.high.words().first().copied().unwrap_or(0),
            k: 0,
        }
    }

    /// Decompress into a plain bit vector.
    pub fn to_bit_vector(&self) -> BitVector {
        let mut bv = IntVector::bit_vector(self.len);
        for p in self.iter() {
            bv.set_bit(p, true);
        }
        bv
    }

    fn position(&self, high: usize, k: usize) -> usize {
        let low = self.low.get(k) as usize;
        if self.wl as usize >= WORD_BITS {
            low
        } else {
            (high << self.wl) | low
        }
    }

    /// Range `[start, end)` of one indices whose high part is `h`.
    fn bucket(&self, h: usize) -> (usize, usize) {
        let words = self.high.words();
        let start = if h == 0 {
            0
        } else {
            self.high_0_select.select_unchecked(words, h) + 1 - h
        };
        let end = self.high_0_select.select_unchecked(words, h + 1) - h;
        (start, end)
    }

    fn rank_unchecked(&self, i: usize) -> usize {
        if i >= self.len {
            return self.count_ones();
        }
        let h = high_part(i, self.wl);
        let l = i as u64 & bits::lo_mask(self.wl as usize);
        let (start, end) = self.bucket(h);
        // low parts are increasing within a bucket
        let (mut lo, mut hi) = (start, end);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.low.get(mid) < l {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Approximate heap size in bytes, support indexes included.
    pub fn heap_size(&self) -> usize {
        self.low.heap_size()
            + self.high.heap_size()
            + self.high_1_select.heap_size()
            + self.high_0_select.heap_size()
    }

    /// Layout: `u64` length, `u8` low width, low vector, high vector.
    /// Support indexes are rebuilt on load.
    pub fn serialize<W: Write>(&self, out: &mut W) -> Result<usize> {
        out.write_all(&(self.len as u64).to_le_bytes())?;
        out.write_all(&[self.wl])?;
        let mut written = 9;
        written += self.low.serialize(out)?;
        written += self.high.serialize(out)?;
        Ok(written)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<(Self, usize)> {
        let len = read_u64_le(bytes, 0)? as usize;
        let wl = *bytes
            .get(8)
            .ok_or_else(|| Error::Format("sd_vector: missing low width".to_string()))?;
        let mut at = 9;
        let (low, used) = IntVector::deserialize(&bytes[at..])?;
        at += used;
        let (high, used) = IntVector::deserialize(&bytes[at..])?;
        at += used;

        if low.len() > len {
            return Err(Error::Format(format!(
                "sd_vector: {} ones in {} bits",
                low.len(),
                len
            )));
        }
        let (expected_wl, logm) = split_widths(len, low.len());
        let high_ones: usize = high.words().iter().map(|&w| bits::popcount(w) as usize).sum();
        if wl != expected_wl
            || high.width() != 1
            || high.len() != low.len() + (1usize << logm)
            || high_ones != low.len()
        {
            return Err(Error::Format(format!(
                "sd_vector: inconsistent layout (len {}, ones {}, wl {}, high {})",
                len,
                low.len(),
                wl,
                high.len()
            )));
        }
        Ok((Self::from_parts(len, wl, low, high), at))
    }

    pub fn store_to_file(&self, storage: &Storage, file: &str) -> Result<()> {
        let mut sink = storage.create(file)?;
        self.serialize(&mut sink)?;
        sink.finish()
    }

    pub fn load_from_file(storage: &Storage, file: &str) -> Result<Self> {
        let source = storage.open(file)?;
        let (sd, _) = Self::deserialize(&source)?;
        Ok(sd)
    }
}

impl TryFrom<SdVectorBuilder> for SdVector {
    type Error = Error;

    fn try_from(mut builder: SdVectorBuilder) -> Result<Self> {
        Self::from_builder(&mut builder)
    }
}

impl Default for SdVector {
    fn default() -> Self {
        Self::from_bit_vector(&IntVector::bit_vector(0))
    }
}

/// Iterator over the one positions of an [`SdVector`].
pub struct Ones<'a> {
    sd: &'a SdVector,
    word: usize,
    bits: u64,
    k: usize,
}

impl Iterator for Ones<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.k >= self.sd.count_ones() {
            return None;
        }
        let words = self.sd.high.words();
        while self.bits == 0 {
            self.word += 1;
            self.bits = *words.get(self.word)?;
        }
        let p = self.word * WORD_BITS + self.bits.trailing_zeros() as usize;
        self.bits &= self.bits - 1;
        let k = self.k;
        self.k += 1;
        Some(self.sd.position(p - k, k))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.sd.count_ones() - self.k;
        (rest, Some(rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_positions() {
        let positions = vec![0usize, 3, 4, 17, 64, 65, 500, 999];
        let sd = SdVector::from_positions(1000, positions.clone()).unwrap();
        assert_eq!(sd.count_ones(), positions.len());
        for (j, &p) in positions.iter().enumerate() {
            assert_eq!(sd.select(j + 1).unwrap(), p);
            assert!(sd.get(p).unwrap());
            assert_eq!(sd.rank(p).unwrap(), j);
            assert_eq!(sd.rank(p + 1).unwrap(), j + 1);
        }
        assert!(!sd.get(1).unwrap());
        assert!(!sd.get(998).unwrap());
        assert_eq!(sd.rank(1000).unwrap(), positions.len());
        assert_eq!(sd.iter().collect::<Vec<_>>(), positions);
    }

    #[test]
    fn test_matches_plain_vector() {
        let mut bv = IntVector::bit_vector(4000);
        for i in (0..4000).filter(|i| i % 13 == 0 || i % 29 == 1) {
            bv.set_bit(i, true);
        }
        let sd = SdVector::from_bit_vector(&bv);
        let mut ones = 0;
        for i in 0..4000 {
            assert_eq!(sd.rank(i).unwrap(), ones, "rank {}", i);
            assert_eq!(sd.get(i).unwrap(), bv.get_bit(i), "get {}", i);
            ones += bv.get_bit(i) as usize;
        }
        assert_eq!(sd.to_bit_vector(), bv);
    }

    #[test]
    fn test_dense_and_empty() {
        let full = SdVector::from_positions(8, 0..8).unwrap();
        assert_eq!(full.iter().collect::<Vec<_>>(), (0..8).collect::<Vec<_>>());
        assert_eq!(full.rank(5).unwrap(), 5);

        let empty = SdVector::from_positions(50, std::iter::empty()).unwrap();
        assert_eq!(empty.rank(50).unwrap(), 0);
        assert!(!empty.get(10).unwrap());
        assert!(empty.select(1).is_err());
        assert_eq!(empty.iter().count(), 0);

        let none = SdVector::default();
        assert!(none.is_empty());
        assert_eq!(none.rank(0).unwrap(), 0);
    }

    #[test]
    fn test_builder_is_consumed() {
        let mut b = SdVectorBuilder::new(20, 2).unwrap();
        b.push(3).unwrap();
        assert!(matches!(
            SdVector::from_builder(&mut b),
            Err(Error::Precondition(_))
        ));
        b.push(7).unwrap();
        let sd = SdVector::from_builder(&mut b).unwrap();
        assert_eq!(sd.iter().collect::<Vec<_>>(), vec![3, 7]);
        assert_eq!(b.capacity(), 0);
        assert_eq!(b.items(), 0);
        assert_eq!(b.len(), 0);
    }

    #[test]
    fn test_serialize() {
        let sd = SdVector::from_positions(10_000, (0..10_000).step_by(37)).unwrap();
        let mut bytes = Vec::new();
        let written = sd.serialize(&mut bytes).unwrap();
        assert_eq!(written, bytes.len());
        let (back, used) = SdVector::deserialize(&bytes).unwrap();
        assert_eq!(used, bytes.len());
        assert_eq!(back, sd);

        bytes[8] ^= 1;
        assert!(SdVector::deserialize(&bytes).is_err());
    }
}
