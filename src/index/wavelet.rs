//! Wavelet matrix over an integer sequence.
//!
//! Level `l` stores bit `levels - 1 - l` of every symbol, in the order the
//! symbols reach that level: a stable partition by the previous level's bit,
//! zeros first. Access and rank walk down the levels using block-indexed
//! rank on each level's bit vector.

use super::csa::PlainSuffixArray;
use super::IntAlphabet;
use crate::bits;
use crate::cache::{AlphabetWidth, CacheConfig, Persist};
use crate::construct::{CacheConstructible, IndexCategory};
use crate::error::{Error, Result};
use crate::int_vector::serialize::read_u64_le;
use crate::int_vector::{BitVector, IntVector, IntVectorReader};
use crate::rank_select::{BitPattern, RankIndex};
use std::io::Write;

#[derive(Debug, Clone)]
struct Level {
    bits: BitVector,
    ones: RankIndex,
    zeros: usize,
}

impl Level {
    fn new(bits: BitVector) -> Self {
        let ones = RankIndex::build(&bits, BitPattern::One);
        let zeros = bits.len() - ones.total();
        Self { bits, ones, zeros }
    }

    #[inline]
    fn rank1(&self, i: usize) -> usize {
        self.ones.rank_unchecked(self.bits.words(), i)
    }

    /// Position of row `i` one level down, given its bit here.
    #[inline]
    fn descend(&self, i: usize, bit: bool) -> usize {
        if bit {
            self.zeros + self.rank1(i)
        } else {
            i - self.rank1(i)
        }
    }
}

/// Wavelet matrix; symbols may be any `u64` up to the largest in the input.
#[derive(Debug, Clone, Default)]
pub struct WaveletMatrix {
    len: usize,
    levels: Vec<Level>,
}

impl WaveletMatrix {
    pub fn from_values(values: &[u64]) -> Self {
        let len = values.len();
        let max = values.iter().copied().max().unwrap_or(0);
        let depth = if len == 0 { 0 } else { bits::bit_len(max).max(1) as usize };

        let mut current = values.to_vec();
        let mut next = Vec::with_capacity(len);
        let mut levels = Vec::with_capacity(depth);
        for l in 0..depth {
            let shift = depth - 1 - l;
            let mut bv = IntVector::bit_vector(len);
            for (i, &v) in current.iter().enumerate() {
                bv.set_bit(i, (v >> shift) & 1 == 1);
            }
            next.clear();
            next.extend(current.iter().copied().filter(|v| (v >> shift) & 1 == 0));
            next.extend(current.iter().copied().filter(|v| (v >> shift) & 1 == 1));
            std::mem::swap(&mut current, &mut next);
            levels.push(Level::new(bv));
        }
        Self { len, levels }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bits per symbol.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Symbol at position `i`.
    pub fn access(&self, i: usize) -> Result<u64> {
        if i >= self.len {
            return Err(Error::out_of_range(i, self.len));
        }
        let mut value = 0u64;
        let mut i = i;
        for level in &self.levels {
            let bit = level.bits.get_bit(i);
            value = (value << 1) | bit as u64;
            i = level.descend(i, bit);
        }
        Ok(value)
    }

    /// Occurrences of `c` in `[0, i)`.
    pub fn rank(&self, c: u64, i: usize) -> Result<usize> {
        if i > self.len {
            return Err(Error::out_of_range(i, self.len));
        }
        let depth = self.depth();
        if depth < 64 && c >> depth != 0 {
            return Ok(0);
        }
        let (mut start, mut end) = (0usize, i);
        for (l, level) in self.levels.iter().enumerate() {
            let bit = (c >> (depth - 1 - l)) & 1 == 1;
            start = level.descend(start, bit);
            end = level.descend(end, bit);
        }
        Ok(end - start)
    }

    /// Decode the whole sequence.
    pub fn to_vec(&self) -> Vec<u64> {
        (0..self.len).filter_map(|i| self.access(i).ok()).collect()
    }

    pub fn heap_size(&self) -> usize {
        self.levels
            .iter()
            .map(|l| l.bits.heap_size() + l.ones.heap_size())
            .sum()
    }
}

impl PartialEq for WaveletMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self.levels.len() == other.levels.len()
            && self
                .levels
                .iter()
                .zip(&other.levels)
                .all(|(a, b)| a.bits == b.bits)
    }
}

impl Eq for WaveletMatrix {}

impl Persist for WaveletMatrix {
    fn persist<W: Write>(&self, out: &mut W) -> Result<usize> {
        out.write_all(&(self.len as u64).to_le_bytes())?;
        out.write_all(&[self.levels.len() as u8])?;
        let mut written = 9;
        for level in &self.levels {
            written += level.bits.serialize(out)?;
        }
        Ok(written)
    }

    fn restore(bytes: &[u8]) -> Result<(Self, usize)> {
        let len = read_u64_le(bytes, 0)? as usize;
        let depth = *bytes
            .get(8)
            .ok_or_else(|| Error::Format("wavelet matrix: missing depth".to_string()))?;
        let mut at = 9;
        let mut levels = Vec::with_capacity(depth as usize);
        for l in 0..depth {
            let (bv, used) = IntVector::deserialize(&bytes[at..])?;
            if bv.width() != 1 || bv.len() != len {
                return Err(Error::Format(format!(
                    "wavelet matrix: level {} has {} elements of width {}, expected {} bits",
                    l,
                    bv.len(),
                    bv.width(),
                    len
                )));
            }
            at += used;
            levels.push(Level::new(bv));
        }
        Ok((Self { len, levels }, at))
    }
}

impl CacheConstructible for WaveletMatrix {
    const CATEGORY: IndexCategory = IndexCategory::Wt;
    const ALPHABET: AlphabetWidth = AlphabetWidth::Integer;
    type Csa = PlainSuffixArray<IntAlphabet>;

    fn from_cache(_config: &CacheConfig) -> Result<Self> {
        Err(Error::Precondition(
            "a wavelet matrix is built from its text, not from cached artifacts".to_string(),
        ))
    }

    fn from_text(text: &mut IntVectorReader) -> Result<Self> {
        let values: Vec<u64> = text.iter().collect();
        Ok(Self::from_values(&values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_and_rank() {
        let values = [5u64, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5];
        let wm = WaveletMatrix::from_values(&values);
        assert_eq!(wm.depth(), 4);
        assert_eq!(wm.to_vec(), values.to_vec());
        for c in 0..12u64 {
            for i in 0..=values.len() {
                let expected = values[..i].iter().filter(|&&v| v == c).count();
                assert_eq!(wm.rank(c, i).unwrap(), expected, "rank({}, {})", c, i);
            }
        }
        assert!(wm.access(11).is_err());
        assert!(wm.rank(5, 12).is_err());
    }

    #[test]
    fn test_empty_and_constant() {
        let empty = WaveletMatrix::from_values(&[]);
        assert!(empty.is_empty());
        assert_eq!(empty.rank(0, 0).unwrap(), 0);

        let zeros = WaveletMatrix::from_values(&[0, 0, 0]);
        assert_eq!(zeros.depth(), 1);
        assert_eq!(zeros.rank(0, 3).unwrap(), 3);
        assert_eq!(zeros.rank(1, 3).unwrap(), 0);
    }

    #[test]
    fn test_persist() {
        let wm = WaveletMatrix::from_values(&[3, 1, 4, 1, 5]);
        let mut bytes = Vec::new();
        let written = wm.persist(&mut bytes).unwrap();
        assert_eq!(written, bytes.len());
        let (back, used) = WaveletMatrix::restore(&bytes).unwrap();
        assert_eq!(used, bytes.len());
        assert_eq!(back, wm);
        assert_eq!(back.access(4).unwrap(), 5);
    }
}
