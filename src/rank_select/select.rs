//! Sampled select on top of [`RankIndex`] counts.
//!
//! Every 4096-th match records the superblock it falls in. A query jumps to
//! its sample, binary-searches the superblock counts up to the next sample,
//! then walks the block counts and selects inside one word.

use super::rank_v::BLOCKS_PER_SUPERBLOCK;
use super::{require_bit_vector, BitPattern, RankIndex, Select};
use crate::bits::{self, WORD_BITS};
use crate::error::{Error, Result};
use crate::int_vector::BitVector;

/// Sampling interval for select (every 4096 matches).
const SELECT_SAMPLE_RATE: usize = 4096;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectIndex {
    rank: RankIndex,
    /// `samples[t]` = superblock holding match `t * 4096 + 1`.
    samples: Vec<u32>,
}

impl SelectIndex {
    pub fn build(v: &BitVector, pattern: BitPattern) -> Self {
        let rank = RankIndex::build(v, pattern);
        let superblocks = rank.superblocks();
        let mut samples = Vec::new();
        for s in 0..rank.superblock_count() {
            while ((samples.len() * SELECT_SAMPLE_RATE + 1) as u64) <= superblocks[s + 1] {
                samples.push(s as u32);
            }
        }
        Self { rank, samples }
    }

    pub fn pattern(&self) -> BitPattern {
        self.rank.pattern()
    }

    pub fn len(&self) -> usize {
        self.rank.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rank.is_empty()
    }

    pub fn total(&self) -> usize {
        self.rank.total()
    }

    /// Rank counts shared with select.
    pub fn rank_index(&self) -> &RankIndex {
        &self.rank
    }

    /// Position of the `j`-th match in `v`, `j` in `[1, total]`.
    pub fn select(&self, v: &BitVector, j: usize) -> Result<usize> {
        self.rank.check(v)?;
        if j == 0 || j > self.rank.total() {
            return Err(Error::out_of_range(j, self.rank.total()));
        }
        Ok(self.select_unchecked(v.words(), j))
    }

    pub(crate) fn select_unchecked(&self, words: &[u64], j: usize) -> usize {
        let superblocks = self.rank.superblocks();
        let blocks = self.rank.blocks();
        let target = j as u64;

        let t = (j - 1) / SELECT_SAMPLE_RATE;
        let lo = self.samples[t] as usize;
        let hi = self
            .samples
            .get(t + 1)
            .map(|&s| s as usize)
            .unwrap_or(self.rank.superblock_count() - 1);
        let s = lo + superblocks[lo..=hi].partition_point(|&c| c < target) - 1;

        let remaining = (target - superblocks[s]) as usize;
        let first = s * BLOCKS_PER_SUPERBLOCK;
        let last = (first + BLOCKS_PER_SUPERBLOCK).min(blocks.len());
        let k = first + blocks[first..last].partition_point(|&c| (c as usize) < remaining) - 1;

        let local = remaining - blocks[k] as usize;
        let m = self.rank.pattern().word_matches(words, k, self.rank.len());
        k * WORD_BITS + bits::select_in_word(m, (local - 1) as u32) as usize
    }

    pub fn heap_size(&self) -> usize {
        self.rank.heap_size() + self.samples.len() * 4
    }
}

/// [`SelectIndex`] bound to a borrowed vector.
#[derive(Debug, Clone, Default)]
pub struct SelectSupport<'a> {
    v: Option<&'a BitVector>,
    index: SelectIndex,
}

impl<'a> SelectSupport<'a> {
    /// Index `v`, which must have width 1.
    pub fn new(v: &'a BitVector, pattern: BitPattern) -> Result<Self> {
        require_bit_vector(v)?;
        Ok(Self {
            v: Some(v),
            index: SelectIndex::build(v, pattern),
        })
    }

    pub fn with_index(v: &'a BitVector, index: SelectIndex) -> Self {
        Self { v: Some(v), index }
    }

    pub fn set_vector(&mut self, v: &'a BitVector) {
        self.v = Some(v);
    }

    pub fn index(&self) -> &SelectIndex {
        &self.index
    }

    pub fn into_index(self) -> SelectIndex {
        self.index
    }
}

impl Select for SelectSupport<'_> {
    fn select(&self, j: usize) -> Result<usize> {
        let v = self.v.ok_or(Error::Unbound)?;
        self.index.select(v, j)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::int_vector::IntVector;
    use crate::rank_select::scan::{scan_rank, scan_select};

    #[test]
    fn test_matches_scan_sparse_and_dense() {
        let len = 20_000;
        for step in [1usize, 2, 3, 97] {
            let mut v = IntVector::bit_vector(len);
            for i in (0..len).step_by(step) {
                v.set_bit(i, true);
            }
            for pattern in [
                BitPattern::Zero,
                BitPattern::One,
                BitPattern::OneZero,
                BitPattern::ZeroOne,
            ] {
                let index = SelectIndex::build(&v, pattern);
                let total = scan_rank(&v, pattern, len);
                assert_eq!(index.total(), total);
                for j in (1..=total).step_by(7).chain(std::iter::once(total).filter(|&t| t > 0)) {
                    assert_eq!(
                        index.select(&v, j).unwrap(),
                        scan_select(&v, pattern, j).unwrap(),
                        "step {} pattern {} j {}",
                        step,
                        pattern,
                        j
                    );
                }
            }
        }
    }

    #[test]
    fn test_select_inverts_rank() {
        let mut v = IntVector::bit_vector(5000);
        for i in [0usize, 1, 64, 511, 512, 4095, 4096, 4999] {
            v.set_bit(i, true);
        }
        let index = SelectIndex::build(&v, BitPattern::One);
        for j in 1..=index.total() {
            let p = index.select(&v, j).unwrap();
            assert!(v.get_bit(p));
            assert_eq!(index.rank_index().rank(&v, p + 1).unwrap(), j);
        }
    }

    #[test]
    fn test_out_of_range() {
        let v = IntVector::from_bools(&[true, false, true]);
        let support = SelectSupport::new(&v, BitPattern::One).unwrap();
        assert_eq!(support.select(2).unwrap(), 2);
        assert!(matches!(
            support.select(0),
            Err(Error::OutOfRange { index: 0, bound: 2 })
        ));
        assert!(matches!(
            support.select(3),
            Err(Error::OutOfRange { index: 3, bound: 2 })
        ));

        let empty = IntVector::bit_vector(0);
        let support = SelectSupport::new(&empty, BitPattern::Zero).unwrap();
        assert!(support.select(1).is_err());
        assert!(matches!(SelectSupport::default().select(1), Err(Error::Unbound)));
    }

    #[test]
    fn test_rejects_wide_vectors() {
        let text = IntVector::from_bytes(b"abc");
        assert!(matches!(
            SelectSupport::new(&text, BitPattern::One),
            Err(Error::Precondition(_))
        ));
    }
}
