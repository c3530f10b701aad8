//! Constant-time rank.
//!
//! # Layout
//!
//! - Superblock counts: one `u64` per 512 bits, matches before the superblock
//! - Block counts: one `u16` per 64-bit word, matches from the superblock
//!   start to the word
//!
//! A query is two table lookups plus one popcount over the mapped word.

use super::{require_bit_vector, BitPattern, Rank};
use crate::bits::{self, WORD_BITS};
use crate::error::{Error, Result};
use crate::int_vector::BitVector;

/// Number of bits per superblock (8 words).
pub(crate) const SUPERBLOCK_BITS: usize = 512;

pub(crate) const BLOCKS_PER_SUPERBLOCK: usize = SUPERBLOCK_BITS / WORD_BITS;

/// Precomputed counts for one bit vector and pattern.
///
/// The index does not hold the vector. Queries take the vector explicitly
/// and fail with [`Error::StaleSupport`] when its length differs from the
/// one the index was built for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankIndex {
    pattern: BitPattern,
    len: usize,
    /// `superblocks[s]` = matches in `[0, s * 512)`; one trailing sentinel.
    superblocks: Vec<u64>,
    blocks: Vec<u16>,
    total: usize,
}

impl RankIndex {
    pub fn build(v: &BitVector, pattern: BitPattern) -> Self {
        let words = v.words();
        let len = v.len();
        let mut superblocks = Vec::with_capacity(words.len() / BLOCKS_PER_SUPERBLOCK + 2);
        let mut blocks = Vec::with_capacity(words.len());

        let mut cumulative = 0u64;
        let mut superblock_start = 0u64;
        for k in 0..words.len() {
            if k % BLOCKS_PER_SUPERBLOCK == 0 {
                superblocks.push(cumulative);
                superblock_start = cumulative;
            }
            blocks.push((cumulative - superblock_start) as u16);
            cumulative += bits::popcount(pattern.word_matches(words, k, len)) as u64;
        }
        superblocks.push(cumulative);

        Self {
            pattern,
            len,
            superblocks,
            blocks,
            total: cumulative as usize,
        }
    }

    pub fn pattern(&self) -> BitPattern {
        self.pattern
    }

    /// Length of the vector the index was built for.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Matches over the whole vector.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Matches ending in `[0, i)` of `v`.
    pub fn rank(&self, v: &BitVector, i: usize) -> Result<usize> {
        self.check(v)?;
        if i > self.len {
            return Err(Error::out_of_range(i, self.len));
        }
        Ok(self.rank_unchecked(v.words(), i))
    }

    pub(crate) fn check(&self, v: &BitVector) -> Result<()> {
        require_bit_vector(v)?;
        if v.len() != self.len {
            return Err(Error::StaleSupport {
                expected: self.len,
                actual: v.len(),
            });
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn rank_unchecked(&self, words: &[u64], i: usize) -> usize {
        if i >= self.len {
            return self.total;
        }
        let k = i / WORD_BITS;
        let m = self.pattern.word_matches(words, k, self.len) & bits::lo_mask(i % WORD_BITS);
        self.superblocks[k / BLOCKS_PER_SUPERBLOCK] as usize
            + self.blocks[k] as usize
            + bits::popcount(m) as usize
    }

    /// Number of real superblocks (the sentinel excluded).
    pub(crate) fn superblock_count(&self) -> usize {
        self.superblocks.len() - 1
    }

    pub(crate) fn superblocks(&self) -> &[u64] {
        &self.superblocks
    }

    pub(crate) fn blocks(&self) -> &[u16] {
        &self.blocks
    }

    /// Auxiliary space in bytes.
    pub fn heap_size(&self) -> usize {
        self.superblocks.len() * 8 + self.blocks.len() * 2
    }
}

/// [`RankIndex`] bound to a borrowed vector.
///
/// A default-constructed support is unbound; [`set_vector`](Self::set_vector)
/// rebinds it, for example after the vector was moved.
#[derive(Debug, Clone, Default)]
pub struct RankSupport<'a> {
    v: Option<&'a BitVector>,
    index: RankIndex,
}

impl<'a> RankSupport<'a> {
    /// Index `v`, which must have width 1.
    pub fn new(v: &'a BitVector, pattern: BitPattern) -> Result<Self> {
        require_bit_vector(v)?;
        Ok(Self {
            v: Some(v),
            index: RankIndex::build(v, pattern),
        })
    }

    /// Bind an existing index to `v`.
    pub fn with_index(v: &'a BitVector, index: RankIndex) -> Self {
        Self { v: Some(v), index }
    }

    pub fn set_vector(&mut self, v: &'a BitVector) {
        self.v = Some(v);
    }

    pub fn index(&self) -> &RankIndex {
        &self.index
    }

    pub fn into_index(self) -> RankIndex {
        self.index
    }
}

impl Rank for RankSupport<'_> {
    fn rank(&self, i: usize) -> Result<usize> {
        let v = self.v.ok_or(Error::Unbound)?;
        self.index.rank(v, i)
    }

    fn size(&self) -> Result<usize> {
        Ok(self.v.ok_or(Error::Unbound)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::int_vector::IntVector;
    use crate::rank_select::scan::scan_rank;

    fn pseudo_random_bits(len: usize, seed: u64) -> BitVector {
        let mut x = seed;
        let mut bv = IntVector::bit_vector(len);
        for i in 0..len {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            bv.set_bit(i, x % 3 == 0);
        }
        bv
    }

    #[test]
    fn test_matches_scan_for_all_patterns() {
        for len in [0usize, 1, 63, 64, 65, 511, 512, 513, 2000] {
            let v = pseudo_random_bits(len, 0x2545_F491_4F6C_DD1D + len as u64);
            for pattern in [
                BitPattern::Zero,
                BitPattern::One,
                BitPattern::OneZero,
                BitPattern::ZeroOne,
            ] {
                let index = RankIndex::build(&v, pattern);
                for i in 0..=len {
                    assert_eq!(
                        index.rank(&v, i).unwrap(),
                        scan_rank(&v, pattern, i),
                        "len {} pattern {} i {}",
                        len,
                        pattern,
                        i
                    );
                }
            }
        }
    }

    #[test]
    fn test_stale_and_unbound() {
        let v = pseudo_random_bits(100, 7);
        let w = pseudo_random_bits(101, 7);
        let index = RankIndex::build(&v, BitPattern::One);
        assert!(matches!(
            index.rank(&w, 0),
            Err(Error::StaleSupport {
                expected: 100,
                actual: 101
            })
        ));

        let unbound = RankSupport::default();
        assert!(matches!(unbound.rank(0), Err(Error::Unbound)));
    }

    #[test]
    fn test_rebind_after_move() {
        let v = pseudo_random_bits(300, 11);
        let expected = scan_rank(&v, BitPattern::One, 300);
        let index = RankSupport::new(&v, BitPattern::One).unwrap().into_index();

        let moved = v;
        let mut support = RankSupport::default();
        assert!(support.rank(10).is_err());
        support = RankSupport::with_index(&moved, index);
        assert_eq!(support.rank(300).unwrap(), expected);

        let copy = moved.clone();
        support.set_vector(&copy);
        assert_eq!(support.rank(300).unwrap(), expected);
        assert!(support.rank(301).is_err());
    }

    #[test]
    fn test_rejects_wide_vectors() {
        let bytes = IntVector::from_bytes(b"\xff\x00\xff");
        assert!(matches!(
            RankSupport::new(&bytes, BitPattern::One),
            Err(Error::Precondition(_))
        ));

        // an index built elsewhere refuses a wide vector too
        let bits = IntVector::bit_vector(24);
        let index = RankIndex::build(&bits, BitPattern::One);
        let wide = IntVector::new(24, 0, 8);
        assert!(matches!(index.rank(&wide, 3), Err(Error::Precondition(_))));
    }
}
