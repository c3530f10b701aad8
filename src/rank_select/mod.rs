//! Rank and select over bit vectors.
//!
//! `rank(i)` counts occurrences of a [`BitPattern`] ending at positions
//! `[0, i)`; `select(j)` returns the position where the `j`-th occurrence
//! (1-indexed) ends. Two-bit patterns are reported at the position of their
//! second bit, so `"10"` matches position `p` when `bit[p-1] == 1` and
//! `bit[p] == 0`.
//!
//! ## Modules
//!
//! - `scan`: linear-time scanning supports, used as the reference oracle
//! - `rank_v`: superblock/block counts for constant-time rank
//! - `select`: sampled select on top of the rank counts
//!
//! The indexed structures keep their counts in owned [`RankIndex`] /
//! [`SelectIndex`] values that are queried against the vector they were built
//! for. [`RankSupport`] and [`SelectSupport`] bind such an index to a borrowed
//! vector; a default-constructed support is unbound and rejects queries.

pub mod rank_v;
pub mod scan;
pub mod select;

pub use rank_v::{RankIndex, RankSupport};
pub use scan::{RankSupportScan, SelectSupportScan};
pub use select::{SelectIndex, SelectSupport};

use crate::bits::{self, WORD_BITS};
use crate::error::{Error, Result};
use crate::int_vector::BitVector;

/// Bit pattern counted by a rank/select support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BitPattern {
    Zero,
    #[default]
    One,
    /// `bit[p-1] == 1 && bit[p] == 0`
    OneZero,
    /// `bit[p-1] == 0 && bit[p] == 1`
    ZeroOne,
}

impl BitPattern {
    /// Pattern length in bits.
    pub fn len(self) -> u8 {
        match self {
            BitPattern::Zero | BitPattern::One => 1,
            BitPattern::OneZero | BitPattern::ZeroOne => 2,
        }
    }

    /// Bit assumed before position 0. Chosen so that no two-bit pattern
    /// matches at position 0.
    fn initial_carry(self) -> u64 {
        match self {
            BitPattern::ZeroOne => 1,
            _ => 0,
        }
    }

    #[inline]
    fn map_word(self, w: u64, carry: u64) -> u64 {
        match self {
            BitPattern::Zero => !w,
            BitPattern::One => w,
            BitPattern::OneZero => bits::map10(w, carry),
            BitPattern::ZeroOne => bits::map01(w, carry),
        }
    }

    /// Mask of pattern matches in word `k`, restricted to positions `< len`.
    #[inline]
    pub fn word_matches(self, words: &[u64], k: usize, len: usize) -> u64 {
        let carry = if k == 0 {
            self.initial_carry()
        } else {
            words[k - 1] >> (WORD_BITS - 1)
        };
        let mut m = self.map_word(words[k], carry);
        let start = k * WORD_BITS;
        if start + WORD_BITS > len {
            m &= bits::lo_mask(len.saturating_sub(start));
        }
        m
    }

    /// Parse `"0"`, `"1"`, `"10"` or `"01"`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "0" => Some(BitPattern::Zero),
            "1" => Some(BitPattern::One),
            "10" => Some(BitPattern::OneZero),
            "01" => Some(BitPattern::ZeroOne),
            _ => None,
        }
    }
}

impl std::fmt::Display for BitPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BitPattern::Zero => "0",
            BitPattern::One => "1",
            BitPattern::OneZero => "10",
            BitPattern::ZeroOne => "01",
        };
        f.write_str(s)
    }
}

/// Fail unless `v` has width 1.
pub(crate) fn require_bit_vector(v: &BitVector) -> Result<()> {
    if v.width() != 1 {
        return Err(Error::Precondition(format!(
            "rank/select needs a bit vector, got width {}",
            v.width()
        )));
    }
    Ok(())
}

/// Rank queries over a bound bit vector.
pub trait Rank {
    /// Occurrences of the pattern ending in `[0, i)`; `i` may equal the length.
    fn rank(&self, i: usize) -> Result<usize>;

    /// Length of the supported vector.
    fn size(&self) -> Result<usize>;
}

/// Select queries over a bound bit vector.
pub trait Select {
    /// Position of the `j`-th occurrence, `j` in `[1, count]`.
    fn select(&self, j: usize) -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_matches_masks_past_len() {
        let words = [0u64];
        assert_eq!(BitPattern::Zero.word_matches(&words, 0, 10), bits::lo_mask(10));
        assert_eq!(BitPattern::One.word_matches(&words, 0, 10), 0);
    }

    #[test]
    fn test_carry_across_words() {
        // bit 63 set, bit 64 clear -> "10" ends at 64
        let words = [1u64 << 63, 0];
        assert_eq!(BitPattern::OneZero.word_matches(&words, 1, 128) & 1, 1);
        // bit 63 clear, bit 64 set -> "01" ends at 64
        let words = [0u64, 1];
        assert_eq!(BitPattern::ZeroOne.word_matches(&words, 1, 128) & 1, 1);
        // position 0 never matches a two-bit pattern
        assert_eq!(BitPattern::ZeroOne.word_matches(&words, 0, 128), 0);
    }

    #[test]
    fn test_parse_display() {
        for p in [
            BitPattern::Zero,
            BitPattern::One,
            BitPattern::OneZero,
            BitPattern::ZeroOne,
        ] {
            assert_eq!(BitPattern::parse(&p.to_string()), Some(p));
        }
        assert_eq!(BitPattern::parse("11"), None);
    }
}
