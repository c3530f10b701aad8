//! Index-free rank and select.
//!
//! Every query walks the words of the bound vector. No auxiliary space is
//! used, which makes these the reference the indexed supports are tested
//! against.

use super::{BitPattern, Rank, Select};
use crate::bits::{self, WORD_BITS};
use crate::error::{Error, Result};
use crate::int_vector::BitVector;

/// Rank by linear scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankSupportScan<'a> {
    v: Option<&'a BitVector>,
    pattern: BitPattern,
}

impl<'a> RankSupportScan<'a> {
    pub fn new(v: &'a BitVector, pattern: BitPattern) -> Self {
        Self {
            v: Some(v),
            pattern,
        }
    }

    /// Unbound support for `pattern`.
    pub fn unbound(pattern: BitPattern) -> Self {
        Self { v: None, pattern }
    }

    pub fn set_vector(&mut self, v: &'a BitVector) {
        self.v = Some(v);
    }

    pub fn pattern(&self) -> BitPattern {
        self.pattern
    }

    fn bound(&self) -> Result<&'a BitVector> {
        self.v.ok_or(Error::Unbound)
    }
}

impl Rank for RankSupportScan<'_> {
    fn rank(&self, i: usize) -> Result<usize> {
        let v = self.bound()?;
        if i > v.len() {
            return Err(Error::out_of_range(i, v.len()));
        }
        Ok(scan_rank(v, self.pattern, i))
    }

    fn size(&self) -> Result<usize> {
        Ok(self.bound()?.len())
    }
}

/// Select by linear scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectSupportScan<'a> {
    v: Option<&'a BitVector>,
    pattern: BitPattern,
}

impl<'a> SelectSupportScan<'a> {
    pub fn new(v: &'a BitVector, pattern: BitPattern) -> Self {
        Self {
            v: Some(v),
            pattern,
        }
    }

    pub fn unbound(pattern: BitPattern) -> Self {
        Self { v: None, pattern }
    }

    pub fn set_vector(&mut self, v: &'a BitVector) {
        self.v = Some(v);
    }

    pub fn pattern(&self) -> BitPattern {
        self.pattern
    }
}

impl Select for SelectSupportScan<'_> {
    fn select(&self, j: usize) -> Result<usize> {
        let v = self.v.ok_or(Error::Unbound)?;
        scan_select(v, self.pattern, j)
    }
}

/// Matches of `pattern` ending in `[0, i)`.
pub(crate) fn scan_rank(v: &BitVector, pattern: BitPattern, i: usize) -> usize {
    let words = v.words();
    let full = i / WORD_BITS;
    let mut count = 0usize;
    for k in 0..full {
        count += bits::popcount(pattern.word_matches(words, k, v.len())) as usize;
    }
    let rem = i % WORD_BITS;
    if rem > 0 {
        let m = pattern.word_matches(words, full, v.len()) & bits::lo_mask(rem);
        count += bits::popcount(m) as usize;
    }
    count
}

/// Position of the `j`-th match (1-indexed).
pub(crate) fn scan_select(v: &BitVector, pattern: BitPattern, j: usize) -> Result<usize> {
    if j == 0 {
        return Err(Error::out_of_range(j, scan_rank(v, pattern, v.len())));
    }
    let words = v.words();
    let mut seen = 0usize;
    for k in 0..words.len() {
        let m = pattern.word_matches(words, k, v.len());
        let c = bits::popcount(m) as usize;
        if seen + c >= j {
            let local = bits::select_in_word(m, (j - seen - 1) as u32) as usize;
            return Ok(k * WORD_BITS + local);
        }
        seen += c;
    }
    Err(Error::out_of_range(j, seen))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::int_vector::IntVector;

    fn bv(s: &str) -> BitVector {
        IntVector::from_bools(&s.bytes().map(|b| b == b'1').collect::<Vec<_>>())
    }

    #[test]
    fn test_rank_patterns() {
        let v = bv("1100101");
        let ones = RankSupportScan::new(&v, BitPattern::One);
        let zeros = RankSupportScan::new(&v, BitPattern::Zero);
        let ten = RankSupportScan::new(&v, BitPattern::OneZero);
        let zero_one = RankSupportScan::new(&v, BitPattern::ZeroOne);
        assert_eq!(ones.rank(7).unwrap(), 4);
        assert_eq!(zeros.rank(7).unwrap(), 3);
        // "10" ends at 2 and 5
        assert_eq!(ten.rank(7).unwrap(), 2);
        assert_eq!(ten.rank(3).unwrap(), 1);
        // "01" ends at 4 and 6
        assert_eq!(zero_one.rank(7).unwrap(), 2);
        assert_eq!(zero_one.rank(5).unwrap(), 1);
    }

    #[test]
    fn test_select_patterns() {
        let v = bv("1100101");
        let ones = SelectSupportScan::new(&v, BitPattern::One);
        assert_eq!(ones.select(1).unwrap(), 0);
        assert_eq!(ones.select(4).unwrap(), 6);
        assert!(matches!(ones.select(5), Err(Error::OutOfRange { .. })));
        assert!(matches!(ones.select(0), Err(Error::OutOfRange { .. })));

        let ten = SelectSupportScan::new(&v, BitPattern::OneZero);
        assert_eq!(ten.select(1).unwrap(), 2);
        assert_eq!(ten.select(2).unwrap(), 5);
        let zero_one = SelectSupportScan::new(&v, BitPattern::ZeroOne);
        assert_eq!(zero_one.select(2).unwrap(), 6);
    }

    #[test]
    fn test_zero_pattern_ignores_padding() {
        let v = IntVector::bit_vector(70);
        let zeros = RankSupportScan::new(&v, BitPattern::Zero);
        assert_eq!(zeros.rank(70).unwrap(), 70);
        let sel = SelectSupportScan::new(&v, BitPattern::Zero);
        assert_eq!(sel.select(70).unwrap(), 69);
        assert!(sel.select(71).is_err());
    }

    #[test]
    fn test_unbound_and_range() {
        let r = RankSupportScan::default();
        assert!(matches!(r.rank(0), Err(Error::Unbound)));
        let s = SelectSupportScan::unbound(BitPattern::Zero);
        assert!(matches!(s.select(1), Err(Error::Unbound)));

        let v = bv("101");
        let mut r = RankSupportScan::unbound(BitPattern::One);
        r.set_vector(&v);
        assert_eq!(r.rank(3).unwrap(), 2);
        assert!(matches!(r.rank(4), Err(Error::OutOfRange { index: 4, bound: 3 })));
    }
}
