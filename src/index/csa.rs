//! Uncompressed suffix array with its text and BWT.
//!
//! Provides O(m log n) pattern counting and location by binary search over
//! the suffix array.

use super::{Alphabet, ByteAlphabet};
use crate::cache::{self, CacheConfig, Persist, KEY_SA};
use crate::construct::{CacheConstructible, IndexCategory};
use crate::error::{Error, Result};
use crate::int_vector::IntVector;
use std::cmp::Ordering;
use std::io::Write;
use std::marker::PhantomData;

/// Suffix array, text (sentinel included) and BWT of one text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlainSuffixArray<A: Alphabet = ByteAlphabet> {
    sa: IntVector,
    text: IntVector,
    bwt: IntVector,
    _alphabet: PhantomData<A>,
}

impl<A: Alphabet> PlainSuffixArray<A> {
    /// Assemble from parts of equal length.
    pub fn from_parts(sa: IntVector, text: IntVector, bwt: IntVector) -> Result<Self> {
        if sa.len() != text.len() || bwt.len() != text.len() {
            return Err(Error::Format(format!(
                "suffix array parts differ in length (sa {}, text {}, bwt {})",
                sa.len(),
                text.len(),
                bwt.len()
            )));
        }
        let n = sa.len();
        if let Some(p) = sa.iter().find(|&p| p >= n as u64) {
            return Err(Error::Format(format!(
                "suffix array entry {} out of range for {} suffixes",
                p, n
            )));
        }
        Ok(Self {
            sa,
            text,
            bwt,
            _alphabet: PhantomData,
        })
    }

    /// Number of suffixes, the sentinel's included.
    pub fn len(&self) -> usize {
        self.sa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sa.is_empty()
    }

    /// Text position of the `i`-th smallest suffix.
    pub fn sa(&self, i: usize) -> Result<usize> {
        self.sa
            .try_get(i)
            .map(|p| p as usize)
            .ok_or_else(|| Error::out_of_range(i, self.len()))
    }

    /// Symbol preceding the `i`-th smallest suffix.
    pub fn bwt(&self, i: usize) -> Result<u64> {
        self.bwt
            .try_get(i)
            .ok_or_else(|| Error::out_of_range(i, self.len()))
    }

    pub fn text(&self) -> &IntVector {
        &self.text
    }

    /// Compare the suffix at `p`, cut to the pattern's length, with `pattern`.
    fn compare_suffix(&self, p: usize, pattern: &[u64]) -> Ordering {
        let n = self.text.len();
        for (k, &c) in pattern.iter().enumerate() {
            if p + k >= n {
                return Ordering::Less;
            }
            match self.text.get(p + k).cmp(&c) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }

    /// First index in `[lo, hi)` where `pred` fails; `pred` must be
    /// monotone (true then false).
    fn partition_point(&self, mut lo: usize, mut hi: usize, pred: impl Fn(usize) -> bool) -> usize {
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if pred(self.sa.get(mid) as usize) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Half-open range of suffix array rows whose suffix starts with `pattern`.
    pub fn range(&self, pattern: &[u64]) -> (usize, usize) {
        let n = self.len();
        let lo = self.partition_point(0, n, |p| self.compare_suffix(p, pattern) == Ordering::Less);
        let hi = self.partition_point(lo, n, |p| {
            self.compare_suffix(p, pattern) != Ordering::Greater
        });
        (lo, hi)
    }

    /// Occurrences of `pattern`.
    pub fn count(&self, pattern: &[u64]) -> usize {
        let (lo, hi) = self.range(pattern);
        hi - lo
    }

    /// Text positions of every occurrence of `pattern`, ascending.
    pub fn locate(&self, pattern: &[u64]) -> Vec<usize> {
        let (lo, hi) = self.range(pattern);
        let mut positions: Vec<usize> = (lo..hi).map(|i| self.sa.get(i) as usize).collect();
        positions.sort_unstable();
        positions
    }

    /// Heap bytes of the three components.
    pub fn heap_size(&self) -> usize {
        self.sa.heap_size() + self.text.heap_size() + self.bwt.heap_size()
    }
}

impl PlainSuffixArray<ByteAlphabet> {
    pub fn count_bytes(&self, pattern: &[u8]) -> usize {
        let pattern: Vec<u64> = pattern.iter().map(|&b| b as u64).collect();
        self.count(&pattern)
    }

    pub fn locate_bytes(&self, pattern: &[u8]) -> Vec<usize> {
        let pattern: Vec<u64> = pattern.iter().map(|&b| b as u64).collect();
        self.locate(&pattern)
    }
}

impl<A: Alphabet> Persist for PlainSuffixArray<A> {
    fn persist<W: Write>(&self, out: &mut W) -> Result<usize> {
        let mut written = self.sa.serialize(out)?;
        written += self.text.serialize(out)?;
        written += self.bwt.serialize(out)?;
        Ok(written)
    }

    fn restore(bytes: &[u8]) -> Result<(Self, usize)> {
        let (sa, mut at) = IntVector::deserialize(bytes)?;
        let (text, used) = IntVector::deserialize(&bytes[at..])?;
        at += used;
        let (bwt, used) = IntVector::deserialize(&bytes[at..])?;
        at += used;
        Ok((Self::from_parts(sa, text, bwt)?, at))
    }
}

impl<A: Alphabet> CacheConstructible for PlainSuffixArray<A> {
    const CATEGORY: IndexCategory = IndexCategory::Csa;
    const ALPHABET: crate::cache::AlphabetWidth = A::WIDTH;
    type Csa = Self;

    fn from_cache(config: &CacheConfig) -> Result<Self> {
        let sa = cache::load_from_cache(KEY_SA, config)?;
        let text = cache::load_from_cache(A::WIDTH.text_key(), config)?;
        let bwt = cache::load_from_cache(A::WIDTH.bwt_key(), config)?;
        Self::from_parts(sa, text, bwt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banana() -> PlainSuffixArray {
        PlainSuffixArray::from_parts(
            IntVector::from_slice(&[6, 5, 3, 1, 0, 4, 2]),
            IntVector::from_bytes(b"banana\0"),
            IntVector::from_bytes(b"annb\0aa"),
        )
        .unwrap()
    }

    #[test]
    fn test_count_and_locate() {
        let csa = banana();
        assert_eq!(csa.count_bytes(b"ana"), 2);
        assert_eq!(csa.locate_bytes(b"ana"), vec![1, 3]);
        assert_eq!(csa.count_bytes(b"a"), 3);
        assert_eq!(csa.count_bytes(b"banana"), 1);
        assert_eq!(csa.count_bytes(b"nab"), 0);
        assert_eq!(csa.count_bytes(b"bananas"), 0);
        assert_eq!(csa.count_bytes(b""), 7);
    }

    #[test]
    fn test_accessors() {
        let csa = banana();
        assert_eq!(csa.len(), 7);
        assert_eq!(csa.sa(0).unwrap(), 6);
        assert_eq!(csa.bwt(4).unwrap(), 0);
        assert!(matches!(csa.sa(7), Err(Error::OutOfRange { index: 7, bound: 7 })));
    }

    #[test]
    fn test_mismatched_parts() {
        let r = PlainSuffixArray::<ByteAlphabet>::from_parts(
            IntVector::from_slice(&[1, 0]),
            IntVector::from_bytes(b"a\0"),
            IntVector::from_bytes(b"a"),
        );
        assert!(matches!(r, Err(Error::Format(_))));
    }

    #[test]
    fn test_out_of_range_entry() {
        let r = PlainSuffixArray::<ByteAlphabet>::from_parts(
            IntVector::from_slice(&[1, 3]),
            IntVector::from_bytes(b"a\0"),
            IntVector::from_bytes(b"\0a"),
        );
        assert!(matches!(r, Err(Error::Format(_))));
    }

    #[test]
    fn test_persist() {
        let csa = banana();
        let mut bytes = Vec::new();
        csa.persist(&mut bytes).unwrap();
        let (back, used) = PlainSuffixArray::<ByteAlphabet>::restore(&bytes).unwrap();
        assert_eq!(back, csa);
        assert_eq!(used, bytes.len());
    }
}
