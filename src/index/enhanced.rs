//! Suffix array enhanced with its LCP array.

use super::csa::PlainSuffixArray;
use super::lcp::LcpBitCompressed;
use super::{Alphabet, ByteAlphabet};
use crate::cache::{self, csa_key, AlphabetWidth, CacheConfig, Persist};
use crate::construct::{CacheConstructible, IndexCategory};
use crate::error::{Error, Result};
use std::io::Write;

/// Suffix array plus LCP, built through the `Cst` pipeline: the suffix
/// array component is cached under its own `csa_<typehash>` key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnhancedSuffixArray<A: Alphabet = ByteAlphabet> {
    csa: PlainSuffixArray<A>,
    lcp: LcpBitCompressed<A>,
}

impl<A: Alphabet> EnhancedSuffixArray<A> {
    pub fn from_parts(csa: PlainSuffixArray<A>, lcp: LcpBitCompressed<A>) -> Result<Self> {
        if csa.len() != lcp.len() {
            return Err(Error::Format(format!(
                "suffix array has {} rows but LCP has {}",
                csa.len(),
                lcp.len()
            )));
        }
        Ok(Self { csa, lcp })
    }

    pub fn csa(&self) -> &PlainSuffixArray<A> {
        &self.csa
    }

    pub fn lcp(&self) -> &LcpBitCompressed<A> {
        &self.lcp
    }

    pub fn len(&self) -> usize {
        self.csa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.csa.is_empty()
    }

    /// Position and length of a longest repeated substring, if any symbol
    /// repeats.
    pub fn longest_repeat(&self) -> Option<(usize, usize)> {
        let (row, len) = self
            .lcp
            .iter()
            .enumerate()
            .max_by_key(|&(i, l)| (l, std::cmp::Reverse(i)))?;
        if len == 0 {
            return None;
        }
        self.csa.sa(row).ok().map(|p| (p, len))
    }

    /// Distinct non-empty substrings of the text, the sentinel excluded.
    pub fn distinct_substrings(&self) -> usize {
        let n = self.len();
        (0..n)
            .map(|i| {
                let p = self.csa.sa(i).unwrap_or(n - 1);
                let l = self.lcp.get(i).unwrap_or(0);
                (n - 1 - p).saturating_sub(l)
            })
            .sum()
    }

    pub fn heap_size(&self) -> usize {
        self.csa.heap_size() + self.lcp.heap_size()
    }
}

impl<A: Alphabet> Persist for EnhancedSuffixArray<A> {
    fn persist<W: Write>(&self, out: &mut W) -> Result<usize> {
        Ok(self.csa.persist(out)? + self.lcp.persist(out)?)
    }

    fn restore(bytes: &[u8]) -> Result<(Self, usize)> {
        let (csa, at) = PlainSuffixArray::restore(bytes)?;
        let (lcp, used) = LcpBitCompressed::restore(&bytes[at..])?;
        Ok((Self::from_parts(csa, lcp)?, at + used))
    }
}

impl<A: Alphabet> CacheConstructible for EnhancedSuffixArray<A> {
    const CATEGORY: IndexCategory = IndexCategory::Cst;
    const ALPHABET: AlphabetWidth = A::WIDTH;
    type Csa = PlainSuffixArray<A>;

    fn from_cache(config: &CacheConfig) -> Result<Self> {
        let csa = cache::load_from_cache(&csa_key::<Self::Csa>(), config)?;
        let lcp = LcpBitCompressed::from_cache(config)?;
        Self::from_parts(csa, lcp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::int_vector::IntVector;

    fn banana() -> EnhancedSuffixArray {
        let csa = PlainSuffixArray::from_parts(
            IntVector::from_slice(&[6, 5, 3, 1, 0, 4, 2]),
            IntVector::from_bytes(b"banana\0"),
            IntVector::from_bytes(b"annb\0aa"),
        )
        .unwrap();
        let lcp = LcpBitCompressed::new(IntVector::from_slice(&[0, 0, 1, 3, 0, 0, 2]));
        EnhancedSuffixArray::from_parts(csa, lcp).unwrap()
    }

    #[test]
    fn test_longest_repeat() {
        assert_eq!(banana().longest_repeat(), Some((1, 3)));
    }

    #[test]
    fn test_distinct_substrings() {
        assert_eq!(banana().distinct_substrings(), 15);
    }

    #[test]
    fn test_no_repeat() {
        let csa = PlainSuffixArray::<ByteAlphabet>::from_parts(
            IntVector::from_slice(&[2, 0, 1]),
            IntVector::from_bytes(b"ab\0"),
            IntVector::from_bytes(b"b\0a"),
        )
        .unwrap();
        let lcp = LcpBitCompressed::new(IntVector::from_slice(&[0, 0, 0]));
        let esa = EnhancedSuffixArray::from_parts(csa, lcp).unwrap();
        assert_eq!(esa.longest_repeat(), None);
        assert_eq!(esa.distinct_substrings(), 3);
    }

    #[test]
    fn test_persist() {
        let esa = banana();
        let mut bytes = Vec::new();
        let written = esa.persist(&mut bytes).unwrap();
        assert_eq!(written, bytes.len());
        let (back, _) = EnhancedSuffixArray::<ByteAlphabet>::restore(&bytes).unwrap();
        assert_eq!(back, esa);
    }
}
