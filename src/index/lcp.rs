//! Bit-compressed LCP array.

use super::csa::PlainSuffixArray;
use super::{Alphabet, ByteAlphabet};
use crate::cache::{self, AlphabetWidth, CacheConfig, Persist, KEY_LCP};
use crate::construct::{CacheConstructible, IndexCategory};
use crate::error::{Error, Result};
use crate::int_vector::IntVector;
use std::io::Write;
use std::marker::PhantomData;

/// LCP values stored at the width of the largest one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LcpBitCompressed<A: Alphabet = ByteAlphabet> {
    lcp: IntVector,
    _alphabet: PhantomData<A>,
}

impl<A: Alphabet> LcpBitCompressed<A> {
    pub fn new(mut lcp: IntVector) -> Self {
        lcp.bit_compress();
        Self {
            lcp,
            _alphabet: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.lcp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lcp.is_empty()
    }

    /// Longest common prefix of the suffixes at rows `i - 1` and `i`.
    pub fn get(&self, i: usize) -> Result<usize> {
        self.lcp
            .try_get(i)
            .map(|l| l as usize)
            .ok_or_else(|| Error::out_of_range(i, self.len()))
    }

    pub fn max(&self) -> usize {
        self.lcp.max_value() as usize
    }

    pub fn width(&self) -> u8 {
        self.lcp.width()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.lcp.iter().map(|l| l as usize)
    }

    pub fn heap_size(&self) -> usize {
        self.lcp.heap_size()
    }
}

impl<A: Alphabet> Persist for LcpBitCompressed<A> {
    fn persist<W: Write>(&self, out: &mut W) -> Result<usize> {
        self.lcp.serialize(out)
    }

    fn restore(bytes: &[u8]) -> Result<(Self, usize)> {
        let (lcp, used) = IntVector::deserialize(bytes)?;
        Ok((Self::new(lcp), used))
    }
}

impl<A: Alphabet> CacheConstructible for LcpBitCompressed<A> {
    const CATEGORY: IndexCategory = IndexCategory::Lcp;
    const ALPHABET: AlphabetWidth = A::WIDTH;
    type Csa = PlainSuffixArray<A>;

    fn from_cache(config: &CacheConfig) -> Result<Self> {
        Ok(Self::new(cache::load_from_cache(KEY_LCP, config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compresses_and_reads() {
        let mut raw = IntVector::new(0, 0, 64);
        for l in [0u64, 0, 1, 3, 0, 0, 2] {
            raw.push(l);
        }
        let lcp = LcpBitCompressed::<ByteAlphabet>::new(raw);
        assert_eq!(lcp.width(), 2);
        assert_eq!(lcp.max(), 3);
        assert_eq!(lcp.get(3).unwrap(), 3);
        assert_eq!(lcp.iter().collect::<Vec<_>>(), vec![0, 0, 1, 3, 0, 0, 2]);
        assert!(lcp.get(7).is_err());
    }

    #[test]
    fn test_from_cache_requires_lcp() {
        let config = CacheConfig::in_ram(false);
        assert!(matches!(
            LcpBitCompressed::<ByteAlphabet>::from_cache(&config),
            Err(Error::MissingDependency { .. })
        ));
    }
}
