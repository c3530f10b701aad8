//! Index containers assembled by the construction pipeline.
//!
//! Each container implements [`CacheConstructible`](crate::construct::CacheConstructible)
//! so [`construct`](crate::construct::construct) can pick the stages it needs
//! from its category.

pub mod csa;
pub mod enhanced;
pub mod lcp;
pub mod wavelet;

pub use csa::PlainSuffixArray;
pub use enhanced::EnhancedSuffixArray;
pub use lcp::LcpBitCompressed;
pub use wavelet::WaveletMatrix;

use crate::cache::AlphabetWidth;
use std::fmt::Debug;

/// Compile-time alphabet of a container.
pub trait Alphabet: Debug + Clone + Copy + PartialEq + Eq + Default + Send + Sync + 'static {
    const WIDTH: AlphabetWidth;
}

/// Texts of bytes; cached under KEY_TEXT / KEY_BWT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteAlphabet;

/// Texts of arbitrary integers; cached under KEY_TEXT_INT / KEY_BWT_INT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntAlphabet;

impl Alphabet for ByteAlphabet {
    const WIDTH: AlphabetWidth = AlphabetWidth::Byte;
}

impl Alphabet for IntAlphabet {
    const WIDTH: AlphabetWidth = AlphabetWidth::Integer;
}
