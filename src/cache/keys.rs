//! Cache key namespace.

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

pub const KEY_TEXT: &str = "text";
pub const KEY_TEXT_INT: &str = "text_int";
pub const KEY_BWT: &str = "bwt";
pub const KEY_BWT_INT: &str = "bwt_int";
pub const KEY_SA: &str = "sa";
pub const KEY_ISA: &str = "isa";
pub const KEY_LCP: &str = "lcp";
pub const KEY_CSA: &str = "csa";

/// Alphabet of a text: bytes (width 8) or arbitrary integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlphabetWidth {
    #[default]
    Byte,
    Integer,
}

impl AlphabetWidth {
    pub fn text_key(self) -> &'static str {
        match self {
            AlphabetWidth::Byte => KEY_TEXT,
            AlphabetWidth::Integer => KEY_TEXT_INT,
        }
    }

    pub fn bwt_key(self) -> &'static str {
        match self {
            AlphabetWidth::Byte => KEY_BWT,
            AlphabetWidth::Integer => KEY_BWT_INT,
        }
    }

    /// Element width of texts over this alphabet; 0 means bit-compressed.
    pub fn width(self) -> u8 {
        match self {
            AlphabetWidth::Byte => 8,
            AlphabetWidth::Integer => 0,
        }
    }
}

/// Stable hash of a type's name, used to tell cached CSA variants apart.
pub fn type_hash<T: ?Sized>() -> String {
    let mut hasher = FxHasher::default();
    std::any::type_name::<T>().hash(&mut hasher);
    hasher.finish().to_string()
}

/// Key of the cached suffix array component of type `T`.
pub fn csa_key<T: ?Sized>() -> String {
    format!("{}_{}", KEY_CSA, type_hash::<T>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_keys() {
        assert_eq!(AlphabetWidth::Byte.text_key(), "text");
        assert_eq!(AlphabetWidth::Integer.text_key(), "text_int");
        assert_eq!(AlphabetWidth::Byte.bwt_key(), "bwt");
        assert_eq!(AlphabetWidth::Integer.bwt_key(), "bwt_int");
    }

    #[test]
    fn test_csa_keys_differ_per_type() {
        assert_eq!(csa_key::<u32>(), csa_key::<u32>());
        assert_ne!(csa_key::<u32>(), csa_key::<u64>());
        assert!(csa_key::<u8>().starts_with("csa_"));
    }
}
