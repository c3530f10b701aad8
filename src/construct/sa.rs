//! Suffix array stage.

use super::sais;
use crate::bits;
use crate::cache::{self, AlphabetWidth, CacheConfig, CacheWriter, KEY_SA};
use crate::error::{Error, Result};
use crate::int_vector::IntVector;
use log::info;

/// Build KEY_SA from the cached text of `alphabet`.
pub fn construct_sa(config: &mut CacheConfig, alphabet: AlphabetWidth) -> Result<()> {
    let text: IntVector = cache::load_from_cache(alphabet.text_key(), config)?;
    let n = text.len();
    let (symbols, sigma) = match alphabet {
        AlphabetWidth::Byte => (text.iter().map(|c| c as usize).collect(), 256),
        AlphabetWidth::Integer => compact_alphabet(&text.to_vec()),
    };
    drop(text);

    let sa = {
        let _event = config.phase("suffix sort");
        sais::suffix_array(&symbols, sigma)
    };
    drop(symbols);

    let mut writer = CacheWriter::create(KEY_SA, sa_width(n), config)?;
    for &p in &sa {
        writer.push(p as u64)?;
    }
    writer.close(config)?;
    info!("suffix array: {} entries (alphabet size {})", n, sigma);
    Ok(())
}

/// Replace each symbol by its rank among the distinct symbols.
///
/// Returns the ranks and the number of distinct symbols. Order is kept, so
/// a 0 sentinel maps to 0.
pub(crate) fn compact_alphabet(values: &[u64]) -> (Vec<usize>, usize) {
    let mut distinct = values.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    let ranks = values
        .iter()
        .map(|&c| distinct.partition_point(|&d| d < c))
        .collect();
    (ranks, distinct.len())
}

/// `p` as a position among `n` suffixes, or a format error.
#[inline]
pub(crate) fn checked_entry(p: u64, n: usize) -> Result<usize> {
    if p >= n as u64 {
        return Err(Error::Format(format!(
            "suffix array entry {} out of range for {} suffixes",
            p, n
        )));
    }
    Ok(p as usize)
}

/// Fail unless the suffix array and the text have the same length.
pub(crate) fn check_sa_len(sa_len: usize, text_len: usize) -> Result<()> {
    if sa_len != text_len {
        return Err(Error::Format(format!(
            "suffix array has {} entries but the text has {} symbols",
            sa_len, text_len
        )));
    }
    Ok(())
}

/// Width of suffix array entries for a text of length `n`.
pub(crate) fn sa_width(n: usize) -> u8 {
    bits::bit_len(n as u64).max(1)
}
