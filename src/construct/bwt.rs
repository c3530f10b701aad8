//! Burrows-Wheeler transform stage.

use super::sa::{check_sa_len, checked_entry};
use crate::cache::{self, AlphabetWidth, CacheConfig, CacheWriter, KEY_SA};
use crate::error::Result;
use crate::int_vector::IntVector;
use log::info;

/// Build the BWT key of `alphabet` from the cached text and KEY_SA.
///
/// `bwt[i] = text[sa[i] - 1]`, and `text[n - 1]` where `sa[i] == 0`. The
/// text is held in memory while the suffix array is streamed.
pub fn construct_bwt(config: &mut CacheConfig, alphabet: AlphabetWidth) -> Result<()> {
    let text: IntVector = cache::load_from_cache(alphabet.text_key(), config)?;
    let mut sa = cache::open_cache_reader(KEY_SA, config)?;
    let n = text.len();
    check_sa_len(sa.len(), n)?;

    let mut writer = CacheWriter::create(alphabet.bwt_key(), text.width(), config)?;
    for p in sa.iter() {
        let p = checked_entry(p, n)?;
        let c = if p == 0 { text.get(n - 1) } else { text.get(p - 1) };
        writer.push(c)?;
    }
    writer.close(config)?;
    info!("bwt: {} symbols", n);
    Ok(())
}

/// Invert a BWT given the suffix array: `text[sa[i] - 1] = bwt[i]`.
pub fn invert_with_sa(bwt: &IntVector, sa: &IntVector) -> Result<IntVector> {
    let n = bwt.len();
    check_sa_len(sa.len(), n)?;
    let mut text = IntVector::new(n, 0, bwt.width());
    for (i, p) in sa.iter().enumerate() {
        let p = checked_entry(p, n)?;
        let at = if p == 0 { n - 1 } else { p - 1 };
        text.set(at, bwt.get(i));
    }
    Ok(text)
}
