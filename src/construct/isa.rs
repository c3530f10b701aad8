//! Inverse suffix array stage.

use super::sa::{checked_entry, sa_width};
use crate::cache::{self, CacheConfig, KEY_ISA, KEY_SA};
use crate::error::Result;
use crate::int_vector::IntVector;
use log::info;

/// Build KEY_ISA from KEY_SA: `isa[sa[i]] = i`. No-op if already cached.
pub fn construct_isa(config: &mut CacheConfig) -> Result<()> {
    if cache::cache_file_exists(KEY_ISA, config) {
        return Ok(());
    }
    let mut sa = cache::open_cache_reader(KEY_SA, config)?;
    let n = sa.len();
    let mut isa = IntVector::new(n, 0, sa_width(n));
    for (i, p) in sa.iter().enumerate() {
        isa.set(checked_entry(p, n)?, i as u64);
    }
    cache::store_to_cache(&isa, KEY_ISA, config)?;
    info!("inverse suffix array: {} entries", n);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverts_sa() {
        let mut config = CacheConfig::in_ram(true);
        let sa = IntVector::from_slice(&[6, 5, 3, 1, 0, 4, 2]);
        cache::store_to_cache(&sa, KEY_SA, &mut config).unwrap();
        construct_isa(&mut config).unwrap();
        let isa: IntVector = cache::load_from_cache(KEY_ISA, &config).unwrap();
        assert_eq!(isa.to_vec(), vec![4, 3, 6, 2, 5, 1, 0]);
    }

    #[test]
    fn test_out_of_range_entry() {
        let mut config = CacheConfig::in_ram(true);
        let sa = IntVector::from_slice(&[2, 7, 0]);
        cache::store_to_cache(&sa, KEY_SA, &mut config).unwrap();
        assert!(matches!(construct_isa(&mut config), Err(crate::Error::Format(_))));
        assert!(!cache::cache_file_exists(KEY_ISA, &config));
    }

    #[test]
    fn test_cached_isa_is_kept() {
        let mut config = CacheConfig::in_ram(true);
        let marker = IntVector::from_slice(&[9]);
        cache::store_to_cache(&marker, KEY_ISA, &mut config).unwrap();
        construct_isa(&mut config).unwrap();
        let isa: IntVector = cache::load_from_cache(KEY_ISA, &config).unwrap();
        assert_eq!(isa, marker);
    }
}
