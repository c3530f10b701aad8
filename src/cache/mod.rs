//! Cache coordination for construction runs.
//!
//! Every artifact of a run (text, SA, BWT, ISA, LCP, component indexes) is a
//! file named by its key, the run id and the cache directory. The
//! [`CacheConfig`] key registry is the single record of which artifacts
//! exist: stages check it before building and [`store_to_cache`] registers
//! what it writes.

mod config;
pub mod keys;

pub use config::{next_id, next_run_id, CacheConfig};
pub use keys::{
    csa_key, type_hash, AlphabetWidth, KEY_BWT, KEY_BWT_INT, KEY_CSA, KEY_ISA, KEY_LCP, KEY_SA,
    KEY_TEXT, KEY_TEXT_INT,
};

use crate::error::{Error, Result};
use crate::int_vector::{IntVector, IntVectorReader, IntVectorWriter};
use crate::sd_vector::SdVector;
use crate::storage::{Storage, RAM_PREFIX};
use log::debug;
use std::io::Write;

/// Values that can be written to and read back from a cache file.
pub trait Persist: Sized {
    fn persist<W: Write>(&self, out: &mut W) -> Result<usize>;

    /// Decode from the start of `bytes`; returns the value and bytes used.
    fn restore(bytes: &[u8]) -> Result<(Self, usize)>;

    fn store(&self, storage: &Storage, file: &str) -> Result<()> {
        let mut sink = storage.create(file)?;
        self.persist(&mut sink)?;
        sink.finish()
    }

    fn load(storage: &Storage, file: &str) -> Result<Self> {
        let source = storage.open(file)?;
        let (value, _) = Self::restore(&source)?;
        Ok(value)
    }
}

impl Persist for IntVector {
    fn persist<W: Write>(&self, out: &mut W) -> Result<usize> {
        self.serialize(out)
    }

    fn restore(bytes: &[u8]) -> Result<(Self, usize)> {
        IntVector::deserialize(bytes)
    }
}

impl Persist for SdVector {
    fn persist<W: Write>(&self, out: &mut W) -> Result<usize> {
        self.serialize(out)
    }

    fn restore(bytes: &[u8]) -> Result<(Self, usize)> {
        SdVector::deserialize(bytes)
    }
}

/// File holding `key`: the registered path, else the canonical name.
pub fn cache_file_name(key: &str, config: &CacheConfig) -> String {
    if let Some(file) = config.file_map.get(key) {
        return file.clone();
    }
    canonical_file_name(key, config)
}

fn canonical_file_name(key: &str, config: &CacheConfig) -> String {
    if config.is_ram() {
        format!("{}{}_{}.sdsl", RAM_PREFIX, key, config.id)
    } else {
        format!("{}/{}_{}.sdsl", config.dir, key, config.id)
    }
}

/// Fresh file name for a scratch artifact of this run.
pub fn tmp_file_name(config: &CacheConfig) -> String {
    canonical_file_name(&next_run_id(), config)
}

/// True if `key` is registered, whether or not its file still exists.
pub fn cache_file_exists(key: &str, config: &CacheConfig) -> bool {
    config.file_map.contains_key(key)
}

/// Register `key` under its canonical name if that file exists.
///
/// Returns whether `key` is registered afterwards.
pub fn register_cache_file(key: &str, config: &mut CacheConfig) -> bool {
    if config.file_map.contains_key(key) {
        return true;
    }
    let file = canonical_file_name(key, config);
    if config.storage().exists(&file) {
        debug!("registered `{}` -> `{}`", key, file);
        config.file_map.insert(key.to_string(), file);
        true
    } else {
        false
    }
}

/// Write `value` as artifact `key` and register it.
pub fn store_to_cache<T: Persist>(value: &T, key: &str, config: &mut CacheConfig) -> Result<()> {
    let file = cache_file_name(key, config);
    value.store(config.storage(), &file)?;
    debug!("stored `{}` to `{}`", key, file);
    config.file_map.insert(key.to_string(), file);
    Ok(())
}

/// Load artifact `key`; unregistered keys are a [`Error::MissingDependency`].
pub fn load_from_cache<T: Persist>(key: &str, config: &CacheConfig) -> Result<T> {
    let file = config.file_map.get(key).ok_or_else(|| Error::missing(key))?;
    debug!("loading `{}` from `{}`", key, file);
    T::load(config.storage(), file)
}

/// Registered file of `key`, or a [`Error::MissingDependency`].
pub fn require(key: &str, config: &CacheConfig) -> Result<String> {
    config
        .file_map
        .get(key)
        .cloned()
        .ok_or_else(|| Error::missing(key))
}

/// Windowed reader over the registered artifact `key`.
pub fn open_cache_reader(key: &str, config: &CacheConfig) -> Result<IntVectorReader> {
    let file = require(key, config)?;
    IntVectorReader::with_buffer_size(config.storage(), &file, config.buffer_size)
}

/// Streaming writer for artifact `key`; the key is registered on close.
pub struct CacheWriter {
    key: String,
    file: String,
    inner: IntVectorWriter,
}

impl CacheWriter {
    pub fn create(key: &str, width: u8, config: &CacheConfig) -> Result<Self> {
        let file = cache_file_name(key, config);
        let inner =
            IntVectorWriter::with_buffer_size(config.storage(), &file, width, config.buffer_size)?;
        Ok(Self {
            key: key.to_string(),
            file,
            inner,
        })
    }

    pub fn push(&mut self, value: u64) -> Result<()> {
        self.inner.push(value)
    }

    pub fn set(&mut self, i: usize, value: u64) -> Result<()> {
        self.inner.set(i, value)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Commit the file and register it; returns the element count.
    pub fn close(self, config: &mut CacheConfig) -> Result<usize> {
        let len = self.inner.close()?;
        debug!("stored `{}` to `{}` ({} elements)", self.key, self.file, len);
        config.file_map.insert(self.key, self.file);
        Ok(len)
    }
}

/// Remove every registered file and clear the registry.
pub fn delete_all_files(config: &mut CacheConfig) -> Result<()> {
    let files = std::mem::take(&mut config.file_map);
    for (key, file) in &files {
        if config.storage().exists(file) {
            config.storage().remove(file)?;
        }
        debug!("deleted `{}` (`{}`)", key, file);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        let disk = CacheConfig::new(false, "/tmp/cache", "7_1");
        assert_eq!(cache_file_name(KEY_SA, &disk), "/tmp/cache/sa_7_1.sdsl");
        let ram = CacheConfig::new(false, "@", "7_1");
        assert_eq!(cache_file_name(KEY_SA, &ram), "@sa_7_1.sdsl");

        let mut mapped = ram.clone();
        mapped.file_map.insert(KEY_SA.into(), "@elsewhere".into());
        assert_eq!(cache_file_name(KEY_SA, &mapped), "@elsewhere");
        assert_ne!(tmp_file_name(&ram), tmp_file_name(&ram));
    }

    #[test]
    fn test_store_registers_and_loads() {
        let mut config = CacheConfig::in_ram(true);
        assert!(!cache_file_exists(KEY_SA, &config));
        assert!(matches!(
            load_from_cache::<IntVector>(KEY_SA, &config),
            Err(Error::MissingDependency { .. })
        ));

        let sa = IntVector::from_slice(&[2, 1, 0]);
        store_to_cache(&sa, KEY_SA, &mut config).unwrap();
        assert!(cache_file_exists(KEY_SA, &config));
        let back: IntVector = load_from_cache(KEY_SA, &config).unwrap();
        assert_eq!(back, sa);
    }

    #[test]
    fn test_register_requires_file() {
        let mut config = CacheConfig::in_ram(false);
        assert!(!register_cache_file(KEY_LCP, &mut config));
        let file = cache_file_name(KEY_LCP, &config);
        IntVector::from_slice(&[0]).store(config.storage(), &file).unwrap();
        assert!(register_cache_file(KEY_LCP, &mut config));
        assert_eq!(require(KEY_LCP, &config).unwrap(), file);
    }

    #[test]
    fn test_delete_all_files() {
        let mut config = CacheConfig::in_ram(true);
        let v = IntVector::from_slice(&[1, 2, 3]);
        store_to_cache(&v, KEY_TEXT, &mut config).unwrap();
        store_to_cache(&v, KEY_SA, &mut config).unwrap();
        let files: Vec<String> = config.file_map.values().cloned().collect();
        delete_all_files(&mut config).unwrap();
        assert!(config.file_map.is_empty());
        for f in files {
            assert!(!config.storage().exists(&f));
        }
    }

    #[test]
    fn test_cache_writer_registers_on_close() {
        let mut config = CacheConfig::in_ram(false);
        config.buffer_size = 3;
        let mut w = CacheWriter::create(KEY_BWT, 8, &config).unwrap();
        for b in b"annb" {
            w.push(*b as u64).unwrap();
        }
        assert!(!cache_file_exists(KEY_BWT, &config));
        assert_eq!(w.close(&mut config).unwrap(), 4);
        assert!(cache_file_exists(KEY_BWT, &config));

        let mut r = open_cache_reader(KEY_BWT, &config).unwrap();
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![97, 110, 110, 98]);
        assert!(open_cache_reader(KEY_ISA, &config).is_err());
    }

    #[test]
    fn test_sd_vector_persists() {
        let mut config = CacheConfig::in_ram(true);
        let sd = SdVector::from_positions(100, [1, 50, 99]).unwrap();
        store_to_cache(&sd, "marks", &mut config).unwrap();
        let back: SdVector = load_from_cache("marks", &config).unwrap();
        assert_eq!(back, sd);
    }
}
