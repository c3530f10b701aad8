use crate::construct::events::{LogSink, PhaseEvent, PhaseSink};
use crate::error::{Error, Result};
use crate::int_vector::DEFAULT_BUFFER_SIZE;
use crate::storage::{Storage, RAM_PREFIX};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const MANIFEST_VERSION: u32 = 1;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique counter value.
pub fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Run identifier: process id plus a monotonic counter.
pub fn next_run_id() -> String {
    format!("{}_{}", std::process::id(), next_id())
}

/// Settings and artifact registry of one construction run.
///
/// `file_map` maps cache keys to the files holding them and only grows
/// while a run is in progress. The storage handle decides which RAM
/// registry RAM paths resolve against; phases are reported to `sink`.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Remove every registered file after a successful top-level build.
    pub delete_files: bool,
    /// Cache directory, or `"@"` for RAM files.
    pub dir: String,
    pub id: String,
    pub file_map: BTreeMap<String, String>,
    /// Window size, in elements, of streamed artifacts.
    pub buffer_size: usize,
    storage: Storage,
    sink: Arc<dyn PhaseSink>,
}

impl CacheConfig {
    /// An empty `id` is replaced by a fresh run identifier.
    pub fn new(delete_files: bool, dir: impl Into<String>, id: impl Into<String>) -> Self {
        let mut id = id.into();
        if id.is_empty() {
            id = next_run_id();
        }
        Self {
            delete_files,
            dir: dir.into(),
            id,
            file_map: BTreeMap::new(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            storage: Storage::new(),
            sink: Arc::new(LogSink),
        }
    }

    /// Config whose artifacts are RAM files.
    pub fn in_ram(delete_files: bool) -> Self {
        Self::new(delete_files, RAM_PREFIX.to_string(), "")
    }

    pub fn with_storage(mut self, storage: Storage) -> Self {
        self.storage = storage;
        self
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn with_sink(mut self, sink: Arc<dyn PhaseSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Start a phase reported to this run's sink.
    pub fn phase(&self, name: &'static str) -> PhaseEvent {
        PhaseEvent::begin(name, self.sink.clone())
    }

    pub fn is_ram(&self) -> bool {
        self.dir == RAM_PREFIX.to_string()
    }

    /// Copy sharing directory, id, registry and storage that never deletes.
    pub fn child(&self) -> Self {
        Self {
            delete_files: false,
            ..self.clone()
        }
    }

    /// Path of this run's manifest.
    pub fn manifest_file(&self) -> String {
        manifest_file(&self.dir, &self.id)
    }

    /// Write the key registry as JSON next to the cached files.
    pub fn save_manifest(&self) -> Result<String> {
        let manifest = Manifest {
            version: MANIFEST_VERSION,
            dir: self.dir.clone(),
            id: self.id.clone(),
            delete_files: self.delete_files,
            files: self.file_map.clone(),
        };
        let file = self.manifest_file();
        let json = serde_json::to_vec_pretty(&manifest)?;
        self.storage.write_all(&file, &json)?;
        debug!("saved manifest `{}` ({} entries)", file, self.file_map.len());
        Ok(file)
    }

    /// Reopen a run from its manifest. Entries whose file is gone are
    /// dropped.
    pub fn open_manifest(storage: &Storage, dir: &str, id: &str) -> Result<Self> {
        let file = manifest_file(dir, id);
        let bytes = storage.read_all(&file)?;
        let manifest: Manifest = serde_json::from_slice(&bytes)?;
        if manifest.version != MANIFEST_VERSION {
            return Err(Error::Format(format!(
                "manifest `{}` has version {}, expected {}",
                file, manifest.version, MANIFEST_VERSION
            )));
        }
        let total = manifest.files.len();
        let file_map: BTreeMap<String, String> = manifest
            .files
            .into_iter()
            .filter(|(_, path)| storage.exists(path))
            .collect();
        debug!(
            "opened manifest `{}`: kept {} of {} entries",
            file,
            file_map.len(),
            total
        );
        Ok(Self {
            delete_files: manifest.delete_files,
            dir: manifest.dir,
            id: manifest.id,
            file_map,
            buffer_size: DEFAULT_BUFFER_SIZE,
            storage: storage.clone(),
            sink: Arc::new(LogSink),
        })
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(true, ".", "")
    }
}

fn manifest_file(dir: &str, id: &str) -> String {
    if dir == RAM_PREFIX.to_string() {
        format!("{}manifest_{}.json", RAM_PREFIX, id)
    } else {
        format!("{}/manifest_{}.json", dir, id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    version: u32,
    dir: String,
    id: String,
    delete_files: bool,
    files: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_ids_are_unique() {
        let a = next_run_id();
        let b = next_run_id();
        assert_ne!(a, b);
        assert!(a.starts_with(&std::process::id().to_string()));

        let c1 = CacheConfig::default();
        let c2 = CacheConfig::default();
        assert_ne!(c1.id, c2.id);
        assert_eq!(CacheConfig::new(true, ".", "fixed").id, "fixed");
    }

    #[test]
    fn test_child_never_deletes() {
        let mut parent = CacheConfig::in_ram(true);
        parent.file_map.insert("sa".into(), "@sa_x.sdsl".into());
        let child = parent.child();
        assert!(!child.delete_files);
        assert_eq!(child.file_map, parent.file_map);
        assert_eq!(child.id, parent.id);
        assert!(child.is_ram());
    }

    #[test]
    fn test_manifest_keeps_existing_files() {
        let storage = Storage::new();
        let mut config = CacheConfig::new(false, "@", "run1").with_storage(storage.clone());
        storage.write_all("@sa_run1.sdsl", b"x").unwrap();
        config.file_map.insert("sa".into(), "@sa_run1.sdsl".into());
        config.file_map.insert("lcp".into(), "@lcp_run1.sdsl".into());
        let file = config.save_manifest().unwrap();
        assert_eq!(file, "@manifest_run1.json");

        let reopened = CacheConfig::open_manifest(&storage, "@", "run1").unwrap();
        assert_eq!(reopened.id, "run1");
        assert_eq!(reopened.file_map.len(), 1);
        assert!(reopened.file_map.contains_key("sa"));
    }

    #[test]
    fn test_missing_manifest_is_io_error() {
        let storage = Storage::new();
        assert!(matches!(
            CacheConfig::open_manifest(&storage, "@", "nope"),
            Err(Error::Io(_))
        ));
    }
}
