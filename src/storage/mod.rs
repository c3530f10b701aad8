//! Dual-mode byte store.
//!
//! Paths starting with [`RAM_PREFIX`] name RAM files held by a [`RamFs`]
//! registry; every other path is an ordinary disk file. A [`Storage`] handle
//! routes each operation to the right backend.
//!
//! Reads hand back a [`ByteSource`] (a memory map for disk files, a shared
//! buffer for RAM files). Writes go through a [`ByteSink`], which commits RAM
//! content to the registry when finished or dropped.

pub mod ram_fs;

pub use ram_fs::RamFs;

use crate::error::{Error, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufWriter, Cursor, Seek, SeekFrom, Write};
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

/// First character of every RAM file name.
pub const RAM_PREFIX: char = '@';

/// True if `file` names a RAM file.
pub fn is_ram_file(file: &str) -> bool {
    file.starts_with(RAM_PREFIX)
}

/// RAM form of `file` (adds the prefix if missing).
pub fn ram_file_name(file: &str) -> String {
    if is_ram_file(file) {
        file.to_string()
    } else {
        format!("{}{}", RAM_PREFIX, file)
    }
}

/// Disk form of `file` (strips the prefix if present).
pub fn disk_file_name(file: &str) -> String {
    file.strip_prefix(RAM_PREFIX).unwrap_or(file).to_string()
}

/// Last path component of `file`, without the RAM prefix.
pub fn basename(file: &str) -> String {
    let disk = disk_file_name(file);
    Path::new(&disk)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Parent directory of `file`; RAM files keep their prefix.
pub fn dirname(file: &str) -> String {
    let ram = is_ram_file(file);
    let disk = disk_file_name(file);
    let parent = match Path::new(&disk).parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_string_lossy().into_owned(),
        Some(_) => ".".to_string(),
        None => "/".to_string(),
    };
    if ram {
        if parent == "." {
            ram_file_name("")
        } else {
            ram_file_name(&parent)
        }
    } else {
        parent
    }
}

/// Read-only bytes of a stored file.
pub enum ByteSource {
    Mapped(Mmap),
    Ram(Arc<Vec<u8>>),
    Empty,
}

impl Deref for ByteSource {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            ByteSource::Mapped(map) => map,
            ByteSource::Ram(data) => data.as_slice(),
            ByteSource::Empty => &[],
        }
    }
}

/// Sequential, seekable writer into either backend.
pub enum ByteSink {
    Disk(BufWriter<File>),
    Ram(RamSink),
}

impl ByteSink {
    /// Flush and commit the written bytes.
    pub fn finish(self) -> Result<()> {
        match self {
            ByteSink::Disk(mut w) => {
                w.flush()?;
                Ok(())
            }
            ByteSink::Ram(mut sink) => {
                sink.commit();
                Ok(())
            }
        }
    }
}

impl Write for ByteSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            ByteSink::Disk(w) => w.write(buf),
            ByteSink::Ram(s) => s.buf.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            ByteSink::Disk(w) => w.flush(),
            ByteSink::Ram(_) => Ok(()),
        }
    }
}

impl Seek for ByteSink {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            ByteSink::Disk(w) => w.seek(pos),
            ByteSink::Ram(s) => s.buf.seek(pos),
        }
    }
}

/// Write buffer for a RAM file; stored into the registry on commit or drop.
pub struct RamSink {
    name: String,
    buf: Cursor<Vec<u8>>,
    fs: RamFs,
    committed: bool,
}

impl RamSink {
    fn commit(&mut self) {
        if !self.committed {
            let data = std::mem::take(self.buf.get_mut());
            self.fs.store(&self.name, data);
            self.committed = true;
        }
    }
}

impl Drop for RamSink {
    fn drop(&mut self) {
        self.commit();
    }
}

/// Handle routing file operations to disk or to a RAM registry.
///
/// Clones share the same registry. Distinct `Storage::new()` handles are
/// fully isolated from each other.
#[derive(Clone, Default, Debug)]
pub struct Storage {
    ram: RamFs,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage backed by an existing registry.
    pub fn with_ram_fs(ram: RamFs) -> Self {
        Self { ram }
    }

    pub fn ram_fs(&self) -> &RamFs {
        &self.ram
    }

    pub fn exists(&self, file: &str) -> bool {
        if is_ram_file(file) {
            self.ram.exists(file)
        } else {
            Path::new(file).is_file()
        }
    }

    /// Size in bytes; 0 when the file does not exist.
    pub fn file_size(&self, file: &str) -> u64 {
        if is_ram_file(file) {
            self.ram.file_size(file) as u64
        } else {
            std::fs::metadata(file).map(|m| m.len()).unwrap_or(0)
        }
    }

    /// Open `file` for reading.
    pub fn open(&self, file: &str) -> Result<ByteSource> {
        if is_ram_file(file) {
            return self.ram.content(file).map(ByteSource::Ram).ok_or_else(|| {
                Error::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("RAM file `{}` not found", file),
                ))
            });
        }
        let handle = File::open(file)?;
        if handle.metadata()?.len() == 0 {
            return Ok(ByteSource::Empty);
        }
        // The file is only read through this map while the pipeline owns it.
        let map = unsafe { Mmap::map(&handle)? };
        Ok(ByteSource::Mapped(map))
    }

    /// Create (or truncate) `file` for writing.
    pub fn create(&self, file: &str) -> Result<ByteSink> {
        if is_ram_file(file) {
            Ok(ByteSink::Ram(RamSink {
                name: file.to_string(),
                buf: Cursor::new(Vec::new()),
                fs: self.ram.clone(),
                committed: false,
            }))
        } else {
            let handle = File::create(file)?;
            Ok(ByteSink::Disk(BufWriter::with_capacity(65536, handle)))
        }
    }

    /// Read the whole of `file` into memory.
    pub fn read_all(&self, file: &str) -> Result<Vec<u8>> {
        Ok(self.open(file)?.to_vec())
    }

    /// Replace the content of `file` with `data`.
    pub fn write_all(&self, file: &str, data: &[u8]) -> Result<()> {
        if is_ram_file(file) {
            self.ram.store(file, data.to_vec());
            return Ok(());
        }
        let mut sink = self.create(file)?;
        sink.write_all(data)?;
        sink.finish()
    }

    /// Remove `file` from its backend.
    pub fn remove(&self, file: &str) -> Result<()> {
        if is_ram_file(file) {
            self.ram.remove(file);
            Ok(())
        } else {
            std::fs::remove_file(file)?;
            Ok(())
        }
    }

    /// Rename within one backend. Moving between RAM and disk is rejected.
    pub fn rename(&self, old: &str, new: &str) -> Result<()> {
        match (is_ram_file(old), is_ram_file(new)) {
            (true, true) => {
                if self.ram.rename(old, new) {
                    Ok(())
                } else {
                    Err(Error::Io(io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("RAM file `{}` not found", old),
                    )))
                }
            }
            (false, false) => {
                std::fs::rename(old, new)?;
                Ok(())
            }
            _ => Err(Error::CrossBackend {
                from: old.to_string(),
                to: new.to_string(),
            }),
        }
    }
}
