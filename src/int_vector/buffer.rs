//! Streaming access to stored integer vectors.
//!
//! [`IntVectorReader`] decodes a window of `buffer_size` elements at a time
//! from a stored fixed-encoded vector. [`IntVectorWriter`] packs elements
//! into the sink as the window fills, then patches the header on close.
//! Both keep at most one window of decoded values in memory.

use super::serialize::{read_header, write_header, HEADER_SIZE};
use crate::bits::{self, WORD_BITS};
use crate::error::{Error, Result};
use crate::storage::{ByteSink, ByteSource, Storage};
use log::trace;
use std::io::{Seek, SeekFrom, Write};

/// Default window size in elements.
pub const DEFAULT_BUFFER_SIZE: usize = 1_000_000;

/// Windowed reader over a stored vector.
pub struct IntVectorReader {
    source: ByteSource,
    len: usize,
    width: u8,
    buffer_size: usize,
    window_start: usize,
    window: Vec<u64>,
}

impl IntVectorReader {
    pub fn open(storage: &Storage, file: &str) -> Result<Self> {
        Self::with_buffer_size(storage, file, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_buffer_size(storage: &Storage, file: &str, buffer_size: usize) -> Result<Self> {
        let source = storage.open(file)?;
        let (len, width) = read_header(&source)?;
        let needed = HEADER_SIZE + bits::words_for(len * width as usize) * 8;
        if source.len() < needed {
            return Err(Error::Format(format!(
                "short read: `{}` holds {} bytes, header declares {}",
                file,
                source.len(),
                needed
            )));
        }
        Ok(Self {
            source,
            len,
            width,
            buffer_size: buffer_size.max(1),
            window_start: 0,
            window: Vec::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    /// Change the window size; takes effect on the next window load.
    pub fn set_buffer_size(&mut self, buffer_size: usize) {
        self.buffer_size = buffer_size.max(1);
    }

    /// Element `i`. Panics if `i >= len`.
    pub fn get(&mut self, i: usize) -> u64 {
        assert!(i < self.len, "index {} out of bounds (len {})", i, self.len);
        if i < self.window_start || i >= self.window_start + self.window.len() {
            self.load_window(i);
        }
        self.window[i - self.window_start]
    }

    /// Sequential iterator from the first element.
    pub fn iter(&mut self) -> ReaderIter<'_> {
        ReaderIter { reader: self, pos: 0 }
    }

    fn load_window(&mut self, start: usize) {
        let end = (start + self.buffer_size).min(self.len);
        trace!("loading window [{}, {}) of {}", start, end, self.len);
        self.window.clear();
        let payload = &self.source[HEADER_SIZE..];
        let width = self.width as usize;
        for i in start..end {
            self.window.push(read_bits_le(payload, i * width, self.width));
        }
        self.window_start = start;
    }
}

/// Iterator returned by [`IntVectorReader::iter`].
pub struct ReaderIter<'a> {
    reader: &'a mut IntVectorReader,
    pos: usize,
}

impl Iterator for ReaderIter<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.pos >= self.reader.len {
            return None;
        }
        let value = self.reader.get(self.pos);
        self.pos += 1;
        Some(value)
    }
}

fn word_at(payload: &[u8], k: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&payload[k * 8..k * 8 + 8]);
    u64::from_le_bytes(buf)
}

/// `read_bits` over little-endian payload bytes.
fn read_bits_le(payload: &[u8], offset: usize, width: u8) -> u64 {
    let w = width as usize;
    let k = offset / WORD_BITS;
    let shift = offset % WORD_BITS;
    let mut value = word_at(payload, k) >> shift;
    if shift + w > WORD_BITS {
        value |= word_at(payload, k + 1) << (WORD_BITS - shift);
    }
    value & bits::lo_mask(w)
}

/// Sequential writer producing a fixed-encoded vector.
///
/// Elements may be written with [`push`](Self::push) or with
/// [`set`](Self::set) at any index inside the unflushed window; indices
/// below the flushed prefix are rejected.
pub struct IntVectorWriter {
    sink: ByteSink,
    file: String,
    width: u8,
    buffer_size: usize,
    flushed: usize,
    window: Vec<u64>,
    pending: u64,
    pending_bits: usize,
}

impl IntVectorWriter {
    pub fn create(storage: &Storage, file: &str, width: u8) -> Result<Self> {
        Self::with_buffer_size(storage, file, width, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_buffer_size(
        storage: &Storage,
        file: &str,
        width: u8,
        buffer_size: usize,
    ) -> Result<Self> {
        let width = width.clamp(1, WORD_BITS as u8);
        let mut sink = storage.create(file)?;
        // Placeholder, rewritten on close.
        write_header(&mut sink, 0, width)?;
        Ok(Self {
            sink,
            file: file.to_string(),
            width,
            buffer_size: buffer_size.max(1),
            flushed: 0,
            window: Vec::new(),
            pending: 0,
            pending_bits: 0,
        })
    }

    /// Number of elements written so far.
    pub fn len(&self) -> usize {
        self.flushed + self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn push(&mut self, value: u64) -> Result<()> {
        debug_assert!(value <= bits::lo_mask(self.width as usize));
        self.window.push(value & bits::lo_mask(self.width as usize));
        if self.window.len() >= self.buffer_size {
            self.flush_window()?;
        }
        Ok(())
    }

    /// Write element `i`; gaps up to `i` are filled with zeros.
    pub fn set(&mut self, i: usize, value: u64) -> Result<()> {
        if i < self.flushed {
            return Err(Error::Precondition(format!(
                "`{}`: element {} was already flushed (flushed prefix {})",
                self.file, i, self.flushed
            )));
        }
        let end = self.len();
        if i < end {
            self.window[i - self.flushed] = value & bits::lo_mask(self.width as usize);
            return Ok(());
        }
        for _ in end..i {
            self.push(0)?;
        }
        self.push(value)
    }

    fn flush_window(&mut self) -> Result<()> {
        let width = self.width as usize;
        let mut out = Vec::with_capacity(self.window.len() * width / 8 + 8);
        for &value in &self.window {
            self.pending |= value << self.pending_bits;
            let taken = WORD_BITS - self.pending_bits;
            if width >= taken {
                out.extend_from_slice(&self.pending.to_le_bytes());
                self.pending = if taken == WORD_BITS { 0 } else { value >> taken };
                self.pending_bits = width - taken;
            } else {
                self.pending_bits += width;
            }
        }
        self.sink.write_all(&out)?;
        trace!("flushed {} elements to `{}`", self.window.len(), self.file);
        self.flushed += self.window.len();
        self.window.clear();
        Ok(())
    }

    /// Flush the rest, patch the header and commit. Returns the element count.
    pub fn close(mut self) -> Result<usize> {
        self.flush_window()?;
        if self.pending_bits > 0 {
            self.sink.write_all(&self.pending.to_le_bytes())?;
        }
        let len = self.flushed;
        self.sink.seek(SeekFrom::Start(0))?;
        write_header(&mut self.sink, len, self.width)?;
        self.sink.seek(SeekFrom::End(0))?;
        self.sink.finish()?;
        Ok(len)
    }
}
