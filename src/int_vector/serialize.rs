//! Binary layout of integer vectors.
//!
//! Every encoding starts with the same 9-byte header:
//!
//! - `u64` little-endian: payload size in bits (`len * width`)
//! - `u8`: element width
//!
//! followed by one of the payloads:
//!
//! - `Fixed`: the packed words, little-endian, last word zero-padded
//! - `VByte`: one varint per element (7 payload bits, high bit = continuation)
//! - `EliasDelta` / `EliasGamma`: `u64` stream length in bits, then the coded
//!   stream words; each element `x` is coded as `x + 1`

use super::coder::{BitReader, BitWriter, Coder, EliasDelta, EliasGamma};
use super::IntVector;
use crate::bits;
use crate::error::{Error, Result};
use crate::storage::Storage;
use std::io::Write;

/// Size of the common header in bytes.
pub const HEADER_SIZE: usize = 9;

/// Payload encoding selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Fixed,
    VByte,
    EliasDelta,
    EliasGamma,
}

/// Write the common header.
pub fn write_header<W: Write>(out: &mut W, len: usize, width: u8) -> Result<usize> {
    out.write_all(&((len as u64) * width as u64).to_le_bytes())?;
    out.write_all(&[width])?;
    Ok(HEADER_SIZE)
}

/// Parse the common header, returning `(len, width)`.
pub fn read_header(bytes: &[u8]) -> Result<(usize, u8)> {
    if bytes.len() < HEADER_SIZE {
        return Err(Error::Format(format!(
            "short read: header needs {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }
    let bit_size = read_u64_le(bytes, 0)?;
    let width = bytes[8];
    if width == 0 || width > 64 {
        return Err(Error::Format(format!("invalid element width {}", width)));
    }
    if bit_size % width as u64 != 0 {
        return Err(Error::Format(format!(
            "bit size {} is not a multiple of width {}",
            bit_size, width
        )));
    }
    Ok(((bit_size / width as u64) as usize, width))
}

/// Read a little-endian `u64` at byte offset `at`.
pub(crate) fn read_u64_le(bytes: &[u8], at: usize) -> Result<u64> {
    let raw = bytes
        .get(at..at + 8)
        .ok_or_else(|| Error::Format(format!("short read at byte {}", at)))?;
    let mut buf = [0u8; 8];
    buf.copy_from_slice(raw);
    Ok(u64::from_le_bytes(buf))
}

/// Longest vbyte encoding of a `u64`.
const MAX_VARINT_BYTES: usize = 10;

/// Append `value` in vbyte form: 7 bits per byte, low group first, the high
/// bit set on every byte but the last.
pub fn encode_varint_u64(value: u64, out: &mut Vec<u8>) {
    let mut rest = value;
    while rest >= 0x80 {
        out.push(0x80 | (rest & 0x7f) as u8);
        rest >>= 7;
    }
    out.push(rest as u8);
}

/// Decode one vbyte value from the front of `bytes`.
///
/// Returns the value and the bytes used. `None` if `bytes` ends inside the
/// value or the encoding carries bits past bit 63.
pub fn decode_varint_u64(bytes: &[u8]) -> Option<(u64, usize)> {
    let mut value = 0u64;
    for (i, &byte) in bytes.iter().take(MAX_VARINT_BYTES).enumerate() {
        let group = (byte & 0x7f) as u64;
        let shift = 7 * i as u32;
        if shift == 63 && group > 1 {
            return None;
        }
        value |= group << shift;
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}

impl IntVector {
    /// Write header and packed payload. Returns bytes written.
    pub fn serialize<W: Write>(&self, out: &mut W) -> Result<usize> {
        let mut written = write_header(out, self.len(), self.width())?;
        let mut buffer = Vec::with_capacity(8 * 1024);
        for &word in self.words() {
            buffer.extend_from_slice(&word.to_le_bytes());
            if buffer.len() >= 8 * 1024 {
                out.write_all(&buffer)?;
                written += buffer.len();
                buffer.clear();
            }
        }
        if !buffer.is_empty() {
            out.write_all(&buffer)?;
            written += buffer.len();
        }
        Ok(written)
    }

    /// Decode a fixed-width vector. Returns the vector and bytes consumed.
    pub fn deserialize(bytes: &[u8]) -> Result<(Self, usize)> {
        let (len, width) = read_header(bytes)?;
        let payload = bytes.len() - HEADER_SIZE;
        let bit_size = len as u64 * width as u64;
        if bit_size > payload as u64 * 8 {
            return Err(Error::Format(format!(
                "short read: {} bits of payload in {} bytes",
                bit_size, payload
            )));
        }
        let words = bits::words_for(bit_size as usize);
        let end = HEADER_SIZE + words * 8;
        if bytes.len() < end {
            return Err(Error::Format(format!(
                "short read: payload needs {} bytes, got {}",
                end - HEADER_SIZE,
                payload
            )));
        }
        let mut v = IntVector::new(len, 0, width);
        for (k, word) in v.data.iter_mut().enumerate() {
            *word = read_u64_le(bytes, HEADER_SIZE + k * 8)?;
        }
        v.clear_tail();
        Ok((v, end))
    }

    /// Write header then one varint per element.
    pub fn serialize_vbyte<W: Write>(&self, out: &mut W) -> Result<usize> {
        let mut written = write_header(out, self.len(), self.width())?;
        let mut buffer = Vec::with_capacity(8 * 1024);
        for value in self.iter() {
            encode_varint_u64(value, &mut buffer);
            if buffer.len() >= 8 * 1024 {
                out.write_all(&buffer)?;
                written += buffer.len();
                buffer.clear();
            }
        }
        out.write_all(&buffer)?;
        written += buffer.len();
        Ok(written)
    }

    pub fn deserialize_vbyte(bytes: &[u8]) -> Result<(Self, usize)> {
        let (len, width) = read_header(bytes)?;
        let payload = bytes.len() - HEADER_SIZE;
        if len > payload {
            return Err(Error::Format(format!(
                "short read: {} vbyte elements in {} bytes",
                len, payload
            )));
        }
        let mut v = IntVector::new(len, 0, width);
        let mut pos = HEADER_SIZE;
        let mask = bits::lo_mask(width as usize);
        for i in 0..len {
            let (value, used) = decode_varint_u64(&bytes[pos..]).ok_or_else(|| {
                Error::Format(format!("short read: vbyte element {} of {}", i, len))
            })?;
            if value > mask {
                return Err(Error::Format(format!(
                    "vbyte element {} = {} exceeds width {}",
                    i, value, width
                )));
            }
            v.set(i, value);
            pos += used;
        }
        Ok((v, pos))
    }

    /// Write header then the elements coded with `C`.
    pub fn serialize_vlen<C: Coder, W: Write>(&self, out: &mut W) -> Result<usize> {
        let mut stream = BitWriter::new();
        for value in self.iter() {
            let shifted = value.checked_add(1).ok_or_else(|| {
                Error::Format(format!("{} cannot code u64::MAX", C::NAME))
            })?;
            C::encode(shifted, &mut stream);
        }
        let (words, stream_len) = stream.into_parts();
        let mut written = write_header(out, self.len(), self.width())?;
        out.write_all(&(stream_len as u64).to_le_bytes())?;
        written += 8;
        for word in words {
            out.write_all(&word.to_le_bytes())?;
            written += 8;
        }
        Ok(written)
    }

    pub fn deserialize_vlen<C: Coder>(bytes: &[u8]) -> Result<(Self, usize)> {
        let (len, width) = read_header(bytes)?;
        let stream_len = read_u64_le(bytes, HEADER_SIZE)?;
        let start = HEADER_SIZE + 8;
        let available = bytes.len().saturating_sub(start) as u64 * 8;
        if stream_len > available {
            return Err(Error::Format(format!(
                "short read: {} stream of {} bits in {} bits",
                C::NAME,
                stream_len,
                available
            )));
        }
        let stream_len = stream_len as usize;
        let word_count = bits::words_for(stream_len);
        let end = start + word_count * 8;
        if bytes.len() < end {
            return Err(Error::Format(format!(
                "short read: {} stream needs {} bytes",
                C::NAME,
                word_count * 8
            )));
        }
        let words = (0..word_count)
            .map(|k| read_u64_le(bytes, start + k * 8))
            .collect::<Result<Vec<u64>>>()?;
        if len > stream_len {
            return Err(Error::Format(format!(
                "short read: {} {} elements in {} bits",
                len,
                C::NAME,
                stream_len
            )));
        }
        let mut reader = BitReader::new(&words, stream_len);
        let mut v = IntVector::new(len, 0, width);
        let mask = bits::lo_mask(width as usize);
        for i in 0..len {
            let value = C::decode(&mut reader)
                .ok_or_else(|| Error::Format(format!("short read: {} element {}", C::NAME, i)))?
                - 1;
            if value > mask {
                return Err(Error::Format(format!(
                    "{} element {} = {} exceeds width {}",
                    C::NAME,
                    i,
                    value,
                    width
                )));
            }
            v.set(i, value);
        }
        Ok((v, end))
    }

    pub fn serialize_with<W: Write>(&self, encoding: Encoding, out: &mut W) -> Result<usize> {
        match encoding {
            Encoding::Fixed => self.serialize(out),
            Encoding::VByte => self.serialize_vbyte(out),
            Encoding::EliasDelta => self.serialize_vlen::<EliasDelta, _>(out),
            Encoding::EliasGamma => self.serialize_vlen::<EliasGamma, _>(out),
        }
    }

    pub fn deserialize_with(encoding: Encoding, bytes: &[u8]) -> Result<(Self, usize)> {
        match encoding {
            Encoding::Fixed => Self::deserialize(bytes),
            Encoding::VByte => Self::deserialize_vbyte(bytes),
            Encoding::EliasDelta => Self::deserialize_vlen::<EliasDelta>(bytes),
            Encoding::EliasGamma => Self::deserialize_vlen::<EliasGamma>(bytes),
        }
    }

    /// Store with the fixed encoding to `file` (disk or RAM).
    pub fn store_to_file(&self, storage: &Storage, file: &str) -> Result<()> {
        self.store_to_file_with(storage, file, Encoding::Fixed)
    }

    pub fn store_to_file_with(&self, storage: &Storage, file: &str, encoding: Encoding) -> Result<()> {
        let mut sink = storage.create(file)?;
        self.serialize_with(encoding, &mut sink)?;
        sink.finish()
    }

    /// Load a fixed-encoded vector from `file` (disk or RAM).
    pub fn load_from_file(storage: &Storage, file: &str) -> Result<Self> {
        Self::load_from_file_with(storage, file, Encoding::Fixed)
    }

    pub fn load_from_file_with(storage: &Storage, file: &str, encoding: Encoding) -> Result<Self> {
        let source = storage.open(file)?;
        let (v, _) = Self::deserialize_with(encoding, &source)?;
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> IntVector {
        let mut v = IntVector::new(0, 0, 20);
        for i in 0..1000u64 {
            v.push((i * i * 31) % (1 << 20));
        }
        v
    }

    #[test]
    fn test_header_layout() {
        let v = IntVector::from_slice(&[1, 2, 3]);
        let mut buf = Vec::new();
        let written = v.serialize(&mut buf).unwrap();
        assert_eq!(written, buf.len());
        assert_eq!(&buf[..8], &6u64.to_le_bytes());
        assert_eq!(buf[8], 2);
        assert_eq!(buf.len(), HEADER_SIZE + 8);
    }

    #[test]
    fn test_every_encoding_restores_size_and_width() {
        let v = sample();
        for enc in [
            Encoding::Fixed,
            Encoding::VByte,
            Encoding::EliasDelta,
            Encoding::EliasGamma,
        ] {
            let mut buf = Vec::new();
            v.serialize_with(enc, &mut buf).unwrap();
            let (back, used) = IntVector::deserialize_with(enc, &buf).unwrap();
            assert_eq!(used, buf.len(), "{:?}", enc);
            assert_eq!(back.len(), v.len());
            assert_eq!(back.width(), v.width());
            assert_eq!(back, v);
        }
    }

    #[test]
    fn test_short_reads_fail() {
        let v = sample();
        for enc in [
            Encoding::Fixed,
            Encoding::VByte,
            Encoding::EliasDelta,
            Encoding::EliasGamma,
        ] {
            let mut buf = Vec::new();
            v.serialize_with(enc, &mut buf).unwrap();
            buf.truncate(buf.len() - 3);
            assert!(
                matches!(IntVector::deserialize_with(enc, &buf), Err(Error::Format(_))),
                "{:?}",
                enc
            );
        }
        assert!(IntVector::deserialize(&[0; 4]).is_err());
    }

    #[test]
    fn test_invalid_header() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&7u64.to_le_bytes());
        buf.push(2); // 7 bits is not a multiple of width 2
        assert!(IntVector::deserialize(&buf).is_err());

        let mut buf = Vec::new();
        buf.extend_from_slice(&0u64.to_le_bytes());
        buf.push(65);
        assert!(IntVector::deserialize(&buf).is_err());
    }

    #[test]
    fn test_vbyte_is_compact_for_small_values() {
        let v = IntVector::new(100, 5, 64);
        let mut fixed = Vec::new();
        let mut vbyte = Vec::new();
        v.serialize(&mut fixed).unwrap();
        v.serialize_vbyte(&mut vbyte).unwrap();
        assert_eq!(vbyte.len(), HEADER_SIZE + 100);
        assert!(vbyte.len() < fixed.len());
    }

    #[test]
    fn test_store_and_load_ram_file() {
        let storage = Storage::new();
        let v = sample();
        v.store_to_file(&storage, "@vec").unwrap();
        assert_eq!(IntVector::load_from_file(&storage, "@vec").unwrap(), v);
        assert!(IntVector::load_from_file(&storage, "@missing").is_err());
    }

    #[test]
    fn test_oversized_headers_are_rejected() {
        // bit size 2^46 at width 64: 2^40 elements with no payload behind them
        let mut header = Vec::new();
        write_header(&mut header, 1 << 40, 64).unwrap();
        for encoding in [Encoding::Fixed, Encoding::VByte] {
            assert!(matches!(
                IntVector::deserialize_with(encoding, &header),
                Err(Error::Format(_))
            ));
        }

        let mut widest = Vec::new();
        write_header(&mut widest, u64::MAX as usize, 1).unwrap();
        assert!(matches!(IntVector::deserialize(&widest), Err(Error::Format(_))));

        let mut vlen = header.clone();
        vlen.extend_from_slice(&64u64.to_le_bytes());
        vlen.extend_from_slice(&u64::MAX.to_le_bytes());
        for encoding in [Encoding::EliasGamma, Encoding::EliasDelta] {
            assert!(matches!(
                IntVector::deserialize_with(encoding, &vlen),
                Err(Error::Format(_))
            ));
        }

        let mut endless = header.clone();
        endless.extend_from_slice(&u64::MAX.to_le_bytes());
        for encoding in [Encoding::EliasGamma, Encoding::EliasDelta] {
            assert!(matches!(
                IntVector::deserialize_with(encoding, &endless),
                Err(Error::Format(_))
            ));
        }
    }

    #[test]
    fn test_varint_rejects_overlong_values() {
        let mut max = Vec::new();
        encode_varint_u64(u64::MAX, &mut max);
        assert_eq!(max.len(), 10);
        assert_eq!(*max.last().unwrap(), 0x01);

        let mut overflow = max.clone();
        *overflow.last_mut().unwrap() = 0x02;
        assert_eq!(decode_varint_u64(&overflow), None);

        let mut eleven = max.clone();
        *eleven.last_mut().unwrap() = 0x81;
        eleven.push(0x00);
        assert_eq!(decode_varint_u64(&eleven), None);

        assert_eq!(decode_varint_u64(&max[..9]), None);
    }

    #[test]
    fn test_varint_roundtrip() {
        let values = [0, 1, 127, 128, 16383, 16384, u64::MAX];
        for value in values {
            let mut buf = Vec::new();
            encode_varint_u64(value, &mut buf);
            let (decoded, _) = decode_varint_u64(&buf).unwrap();
            assert_eq!(value, decoded);
        }
    }
}
