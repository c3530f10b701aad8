//! Parsing input texts.

use crate::cache::AlphabetWidth;
use crate::error::{Error, Result};
use crate::int_vector::IntVector;
use crate::storage::Storage;
use memchr::memchr;
use std::fmt;
use std::str::FromStr;

/// On-disk representation of an input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputFormat {
    /// A serialized [`IntVector`].
    #[default]
    Serialized,
    /// One symbol per byte.
    Bytes,
    /// Big-endian 2-byte symbols.
    U16,
    /// Big-endian 4-byte symbols.
    U32,
    /// Big-endian 8-byte symbols.
    U64,
    /// Whitespace-separated decimal numbers.
    Decimal,
}

impl InputFormat {
    /// Format for a `num_bytes` code: 0, 1, 2, 4, 8 or `b'd'`.
    pub fn from_num_bytes(num_bytes: u8) -> Option<Self> {
        match num_bytes {
            0 => Some(InputFormat::Serialized),
            1 => Some(InputFormat::Bytes),
            2 => Some(InputFormat::U16),
            4 => Some(InputFormat::U32),
            8 => Some(InputFormat::U64),
            b'd' => Some(InputFormat::Decimal),
            _ => None,
        }
    }

    fn symbol_bytes(self) -> Option<usize> {
        match self {
            InputFormat::Bytes => Some(1),
            InputFormat::U16 => Some(2),
            InputFormat::U32 => Some(4),
            InputFormat::U64 => Some(8),
            _ => None,
        }
    }
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s {
            "int" | "serialized" => Ok(InputFormat::Serialized),
            "bytes" => Ok(InputFormat::Bytes),
            "u16" => Ok(InputFormat::U16),
            "u32" => Ok(InputFormat::U32),
            "u64" => Ok(InputFormat::U64),
            "decimal" => Ok(InputFormat::Decimal),
            other => Err(format!(
                "unknown input format `{}` (expected bytes, int, u16, u32, u64 or decimal)",
                other
            )),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InputFormat::Serialized => "int",
            InputFormat::Bytes => "bytes",
            InputFormat::U16 => "u16",
            InputFormat::U32 => "u32",
            InputFormat::U64 => "u64",
            InputFormat::Decimal => "decimal",
        };
        f.write_str(s)
    }
}

/// Read `file` as a sequence of symbols.
///
/// Byte alphabets produce width-8 vectors and reject symbols above 255;
/// integer alphabets are bit-compressed.
pub fn load_vector_from_file(
    storage: &Storage,
    file: &str,
    format: InputFormat,
    alphabet: AlphabetWidth,
) -> Result<IntVector> {
    let mut text = match format {
        InputFormat::Serialized => IntVector::load_from_file(storage, file)?,
        InputFormat::Decimal => parse_decimal(&storage.read_all(file)?, file)?,
        fixed => {
            let source = storage.open(file)?;
            let width = fixed.symbol_bytes().unwrap_or(1);
            if source.len() % width != 0 {
                return Err(Error::Format(format!(
                    "`{}`: size {} is not a multiple of {} bytes",
                    file,
                    source.len(),
                    width
                )));
            }
            if width == 1 {
                IntVector::from_bytes(&source)
            } else {
                let mut v = IntVector::new(source.len() / width, 0, 64);
                for (i, chunk) in source.chunks_exact(width).enumerate() {
                    v.set(i, chunk.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64));
                }
                v
            }
        }
    };

    match alphabet {
        AlphabetWidth::Byte => {
            if text.width() != 8 {
                let max = text.max_value();
                if max > u8::MAX as u64 {
                    return Err(Error::Precondition(format!(
                        "`{}` contains symbol {} which does not fit a byte alphabet",
                        file, max
                    )));
                }
                text.set_width(8);
            }
        }
        AlphabetWidth::Integer => text.bit_compress(),
    }
    Ok(text)
}

fn parse_decimal(bytes: &[u8], file: &str) -> Result<IntVector> {
    let content = std::str::from_utf8(bytes)
        .map_err(|e| Error::Format(format!("`{}` is not valid UTF-8: {}", file, e)))?;
    let mut values = Vec::new();
    for token in content.split_ascii_whitespace() {
        let value = token
            .parse::<u64>()
            .map_err(|e| Error::Format(format!("`{}`: bad number `{}`: {}", file, token, e)))?;
        values.push(value);
    }
    Ok(IntVector::from_slice(&values))
}

/// Ok if no symbol of `text` is 0; otherwise a precondition error naming
/// `file`.
pub fn contains_no_zero_symbol(text: &IntVector, file: &str) -> Result<()> {
    let found = if text.width() == 8 {
        let bytes: Vec<u8> = text.words().iter().flat_map(|w| w.to_le_bytes()).collect();
        memchr(0, &bytes[..text.len()]).is_some()
    } else {
        text.iter().any(|x| x == 0)
    };
    if found {
        return Err(Error::Precondition(format!(
            "file `{}` contains zero symbol",
            file
        )));
    }
    Ok(())
}

/// Append the 0 sentinel.
pub fn append_zero_symbol(text: &mut IntVector) {
    text.push(0);
}
