//! Universal codes for positive integers.
//!
//! Codes are written into a bit stream least significant bit first. Both
//! coders handle `x >= 1`; the variable-length vector encoding shifts every
//! value by one before coding.

use crate::bits::{self, WORD_BITS};

/// Append-only bit stream.
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    words: Vec<u64>,
    len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the low `width` bits of `value` (`width <= 64`).
    pub fn write(&mut self, value: u64, width: u8) {
        if width == 0 {
            return;
        }
        let end = self.len + width as usize;
        self.words.resize(bits::words_for(end), 0);
        bits::write_bits(&mut self.words, self.len, width, value);
        self.len = end;
    }

    /// Append `count` zero bits.
    pub fn write_zeros(&mut self, count: usize) {
        let mut rest = count;
        while rest > 0 {
            let chunk = rest.min(WORD_BITS);
            self.write(0, chunk as u8);
            rest -= chunk;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn into_parts(self) -> (Vec<u64>, usize) {
        (self.words, self.len)
    }
}

/// Cursor over a bit stream of known length.
pub struct BitReader<'a> {
    words: &'a [u64],
    len: usize,
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(words: &'a [u64], len: usize) -> Self {
        Self { words, len, pos: 0 }
    }

    /// Read `width` bits, or `None` if the stream is exhausted.
    pub fn read(&mut self, width: u8) -> Option<u64> {
        if width == 0 {
            return Some(0);
        }
        if self.pos + width as usize > self.len {
            return None;
        }
        let value = bits::read_bits(self.words, self.pos, width);
        self.pos += width as usize;
        Some(value)
    }

    /// Count zero bits up to and including the next one bit.
    pub fn read_unary(&mut self) -> Option<usize> {
        let mut zeros = 0;
        loop {
            if self.read(1)? == 1 {
                return Some(zeros);
            }
            zeros += 1;
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.len
    }
}

/// A prefix-free code for integers `>= 1`.
pub trait Coder {
    /// Short name stored alongside encoded data.
    const NAME: &'static str;

    /// Bits used to encode `x`.
    fn encoding_length(x: u64) -> usize;

    fn encode(x: u64, out: &mut BitWriter);

    fn decode(input: &mut BitReader<'_>) -> Option<u64>;
}

/// Elias gamma: `N` zeros, a one, then the `N` bits below the leading one.
pub struct EliasGamma;

impl Coder for EliasGamma {
    const NAME: &'static str = "elias_gamma";

    fn encoding_length(x: u64) -> usize {
        debug_assert!(x > 0);
        2 * (bits::bit_len(x) as usize - 1) + 1
    }

    fn encode(x: u64, out: &mut BitWriter) {
        debug_assert!(x > 0);
        let n = bits::bit_len(x) - 1;
        out.write_zeros(n as usize);
        out.write(1, 1);
        out.write(x, n);
    }

    fn decode(input: &mut BitReader<'_>) -> Option<u64> {
        let n = input.read_unary()?;
        if n >= WORD_BITS {
            return None;
        }
        let rest = input.read(n as u8)?;
        Some((1u64 << n) | rest)
    }
}

/// Elias delta: the bit length in gamma code, then the bits below the leading one.
pub struct EliasDelta;

impl Coder for EliasDelta {
    const NAME: &'static str = "elias_delta";

    fn encoding_length(x: u64) -> usize {
        debug_assert!(x > 0);
        let len = bits::bit_len(x) as u64;
        EliasGamma::encoding_length(len) + len as usize - 1
    }

    fn encode(x: u64, out: &mut BitWriter) {
        debug_assert!(x > 0);
        let len = bits::bit_len(x);
        EliasGamma::encode(len as u64, out);
        out.write(x, len - 1);
    }

    fn decode(input: &mut BitReader<'_>) -> Option<u64> {
        let len = EliasGamma::decode(input)?;
        if len == 0 || len > WORD_BITS as u64 {
            return None;
        }
        let rest = input.read((len - 1) as u8)?;
        Some((1u64 << (len - 1)) | rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<C: Coder>(values: &[u64]) {
        let mut w = BitWriter::new();
        let mut expected_len = 0;
        for &v in values {
            C::encode(v, &mut w);
            expected_len += C::encoding_length(v);
        }
        assert_eq!(w.len(), expected_len);
        let (words, len) = w.into_parts();
        let mut r = BitReader::new(&words, len);
        for &v in values {
            assert_eq!(C::decode(&mut r), Some(v));
        }
        assert!(r.is_exhausted());
        assert_eq!(C::decode(&mut r), None);
    }

    #[test]
    fn test_gamma_lengths() {
        assert_eq!(EliasGamma::encoding_length(1), 1);
        assert_eq!(EliasGamma::encoding_length(2), 3);
        assert_eq!(EliasGamma::encoding_length(7), 5);
        assert_eq!(EliasGamma::encoding_length(8), 7);
    }

    #[test]
    fn test_delta_lengths() {
        assert_eq!(EliasDelta::encoding_length(1), 1);
        assert_eq!(EliasDelta::encoding_length(2), 4);
        assert_eq!(EliasDelta::encoding_length(17), 9);
    }

    #[test]
    fn test_codes_decode_mixed_streams() {
        let values = [1, 2, 3, 100, 1 << 40, u64::MAX, 5];
        round_trip::<EliasGamma>(&values);
        round_trip::<EliasDelta>(&values);
    }

    #[test]
    fn test_truncated_stream() {
        let mut w = BitWriter::new();
        EliasDelta::encode(1000, &mut w);
        let (words, len) = w.into_parts();
        let mut r = BitReader::new(&words, len - 1);
        assert_eq!(EliasDelta::decode(&mut r), None);
    }
}
