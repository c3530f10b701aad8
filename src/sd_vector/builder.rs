use crate::bits;
use crate::error::{Error, Result};
use crate::int_vector::{BitVector, IntVector};

/// Streaming builder for an [`SdVector`](super::SdVector).
///
/// Receives exactly `capacity` positions in strictly increasing order, then
/// is consumed by [`SdVector::from_builder`](super::SdVector::from_builder).
#[derive(Debug, Clone, Default)]
pub struct SdVectorBuilder {
    pub(super) len: usize,
    capacity: usize,
    pub(super) wl: u8,
    /// One past the last inserted position.
    tail: usize,
    items: usize,
    pub(super) low: IntVector,
    pub(super) high: BitVector,
}

impl SdVectorBuilder {
    /// Builder for a vector of `len` bits with `capacity` ones.
    pub fn new(len: usize, capacity: usize) -> Result<Self> {
        if capacity > len {
            return Err(Error::Precondition(format!(
                "requested capacity {} is larger than vector size {}",
                capacity, len
            )));
        }
        let (wl, logm) = split_widths(len, capacity);
        Ok(Self {
            len,
            capacity,
            wl,
            tail: 0,
            items: 0,
            low: IntVector::new(capacity, 0, wl.max(1)),
            high: IntVector::bit_vector(capacity + (1usize << logm)),
        })
    }

    /// Set bit `pos`. Positions must be strictly increasing and below `len`.
    pub fn push(&mut self, pos: usize) -> Result<()> {
        if self.items >= self.capacity {
            return Err(Error::Precondition(format!(
                "builder is full ({} items)",
                self.capacity
            )));
        }
        if pos < self.tail {
            return Err(Error::Precondition(format!(
                "position {} is before the tail {}",
                pos, self.tail
            )));
        }
        if pos >= self.len {
            return Err(Error::out_of_range(pos, self.len));
        }
        let high = high_part(pos, self.wl);
        self.high.set_bit(high + self.items, true);
        self.low.set(self.items, pos as u64 & bits::lo_mask(self.wl as usize));
        self.tail = pos + 1;
        self.items += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Positions inserted so far.
    pub fn items(&self) -> usize {
        self.items
    }

    pub fn is_full(&self) -> bool {
        self.items == self.capacity
    }
}

/// Low-part width and `logm` for `len` bits with `ones` set.
pub(super) fn split_widths(len: usize, ones: usize) -> (u8, u8) {
    let mut logm = bits::bit_len(ones as u64);
    let logn = bits::bit_len(len as u64);
    if logm == logn && logm > 0 {
        logm -= 1;
    }
    (logn - logm, logm)
}

#[inline]
pub(super) fn high_part(pos: usize, wl: u8) -> usize {
    pos.checked_shr(wl as u32).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths() {
        // n = 1000 (10 bits), m = 10 (4 bits)
        assert_eq!(split_widths(1000, 10), (6, 4));
        // equal bit lengths keep the low part non-empty
        assert_eq!(split_widths(8, 8), (1, 3));
        assert_eq!(split_widths(0, 0), (0, 0));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            SdVectorBuilder::new(5, 6),
            Err(Error::Precondition(_))
        ));

        let mut b = SdVectorBuilder::new(100, 3).unwrap();
        b.push(10).unwrap();
        assert!(b.push(10).is_err());
        assert!(b.push(5).is_err());
        assert!(matches!(b.push(100), Err(Error::OutOfRange { .. })));
        b.push(11).unwrap();
        b.push(99).unwrap();
        assert!(b.is_full());
        assert!(b.push(99).is_err());
    }
}
