//! Bitfield groups: fields of arbitrary width packed MSB-first into whole bytes.
//!
//! Bits are addressed in MSB-first order: bit 0 is the high bit of the first byte.

use crate::errors::{FormatError, PackError, UnpackError};

/// Widest single field a group may declare.
pub const MAX_FIELD_BITS: usize = 32;

/// A parsed `(w1 w2 ...)` group. Construction guarantees no single width
/// exceeds [MAX_FIELD_BITS]. Octet alignment of the total is checked by
/// [Bitfield::pack] and [Bitfield::unpack], after the values themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitfield {
    widths: Vec<u32>,
    total_bits: usize,
    pos: usize,
}

impl Bitfield {
    /// Validates a bit-length list. `pos` is the position of the group in the
    /// format string, used for error reporting.
    pub fn new(widths: Vec<u32>, pos: usize) -> Result<Self, FormatError> {
        let mut total_bits = 0usize;
        for &width in &widths {
            if width as usize > MAX_FIELD_BITS {
                return Err(FormatError::BitfieldTooWide {
                    width: width as usize,
                    pos,
                });
            }
            total_bits += width as usize;
        }

        Ok(Self {
            widths,
            total_bits,
            pos,
        })
    }

    pub fn check_aligned(&self) -> Result<(), FormatError> {
        if self.total_bits % 8 != 0 {
            return Err(FormatError::BitfieldNotOctetAligned {
                total_bits: self.total_bits,
                pos: self.pos,
            });
        }

        Ok(())
    }

    pub fn widths(&self) -> &[u32] {
        &self.widths
    }

    pub fn total_bits(&self) -> usize {
        self.total_bits
    }

    /// Number of bytes the group occupies, rounded down for unaligned groups.
    pub fn byte_len(&self) -> usize {
        self.total_bits / 8
    }

    /// Number of values the group consumes or produces.
    pub fn field_count(&self) -> usize {
        self.widths.len()
    }

    /// Packs one value per width, MSB-first, with no padding between fields.
    pub fn pack(&self, values: &[u64]) -> Result<Vec<u8>, PackError> {
        if values.len() < self.widths.len() {
            return Err(PackError::NotEnoughArguments);
        }

        for (&width, &value) in self.widths.iter().zip(values) {
            if value >> width != 0 {
                return Err(PackError::ValueTooBigForBits {
                    value: value as i64,
                    width,
                });
            }
        }

        self.check_aligned()?;

        let mut out = Vec::with_capacity(self.byte_len());
        let mut byte = 0u8;
        let mut bit_pos = 0;

        for (&width, &value) in self.widths.iter().zip(values) {
            for shift in (0..width).rev() {
                byte = (byte << 1) | ((value >> shift) & 1) as u8;
                bit_pos += 1;
                if bit_pos == 8 {
                    out.push(byte);
                    byte = 0;
                    bit_pos = 0;
                }
            }
        }

        debug_assert_eq!(bit_pos, 0);
        debug_assert_eq!(out.len(), self.byte_len());

        Ok(out)
    }

    /// Reads one value per width starting at byte `pos` of `data`.
    pub fn unpack(&self, data: &[u8], pos: usize) -> Result<Vec<u64>, UnpackError> {
        self.check_aligned()?;

        let available = data.len().saturating_sub(pos);
        if available < self.byte_len() {
            return Err(UnpackError::NotEnoughData {
                offset: pos,
                needed: self.byte_len(),
                available,
            });
        }

        let mut values = Vec::with_capacity(self.widths.len());
        let mut bit_pos = pos * 8;

        for &width in &self.widths {
            let value = read_bits_at(data, bit_pos, width as usize).ok_or(
                UnpackError::NotEnoughData {
                    offset: pos,
                    needed: self.byte_len(),
                    available,
                },
            )?;
            values.push(value);
            bit_pos += width as usize;
        }

        Ok(values)
    }
}

/// Reads a single bit at `bit_pos` (0 = MSB of first byte). Returns 0 or 1.
pub fn read_bit_at(data: &[u8], bit_pos: usize) -> Option<u8> {
    let byte = data.get(bit_pos / 8)?;
    Some((byte >> (7 - bit_pos % 8)) & 1)
}

/// Reads `n` bits starting at `bit_pos` as an unsigned value (max 64 bits). MSB-first.
pub fn read_bits_at(data: &[u8], bit_pos: usize, n: usize) -> Option<u64> {
    if n > 64 {
        return None;
    }

    if bit_pos
        .checked_add(n)
        .is_none_or(|end| end > data.len() * 8)
    {
        return None;
    }

    let mut value = 0u64;
    for pos in bit_pos..bit_pos + n {
        value = (value << 1) | read_bit_at(data, pos)? as u64;
    }

    Some(value)
}
