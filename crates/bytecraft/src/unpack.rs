//! Decoding a byte buffer according to a [Format].

use log::{debug, trace};

use crate::{
    errors::UnpackError,
    format::{Format, Scalar, TokenKind},
    hooks::{self, Hooks},
    value::Value,
};

/// Parses `format` and unpacks `data` from `start_offset`. Returns the decoded
/// values and the number of bytes consumed.
///
/// ```
/// use bytecraft::{unpack, Value};
///
/// let (values, consumed) = unpack("3b", &[1, 2, 3], 0, None).unwrap();
/// assert_eq!(values, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
/// assert_eq!(consumed, 3);
/// ```
pub fn unpack(
    format: &str,
    data: &[u8],
    start_offset: usize,
    hooks: Option<&Hooks>,
) -> Result<(Vec<Value>, usize), UnpackError> {
    Format::parse(format)?.unpack(data, start_offset, hooks)
}

impl Format {
    /// Unpacks `data` from `start_offset`. Returns the decoded values and the
    /// number of bytes consumed. On error nothing is returned.
    pub fn unpack(
        &self,
        data: &[u8],
        start_offset: usize,
        hooks: Option<&Hooks>,
    ) -> Result<(Vec<Value>, usize), UnpackError> {
        let hint = self.value_count().unwrap_or_default().min(data.len());
        let mut values = Vec::with_capacity(hint);
        let end = self.unpack_into(data, start_offset, hooks, &mut values)?;

        Ok((values, end - start_offset))
    }

    /// Unpacks every token from byte `pos`, appending to `values`. Returns the
    /// offset just past the last byte consumed.
    fn unpack_into(
        &self,
        data: &[u8],
        mut pos: usize,
        hooks: Option<&Hooks>,
        values: &mut Vec<Value>,
    ) -> Result<usize, UnpackError> {
        for token in self.tokens() {
            let Some(count) = token.count else {
                pos = self.unpack_token(&token.kind, data, pos, hooks, values)?;
                continue;
            };

            let unit = token.unit(self.order());
            debug!("repeating {unit} {count} times");

            for _ in 0..count {
                pos = unit.unpack_into(data, pos, hooks, values)?;
            }
        }

        Ok(pos)
    }

    /// Unpacks one occurrence of `kind` at byte `pos`. Returns the offset just
    /// past the bytes it consumed.
    fn unpack_token(
        &self,
        kind: &TokenKind,
        data: &[u8],
        mut pos: usize,
        hooks: Option<&Hooks>,
        values: &mut Vec<Value>,
    ) -> Result<usize, UnpackError> {
        if pos > data.len() {
            return Err(not_enough_data(data, pos, 0));
        }

        trace!("unpack {kind} at byte {pos}");

        match kind {
            TokenKind::Pad => {
                take::<1>(data, pos)?;
                pos += 1;
            }
            TokenKind::Scalar(scalar) => {
                values.push(self.unpack_scalar(*scalar, data, pos)?);
                pos += scalar.width();
            }
            TokenKind::Bitfield(group) => {
                let fields = group.unpack(data, pos)?;
                values.extend(fields.into_iter().map(|v| Value::Int(v as i64)));
                pos += group.byte_len();
            }
            TokenKind::Hook(name) => {
                let (produced, consumed) = hooks::call_unpack(hooks, name, values, data, pos)?;
                values.extend(produced);
                pos += consumed;
            }
        }

        Ok(pos)
    }

    fn unpack_scalar(&self, scalar: Scalar, data: &[u8], pos: usize) -> Result<Value, UnpackError> {
        let order = self.order();

        let value = match scalar {
            Scalar::Byte => Value::Int(take::<1>(data, pos)?[0] as i64),
            Scalar::Char => Value::Char(take::<1>(data, pos)?[0]),
            Scalar::Word => Value::Int(order.decode_word(take::<2>(data, pos)?) as i64),
            Scalar::Long => Value::Int(order.decode_long(take::<4>(data, pos)?) as i64),
            Scalar::Float => Value::Float(order.decode_float(take::<4>(data, pos)?) as f64),
            Scalar::Double => Value::Float(order.decode_double(take::<8>(data, pos)?)),
        };

        Ok(value)
    }
}

/// Copies `N` bytes at `pos`, or fails if fewer remain.
fn take<const N: usize>(data: &[u8], pos: usize) -> Result<[u8; N], UnpackError> {
    data.get(pos..pos.saturating_add(N))
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| not_enough_data(data, pos, N))
}

fn not_enough_data(data: &[u8], offset: usize, needed: usize) -> UnpackError {
    UnpackError::NotEnoughData {
        offset,
        needed,
        available: data.len().saturating_sub(offset),
    }
}
