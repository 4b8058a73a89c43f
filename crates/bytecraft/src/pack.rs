//! Encoding a value sequence according to a [Format].

use log::{debug, trace};

use crate::{
    byte_order::ByteOrder,
    errors::PackError,
    format::{Format, Scalar, TokenKind},
    hooks::{self, Hooks},
    value::Value,
};

/// Parses `format` and packs `values` with it.
///
/// ```
/// use bytecraft::{pack, Value};
///
/// let bytes = pack("Lh(3 5)", &[Value::Int(0x1234), Value::Int(5), Value::Int(20)], None).unwrap();
/// assert_eq!(bytes, vec![0x34, 0x12, 0xB4]);
/// ```
pub fn pack(format: &str, values: &[Value], hooks: Option<&Hooks>) -> Result<Vec<u8>, PackError> {
    Format::parse(format)?.pack(values, hooks)
}

impl Format {
    /// Packs `values` into a new buffer. Values left over once the format is
    /// exhausted are ignored. On error nothing is returned.
    pub fn pack(&self, values: &[Value], hooks: Option<&Hooks>) -> Result<Vec<u8>, PackError> {
        let hint = self.fixed_size().min(values.len().saturating_mul(8));
        let mut out = Vec::with_capacity(hint);
        let used = self.pack_into(values, 0, hooks, &mut out)?;

        if used < values.len() {
            debug!(
                "pack ignored {} surplus values for format {}",
                values.len() - used,
                self
            );
        }

        Ok(out)
    }

    /// Packs starting at value index `argnum`, appending to `out`. Returns the
    /// index of the first value not consumed.
    fn pack_into(
        &self,
        values: &[Value],
        mut argnum: usize,
        hooks: Option<&Hooks>,
        out: &mut Vec<u8>,
    ) -> Result<usize, PackError> {
        for token in self.tokens() {
            let Some(count) = token.count else {
                argnum = self.pack_token(&token.kind, values, argnum, hooks, out)?;
                continue;
            };

            let unit = token.unit(self.order());
            debug!("repeating {unit} {count} times");

            // Pads are the only token that emits bytes without consuming values.
            if matches!(token.kind, TokenKind::Pad) {
                out.try_reserve(count)
                    .map_err(|_| PackError::OutputTooLarge(count))?;
            }

            for _ in 0..count {
                argnum = unit.pack_into(values, argnum, hooks, out)?;
            }
        }

        Ok(argnum)
    }

    /// Packs one occurrence of `kind` starting at value index `argnum`.
    /// Returns the index of the first value not consumed.
    fn pack_token(
        &self,
        kind: &TokenKind,
        values: &[Value],
        mut argnum: usize,
        hooks: Option<&Hooks>,
        out: &mut Vec<u8>,
    ) -> Result<usize, PackError> {
        trace!("pack {kind} at value {argnum}, byte {}", out.len());

        match kind {
            TokenKind::Pad => out.push(0),
            TokenKind::Scalar(scalar) => {
                let value = next_value(values, argnum)?;
                pack_scalar(self.order(), *scalar, value, argnum, out)?;
                argnum += 1;
            }
            TokenKind::Bitfield(group) => {
                let fields = values
                    .get(argnum..argnum.saturating_add(group.field_count()))
                    .ok_or(PackError::NotEnoughArguments)?;

                let mut ints = Vec::with_capacity(fields.len());
                for (i, value) in fields.iter().enumerate() {
                    match value.as_int() {
                        Some(v) if v >= 0 => ints.push(v as u64),
                        _ => {
                            return Err(PackError::BadArgumentType {
                                index: argnum + i,
                                expected: "non-negative int",
                            });
                        }
                    }
                }

                out.extend(group.pack(&ints)?);
                argnum += fields.len();
            }
            TokenKind::Hook(name) => {
                let value = next_value(values, argnum)?;
                out.extend(hooks::call_pack(hooks, name, value)?);
                argnum += 1;
            }
        }

        Ok(argnum)
    }
}

fn next_value(values: &[Value], argnum: usize) -> Result<&Value, PackError> {
    values.get(argnum).ok_or(PackError::NotEnoughArguments)
}

/// Integers are truncated to the token width.
fn pack_scalar(
    order: ByteOrder,
    scalar: Scalar,
    value: &Value,
    index: usize,
    out: &mut Vec<u8>,
) -> Result<(), PackError> {
    let bad_type = |expected| PackError::BadArgumentType { index, expected };

    match scalar {
        Scalar::Byte => {
            let x = value.as_int().ok_or(bad_type("int"))?;
            out.push(x as u8);
        }
        Scalar::Word => {
            let x = value.as_int().ok_or(bad_type("int"))?;
            out.extend(order.encode_word(x as u16));
        }
        Scalar::Long => {
            let x = value.as_int().ok_or(bad_type("int"))?;
            out.extend(order.encode_long(x as u32));
        }
        Scalar::Char => {
            let c = value.as_char().ok_or(bad_type("single byte char"))?;
            out.push(c);
        }
        Scalar::Float => {
            let x = value.as_float().ok_or(bad_type("float"))?;
            out.extend(order.encode_float(x as f32));
        }
        Scalar::Double => {
            let x = value.as_float().ok_or(bad_type("float"))?;
            out.extend(order.encode_double(x));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::FormatError, hooks::Hook};

    fn ints(xs: &[i64]) -> Vec<Value> {
        xs.iter().map(|&x| Value::Int(x)).collect()
    }

    #[test]
    fn test_pack_integers() {
        assert_eq!(
            pack("Lbhl", &ints(&[1, 0x0203, 0x04050607]), None).unwrap(),
            vec![1, 3, 2, 7, 6, 5, 4]
        );
        assert_eq!(
            pack("Bbhl", &ints(&[1, 0x0203, 0x04050607]), None).unwrap(),
            vec![1, 2, 3, 4, 5, 6, 7]
        );
    }

    #[test]
    fn test_pack_truncates_integers() {
        assert_eq!(pack("Bb", &ints(&[-1]), None).unwrap(), vec![0xff]);
        assert_eq!(pack("Bh", &ints(&[0x12345]), None).unwrap(), vec![0x23, 0x45]);
        assert_eq!(pack("Ll", &ints(&[-2]), None).unwrap(), vec![0xfe, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_pack_floats() {
        let values = [Value::Float(1.0), Value::Float(-2.5)];
        assert_eq!(
            pack("Bfd", &values, None).unwrap(),
            vec![0x3f, 0x80, 0, 0, 0xc0, 0x04, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_pack_char_and_pad() {
        let values = [Value::Char(b'G'), Value::from("I"), Value::from(vec![b'F'])];
        assert_eq!(pack("cxcc", &values, None).unwrap(), b"G\0IF".to_vec());
    }

    #[test]
    fn test_pad_consumes_no_value() {
        assert_eq!(pack("b1xb", &ints(&[1, 2]), None).unwrap(), vec![1, 0, 2]);
        assert_eq!(pack("3x", &[], None).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn test_pack_multiplier() {
        assert_eq!(pack("3b", &ints(&[1, 2, 3]), None).unwrap(), vec![1, 2, 3]);
        assert_eq!(
            pack("B2hb", &ints(&[1, 2, 3]), None).unwrap(),
            vec![0, 1, 0, 2, 3]
        );
    }

    #[test]
    fn test_pack_bitfields() {
        assert_eq!(pack("(3 5)", &ints(&[5, 20]), None).unwrap(), vec![0xB4]);
        assert_eq!(
            pack("b(1 3 1 3)b", &ints(&[9, 1, 2, 0, 7, 10]), None).unwrap(),
            vec![9, 0b1010_0111, 10]
        );
        assert_eq!(
            pack("2(4 4)", &ints(&[1, 2, 3, 4]), None).unwrap(),
            vec![0x12, 0x34]
        );
    }

    #[test]
    fn test_pack_value_too_big_for_bits() {
        assert_eq!(
            pack("(3)", &ints(&[8]), None).unwrap_err(),
            PackError::ValueTooBigForBits { value: 8, width: 3 }
        );
        assert_eq!(
            pack("b(3)", &ints(&[1, 7]), None).unwrap_err(),
            PackError::Format(FormatError::BitfieldNotOctetAligned {
                total_bits: 3,
                pos: 1
            })
        );
        assert_eq!(
            pack("(3 5)", &ints(&[8, 0]), None).unwrap_err(),
            PackError::ValueTooBigForBits { value: 8, width: 3 }
        );
    }

    #[test]
    fn test_pack_not_enough_arguments() {
        assert_eq!(pack("bb", &ints(&[1]), None).unwrap_err(), PackError::NotEnoughArguments);
        assert_eq!(pack("(4 4)", &ints(&[1]), None).unwrap_err(), PackError::NotEnoughArguments);
        assert_eq!(pack("4b", &ints(&[1, 2]), None).unwrap_err(), PackError::NotEnoughArguments);
    }

    #[test]
    fn test_pack_bad_argument_type() {
        assert_eq!(
            pack("bf", &[Value::Int(1), Value::Char(b'2')], None).unwrap_err(),
            PackError::BadArgumentType {
                index: 1,
                expected: "float"
            }
        );
        assert_eq!(
            pack("b", &[Value::Float(1.0)], None).unwrap_err(),
            PackError::BadArgumentType {
                index: 0,
                expected: "int"
            }
        );
        assert_eq!(
            pack("(4 4)", &ints(&[1, -1]), None).unwrap_err(),
            PackError::BadArgumentType {
                index: 1,
                expected: "non-negative int"
            }
        );
        assert!(matches!(
            pack("c", &[Value::from("ab")], None),
            Err(PackError::BadArgumentType { index: 0, .. })
        ));
    }

    #[test]
    fn test_pack_surplus_values_ignored() {
        assert_eq!(pack("b", &ints(&[1, 2, 3]), None).unwrap(), vec![1]);
    }

    #[test]
    fn test_pack_hook() {
        let hooks = Hooks::new().with(
            "len",
            Hook::pack_only(|v| {
                let s = v.as_bytes().ok_or_else(|| crate::errors::HookError::new("not bytes"))?;
                let mut out = vec![s.len() as u8];
                out.extend_from_slice(s);
                Ok(out)
            }),
        );
        let values = [Value::Int(1), Value::from("abc"), Value::from("de")];
        assert_eq!(
            pack("b2[len]", &values, Some(&hooks)).unwrap(),
            vec![1, 3, b'a', b'b', b'c', 2, b'd', b'e']
        );
    }

    #[test]
    fn test_pack_unknown_format_char() {
        assert_eq!(
            pack("bz", &ints(&[1]), None).unwrap_err(),
            PackError::Format(FormatError::UnknownFormatChar { ch: 'z', pos: 1 })
        );
    }

    #[test]
    fn test_pack_huge_count_runs_out_of_values() {
        assert_eq!(
            pack("99999999999999999999b", &ints(&[1]), None).unwrap_err(),
            PackError::NotEnoughArguments
        );
        assert_eq!(
            pack("4000000000(4 4)", &ints(&[1, 2, 3]), None).unwrap_err(),
            PackError::NotEnoughArguments
        );
        assert_eq!(
            pack("b4000000000[len]", &ints(&[1]), None).unwrap_err(),
            PackError::NotEnoughArguments
        );
    }

    #[test]
    fn test_pack_huge_pad_count() {
        assert_eq!(
            pack("99999999999999999999x", &[], None).unwrap_err(),
            PackError::OutputTooLarge(usize::MAX)
        );
    }

    #[test]
    fn test_format_reuse() {
        let format = Format::parse("Bh").unwrap();
        assert_eq!(format.pack(&ints(&[1]), None).unwrap(), vec![0, 1]);
        assert_eq!(format.pack(&ints(&[2]), None).unwrap(), vec![0, 2]);
    }
}
