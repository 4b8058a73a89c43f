//! Format strings: parsing into an immutable token list.
//!
//! ```text
//! format     := [byte_order] token*
//! byte_order := 'L' | 'B' | 'N'
//! token      := (count)? ( simple | '(' widths ')' | '[' name ']' )
//! simple     := 'b' | 'h' | 'l' | 'c' | 'd' | 'f' | 'x'
//! ```
//!
//! A [Format] is parsed once and can drive any number of pack and unpack calls.

use std::{fmt, str::FromStr};

use crate::{
    bits::{Bitfield, MAX_FIELD_BITS},
    byte_order::ByteOrder,
    errors::FormatError,
};

/// Fixed-width scalar tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    /// `b`, one byte.
    Byte,
    /// `h`, two bytes.
    Word,
    /// `l`, four bytes.
    Long,
    /// `c`, one byte copied verbatim.
    Char,
    /// `f`, IEEE 754 single precision.
    Float,
    /// `d`, IEEE 754 double precision.
    Double,
}

impl Scalar {
    pub fn from_code(ch: char) -> Option<Self> {
        match ch {
            'b' => Some(Scalar::Byte),
            'h' => Some(Scalar::Word),
            'l' => Some(Scalar::Long),
            'c' => Some(Scalar::Char),
            'f' => Some(Scalar::Float),
            'd' => Some(Scalar::Double),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Scalar::Byte => 'b',
            Scalar::Word => 'h',
            Scalar::Long => 'l',
            Scalar::Char => 'c',
            Scalar::Float => 'f',
            Scalar::Double => 'd',
        }
    }

    /// Encoded size in bytes.
    pub fn width(self) -> usize {
        match self {
            Scalar::Byte | Scalar::Char => 1,
            Scalar::Word => 2,
            Scalar::Long | Scalar::Float => 4,
            Scalar::Double => 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Scalar(Scalar),
    /// `x`: zero byte on pack, skipped on unpack.
    Pad,
    Bitfield(Bitfield),
    /// `[name]`: delegated to a user hook.
    Hook(String),
}

/// One token of a format, with its optional repeat count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// `Some(n)` for `n<token>`. A written count of 0 parses as `None`.
    pub count: Option<usize>,
    pub kind: TokenKind,
    /// Byte position of the token in the source format string.
    pub pos: usize,
}

impl Token {
    /// The sub-format one repetition of this token stands for: the byte
    /// order followed by a single uncounted copy. A count of `n` re-enters
    /// the interpreter on it `n` times.
    pub fn unit(&self, order: ByteOrder) -> Format {
        Format {
            order,
            tokens: vec![Token {
                count: None,
                kind: self.kind.clone(),
                pos: self.pos,
            }],
        }
    }

    /// Number of times the token applies: its count, or 1.
    pub fn repeat(&self) -> usize {
        self.count.unwrap_or(1)
    }
}

/// A parsed format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    order: ByteOrder,
    tokens: Vec<Token>,
}

impl Format {
    /// Parses a format string. Fails on the first syntax error.
    pub fn parse(format: &str) -> Result<Self, FormatError> {
        let bytes = format.as_bytes();

        let (order, mut i) = match format.chars().next().and_then(ByteOrder::from_marker) {
            Some(order) => (order, 1),
            None => (ByteOrder::native(), 0),
        };

        let mut tokens = Vec::new();
        let mut count: Option<usize> = None;
        let mut count_pos = 0;

        while i < bytes.len() {
            let pos = i;
            let ch = bytes[i] as char;
            i += 1;

            if ch.is_ascii_digit() {
                if count.is_none() {
                    count_pos = pos;
                }
                let digit = (ch as u8 - b'0') as usize;
                let acc = count.unwrap_or(0);
                count = Some(acc.saturating_mul(10).saturating_add(digit));
                continue;
            }

            let token_pos = if count.is_some() { count_pos } else { pos };
            let kind = match ch {
                'x' => TokenKind::Pad,
                '(' => {
                    let (widths, next) = parse_bit_lengths(format, i, pos)?;
                    i = next;
                    TokenKind::Bitfield(Bitfield::new(widths, pos)?)
                }
                '[' => {
                    let end = format[i..]
                        .find(']')
                        .ok_or(FormatError::UnterminatedGroup(pos))?;
                    let name = format[i..i + end].to_string();
                    i += end + 1;
                    TokenKind::Hook(name)
                }
                _ => match Scalar::from_code(ch) {
                    Some(scalar) => TokenKind::Scalar(scalar),
                    None => {
                        let ch = format[pos..].chars().next().unwrap_or(ch);
                        return Err(FormatError::UnknownFormatChar { ch, pos });
                    }
                },
            };

            tokens.push(Token {
                count: count.take().filter(|&n| n > 0),
                kind,
                pos: token_pos,
            });
        }

        if count.is_some() {
            return Err(FormatError::DanglingCount(count_pos));
        }

        Ok(Self { order, tokens })
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Same tokens, different byte order.
    pub fn with_order(mut self, order: ByteOrder) -> Self {
        self.order = order;
        self
    }

    /// Whether any token delegates to a user hook.
    pub fn has_hooks(&self) -> bool {
        self.tokens
            .iter()
            .any(|t| matches!(t.kind, TokenKind::Hook(_)))
    }

    /// Byte length of the fixed-width part of the format. Hooks contribute
    /// nothing, so with [Format::has_hooks] this is a lower bound. Saturates
    /// at `usize::MAX`.
    pub fn fixed_size(&self) -> usize {
        self.tokens.iter().fold(0usize, |total, t| {
            let width = match &t.kind {
                TokenKind::Scalar(scalar) => scalar.width(),
                TokenKind::Pad => 1,
                TokenKind::Bitfield(group) => group.byte_len(),
                TokenKind::Hook(_) => 0,
            };
            total.saturating_add(width.saturating_mul(t.repeat()))
        })
    }

    /// Number of values packed or unpacked, `None` when hooks make it variable.
    /// Saturates at `usize::MAX`.
    pub fn value_count(&self) -> Option<usize> {
        let mut total = 0usize;
        for t in &self.tokens {
            let n = match &t.kind {
                TokenKind::Scalar(_) => 1,
                TokenKind::Pad => 0,
                TokenKind::Bitfield(group) => group.field_count(),
                TokenKind::Hook(_) => return None,
            };
            total = total.saturating_add(n.saturating_mul(t.repeat()));
        }

        Some(total)
    }
}

/// Reads the widths of a `( )` group. `start` is just past the `(` at `open`.
/// Returns the widths and the position just past the `)`.
fn parse_bit_lengths(
    format: &str,
    start: usize,
    open: usize,
) -> Result<(Vec<u32>, usize), FormatError> {
    let mut widths = Vec::new();
    let mut num: usize = 0;

    let push = |widths: &mut Vec<u32>, num: usize| {
        if num > MAX_FIELD_BITS {
            return Err(FormatError::BitfieldTooWide {
                width: num,
                pos: open,
            });
        }
        widths.push(num as u32);
        Ok(())
    };

    for (offset, ch) in format[start..].char_indices() {
        let pos = start + offset;
        match ch {
            ')' => {
                push(&mut widths, num)?;
                return Ok((widths, pos + 1));
            }
            ' ' => {
                push(&mut widths, num)?;
                num = 0;
            }
            '0'..='9' => {
                num = num
                    .saturating_mul(10)
                    .saturating_add(ch as usize - '0' as usize);
            }
            _ => return Err(FormatError::BogusBitfieldChar { ch, pos }),
        }
    }

    Err(FormatError::UnterminatedBitfield(open))
}

impl FromStr for Format {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::parse(s)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Scalar(scalar) => write!(f, "{}", scalar.code()),
            TokenKind::Pad => write!(f, "x"),
            TokenKind::Bitfield(group) => {
                write!(f, "(")?;
                for (i, width) in group.widths().iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{width}")?;
                }
                write!(f, ")")
            }
            TokenKind::Hook(name) => write!(f, "[{name}]"),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(count) = self.count {
            write!(f, "{count}")?;
        }
        write!(f, "{}", self.kind)
    }
}

/// Renders the format with an explicit byte-order prefix.
impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.order.marker())?;
        for token in &self.tokens {
            write!(f, "{token}")?;
        }
        Ok(())
    }
}
