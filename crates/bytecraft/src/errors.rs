//! Error types for format parsing, packing, unpacking and records.

use thiserror::Error;

/// Errors produced when parsing a format string into a [crate::format::Format].
///
/// Every variant carries the byte position in the format string where the
/// problem was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// `(` without a matching `)`.
    #[error("unterminated bitfield description starting at {0}")]
    UnterminatedBitfield(usize),
    /// `[` without a matching `]`.
    #[error("unterminated user function name starting at {0}")]
    UnterminatedGroup(usize),
    /// Something other than a digit, a space or `)` inside a bitfield group.
    #[error("bogus character {ch:?} in bitfield description at {pos}")]
    BogusBitfieldChar { ch: char, pos: usize },
    /// Sum of the widths in a bitfield group is not a multiple of 8.
    #[error("bitfields not octet-aligned ({total_bits} bits) at {pos}")]
    BitfieldNotOctetAligned { total_bits: usize, pos: usize },
    /// A single bitfield width does not fit a 32-bit accumulator.
    #[error("bitfield width {width} exceeds 32 bits at {pos}")]
    BitfieldTooWide { width: usize, pos: usize },
    /// Character is not part of the format language.
    #[error("unknown format character {ch:?} at {pos}")]
    UnknownFormatChar { ch: char, pos: usize },
    /// Repeat count at the end of the format with no token to repeat.
    #[error("repeat count at {0} is not followed by a token")]
    DanglingCount(usize),
}

/// Error returned by a user hook. The message is surfaced through
/// [PackError::BadUserFunctionResult] or [UnpackError::BadUserFunctionResult].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HookError(pub String);

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        HookError(message.into())
    }
}

/// Errors produced by [crate::pack].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    #[error(transparent)]
    Format(#[from] FormatError),
    /// The value sequence ran out before the format did.
    #[error("not enough arguments for pack")]
    NotEnoughArguments,
    /// Value at `index` does not match the token it was consumed by.
    #[error("bad argument type to pack at index {index}: expected {expected}")]
    BadArgumentType { index: usize, expected: &'static str },
    /// Bitfield value does not fit in its declared width.
    #[error("number {value} too big for {width} bits")]
    ValueTooBigForBits { value: i64, width: u32 },
    /// A repeated pad needs more output than can be allocated.
    #[error("cannot allocate {0} pad bytes")]
    OutputTooLarge(usize),
    #[error("unknown user function {0:?}")]
    UnknownUserFunction(String),
    /// Hook is registered but has no pack half.
    #[error("user function {0:?} cannot pack")]
    NotCallable(String),
    #[error("user function {name:?} failed: {source}")]
    BadUserFunctionResult { name: String, source: HookError },
}

/// Errors produced by [crate::unpack].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnpackError {
    #[error(transparent)]
    Format(#[from] FormatError),
    /// Fewer than `needed` bytes remain at `offset`.
    #[error("not enough data: need {needed} bytes at offset {offset}, have {available}")]
    NotEnoughData {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("unknown user function {0:?}")]
    UnknownUserFunction(String),
    /// Hook is registered but has no unpack half.
    #[error("user function {0:?} cannot unpack")]
    NotCallable(String),
    #[error("user function {name:?} failed: {source}")]
    BadUserFunctionResult { name: String, source: HookError },
}

/// Errors produced when compiling or using a [crate::record::Record].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Pack(#[from] PackError),
    #[error(transparent)]
    Unpack(#[from] UnpackError),
    /// Number of field names differs from the number of values the format carries.
    #[error("record has {names} field names but the format carries {values} values")]
    FieldCountMismatch { names: usize, values: usize },
    /// Field name is empty or duplicated.
    #[error("invalid field name {0:?}")]
    InvalidFieldName(String),
    #[error("missing field {0:?}")]
    MissingField(String),
    /// Fixed size of the record cannot be allocated.
    #[error("record of {0} bytes cannot be allocated")]
    TooLarge(usize),
}
