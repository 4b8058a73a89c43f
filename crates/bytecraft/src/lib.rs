//! # bytecraft
//!
//! Pack and unpack binary data described by compact format strings.
//!
//! A format is an optional byte-order prefix (`L`, `B` or `N`) followed by
//! tokens: `b` byte, `h` word, `l` long, `f` float, `d` double, `c` char,
//! `x` pad byte, `(w1 w2 ...)` MSB-first bitfields, and `[name]` user hooks.
//! Any token may be prefixed with a repeat count.
//!
//! ## Example
//!
//! ```
//! use bytecraft::{pack, unpack, Value};
//!
//! let values = vec![Value::Int(0x0102), Value::Int(5), Value::Int(20), Value::Char(b'!')];
//! let bytes = pack("Bh(3 5)xc", &values, None).unwrap();
//! assert_eq!(bytes, vec![0x01, 0x02, 0xB4, 0x00, b'!']);
//!
//! let (decoded, consumed) = unpack("Bh(3 5)xc", &bytes, 0, None).unwrap();
//! assert_eq!(decoded, values);
//! assert_eq!(consumed, 5);
//! ```
//!
//! Parse a [Format] once to reuse it across calls, attach [Hooks] for
//! custom field codecs, or bind a format to field names with
//! [record::Record].

pub mod bits;
pub mod byte_order;
pub mod errors;
pub mod format;
pub mod hooks;
pub mod pack;
pub mod record;
#[cfg(feature = "serde")]
pub mod serde;
pub mod unpack;
pub mod value;

pub use byte_order::{ByteOrder, native_endian};
pub use errors::{FormatError, HookError, PackError, RecordError, UnpackError};
pub use format::Format;
pub use hooks::{Hook, Hooks};
pub use pack::pack;
pub use unpack::unpack;
pub use value::Value;
