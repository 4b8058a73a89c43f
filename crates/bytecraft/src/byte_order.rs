//! Byte-order aware encoding of fixed-size scalars.
//!
//! Integers are encoded with shifts and never depend on the host layout.
//! Floats and doubles go through the host's in-memory IEEE 754 representation
//! and are byte-swapped only when the requested order differs from the host's.

use std::sync::LazyLock;

/// Multi-byte scalar layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    Little,
    Big,
}

static NATIVE: LazyLock<ByteOrder> = LazyLock::new(|| {
    let probe = 1u32.to_ne_bytes();
    if probe[0] == 1 {
        ByteOrder::Little
    } else {
        ByteOrder::Big
    }
});

/// `"big"` or `"little"`, depending on the host.
pub fn native_endian() -> &'static str {
    match ByteOrder::native() {
        ByteOrder::Little => "little",
        ByteOrder::Big => "big",
    }
}

impl Default for ByteOrder {
    fn default() -> Self {
        ByteOrder::native()
    }
}

impl ByteOrder {
    /// Byte order of the running process, detected once.
    pub fn native() -> Self {
        *NATIVE
    }

    /// Resolves a format prefix character. `N` maps to the native order.
    pub fn from_marker(ch: char) -> Option<Self> {
        match ch {
            'L' => Some(ByteOrder::Little),
            'B' => Some(ByteOrder::Big),
            'N' => Some(ByteOrder::native()),
            _ => None,
        }
    }

    /// Prefix character that selects this order explicitly.
    pub fn marker(self) -> char {
        match self {
            ByteOrder::Little => 'L',
            ByteOrder::Big => 'B',
        }
    }

    pub fn is_native(self) -> bool {
        self == ByteOrder::native()
    }

    pub fn encode_word(self, x: u16) -> [u8; 2] {
        let lo = (x & 0xff) as u8;
        let hi = (x >> 8) as u8;
        match self {
            ByteOrder::Little => [lo, hi],
            ByteOrder::Big => [hi, lo],
        }
    }

    pub fn decode_word(self, s: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Little => (s[1] as u16) << 8 | s[0] as u16,
            ByteOrder::Big => (s[0] as u16) << 8 | s[1] as u16,
        }
    }

    pub fn encode_long(self, mut x: u32) -> [u8; 4] {
        let mut s = [0u8; 4];
        for i in 0..4 {
            let idx = match self {
                ByteOrder::Little => i,
                ByteOrder::Big => 3 - i,
            };
            s[idx] = (x & 0xff) as u8;
            x >>= 8;
        }

        s
    }

    pub fn decode_long(self, s: [u8; 4]) -> u32 {
        let mut x = 0u32;
        for i in 0..4 {
            let idx = match self {
                ByteOrder::Little => 3 - i,
                ByteOrder::Big => i,
            };
            x = (x << 8) | s[idx] as u32;
        }

        x
    }

    pub fn encode_float(self, x: f32) -> [u8; 4] {
        let mut s = x.to_ne_bytes();
        if !self.is_native() {
            s.reverse();
        }

        s
    }

    pub fn decode_float(self, mut s: [u8; 4]) -> f32 {
        if !self.is_native() {
            s.reverse();
        }

        f32::from_ne_bytes(s)
    }

    pub fn encode_double(self, x: f64) -> [u8; 8] {
        let mut s = x.to_ne_bytes();
        if !self.is_native() {
            s.reverse();
        }

        s
    }

    pub fn decode_double(self, mut s: [u8; 8]) -> f64 {
        if !self.is_native() {
            s.reverse();
        }

        f64::from_ne_bytes(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_matches_target() {
        let expected = if cfg!(target_endian = "little") {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        };
        assert_eq!(ByteOrder::native(), expected);
        assert_eq!(ByteOrder::from_marker('N'), Some(expected));
        assert_eq!(native_endian(), if cfg!(target_endian = "little") { "little" } else { "big" });
    }

    #[test]
    fn test_markers() {
        assert_eq!(ByteOrder::from_marker('L'), Some(ByteOrder::Little));
        assert_eq!(ByteOrder::from_marker('B'), Some(ByteOrder::Big));
        assert_eq!(ByteOrder::from_marker('b'), None);
        assert_eq!(ByteOrder::Big.marker(), 'B');
    }

    #[test]
    fn test_word() {
        assert_eq!(ByteOrder::Little.encode_word(0x1234), [0x34, 0x12]);
        assert_eq!(ByteOrder::Big.encode_word(0x1234), [0x12, 0x34]);
        assert_eq!(ByteOrder::Little.decode_word([0x34, 0x12]), 0x1234);
        assert_eq!(ByteOrder::Big.decode_word([0x12, 0x34]), 0x1234);
    }

    #[test]
    fn test_long() {
        assert_eq!(ByteOrder::Little.encode_long(0x01020304), [4, 3, 2, 1]);
        assert_eq!(ByteOrder::Big.encode_long(0x01020304), [1, 2, 3, 4]);
        assert_eq!(ByteOrder::Little.decode_long([4, 3, 2, 1]), 0x01020304);
        assert_eq!(ByteOrder::Big.decode_long([0xff, 0, 0, 1]), 0xff000001);
    }

    #[test]
    fn test_float_layout() {
        // 1.0f32 is 0x3f800000
        assert_eq!(ByteOrder::Big.encode_float(1.0), [0x3f, 0x80, 0, 0]);
        assert_eq!(ByteOrder::Little.encode_float(1.0), [0, 0, 0x80, 0x3f]);
        assert_eq!(ByteOrder::Big.decode_float([0x3f, 0x80, 0, 0]), 1.0);
    }

    #[test]
    fn test_double_layout() {
        // -2.5f64 is 0xc004000000000000
        let big = ByteOrder::Big.encode_double(-2.5);
        assert_eq!(big, [0xc0, 0x04, 0, 0, 0, 0, 0, 0]);

        let mut little = ByteOrder::Little.encode_double(-2.5);
        little.reverse();
        assert_eq!(little, big);

        assert_eq!(ByteOrder::Little.decode_double(ByteOrder::Little.encode_double(-2.5)), -2.5);
    }
}
