// Tue Feb 3 2026 - Alex

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::value::Value;

/// Validity flags for a value snapshot.
///
/// Each bit records that the snapshot is representable at one numeric
/// width/kind. The two inequality bits are reserved for chained
/// inequality tracking and are never set by observation or parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ValueFlags(u8);

impl ValueFlags {
    pub const I8: Self = Self(1 << 0);
    pub const I16: Self = Self(1 << 1);
    pub const I32: Self = Self(1 << 2);
    pub const I64: Self = Self(1 << 3);
    pub const F32: Self = Self(1 << 4);
    pub const F64: Self = Self(1 << 5);
    pub const INEQ_FORWARD: Self = Self(1 << 6);
    pub const INEQ_REVERSE: Self = Self(1 << 7);

    pub fn empty() -> Self {
        Self(0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Flags for a value observed from a window of `len` bytes.
    ///
    /// Integer flags require both that the window was wide enough and that
    /// the value fits the signed or unsigned range of the width. Float
    /// flags are width-gated only; there is no cheap validity test for a
    /// bit pattern as a float.
    pub fn observe(value: &Value, len: usize) -> Self {
        let mut flags = Self::empty();

        if len == 0 {
            return flags;
        }

        let int = Self::for_integer(value.u64());

        flags.insert(int.masked(Self::I8));

        if len < 2 {
            return flags;
        }

        flags.insert(int.masked(Self::I16));

        if len < 4 {
            return flags;
        }

        flags.insert(int.masked(Self::I32));
        flags.insert(Self::F32);

        if len < 8 {
            return flags;
        }

        flags.insert(Self::I64);
        flags.insert(Self::F64);

        flags
    }

    /// Integer width flags for a raw 64-bit value.
    ///
    /// The sign is taken from the full 64-bit signed view. A negative
    /// value fits a width when it is no smaller than that width's signed
    /// minimum; a non-negative value when it is no larger than the
    /// unsigned maximum. Everything fits 64 bits.
    pub fn for_integer(raw: u64) -> Self {
        let signed = raw as i64;
        let mut flags = Self::I64;

        if signed >= 0 {
            if raw <= u8::MAX as u64 {
                flags.insert(Self::I8);
            }
            if raw <= u16::MAX as u64 {
                flags.insert(Self::I16);
            }
            if raw <= u32::MAX as u64 {
                flags.insert(Self::I32);
            }
        } else {
            if signed >= i8::MIN as i64 {
                flags.insert(Self::I8);
            }
            if signed >= i16::MIN as i64 {
                flags.insert(Self::I16);
            }
            if signed >= i32::MIN as i64 {
                flags.insert(Self::I32);
            }
        }

        flags
    }

    pub fn is_float_only(self) -> bool {
        self.intersects(Self(Self::F32.0 | Self::F64.0))
            && !self.intersects(Self(Self::I8.0 | Self::I16.0 | Self::I32.0 | Self::I64.0))
    }

    fn masked(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }
}

impl BitOr for ValueFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ValueFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for ValueFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (flag, name) in [
            (Self::I8, "i8"),
            (Self::I16, "i16"),
            (Self::I32, "i32"),
            (Self::I64, "i64"),
            (Self::F32, "f32"),
            (Self::F64, "f64"),
        ] {
            if self.contains(flag) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        if first {
            write!(f, "none")?;
        }
        Ok(())
    }
}
