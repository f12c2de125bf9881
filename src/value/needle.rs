// Tue Feb 3 2026 - Alex

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::value::{Value, ValueFlags};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NeedleError {
    #[error("not a numeric value: {0:?}")]
    Unparsable(String),
    #[error("integer out of range: {0:?}")]
    OutOfRange(String),
}

/// A parsed numeric search value.
///
/// Integers are tried first, in bases 10, 16 (`0x`), 8 (leading `0`) and
/// 2 (`0b`); anything else falls through to floating point. The width
/// flags record which interpretations the parsed value supports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Needle {
    value: Value,
    flags: ValueFlags,
}

enum IntParse {
    Value(u64),
    OutOfRange,
    NotInteger,
}

impl Needle {
    pub fn parse(text: &str) -> Result<Self, NeedleError> {
        let trimmed = text.trim();

        match parse_integer(trimmed) {
            IntParse::Value(raw) => {
                return Ok(Self {
                    value: Value::from_u64(raw),
                    flags: ValueFlags::for_integer(raw),
                });
            }
            IntParse::OutOfRange => {
                return Err(NeedleError::OutOfRange(text.to_string()));
            }
            IntParse::NotInteger => {}
        }

        let double: f64 = trimmed
            .parse()
            .map_err(|_| NeedleError::Unparsable(text.to_string()))?;

        let mut flags = ValueFlags::F64;

        // Only a full single-precision parse of the same text makes the
        // needle usable as an f32; magnitude alone is not enough.
        if let Ok(single) = trimmed.parse::<f32>() {
            if single.is_finite() || !double.is_finite() {
                flags.insert(ValueFlags::F32);
            }
        }

        Ok(Self {
            value: Value::from_f64(double),
            flags,
        })
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn flags(&self) -> ValueFlags {
        self.flags
    }

    pub fn is_float(&self) -> bool {
        self.flags.is_float_only()
    }
}

fn parse_integer(text: &str) -> IntParse {
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (base, digits) = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        (16, hex)
    } else if let Some(bin) = rest.strip_prefix("0b").or_else(|| rest.strip_prefix("0B")) {
        (2, bin)
    } else if rest.len() > 1 && rest.starts_with('0') {
        (8, &rest[1..])
    } else {
        (10, rest)
    };

    if digits.is_empty() {
        return IntParse::NotInteger;
    }

    match u64::from_str_radix(digits, base) {
        Ok(magnitude) => {
            let raw = if negative {
                magnitude.wrapping_neg()
            } else {
                magnitude
            };
            IntParse::Value(raw)
        }
        Err(err) => match err.kind() {
            std::num::IntErrorKind::PosOverflow => IntParse::OutOfRange,
            _ => IntParse::NotInteger,
        },
    }
}

impl FromStr for Needle {
    type Err = NeedleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Needle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_float() {
            write!(f, "{}", self.value.f64())
        } else if self.value.i64() < 0 {
            write!(f, "{}", self.value.i64())
        } else {
            write!(f, "{}", self.value.u64())
        }
    }
}
