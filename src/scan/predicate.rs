// Thu Feb 5 2026 - Alex

use std::str::FromStr;

use crate::scan::ScanError;
use crate::store::MatchEntry;
use crate::value::{Needle, Value, ValueFlags};

/// Boundary handling for range predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBounds {
    GtLt,
    GeLt,
    GtLe,
    GeLe,
}

impl RangeBounds {
    fn lower_op(self) -> Order {
        match self {
            Self::GtLt | Self::GtLe => Order::Gt,
            Self::GeLt | Self::GeLe => Order::Ge,
        }
    }

    fn upper_op(self) -> Order {
        match self {
            Self::GtLt | Self::GeLt => Order::Lt,
            Self::GtLe | Self::GeLe => Order::Le,
        }
    }
}

impl FromStr for RangeBounds {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gt_lt" => Ok(Self::GtLt),
            "ge_lt" => Ok(Self::GeLt),
            "gt_le" => Ok(Self::GtLe),
            "ge_le" => Ok(Self::GeLe),
            other => Err(ScanError::InvalidRangeFlag(other.to_string())),
        }
    }
}

/// Predicate applied to freshly observed windows during a scan.
#[derive(Debug, Clone)]
pub enum ScanPredicate {
    Eq(Needle),
    Ne(Needle),
    Lt(Needle),
    Le(Needle),
    Gt(Needle),
    Ge(Needle),
    Range(Needle, Needle, RangeBounds),
}

impl ScanPredicate {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Eq(n) => equal(value, n),
            Self::Ne(n) => !equal(value, n),
            Self::Lt(n) => ordered(value, n, Order::Lt),
            Self::Le(n) => ordered(value, n, Order::Le),
            Self::Gt(n) => ordered(value, n, Order::Gt),
            Self::Ge(n) => ordered(value, n, Order::Ge),
            Self::Range(lo, hi, bounds) => in_range(value, lo, hi, *bounds),
        }
    }
}

/// Predicate applied to re-read candidates during a narrow pass.
///
/// The stateful variants compare the stored snapshot against the fresh
/// read and take no needle.
#[derive(Debug, Clone)]
pub enum NarrowPredicate {
    Eq(Needle),
    Ne(Needle),
    Lt(Needle),
    Le(Needle),
    Gt(Needle),
    Ge(Needle),
    Range(Needle, Needle, RangeBounds),
    Changed,
    Unchanged,
    Increased,
    Decreased,
}

impl NarrowPredicate {
    pub fn matches(&self, stored: &MatchEntry, fresh: &Value) -> bool {
        match self {
            Self::Eq(n) => equal(fresh, n),
            Self::Ne(n) => !equal(fresh, n),
            Self::Lt(n) => ordered(fresh, n, Order::Lt),
            Self::Le(n) => ordered(fresh, n, Order::Le),
            Self::Gt(n) => ordered(fresh, n, Order::Gt),
            Self::Ge(n) => ordered(fresh, n, Order::Ge),
            Self::Range(lo, hi, bounds) => in_range(fresh, lo, hi, *bounds),
            Self::Changed => snapshot_equal(stored, fresh) == Some(false),
            Self::Unchanged => snapshot_equal(stored, fresh) == Some(true),
            Self::Increased => moved(stored, fresh, true),
            Self::Decreased => moved(stored, fresh, false),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Order {
    Lt,
    Le,
    Gt,
    Ge,
}

fn ord<T: PartialOrd>(a: T, b: T, op: Order) -> bool {
    match op {
        Order::Lt => a < b,
        Order::Le => a <= b,
        Order::Gt => a > b,
        Order::Ge => a >= b,
    }
}

/// Bytes the needle's equality comparison covers, as a payload mask.
fn needle_mask(needle: &Needle) -> u64 {
    let len = needle.value().byte_len();
    if len >= 8 {
        u64::MAX
    } else {
        (1u64 << (len * 8)) - 1
    }
}

/// Equality over the needle's significant span.
///
/// Float needles compare bit patterns at their full width. Integer
/// needles compare only the bytes the needle actually occupies, so a
/// five-byte hex needle matches regardless of what follows it in the
/// window; negative needles sign-extend and therefore occupy the full
/// eight bytes.
fn equal(value: &Value, needle: &Needle) -> bool {
    let flags = needle.flags();

    if flags.is_float_only() {
        if flags.contains(ValueFlags::F64) {
            return value.u64() == needle.value().u64();
        }
        return value.u32() == needle.value().u32();
    }

    let mask = needle_mask(needle);
    value.u64() & mask == needle.value().u64()
}

/// Ordered comparison at the needle's largest advertised width.
///
/// Integer widths accept either the unsigned or the signed reading;
/// float widths are only consulted when no integer flag is set at the
/// same width.
fn ordered(value: &Value, needle: &Needle, op: Order) -> bool {
    let flags = needle.flags();
    let n = needle.value();

    if flags.contains(ValueFlags::I64) {
        return ord(value.u64(), n.u64(), op) || ord(value.i64(), n.i64(), op);
    }
    if flags.contains(ValueFlags::F64) {
        return ord(value.f64(), n.f64(), op);
    }
    if flags.contains(ValueFlags::I32) {
        return ord(value.u32(), n.u32(), op) || ord(value.i32(), n.i32(), op);
    }
    if flags.contains(ValueFlags::F32) {
        return ord(value.f32(), n.f32(), op);
    }
    if flags.contains(ValueFlags::I16) {
        return ord(value.u16(), n.u16(), op) || ord(value.i16(), n.i16(), op);
    }
    if flags.contains(ValueFlags::I8) {
        return ord(value.u8(), n.u8(), op) || ord(value.i8(), n.i8(), op);
    }

    false
}

/// Range membership, checked per interpretation so that a value cannot
/// pass the lower bound unsigned and the upper bound signed.
fn in_range(value: &Value, lower: &Needle, upper: &Needle, bounds: RangeBounds) -> bool {
    let lop = bounds.lower_op();
    let uop = bounds.upper_op();
    let flags = lower.flags();
    let lo = lower.value();
    let hi = upper.value();

    if flags.contains(ValueFlags::I64) {
        return (ord(value.u64(), lo.u64(), lop) && ord(value.u64(), hi.u64(), uop))
            || (ord(value.i64(), lo.i64(), lop) && ord(value.i64(), hi.i64(), uop));
    }
    if flags.contains(ValueFlags::F64) {
        return ord(value.f64(), lo.f64(), lop) && ord(value.f64(), hi.f64(), uop);
    }
    if flags.contains(ValueFlags::I32) {
        return (ord(value.u32(), lo.u32(), lop) && ord(value.u32(), hi.u32(), uop))
            || (ord(value.i32(), lo.i32(), lop) && ord(value.i32(), hi.i32(), uop));
    }
    if flags.contains(ValueFlags::F32) {
        return ord(value.f32(), lo.f32(), lop) && ord(value.f32(), hi.f32(), uop);
    }
    if flags.contains(ValueFlags::I16) {
        return (ord(value.u16(), lo.u16(), lop) && ord(value.u16(), hi.u16(), uop))
            || (ord(value.i16(), lo.i16(), lop) && ord(value.i16(), hi.i16(), uop));
    }
    if flags.contains(ValueFlags::I8) {
        return (ord(value.u8(), lo.u8(), lop) && ord(value.u8(), hi.u8(), uop))
            || (ord(value.i8(), lo.i8(), lop) && ord(value.i8(), hi.i8(), uop));
    }

    false
}

/// Stored-vs-fresh equality at the stored entry's largest width, or
/// None when the entry carries no width flags at all.
fn snapshot_equal(stored: &MatchEntry, fresh: &Value) -> Option<bool> {
    let flags = stored.flags;
    let old = &stored.value;

    if flags.intersects(ValueFlags::I64 | ValueFlags::F64) {
        Some(old.u64() == fresh.u64())
    } else if flags.intersects(ValueFlags::I32 | ValueFlags::F32) {
        Some(old.u32() == fresh.u32())
    } else if flags.contains(ValueFlags::I16) {
        Some(old.u16() == fresh.u16())
    } else if flags.contains(ValueFlags::I8) {
        Some(old.u8() == fresh.u8())
    } else {
        None
    }
}

/// Directional movement, scanned from the narrowest stored width
/// upward: a candidate that moved at any width it is valid for counts.
fn moved(stored: &MatchEntry, fresh: &Value, up: bool) -> bool {
    fn dir<T: PartialOrd>(fresh: T, old: T, up: bool) -> bool {
        if up {
            fresh > old
        } else {
            fresh < old
        }
    }

    let flags = stored.flags;
    let old = &stored.value;

    if flags.contains(ValueFlags::I8)
        && (dir(fresh.u8(), old.u8(), up) || dir(fresh.i8(), old.i8(), up))
    {
        return true;
    }
    if flags.contains(ValueFlags::I16)
        && (dir(fresh.u16(), old.u16(), up) || dir(fresh.i16(), old.i16(), up))
    {
        return true;
    }
    if flags.contains(ValueFlags::I32)
        && (dir(fresh.u32(), old.u32(), up) || dir(fresh.i32(), old.i32(), up))
    {
        return true;
    }
    if flags.contains(ValueFlags::F32) && dir(fresh.f32(), old.f32(), up) {
        return true;
    }
    if flags.contains(ValueFlags::I64)
        && (dir(fresh.u64(), old.u64(), up) || dir(fresh.i64(), old.i64(), up))
    {
        return true;
    }
    if flags.contains(ValueFlags::F64) && dir(fresh.f64(), old.f64(), up) {
        return true;
    }

    false
}
