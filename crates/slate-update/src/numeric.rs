use bson::Bson;

use crate::config::OverflowPolicy;

/// The numeric representations an increment understands, ordered by
/// range/precision: `Int32 < Int64 < Double`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NumericType {
    Int32,
    Int64,
    Double,
}

impl NumericType {
    pub fn of(value: &Bson) -> Option<Self> {
        match value {
            Bson::Int32(_) => Some(NumericType::Int32),
            Bson::Int64(_) => Some(NumericType::Int64),
            Bson::Double(_) => Some(NumericType::Double),
            _ => None,
        }
    }

    /// Encoded size in bytes.
    pub fn storage_width(self) -> usize {
        match self {
            NumericType::Int32 => 4,
            NumericType::Int64 | NumericType::Double => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int32(i32),
    Int64(i64),
    Double(f64),
}

/// A 64-bit integer sum left the `i64` range under [`OverflowPolicy::Reject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overflow;

impl Number {
    pub fn from_bson(value: &Bson) -> Option<Self> {
        match value {
            Bson::Int32(v) => Some(Number::Int32(*v)),
            Bson::Int64(v) => Some(Number::Int64(*v)),
            Bson::Double(v) => Some(Number::Double(*v)),
            _ => None,
        }
    }

    pub fn to_bson(self) -> Bson {
        match self {
            Number::Int32(v) => Bson::Int32(v),
            Number::Int64(v) => Bson::Int64(v),
            Number::Double(v) => Bson::Double(v),
        }
    }

    pub fn numeric_type(self) -> NumericType {
        match self {
            Number::Int32(_) => NumericType::Int32,
            Number::Int64(_) => NumericType::Int64,
            Number::Double(_) => NumericType::Double,
        }
    }

    /// Additive identity in the given representation.
    pub fn zero(ty: NumericType) -> Self {
        match ty {
            NumericType::Int32 => Number::Int32(0),
            NumericType::Int64 => Number::Int64(0),
            NumericType::Double => Number::Double(0.0),
        }
    }

    /// True for `0`, `0i64`, `0.0` and `-0.0`.
    pub fn is_zero(self) -> bool {
        match self {
            Number::Int32(v) => v == 0,
            Number::Int64(v) => v == 0,
            Number::Double(v) => v == 0.0,
        }
    }

    /// Exact sum in the wider of the two types.
    ///
    /// Promotion rules:
    /// - i32 + i32 → i32 (unless overflow, then i64, never f64)
    /// - i32 + i64 → i64
    /// - i64 + i64 → i64 (overflow handled per `policy`)
    /// - any + f64 → f64
    pub fn add(self, rhs: Number, policy: OverflowPolicy) -> Result<Number, Overflow> {
        match (self, rhs) {
            (Number::Int32(a), Number::Int32(b)) => Ok(match a.checked_add(b) {
                Some(sum) => Number::Int32(sum),
                None => Number::Int64(i64::from(a) + i64::from(b)),
            }),
            (Number::Double(_), _) | (_, Number::Double(_)) => {
                Ok(Number::Double(self.as_f64() + rhs.as_f64()))
            }
            _ => {
                let (a, b) = (self.as_i64(), rhs.as_i64());
                match (a.checked_add(b), policy) {
                    (Some(sum), _) => Ok(Number::Int64(sum)),
                    (None, OverflowPolicy::Wrap) => Ok(Number::Int64(a.wrapping_add(b))),
                    (None, OverflowPolicy::Reject) => Err(Overflow),
                }
            }
        }
    }

    fn as_i64(self) -> i64 {
        match self {
            Number::Int32(v) => i64::from(v),
            Number::Int64(v) => v,
            Number::Double(v) => v as i64,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int32(v) => f64::from(v),
            Number::Int64(v) => v as f64,
            Number::Double(v) => v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REJECT: OverflowPolicy = OverflowPolicy::Reject;

    // ── Promotion ───────────────────────────────────────────────

    #[test]
    fn int_plus_int_stays_int() {
        assert_eq!(Number::Int32(2).add(Number::Int32(3), REJECT), Ok(Number::Int32(5)));
    }

    #[test]
    fn wider_type_wins() {
        assert_eq!(Number::Int32(1).add(Number::Int64(0), REJECT), Ok(Number::Int64(1)));
        assert_eq!(Number::Int64(1).add(Number::Int32(2), REJECT), Ok(Number::Int64(3)));
        assert_eq!(Number::Int32(1).add(Number::Double(0.0), REJECT), Ok(Number::Double(1.0)));
        assert_eq!(Number::Int64(1).add(Number::Double(0.5), REJECT), Ok(Number::Double(1.5)));
        assert_eq!(Number::Double(1.0).add(Number::Int32(1), REJECT), Ok(Number::Double(2.0)));
    }

    #[test]
    fn type_order() {
        assert!(NumericType::Int32 < NumericType::Int64);
        assert!(NumericType::Int64 < NumericType::Double);
    }

    // ── Overflow ────────────────────────────────────────────────

    #[test]
    fn int_overflow_spills_to_long() {
        assert_eq!(
            Number::Int32(i32::MAX).add(Number::Int32(1), REJECT),
            Ok(Number::Int64(i64::from(i32::MAX) + 1))
        );
        assert_eq!(
            Number::Int32(i32::MIN).add(Number::Int32(-1), REJECT),
            Ok(Number::Int64(i64::from(i32::MIN) - 1))
        );
    }

    #[test]
    fn long_overflow_follows_policy() {
        assert_eq!(Number::Int64(i64::MAX).add(Number::Int32(1), REJECT), Err(Overflow));
        assert_eq!(
            Number::Int64(i64::MAX).add(Number::Int32(1), OverflowPolicy::Wrap),
            Ok(Number::Int64(i64::MIN))
        );
        assert_eq!(
            Number::Int64(i64::MIN).add(Number::Int64(-1), OverflowPolicy::Wrap),
            Ok(Number::Int64(i64::MAX))
        );
    }

    // ── Identity ────────────────────────────────────────────────

    #[test]
    fn zero_detection() {
        assert!(Number::Int32(0).is_zero());
        assert!(Number::Int64(0).is_zero());
        assert!(Number::Double(-0.0).is_zero());
        assert!(!Number::Double(f64::MIN_POSITIVE).is_zero());
        assert_eq!(Number::zero(NumericType::Double), Number::Double(0.0));
    }

    #[test]
    fn widths() {
        assert_eq!(NumericType::Int32.storage_width(), 4);
        assert_eq!(NumericType::Int64.storage_width(), 8);
        assert_eq!(NumericType::Double.storage_width(), 8);
    }
}
