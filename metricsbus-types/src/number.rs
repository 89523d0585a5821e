//! Numeric sample values.

use core::fmt;
use core::hash::{Hash, Hasher};

/// A finite numeric sample value.
///
/// Integers and floats are kept apart so that a value survives a round trip
/// through JSON unchanged: `100` stays an integer and `100.0` stays a float.
/// Two numbers are equal only if they have the same representation.
#[derive(Debug, Clone, Copy)]
pub struct Number(Repr);

#[derive(Debug, Clone, Copy)]
enum Repr {
    Integer(i64),
    Float(f64),
}

impl Number {
    /// Create an integer value.
    pub const fn from_i64(value: i64) -> Self {
        Self(Repr::Integer(value))
    }

    /// Create a floating point value.
    ///
    /// Returns `None` for NaN and infinities, which have no JSON form.
    pub fn from_f64(value: f64) -> Option<Self> {
        if value.is_finite() {
            Some(Self(Repr::Float(value)))
        } else {
            None
        }
    }

    /// Whether this value is held as an integer.
    pub const fn is_integer(&self) -> bool {
        matches!(self.0, Repr::Integer(_))
    }

    /// The integer value, if this number is an integer.
    pub const fn as_i64(&self) -> Option<i64> {
        match self.0 {
            Repr::Integer(v) => Some(v),
            Repr::Float(_) => None,
        }
    }

    /// The value as a float (integers are converted).
    pub fn as_f64(&self) -> f64 {
        match self.0 {
            Repr::Integer(v) => v as f64,
            Repr::Float(v) => v,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self.0, other.0) {
            (Repr::Integer(a), Repr::Integer(b)) => a == b,
            (Repr::Float(a), Repr::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

// Floats are always finite, so bitwise comparison is a total equivalence.
impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.0 {
            Repr::Integer(v) => {
                0u8.hash(state);
                v.hash(state);
            }
            Repr::Float(v) => {
                1u8.hash(state);
                v.to_bits().hash(state);
            }
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Repr::Integer(v) => write!(f, "{}", v),
            Repr::Float(v) => write!(f, "{}", v),
        }
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Self::from_i64(i64::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);
