//! Quantity - a sample value with an optional unit.

use crate::{Number, Unit};

/// A numeric sample paired with an optional unit.
///
/// A quantity without a unit is distinct from one with any unit; there is no
/// implied default.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quantity {
    value: Number,
    unit: Option<Unit>,
}

impl Quantity {
    /// Create a quantity.
    pub fn new(value: impl Into<Number>, unit: Option<Unit>) -> Self {
        Self {
            value: value.into(),
            unit,
        }
    }

    /// Create a quantity without a unit.
    pub fn unitless(value: impl Into<Number>) -> Self {
        Self::new(value, None)
    }

    /// The sample value.
    pub fn value(&self) -> Number {
        self.value
    }

    /// The unit, if any.
    pub fn unit(&self) -> Option<&Unit> {
        self.unit.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{units, BaseUnit};

    #[test]
    fn test_equality() {
        let a = Quantity::new(100, Some(BaseUnit::Byte.into()));
        let b = Quantity::new(100, Some(Unit::Base(BaseUnit::Byte)));
        assert_eq!(a, b);

        assert_ne!(a, Quantity::unitless(100));
        assert_ne!(a, Quantity::new(100, Some(units::KILOBYTE)));
        assert_ne!(a, Quantity::new(101, Some(BaseUnit::Byte.into())));
    }

    #[test]
    fn test_accessors() {
        let q = Quantity::new(Number::from_f64(1.5).unwrap(), Some(units::SECOND));
        assert_eq!(q.value().as_f64(), 1.5);
        assert_eq!(q.unit(), Some(&units::SECOND));
        assert!(Quantity::unitless(1).unit().is_none());
    }
}
