//! Measurement units.
//!
//! A [`Unit`] is one of three shapes:
//!
//! - [`BaseUnit`]: a symbolic name such as `BYTE` or `SECOND`
//! - [`ScaledUnit`]: an optional base unit with an optional [`BaseScale`]
//! - [`CompoundUnit`]: ordered numerator and denominator unit lists

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Error returned when a unit or scale name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseUnitError {
    kind: &'static str,
    name: String,
}

impl ParseUnitError {
    fn new(kind: &'static str, name: &str) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// What was being parsed: `"base unit"` or `"base scale"`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The name that failed to parse.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ParseUnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {}", self.kind, self.name)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseUnitError {}

macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// The canonical wire name.
            pub const fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl core::str::FromStr for $name {
            type Err = ParseUnitError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(ParseUnitError::new($kind, s)),
                }
            }
        }
    };
}

named_enum! {
    /// A base unit of measure.
    BaseUnit, "base unit" {
        Second => "SECOND",
        Minute => "MINUTE",
        Hour => "HOUR",
        Day => "DAY",
        Week => "WEEK",
        Bit => "BIT",
        Byte => "BYTE",
        Kelvin => "KELVIN",
        Celsius => "CELSIUS",
        Fahrenheit => "FAHRENHEIT",
    }
}

named_enum! {
    /// A scale prefix applied to a base unit.
    ///
    /// Covers the SI prefixes and the IEC binary prefixes.
    BaseScale, "base scale" {
        Yocto => "YOCTO",
        Zepto => "ZEPTO",
        Atto => "ATTO",
        Femto => "FEMTO",
        Pico => "PICO",
        Nano => "NANO",
        Micro => "MICRO",
        Milli => "MILLI",
        Centi => "CENTI",
        Deci => "DECI",
        Deca => "DECA",
        Hecto => "HECTO",
        Kilo => "KILO",
        Mega => "MEGA",
        Giga => "GIGA",
        Tera => "TERA",
        Peta => "PETA",
        Exa => "EXA",
        Zetta => "ZETTA",
        Yotta => "YOTTA",
        Kibi => "KIBI",
        Mebi => "MEBI",
        Gibi => "GIBI",
        Tebi => "TEBI",
        Pebi => "PEBI",
        Exbi => "EXBI",
        Zebi => "ZEBI",
        Yobi => "YOBI",
    }
}

/// A base unit with an optional scale.
///
/// Either part may be absent: a scaled unit decoded from `{"baseScale":"CENTI"}`
/// keeps its base unit unset rather than picking a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScaledUnit {
    /// The unit being scaled.
    pub base_unit: Option<BaseUnit>,

    /// The scale applied to the base unit.
    pub base_scale: Option<BaseScale>,
}

impl ScaledUnit {
    /// Create a scaled unit with both parts set.
    pub const fn new(base_unit: BaseUnit, base_scale: BaseScale) -> Self {
        Self {
            base_unit: Some(base_unit),
            base_scale: Some(base_scale),
        }
    }
}

/// A ratio of unit products, e.g. `BYTE / SECOND`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CompoundUnit {
    numerator_units: Vec<Unit>,
    denominator_units: Vec<Unit>,
}

impl CompoundUnit {
    /// Create a compound unit. Either list may be empty.
    pub fn new(numerator_units: Vec<Unit>, denominator_units: Vec<Unit>) -> Self {
        Self {
            numerator_units,
            denominator_units,
        }
    }

    /// Units multiplied together above the line.
    pub fn numerator_units(&self) -> &[Unit] {
        &self.numerator_units
    }

    /// Units multiplied together below the line.
    pub fn denominator_units(&self) -> &[Unit] {
        &self.denominator_units
    }
}

/// A unit of measure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Unit {
    /// A plain base unit.
    Base(BaseUnit),
    /// A base unit with a scale.
    Scaled(ScaledUnit),
    /// A ratio of unit products.
    Compound(CompoundUnit),
}

impl Unit {
    /// Shorthand for a fully specified scaled unit.
    pub const fn scaled(base_unit: BaseUnit, base_scale: BaseScale) -> Self {
        Unit::Scaled(ScaledUnit::new(base_unit, base_scale))
    }

    /// Shorthand for a compound unit.
    pub fn compound(numerator_units: Vec<Unit>, denominator_units: Vec<Unit>) -> Self {
        Unit::Compound(CompoundUnit::new(numerator_units, denominator_units))
    }
}

impl From<BaseUnit> for Unit {
    fn from(unit: BaseUnit) -> Self {
        Unit::Base(unit)
    }
}

impl From<ScaledUnit> for Unit {
    fn from(unit: ScaledUnit) -> Self {
        Unit::Scaled(unit)
    }
}

impl From<CompoundUnit> for Unit {
    fn from(unit: CompoundUnit) -> Self {
        Unit::Compound(unit)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Base(base) => f.write_str(base.name()),
            Unit::Scaled(scaled) => {
                if let Some(scale) = scaled.base_scale {
                    f.write_str(scale.name())?;
                }
                if let Some(base) = scaled.base_unit {
                    f.write_str(base.name())?;
                }
                Ok(())
            }
            Unit::Compound(compound) => {
                write_product(f, compound.numerator_units())?;
                if !compound.denominator_units().is_empty() {
                    f.write_str("/")?;
                    write_product(f, compound.denominator_units())?;
                }
                Ok(())
            }
        }
    }
}

fn write_product(f: &mut fmt::Formatter<'_>, units: &[Unit]) -> fmt::Result {
    if units.is_empty() {
        return f.write_str("1");
    }
    f.write_str("(")?;
    for (i, unit) in units.iter().enumerate() {
        if i > 0 {
            f.write_str("*")?;
        }
        write!(f, "{}", unit)?;
    }
    f.write_str(")")
}
