//! Unit codec.
//!
//! Units travel as one of three JSON shapes:
//!
//! ```text
//! "BYTE"                                              base unit
//! {"baseUnit": "BYTE", "baseScale": "MEGA"}           scaled unit
//! {"numeratorUnits": [..], "denominatorUnits": [..]}  compound unit
//! ```
//!
//! The scaled shape mirrors how the producer library stores a scaled unit
//! internally. It is part of the wire format, so it stays as is.

use std::str::FromStr;

use metricsbus_types::{BaseUnit, CompoundUnit, ParseUnitError, ScaledUnit, Unit};
use serde_json::{Map, Value};

use crate::error::CodecError;

pub(crate) const BASE_UNIT_KEY: &str = "baseUnit";
pub(crate) const BASE_SCALE_KEY: &str = "baseScale";
pub(crate) const NUMERATOR_UNITS_KEY: &str = "numeratorUnits";
pub(crate) const DENOMINATOR_UNITS_KEY: &str = "denominatorUnits";

/// Converts [`Unit`] values to and from JSON trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitCodec {
    _private: (),
}

impl UnitCodec {
    /// Create a unit codec.
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Encode a unit as a JSON tree.
    pub fn encode(&self, unit: &Unit) -> Value {
        match unit {
            Unit::Base(base) => Value::String(base.name().to_string()),
            Unit::Scaled(scaled) => {
                let mut object = Map::new();
                if let Some(base) = scaled.base_unit {
                    object.insert(BASE_UNIT_KEY.into(), Value::String(base.name().into()));
                }
                if let Some(scale) = scaled.base_scale {
                    object.insert(BASE_SCALE_KEY.into(), Value::String(scale.name().into()));
                }
                Value::Object(object)
            }
            Unit::Compound(compound) => {
                let mut object = Map::new();
                object.insert(
                    NUMERATOR_UNITS_KEY.into(),
                    self.encode_list(compound.numerator_units()),
                );
                object.insert(
                    DENOMINATOR_UNITS_KEY.into(),
                    self.encode_list(compound.denominator_units()),
                );
                Value::Object(object)
            }
        }
    }

    /// Decode a unit from a JSON tree.
    ///
    /// The shape is chosen by inspection, in order: a string is a base unit,
    /// an object with numerator/denominator keys is a compound unit, an object
    /// with base unit/scale keys is a scaled unit. Anything else fails.
    pub fn decode(&self, node: &Value) -> Result<Unit, CodecError> {
        match node {
            Value::String(name) => Ok(Unit::Base(name.parse::<BaseUnit>()?)),
            Value::Object(object)
                if object.contains_key(NUMERATOR_UNITS_KEY)
                    || object.contains_key(DENOMINATOR_UNITS_KEY) =>
            {
                let numerator_units = self.decode_list(object.get(NUMERATOR_UNITS_KEY))?;
                let denominator_units = self.decode_list(object.get(DENOMINATOR_UNITS_KEY))?;
                Ok(Unit::Compound(CompoundUnit::new(
                    numerator_units,
                    denominator_units,
                )))
            }
            Value::Object(object)
                if object.contains_key(BASE_UNIT_KEY) || object.contains_key(BASE_SCALE_KEY) =>
            {
                let base_unit = object.get(BASE_UNIT_KEY).map(parse_name).transpose()?;
                let base_scale = object.get(BASE_SCALE_KEY).map(parse_name).transpose()?;
                Ok(Unit::Scaled(ScaledUnit {
                    base_unit,
                    base_scale,
                }))
            }
            _ => Err(CodecError::InvalidUnitShape(format!(
                "expected unit; found: {}",
                node
            ))),
        }
    }

    fn encode_list(&self, units: &[Unit]) -> Value {
        Value::Array(units.iter().map(|unit| self.encode(unit)).collect())
    }

    // An absent list is empty; a present one must be an array.
    fn decode_list(&self, node: Option<&Value>) -> Result<Vec<Unit>, CodecError> {
        match node {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items.iter().map(|item| self.decode(item)).collect(),
            Some(other) => Err(CodecError::InvalidUnitShape(format!(
                "expected unit list; found: {}",
                other
            ))),
        }
    }
}

fn parse_name<T>(node: &Value) -> Result<T, CodecError>
where
    T: FromStr<Err = ParseUnitError>,
{
    Ok(read_name(node)?.parse::<T>()?)
}

fn read_name(node: &Value) -> Result<&str, CodecError> {
    node.as_str().ok_or_else(|| {
        CodecError::InvalidUnitShape(format!("expected unit name; found: {}", node))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use metricsbus_types::{units, BaseScale};
    use serde_json::json;

    fn roundtrip(unit: Unit) {
        let codec = UnitCodec::new();
        let encoded = codec.encode(&unit);
        assert_eq!(codec.decode(&encoded), Ok(unit), "encoded as {}", encoded);
    }

    #[test]
    fn test_roundtrip_every_shape() {
        roundtrip(units::BYTE);
        roundtrip(units::MEGABYTE);
        roundtrip(Unit::Scaled(ScaledUnit {
            base_unit: Some(BaseUnit::Bit),
            base_scale: None,
        }));
        roundtrip(Unit::Scaled(ScaledUnit {
            base_unit: None,
            base_scale: Some(BaseScale::Centi),
        }));
        roundtrip(units::bytes_per_second());
        roundtrip(Unit::compound(vec![units::BIT, units::SECOND], vec![]));
        roundtrip(Unit::compound(vec![], vec![units::CELSIUS, units::SECOND]));
    }

    #[test]
    fn test_roundtrip_nested_compound() {
        let per_second_squared = Unit::compound(
            vec![units::KILOBYTE],
            vec![units::SECOND, Unit::compound(vec![units::SECOND], vec![])],
        );
        roundtrip(per_second_squared);
    }

    #[test]
    fn test_encode_shapes() {
        let codec = UnitCodec::new();

        assert_eq!(codec.encode(&units::BYTE), json!("BYTE"));
        assert_eq!(
            codec.encode(&units::MEGABYTE),
            json!({"baseUnit": "BYTE", "baseScale": "MEGA"})
        );
        assert_eq!(
            codec.encode(&units::bits_per_second()),
            json!({"numeratorUnits": ["BIT"], "denominatorUnits": ["SECOND"]})
        );

        // Absent parts of a scaled unit are omitted, not written as null
        let base_only = Unit::Scaled(ScaledUnit {
            base_unit: Some(BaseUnit::Bit),
            base_scale: None,
        });
        assert_eq!(codec.encode(&base_only), json!({"baseUnit": "BIT"}));
    }

    #[test]
    fn test_decode_compound_from_wire() {
        let codec = UnitCodec::new();
        let node = json!({"numeratorUnits": ["BIT", "SECOND"], "denominatorUnits": []});

        let unit = codec.decode(&node).unwrap();
        assert_eq!(unit, Unit::compound(vec![units::BIT, units::SECOND], vec![]));
        assert_eq!(codec.encode(&unit), node);
    }

    #[test]
    fn test_decode_compound_missing_list_defaults_to_empty() {
        let codec = UnitCodec::new();

        let unit = codec.decode(&json!({"denominatorUnits": ["SECOND"]})).unwrap();
        assert_eq!(unit, Unit::compound(vec![], vec![units::SECOND]));
    }

    #[test]
    fn test_compound_keys_take_priority_over_scaled_keys() {
        let codec = UnitCodec::new();
        let node = json!({"numeratorUnits": ["BYTE"], "baseUnit": "BIT"});

        let unit = codec.decode(&node).unwrap();
        assert_eq!(unit, Unit::compound(vec![units::BYTE], vec![]));
    }

    #[test]
    fn test_decode_scaled_base_unit_only() {
        let codec = UnitCodec::new();

        let unit = codec.decode(&json!({"baseUnit": "BIT"})).unwrap();
        assert_eq!(
            unit,
            Unit::Scaled(ScaledUnit {
                base_unit: Some(BaseUnit::Bit),
                base_scale: None,
            })
        );
    }

    #[test]
    fn test_decode_invalid_shapes() {
        let codec = UnitCodec::new();

        for node in [json!({}), json!([]), json!(42), json!(null), json!(true)] {
            assert!(
                matches!(codec.decode(&node), Err(CodecError::InvalidUnitShape(_))),
                "{} should not decode",
                node
            );
        }
    }

    #[test]
    fn test_decode_unit_list_not_array() {
        let codec = UnitCodec::new();

        let err = codec
            .decode(&json!({"numeratorUnits": "INVALID_NUMERATOR"}))
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidUnitShape(
                "expected unit list; found: \"INVALID_NUMERATOR\"".to_string()
            )
        );

        let err = codec
            .decode(&json!({"denominatorUnits": "INVALID_DENOMINATOR"}))
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidUnitShape(_)));
    }

    #[test]
    fn test_decode_unknown_names() {
        let codec = UnitCodec::new();

        assert_eq!(
            codec.decode(&json!("INVALID_BASE_UNIT")),
            Err(CodecError::UnknownUnit {
                kind: "base unit",
                name: "INVALID_BASE_UNIT".to_string(),
            })
        );
        assert_eq!(
            codec.decode(&json!({"baseScale": "HUGE"})),
            Err(CodecError::UnknownUnit {
                kind: "base scale",
                name: "HUGE".to_string(),
            })
        );
        // Unknown names nested in a compound unit fail the whole unit
        assert!(matches!(
            codec.decode(&json!({"numeratorUnits": ["BYTE", "PARSEC"]})),
            Err(CodecError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn test_decode_scaled_name_not_string() {
        let codec = UnitCodec::new();

        assert!(matches!(
            codec.decode(&json!({"baseUnit": 7})),
            Err(CodecError::InvalidUnitShape(_))
        ));
    }
}
