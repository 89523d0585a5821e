//! Event codec.

use std::collections::BTreeMap;

use metricsbus_types::{Event, Number, Quantity, Samples};
use serde_json::{Map, Value};

use super::unit::UnitCodec;
use crate::error::CodecError;

pub(crate) const ANNOTATIONS_KEY: &str = "annotations";
pub(crate) const TIMER_SAMPLES_KEY: &str = "timerSamples";
pub(crate) const COUNTER_SAMPLES_KEY: &str = "counterSamples";
pub(crate) const GAUGE_SAMPLES_KEY: &str = "gaugeSamples";

const VALUE_KEY: &str = "value";
const UNIT_KEY: &str = "unit";

const EVENT_KEYS: [&str; 4] = [
    ANNOTATIONS_KEY,
    TIMER_SAMPLES_KEY,
    COUNTER_SAMPLES_KEY,
    GAUGE_SAMPLES_KEY,
];

/// Converts [`Event`] values to and from JSON.
///
/// The codec holds no state; construct one and hand it to whatever needs to
/// encode or decode.
///
/// # Example
///
/// ```rust
/// use metricsbus_sdk::EventCodec;
/// use metricsbus_types::{units, Event, Quantity};
///
/// let codec = EventCodec::new();
/// let event = Event::builder()
///     .timer_sample("t", Quantity::new(100, Some(units::BYTE)))
///     .build();
///
/// let json = codec.encode(&event).unwrap();
/// assert_eq!(codec.decode(&json).unwrap(), event);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct EventCodec {
    units: UnitCodec,
}

impl EventCodec {
    /// Create an event codec.
    pub const fn new() -> Self {
        Self {
            units: UnitCodec::new(),
        }
    }

    /// The unit codec used for embedded units.
    pub fn units(&self) -> &UnitCodec {
        &self.units
    }

    /// Encode an event as JSON text.
    pub fn encode(&self, event: &Event) -> Result<String, CodecError> {
        let value = self.to_value(event)?;
        serde_json::to_string(&value).map_err(|e| CodecError::Encode(e.to_string()))
    }

    /// Encode an event as a JSON tree with exactly the four event keys.
    pub fn to_value(&self, event: &Event) -> Result<Value, CodecError> {
        let annotations = event
            .annotations()
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect::<Map<_, _>>();

        let mut object = Map::new();
        object.insert(ANNOTATIONS_KEY.into(), Value::Object(annotations));
        object.insert(
            TIMER_SAMPLES_KEY.into(),
            self.encode_samples(event.timer_samples())?,
        );
        object.insert(
            COUNTER_SAMPLES_KEY.into(),
            self.encode_samples(event.counter_samples())?,
        );
        object.insert(
            GAUGE_SAMPLES_KEY.into(),
            self.encode_samples(event.gauge_samples())?,
        );
        Ok(Value::Object(object))
    }

    /// Encode a quantity. The `unit` key is omitted when there is no unit.
    pub fn encode_quantity(&self, quantity: &Quantity) -> Result<Value, CodecError> {
        let mut object = Map::new();
        object.insert(VALUE_KEY.into(), encode_number(quantity.value())?);
        if let Some(unit) = quantity.unit() {
            object.insert(UNIT_KEY.into(), self.units.encode(unit));
        }
        Ok(Value::Object(object))
    }

    /// Decode an event from JSON text.
    ///
    /// Decoding is all or nothing: any invalid annotation, sample or unit
    /// fails the whole event.
    pub fn decode(&self, body: &str) -> Result<Event, CodecError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| CodecError::MalformedEvent(format!("invalid JSON: {}", e)))?;
        self.from_value(&value)
    }

    /// Decode an event from a JSON tree.
    pub fn from_value(&self, value: &Value) -> Result<Event, CodecError> {
        let object = value.as_object().ok_or_else(|| {
            CodecError::MalformedEvent(format!("expected event object; found: {}", value))
        })?;

        if let Some(key) = object
            .keys()
            .find(|key| !EVENT_KEYS.contains(&key.as_str()))
        {
            return Err(CodecError::MalformedEvent(format!("unexpected key: {}", key)));
        }

        let annotations = decode_annotations(required(object, ANNOTATIONS_KEY)?)?;
        let timer_samples =
            self.decode_samples(TIMER_SAMPLES_KEY, required(object, TIMER_SAMPLES_KEY)?)?;
        let counter_samples =
            self.decode_samples(COUNTER_SAMPLES_KEY, required(object, COUNTER_SAMPLES_KEY)?)?;
        let gauge_samples =
            self.decode_samples(GAUGE_SAMPLES_KEY, required(object, GAUGE_SAMPLES_KEY)?)?;

        Ok(Event::new(
            annotations,
            timer_samples,
            counter_samples,
            gauge_samples,
        ))
    }

    /// Decode a quantity.
    ///
    /// A numeric `value` is required. An absent or null `unit` yields a
    /// quantity without a unit; any other `unit` must decode as a unit.
    pub fn decode_quantity(&self, node: &Value) -> Result<Quantity, CodecError> {
        let object = node.as_object().ok_or_else(|| {
            CodecError::MalformedEvent(format!("expected quantity; found: {}", node))
        })?;

        if let Some(key) = object
            .keys()
            .find(|key| key.as_str() != VALUE_KEY && key.as_str() != UNIT_KEY)
        {
            return Err(CodecError::MalformedEvent(format!(
                "unexpected quantity key: {}",
                key
            )));
        }

        let value = object
            .get(VALUE_KEY)
            .and_then(decode_number)
            .ok_or_else(|| {
                CodecError::MalformedEvent(format!("expected numeric value; found: {}", node))
            })?;

        let unit = match object.get(UNIT_KEY) {
            None | Some(Value::Null) => None,
            Some(unit) => Some(self.units.decode(unit)?),
        };

        Ok(Quantity::new(value, unit))
    }

    fn encode_samples(&self, samples: &Samples) -> Result<Value, CodecError> {
        let mut object = Map::new();
        for (name, quantities) in samples {
            let encoded = quantities
                .iter()
                .map(|q| self.encode_quantity(q))
                .collect::<Result<Vec<_>, _>>()?;
            object.insert(name.clone(), Value::Array(encoded));
        }
        Ok(Value::Object(object))
    }

    fn decode_samples(&self, key: &str, node: &Value) -> Result<Samples, CodecError> {
        let object = node.as_object().ok_or_else(|| {
            CodecError::MalformedEvent(format!("expected {} object; found: {}", key, node))
        })?;

        let mut samples = Samples::new();
        for (name, list) in object {
            let items = list.as_array().ok_or_else(|| {
                CodecError::MalformedEvent(format!(
                    "expected sample list for {}.{}; found: {}",
                    key, name, list
                ))
            })?;
            let quantities = items
                .iter()
                .map(|item| self.decode_quantity(item))
                .collect::<Result<Vec<_>, _>>()?;
            samples.insert(name.clone(), quantities);
        }
        Ok(samples)
    }
}

fn required<'a>(object: &'a Map<String, Value>, key: &str) -> Result<&'a Value, CodecError> {
    object
        .get(key)
        .ok_or_else(|| CodecError::MalformedEvent(format!("missing key: {}", key)))
}

fn decode_annotations(node: &Value) -> Result<BTreeMap<String, String>, CodecError> {
    let object = node.as_object().ok_or_else(|| {
        CodecError::MalformedEvent(format!("expected annotations object; found: {}", node))
    })?;

    object
        .iter()
        .map(|(key, value)| match value {
            Value::String(text) => Ok((key.clone(), text.clone())),
            other => Err(CodecError::MalformedEvent(format!(
                "expected annotation text for {}; found: {}",
                key, other
            ))),
        })
        .collect()
}

fn encode_number(number: Number) -> Result<Value, CodecError> {
    match number.as_i64() {
        Some(int) => Ok(Value::from(int)),
        None => serde_json::Number::from_f64(number.as_f64())
            .map(Value::Number)
            .ok_or_else(|| CodecError::Encode(format!("value {} has no JSON form", number))),
    }
}

fn decode_number(node: &Value) -> Option<Number> {
    let Value::Number(number) = node else {
        return None;
    };
    match number.as_i64() {
        Some(int) => Some(Number::from_i64(int)),
        None => number.as_f64().and_then(Number::from_f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metricsbus_types::{units, BaseScale, BaseUnit, ScaledUnit, Unit};
    use serde_json::json;

    fn sample_event() -> Event {
        Event::builder()
            .annotation("someAnnotationKey", "someAnnotationValue")
            .timer_sample("timerSamples", Quantity::new(100, Some(units::MEGABYTE)))
            .timer_sample("timerSamples", Quantity::new(40, Some(units::GIGABYTE)))
            .counter_sample(
                "counterSamples",
                Quantity::new(400, Some(units::MILLISECOND)),
            )
            .gauge_sample(
                "gaugeSamples",
                Quantity::new(1000, Some(units::MILLISECOND)),
            )
            .gauge_sample("gaugeSamples", Quantity::new(5, Some(units::MINUTE)))
            .gauge_sample(
                "gaugeSamples",
                Quantity::new(Number::from_f64(0.25).unwrap(), None),
            )
            .build()
    }

    fn body(timer_samples: Value) -> String {
        json!({
            "annotations": {},
            "timerSamples": timer_samples,
            "counterSamples": {},
            "gaugeSamples": {},
        })
        .to_string()
    }

    #[test]
    fn test_roundtrip() {
        let codec = EventCodec::new();
        let event = sample_event();

        let json = codec.encode(&event).unwrap();
        assert_eq!(codec.decode(&json).unwrap(), event);
    }

    #[test]
    fn test_roundtrip_every_unit_shape() {
        let codec = EventCodec::new();
        let event = Event::builder()
            .timer_sample("t", Quantity::new(100, Some(units::BYTE)))
            .timer_sample("t", Quantity::new(20, Some(units::MEGABYTE)))
            .timer_sample("t", Quantity::new(3, Some(units::bytes_per_second())))
            .timer_sample(
                "t",
                Quantity::new(4, Some(Unit::compound(vec![units::BIT, units::SECOND], vec![]))),
            )
            .timer_sample(
                "t",
                Quantity::new(
                    5,
                    Some(Unit::compound(vec![], vec![units::CELSIUS, units::SECOND])),
                ),
            )
            .timer_sample(
                "t",
                Quantity::new(
                    6,
                    Some(Unit::Scaled(ScaledUnit {
                        base_unit: None,
                        base_scale: Some(BaseScale::Centi),
                    })),
                ),
            )
            .build();

        let json = codec.encode(&event).unwrap();
        assert_eq!(codec.decode(&json).unwrap(), event);
    }

    #[test]
    fn test_encode_shape() {
        let codec = EventCodec::new();
        let event = Event::builder()
            .annotation("k", "v")
            .counter_sample("c", Quantity::unitless(7))
            .gauge_sample("g", Quantity::new(2, Some(units::BYTE)))
            .build();

        assert_eq!(
            codec.to_value(&event).unwrap(),
            json!({
                "annotations": {"k": "v"},
                "timerSamples": {},
                "counterSamples": {"c": [{"value": 7}]},
                "gaugeSamples": {"g": [{"value": 2, "unit": "BYTE"}]},
            })
        );
    }

    #[test]
    fn test_decode_empty_maps() {
        let codec = EventCodec::new();

        let event = codec.decode(&body(json!({}))).unwrap();
        assert!(event.is_empty());
        assert_eq!(event, Event::default());
    }

    #[test]
    fn test_decode_base_unit_sample() {
        let codec = EventCodec::new();
        let body = r#"{"annotations":{"k":"v"},"timerSamples":{"t":[{"value":100,"unit":"BYTE"}]},"counterSamples":{},"gaugeSamples":{}}"#;

        let event = codec.decode(body).unwrap();
        assert_eq!(event.annotations()["k"], "v");
        assert_eq!(
            event.timer_samples()["t"],
            vec![Quantity::new(100, Some(Unit::Base(BaseUnit::Byte)))]
        );
    }

    #[test]
    fn test_decode_quantity_without_unit() {
        let codec = EventCodec::new();

        let event = codec.decode(&body(json!({"t": [{"value": 1}]}))).unwrap();
        assert_eq!(event.timer_samples()["t"], vec![Quantity::unitless(1)]);

        let event = codec
            .decode(&body(json!({"t": [{"value": 1, "unit": null}]})))
            .unwrap();
        assert_eq!(event.timer_samples()["t"], vec![Quantity::unitless(1)]);
    }

    #[test]
    fn test_decode_keeps_number_representation() {
        let codec = EventCodec::new();

        let event = codec
            .decode(&body(json!({"t": [{"value": 100}, {"value": 2.5}]})))
            .unwrap();
        let samples = &event.timer_samples()["t"];
        assert!(samples[0].value().is_integer());
        assert_eq!(samples[1].value(), Number::from_f64(2.5).unwrap());
    }

    #[test]
    fn test_decode_missing_keys() {
        let codec = EventCodec::new();

        for missing in EVENT_KEYS {
            let mut object = json!({
                "annotations": {},
                "timerSamples": {},
                "counterSamples": {},
                "gaugeSamples": {},
            });
            object.as_object_mut().unwrap().remove(missing);

            assert_eq!(
                codec.decode(&object.to_string()),
                Err(CodecError::MalformedEvent(format!("missing key: {}", missing)))
            );
        }
    }

    #[test]
    fn test_decode_not_json() {
        let codec = EventCodec::new();

        assert!(matches!(
            codec.decode("not json"),
            Err(CodecError::MalformedEvent(_))
        ));
        assert!(matches!(
            codec.decode("[1, 2]"),
            Err(CodecError::MalformedEvent(_))
        ));
        assert!(matches!(
            codec.decode(r#"{"someKey":"someValue"}"#),
            Err(CodecError::MalformedEvent(_))
        ));
    }

    #[test]
    fn test_decode_invalid_samples() {
        let codec = EventCodec::new();
        let whole = json!({
            "annotations": {"someAnnotationKey": "someAnnotationValue"},
            "timerSamples": {"someKey": "invalid value"},
            "counterSamples": {"another": "another invalid value"},
            "gaugeSamples": {"validKey": [{"value": 10, "unit": {"baseUnit": "BYTE", "baseScale": "MEGA"}}]},
        })
        .to_string();

        assert!(matches!(
            codec.decode(&whole),
            Err(CodecError::MalformedEvent(_))
        ));

        for samples in [
            json!({"t": ["invalid value"]}),
            json!({"t": [{"unit": "BYTE"}]}),
            json!({"t": [{"value": "100"}]}),
            json!({"t": [{"value": 1, "extra": true}]}),
            json!([]),
        ] {
            assert!(
                matches!(
                    codec.decode(&body(samples.clone())),
                    Err(CodecError::MalformedEvent(_))
                ),
                "{} should not decode",
                samples
            );
        }
    }

    #[test]
    fn test_decode_invalid_annotations() {
        let codec = EventCodec::new();
        let body = json!({
            "annotations": {"k": 1},
            "timerSamples": {},
            "counterSamples": {},
            "gaugeSamples": {},
        })
        .to_string();

        assert!(matches!(
            codec.decode(&body),
            Err(CodecError::MalformedEvent(_))
        ));
    }

    #[test]
    fn test_decode_unit_errors_fail_event() {
        let codec = EventCodec::new();

        assert!(matches!(
            codec.decode(&body(json!({"t": [{"value": 1, "unit": []}]}))),
            Err(CodecError::InvalidUnitShape(_))
        ));
        assert!(matches!(
            codec.decode(&body(json!({"t": [{"value": 1, "unit": {}}]}))),
            Err(CodecError::InvalidUnitShape(_))
        ));
        assert!(matches!(
            codec.decode(&body(json!({"t": [{"value": 1, "unit": "INVALID_BASE_UNIT"}]}))),
            Err(CodecError::UnknownUnit { .. })
        ));
        assert!(matches!(
            codec.decode(&body(
                json!({"t": [{"value": 1}, {"value": 2, "unit": {"numeratorUnits": "INVALID_NUMERATOR"}}]})
            )),
            Err(CodecError::InvalidUnitShape(_))
        ));
    }

    #[test]
    fn test_decode_scaled_unit_partial() {
        let codec = EventCodec::new();

        let event = codec
            .decode(&body(json!({"t": [{"value": 1, "unit": {"baseScale": "CENTI"}}]})))
            .unwrap();
        assert_eq!(
            event.timer_samples()["t"][0].unit(),
            Some(&Unit::Scaled(ScaledUnit {
                base_unit: None,
                base_scale: Some(BaseScale::Centi),
            }))
        );
    }
}
