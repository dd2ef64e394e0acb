//! Temperature configuration parsing with a float-repair pass.
//!
//! Some legacy firmware serializers emit whole-number temperatures as
//! floats (`60.0`) where the schema requires integers. The strict parse
//! rejects those; [`TemperatureConfig::parse`] retries once after
//! rounding every float leaf to the nearest integer, leaving structure
//! and every other value kind untouched.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Validated temperature control settings. Unknown fields in the raw
/// document are ignored; the integer fields reject floats under strict
/// deserialization.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct TemperatureConfig {
    pub mode: Option<String>,
    pub target_temp: Option<i64>,
    pub hot_temp: Option<i64>,
    pub dangerous_temp: Option<i64>,
}

#[derive(Debug, Error)]
pub enum TemperatureConfigError {
    #[error("temperature config rejected even after float repair: {0}")]
    Invalid(#[from] serde_json::Error),
}

impl TemperatureConfig {
    /// Strict parse of a raw configuration document, no repairs.
    pub fn parse_strict(payload: &Value) -> Result<Self, TemperatureConfigError> {
        Ok(Self::deserialize(payload)?)
    }

    /// Strict parse with one repair retry. The repair only rescues
    /// float-for-integer mismatches; any other schema violation fails
    /// the retry as well.
    pub fn parse(payload: &Value) -> Result<Self, TemperatureConfigError> {
        match Self::deserialize(payload) {
            Ok(config) => Ok(config),
            Err(_) => Ok(Self::deserialize(&coerce_floats(payload.clone()))?),
        }
    }
}

/// Recursively round every float leaf to the nearest integer, half away
/// from zero. Mappings, sequences, strings, integers, booleans and null
/// pass through structurally unchanged.
fn coerce_floats(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, coerce_floats(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(coerce_floats).collect()),
        // Integer-valued numbers report is_f64() == false, so only true
        // float leaves are rewritten.
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.is_finite() => Value::from(f.round() as i64),
            _ => Value::Number(n),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strict_parse_accepts_integer_temperatures() {
        let config =
            TemperatureConfig::parse_strict(&json!({"mode": "auto", "target_temp": 70})).unwrap();
        assert_eq!(config.mode.as_deref(), Some("auto"));
        assert_eq!(config.target_temp, Some(70));
    }

    #[test]
    fn strict_parse_rejects_float_temperatures() {
        assert!(TemperatureConfig::parse_strict(&json!({"target_temp": 60.0})).is_err());
    }

    #[test]
    fn parse_repairs_floats_where_integers_are_required() {
        let config = TemperatureConfig::parse(&json!({"target_temp": 60.0, "name": "x"})).unwrap();
        assert_eq!(config.target_temp, Some(60));
    }

    #[test]
    fn parse_fails_when_the_problem_is_not_a_float() {
        assert!(TemperatureConfig::parse(&json!({"target_temp": "hot"})).is_err());
    }

    #[test]
    fn parse_rounds_half_away_from_zero() {
        let config = TemperatureConfig::parse(&json!({"target_temp": 60.5})).unwrap();
        assert_eq!(config.target_temp, Some(61));
    }

    #[test]
    fn coercion_preserves_nested_structure_and_other_kinds() {
        let coerced = coerce_floats(json!({
            "levels": [59.9, 60, "61"],
            "inner": {"hot_temp": 79.5, "enabled": true, "label": null},
        }));
        assert_eq!(
            coerced,
            json!({
                "levels": [60, 60, "61"],
                "inner": {"hot_temp": 80, "enabled": true, "label": null},
            })
        );
    }
}
