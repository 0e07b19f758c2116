//! Unit conversion and lenient number parsing at the data-source boundary.
//!
//! Descriptor files may spell infinite bounds as `inf`, `-inf`, `.inf` and
//! speeds with an explicit unit (`32 mph`, `51 km/h`, `14.3 m/s`). Everything
//! is converted to plain `f64` metres per second here so the rest of the
//! crate never sees units.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};

/// Miles per hour in one metre per second.
pub const MS_TO_MPH: f64 = 2.236_94;

/// Metres per second in one mile per hour.
pub const MPH_TO_MS: f64 = 0.447_04;

/// Metres per second in one kilometre per hour.
pub const KPH_TO_MS: f64 = 1.0 / 3.6;

static QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)\s*(mph|km/h|kph|m/s)?\s*$")
        .expect("quantity regex is valid")
});

/// A value could not be read as a number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitError {
    /// Not a number or infinity.
    #[error("'{0}' is not a number")]
    NotANumber(String),
    /// A unit was given where only a plain number is allowed.
    #[error("'{0}' has a unit; expected a plain number")]
    UnexpectedUnit(String),
}

fn infinity(text: &str) -> Option<f64> {
    match text.trim().to_ascii_lowercase().as_str() {
        "inf" | "+inf" | ".inf" | "+.inf" | "infinity" | "+infinity" => Some(f64::INFINITY),
        "-inf" | "-.inf" | "-infinity" => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

fn quantity(text: &str) -> Result<(f64, Option<&str>), UnitError> {
    let captures = QUANTITY
        .captures(text)
        .ok_or_else(|| UnitError::NotANumber(text.to_string()))?;
    let value = captures[1]
        .parse::<f64>()
        .map_err(|_| UnitError::NotANumber(text.to_string()))?;
    Ok((value, captures.get(2).map(|m| m.as_str())))
}

/// Parse a plain number, accepting spelled-out infinities.
///
/// # Errors
///
/// Returns [`UnitError`] if the text is not a number.
pub fn parse_number(text: &str) -> Result<f64, UnitError> {
    if let Some(value) = infinity(text) {
        return Ok(value);
    }
    match quantity(text)? {
        (value, None) => Ok(value),
        (_, Some(_)) => Err(UnitError::UnexpectedUnit(text.to_string())),
    }
}

/// Parse a speed, converting to metres per second.
///
/// A bare number is taken to already be in metres per second.
///
/// # Errors
///
/// Returns [`UnitError`] if the text is not a number with an optional unit.
pub fn parse_speed(text: &str) -> Result<f64, UnitError> {
    if let Some(value) = infinity(text) {
        return Ok(value);
    }
    let (value, unit) = quantity(text)?;
    Ok(match unit {
        Some("mph") => value * MPH_TO_MS,
        Some("km/h" | "kph") => value * KPH_TO_MS,
        _ => value,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Number(f64),
    Text(String),
}

/// Deserialize an optional number that may be spelled as an infinity.
///
/// # Errors
///
/// Fails if the value is neither a number nor a numeric string.
pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(value)) => Ok(Some(value)),
        Some(Raw::Text(text)) => parse_number(&text).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Deserialize an optional speed with an optional unit, in metres per second.
///
/// # Errors
///
/// Fails if the value is neither a number nor a speed string.
pub fn speed<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(value)) => Ok(Some(value)),
        Some(Raw::Text(text)) => parse_speed(&text).map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use test_case::test_case;

    use super::*;

    #[test_case("inf", f64::INFINITY; "short")]
    #[test_case(".inf", f64::INFINITY; "yaml style")]
    #[test_case("-inf", f64::NEG_INFINITY; "negative")]
    #[test_case("-Infinity", f64::NEG_INFINITY; "spelled out")]
    #[test_case("1513", 1513.0; "integer")]
    #[test_case(" 2.84 ", 2.84; "padded")]
    #[test_case("-0.5", -0.5; "signed")]
    fn numbers(input: &str, expected: f64) {
        assert_eq!(parse_number(input).unwrap(), expected);
    }

    #[test_case("heavy"; "word")]
    #[test_case(""; "empty")]
    #[test_case("1.2.3"; "two dots")]
    fn not_numbers(input: &str) {
        assert_eq!(parse_number(input), Err(UnitError::NotANumber(input.to_string())));
    }

    #[test]
    fn plain_numbers_reject_units() {
        assert!(matches!(parse_number("3 mph"), Err(UnitError::UnexpectedUnit(_))));
    }

    #[test_case("32 mph", 32.0 * MPH_TO_MS; "mph")]
    #[test_case("51 km/h", 51.0 / 3.6; "kmh")]
    #[test_case("14.3 m/s", 14.3; "explicit ms")]
    #[test_case("14.3", 14.3; "bare")]
    #[test_case("-inf", f64::NEG_INFINITY; "negative infinity")]
    fn speeds(input: &str, expected: f64) {
        let actual = parse_speed(input).unwrap();
        assert!((actual - expected).abs() < 1e-9 || actual == expected, "{actual} != {expected}");
    }

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "number")]
        bound: Option<f64>,
        #[serde(default, deserialize_with = "speed")]
        min_speed: Option<f64>,
    }

    #[test]
    fn yaml_fields_accept_numbers_strings_and_absence() {
        let sample: Sample = serde_yaml::from_str("bound: .inf\nmin_speed: 10 mph\n").unwrap();
        assert_eq!(sample.bound, Some(f64::INFINITY));
        assert!((sample.min_speed.unwrap() - 4.4704).abs() < 1e-9);

        let sample: Sample = serde_yaml::from_str("bound: inf\n").unwrap();
        assert_eq!(sample.bound, Some(f64::INFINITY));
        assert_eq!(sample.min_speed, None);

        let sample: Sample = serde_yaml::from_str("bound: 3\nmin_speed: ~\n").unwrap();
        assert_eq!(sample.bound, Some(3.0));
        assert_eq!(sample.min_speed, None);
    }

    #[test]
    fn json_fields_accept_infinity_strings() {
        let sample: Sample =
            serde_json::from_str(r#"{"bound": "-inf", "min_speed": 2.5}"#).unwrap();
        assert_eq!(sample.bound, Some(f64::NEG_INFINITY));
        assert_eq!(sample.min_speed, Some(2.5));
    }

    #[test]
    fn invalid_text_is_a_deserialization_error() {
        assert!(serde_yaml::from_str::<Sample>("bound: lots\n").is_err());
    }
}
