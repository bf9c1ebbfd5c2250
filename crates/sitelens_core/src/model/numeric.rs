//! Numeric coercion for monetary, hours and count values.
//!
//! # Invariants
//! - Coercion never fails: anything unparseable is exactly `0.0`.
//! - The same rule applies to top-level fields and nested list items.
//! - Coerced values are always finite.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

static NON_NUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9.\-]").expect("valid numeric strip regex"));
static LEADING_DECIMAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)").expect("valid leading decimal regex")
});

/// Raw numeric value as it arrived on the wire.
///
/// The raw form is kept so the record round-trips unchanged; read it through
/// [`Amount::value`] or [`Amount::non_negative`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Amount {
    /// Absent or `null`.
    #[default]
    Missing,
    Number(f64),
    /// Free-form text such as `"$10,000"` or `"8 h"`.
    Text(String),
}

impl Amount {
    /// Coerces the raw value to a finite number, `0.0` when unparseable.
    pub fn value(&self) -> f64 {
        match self {
            Self::Missing => 0.0,
            Self::Number(number) => finite_or_zero(*number),
            Self::Text(text) => coerce_text(text),
        }
    }

    /// Coerced value clamped at zero.
    pub fn non_negative(&self) -> f64 {
        self.value().max(0.0)
    }

    /// Whether the field was sent at all (`null` counts as not sent).
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Missing)
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Missing => serializer.serialize_none(),
            Self::Number(number) => serializer.serialize_f64(*number),
            Self::Text(text) => serializer.serialize_str(text),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Null => Self::Missing,
            Value::Number(number) => Self::Number(number.as_f64().unwrap_or(0.0)),
            Value::String(text) => Self::Text(text),
            // Booleans, objects and arrays are not amounts; keep them as
            // present-but-zero so explicit count fields still win.
            _ => Self::Number(0.0),
        })
    }
}

/// Applies the text coercion rule: drop everything except digits, `.` and
/// `-`, then parse the longest leading decimal (`"1.2.3"` reads as `1.2`,
/// `"1000-2000"` as `1000`).
pub fn coerce_text(text: &str) -> f64 {
    let stripped = NON_NUMERIC_RE.replace_all(text, "");
    LEADING_DECIMAL_RE
        .find(&stripped)
        .and_then(|leading| leading.as_str().parse::<f64>().ok())
        .map(finite_or_zero)
        .unwrap_or(0.0)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::{coerce_text, Amount};

    #[test]
    fn currency_text_is_stripped() {
        assert_eq!(coerce_text("$10,000"), 10_000.0);
        assert_eq!(coerce_text(" 1 234.50 €"), 1_234.5);
        assert_eq!(coerce_text("-75"), -75.0);
    }

    #[test]
    fn unparseable_text_is_zero() {
        assert_eq!(coerce_text("n/a"), 0.0);
        assert_eq!(coerce_text(""), 0.0);
        assert_eq!(coerce_text("-"), 0.0);
        assert_eq!(coerce_text("--5"), 0.0);
        assert_eq!(coerce_text("."), 0.0);
    }

    #[test]
    fn leading_decimal_wins_over_trailing_garbage() {
        assert_eq!(coerce_text("1.2.3"), 1.2);
        assert_eq!(coerce_text("1000-2000"), 1_000.0);
        assert_eq!(coerce_text("12. units"), 12.0);
        assert_eq!(coerce_text("-.5"), -0.5);
        assert_eq!(coerce_text("approx .75 h"), 0.75);
    }

    #[test]
    fn non_finite_numbers_are_zero() {
        assert_eq!(Amount::Number(f64::NAN).value(), 0.0);
        assert_eq!(Amount::Number(f64::INFINITY).non_negative(), 0.0);
    }

    #[test]
    fn non_negative_clamps() {
        assert_eq!(Amount::from("-300").non_negative(), 0.0);
        assert_eq!(Amount::from(42.0).non_negative(), 42.0);
        assert_eq!(Amount::Missing.non_negative(), 0.0);
    }

    #[test]
    fn decode_accepts_any_json_shape() {
        let values: Vec<Amount> =
            serde_json::from_str(r#"[null, 12.5, "$3", true, {"a": 1}]"#).unwrap();
        assert_eq!(values[0], Amount::Missing);
        assert_eq!(values[1].value(), 12.5);
        assert_eq!(values[2].value(), 3.0);
        assert!(values[3].is_present());
        assert_eq!(values[4].value(), 0.0);
    }
}
