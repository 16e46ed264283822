use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Marker the producer writes for a statistic without samples.
pub const MISSING_MARKER: &str = "-";

// ---------------------------------------------------------------------------
// StatValue
// ---------------------------------------------------------------------------

/// A single statistic as carried by the report artifact.
///
/// Values travel as JSON strings (`"45780"`, `"169.556"`). The producer
/// writes `"-"` for the ok/ko side of a statistic that has no samples, which
/// is kept as [`StatValue::Missing`] rather than coerced to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatValue {
    Number(f64),
    Missing,
}

impl StatValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StatValue::Number(n) => Some(*n),
            StatValue::Missing => None,
        }
    }

    /// The value as a request count: a non-negative integer.
    pub fn as_count(&self) -> Option<u64> {
        match self {
            StatValue::Number(n) if *n >= 0.0 && n.fract() == 0.0 && *n < u64::MAX as f64 => {
                Some(*n as u64)
            }
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, StatValue::Missing)
    }
}

impl From<u64> for StatValue {
    fn from(value: u64) -> Self {
        StatValue::Number(value as f64)
    }
}

impl From<f64> for StatValue {
    fn from(value: f64) -> Self {
        StatValue::Number(value)
    }
}

impl fmt::Display for StatValue {
    /// Shortest round-trip formatting: `45780.0` prints as `45780`,
    /// `169.556` as `169.556`. No locale, no rounding. Non-canonical input
    /// text such as `4.50` or `1e3` comes back as `4.5` and `1000`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Number(n) => write!(f, "{n}"),
            StatValue::Missing => f.write_str(MISSING_MARKER),
        }
    }
}

impl std::str::FromStr for StatValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == MISSING_MARKER {
            return Ok(StatValue::Missing);
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(StatValue::Number(n)),
            _ => Err(format!("'{s}' is not a statistic value")),
        }
    }
}

impl Serialize for StatValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

struct StatValueVisitor;

impl<'de> Visitor<'de> for StatValueVisitor {
    type Value = StatValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number, a numeric string or \"-\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<StatValue, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<StatValue, E> {
        Ok(StatValue::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<StatValue, E> {
        Ok(StatValue::Number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<StatValue, E> {
        if v.is_finite() {
            Ok(StatValue::Number(v))
        } else {
            Err(E::custom("statistic must be finite"))
        }
    }
}

impl<'de> Deserialize<'de> for StatValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(StatValueVisitor)
    }
}

// ---------------------------------------------------------------------------
// MetricSample
// ---------------------------------------------------------------------------

/// One statistic split by outcome: all requests, successful (ok) and
/// failed (ko).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub total: StatValue,
    pub ok: StatValue,
    pub ko: StatValue,
}

impl MetricSample {
    pub fn new(
        total: impl Into<StatValue>,
        ok: impl Into<StatValue>,
        ko: impl Into<StatValue>,
    ) -> Self {
        Self {
            total: total.into(),
            ok: ok.into(),
            ko: ko.into(),
        }
    }

    /// Values in display order: total, ok, ko.
    pub fn values(&self) -> [StatValue; 3] {
        [self.total, self.ok, self.ko]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_number_displays_without_fraction() {
        assert_eq!(StatValue::from(45780u64).to_string(), "45780");
        assert_eq!(StatValue::Number(0.0).to_string(), "0");
    }

    #[test]
    fn fractional_number_keeps_source_digits() {
        let v: StatValue = "169.556".parse().expect("should parse");
        assert_eq!(v.to_string(), "169.556");
    }

    #[test]
    fn missing_marker_round_trips() {
        let v: StatValue = serde_json::from_str("\"-\"").expect("should parse");
        assert!(v.is_missing());
        assert_eq!(serde_json::to_string(&v).expect("serialize"), "\"-\"");
    }

    #[test]
    fn bare_json_numbers_are_accepted() {
        let v: StatValue = serde_json::from_str("136").expect("should parse");
        assert_eq!(v, StatValue::Number(136.0));
        let v: StatValue = serde_json::from_str("64.504").expect("should parse");
        assert_eq!(v, StatValue::Number(64.504));
    }

    #[test]
    fn numbers_serialize_as_strings() {
        let sample = MetricSample::new(45780u64, 28364u64, 17416u64);
        let json = serde_json::to_string(&sample).expect("serialize");
        assert_eq!(json, r#"{"total":"45780","ok":"28364","ko":"17416"}"#);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(serde_json::from_str::<StatValue>("\"fast\"").is_err());
        assert!(serde_json::from_str::<StatValue>("\"NaN\"").is_err());
        assert!(serde_json::from_str::<StatValue>("true").is_err());
    }

    #[test]
    fn non_canonical_text_is_normalised() {
        let v: StatValue = "4.50".parse().expect("should parse");
        assert_eq!(v.to_string(), "4.5");
        let v: StatValue = "1e3".parse().expect("should parse");
        assert_eq!(v.to_string(), "1000");
    }

    #[test]
    fn as_count_requires_non_negative_integer() {
        assert_eq!(StatValue::Number(12.0).as_count(), Some(12));
        assert_eq!(StatValue::Number(12.5).as_count(), None);
        assert_eq!(StatValue::Number(-1.0).as_count(), None);
        assert_eq!(StatValue::Missing.as_count(), None);
        assert_eq!(StatValue::Number(2f64.powi(64)).as_count(), None);
    }

    #[test]
    fn values_are_in_total_ok_ko_order() {
        let sample = MetricSample::new(4u64, 5u64, 3u64);
        let [total, ok, ko] = sample.values();
        assert_eq!(total.to_string(), "4");
        assert_eq!(ok.to_string(), "5");
        assert_eq!(ko.to_string(), "3");
    }
}
