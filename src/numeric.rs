//! Lenient numeric fields and display formatting.
//!
//! Decimal columns (`totalValue`, `conversionRate`, overview `value`) arrive
//! as JSON numbers, numeric strings, null, or not at all. Aggregation treats
//! anything unreadable as 0, but the decoded form keeps "absent" and
//! "malformed" apart so callers can tell them from a real zero.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A decimal field as it came off the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Numeric {
    /// Missing, null, or an empty string.
    #[default]
    Absent,
    Value(f64),
    /// Present but not a number; keeps the raw text for diagnostics.
    Malformed(String),
}

impl Numeric {
    /// Parse text with a locale-agnostic float read.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Numeric::Absent;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Numeric::Value(v),
            _ => Numeric::Malformed(raw.to_string()),
        }
    }

    /// The value used by aggregation: absent and malformed read as 0.
    pub fn or_zero(&self) -> f64 {
        match self {
            Numeric::Value(v) => *v,
            Numeric::Malformed(raw) => {
                log::warn!("Numeric: treating malformed value {:?} as 0", raw);
                0.0
            }
            Numeric::Absent => 0.0,
        }
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, Numeric::Absent)
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Numeric::Malformed(_))
    }
}

impl From<f64> for Numeric {
    fn from(v: f64) -> Self {
        Numeric::Value(v)
    }
}

impl<'de> Deserialize<'de> for Numeric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match raw {
            None | Some(serde_json::Value::Null) => Numeric::Absent,
            Some(serde_json::Value::Number(n)) => match n.as_f64() {
                Some(v) => Numeric::Value(v),
                None => Numeric::Malformed(n.to_string()),
            },
            Some(serde_json::Value::String(s)) => Numeric::parse(&s),
            Some(other) => Numeric::Malformed(other.to_string()),
        })
    }
}

impl Serialize for Numeric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Numeric::Absent => serializer.serialize_none(),
            Numeric::Value(v) => serializer.serialize_f64(*v),
            Numeric::Malformed(raw) => serializer.serialize_str(raw),
        }
    }
}

/// Parse a form input the way the dashboards coerce numbers; malformed → 0.
pub fn parse_input(raw: &str) -> f64 {
    Numeric::parse(raw).or_zero()
}

/// Serde adapter for whole-number columns (`count`, `calls`, ...).
///
/// Accepts whatever [`Numeric`] accepts; fractions are truncated and anything
/// unreadable becomes 0, so one bad cell never drops its record.
pub fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(Numeric::deserialize(deserializer)?.or_zero().trunc() as i64)
}

/// `total / divisor` rounded to the nearest integer, 0 when the divisor is 0.
/// Halves round up (towards positive infinity): -2.5 → -2, 2.5 → 3.
pub fn rounded_average(total: f64, divisor: f64) -> f64 {
    if divisor == 0.0 {
        0.0
    } else {
        (total / divisor + 0.5).floor()
    }
}

/// Thousands-separated with at most three fraction digits: 50000 → "50,000".
pub fn format_thousands(value: f64) -> String {
    let scaled = (value.abs() * 1000.0).round() as u128;
    let int_part = scaled / 1000;
    let frac_part = scaled % 1000;

    let digits = int_part.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if frac_part > 0 {
        let frac = format!("{:03}", frac_part);
        grouped.push('.');
        grouped.push_str(frac.trim_end_matches('0'));
    }

    if value < 0.0 && scaled > 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// "$" prefixed currency display used by the deal KPIs.
pub fn format_currency(value: f64) -> String {
    format!("${}", format_thousands(value))
}

/// One-decimal percentage: 15.55 → "15.6%".
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_number_string_null_and_missing() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default)]
            v: Numeric,
        }
        let rows: Vec<Row> =
            serde_json::from_str(r#"[{"v": 12.5}, {"v": "40000"}, {"v": null}, {}, {"v": "n/a"}]"#)
                .unwrap();
        assert_eq!(rows[0].v, Numeric::Value(12.5));
        assert_eq!(rows[1].v, Numeric::Value(40000.0));
        assert_eq!(rows[2].v, Numeric::Absent);
        assert_eq!(rows[3].v, Numeric::Absent);
        assert_eq!(rows[4].v, Numeric::Malformed("n/a".into()));
    }

    #[test]
    fn test_malformed_and_absent_read_as_zero_but_stay_distinct() {
        let bad = Numeric::parse("12abc");
        let missing = Numeric::parse("  ");
        assert_eq!(bad.or_zero(), 0.0);
        assert_eq!(missing.or_zero(), 0.0);
        assert!(bad.is_malformed());
        assert!(!missing.is_present());
    }

    #[test]
    fn test_rounded_average_zero_divisor() {
        assert_eq!(rounded_average(0.0, 0.0), 0.0);
        assert_eq!(rounded_average(10.0, 0.0), 0.0);
        assert_eq!(rounded_average(10.0, 4.0), 3.0);
        assert_eq!(rounded_average(50000.0, 5.0), 10000.0);
    }

    #[test]
    fn test_rounded_average_halves_round_up() {
        assert_eq!(rounded_average(13.0, 2.0), 7.0);
        assert_eq!(rounded_average(-5.0, 2.0), -2.0);
        assert_eq!(rounded_average(-7.0, 2.0), -3.0);
        assert_eq!(rounded_average(-5.2, 2.0), -3.0);
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(50000.0), "50,000");
        assert_eq!(format_thousands(1234567.0), "1,234,567");
        assert_eq!(format_thousands(1234.5), "1,234.5");
        assert_eq!(format_thousands(-2500.25), "-2,500.25");
    }

    #[test]
    fn test_currency_and_percent() {
        assert_eq!(format_currency(50000.0), "$50,000");
        assert_eq!(format_percent(15.55), "15.6%");
        assert_eq!(format_percent(0.0), "0.0%");
    }
}
