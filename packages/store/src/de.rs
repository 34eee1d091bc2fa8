//! Lenient field deserialisers shared by every record type.
//!
//! Stored records were written by form handlers, so numbers often arrive as
//! strings (`"1234.50"`), identifiers as numbers, and any field may be `null`.
//! All of that defaulting happens here and nowhere else.

use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(f64),
    Text(String),
    Flag(bool),
}

impl Scalar {
    fn to_f64(&self) -> f64 {
        match self {
            Scalar::Number(n) => *n,
            Scalar::Text(s) => s.trim().parse().unwrap_or(0.0),
            Scalar::Flag(_) => 0.0,
        }
    }
}

/// A number that may be stored as a JSON number, a numeric string or `null`.
/// Anything unparseable is `0.0`.
pub(crate) fn number<'de, D>(d: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(d)?
        .map(|s| s.to_f64())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0))
}

/// A whole, non-negative count (e.g. tenure in months). Fractions truncate.
pub(crate) fn count<'de, D>(d: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let n = number(d)?;
    if n > 0.0 {
        Ok(n.trunc().min(u32::MAX as f64) as u32)
    } else {
        Ok(0)
    }
}

/// An identifier that may be stored as a number or a string.
pub(crate) fn opt_id<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(d)? {
        Some(Scalar::Number(n)) if n.fract() == 0.0 => Some(format!("{}", n as i64)),
        Some(Scalar::Number(n)) => Some(n.to_string()),
        Some(Scalar::Text(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

pub(crate) fn id<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_id(d)?.unwrap_or_default())
}

/// Treat `null` like a missing field.
pub(crate) fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// A date stored either as `YYYY-MM-DD` or as a full ISO timestamp; only the
/// calendar date is kept.
pub(crate) fn date<'de, D>(d: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(d)?;
    parse_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid date {raw:?}")))
}

/// As [`date`], with `null`, blanks and unparseable text read as `None`.
pub(crate) fn opt_date<'de, D>(d: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(d)?.and_then(|raw| parse_date(&raw)))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Fields {
        #[serde(default, deserialize_with = "super::number")]
        amount: f64,
        #[serde(default, deserialize_with = "super::count")]
        months: u32,
        #[serde(default, deserialize_with = "super::opt_id")]
        id: Option<String>,
        #[serde(default, deserialize_with = "super::or_default")]
        tags: Vec<String>,
        #[serde(default, deserialize_with = "super::opt_date")]
        on: Option<NaiveDate>,
    }

    fn fields(json: &str) -> Fields {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_numbers_from_strings_and_nulls() {
        assert_eq!(fields(r#"{"amount": "1234.50"}"#).amount, 1234.5);
        assert_eq!(fields(r#"{"amount": 99}"#).amount, 99.0);
        assert_eq!(fields(r#"{"amount": null}"#).amount, 0.0);
        assert_eq!(fields(r#"{"amount": "abc"}"#).amount, 0.0);
        assert_eq!(fields("{}").amount, 0.0);
    }

    #[test]
    fn test_counts_truncate_and_clamp() {
        assert_eq!(fields(r#"{"months": "12"}"#).months, 12);
        assert_eq!(fields(r#"{"months": 6.9}"#).months, 6);
        assert_eq!(fields(r#"{"months": -3}"#).months, 0);
    }

    #[test]
    fn test_ids_accept_numbers() {
        assert_eq!(fields(r#"{"id": 7}"#).id.as_deref(), Some("7"));
        assert_eq!(fields(r#"{"id": "LOAN012"}"#).id.as_deref(), Some("LOAN012"));
        assert_eq!(fields(r#"{"id": ""}"#).id, None);
        assert_eq!(fields(r#"{"id": null}"#).id, None);
    }

    #[test]
    fn test_null_array_is_empty() {
        assert!(fields(r#"{"tags": null}"#).tags.is_empty());
        assert_eq!(fields(r#"{"tags": ["a"]}"#).tags, vec!["a".to_string()]);
    }

    #[test]
    fn test_dates_accept_timestamps() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 10);
        assert_eq!(fields(r#"{"on": "2025-01-10"}"#).on, day);
        assert_eq!(fields(r#"{"on": "2025-01-10T06:30:00.000Z"}"#).on, day);
        assert_eq!(fields(r#"{"on": null}"#).on, None);
        assert_eq!(fields(r#"{"on": "soon"}"#).on, None);
    }
}
