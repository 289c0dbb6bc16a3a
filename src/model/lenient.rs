//! Forgiving field readers for hand-edited or older data files. A single bad
//! value degrades to a sane default instead of failing the whole document.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;

/// Try parsing a date string with the formats seen in hand-edited files.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    // Accept full timestamps by keeping the date part.
    let s = s
        .get(..10)
        .filter(|_| s.len() > 10 && matches!(s.as_bytes()[10], b'T' | b' '))
        .unwrap_or(s);
    for fmt in &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d.%m.%Y", "%d-%m-%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Parse an RFC 3339 timestamp, a local `YYYY-MM-DD HH:MM[:SS]`, or the
/// year-less `dd/mm HH:MM` form. The year-less form takes the year of `now`,
/// or the year before when that would put it in the future.
pub fn parse_timestamp(s: &str, now: DateTime<Local>) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    let local = |naive: NaiveDateTime| {
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|ts| ts.with_timezone(&Utc))
    };
    for fmt in &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return local(naive);
        }
    }

    let year = now.year();
    let naive = NaiveDateTime::parse_from_str(&format!("{year}/{s}"), "%Y/%d/%m %H:%M").ok()?;
    if naive > now.naive_local() + chrono::Duration::days(1) {
        return local(naive.with_year(year - 1)?);
    }
    local(naive)
}

/// Dates are written as `YYYY-MM-DD`; anything unreadable becomes `None`.
pub mod date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(raw.as_str().and_then(super::parse_date))
    }
}

/// Percent complete from any JSON number or numeric string, rounded and
/// clamped to 0..=100. Anything else reads as 0.
pub fn progress<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let value = match &raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    };
    Ok(value.map_or(0, |v| v.clamp(0.0, 100.0).round() as u8))
}

/// A record id. An id that is not a UUID is replaced by a fresh one.
pub fn id<'de, D>(deserializer: D) -> Result<Uuid, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(raw
        .as_str()
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
        .unwrap_or_else(Uuid::new_v4))
}

/// An activity timestamp; see [`parse_timestamp`]. Unreadable values fall
/// back to the Unix epoch so the entry keeps its place in the history.
pub fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(raw
        .as_str()
        .and_then(|s| parse_timestamp(s, Local::now()))
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Record {
        #[serde(default, deserialize_with = "progress")]
        progress: u8,
        #[serde(default = "Uuid::new_v4", deserialize_with = "id")]
        id: Uuid,
    }

    fn read(json: &str) -> Record {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn progress_is_clamped_and_rounded() {
        assert_eq!(read(r#"{"progress": 300}"#).progress, 100);
        assert_eq!(read(r#"{"progress": -20}"#).progress, 0);
        assert_eq!(read(r#"{"progress": 49.6}"#).progress, 50);
        assert_eq!(read(r#"{"progress": "75%"}"#).progress, 75);
        assert_eq!(read(r#"{"progress": null}"#).progress, 0);
        assert_eq!(read(r#"{}"#).progress, 0);
    }

    #[test]
    fn unparsable_id_gets_a_fresh_uuid() {
        let kept = "2f0c6f47-7a33-4c55-a2a4-3a4c2f0f6a11";
        assert_eq!(read(&format!(r#"{{"id": "{kept}"}}"#)).id.to_string(), kept);
        assert!(!read(r#"{"id": "task-7"}"#).id.is_nil());
        assert!(!read(r#"{"id": 42}"#).id.is_nil());
    }

    #[test]
    fn date_accepts_common_formats() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5);
        assert_eq!(parse_date("2024-03-05"), d);
        assert_eq!(parse_date("05/03/2024"), d);
        assert_eq!(parse_date("2024-03-05T08:00:00"), d);
        assert_eq!(parse_date("2024-03-05 08:00:00"), d);
        assert_eq!(parse_date("soon"), None);
    }

    #[test]
    fn yearless_timestamp_takes_the_current_year() {
        let now = Local.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let ts = parse_timestamp("03/06 09:30", now).unwrap().with_timezone(&Local);
        assert_eq!((ts.year(), ts.month(), ts.day()), (2024, 6, 3));
        assert_eq!(ts.format("%H:%M").to_string(), "09:30");
    }

    #[test]
    fn yearless_timestamp_in_the_future_belongs_to_last_year() {
        let now = Local.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap();
        let ts = parse_timestamp("28/12 17:00", now).unwrap().with_timezone(&Local);
        assert_eq!((ts.year(), ts.month(), ts.day()), (2023, 12, 28));
    }

    #[test]
    fn rfc3339_timestamp_is_read_as_is() {
        let now = Local::now();
        let ts = parse_timestamp("2024-04-01T10:00:00Z", now).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 4, 1, 10, 0, 0).unwrap());
        assert_eq!(parse_timestamp("yesterday", now), None);
    }
}
