//! Repository layer — entity-scoped database operations.
//!
//! Free functions over a borrowed `Connection`, one sub-module per entity.

mod appointment;
mod child;
mod interaction;
mod medication;
mod pharmacy;
mod reference;
mod symptom;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use super::DatabaseError;

pub use appointment::*;
pub use child::*;
pub use interaction::*;
pub use medication::*;
pub use pharmacy::*;
pub use reference::*;
pub use symptom::*;

/// Fixed-width UTC timestamps so that text comparison in SQL orders correctly.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad timestamp {raw:?}: {e}")))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad date {raw:?}: {e}")))
}

pub(crate) fn to_json_list(items: &[String]) -> Result<String, DatabaseError> {
    serde_json::to_string(items).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

pub(crate) fn from_json_list(raw: &str) -> Result<Vec<String>, DatabaseError> {
    serde_json::from_str(raw)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad list column {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn timestamps_sort_lexicographically() {
        let early = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let late = early + chrono::Duration::milliseconds(1);
        assert!(format_timestamp(&early) < format_timestamp(&late));
        assert_eq!(parse_timestamp(&format_timestamp(&late)).unwrap(), late);
    }

    #[test]
    fn malformed_json_list_is_error() {
        assert!(matches!(
            from_json_list("not json"),
            Err(DatabaseError::ConstraintViolation(_))
        ));
        assert_eq!(from_json_list(r#"["a","b"]"#).unwrap(), vec!["a", "b"]);
    }
}
