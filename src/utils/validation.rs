use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result};

pub fn validate<T: Validate>(val: &T) -> Result<()> {
    val.validate()?;
    Ok(())
}

/// Parses a path or form id, reporting malformed input as a 400.
pub fn parse_id(raw: &str, resource: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::BadRequest(format!("Invalid {} id", resource)))
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn require_non_blank(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::BadRequest(message.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_id_names_the_resource() {
        let err = parse_id("not-a-uuid", "project").unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg == "Invalid project id"));
    }

    #[test]
    fn plain_dates_parse_as_utc_midnight() {
        let dt = parse_datetime("2030-05-01").unwrap();
        assert_eq!(dt.to_rfc3339(), "2030-05-01T00:00:00+00:00");
        assert!(parse_datetime("2030-05-01T10:00:00+02:00").is_some());
        assert!(parse_datetime("tomorrow").is_none());
    }
}
