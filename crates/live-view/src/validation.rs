//! Input Validation
//!
//! Checks applied to form input before any write is issued.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

use crate::domain::{LiveResult, LiveViewError};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Trimmed label text. Blank labels are rejected.
pub fn normalize_label(raw: &str) -> LiveResult<String> {
    let label = raw.trim();
    if label.is_empty() {
        return Err(LiveViewError::Validation("label is empty".to_string()));
    }
    Ok(label.to_string())
}

/// Trimmed task title. Blank titles are rejected.
pub fn validate_title(raw: &str) -> LiveResult<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(LiveViewError::Validation("title is required".to_string()));
    }
    Ok(title.to_string())
}

/// Due date from a form field, local time zone
pub fn parse_due_date(raw: &str) -> LiveResult<Option<DateTime<Utc>>> {
    parse_due_date_in(raw, &Local)
}

/// Blank clears the due date. Accepts RFC 3339 or a plain `YYYY-MM-DD`,
/// which means midnight of that day in `tz`.
pub fn parse_due_date_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> LiveResult<Option<DateTime<Utc>>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    let day = NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| LiveViewError::Validation(format!("due date {:?}: {}", raw, e)))?;
    let midnight = day
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .ok_or_else(|| LiveViewError::Validation(format!("due date {:?} has no local midnight", raw)))?;
    Ok(Some(midnight.with_timezone(&Utc)))
}

/// Day picker value of the activity log. Blank means "any day".
pub fn parse_history_date(raw: &str) -> LiveResult<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|e| LiveViewError::Validation(format!("date {:?}: {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_labels_are_trimmed() {
        assert_eq!(normalize_label("  gudang ").unwrap(), "gudang");
        assert!(normalize_label("   ").is_err());
    }

    #[test]
    fn test_title_required() {
        assert_eq!(validate_title(" Setor kas ").unwrap(), "Setor kas");
        assert!(matches!(validate_title(""), Err(LiveViewError::Validation(_))));
    }

    #[test]
    fn test_due_date_formats() {
        let wib = FixedOffset::east_opt(7 * 3600).unwrap();
        let plain = parse_due_date_in("2024-05-02", &wib).unwrap().unwrap();
        assert_eq!(plain.to_rfc3339(), "2024-05-01T17:00:00+00:00");

        let full = parse_due_date_in("2024-05-01T17:00:00.000Z", &wib).unwrap().unwrap();
        assert_eq!(full, plain);

        assert_eq!(parse_due_date("").unwrap(), None);
        assert!(parse_due_date("besok").is_err());
    }

    #[test]
    fn test_history_date() {
        assert_eq!(
            parse_history_date("2024-05-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
        assert_eq!(parse_history_date(" ").unwrap(), None);
        assert!(parse_history_date("01/05/2024").is_err());
    }
}
