//! Field Validation
//!
//! Checks applied to user-supplied fields before any store work starts.

use chrono::{DateTime, NaiveDateTime, Utc};

use super::entity::{DomainError, DomainResult};

/// Names must be non-empty and no longer than `max_len` characters
///
/// The limit counts chars, not UTF-8 bytes, so a 32-char Cyrillic name
/// passes a limit of 32 although it takes 64 bytes.
pub fn validate_name(name: &str, max_len: usize) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidInput("empty name".to_string()));
    }
    if name.chars().count() > max_len {
        return Err(DomainError::InvalidInput(format!(
            "name longer than {} characters",
            max_len
        )));
    }
    Ok(())
}

/// Parse a due time written in `format` (interpreted as UTC)
///
/// Empty input clears the due time. A moment before `now` is rejected.
pub fn parse_due_time(
    raw: Option<&str>,
    format: &str,
    now: DateTime<Utc>,
) -> DomainResult<Option<DateTime<Utc>>> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    let due = NaiveDateTime::parse_from_str(raw, format)
        .map_err(|_| DomainError::InvalidInput(format!("incorrect time format: {}", raw)))?
        .and_utc();

    if due < now {
        return Err(DomainError::InvalidInput(format!("due time {} is in the past", raw)));
    }
    Ok(Some(due))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const FORMAT: &str = "%Y-%m-%d %H:%M";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_name_rules() {
        assert!(validate_name("List of products", 32).is_ok());
        assert!(matches!(validate_name("", 32), Err(DomainError::InvalidInput(_))));
        assert!(matches!(validate_name("   ", 32), Err(DomainError::InvalidInput(_))));
        let long = "a very complicated and long name for the list";
        assert!(matches!(validate_name(long, 32), Err(DomainError::InvalidInput(_))));
        // counted in characters, not bytes
        assert!(validate_name(&"ж".repeat(32), 32).is_ok());
    }

    #[test]
    fn test_due_time_parsing() {
        let due = parse_due_time(Some("2077-12-10 13:13"), FORMAT, now()).unwrap();
        assert_eq!(due, Some(Utc.with_ymd_and_hms(2077, 12, 10, 13, 13, 0).unwrap()));
    }

    #[test]
    fn test_due_time_empty_clears() {
        assert_eq!(parse_due_time(None, FORMAT, now()).unwrap(), None);
        assert_eq!(parse_due_time(Some(""), FORMAT, now()).unwrap(), None);
    }

    #[test]
    fn test_due_time_rejects_bad_format_and_past() {
        assert!(matches!(
            parse_due_time(Some("10.12.2077"), FORMAT, now()),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_due_time(Some("2020-01-01 00:00"), FORMAT, now()),
            Err(DomainError::InvalidInput(_))
        ));
    }
}
