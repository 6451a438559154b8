use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use strum::IntoEnumIterator;

use crate::error::StoreError;
use crate::model::attendance::AttendanceStatus;

/// Permissive `local@domain.tld` shape, not RFC 5322.
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$").expect("email regex compiles")
});

const DATE_FORMAT: &str = "%Y-%m-%d";

#[inline]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Returns the trimmed value, or a validation error naming `field` when blank.
pub fn required(field: &'static str, value: &str) -> Result<String, StoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::validation(field, format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Rejects values longer than `max` characters, the width of the backing column.
pub fn within(field: &'static str, value: String, max: usize) -> Result<String, StoreError> {
    if value.chars().count() > max {
        return Err(StoreError::validation(
            field,
            format!("{field} must be at most {max} characters"),
        ));
    }
    Ok(value)
}

/// Blank query parameters are treated as absent.
pub fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        StoreError::validation(
            field,
            format!("{field} must be a valid calendar date (YYYY-MM-DD)"),
        )
    })
}

pub fn parse_optional_date(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, StoreError> {
    optional(value).map(|v| parse_date(field, &v)).transpose()
}

pub fn parse_status(value: &str) -> Result<AttendanceStatus, StoreError> {
    value.trim().parse().map_err(|_| {
        let allowed = AttendanceStatus::iter()
            .map(|s| format!("'{s}'"))
            .collect::<Vec<_>>()
            .join(" or ");
        StoreError::validation("status", format!("status must be {allowed}"))
    })
}
