use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcDateTime};

/// Parses a timestamp as found in remote payloads and stored rows.
///
/// Accepts RFC 3339 (`2024-11-29T14:47:00Z`, any offset) or a bare calendar
/// date (`2024-11-29`, taken as midnight UTC). Anything else is treated as
/// absent.
pub fn parse_timestamp(value: &str) -> Option<UtcDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(timestamp) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(timestamp.to_utc());
    }
    parse_date(value).map(|date| date.midnight().as_utc())
}

/// Parses an ISO-8601 calendar date (`YYYY-MM-DD`).
pub fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// Formats a timestamp as RFC 3339, the inverse of [`parse_timestamp`].
pub fn format_timestamp(timestamp: UtcDateTime) -> String {
    // Every UtcDateTime within the supported year range is representable.
    timestamp.format(&Rfc3339).unwrap_or_default()
}
