//! # Utility Functions
//!
//! Formatting and normalization helpers shared by the stores and by views.
//!
//! ## Core Utilities
//!
//! - **Sizes and Dates**: Human-readable byte counts and timestamps
//! - **Text Normalization**: Blank-to-`None` handling for optional text fields
//! - **File Names**: Sanitized and generated names for saved downloads
//! - **Messages**: Extracting a displayable message from a failure
//!
//! ## Example Usage
//!
//! ```rust
//! use mycloud_client::utils::{format_bytes, normalize_nullable_text};
//!
//! assert_eq!(format_bytes(1536.0), "1.5 KB");
//! assert_eq!(normalize_nullable_text(Some("  ")), None);
//! ```

use chrono::{DateTime, Local, Utc};

use crate::errors::ApiError;
use crate::models::UserLevel;

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Placeholder shown for missing or unparseable dates.
pub const MISSING_DATE: &str = "—";

/// Converts a byte count to a human-readable string.
///
/// Whole bytes are shown without decimals; every larger unit uses one
/// decimal place. Negative or non-finite input renders as `-`.
///
/// # Example
///
/// ```rust
/// use mycloud_client::utils::format_bytes;
///
/// assert_eq!(format_bytes(0.0), "0 B");
/// assert_eq!(format_bytes(1024.0), "1.0 KB");
/// assert_eq!(format_bytes(-1.0), "-");
/// ```
pub fn format_bytes(bytes: f64) -> String {
    if !bytes.is_finite() || bytes < 0.0 {
        return "-".to_string();
    }

    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", value.round(), BYTE_UNITS[unit])
    } else {
        format!("{:.1} {}", value, BYTE_UNITS[unit])
    }
}

/// Formats an ISO-8601 timestamp in local time, or `—` when absent or invalid.
pub fn format_date(iso: Option<&str>) -> String {
    iso.and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| format_timestamp(Some(parsed.with_timezone(&Utc))))
        .unwrap_or_else(|| MISSING_DATE.to_string())
}

pub fn format_timestamp(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        None => MISSING_DATE.to_string(),
    }
}

/// Trims `value`; blank or missing text becomes `None`.
pub fn normalize_nullable_text(value: Option<&str>) -> Option<String> {
    let trimmed = value.unwrap_or_default().trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn humanize_level(level: UserLevel) -> &'static str {
    match level {
        UserLevel::User => "User",
        UserLevel::Admin => "Admin",
        UserLevel::SeniorAdmin => "Senior admin",
        UserLevel::Superuser => "Superuser",
    }
}

/// Builds `{name}_{YYYYMMDD}_{HHMMSS}` from the current local time.
pub fn build_name_with_date_time(name: &str) -> String {
    format!("{}_{}", name, Local::now().format("%Y%m%d_%H%M%S"))
}

/// Sanitizes a filename so it can be written into a download directory.
///
/// Path separators and characters that are invalid on common filesystems
/// are removed; the result is at most 255 characters. `None` if nothing
/// usable remains.
pub fn sanitize_filename(filename: &str) -> Option<String> {
    let safe: String = filename
        .trim()
        .chars()
        .filter(|c| !"/\\:*?\"<>|".contains(*c) && !c.is_control())
        .take(255)
        .collect();

    let safe = safe.trim().trim_start_matches('.').to_string();
    (!safe.is_empty()).then_some(safe)
}

/// Displayable message for a failure: the backend's non-blank `detail`, or `fallback`.
pub fn error_to_message(error: &ApiError, fallback: &str) -> String {
    let detail = error.classify(fallback).detail;
    if detail.trim().is_empty() {
        fallback.to_string()
    } else {
        detail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::json;

    #[test]
    fn format_bytes_boundaries() {
        assert_eq!(format_bytes(0.0), "0 B");
        assert_eq!(format_bytes(1023.0), "1023 B");
        assert_eq!(format_bytes(1024.0), "1.0 KB");
        assert_eq!(format_bytes(1536.0), "1.5 KB");
        assert_eq!(format_bytes(1024.0 * 1024.0), "1.0 MB");
        assert_eq!(format_bytes(5.0 * 1024f64.powi(5)), "5120.0 TB");
    }

    #[test]
    fn format_bytes_rejects_invalid_input() {
        assert_eq!(format_bytes(-1.0), "-");
        assert_eq!(format_bytes(f64::NAN), "-");
        assert_eq!(format_bytes(f64::INFINITY), "-");
    }

    #[test]
    fn format_date_placeholder() {
        assert_eq!(format_date(None), "—");
        assert_eq!(format_date(Some("yesterday")), "—");
        assert_ne!(format_date(Some("2024-01-01T00:00:00+00:00")), "—");
    }

    #[test]
    fn normalize_blank_text() {
        assert_eq!(normalize_nullable_text(Some("  hi ")), Some("hi".to_string()));
        assert_eq!(normalize_nullable_text(Some("   ")), None);
        assert_eq!(normalize_nullable_text(None), None);
    }

    #[test]
    fn sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("../etc/passwd").as_deref(), Some("etcpasswd"));
        assert_eq!(sanitize_filename("report: Q1?.pdf").as_deref(), Some("report Q1.pdf"));
        assert_eq!(sanitize_filename("///"), None);
    }

    #[test]
    fn generated_name_has_timestamp_suffix() {
        let name = build_name_with_date_time("downloaded");
        assert!(name.starts_with("downloaded_"));
        assert_eq!(name.len(), "downloaded_".len() + 15);
    }

    #[test]
    fn error_message_prefers_non_blank_detail() {
        let with_detail = ApiError::Status {
            status: StatusCode::NOT_FOUND,
            body: Some(json!({"detail": "File not found"})),
        };
        let blank = ApiError::Status {
            status: StatusCode::NOT_FOUND,
            body: Some(json!({"detail": "  "})),
        };
        assert_eq!(error_to_message(&with_detail, "Failed"), "File not found");
        assert_eq!(error_to_message(&blank, "Failed"), "Failed");
    }

    #[test]
    fn humanized_levels() {
        assert_eq!(humanize_level(UserLevel::SeniorAdmin), "Senior admin");
    }
}
