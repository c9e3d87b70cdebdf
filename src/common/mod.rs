//! Stateless helper functions shared across the application.

use std::sync::LazyLock;

use rand::{Rng, distributions::Alphanumeric};
use regex::Regex;
use serde::{Serialize, de::DeserializeOwned};

const BYTE_UNITS: &[&str] = &["Bytes", "KB", "MB", "GB", "TB"];

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Generate a random alphanumeric identifier of exactly `length` characters.
pub fn generate_id(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Format a byte count as a human-readable size with binary (1024-based)
/// units and two decimal places, trailing zeros trimmed.
///
/// ```
/// use armature::common::format_bytes;
///
/// assert_eq!(format_bytes(0), "0 Bytes");
/// assert_eq!(format_bytes(1024), "1 KB");
/// assert_eq!(format_bytes(1536), "1.5 KB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    format_bytes_with(bytes, 2)
}

/// [`format_bytes`] with an explicit number of decimal places.
pub fn format_bytes_with(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let exponent = ((bytes.ilog2() / 10) as usize).min(BYTE_UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let rendered = format!("{value:.decimals$}");
    let trimmed = if rendered.contains('.') {
        rendered.trim_end_matches('0').trim_end_matches('.')
    } else {
        rendered.as_str()
    };

    format!("{trimmed} {}", BYTE_UNITS[exponent])
}

/// Parse a JSON string, returning `default` on any failure. Never panics.
pub fn safe_json_parse<T: DeserializeOwned>(input: &str, default: T) -> T {
    serde_json::from_str(input).unwrap_or(default)
}

/// Clone a value through a serialization round-trip, producing a fully
/// independent copy.
pub fn deep_clone<T: Serialize + DeserializeOwned>(value: &T) -> serde_json::Result<T> {
    serde_json::from_value(serde_json::to_value(value)?)
}

/// Shape check for email addresses: non-empty local part, `@`, non-empty
/// domain with at least one dot. Not a deliverability check.
pub fn is_valid_email(input: &str) -> bool {
    EMAIL_SHAPE.is_match(input)
}

/// Resident set size of the current process in bytes, read from
/// `/proc/self/status`. `None` when unavailable.
#[cfg(target_os = "linux")]
pub fn process_memory_rss() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            let kb = rest.split_whitespace().next()?.parse::<u64>().ok()?;
            return Some(kb * 1024);
        }
    }
    None
}

#[cfg(not(target_os = "linux"))]
pub fn process_memory_rss() -> Option<u64> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_id_has_exact_length() {
        for length in [0, 1, 12, 64] {
            assert_eq!(generate_id(length).len(), length);
        }
    }

    #[test]
    fn generate_id_is_alphanumeric() {
        let id = generate_id(256);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn format_bytes_zero_is_special_cased() {
        assert_eq!(format_bytes(0), "0 Bytes");
    }

    #[test]
    fn format_bytes_uses_binary_units() {
        assert_eq!(format_bytes(1), "1 Bytes");
        assert_eq!(format_bytes(1023), "1023 Bytes");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1024 * 1024), "1 MB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1 GB");
    }

    #[test]
    fn format_bytes_respects_decimals() {
        assert_eq!(format_bytes_with(1536, 0), "2 KB");
        assert_eq!(format_bytes_with(1234, 3), "1.205 KB");
    }

    #[test]
    fn safe_json_parse_returns_default_on_invalid_input() {
        let fallback = serde_json::json!({"default": true});
        let parsed = safe_json_parse("not json", fallback.clone());
        assert_eq!(parsed, fallback);
    }

    #[test]
    fn safe_json_parse_parses_valid_input() {
        let parsed: serde_json::Value = safe_json_parse(r#"{"key":"value"}"#, serde_json::Value::Null);
        assert_eq!(parsed["key"], "value");
    }

    #[test]
    fn deep_clone_produces_independent_copy() {
        let original = serde_json::json!({"a": 1, "b": {"c": 2}});
        let mut cloned = deep_clone(&original).unwrap();

        cloned["b"]["c"] = serde_json::json!(3);

        assert_eq!(original["b"]["c"], 2);
        assert_eq!(cloned["b"]["c"], 3);
    }

    #[test]
    fn email_shape_validation() {
        assert!(is_valid_email("test@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
        assert!(!is_valid_email("invalid-email"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("spaces in@local.part"));
        assert!(!is_valid_email("no-domain@host"));
    }
}
