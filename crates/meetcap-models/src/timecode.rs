//! Timecode formatting and parsing.
//!
//! Converts seconds to and from the textual time forms needed by subtitle
//! files (`HH:MM:SS,mmm`) and reports (`HH:MM:SS`, readable durations).

use thiserror::Error;

/// Format seconds as `HH:MM:SS`.
///
/// # Examples
/// ```
/// use meetcap_models::timecode::format_hms;
/// assert_eq!(format_hms(90.0), "00:01:30");
/// assert_eq!(format_hms(3661.5), "01:01:01");
/// ```
pub fn format_hms(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// Format seconds as `HH:MM:SS.mmm`.
pub fn format_hms_ms(seconds: f64) -> String {
    let (h, m, s, ms) = split_ms(seconds);
    format!("{:02}:{:02}:{:02}.{:03}", h, m, s, ms)
}

/// Format seconds in the SubRip timestamp form `HH:MM:SS,mmm`.
///
/// # Examples
/// ```
/// use meetcap_models::timecode::format_srt;
/// assert_eq!(format_srt(3661.5), "01:01:01,500");
/// ```
pub fn format_srt(seconds: f64) -> String {
    let (h, m, s, ms) = split_ms(seconds);
    format!("{:02}:{:02}:{:02},{:03}", h, m, s, ms)
}

/// Format seconds as a readable duration, e.g. `"1 minute 30 seconds"`.
pub fn format_readable(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(plural(hours, "hour"));
    }
    if minutes > 0 {
        parts.push(plural(minutes, "minute"));
    }
    if secs > 0 || parts.is_empty() {
        parts.push(plural(secs, "second"));
    }
    parts.join(" ")
}

/// Parse `HH:MM:SS` or `HH:MM:SS.mmm` back to seconds.
///
/// # Examples
/// ```
/// use meetcap_models::timecode::parse_hms;
/// assert_eq!(parse_hms("00:01:30").unwrap(), 90.0);
/// assert_eq!(parse_hms("01:01:01.500").unwrap(), 3661.5);
/// ```
pub fn parse_hms(value: &str) -> Result<f64, TimecodeError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TimecodeError::Empty);
    }

    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() != 3 {
        return Err(TimecodeError::InvalidFormat(value.to_string()));
    }

    let hours: f64 = parse_component(parts[0], "hours")?;
    let minutes: f64 = parse_component(parts[1], "minutes")?;
    let seconds: f64 = parse_component(parts[2], "seconds")?;

    if hours < 0.0 || minutes < 0.0 || seconds < 0.0 {
        return Err(TimecodeError::Negative);
    }

    Ok(hours * 3600.0 + minutes * 60.0 + seconds)
}

fn parse_component(raw: &str, component: &'static str) -> Result<f64, TimecodeError> {
    raw.parse()
        .map_err(|_| TimecodeError::InvalidValue(component, raw.to_string()))
}

fn split_ms(seconds: f64) -> (u64, u64, u64, u64) {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total = total_ms / 1000;
    (total / 3600, (total % 3600) / 60, total % 60, ms)
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

/// Timecode parsing error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimecodeError {
    #[error("timecode cannot be empty")]
    Empty,

    #[error("timecode cannot be negative")]
    Negative,

    #[error("invalid {0} value: {1}")]
    InvalidValue(&'static str, String),

    #[error("invalid timecode format '{0}'. Use HH:MM:SS or HH:MM:SS.mmm")]
    InvalidFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0.0), "00:00:00");
        assert_eq!(format_hms(90.0), "00:01:30");
        assert_eq!(format_hms(3661.0), "01:01:01");
    }

    #[test]
    fn test_format_hms_ms() {
        assert_eq!(format_hms_ms(90.5), "00:01:30.500");
        assert_eq!(format_hms_ms(3661.123), "01:01:01.123");
    }

    #[test]
    fn test_format_srt_uses_comma_separator() {
        assert_eq!(format_srt(0.0), "00:00:00,000");
        assert_eq!(format_srt(2.0), "00:00:02,000");
        assert_eq!(format_srt(3661.5), "01:01:01,500");
    }

    #[test]
    fn test_format_readable() {
        assert_eq!(format_readable(0.0), "0 seconds");
        assert_eq!(format_readable(90.0), "1 minute 30 seconds");
        assert_eq!(format_readable(3600.0), "1 hour");
        assert_eq!(format_readable(3661.0), "1 hour 1 minute 1 second");
    }

    #[test]
    fn test_parse_hms_roundtrip() {
        assert_eq!(parse_hms("00:00:00").unwrap(), 0.0);
        assert_eq!(parse_hms("00:01:30").unwrap(), 90.0);
        assert!((parse_hms("01:01:01.500").unwrap() - 3661.5).abs() < 0.001);
    }

    #[test]
    fn test_parse_hms_errors() {
        assert!(matches!(parse_hms(""), Err(TimecodeError::Empty)));
        assert!(matches!(parse_hms("1:2"), Err(TimecodeError::InvalidFormat(_))));
        assert!(matches!(
            parse_hms("aa:00:00"),
            Err(TimecodeError::InvalidValue("hours", _))
        ));
    }

    #[test]
    fn test_srt_format_parse_agree() {
        for &secs in &[0.0, 1.25, 59.999, 61.0, 3599.5, 7261.75] {
            let formatted = format_hms_ms(secs);
            let parsed = parse_hms(&formatted).unwrap();
            assert!((parsed - secs).abs() < 0.002, "{} -> {}", secs, formatted);
        }
    }
}
