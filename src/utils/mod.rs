//! Shared helpers: the error type, logging setup and console formatting

pub mod error;
pub mod logging;

pub use error::{BenchError, Result};
pub use logging::{init_logging, LogConfig};

/// Render seconds for log lines: `12.500ms`, `30.5s`, `1m 30s`, `1h 1m`
pub fn format_duration(seconds: f64) -> String {
    let whole = seconds as u64;
    match whole {
        0 => format!("{:.3}ms", seconds * 1000.0),
        1..=59 => format!("{:.1}s", seconds),
        60..=3599 => format!("{}m {}s", whole / 60, whole % 60),
        _ => format!("{}h {}m", whole / 3600, whole % 3600 / 60),
    }
}

/// Group digits in threes: `60000` -> `60,000`
pub fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let head = digits.len() % 3;

    let mut groups: Vec<&str> = Vec::new();
    if head > 0 {
        groups.push(&digits[..head]);
    }
    groups.extend(
        digits.as_bytes()[head..]
            .chunks(3)
            .filter_map(|chunk| std::str::from_utf8(chunk).ok()),
    );
    groups.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durations() {
        assert_eq!(format_duration(0.0125), "12.500ms");
        assert_eq!(format_duration(30.5), "30.5s");
        assert_eq!(format_duration(90.0), "1m 30s");
        assert_eq!(format_duration(3661.0), "1h 1m");
    }

    #[test]
    fn test_digit_groups() {
        assert_eq!(format_number(10_000), "10,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(0), "0");
    }
}
