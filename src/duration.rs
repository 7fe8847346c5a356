//! Duration parsing for command-line flags.

use std::time::Duration;

/// Parse a duration string like "500ms", "10s", "5m", "1h" or "300".
///
/// Supports:
/// - Plain numbers (interpreted as seconds): "300"
/// - Milliseconds suffix: "500ms"
/// - Seconds suffix: "300s"
/// - Minutes suffix: "30m"
/// - Hours suffix: "1h"
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // "ms" before "m" and "s".
    if let Some(num_str) = s.strip_suffix("ms") {
        return parse_count(num_str, "milliseconds").map(Duration::from_millis);
    }
    if let Some(num_str) = s.strip_suffix('h') {
        return parse_scaled(num_str, "hours", 3600);
    }
    if let Some(num_str) = s.strip_suffix('m') {
        return parse_scaled(num_str, "minutes", 60);
    }
    if let Some(num_str) = s.strip_suffix('s') {
        return parse_count(num_str, "seconds").map(Duration::from_secs);
    }

    parse_count(s, "duration").map(Duration::from_secs)
}

fn parse_scaled(num_str: &str, unit: &str, secs_per_unit: u64) -> Result<Duration, String> {
    parse_count(num_str, unit)?
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("{unit} value out of range: {num_str}"))
}

fn parse_count(num_str: &str, unit: &str) -> Result<u64, String> {
    num_str
        .parse::<u64>()
        .map_err(|_| format!("invalid {unit} value: {num_str}"))
}
