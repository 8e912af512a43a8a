//! Reusable formatting utilities for CLI output
//!
//! Prices, compact dollar amounts, percentages and timestamps.

use std::time::Duration;

use chrono::{TimeZone, Utc};

/// Insert thousands separators into the integer part of a decimal string
fn group_thousands(formatted: &str) -> String {
    let (sign, rest) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Format a USD price.
///
/// Sub-cent prices with more than three leading zeros use a compact
/// notation: `0.0000001234` renders as `$0.0{6}1234`.
pub fn format_price(price: f64) -> String {
    if price == 0.0 || !price.is_finite() {
        return "$0".to_string();
    }
    if price < 0.0 {
        return format!("-{}", format_price(-price));
    }

    if price < 1.0 {
        let wide = format!("{:.20}", price);
        let leading_zeros = wide[2..].chars().take_while(|c| *c == '0').count();
        if leading_zeros > 3 {
            let digits = format!("{:.*}", leading_zeros + 4, price);
            let significant = digits
                .get(2 + leading_zeros..)
                .unwrap_or_default()
                .trim_end_matches('0');
            // Empty when rounding carried into the zero run; use plain notation then
            if !significant.is_empty() {
                return format!("$0.0{{{}}}{}", leading_zeros, significant);
            }
        }

        let fixed = format!("{:.8}", price);
        let trimmed = fixed.trim_end_matches('0');
        let decimals = trimmed.split_once('.').map_or(0, |(_, f)| f.len());
        return if decimals < 2 {
            format!("${:.2}", price)
        } else {
            format!("${}", trimmed)
        };
    }

    format!("${}", group_thousands(&format!("{:.2}", price)))
}

/// Format a large dollar amount with a T/B/M/K suffix
pub fn format_usd_compact(value: f64) -> String {
    format!("${}", format_compact(value))
}

/// Format a large number with a T/B/M/K suffix
pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1e12 {
        (value / 1e12, "T")
    } else if abs >= 1e9 {
        (value / 1e9, "B")
    } else if abs >= 1e6 {
        (value / 1e6, "M")
    } else if abs >= 1e3 {
        (value / 1e3, "K")
    } else {
        (value, "")
    };
    format!("{:.2}{}", scaled, suffix)
}

/// Format an integer count with thousands separators
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Format a percentage change with an explicit sign
pub fn format_percent(value: f64) -> String {
    format!("{:+.2}%", value)
}

/// Format an epoch-millisecond timestamp as UTC.
///
/// Returns "N/A" for out-of-range values.
pub fn format_timestamp_ms(millis: i64) -> String {
    match Utc.timestamp_millis_opt(millis) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        _ => "N/A".to_string(),
    }
}

/// Format a duration as hours and minutes (`4h 0m`), or seconds when short
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        return format!("{}s", secs);
    }
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

/// Human description of how far `target_ms` is from `now_ms`
pub fn format_relative_ms(target_ms: i64, now_ms: i64) -> String {
    let delta = target_ms - now_ms;
    let span = format_duration(Duration::from_millis(delta.unsigned_abs()));
    if delta >= 0 {
        format!("in {}", span)
    } else {
        format!("{} ago", span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price_regular() {
        assert_eq!(format_price(0.0), "$0");
        assert_eq!(format_price(3000.0), "$3,000.00");
        assert_eq!(format_price(67_123.5), "$67,123.50");
        assert_eq!(format_price(1.5), "$1.50");
    }

    #[test]
    fn test_format_price_sub_dollar() {
        assert_eq!(format_price(0.5), "$0.50");
        assert_eq!(format_price(0.123456), "$0.123456");
        assert_eq!(format_price(0.00123), "$0.00123");
    }

    #[test]
    fn test_format_price_many_zeros() {
        assert_eq!(format_price(0.00001234), "$0.0{4}1234");
        assert_eq!(format_price(0.0000001), "$0.0{6}1");
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_usd_compact(360_000_000_000.0), "$360.00B");
        assert_eq!(format_usd_compact(1_500_000_000_000.0), "$1.50T");
        assert_eq!(format_compact(12_500.0), "12.50K");
        assert_eq!(format_compact(999.0), "999.00");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(1.234), "+1.23%");
        assert_eq!(format_percent(-0.5), "-0.50%");
    }

    #[test]
    fn test_format_timestamp_ms() {
        assert_eq!(format_timestamp_ms(0), "1970-01-01 00:00:00 UTC");
        assert_eq!(format_timestamp_ms(1_700_000_000_000), "2023-11-14 22:13:20 UTC");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m");
        assert_eq!(format_duration(Duration::from_millis(14_400_000)), "4h 0m");
    }

    #[test]
    fn test_format_relative() {
        assert_eq!(format_relative_ms(3_600_000, 0), "in 1h 0m");
        assert_eq!(format_relative_ms(0, 120_000), "2m ago");
    }
}
