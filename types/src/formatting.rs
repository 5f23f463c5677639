//! Centralized number formatting utilities.
//!
//! All numeric report rendering goes through this module so statistics,
//! guide entries and diagnostics read the same everywhere, with optional
//! European-style number formatting (swapping `.` and `,`).

/// Swap `.` and `,` in a formatted number.
fn europeanize(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '.' => result.push(','),
            ',' => result.push('.'),
            _ => result.push(c),
        }
    }
    result
}

#[inline]
fn maybe_eu(s: String, european: bool) -> String {
    if european { europeanize(&s) } else { s }
}

/// Format a large number with K/M suffix for compact display.
///
/// # Examples
/// ```
/// use linkcast_types::formatting::format_compact_f64;
/// assert_eq!(format_compact_f64(500.0, false), "500");
/// assert_eq!(format_compact_f64(1_500.0, false), "1.50K");
/// assert_eq!(format_compact_f64(1_500.0, true), "1,50K");
/// assert_eq!(format_compact_f64(-2_000_000.0, false), "-2.00M");
/// ```
pub fn format_compact_f64(n: f64, european: bool) -> String {
    let n_abs = n.abs();
    let s = if n_abs >= 1_000_000.0 {
        format!("{:.2}M", n / 1_000_000.0)
    } else if n_abs >= 1_000.0 {
        format!("{:.2}K", n / 1_000.0)
    } else {
        format!("{:.0}", n)
    };
    maybe_eu(s, european)
}

/// Format a percentage value with 1 decimal place.
///
/// # Examples
/// ```
/// use linkcast_types::formatting::format_pct;
/// assert_eq!(format_pct(42.7, false), "42.7%");
/// assert_eq!(format_pct(42.7, true), "42,7%");
/// ```
pub fn format_pct(n: f64, european: bool) -> String {
    maybe_eu(format!("{:.1}%", n), european)
}

/// Format a decimal number with the specified precision.
pub fn format_decimal(n: f64, precision: usize, european: bool) -> String {
    maybe_eu(format!("{:.prec$}", n, prec = precision), european)
}

/// Format a statistic value: whole numbers compact, fractions with two decimals.
pub fn format_value(n: f64, european: bool) -> String {
    if n.fract() == 0.0 || n.abs() >= 1_000.0 {
        format_compact_f64(n, european)
    } else {
        format_decimal(n, 2, european)
    }
}

/// Format a duration as `M:SS`.
pub fn format_duration(secs: i64) -> String {
    let mins = secs / 60;
    let secs = secs % 60;
    format!("{}:{:02}", mins, secs)
}

/// Format a replay timestamp relative to the fight start as `M:SS.mmm`.
///
/// Timestamps before the fight start are prefixed with `-`.
///
/// # Examples
/// ```
/// use linkcast_types::formatting::format_timestamp;
/// assert_eq!(format_timestamp(65_250, 0), "1:05.250");
/// assert_eq!(format_timestamp(10_000, 10_500), "-0:00.500");
/// ```
pub fn format_timestamp(timestamp: i64, fight_start: i64) -> String {
    let offset = timestamp - fight_start;
    let sign = if offset < 0 { "-" } else { "" };
    let offset = offset.abs();
    let millis = offset % 1_000;
    format!("{}{}.{:03}", sign, format_duration(offset / 1_000), millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact_f64(0.0, false), "0");
        assert_eq!(format_compact_f64(999.0, false), "999");
        assert_eq!(format_compact_f64(1_000.0, false), "1.00K");
        assert_eq!(format_compact_f64(15_000.0, true), "15,00K");
        assert_eq!(format_compact_f64(1_500_000.0, true), "1,50M");
    }

    #[test]
    fn test_format_pct() {
        assert_eq!(format_pct(30.0, false), "30.0%");
        assert_eq!(format_pct(30.0, true), "30,0%");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(12.0, false), "12");
        assert_eq!(format_value(2.5, false), "2.50");
        assert_eq!(format_value(2.5, true), "2,50");
        assert_eq!(format_value(48_250.0, false), "48.25K");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0, 0), "0:00.000");
        assert_eq!(format_timestamp(61_007, 1_000), "1:00.007");
        assert_eq!(format_timestamp(125_000, 0), "2:05.000");
        assert_eq!(format_timestamp(900, 1_000), "-0:00.100");
    }

    #[test]
    fn test_europeanize() {
        assert_eq!(europeanize("1.50K"), "1,50K");
        assert_eq!(europeanize("1,500,000"), "1.500.000");
        assert_eq!(europeanize("500"), "500");
    }
}
