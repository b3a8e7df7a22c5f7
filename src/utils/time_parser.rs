//! 过期时间解析
//!
//! 支持的格式：
//! - RFC3339：2026-10-01T12:00:00Z
//! - 日期：2026-10-01（按 UTC 零点）
//! - 相对时间：30m, 1d, 2w, 1y, 1d12h

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// 解析过期时间，相对时间以 `now` 为基准
pub fn parse_expiration(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, String> {
    let input = input.trim();

    if input.is_empty() {
        return Err("Expiration date cannot be empty".to_string());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        && let Some(midnight) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(midnight.and_utc());
    }

    let duration = parse_relative(input)?;
    now.checked_add_signed(duration)
        .ok_or_else(|| format!("Expiration date out of range: '{}'", input))
}

fn parse_relative(input: &str) -> Result<Duration, String> {
    let mut total = Duration::zero();
    let mut remaining = input;

    while !remaining.is_empty() {
        let digits_len = remaining
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(remaining.len());
        if digits_len == 0 {
            return Err(format!("Invalid expiration format: '{}'", input));
        }
        let num: i64 = remaining[..digits_len]
            .parse()
            .map_err(|_| format!("Invalid number in expiration: '{}'", input))?;
        remaining = &remaining[digits_len..];

        let unit_len = remaining
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(remaining.len());
        if unit_len == 0 {
            return Err(format!("Missing time unit after '{}'", num));
        }
        let unit = remaining[..unit_len].to_ascii_lowercase();
        remaining = &remaining[unit_len..];

        let part = match unit.as_str() {
            "s" | "sec" | "second" | "seconds" => Duration::try_seconds(num),
            "m" | "min" | "minute" | "minutes" => Duration::try_minutes(num),
            "h" | "hour" | "hours" => Duration::try_hours(num),
            "d" | "day" | "days" => Duration::try_days(num),
            "w" | "week" | "weeks" => Duration::try_weeks(num),
            "mo" | "month" | "months" => num.checked_mul(30).and_then(Duration::try_days),
            "y" | "year" | "years" => num.checked_mul(365).and_then(Duration::try_days),
            _ => return Err(format!("Unsupported time unit: '{}'", unit)),
        }
        .ok_or_else(|| format!("Expiration date out of range: '{}'", input))?;

        total = total
            .checked_add(&part)
            .ok_or_else(|| format!("Expiration date out of range: '{}'", input))?;
    }

    if total == Duration::zero() {
        return Err("Expiration offset cannot be zero".to_string());
    }

    Ok(total)
}
