use chrono::{DateTime, Local, TimeZone};


/// Converts a message timestamp (seconds since the Unix epoch) into a local datetime.
pub fn unix_time_secs_to_datetime(secs: i32) -> Option<DateTime<Local>> {
    Local.timestamp_opt(secs.into(), 0).single()
}

/// Formats a message timestamp as the short time of day shown in a status badge,
/// e.g., "09:41" or "9:41 AM".
pub fn badge_date_text(secs: i32, use_24_hour_clock: bool) -> String {
    let Some(dt) = unix_time_secs_to_datetime(secs) else {
        return String::new();
    };
    if use_24_hour_clock {
        dt.format("%H:%M").to_string()
    } else {
        dt.format("%-I:%M %p").to_string()
    }
}

/// Formats a count compactly, using at most one (truncated) decimal digit.
///
/// * `999` -> `"999"`
/// * `1_250` -> `"1.2K"`
/// * `3_000_000` -> `"3M"`
pub fn compact_count(count: u32, decimal_separator: &str) -> String {
    const THOUSAND: u32 = 1_000;
    const MILLION: u32 = 1_000_000;

    let (unit, suffix) = if count >= MILLION {
        (MILLION, "M")
    } else if count >= THOUSAND {
        (THOUSAND, "K")
    } else {
        return count.to_string();
    };
    let whole = count / unit;
    let tenths = (count % unit) / (unit / 10);
    if tenths != 0 {
        format!("{whole}{decimal_separator}{tenths}{suffix}")
    } else {
        format!("{whole}{suffix}")
    }
}
