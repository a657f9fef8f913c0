//! Wall-clock helpers for cache expiry stamps.
//!
//! Cache files carry their expiry as an ISO-8601 UTC timestamp
//! (`YYYY-MM-DDThh:mm:ssZ`). We only ever need whole seconds and UTC, so the
//! conversion is done here directly instead of pulling in a calendar crate.
//! The day/date conversion uses the well-known era-based civil calendar
//! arithmetic (proleptic Gregorian).

use std::time::{SystemTime, UNIX_EPOCH};

/// Injectable clock, seconds since the Unix epoch.
pub type NowFn = fn() -> i64;

pub fn now_unix() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_secs() as i64,
        Err(_) => 0,
    }
}

const SECS_PER_DAY: i64 = 86_400;

fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let yoe = year - era * 400; // [0, 399]
    let mp = i64::from(if month > 2 { month - 3 } else { month + 9 });
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097; // [0, 146096]
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let year = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    (if month <= 2 { year + 1 } else { year }, month, day)
}

pub fn format_iso8601(unix: i64) -> String {
    let days = unix.div_euclid(SECS_PER_DAY);
    let secs = unix.rem_euclid(SECS_PER_DAY);
    let (year, month, day) = civil_from_days(days);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}Z",
        secs / 3_600,
        secs % 3_600 / 60,
        secs % 60,
    )
}

/// Parse `YYYY-MM-DDThh:mm:ss` with an optional trailing `Z`. Returns `None`
/// on any malformation; cache readers treat that as a miss.
pub fn parse_iso8601(stamp: &str) -> Option<i64> {
    let stamp = stamp.trim().trim_end_matches('Z');
    let (date, time) = stamp.split_once('T')?;

    let mut date_fields = date.splitn(3, '-');
    let year: i64 = date_fields.next()?.parse().ok()?;
    let month: u32 = date_fields.next()?.parse().ok()?;
    let day: u32 = date_fields.next()?.parse().ok()?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }

    let mut time_fields = time.splitn(3, ':');
    let hour: i64 = time_fields.next()?.parse().ok()?;
    let minute: i64 = time_fields.next()?.parse().ok()?;
    let second: i64 = time_fields.next()?.parse().ok()?;
    if hour >= 24 || minute >= 60 || second >= 60 {
        return None;
    }

    Some(days_from_civil(year, month, day) * SECS_PER_DAY + hour * 3_600 + minute * 60 + second)
}
