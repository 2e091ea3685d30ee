//! Bucket key derivation
//!
//! Pure functions from an epoch-millisecond timestamp to each bucket key,
//! evaluated in an explicit time zone.
//!
//! Week keys are counted from a fixed anchor, the Monday of the week that
//! contains 1970-01-01, so they are stable across runs and independent of
//! locale week-numbering rules. [`normalize_weeks`] then shifts a dataset's
//! keys so its earliest week is 0.

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;

/// Date whose Monday-aligned week is week 0 before normalization.
pub const WEEK_ANCHOR: (i32, u32, u32) = (1970, 1, 1);

/// Last local year whose month and day keys keep a four-digit year.
///
/// Keys compare as strings, so a fifth year digit would sort `10000-01`
/// before `9999-12`.
pub const MAX_KEY_YEAR: i32 = 9999;

/// Convert epoch milliseconds to a local datetime.
///
/// Returns `None` for negative timestamps and for values outside chrono's
/// representable range.
pub fn local_datetime(timestamp_ms: i64, tz: Tz) -> Option<DateTime<Tz>> {
    if timestamp_ms < 0 {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms).map(|utc| utc.with_timezone(&tz))
}

/// Local hour of day, 0-23.
pub fn hour_key(local: &DateTime<Tz>) -> u32 {
    local.hour()
}

/// Whole weeks between the anchor week's Monday and this date's Monday.
///
/// Can be negative for dates before the anchor; callers normalize with
/// [`normalize_weeks`].
pub fn raw_week_key(local: &DateTime<Tz>) -> i64 {
    let (y, m, d) = WEEK_ANCHOR;
    // The anchor is a valid literal date
    let anchor = NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
    let days = monday_of(local.date_naive())
        .signed_duration_since(monday_of(anchor))
        .num_days();
    days.div_euclid(7)
}

/// `YYYY-MM` in local time.
pub fn month_key(local: &DateTime<Tz>) -> String {
    format!("{:04}-{:02}", local.year(), local.month())
}

/// `YYYY-MM-DD` in local time.
pub fn day_key(local: &DateTime<Tz>) -> String {
    format!("{:04}-{:02}-{:02}", local.year(), local.month(), local.day())
}

/// Shift raw week keys so the smallest becomes 0.
pub fn normalize_weeks(raw: &[i64]) -> Vec<u32> {
    let Some(min) = raw.iter().copied().min() else {
        return Vec::new();
    };
    raw.iter()
        .map(|w| u32::try_from(w - min).unwrap_or(u32::MAX))
        .collect()
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    let offset = i64::from(date.weekday().num_days_from_monday());
    date - chrono::Duration::days(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UTC: Tz = chrono_tz::UTC;

    // 2021-03-01T12:00:00Z, a Monday
    const MONDAY_NOON: i64 = 1_614_600_000_000;
    const HOUR_MS: i64 = 3_600_000;
    const DAY_MS: i64 = 24 * HOUR_MS;

    fn local(ms: i64, tz: Tz) -> DateTime<Tz> {
        local_datetime(ms, tz).unwrap()
    }

    #[test]
    fn test_rejects_negative_timestamp() {
        assert!(local_datetime(-1, UTC).is_none());
        assert!(local_datetime(0, UTC).is_some());
    }

    #[test]
    fn test_hour_key_collapses_dates() {
        let a = local(MONDAY_NOON, UTC);
        let b = local(MONDAY_NOON + 7 * DAY_MS, UTC);
        assert_eq!(hour_key(&a), 12);
        assert_eq!(hour_key(&a), hour_key(&b));
    }

    #[test]
    fn test_hour_key_in_range_over_a_day() {
        for h in 0..48 {
            let key = hour_key(&local(MONDAY_NOON + h * HOUR_MS, chrono_tz::US::Central));
            assert!(key <= 23);
        }
    }

    #[test]
    fn test_time_zone_changes_keys() {
        // 2021-03-01T03:00:00Z is still Feb 28 in Chicago
        let ts = MONDAY_NOON - 9 * HOUR_MS;
        let utc = local(ts, UTC);
        let chicago = local(ts, chrono_tz::America::Chicago);
        assert_eq!(day_key(&utc), "2021-03-01");
        assert_eq!(day_key(&chicago), "2021-02-28");
        assert_eq!(month_key(&chicago), "2021-02");
        assert_eq!(hour_key(&chicago), 21);
    }

    #[test]
    fn test_week_key_monday_aligned() {
        let monday = raw_week_key(&local(MONDAY_NOON, UTC));
        let sunday = raw_week_key(&local(MONDAY_NOON + 6 * DAY_MS, UTC));
        let next_monday = raw_week_key(&local(MONDAY_NOON + 7 * DAY_MS, UTC));
        let prev_sunday = raw_week_key(&local(MONDAY_NOON - DAY_MS, UTC));
        assert_eq!(monday, sunday);
        assert_eq!(next_monday, monday + 1);
        assert_eq!(prev_sunday, monday - 1);
    }

    #[test]
    fn test_week_key_at_epoch_is_zero() {
        // 1970-01-01 was a Thursday; its week starts 1969-12-29
        assert_eq!(raw_week_key(&local(0, UTC)), 0);
        // 1970-01-05 is the next Monday
        assert_eq!(raw_week_key(&local(4 * DAY_MS, UTC)), 1);
    }

    #[test]
    fn test_keys_monotonic_with_time() {
        let mut prev: Option<(i64, String, String)> = None;
        let mut ts = MONDAY_NOON - 400 * DAY_MS;
        while ts < MONDAY_NOON + 400 * DAY_MS {
            let dt = local(ts, chrono_tz::Europe::Berlin);
            let cur = (raw_week_key(&dt), month_key(&dt), day_key(&dt));
            if let Some((w, m, d)) = &prev {
                assert!(*w <= cur.0);
                assert!(*m <= cur.1);
                assert!(*d <= cur.2);
            }
            prev = Some(cur);
            ts += 13 * HOUR_MS;
        }
    }

    #[test]
    fn test_normalize_weeks() {
        assert_eq!(normalize_weeks(&[2650, 2652, 2650]), vec![0, 2, 0]);
        assert_eq!(normalize_weeks(&[-3, 1]), vec![0, 4]);
        assert!(normalize_weeks(&[]).is_empty());
    }
}
