//! Session grouping and session-open conventions
//!
//! A "session" is one exchange-local calendar day of bars. Callers that feed
//! a multi-day bar stream use [`split_sessions`] to cut it into per-day
//! slices before running the classifiers.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::bars::Bar;

/// Split a time-ascending bar stream into per-session slices, grouped by
/// exchange-local calendar date.
pub fn split_sessions(bars: &[Bar], tz: Tz) -> Vec<(NaiveDate, &[Bar])> {
    let mut sessions = Vec::new();
    let mut start = 0usize;
    let mut current: Option<NaiveDate> = None;

    for (i, bar) in bars.iter().enumerate() {
        let date = bar.timestamp.with_timezone(&tz).date_naive();
        match current {
            Some(d) if d == date => {}
            Some(d) => {
                sessions.push((d, &bars[start..i]));
                start = i;
                current = Some(date);
            }
            None => current = Some(date),
        }
    }

    if let Some(d) = current {
        sessions.push((d, &bars[start..]));
    }

    sessions
}

/// Resolve an exchange-local open time on a session date to UTC.
///
/// None when the local time does not exist or is ambiguous on that date
/// (DST transitions); callers fall back to the session's first bar.
pub fn session_open_utc(date: NaiveDate, open: NaiveTime, tz: Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(open))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}
