//! Opening Range Breakout analysis
//!
//! Measures the opening-range band of each session, detects breakouts beyond
//! it, and reduces many sessions into aggregate statistics including a
//! simulated breakout-to-close P&L.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::bars::Bar;

/// Absolute price epsilon for breakout detection at the range boundary
const BREAKOUT_EPSILON: f64 = 1e-4;

/// Day ranges below this are treated as flat for ratio purposes
const FLAT_RANGE_EPSILON: f64 = 1e-8;

/// ORB statistics for a single session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbStats {
    pub instrument: String,
    pub date: NaiveDate,
    /// Configured opening-range window length
    pub window_minutes: i64,

    // Opening range metrics
    pub or_high: f64,
    pub or_low: f64,
    pub or_range: f64,
    pub or_midpoint: f64,

    // Session metrics
    pub day_high: f64,
    pub day_low: f64,
    pub day_close: f64,
    pub day_range: f64,

    // Breakout analysis
    pub broke_high: bool,
    pub broke_low: bool,
    /// Distance from the broken bound to the session extreme on that side
    pub breakout_extension: f64,
    /// Minutes from the window close to the first post-window breakout bar.
    /// None when no post-window bar crosses the broken bound (e.g. the
    /// breakout came from bars before the session start).
    pub breakout_time_mins: Option<f64>,

    // Ratios
    pub or_to_day_ratio: f64,
    pub efficiency_ratio: f64,
}

impl OrbStats {
    fn empty(instrument: &str, date: NaiveDate, window_minutes: i64) -> Self {
        Self {
            instrument: instrument.to_string(),
            date,
            window_minutes,
            or_high: 0.0,
            or_low: 0.0,
            or_range: 0.0,
            or_midpoint: 0.0,
            day_high: 0.0,
            day_low: 0.0,
            day_close: 0.0,
            day_range: 0.0,
            broke_high: false,
            broke_low: false,
            breakout_extension: 0.0,
            breakout_time_mins: None,
            or_to_day_ratio: 0.0,
            efficiency_ratio: 0.0,
        }
    }
}

/// Aggregate ORB statistics over many sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbSummary {
    pub instrument: String,
    pub window_minutes: i64,
    pub total_days: usize,

    // Breakout statistics
    pub high_breakouts: usize,
    pub low_breakouts: usize,
    pub high_breakout_pct: f64,
    pub low_breakout_pct: f64,

    // Average metrics
    pub avg_or_range: f64,
    pub avg_day_range: f64,
    pub avg_or_to_day_ratio: f64,
    pub avg_breakout_extension: f64,

    // Simulated performance: enter at the broken bound, exit at session close
    pub total_pnl: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
}

impl OrbSummary {
    fn empty(instrument: &str, window_minutes: i64) -> Self {
        Self {
            instrument: instrument.to_string(),
            window_minutes,
            total_days: 0,
            high_breakouts: 0,
            low_breakouts: 0,
            high_breakout_pct: 0.0,
            low_breakout_pct: 0.0,
            avg_or_range: 0.0,
            avg_day_range: 0.0,
            avg_or_to_day_ratio: 0.0,
            avg_breakout_extension: 0.0,
            total_pnl: 0.0,
            win_rate: 0.0,
            profit_factor: 0.0,
        }
    }
}

/// Computes per-session ORB statistics for a fixed opening-range window.
#[derive(Debug, Clone)]
pub struct OrbAnalyzer {
    window_minutes: i64,
}

impl Default for OrbAnalyzer {
    fn default() -> Self {
        Self::new(30)
    }
}

impl OrbAnalyzer {
    pub fn new(window_minutes: i64) -> Self {
        Self { window_minutes }
    }

    pub fn window_minutes(&self) -> i64 {
        self.window_minutes
    }

    /// Analyze a single session.
    ///
    /// Returns zeroed statistics when `bars` is empty; a session with no data
    /// is uninteresting but not an error at this level.
    pub fn analyze_day(
        &self,
        instrument: &str,
        bars: &[Bar],
        session_start: DateTime<Utc>,
    ) -> OrbStats {
        let date = session_start.date_naive();
        let Some(first) = bars.first() else {
            return OrbStats::empty(instrument, date, self.window_minutes);
        };

        let window_end = session_start + Duration::minutes(self.window_minutes);
        let (or_high, or_low) = opening_range(bars, session_start, window_end);

        let mut stats = OrbStats::empty(instrument, date, self.window_minutes);
        stats.or_high = or_high;
        stats.or_low = or_low;
        stats.or_range = or_high - or_low;
        stats.or_midpoint = (or_high + or_low) / 2.0;

        stats.day_high = or_high;
        stats.day_low = or_low;
        for bar in bars {
            stats.day_high = stats.day_high.max(bar.high);
            stats.day_low = stats.day_low.min(bar.low);
        }
        stats.day_close = bars[bars.len() - 1].close;
        stats.day_range = stats.day_high - stats.day_low;

        stats.broke_high = stats.day_high > or_high + BREAKOUT_EPSILON;
        stats.broke_low = stats.day_low < or_low - BREAKOUT_EPSILON;

        // A day that broke both ways is measured on the high side; the low
        // side keeps its flag but not its extension.
        if stats.broke_high {
            stats.breakout_extension = stats.day_high - or_high;
            stats.breakout_time_mins = breakout_time(bars, window_end, or_high, true);
        } else if stats.broke_low {
            stats.breakout_extension = or_low - stats.day_low;
            stats.breakout_time_mins = breakout_time(bars, window_end, or_low, false);
        }

        if stats.day_range > FLAT_RANGE_EPSILON {
            stats.or_to_day_ratio = stats.or_range / stats.day_range;
            stats.efficiency_ratio = (stats.day_close - first.open).abs() / stats.day_range;
        }

        stats
    }

    /// Reduce per-session statistics into an aggregate summary.
    ///
    /// Order independent: any permutation of `daily` yields the same summary.
    /// Zero sessions yields a zeroed summary; whether that is an error is the
    /// caller's call.
    pub fn summarize(&self, instrument: &str, daily: &[OrbStats]) -> OrbSummary {
        let mut summary = OrbSummary::empty(instrument, self.window_minutes);
        summary.total_days = daily.len();
        if daily.is_empty() {
            return summary;
        }

        let total = daily.len() as f64;
        summary.high_breakouts = daily.iter().filter(|s| s.broke_high).count();
        summary.low_breakouts = daily.iter().filter(|s| s.broke_low).count();
        summary.high_breakout_pct = 100.0 * summary.high_breakouts as f64 / total;
        summary.low_breakout_pct = 100.0 * summary.low_breakouts as f64 / total;

        summary.avg_or_range = daily.iter().map(|s| s.or_range).sum::<f64>() / total;
        summary.avg_day_range = daily.iter().map(|s| s.day_range).sum::<f64>() / total;
        summary.avg_or_to_day_ratio = daily.iter().map(|s| s.or_to_day_ratio).sum::<f64>() / total;

        // A both-direction day contributes once to the numerator but twice
        // to the denominator.
        let breakout_days = summary.high_breakouts + summary.low_breakouts;
        if breakout_days > 0 {
            let ext_sum: f64 = daily
                .iter()
                .filter(|s| s.broke_high || s.broke_low)
                .map(|s| s.breakout_extension)
                .sum();
            summary.avg_breakout_extension = ext_sum / breakout_days as f64;
        }

        // Simulated strategy: long from the OR high to the close on an upside
        // break, else short from the OR low. Days breaking both ways are
        // scored long-side only.
        let mut winning_days = 0usize;
        let mut gross_profit = 0.0;
        let mut gross_loss = 0.0;
        for day in daily {
            let day_pnl = if day.broke_high {
                day.day_close - day.or_high
            } else if day.broke_low {
                day.or_low - day.day_close
            } else {
                0.0
            };

            summary.total_pnl += day_pnl;
            if day_pnl > 0.0 {
                winning_days += 1;
                gross_profit += day_pnl;
            } else {
                gross_loss += day_pnl.abs();
            }
        }

        if breakout_days > 0 {
            summary.win_rate = 100.0 * winning_days as f64 / breakout_days as f64;
        }
        summary.profit_factor = if gross_loss > FLAT_RANGE_EPSILON {
            gross_profit / gross_loss
        } else {
            0.0
        };

        summary
    }
}

/// Opening-range high/low over bars inside `[session_start, window_end]`.
/// Falls back to the first bar when the feed starts after the window closes.
fn opening_range(bars: &[Bar], session_start: DateTime<Utc>, window_end: DateTime<Utc>) -> (f64, f64) {
    let mut or_high = f64::NEG_INFINITY;
    let mut or_low = f64::INFINITY;

    for bar in bars {
        if bar.timestamp >= session_start && bar.timestamp <= window_end {
            or_high = or_high.max(bar.high);
            or_low = or_low.min(bar.low);
        }
        if bar.timestamp > window_end {
            break;
        }
    }

    if or_high == f64::NEG_INFINITY {
        or_high = bars[0].high;
        or_low = bars[0].low;
    }

    (or_high, or_low)
}

/// Minutes from the window close to the first post-window bar crossing the
/// broken bound; None when no such bar exists.
fn breakout_time(
    bars: &[Bar],
    window_end: DateTime<Utc>,
    bound: f64,
    looking_for_high: bool,
) -> Option<f64> {
    for bar in bars {
        if bar.timestamp <= window_end {
            continue;
        }

        let crossed = if looking_for_high {
            bar.high > bound
        } else {
            bar.low < bound
        };

        if crossed {
            let elapsed = bar.timestamp - window_end;
            return Some(elapsed.num_seconds() as f64 / 60.0);
        }
    }

    None
}
