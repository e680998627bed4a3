//! OHLCV bar type and bar-series helpers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AnalyticsError;

/// One fixed-interval price observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Zero when the feed carries no volume
    #[serde(default)]
    pub volume: u64,
}

impl Bar {
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

/// Session OHLC from a bar series: first open, max high, min low, last close.
/// None for an empty series.
pub fn session_ohlc(bars: &[Bar]) -> Option<(f64, f64, f64, f64)> {
    let first = bars.first()?;
    let last = bars.last()?;

    let mut high = first.high;
    let mut low = first.low;
    for bar in bars {
        high = high.max(bar.high);
        low = low.min(bar.low);
    }

    Some((first.open, high, low, last.close))
}

/// True range of a bar given the previous close
pub fn true_range(bar: &Bar, prev_close: f64) -> f64 {
    (bar.high - bar.low)
        .max((bar.high - prev_close).abs())
        .max((bar.low - prev_close).abs())
}

/// Average True Range over a bar series
pub fn average_true_range(bars: &[Bar]) -> f64 {
    if bars.len() < 2 {
        return if let Some(bar) = bars.first() {
            bar.high - bar.low
        } else {
            0.0
        };
    }

    let mut sum_tr = 0.0;
    let mut prev_close = bars[0].close;

    for bar in bars.iter().skip(1) {
        sum_tr += true_range(bar, prev_close);
        prev_close = bar.close;
    }

    sum_tr / (bars.len() - 1) as f64
}

/// Downsample bars to a coarser timeframe.
///
/// Each output bar covers one `minutes`-wide bucket aligned to the epoch:
/// first open, max high, min low, last close, summed volume. Input must be
/// time-ascending; output timestamps are the bucket boundaries.
pub fn resample(bars: &[Bar], minutes: u32) -> Result<Vec<Bar>, AnalyticsError> {
    if minutes == 0 {
        return Err(AnalyticsError::InvalidTimeframe { minutes });
    }

    let step = 60 * minutes as i64;
    let mut out: Vec<Bar> = Vec::new();

    for bar in bars {
        let aligned = bar.timestamp.timestamp().div_euclid(step) * step;
        let boundary = DateTime::<Utc>::from_timestamp(aligned, 0).unwrap_or(bar.timestamp);

        match out.last_mut() {
            Some(current) if current.timestamp == boundary => {
                current.high = current.high.max(bar.high);
                current.low = current.low.min(bar.low);
                current.close = bar.close;
                current.volume += bar.volume;
            }
            _ => out.push(Bar {
                timestamp: boundary,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
            }),
        }
    }

    Ok(out)
}
