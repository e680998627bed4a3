//! Day-type classification
//!
//! Classifies one session's price action into a small taxonomy:
//! - Trend day: sustained directional movement, body dominates the range
//! - Range day: small body relative to the session range
//! - V-day: sharp mid-session reversal
//! - P-day: one-directional grind with minimal pullback
//! - Normal: none of the above

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::bars::{average_true_range, session_ohlc, Bar};
use crate::errors::AnalyticsError;

/// Day type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayType {
    /// Strong upward momentum
    TrendUp,
    /// Strong downward momentum
    TrendDown,
    /// Sideways consolidation
    Range,
    /// V-shaped reversal
    VDay,
    /// Progressive one-directional push
    PDay,
    /// No dominant pattern
    Normal,
    /// Degenerate data (flat or empty session)
    Undefined,
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DayType::TrendUp => "TREND_UP",
            DayType::TrendDown => "TREND_DOWN",
            DayType::Range => "RANGE",
            DayType::VDay => "V_DAY",
            DayType::PDay => "P_DAY",
            DayType::Normal => "NORMAL",
            DayType::Undefined => "UNDEFINED",
        };
        write!(f, "{}", s)
    }
}

/// Threshold table for day classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Body must exceed this share of the range for a trend day (default: 0.70)
    pub trend_body_pct: f64,
    /// Body must stay under this share of the range for a range day (default: 0.40)
    pub range_body_pct: f64,
    /// Both wicks must exceed this share of the range for a V-day (default: 0.30)
    pub v_day_wick_pct: f64,
    /// Reversal score above which a session counts as a V-day (default: 0.60)
    pub v_day_reversal_score: f64,
    /// Body must exceed this share of the range for a P-day (default: 0.60)
    pub p_day_body_pct: f64,
    /// Wick opposite the move must stay under this share for a P-day (default: 0.15)
    pub p_day_opposite_wick_pct: f64,
    /// Ranges below this are treated as a flat session (default: 1e-8)
    pub flat_range_epsilon: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            trend_body_pct: 0.70,
            range_body_pct: 0.40,
            v_day_wick_pct: 0.30,
            v_day_reversal_score: 0.60,
            p_day_body_pct: 0.60,
            p_day_opposite_wick_pct: 0.15,
            flat_range_epsilon: 1e-8,
        }
    }
}

/// Result of classifying one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayStats {
    pub instrument: String,
    pub date: NaiveDate,
    pub day_type: DayType,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub range: f64,
    /// Body as share of range
    pub body_pct: f64,
    /// Upper wick as share of range
    pub wick_top_pct: f64,
    /// Lower wick as share of range
    pub wick_bottom_pct: f64,
    /// Normalized regression slope of closes, 0 when sub-bars are unavailable
    pub trend_strength: f64,
    /// Net close displacement over total close-to-close travel
    pub range_efficiency: f64,
    /// Close-to-extreme distance over range, gated to mid-session extremes
    pub reversal_score: f64,
    /// Range relative to the session open
    pub volatility: f64,
    /// Average True Range over the session's bars
    pub atr: f64,
    /// How decisively the winning rule fired, in [0, 1]
    pub confidence: f64,
}

/// Classifies sessions against a threshold table.
#[derive(Debug, Clone, Default)]
pub struct DayClassifier {
    config: ClassifierConfig,
}

impl DayClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a session from its intraday bars.
    ///
    /// Session OHLC is derived from the bars (first open, max high, min low,
    /// last close); regression features come from the close sequence.
    pub fn classify(&self, instrument: &str, bars: &[Bar]) -> Result<DayStats, AnalyticsError> {
        let (open, high, low, close) =
            session_ohlc(bars).ok_or_else(|| AnalyticsError::EmptyBars {
                instrument: instrument.to_string(),
            })?;

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let features = SessionFeatures {
            trend_strength: trend_strength(&closes),
            range_efficiency: range_efficiency(&closes),
            reversal_score: reversal_score(bars),
            atr: average_true_range(bars),
        };

        Ok(self.build(
            instrument,
            bars[0].timestamp.date_naive(),
            open,
            high,
            low,
            close,
            features,
        ))
    }

    /// Classify from a single session candle.
    ///
    /// Regression features need sub-bars and are reported as zero here; the
    /// V-day rule falls back to its dual-wick form.
    pub fn classify_ohlc(
        &self,
        instrument: &str,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        timestamp: DateTime<Utc>,
    ) -> DayStats {
        let features = SessionFeatures {
            atr: high - low,
            ..SessionFeatures::default()
        };
        self.build(
            instrument,
            timestamp.date_naive(),
            open,
            high,
            low,
            close,
            features,
        )
    }

    fn build(
        &self,
        instrument: &str,
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        features: SessionFeatures,
    ) -> DayStats {
        let range = high - low;

        let mut stats = DayStats {
            instrument: instrument.to_string(),
            date,
            day_type: DayType::Undefined,
            open,
            high,
            low,
            close,
            range,
            body_pct: 0.0,
            wick_top_pct: 0.0,
            wick_bottom_pct: 0.0,
            trend_strength: features.trend_strength,
            range_efficiency: features.range_efficiency,
            reversal_score: features.reversal_score,
            volatility: 0.0,
            atr: features.atr,
            confidence: 0.0,
        };

        // Flat session: nothing to measure against.
        if range < self.config.flat_range_epsilon {
            return stats;
        }

        let body = (close - open).abs();
        let upper_wick = high - open.max(close);
        let lower_wick = open.min(close) - low;

        stats.body_pct = body / range;
        stats.wick_top_pct = upper_wick / range;
        stats.wick_bottom_pct = lower_wick / range;
        stats.volatility = if open != 0.0 { range / open } else { 0.0 };

        stats.day_type = self.determine_type(&stats);
        stats.confidence = self.confidence(&stats);

        stats
    }

    // First matching rule wins; the order is part of the contract.
    fn determine_type(&self, stats: &DayStats) -> DayType {
        let c = &self.config;

        // V-day: large wicks on both sides, or a mid-session reversal when
        // sub-bars were available.
        if (stats.wick_top_pct > c.v_day_wick_pct && stats.wick_bottom_pct > c.v_day_wick_pct)
            || stats.reversal_score > c.v_day_reversal_score
        {
            return DayType::VDay;
        }

        // Trend: body dominates the range.
        if stats.body_pct > c.trend_body_pct {
            return if stats.close > stats.open {
                DayType::TrendUp
            } else {
                DayType::TrendDown
            };
        }

        // Range: small body relative to range.
        if stats.body_pct < c.range_body_pct {
            return DayType::Range;
        }

        // P-day: progressive move with a small wick against the direction.
        if stats.body_pct > c.p_day_body_pct {
            let opposite_wick = if stats.close > stats.open {
                stats.wick_bottom_pct
            } else {
                stats.wick_top_pct
            };
            if opposite_wick < c.p_day_opposite_wick_pct {
                return DayType::PDay;
            }
        }

        DayType::Normal
    }

    fn confidence(&self, stats: &DayStats) -> f64 {
        let c = &self.config;
        let raw = match stats.day_type {
            DayType::TrendUp | DayType::TrendDown => stats.body_pct / c.trend_body_pct,
            DayType::Range => 1.0 - stats.body_pct / c.range_body_pct,
            DayType::VDay => {
                (stats.wick_top_pct + stats.wick_bottom_pct) / (2.0 * c.v_day_wick_pct)
            }
            DayType::PDay => stats.body_pct / c.p_day_body_pct,
            DayType::Normal | DayType::Undefined => 0.0,
        };
        raw.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Default)]
struct SessionFeatures {
    trend_strength: f64,
    range_efficiency: f64,
    reversal_score: f64,
    atr: f64,
}

/// Trend strength from the linear-regression slope of closes over bar index,
/// normalized by the close range. 0 (no trend) to 1 (strong trend).
fn trend_strength(closes: &[f64]) -> f64 {
    let n = closes.len();
    if n < 2 {
        return 0.0;
    }

    let max = closes.iter().cloned().fold(f64::MIN, f64::max);
    let min = closes.iter().cloned().fold(f64::MAX, f64::min);
    let close_range = max - min;
    if close_range == 0.0 {
        return 0.0;
    }

    // Least-squares slope of close against bar index.
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = closes.iter().sum::<f64>() / n as f64;
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, close) in closes.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (close - y_mean);
        den += dx * dx;
    }
    if den == 0.0 {
        return 0.0;
    }
    let slope = num / den;

    ((slope * n as f64).abs() / close_range).min(1.0)
}

/// Net close-to-close displacement over summed absolute close-to-close
/// displacement. 0 (choppy) to 1 (every step in one direction).
fn range_efficiency(closes: &[f64]) -> f64 {
    if closes.len() < 2 {
        return 0.0;
    }

    let total: f64 = closes.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    if total == 0.0 {
        return 0.0;
    }

    let net = (closes[closes.len() - 1] - closes[0]).abs();
    net / total
}

/// Distance from the session close back to the session extreme, normalized by
/// range. Only registers when the extreme falls in the middle third of the
/// session, so a drift to a new extreme near the close does not count.
fn reversal_score(bars: &[Bar]) -> f64 {
    let n = bars.len();
    if n < 3 {
        return 0.0;
    }

    let mut high_idx = 0;
    let mut low_idx = 0;
    for (i, bar) in bars.iter().enumerate() {
        if bar.high > bars[high_idx].high {
            high_idx = i;
        }
        if bar.low < bars[low_idx].low {
            low_idx = i;
        }
    }

    let third = n / 3;
    let in_middle = |idx: usize| idx >= third && idx <= 2 * third;
    if !in_middle(high_idx) && !in_middle(low_idx) {
        return 0.0;
    }

    let range = bars[high_idx].high - bars[low_idx].low;
    if range == 0.0 {
        return 0.0;
    }

    let last_close = bars[n - 1].close;
    let reversal = if high_idx < low_idx {
        // High first, then low: inverted V, measure from the high.
        (bars[high_idx].high - last_close) / range
    } else {
        // Low first, then high: V, measure from the low.
        (last_close - bars[low_idx].low) / range
    };

    reversal.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(mins: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 14, 30, 0).unwrap() + chrono::Duration::minutes(mins)
    }

    fn bar(mins: i64, open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            timestamp: ts(mins),
            open,
            high,
            low,
            close,
            volume: 0,
        }
    }

    #[test]
    fn test_flat_session_is_undefined() {
        let classifier = DayClassifier::default();
        let stats = classifier.classify_ohlc("EURUSD", 1.2, 1.2, 1.2, 1.2, ts(0));
        assert_eq!(stats.day_type, DayType::Undefined);
        assert_eq!(stats.confidence, 0.0);
        assert_eq!(stats.body_pct, 0.0);
        assert_eq!(stats.wick_top_pct, 0.0);
        assert_eq!(stats.wick_bottom_pct, 0.0);
        assert_eq!(stats.volatility, 0.0);
    }

    #[test]
    fn test_flat_bar_series_is_undefined() {
        let classifier = DayClassifier::default();
        let bars = vec![
            bar(0, 1.2, 1.2, 1.2, 1.2),
            bar(5, 1.2, 1.2, 1.2, 1.2),
            bar(10, 1.2, 1.2, 1.2, 1.2),
        ];
        let stats = classifier.classify("EURUSD", &bars).unwrap();
        assert_eq!(stats.day_type, DayType::Undefined);
        assert_eq!(stats.confidence, 0.0);
        assert_eq!(stats.body_pct, 0.0);
        assert_eq!(stats.trend_strength, 0.0);
        assert_eq!(stats.range_efficiency, 0.0);
    }

    #[test]
    fn test_session_ohlc_derived_from_bars() {
        let classifier = DayClassifier::default();
        let bars = vec![
            bar(0, 1.10, 1.12, 1.09, 1.11),
            bar(5, 1.11, 1.18, 1.10, 1.16),
            bar(10, 1.16, 1.17, 1.07, 1.09),
        ];
        let stats = classifier.classify("EURUSD", &bars).unwrap();
        assert_eq!(stats.open, 1.10);
        assert_eq!(stats.high, 1.18);
        assert_eq!(stats.low, 1.07);
        assert_eq!(stats.close, 1.09);
        assert_eq!(stats.date, bars[0].timestamp.date_naive());
    }

    #[test]
    fn test_empty_bars_is_error() {
        let classifier = DayClassifier::default();
        assert!(classifier.classify("EURUSD", &[]).is_err());
    }

    #[test]
    fn test_strong_trend_up() {
        let classifier = DayClassifier::default();
        // Body covers 85% of the range, close above open.
        let stats = classifier.classify_ohlc("EURUSD", 1.05, 2.0, 1.0, 1.90, ts(0));
        assert_eq!(stats.day_type, DayType::TrendUp);
        assert!((stats.body_pct - 0.85).abs() < 1e-12);
        assert_eq!(stats.confidence, 1.0);
    }

    #[test]
    fn test_trend_down_direction() {
        let classifier = DayClassifier::default();
        let stats = classifier.classify_ohlc("EURUSD", 1.90, 2.0, 1.0, 1.05, ts(0));
        assert_eq!(stats.day_type, DayType::TrendDown);
    }

    #[test]
    fn test_range_day() {
        let classifier = DayClassifier::default();
        // Small body, one-sided wick so the V-day rule stays quiet.
        let stats = classifier.classify_ohlc("EURUSD", 1.0, 2.0, 1.0, 1.3, ts(0));
        assert_eq!(stats.day_type, DayType::Range);
        assert!((stats.confidence - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_v_day_dual_wick() {
        let classifier = DayClassifier::default();
        let stats = classifier.classify_ohlc("EURUSD", 1.50, 2.0, 1.0, 1.45, ts(0));
        assert!(stats.wick_top_pct > 0.3 && stats.wick_bottom_pct > 0.3);
        assert_eq!(stats.day_type, DayType::VDay);
        assert_eq!(stats.confidence, 1.0);
    }

    #[test]
    fn test_p_day() {
        let classifier = DayClassifier::default();
        // Body at 65% with almost no pullback wick below.
        let stats = classifier.classify_ohlc("EURUSD", 1.05, 2.0, 1.0, 1.70, ts(0));
        assert_eq!(stats.day_type, DayType::PDay);
        assert_eq!(stats.confidence, 1.0);
    }

    #[test]
    fn test_normal_fallthrough() {
        let classifier = DayClassifier::default();
        // Mid-sized body with symmetric wicks matches no rule.
        let stats = classifier.classify_ohlc("EURUSD", 1.25, 2.0, 1.0, 1.75, ts(0));
        assert_eq!(stats.day_type, DayType::Normal);
        assert_eq!(stats.confidence, 0.0);
    }

    #[test]
    fn test_percentages_sum_to_one() {
        let classifier = DayClassifier::default();
        let cases = [
            (1.05, 2.0, 1.0, 1.90),
            (1.50, 2.0, 1.0, 1.45),
            (1.0, 2.0, 1.0, 1.3),
            (1.25, 2.0, 1.0, 1.75),
        ];
        for (open, high, low, close) in cases {
            let stats = classifier.classify_ohlc("EURUSD", open, high, low, close, ts(0));
            let sum = stats.body_pct + stats.wick_top_pct + stats.wick_bottom_pct;
            assert!((sum - 1.0).abs() < 1e-9, "sum was {}", sum);
        }
    }

    #[test]
    fn test_classify_is_deterministic() {
        let classifier = DayClassifier::default();
        let bars = vec![
            bar(0, 1.10, 1.12, 1.09, 1.11),
            bar(5, 1.11, 1.15, 1.10, 1.14),
            bar(10, 1.14, 1.16, 1.12, 1.15),
        ];
        let a = classifier.classify("EURUSD", &bars).unwrap();
        let b = classifier.classify("EURUSD", &bars).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_mid_session_reversal_is_v_day() {
        let classifier = DayClassifier::default();
        // Sell-off into a mid-session low, then a recovery into the close.
        // The lower wick alone would not satisfy the dual-wick rule.
        let bars = vec![
            bar(0, 1.90, 1.92, 1.88, 1.90),
            bar(5, 1.90, 1.90, 1.75, 1.78),
            bar(10, 1.78, 1.80, 1.55, 1.60),
            bar(15, 1.60, 1.62, 1.30, 1.35),
            bar(20, 1.35, 1.40, 1.00, 1.05),
            bar(25, 1.05, 1.30, 1.05, 1.28),
            bar(30, 1.28, 1.55, 1.25, 1.50),
            bar(35, 1.50, 1.80, 1.48, 1.75),
            bar(40, 1.75, 2.00, 1.70, 1.80),
        ];
        let stats = classifier.classify("EURUSD", &bars).unwrap();
        assert!(stats.reversal_score > 0.6, "score {}", stats.reversal_score);
        assert_eq!(stats.day_type, DayType::VDay);
    }

    #[test]
    fn test_late_extreme_does_not_score_reversal() {
        // Monotonic drift to a new high at the close: both extremes sit at
        // the session edges, so no reversal registers.
        let bars: Vec<Bar> = (0..9)
            .map(|i| {
                let base = 1.0 + 0.1 * i as f64;
                bar(i * 5, base, base + 0.11, base - 0.01, base + 0.10)
            })
            .collect();
        assert_eq!(reversal_score(&bars), 0.0);
    }

    #[test]
    fn test_trend_strength_saturates_on_linear_closes() {
        let closes: Vec<f64> = (0..10).map(|i| 1.0 + i as f64 * 0.01).collect();
        assert_eq!(trend_strength(&closes), 1.0);
    }

    #[test]
    fn test_range_efficiency_monotonic_vs_choppy() {
        let monotonic: Vec<f64> = (0..10).map(|i| 1.0 + i as f64 * 0.01).collect();
        assert!((range_efficiency(&monotonic) - 1.0).abs() < 1e-12);

        let choppy = vec![1.0, 1.1, 1.0, 1.1, 1.0, 1.1, 1.02];
        assert!(range_efficiency(&choppy) < 0.1);
    }

    #[test]
    fn test_config_thresholds_are_respected() {
        let config = ClassifierConfig {
            trend_body_pct: 0.50,
            ..ClassifierConfig::default()
        };
        let classifier = DayClassifier::new(config);
        // 55% body: a trend day under the loosened threshold, not under the
        // default one.
        let stats = classifier.classify_ohlc("EURUSD", 1.20, 2.0, 1.0, 1.75, ts(0));
        assert_eq!(stats.day_type, DayType::TrendUp);
    }
}
