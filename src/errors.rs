use thiserror::Error;

/// The unified error type for the analytics core.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A non-empty bar series was required.
    #[error("empty bar series for {instrument}")]
    EmptyBars { instrument: String },

    /// A resample target that cannot form a bucket.
    #[error("invalid timeframe: {minutes} minutes")]
    InvalidTimeframe { minutes: u32 },
}
