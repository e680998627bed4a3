//! Session analytics core
//!
//! Pure, stateless computations over one session's bar series:
//! - Bar type and series helpers (session OHLC, ATR, resampling)
//! - Session grouping by exchange-local date
//! - Day-type classification
//! - Opening range breakout statistics and multi-day aggregation
//!
//! No I/O or shared state lives here; callers own fetching bars and
//! serializing results.

pub mod bars;
pub mod day_classifier;
pub mod orb;
pub mod session;

// Re-export commonly used types
pub use bars::{average_true_range, resample, session_ohlc, Bar};
pub use day_classifier::{ClassifierConfig, DayClassifier, DayStats, DayType};
pub use orb::{OrbAnalyzer, OrbStats, OrbSummary};
pub use session::{session_open_utc, split_sessions};
