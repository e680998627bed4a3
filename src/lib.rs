// Library crate - exports the session analytics core

pub mod analytics;
pub mod errors;

// Re-export commonly used types
pub use analytics::{
    Bar, ClassifierConfig, DayClassifier, DayStats, DayType, OrbAnalyzer, OrbStats, OrbSummary,
};
pub use errors::AnalyticsError;
