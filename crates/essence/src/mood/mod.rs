//! Mood series core
//!
//! Everything between a raw mood observation and the charted weekly
//! summary: point sanitation, the per-subject bounded series store, the
//! trailing-week aggregator, and the local heuristic scorer that stands
//! in when no remote scoring service is reachable.

pub mod analyzer;
pub mod pipeline;
pub mod point;
pub mod sanitize;
pub mod store;
pub mod weekly;

pub use analyzer::{HeuristicScorer, MoodAnalysis, MoodScorer, analyze_text_mood};
pub use pipeline::ScoringPipeline;
pub use point::{MAX_SERIES_POINTS, MoodLabel, MoodPoint};
pub use sanitize::{RawMoodPoint, sanitize_point};
pub use store::{AddOutcome, SanitizedSeries, SeriesStore};
pub use weekly::{DayAggregate, weekly_aggregates, weekly_aggregates_at};
