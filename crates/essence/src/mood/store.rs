//! Per-subject mood series storage
//!
//! Maintains the canonical, sanitized, bounded series for each subject
//! on top of a [`KvStore`], alongside a per-subject "seen message id"
//! index so callers can cheaply ask whether a message was already
//! scored.
//!
//! This layer is a best-effort cache over an unreliable store: corrupt
//! or missing data degrades to an empty series and failed writes are
//! logged and swallowed, never surfaced. A bad mood score must not be
//! able to break the chat experience sitting above it.

use std::collections::BTreeMap;

use chrono::Utc;
use serde_json::Value;

use crate::mood::point::{MAX_SERIES_POINTS, MoodPoint};
use crate::mood::sanitize::{RawMoodPoint, sanitize_point};
use crate::storage::KvStore;

const SERIES_KEY_PREFIX: &str = "essence:mood:";
const INDEX_KEY_PREFIX: &str = "essence:mood-index:";

/// Result of a [`SeriesStore::sanitize_series`] pass.
///
/// `dropped` and `rewritten` exist so tests and diagnostics can tell
/// "no data" apart from "sanitation rejected points"; the charting
/// caller only ever looks at `points`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SanitizedSeries {
    /// The cleaned series, oldest first.
    pub points: Vec<MoodPoint>,
    /// How many persisted entries failed sanitation and were removed.
    pub dropped: usize,
    /// Whether the cleaned result differed from storage and was
    /// written back.
    pub rewritten: bool,
}

/// Result of a [`SeriesStore::add_point`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    /// The point was sanitized, appended, and persisted.
    Added(MoodPoint),
    /// A point for this message id already exists; storage untouched.
    Duplicate,
    /// The candidate had no usable identity pair; storage untouched.
    Rejected,
}

impl AddOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added(_))
    }
}

/// Bounded, deduplicated mood series per subject.
///
/// The store object is passed wherever it is needed rather than living
/// in a module-level singleton, so its lifetime is the caller's to
/// scope.
pub struct SeriesStore<S: KvStore> {
    kv: S,
    max_points: usize,
}

impl<S: KvStore> SeriesStore<S> {
    /// Create a store with the standard 200-point cap.
    pub fn new(kv: S) -> Self {
        Self::with_max_points(kv, MAX_SERIES_POINTS)
    }

    /// Create a store with a custom cap. Mostly useful in tests.
    pub fn with_max_points(kv: S, max_points: usize) -> Self {
        Self { kv, max_points }
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    /// The underlying key-value handle.
    pub fn kv(&self) -> &S {
        &self.kv
    }

    fn series_key(subject_id: &str) -> String {
        format!("{SERIES_KEY_PREFIX}{subject_id}")
    }

    fn index_key(subject_id: &str) -> String {
        format!("{INDEX_KEY_PREFIX}{subject_id}")
    }

    /// The subject ids with a persisted series block.
    pub fn subjects(&self) -> Vec<String> {
        let mut subjects: Vec<String> = self
            .kv
            .keys()
            .into_iter()
            .filter_map(|k| k.strip_prefix(SERIES_KEY_PREFIX).map(str::to_string))
            .collect();
        subjects.sort();
        subjects
    }

    /// Load the persisted series as-is. Absent or unreadable storage
    /// yields an empty series, never an error.
    pub fn series(&self, subject_id: &str) -> Vec<MoodPoint> {
        self.kv
            .get(&Self::series_key(subject_id))
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Persist the full series, overwriting any prior value.
    ///
    /// Best-effort: a failed write (quota, permissions) is logged and
    /// swallowed so the caller's flow is never interrupted.
    pub fn set_series(&self, subject_id: &str, points: &[MoodPoint]) {
        let json = match serde_json::to_string(points) {
            Ok(json) => json,
            Err(e) => {
                tracing::debug!("Failed to serialize mood series for {subject_id}: {e}");
                return;
            }
        };

        if let Err(e) = self.kv.set(&Self::series_key(subject_id), &json) {
            tracing::debug!("Failed to persist mood series for {subject_id}: {e}");
        }
    }

    /// Load the current series, run every entry through the sanitizer,
    /// drop what cannot be salvaged, enforce the cap, and write the
    /// result back only when it differs from what was loaded.
    ///
    /// Calling this twice in a row with no new data performs no second
    /// write; the cleaned series is returned either way.
    pub fn sanitize_series(&self, subject_id: &str) -> SanitizedSeries {
        let loaded = self.load_raw(subject_id);
        let now_ms = Utc::now().timestamp_millis();

        let mut points = Vec::with_capacity(loaded.len());
        let mut dropped = 0;
        for value in &loaded {
            let raw: RawMoodPoint = serde_json::from_value(value.clone()).unwrap_or_default();
            match sanitize_point(&raw, now_ms) {
                Some(point) => points.push(point),
                None => dropped += 1,
            }
        }

        if points.len() > self.max_points {
            let excess = points.len() - self.max_points;
            points.drain(..excess);
        }

        let canonical: Vec<Value> = points
            .iter()
            .map(|p| serde_json::to_value(p).unwrap_or(Value::Null))
            .collect();
        let rewritten = canonical != loaded;

        if rewritten {
            if dropped > 0 {
                tracing::warn!("Dropped {dropped} unsalvageable mood points for {subject_id}");
            }
            tracing::debug!(
                "Rewriting mood series for {subject_id} ({} points)",
                points.len()
            );
            self.set_series(subject_id, &points);
        }

        SanitizedSeries {
            points,
            dropped,
            rewritten,
        }
    }

    /// Sanitize the existing series, then append the candidate point if
    /// its message id is not already present.
    ///
    /// Duplicate appends and unsalvageable candidates are no-ops; the
    /// outcome reports which case occurred for callers that care.
    pub fn add_point(&self, raw: &RawMoodPoint) -> AddOutcome {
        let now_ms = Utc::now().timestamp_millis();
        let Some(point) = sanitize_point(raw, now_ms) else {
            return AddOutcome::Rejected;
        };

        // Self-heal whatever a prior version of the app left behind
        // before checking for duplicates against it.
        let mut points = self.sanitize_series(&point.subject_id).points;
        if points.iter().any(|p| p.message_id == point.message_id) {
            return AddOutcome::Duplicate;
        }

        points.push(point.clone());
        if points.len() > self.max_points {
            let excess = points.len() - self.max_points;
            points.drain(..excess);
        }

        self.set_series(&point.subject_id, &points);
        self.mark_scored(&point.subject_id, &point.message_id);

        AddOutcome::Added(point)
    }

    /// Whether a score was already recorded for this message.
    ///
    /// Answered from the seen-index rather than by scanning the series,
    /// so callers can probe many messages cheaply.
    pub fn has_score(&self, subject_id: &str, message_id: &str) -> bool {
        self.load_index(subject_id)
            .get(message_id)
            .copied()
            .unwrap_or(false)
    }

    /// Remove both the series and its seen-index for a subject.
    pub fn clear(&self, subject_id: &str) {
        for key in [Self::series_key(subject_id), Self::index_key(subject_id)] {
            if let Err(e) = self.kv.remove(&key) {
                tracing::debug!("Failed to clear {key}: {e}");
            }
        }
    }

    fn load_raw(&self, subject_id: &str) -> Vec<Value> {
        let Some(raw) = self.kv.get(&Self::series_key(subject_id)) else {
            return Vec::new();
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => items,
            _ => Vec::new(),
        }
    }

    fn load_index(&self, subject_id: &str) -> BTreeMap<String, bool> {
        self.kv
            .get(&Self::index_key(subject_id))
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn mark_scored(&self, subject_id: &str, message_id: &str) {
        let mut index = self.load_index(subject_id);
        index.insert(message_id.to_string(), true);

        let json = match serde_json::to_string(&index) {
            Ok(json) => json,
            Err(e) => {
                tracing::debug!("Failed to serialize score index for {subject_id}: {e}");
                return;
            }
        };

        if let Err(e) = self.kv.set(&Self::index_key(subject_id), &json) {
            tracing::debug!("Failed to persist score index for {subject_id}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn store() -> SeriesStore<MemoryStore> {
        SeriesStore::new(MemoryStore::new())
    }

    fn candidate(message_id: &str, mood: f64) -> RawMoodPoint {
        RawMoodPoint::new("luna", message_id).with_scores(mood, 5.0)
    }

    #[test]
    fn test_add_and_read_back() {
        let store = store();

        let outcome = store.add_point(&candidate("m1", 8.0));
        assert!(outcome.is_added());

        let series = store.series("luna");
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].id, "luna:m1");
        assert_eq!(series[0].mood, 8);
    }

    #[test]
    fn test_duplicate_append_keeps_first_point() {
        let store = store();

        store.add_point(&candidate("m1", 8.0));
        let second = store.add_point(&candidate("m1", 2.0));

        assert_eq!(second, AddOutcome::Duplicate);
        let series = store.series("luna");
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].mood, 8, "First successful add should win");
    }

    #[test]
    fn test_rejected_candidate_is_a_noop() {
        let store = store();

        let outcome = store.add_point(&RawMoodPoint::default());
        assert_eq!(outcome, AddOutcome::Rejected);
        assert!(store.series("luna").is_empty());
    }

    #[test]
    fn test_cap_evicts_oldest_first() {
        let store = SeriesStore::with_max_points(MemoryStore::new(), 5);

        for i in 0..8 {
            store.add_point(&candidate(&format!("m{i}"), 5.0));
        }

        let series = store.series("luna");
        assert_eq!(series.len(), 5);
        assert_eq!(series[0].message_id, "m3");
        assert_eq!(series[4].message_id, "m7");
    }

    #[test]
    fn test_has_score_tracks_adds() {
        let store = store();

        assert!(!store.has_score("luna", "m1"));
        store.add_point(&candidate("m1", 6.0));
        assert!(store.has_score("luna", "m1"));
        assert!(!store.has_score("luna", "m2"));
        assert!(!store.has_score("other", "m1"));
    }

    #[test]
    fn test_corrupt_block_degrades_to_empty() {
        let kv = MemoryStore::new();
        kv.set("essence:mood:luna", "{not json").unwrap();
        let store = SeriesStore::new(kv);

        assert!(store.series("luna").is_empty());

        let cleaned = store.sanitize_series("luna");
        assert!(cleaned.points.is_empty());
        assert!(!cleaned.rewritten, "An unreadable block has nothing to rewrite");
    }

    #[test]
    fn test_sanitize_salvages_partial_corruption() {
        let kv = MemoryStore::new();
        kv.set(
            "essence:mood:luna",
            r#"[
                {"subjectId": "luna", "messageId": "m1", "timestamp": 1000, "mood": 23, "energy": -4, "label": "meh"},
                {"messageId": "orphan"},
                "garbage"
            ]"#,
        )
        .unwrap();
        let store = SeriesStore::new(kv);

        let cleaned = store.sanitize_series("luna");
        assert_eq!(cleaned.points.len(), 1);
        assert_eq!(cleaned.dropped, 2);
        assert!(cleaned.rewritten);

        let point = &cleaned.points[0];
        assert_eq!(point.mood, 10);
        assert_eq!(point.energy, 0);
        assert_eq!(point.label, crate::mood::MoodLabel::Positive);

        // The healed block now parses through the strict read path too.
        assert_eq!(store.series("luna"), cleaned.points);
    }

    #[test]
    fn test_sanitize_second_pass_is_a_noop() {
        let store = store();
        store.add_point(&candidate("m1", 7.0));

        let first = store.sanitize_series("luna");
        assert!(!first.rewritten, "add_point already persisted canonical data");

        let second = store.sanitize_series("luna");
        assert!(!second.rewritten);
        assert_eq!(first.points, second.points);
    }

    #[test]
    fn test_clear_removes_series_and_index() {
        let store = store();
        store.add_point(&candidate("m1", 7.0));

        store.clear("luna");
        assert!(store.series("luna").is_empty());
        assert!(!store.has_score("luna", "m1"));
    }

    #[test]
    fn test_subjects_lists_series_blocks() {
        let store = store();
        store.add_point(&candidate("m1", 7.0));
        store.add_point(&RawMoodPoint::new("aria", "m1").with_scores(3.0, 3.0));

        assert_eq!(store.subjects(), vec!["aria", "luna"]);
    }
}
