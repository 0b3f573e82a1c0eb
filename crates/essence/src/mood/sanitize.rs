//! Point sanitation
//!
//! Converts an arbitrary, possibly malformed candidate point into a
//! valid [`MoodPoint`]. The caller is typically reacting to a scoring
//! response from an unreliable collaborator, so the policy is "never
//! fail, always coerce": only a missing identity pair rejects a point,
//! every other defect is silently corrected.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mood::point::{MAX_EMOTIONS, MAX_RATIONALE_CHARS, MoodLabel, MoodPoint};

/// An untrusted candidate point.
///
/// Every field is a raw JSON value so the same type can carry a fresh
/// scoring result, a block persisted by an older app version, or
/// outright garbage. [`sanitize_point`] is the only way to turn one of
/// these into a stored point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMoodPoint {
    pub subject_id: Value,
    pub message_id: Value,
    pub timestamp: Value,
    pub mood: Value,
    pub energy: Value,
    pub label: Value,
    pub emotions: Value,
    pub rationale: Value,
}

impl RawMoodPoint {
    /// A candidate with just the identity pair set.
    pub fn new(subject_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            subject_id: Value::String(subject_id.into()),
            message_id: Value::String(message_id.into()),
            ..Self::default()
        }
    }

    pub fn with_timestamp(mut self, timestamp_ms: i64) -> Self {
        self.timestamp = Value::from(timestamp_ms);
        self
    }

    pub fn with_scores(mut self, mood: f64, energy: f64) -> Self {
        self.mood = Value::from(mood);
        self.energy = Value::from(energy);
        self
    }

    pub fn with_label(mut self, label: MoodLabel) -> Self {
        self.label = Value::String(label.as_str().to_string());
        self
    }

    pub fn with_emotions<I, T>(mut self, emotions: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.emotions = Value::Array(
            emotions
                .into_iter()
                .map(|e| Value::String(e.into()))
                .collect(),
        );
        self
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Value::String(rationale.into());
        self
    }
}

/// Sanitize a candidate point, or reject it when the identity pair is
/// missing or empty.
///
/// Coercions, in order:
/// - `timestamp`: integer/float milliseconds or an RFC 3339 string;
///   anything unparsable becomes `now_ms`.
/// - `mood`/`energy`: rounded to the nearest integer and clamped into
///   [0,10]; non-numeric input becomes 0.
/// - `label`: kept only when it is exactly one of the three canonical
///   strings, otherwise derived from the clamped mood.
/// - `emotions`: arrays truncated to five entries, non-string elements
///   stringified; anything else becomes empty.
/// - `rationale`: strings truncated to 400 characters; anything else
///   becomes empty.
pub fn sanitize_point(raw: &RawMoodPoint, now_ms: i64) -> Option<MoodPoint> {
    let subject_id = non_empty_string(&raw.subject_id)?;
    let message_id = non_empty_string(&raw.message_id)?;

    let mood = coerce_score(&raw.mood);
    let label = raw
        .label
        .as_str()
        .and_then(MoodLabel::parse)
        .unwrap_or_else(|| MoodLabel::from_mood(mood));

    Some(MoodPoint {
        id: MoodPoint::derive_id(&subject_id, &message_id),
        subject_id,
        message_id,
        timestamp: coerce_timestamp(&raw.timestamp, now_ms),
        mood,
        energy: coerce_score(&raw.energy),
        label,
        emotions: coerce_emotions(&raw.emotions),
        rationale: coerce_rationale(&raw.rationale),
    })
}

fn non_empty_string(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn coerce_score(value: &Value) -> u8 {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() => n.round().clamp(0.0, 10.0) as u8,
        _ => 0,
    }
}

fn coerce_timestamp(value: &Value, now_ms: i64) -> i64 {
    match value {
        Value::Number(n) => {
            if let Some(ms) = n.as_i64() {
                return ms;
            }
            match n.as_f64() {
                Some(f) if f.is_finite() => f.round() as i64,
                _ => now_ms,
            }
        }
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.timestamp_millis())
            .or_else(|_| s.parse::<i64>())
            .unwrap_or(now_ms),
        _ => now_ms,
    }
}

fn coerce_emotions(value: &Value) -> Vec<String> {
    let Value::Array(items) = value else {
        return Vec::new();
    };

    items
        .iter()
        .take(MAX_EMOTIONS)
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

fn coerce_rationale(value: &Value) -> String {
    match value {
        Value::String(s) => s.chars().take(MAX_RATIONALE_CHARS).collect(),
        _ => String::new(),
    }
}
