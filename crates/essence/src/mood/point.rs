//! Mood point types
//!
//! Defines the canonical sanitized observation stored in a subject's
//! series, and the three-valued label derived from the mood score.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum number of points kept per subject; oldest are dropped first.
pub const MAX_SERIES_POINTS: usize = 200;

/// Maximum number of emotion tags kept on a single point.
pub const MAX_EMOTIONS: usize = 5;

/// Maximum length of the free-text rationale, in characters.
pub const MAX_RATIONALE_CHARS: usize = 400;

/// One sanitized mood observation tied to a single user message.
///
/// Field names serialize as camelCase so blocks written by earlier
/// versions of the app parse unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MoodPoint {
    /// Derived identity, `subjectId:messageId`.
    pub id: String,
    /// The persona/thread this point belongs to.
    pub subject_id: String,
    /// The source message; unique within a subject's series.
    pub message_id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Valence, 0 (very negative) to 10 (very positive).
    pub mood: u8,
    /// Arousal/activation, 0 to 10.
    pub energy: u8,
    /// Coarse label, consistent with `mood` unless explicitly supplied.
    pub label: MoodLabel,
    /// Up to five short emotion tags.
    pub emotions: Vec<String>,
    /// Free-text rationale, truncated to 400 characters.
    pub rationale: String,
}

impl MoodPoint {
    /// The derived identity for a subject/message pair.
    pub fn derive_id(subject_id: &str, message_id: &str) -> String {
        format!("{subject_id}:{message_id}")
    }
}

/// Coarse sentiment label attached to every mood point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoodLabel {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl MoodLabel {
    /// Derive the label from a clamped mood score.
    pub fn from_mood(mood: u8) -> Self {
        if mood >= 7 {
            MoodLabel::Positive
        } else if mood <= 4 {
            MoodLabel::Negative
        } else {
            MoodLabel::Neutral
        }
    }

    /// Parse one of the three canonical strings, rejecting anything else.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Positive" => Some(MoodLabel::Positive),
            "Neutral" => Some(MoodLabel::Neutral),
            "Negative" => Some(MoodLabel::Negative),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoodLabel::Positive => "Positive",
            MoodLabel::Neutral => "Neutral",
            MoodLabel::Negative => "Negative",
        }
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_derivation_thresholds() {
        assert_eq!(MoodLabel::from_mood(0), MoodLabel::Negative);
        assert_eq!(MoodLabel::from_mood(4), MoodLabel::Negative);
        assert_eq!(MoodLabel::from_mood(5), MoodLabel::Neutral);
        assert_eq!(MoodLabel::from_mood(6), MoodLabel::Neutral);
        assert_eq!(MoodLabel::from_mood(7), MoodLabel::Positive);
        assert_eq!(MoodLabel::from_mood(10), MoodLabel::Positive);
    }

    #[test]
    fn test_label_parse_accepts_only_canonical_values() {
        assert_eq!(MoodLabel::parse("Positive"), Some(MoodLabel::Positive));
        assert_eq!(MoodLabel::parse("Neutral"), Some(MoodLabel::Neutral));
        assert_eq!(MoodLabel::parse("Negative"), Some(MoodLabel::Negative));

        assert_eq!(MoodLabel::parse("positive"), None);
        assert_eq!(MoodLabel::parse("POSITIVE"), None);
        assert_eq!(MoodLabel::parse("Great"), None);
        assert_eq!(MoodLabel::parse(""), None);
    }

    #[test]
    fn test_point_serializes_camel_case() {
        let point = MoodPoint {
            id: "luna:m1".to_string(),
            subject_id: "luna".to_string(),
            message_id: "m1".to_string(),
            timestamp: 1_700_000_000_000,
            mood: 8,
            energy: 6,
            label: MoodLabel::Positive,
            emotions: vec!["joy".to_string()],
            rationale: "upbeat message".to_string(),
        };

        let json = serde_json::to_value(&point).expect("Failed to serialize point");
        assert_eq!(json["subjectId"], "luna");
        assert_eq!(json["messageId"], "m1");
        assert_eq!(json["label"], "Positive");

        let back: MoodPoint = serde_json::from_value(json).expect("Failed to deserialize point");
        assert_eq!(back, point);
    }

    #[test]
    fn test_point_deserializes_with_missing_optional_fields() {
        let json = r#"{
            "id": "luna:m2",
            "subjectId": "luna",
            "messageId": "m2",
            "timestamp": 1700000000000,
            "mood": 3,
            "energy": 2,
            "label": "Negative"
        }"#;

        let point: MoodPoint = serde_json::from_str(json).expect("Failed to parse point");
        assert!(point.emotions.is_empty());
        assert!(point.rationale.is_empty());
    }

    #[test]
    fn test_derive_id() {
        assert_eq!(MoodPoint::derive_id("luna", "m1"), "luna:m1");
    }
}
