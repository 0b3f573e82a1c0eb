//! Heuristic mood analysis
//!
//! A purely lexical fallback scorer for when no remote scoring service
//! is reachable: keyword and emoji hits drive valence, punctuation and
//! capitalization drive energy. Crude, but it keeps the timeline alive
//! offline.

use serde::Serialize;

use crate::mood::point::MoodLabel;

const POSITIVE_WORDS: [&str; 20] = [
    "happy",
    "joy",
    "calm",
    "good",
    "great",
    "love",
    "grateful",
    "proud",
    "peace",
    "excited",
    "hope",
    "confident",
    "relaxed",
    "energized",
    "inspired",
    "playful",
    "content",
    "balanced",
    "curious",
    "glad",
];

const NEGATIVE_WORDS: [&str; 20] = [
    "sad",
    "angry",
    "anxious",
    "stress",
    "stressed",
    "worried",
    "tired",
    "exhausted",
    "down",
    "bad",
    "terrible",
    "awful",
    "overwhelmed",
    "fear",
    "lonely",
    "depressed",
    "guilty",
    "ashamed",
    "frustrated",
    "nervous",
];

const POSITIVE_EMOJI: [&str; 12] = [
    "😀", "😄", "😊", "🙂", "😍", "🥳", "🤩", "😌", "✨", "🌞", "💖", "💫",
];

const NEGATIVE_EMOJI: [&str; 12] = [
    "😞", "😢", "😭", "😡", "😠", "😣", "😖", "😔", "🌧️", "💔", "😫", "😩",
];

/// Maximum absolute sentiment score the normalization expects.
const MAX_SENTIMENT: f64 = 12.0;

/// Maximum raw energy the normalization expects.
const MAX_ENERGY: f64 = 12.0;

/// Result of scoring one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoodAnalysis {
    /// Valence on the shared 0-10 scale (the heuristic only ever emits
    /// 1-10).
    pub mood: u8,
    /// Arousal on the same scale.
    pub energy: u8,
    pub label: MoodLabel,
}

/// The seam to whatever produces mood scores from message text.
///
/// The remote LLM-backed scorer lives outside this crate; callers that
/// need one locally use [`HeuristicScorer`].
pub trait MoodScorer {
    fn score(&self, text: &str) -> MoodAnalysis;
}

/// [`MoodScorer`] backed by [`analyze_text_mood`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScorer;

impl HeuristicScorer {
    pub fn new() -> Self {
        Self
    }
}

impl MoodScorer for HeuristicScorer {
    fn score(&self, text: &str) -> MoodAnalysis {
        analyze_text_mood(text)
    }
}

/// Score a message with the lexical heuristic.
pub fn analyze_text_mood(text: &str) -> MoodAnalysis {
    let lower = text.to_lowercase();

    let mut score: i32 = 0;
    for word in POSITIVE_WORDS {
        if lower.contains(word) {
            score += 2;
        }
    }
    for word in NEGATIVE_WORDS {
        if lower.contains(word) {
            score -= 2;
        }
    }
    for emoji in POSITIVE_EMOJI {
        if text.contains(emoji) {
            score += 2;
        }
    }
    for emoji in NEGATIVE_EMOJI {
        if text.contains(emoji) {
            score -= 2;
        }
    }

    let exclamations = text.matches('!').count() as f64;
    let question_marks = text.matches('?').count() as f64;
    let letters = text.chars().filter(|c| c.is_ascii_alphabetic()).count();
    let uppercase = text.chars().filter(|c| c.is_ascii_uppercase()).count();
    let caps_ratio = if text.is_empty() {
        0.0
    } else {
        uppercase as f64 / letters.max(1) as f64
    };
    let length_factor = (text.chars().count() / 60).min(6) as f64;

    let energy_raw = exclamations * 1.5 + question_marks * 0.5 + caps_ratio * 8.0 + length_factor;

    // A very energetic message nudges a non-negative sentiment upward
    if energy_raw > 6.0 && score >= 0 {
        score += 1;
    }

    let mood = normalize_sentiment(score);
    let energy = normalize_energy(energy_raw);

    MoodAnalysis {
        mood,
        energy,
        label: MoodLabel::from_mood(mood),
    }
}

/// Map a raw sentiment score from [-12,12] onto the 1-10 scale.
fn normalize_sentiment(raw: i32) -> u8 {
    let x = (raw as f64).clamp(-MAX_SENTIMENT, MAX_SENTIMENT);
    let ratio = (x + MAX_SENTIMENT) / (2.0 * MAX_SENTIMENT);
    (ratio * 9.0 + 1.0).round().clamp(1.0, 10.0) as u8
}

/// Map a raw energy score from [0,12] onto the 1-10 scale.
fn normalize_energy(raw: f64) -> u8 {
    let x = raw.clamp(0.0, MAX_ENERGY);
    (x / MAX_ENERGY * 9.0 + 1.0).round().clamp(1.0, 10.0) as u8
}
