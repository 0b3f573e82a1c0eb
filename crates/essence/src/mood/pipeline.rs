//! Scoring pipeline
//!
//! Walks the recent user messages of a subject's conversation and makes
//! sure each one has a mood point: skip what the seen-index already
//! covers, score the rest, feed every result through the dedup-safe
//! append. Runs after each message exchange, so every step must be
//! cheap and re-runnable.

use crate::conversation::{ConversationLog, Sender};
use crate::mood::analyzer::MoodScorer;
use crate::mood::sanitize::RawMoodPoint;
use crate::mood::store::SeriesStore;
use crate::storage::KvStore;

/// How many trailing user messages to consider per run.
pub const DEFAULT_RECENT_MESSAGES: usize = 12;

/// Orchestrates conversation log, scorer, and series store.
pub struct ScoringPipeline<S: KvStore, M: MoodScorer> {
    series: SeriesStore<S>,
    log: ConversationLog<S>,
    scorer: M,
    recent_messages: usize,
}

impl<S: KvStore, M: MoodScorer> ScoringPipeline<S, M> {
    pub fn new(series: SeriesStore<S>, log: ConversationLog<S>, scorer: M) -> Self {
        Self {
            series,
            log,
            scorer,
            recent_messages: DEFAULT_RECENT_MESSAGES,
        }
    }

    pub fn with_recent_messages(mut self, recent_messages: usize) -> Self {
        self.recent_messages = recent_messages;
        self
    }

    pub fn series(&self) -> &SeriesStore<S> {
        &self.series
    }

    pub fn log(&self) -> &ConversationLog<S> {
        &self.log
    }

    /// Score every recent user message that has no mood point yet.
    ///
    /// Returns the number of points actually added. Re-running with no
    /// new messages adds nothing.
    pub fn ensure_scores(&self, subject_id: &str) -> usize {
        let messages = self.log.messages(subject_id);
        let user_messages: Vec<_> = messages
            .into_iter()
            .filter(|m| m.sender == Sender::User)
            .collect();

        let skip = user_messages.len().saturating_sub(self.recent_messages);
        let mut added = 0;

        for message in user_messages.into_iter().skip(skip) {
            let message_id = message.id.to_string();
            if self.series.has_score(subject_id, &message_id) {
                continue;
            }

            let analysis = self.scorer.score(&message.content);
            let raw = RawMoodPoint::new(subject_id, message_id)
                .with_timestamp(message.timestamp.timestamp_millis())
                .with_scores(f64::from(analysis.mood), f64::from(analysis.energy))
                .with_label(analysis.label);

            if self.series.add_point(&raw).is_added() {
                added += 1;
            }
        }

        if added > 0 {
            tracing::debug!("Scored {added} new messages for {subject_id}");
        }

        added
    }
}
