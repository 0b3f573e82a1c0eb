//! Conversation history
//!
//! Per-subject sliding-window message log backing the chat view and the
//! scoring pipeline. Persisted as one JSON block per subject with the
//! same degrade-to-empty read semantics as the mood series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::KvStore;

const CONVERSATION_KEY_PREFIX: &str = "essence:conversation:";

/// Default sliding-window size per subject.
pub const MAX_CONVERSATION_MESSAGES: usize = 100;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Persona,
}

/// One chat message in a subject's conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Convenience constructor for a user-authored message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content)
    }

    /// Convenience constructor for a persona reply.
    pub fn persona(content: impl Into<String>) -> Self {
        Self::new(Sender::Persona, content)
    }
}

/// Sliding-window conversation log on top of a [`KvStore`].
pub struct ConversationLog<S: KvStore> {
    kv: S,
    max_messages: usize,
}

impl<S: KvStore> ConversationLog<S> {
    /// Create a log with the standard 100-message window.
    pub fn new(kv: S) -> Self {
        Self::with_max_messages(kv, MAX_CONVERSATION_MESSAGES)
    }

    /// Create a log with a custom window size.
    pub fn with_max_messages(kv: S, max_messages: usize) -> Self {
        Self { kv, max_messages }
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    fn key(subject_id: &str) -> String {
        format!("{CONVERSATION_KEY_PREFIX}{subject_id}")
    }

    /// The subject ids with a persisted conversation block.
    pub fn subjects(&self) -> Vec<String> {
        let mut subjects: Vec<String> = self
            .kv
            .keys()
            .into_iter()
            .filter_map(|k| k.strip_prefix(CONVERSATION_KEY_PREFIX).map(str::to_string))
            .collect();
        subjects.sort();
        subjects
    }

    /// All stored messages for a subject, oldest first. Absent or
    /// unreadable storage yields an empty log.
    pub fn messages(&self, subject_id: &str) -> Vec<Message> {
        self.kv
            .get(&Self::key(subject_id))
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// The most recent `count` messages, oldest first.
    pub fn recent(&self, subject_id: &str, count: usize) -> Vec<Message> {
        let messages = self.messages(subject_id);
        let skip = messages.len().saturating_sub(count);
        messages.into_iter().skip(skip).collect()
    }

    /// Append a message, enforcing the sliding window, and persist.
    pub fn append(&self, subject_id: &str, message: Message) {
        let mut messages = self.messages(subject_id);
        messages.push(message);

        if messages.len() > self.max_messages {
            let excess = messages.len() - self.max_messages;
            messages.drain(..excess);
        }

        let json = match serde_json::to_string(&messages) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize conversation for {subject_id}: {e}");
                return;
            }
        };

        if let Err(e) = self.kv.set(&Self::key(subject_id), &json) {
            tracing::warn!("Failed to save conversation for {subject_id}: {e}");
        }
    }

    /// Delete a subject's conversation.
    pub fn clear(&self, subject_id: &str) {
        if let Err(e) = self.kv.remove(&Self::key(subject_id)) {
            tracing::warn!("Failed to clear conversation for {subject_id}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_append_and_read_back() {
        let log = ConversationLog::new(MemoryStore::new());

        log.append("luna", Message::user("hello"));
        log.append("luna", Message::persona("hi there"));

        let messages = log.messages("luna");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[0].content, "hello");
        assert_eq!(messages[1].sender, Sender::Persona);
    }

    #[test]
    fn test_subjects_are_isolated() {
        let log = ConversationLog::new(MemoryStore::new());

        log.append("luna", Message::user("for luna"));
        assert!(log.messages("aria").is_empty());
    }

    #[test]
    fn test_sliding_window_drops_oldest() {
        let log = ConversationLog::with_max_messages(MemoryStore::new(), 3);

        for i in 0..5 {
            log.append("luna", Message::user(format!("msg {i}")));
        }

        let messages = log.messages("luna");
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "msg 2");
        assert_eq!(messages[2].content, "msg 4");
    }

    #[test]
    fn test_recent_returns_newest_in_order() {
        let log = ConversationLog::new(MemoryStore::new());

        for i in 0..6 {
            log.append("luna", Message::user(format!("msg {i}")));
        }

        let recent = log.recent("luna", 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "msg 4");
        assert_eq!(recent[1].content, "msg 5");

        assert_eq!(log.recent("luna", 100).len(), 6);
    }

    #[test]
    fn test_corrupt_block_degrades_to_empty() {
        let kv = MemoryStore::new();
        kv.set("essence:conversation:luna", "not json").unwrap();
        let log = ConversationLog::new(kv);

        assert!(log.messages("luna").is_empty());
    }

    #[test]
    fn test_clear_removes_history() {
        let log = ConversationLog::new(MemoryStore::new());
        log.append("luna", Message::user("hello"));

        log.clear("luna");
        assert!(log.messages("luna").is_empty());
        assert!(log.subjects().is_empty());
    }
}
