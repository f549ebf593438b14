//! Conversation and message types.
//!
//! Messages are immutable once created; a conversation only ever grows by
//! appending, and its title is the one field that changes in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title given to every conversation until a summary replaces it.
pub const DEFAULT_TITLE: &str = "Nouvelle conversation";

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    User,
    Ai,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::User => "user",
            MessageType::Ai => "ai",
        }
    }

    /// Speaker label used when a transcript is written out for the provider.
    pub fn transcript_label(&self) -> &'static str {
        match self {
            MessageType::User => "Utilisateur",
            MessageType::Ai => "Assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(content: impl Into<String>, kind: MessageType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            kind,
            timestamp: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.kind == MessageType::User
    }
}

/// A titled, ordered sequence of messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    /// Last time a message was appended
    pub timestamp: DateTime<Utc>,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.timestamp = Utc::now();
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
