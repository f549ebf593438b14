//! Conversation store
//!
//! Owns the conversation list, the current-conversation pointer, the
//! selected model and UI flags. Every mutation goes through one write lock
//! and is persisted before the lock is released, so the on-disk record
//! always reflects the latest state.

use crate::persistence::{MemoryStorage, StateStorage};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared::chat::{Conversation, Message, MessageType};
use shared::models::ModelType;

/// Everything the store persists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatState {
    #[serde(default)]
    pub conversations: Vec<Conversation>,
    #[serde(default)]
    pub current_conversation: Option<String>,
    #[serde(default)]
    pub selected_model: ModelType,
    #[serde(default)]
    pub is_mobile_menu_open: bool,
}

impl ChatState {
    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    fn conversation_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    /// The current conversation, if the pointer is set and valid.
    pub fn current(&self) -> Option<&Conversation> {
        self.current_conversation
            .as_deref()
            .and_then(|id| self.conversation(id))
    }

    fn add_conversation(&mut self) -> String {
        let conversation = Conversation::new();
        let id = conversation.id.clone();
        self.conversations.insert(0, conversation);
        self.current_conversation = Some(id.clone());
        id
    }
}

/// Result of appending a message
#[derive(Debug, Clone)]
pub struct AppendOutcome {
    pub conversation_id: String,
    pub message: Message,
    /// First message of the conversation and written by the user
    pub needs_title: bool,
}

pub struct ConversationStore {
    state: RwLock<ChatState>,
    storage: Box<dyn StateStorage>,
}

impl ConversationStore {
    /// Load the persisted state, starting fresh when there is none or it
    /// cannot be read.
    pub fn open(storage: Box<dyn StateStorage>) -> Self {
        let state = match storage.load() {
            Ok(Some(state)) => state,
            Ok(None) => ChatState::default(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read saved conversations, starting fresh");
                ChatState::default()
            }
        };
        Self {
            state: RwLock::new(state),
            storage,
        }
    }

    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryStorage::new()))
    }

    fn update<R>(&self, f: impl FnOnce(&mut ChatState) -> R) -> R {
        let mut state = self.state.write();
        let result = f(&mut state);
        if let Err(e) = self.storage.save(&state) {
            tracing::error!(error = %e, "failed to persist conversations");
        }
        result
    }

    /// Immutable copy of the whole state
    pub fn snapshot(&self) -> ChatState {
        self.state.read().clone()
    }

    pub fn conversation(&self, id: &str) -> Option<Conversation> {
        self.state.read().conversation(id).cloned()
    }

    pub fn current(&self) -> Option<Conversation> {
        self.state.read().current().cloned()
    }

    pub fn current_id(&self) -> Option<String> {
        self.state.read().current_conversation.clone()
    }

    pub fn selected_model(&self) -> ModelType {
        self.state.read().selected_model
    }

    pub fn is_mobile_menu_open(&self) -> bool {
        self.state.read().is_mobile_menu_open
    }

    /// Create an empty conversation at the top of the list and make it current.
    pub fn add_conversation(&self) -> String {
        self.update(|state| state.add_conversation())
    }

    /// Remove a conversation. The list is never left empty: deleting the
    /// last one replaces it with a fresh current conversation.
    pub fn delete_conversation(&self, id: &str) {
        self.update(|state| {
            state.conversations.retain(|c| c.id != id);
            if state.current_conversation.as_deref() == Some(id) {
                state.current_conversation = None;
            }
            if state.conversations.is_empty() {
                state.add_conversation();
            }
        })
    }

    /// Point at a conversation. Unknown ids are accepted; `current()` then
    /// returns `None`.
    pub fn select_conversation(&self, id: &str) {
        self.update(|state| state.current_conversation = Some(id.to_string()))
    }

    pub fn edit_conversation(&self, id: &str, title: &str) {
        self.update(|state| {
            if let Some(conv) = state.conversation_mut(id) {
                conv.title = title.to_string();
            }
        })
    }

    /// Append to the current conversation, creating one first if needed.
    pub fn append_message(&self, content: impl Into<String>, kind: MessageType) -> AppendOutcome {
        let message = Message::new(content, kind);
        self.update(|state| {
            let existing = state.current().map(|conv| conv.id.clone());
            let conversation_id = match existing {
                Some(id) => id,
                None => state.add_conversation(),
            };
            let mut needs_title = false;
            if let Some(conv) = state.conversation_mut(&conversation_id) {
                needs_title = conv.is_empty() && kind == MessageType::User;
                conv.push(message.clone());
            }
            AppendOutcome {
                conversation_id,
                message,
                needs_title,
            }
        })
    }

    /// Title update dispatched once a summary is ready.
    pub fn apply_title(&self, conversation_id: &str, title: &str) {
        self.edit_conversation(conversation_id, title)
    }

    pub fn set_selected_model(&self, model: ModelType) {
        self.update(|state| state.selected_model = model)
    }

    pub fn set_mobile_menu_open(&self, open: bool) {
        self.update(|state| state.is_mobile_menu_open = open)
    }
}
