//! AI gateway
//!
//! Sits between the conversation store and the provider: appends the user's
//! message, decides which kind of provider call a turn needs, and appends
//! the reply. Provider failures never escape a turn; they become one of the
//! fixed apology messages in [`replies`].

use providers::GenerativeProvider;
use services::{AppendOutcome, ConversationStore};
use shared::chat::{Message, MessageType};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub mod files;
pub mod image;
pub mod intent;
pub mod title;
pub mod turn;

#[cfg(test)]
mod testing;

pub use files::{Attachment, AttachmentError};
pub use image::GeneratedImage;
pub use turn::{RejectReason, TurnInput, TurnOutcome, TurnState, TurnStatus};

/// Fixed replies appended as AI messages when a turn fails
pub mod replies {
    pub const CHAT_ERROR: &str =
        "Désolé, une erreur est survenue. Veuillez vérifier votre clé API et réessayer.";
    pub const FILE_ERROR: &str = "Désolé, une erreur est survenue lors de l'analyse du fichier.";
    pub const IMAGE_MODEL_ERROR: &str = "Désolé, je n'ai pas pu générer l'image demandée. Veuillez réessayer avec une description différente.";
    pub const IMAGE_REQUEST_ERROR: &str =
        "Désolé, une erreur est survenue lors de la génération de l'image.";
}

/// A message that was appended, plus the pending re-title task if it was the
/// conversation's first user message.
pub struct Appended {
    pub outcome: AppendOutcome,
    pub retitle: Option<JoinHandle<()>>,
}

pub struct Gateway {
    provider: Arc<dyn GenerativeProvider>,
    store: Arc<ConversationStore>,
    creator_attribution: String,
    busy: AtomicBool,
}

impl Gateway {
    pub fn new(provider: Arc<dyn GenerativeProvider>, store: Arc<ConversationStore>) -> Self {
        Self {
            provider,
            store,
            creator_attribution: "Gaya Kaci".to_string(),
            busy: AtomicBool::new(false),
        }
    }

    pub fn with_creator_attribution(mut self, attribution: impl Into<String>) -> Self {
        self.creator_attribution = attribution.into();
        self
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub fn state(&self) -> TurnState {
        if self.busy.load(Ordering::Acquire) {
            TurnState::Sending
        } else {
            TurnState::Idle
        }
    }

    /// Append synchronously; a title summary is scheduled in the background
    /// when this is the conversation's first user message.
    pub fn add_message(&self, content: impl Into<String>, kind: MessageType) -> Appended {
        let outcome = self.store.append_message(content, kind);
        let retitle = self.maybe_retitle(&outcome);
        Appended { outcome, retitle }
    }

    /// Spawn the title task for a fresh append. Only the appended message is
    /// summarised. Outside a Tokio runtime the title is left unchanged.
    pub fn maybe_retitle(&self, outcome: &AppendOutcome) -> Option<JoinHandle<()>> {
        if !outcome.needs_title {
            return None;
        }
        let runtime = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(error = %e, conversation = %outcome.conversation_id, "no runtime, title not generated");
                return None;
            }
        };
        let provider = Arc::clone(&self.provider);
        let store = Arc::clone(&self.store);
        let conversation_id = outcome.conversation_id.clone();
        let messages = vec![outcome.message.clone()];

        Some(runtime.spawn(async move {
            let title = title::generate_conversation_title(provider.as_ref(), &messages).await;
            store.apply_title(&conversation_id, &title);
        }))
    }

    pub async fn generate_conversation_title(&self, messages: &[Message]) -> String {
        title::generate_conversation_title(self.provider.as_ref(), messages).await
    }

    pub async fn generate_image(&self, prompt: &str) -> GeneratedImage {
        image::generate_image(self.provider.as_ref(), prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{prompt_text, text_response, ScriptedProvider};
    use shared::chat::DEFAULT_TITLE;

    fn gateway(provider: ScriptedProvider) -> (Gateway, Arc<ScriptedProvider>) {
        let provider = Arc::new(provider);
        let store = Arc::new(ConversationStore::in_memory());
        (Gateway::new(provider.clone(), store), provider)
    }

    #[tokio::test]
    async fn test_first_user_message_triggers_single_title_call() {
        let (gw, provider) = gateway(ScriptedProvider::new(|_, _| Ok(text_response("Salutations"))));
        let id = gw.store().add_conversation();

        let appended = gw.add_message("hello", MessageType::User);
        // Append is visible before the title resolves
        assert_eq!(gw.store().conversation(&id).unwrap().messages.len(), 1);

        appended.retitle.expect("title task").await.unwrap();
        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        let prompt = prompt_text(&calls[0].1);
        assert!(prompt.contains("Conversation:\nUtilisateur: hello\n\nTitre:"));
        assert_eq!(gw.store().conversation(&id).unwrap().title, "Salutations");
    }

    #[tokio::test]
    async fn test_later_messages_do_not_retitle() {
        let (gw, provider) = gateway(ScriptedProvider::new(|_, _| Ok(text_response("Titre"))));
        gw.store().add_conversation();
        if let Some(task) = gw.add_message("one", MessageType::User).retitle {
            task.await.unwrap();
        }
        assert!(gw.add_message("two", MessageType::User).retitle.is_none());
        assert!(gw.add_message("reply", MessageType::Ai).retitle.is_none());
        assert_eq!(provider.calls().len(), 1);
    }

    #[test]
    fn test_add_message_without_runtime_skips_title() {
        let (gw, provider) = gateway(ScriptedProvider::new(|_, _| Ok(text_response("Titre"))));
        let id = gw.store().add_conversation();

        let appended = gw.add_message("hello", MessageType::User);
        assert!(appended.outcome.needs_title);
        assert!(appended.retitle.is_none());

        let conv = gw.store().conversation(&id).unwrap();
        assert_eq!(conv.messages.len(), 1);
        assert_eq!(conv.title, DEFAULT_TITLE);
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_ai_first_message_keeps_default_title() {
        let (gw, provider) = gateway(ScriptedProvider::new(|_, _| Ok(text_response("Titre"))));
        let id = gw.store().add_conversation();
        assert!(gw.add_message("Bienvenue", MessageType::Ai).retitle.is_none());
        assert!(provider.calls().is_empty());
        assert_eq!(gw.store().conversation(&id).unwrap().title, DEFAULT_TITLE);
    }
}
