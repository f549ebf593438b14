//! One chat turn: `Idle -> Sending -> Idle`.
//!
//! A turn appends the user's message, routes to the right provider call and
//! appends exactly one reply. Only one turn runs at a time per gateway;
//! submissions while one is in flight are rejected, not queued.

use crate::files::{self, Attachment};
use crate::image;
use crate::intent::{is_creator_question, is_image_generation_request};
use crate::replies;
use crate::Gateway;
use anyhow::Result;
use providers::GenerateRequest;
use shared::agent_api::to_history;
use shared::chat::{Message, MessageType};
use shared::models::{image_generation_model, ModelType};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Sending,
}

#[derive(Debug, Default)]
pub struct TurnInput {
    pub text: String,
    pub attachment: Option<Attachment>,
}

impl TurnInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No text and no attachment
    Empty,
    /// Another turn is still in flight
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    Rejected(RejectReason),
    Replied,
    /// A fixed apology was appended instead of a provider answer
    Failed,
}

#[derive(Debug)]
pub struct TurnOutcome {
    pub status: TurnStatus,
    pub reply: Option<Message>,
    /// Title task scheduled by the user's message, if any
    pub retitle: Option<JoinHandle<()>>,
}

impl TurnOutcome {
    fn rejected(reason: RejectReason) -> Self {
        Self {
            status: TurnStatus::Rejected(reason),
            reply: None,
            retitle: None,
        }
    }
}

/// Clears the in-flight flag on every exit path.
struct SendingGuard<'a>(&'a AtomicBool);

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Gateway {
    fn begin_turn(&self) -> Option<SendingGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SendingGuard(&self.busy))
    }

    fn finish(&self, status: TurnStatus, reply: &str, retitle: Option<JoinHandle<()>>) -> TurnOutcome {
        let reply = self.store.append_message(reply, MessageType::Ai).message;
        TurnOutcome {
            status,
            reply: Some(reply),
            retitle,
        }
    }

    pub async fn submit(&self, input: TurnInput) -> TurnOutcome {
        let text = input.text.trim().to_string();
        if text.is_empty() && input.attachment.is_none() {
            return TurnOutcome::rejected(RejectReason::Empty);
        }
        let Some(_guard) = self.begin_turn() else {
            return TurnOutcome::rejected(RejectReason::Busy);
        };

        if is_image_generation_request(&text) {
            return self.image_request_turn(&text).await;
        }
        if let Some(attachment) = input.attachment {
            return self.file_turn(&text, &attachment).await;
        }
        self.text_turn(&text).await
    }

    /// Explicit image-generation route, bypassing the keyword heuristic.
    pub async fn submit_image_request(&self, prompt: &str) -> TurnOutcome {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return TurnOutcome::rejected(RejectReason::Empty);
        }
        let Some(_guard) = self.begin_turn() else {
            return TurnOutcome::rejected(RejectReason::Busy);
        };
        self.image_request_turn(prompt).await
    }

    async fn image_request_turn(&self, text: &str) -> TurnOutcome {
        let appended = self.add_message(text, MessageType::User);

        match image::try_generate_image(self.provider.as_ref(), text).await {
            Ok(generated) => self.finish(TurnStatus::Replied, &generated.to_markdown(), appended.retitle),
            Err(e) => {
                tracing::error!(error = %e, "image request failed");
                self.finish(TurnStatus::Failed, replies::IMAGE_REQUEST_ERROR, appended.retitle)
            }
        }
    }

    async fn file_turn(&self, text: &str, attachment: &Attachment) -> TurnOutcome {
        let appended = self.add_message(attachment.label(text), MessageType::User);

        match files::analyze_file(self.provider.as_ref(), attachment, text).await {
            Ok(answer) => self.finish(TurnStatus::Replied, &answer, appended.retitle),
            Err(e) => {
                tracing::error!(error = %e, file = %attachment.name, "file analysis failed");
                self.finish(TurnStatus::Failed, replies::FILE_ERROR, appended.retitle)
            }
        }
    }

    async fn text_turn(&self, text: &str) -> TurnOutcome {
        // History is what the conversation held before this turn
        let history = self
            .store
            .current()
            .map(|c| c.messages)
            .unwrap_or_default();
        let appended = self.add_message(text, MessageType::User);

        if is_creator_question(text) {
            return self.finish(TurnStatus::Replied, &self.creator_attribution, appended.retitle);
        }

        let model = self.store.selected_model();
        if model == image_generation_model() {
            return match image::image_model_reply(self.provider.as_ref(), text).await {
                Ok(Some(message)) => self.finish(TurnStatus::Replied, &message, appended.retitle),
                Ok(None) => self.finish(TurnStatus::Failed, replies::IMAGE_MODEL_ERROR, appended.retitle),
                Err(e) => {
                    tracing::error!(error = %e, "image model call failed");
                    self.finish(TurnStatus::Failed, replies::CHAT_ERROR, appended.retitle)
                }
            };
        }

        match self.chat_reply(model, &history, text).await {
            Ok(answer) => self.finish(TurnStatus::Replied, &answer, appended.retitle),
            Err(e) => {
                tracing::error!(error = %e, model = model.as_str(), "chat turn failed");
                self.finish(TurnStatus::Failed, replies::CHAT_ERROR, appended.retitle)
            }
        }
    }

    async fn chat_reply(&self, model: ModelType, history: &[Message], text: &str) -> Result<String> {
        let request = GenerateRequest::chat(&to_history(history), text);
        let response = self.provider.generate_content(model.as_str(), &request).await?;
        response.text()
    }
}
