//! Conversation titles summarised by the provider.

use providers::router::ModelRouter;
use providers::{GenerateRequest, GenerativeProvider};
use shared::chat::{Message, DEFAULT_TITLE};
use shared::models::TITLE_MODELS;

pub fn build_title_prompt(messages: &[Message]) -> String {
    let transcript = messages
        .iter()
        .map(|m| format!("{}: {}", m.kind.transcript_label(), m.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyse cette conversation et génère un titre court et pertinent (maximum 30 caractères) qui résume le sujet principal. Le titre doit être en français et ne doit pas contenir de ponctuation finale.\n\nConversation:\n{}\n\nTitre:",
        transcript
    )
}

/// Never fails: falls back to the default title when no model answers.
pub async fn generate_conversation_title(provider: &dyn GenerativeProvider, messages: &[Message]) -> String {
    let request = GenerateRequest::prompt(build_title_prompt(messages));
    match ModelRouter::new(provider, TITLE_MODELS).generate_text(&request).await {
        Ok((model, title)) => {
            tracing::debug!(model = model.as_str(), %title, "conversation titled");
            title
        }
        Err(e) => {
            tracing::error!(error = %e, "every title model failed");
            DEFAULT_TITLE.to_string()
        }
    }
}
