//! Plain-text rendering of conversations for the terminal.
//!
//! Markdown is printed as-is, except inline data-URI images which would
//! flood the screen; those are replaced by a short placeholder.

use regex::Regex;
use services::ChatState;
use shared::chat::{Message, MessageType};
use shared::models::ModelType;
use std::sync::OnceLock;

static DATA_IMAGE_REGEX: OnceLock<Regex> = OnceLock::new();

fn data_image_regex() -> &'static Regex {
    DATA_IMAGE_REGEX.get_or_init(|| {
        Regex::new(r"!\[([^\]]*)\]\(data:([a-z]+/[a-z0-9.+-]+);base64,([A-Za-z0-9+/=]*)\)")
            .expect("valid data image regex")
    })
}

pub fn strip_inline_images(content: &str) -> String {
    data_image_regex()
        .replace_all(content, |caps: &regex::Captures| {
            // Base64 expands 3 bytes into 4 chars
            let bytes = caps[3].len() * 3 / 4;
            format!("[{}: {}, ~{} Ko]", &caps[1], &caps[2], bytes / 1024)
        })
        .into_owned()
}

pub fn message(msg: &Message) -> String {
    let who = match msg.kind {
        MessageType::User => "vous",
        MessageType::Ai => "ia",
    };
    format!(
        "[{}] {}> {}",
        msg.timestamp.format("%H:%M"),
        who,
        strip_inline_images(&msg.content)
    )
}

pub fn conversation_list(state: &ChatState) -> String {
    if state.conversations.is_empty() {
        return "Aucune conversation.".to_string();
    }
    state
        .conversations
        .iter()
        .enumerate()
        .map(|(i, conv)| {
            let marker = if state.current_conversation.as_deref() == Some(conv.id.as_str()) {
                '*'
            } else {
                ' '
            };
            format!(
                "{} {:>2}. {} ({} messages, {})",
                marker,
                i + 1,
                conv.title,
                conv.messages.len(),
                conv.timestamp.format("%d/%m %H:%M")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn model_list(selected: ModelType) -> String {
    ModelType::selectable()
        .iter()
        .map(|m| {
            let marker = if *m == selected { '*' } else { ' ' };
            format!("{} {:<24} {}", marker, m.as_str(), m.display_name())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
