//! Image generation.
//!
//! Two routes exist: [`generate_image`], a single call returning text and an
//! optional data URI, and [`image_model_reply`], used when the selected model
//! is the image-generation model. The latter retries once against
//! [`IMAGE_FALLBACK_MODEL`] with explicit safety settings when the first
//! response carries no candidate.

use anyhow::Result;
use providers::gemini::{GenerationConfig, SafetySetting};
use providers::{GenerateRequest, GenerateResponse, GenerativeProvider};
use shared::models::ModelType;

pub const IMAGE_FALLBACK_MODEL: &str = "gemini-2.0-flash-exp";
pub const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

pub const DEFAULT_IMAGE_TEXT: &str = "Here's the generated image:";
pub const NO_IMAGE_TEXT: &str =
    "Sorry, I couldn't generate an image. Please try again with a different prompt.";
pub const IMAGE_ERROR_TEXT: &str = "Sorry, there was an error generating the image. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub text: String,
    /// `data:image/png;base64,...`
    pub image_url: Option<String>,
}

impl GeneratedImage {
    /// Markdown body of the reply message.
    pub fn to_markdown(&self) -> String {
        match &self.image_url {
            Some(url) => format!("{}\n\n![Generated Image]({})", self.text, url),
            None => self.text.clone(),
        }
    }
}

fn generation_config() -> GenerationConfig {
    GenerationConfig::sampling(0.7, 40, 0.9, 2048).with_candidate_count(4)
}

pub async fn try_generate_image(provider: &dyn GenerativeProvider, prompt: &str) -> Result<GeneratedImage> {
    let request = GenerateRequest::prompt(prompt).with_config(generation_config());
    let response = provider
        .generate_content(ModelType::Gemini15Pro.as_str(), &request)
        .await?;

    if response.parts().is_empty() {
        return Ok(GeneratedImage {
            text: NO_IMAGE_TEXT.to_string(),
            image_url: None,
        });
    }

    let text = response
        .parts()
        .iter()
        .filter_map(|p| p.text.as_deref())
        .find(|t| !t.is_empty())
        .unwrap_or(DEFAULT_IMAGE_TEXT)
        .to_string();
    let image_url = response
        .first_inline_data()
        .map(|d| format!("data:image/png;base64,{}", d.data));
    Ok(GeneratedImage { text, image_url })
}

/// Never fails; errors become a fixed message.
pub async fn generate_image(provider: &dyn GenerativeProvider, prompt: &str) -> GeneratedImage {
    match try_generate_image(provider, prompt).await {
        Ok(image) => image,
        Err(e) => {
            tracing::error!(error = %e, "image generation failed");
            GeneratedImage {
                text: IMAGE_ERROR_TEXT.to_string(),
                image_url: None,
            }
        }
    }
}

/// Every text part followed by a blank line, then every JPEG part as a
/// markdown image. `None` when nothing usable came back.
pub fn assemble_image_message(response: &GenerateResponse) -> Option<String> {
    let parts = response.parts();
    let mut message = String::new();

    for part in parts {
        if let Some(text) = &part.text {
            message.push_str(text);
            message.push_str("\n\n");
        }
    }
    for part in parts {
        if let Some(data) = &part.inline_data {
            if data.mime_type == "image/jpeg" {
                message.push_str(&format!("![Image générée](data:image/jpeg;base64,{})", data.data));
            }
        }
    }

    if message.is_empty() {
        None
    } else {
        Some(message)
    }
}

fn image_model_config() -> GenerationConfig {
    GenerationConfig::sampling(0.1, 10, 0.5, 512)
}

/// Reply for a turn sent while the image-generation model is selected.
///
/// `Err` means the first call itself failed; `Ok(None)` means nothing could
/// be generated, including when the fallback call fails.
pub async fn image_model_reply(provider: &dyn GenerativeProvider, text: &str) -> Result<Option<String>> {
    let prompt = format!("Génère{}", text);
    let request = GenerateRequest::prompt(prompt.clone()).with_config(image_model_config());
    let response = provider
        .generate_content(ModelType::Gemini20Flash.as_str(), &request)
        .await?;

    if response.has_candidates() {
        return Ok(assemble_image_message(&response));
    }

    tracing::info!("no candidates returned, retrying with {}", IMAGE_FALLBACK_MODEL);
    let fallback = GenerateRequest::prompt(prompt)
        .with_config(image_model_config())
        .with_safety_settings(SafetySetting::all_categories(SAFETY_THRESHOLD));
    match provider.generate_content(IMAGE_FALLBACK_MODEL, &fallback).await {
        Ok(response) => Ok(assemble_image_message(&response)),
        Err(e) => {
            tracing::error!(error = %e, "fallback image generation failed");
            Ok(None)
        }
    }
}
