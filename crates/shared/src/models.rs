//! Provider model identifiers and their capabilities.
//!
//! The capability table is ordered: when several models fit an attachment,
//! the first one listed wins.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every model identifier the client knows how to address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelType {
    #[serde(rename = "gemini-1.5-flash")]
    Gemini15Flash,
    #[serde(rename = "gemini-1.5-pro")]
    Gemini15Pro,
    #[serde(rename = "gemini-2.5-flash-preview-04-17")]
    Gemini25FlashPreview,
    #[serde(rename = "gemini-2.0-flash")]
    Gemini20Flash,
    #[serde(rename = "gemini-2.5-pro-preview-03-25")]
    Gemini25ProPreview,
    #[serde(rename = "gemini-2.0-flash-exp-image-generation")]
    Gemini20FlashImageGeneration,
    #[serde(rename = "gemini-2.0-flash-lite")]
    Gemini20FlashLite,
    #[serde(rename = "gemma-3-1b-it")]
    Gemma31bIt,
}

impl ModelType {
    pub fn all() -> &'static [ModelType] {
        &[
            ModelType::Gemini15Flash,
            ModelType::Gemini15Pro,
            ModelType::Gemini25FlashPreview,
            ModelType::Gemini20Flash,
            ModelType::Gemini25ProPreview,
            ModelType::Gemini20FlashImageGeneration,
            ModelType::Gemini20FlashLite,
            ModelType::Gemma31bIt,
        ]
    }

    /// Models offered by the model picker
    pub fn selectable() -> &'static [ModelType] {
        &[
            ModelType::Gemini20Flash,
            ModelType::Gemini15Flash,
            ModelType::Gemini20FlashLite,
            ModelType::Gemma31bIt,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Gemini15Flash => "gemini-1.5-flash",
            ModelType::Gemini15Pro => "gemini-1.5-pro",
            ModelType::Gemini25FlashPreview => "gemini-2.5-flash-preview-04-17",
            ModelType::Gemini20Flash => "gemini-2.0-flash",
            ModelType::Gemini25ProPreview => "gemini-2.5-pro-preview-03-25",
            ModelType::Gemini20FlashImageGeneration => "gemini-2.0-flash-exp-image-generation",
            ModelType::Gemini20FlashLite => "gemini-2.0-flash-lite",
            ModelType::Gemma31bIt => "gemma-3-1b-it",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelType::Gemini15Flash => "Gemini 1.5 Flash",
            ModelType::Gemini15Pro => "Gemini 1.5 Pro",
            ModelType::Gemini25FlashPreview => "Gemini 2.5 Flash (preview)",
            ModelType::Gemini20Flash => "Gemini 2.0 Flash",
            ModelType::Gemini25ProPreview => "Gemini 2.5 Pro (preview)",
            ModelType::Gemini20FlashImageGeneration => "Gemini 2.0 Flash Image Generation",
            ModelType::Gemini20FlashLite => "Gemini 2.0 Flash Lite",
            ModelType::Gemma31bIt => "Gemma 3 1B IT",
        }
    }

    pub fn capabilities(&self) -> Option<ModelCapabilities> {
        MODEL_CAPABILITIES
            .iter()
            .find(|(model, _)| model == self)
            .map(|(_, caps)| *caps)
    }
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::Gemma31bIt
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown model: {0}")]
pub struct UnknownModel(pub String);

impl FromStr for ModelType {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelType::all()
            .iter()
            .copied()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    VeryFast,
    Fast,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextSize {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelCapabilities {
    pub supports_images: bool,
    pub supports_pdf: bool,
    pub can_generate_images: bool,
    pub speed: Speed,
    pub context: ContextSize,
}

impl ModelCapabilities {
    const fn new(supports_images: bool, supports_pdf: bool, speed: Speed, context: ContextSize) -> Self {
        Self {
            supports_images,
            supports_pdf,
            can_generate_images: false,
            speed,
            context,
        }
    }

    /// Whether a file with this MIME type can be sent to the model.
    pub fn accepts(&self, mime_type: &str) -> bool {
        if mime_type.starts_with("image/") {
            self.supports_images
        } else if mime_type == "application/pdf" {
            self.supports_pdf
        } else {
            true
        }
    }
}

pub const MODEL_CAPABILITIES: &[(ModelType, ModelCapabilities)] = &[
    (
        ModelType::Gemini15Flash,
        ModelCapabilities::new(true, true, Speed::Fast, ContextSize::Medium),
    ),
    (
        ModelType::Gemini15Pro,
        ModelCapabilities::new(true, true, Speed::Medium, ContextSize::Large),
    ),
    (
        ModelType::Gemini25FlashPreview,
        ModelCapabilities::new(true, true, Speed::Fast, ContextSize::Large),
    ),
    (
        ModelType::Gemini20Flash,
        ModelCapabilities::new(true, true, Speed::Fast, ContextSize::Medium),
    ),
    (
        ModelType::Gemini20FlashImageGeneration,
        ModelCapabilities {
            supports_images: true,
            supports_pdf: false,
            can_generate_images: true,
            speed: Speed::Fast,
            context: ContextSize::Medium,
        },
    ),
    (
        ModelType::Gemini20FlashLite,
        ModelCapabilities::new(true, true, Speed::VeryFast, ContextSize::Small),
    ),
    (
        ModelType::Gemma31bIt,
        ModelCapabilities::new(false, false, Speed::VeryFast, ContextSize::Small),
    ),
];

/// Used for attachments when no table entry accepts the file type.
pub const FALLBACK_FILE_MODEL: ModelType = ModelType::Gemini25FlashPreview;

/// Models tried, in order, when summarising a conversation into a title.
pub const TITLE_MODELS: &[ModelType] = &[
    ModelType::Gemini20Flash,
    ModelType::Gemini15Flash,
    ModelType::Gemini15Pro,
];

/// All models able to receive a file of the given MIME type, in table order.
pub fn models_accepting(mime_type: &str) -> Vec<ModelType> {
    MODEL_CAPABILITIES
        .iter()
        .filter(|(_, caps)| caps.accepts(mime_type))
        .map(|(model, _)| *model)
        .collect()
}

/// Pick the model an attachment is analysed with.
pub fn best_model_for(mime_type: &str) -> ModelType {
    models_accepting(mime_type)
        .first()
        .copied()
        .unwrap_or(FALLBACK_FILE_MODEL)
}

/// The model dedicated to image generation.
pub fn image_generation_model() -> ModelType {
    MODEL_CAPABILITIES
        .iter()
        .find(|(_, caps)| caps.can_generate_images)
        .map(|(model, _)| *model)
        .unwrap_or(ModelType::Gemini20FlashImageGeneration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_ids_round_trip() {
        for model in ModelType::all() {
            assert_eq!(model.as_str().parse::<ModelType>().unwrap(), *model);
            let json = serde_json::to_string(model).unwrap();
            assert_eq!(json, format!("\"{}\"", model.as_str()));
        }
        assert!("gpt-4o".parse::<ModelType>().is_err());
    }

    #[test]
    fn test_default_model() {
        assert_eq!(ModelType::default(), ModelType::Gemma31bIt);
    }

    #[test]
    fn test_best_model_for_images_and_pdf() {
        assert_eq!(best_model_for("image/png"), ModelType::Gemini15Flash);
        assert_eq!(best_model_for("application/pdf"), ModelType::Gemini15Flash);
        assert_eq!(best_model_for("text/plain"), ModelType::Gemini15Flash);
    }

    #[test]
    fn test_models_accepting_filters_by_capability() {
        let pdf = models_accepting("application/pdf");
        assert!(!pdf.contains(&ModelType::Gemini20FlashImageGeneration));
        assert!(!pdf.contains(&ModelType::Gemma31bIt));

        let images = models_accepting("image/jpeg");
        assert!(images.contains(&ModelType::Gemini20FlashImageGeneration));
        assert!(!images.contains(&ModelType::Gemma31bIt));
    }

    #[test]
    fn test_capability_lookup() {
        assert!(ModelType::Gemini25ProPreview.capabilities().is_none());
        let caps = ModelType::Gemini20FlashLite.capabilities().unwrap();
        assert_eq!(caps.speed, Speed::VeryFast);
        assert_eq!(caps.context, ContextSize::Small);
        assert_eq!(image_generation_model(), ModelType::Gemini20FlashImageGeneration);
    }
}
