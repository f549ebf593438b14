use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::agent_api::{ChatMessage, Role};
use shared::settings::{AppSettings, DEFAULT_BASE_URL};
use std::time::Duration;

use crate::GenerativeProvider;

// ── Request/response types ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64 payload
    pub data: String,
}

/// A content part is either text or inline binary data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_count: Option<u32>,
}

impl GenerationConfig {
    pub fn sampling(temperature: f32, top_k: u32, top_p: f32, max_output_tokens: u32) -> Self {
        Self {
            temperature: Some(temperature),
            top_k: Some(top_k),
            top_p: Some(top_p),
            max_output_tokens: Some(max_output_tokens),
            candidate_count: None,
        }
    }

    pub fn with_candidate_count(mut self, count: u32) -> Self {
        self.candidate_count = Some(count);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

pub const HARM_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

impl SafetySetting {
    /// One setting per harm category, all at the same threshold.
    pub fn all_categories(threshold: &str) -> Vec<SafetySetting> {
        HARM_CATEGORIES
            .iter()
            .map(|category| SafetySetting {
                category: category.to_string(),
                threshold: threshold.to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub safety_settings: Vec<SafetySetting>,
}

impl GenerateRequest {
    /// Single-turn request from parts (text prompt, optional inline data).
    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self {
            contents: vec![Content {
                role: Some(Role::User),
                parts,
            }],
            ..Self::default()
        }
    }

    pub fn prompt(text: impl Into<String>) -> Self {
        Self::from_parts(vec![Part::text(text)])
    }

    /// Prior turns followed by the new user message.
    pub fn chat(history: &[ChatMessage], message: impl Into<String>) -> Self {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|m| Content {
                role: Some(m.role),
                parts: vec![Part::text(m.content.clone())],
            })
            .collect();
        contents.push(Content {
            role: Some(Role::User),
            parts: vec![Part::text(message)],
        });
        Self {
            contents,
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }

    pub fn with_safety_settings(mut self, settings: Vec<SafetySetting>) -> Self {
        self.safety_settings = settings;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Finish reasons for which the candidate's text must not be used.
pub const BLOCKING_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "LANGUAGE",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateResponse {
    pub fn has_candidates(&self) -> bool {
        !self.candidates.is_empty()
    }

    /// Parts of the first candidate, empty when there is none.
    pub fn parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }

    /// Concatenated text of the first candidate.
    ///
    /// Errors when there is no candidate (blocked prompt), when the candidate
    /// stopped for a blocking reason, or when it carries no text part.
    pub fn text(&self) -> Result<String> {
        let candidate = self
            .candidates
            .first()
            .ok_or_else(|| anyhow!("gemini returned no candidates"))?;
        if let Some(reason) = candidate
            .finish_reason
            .as_deref()
            .filter(|r| BLOCKING_FINISH_REASONS.contains(r))
        {
            return Err(anyhow!("gemini response blocked: {}", reason));
        }

        let texts: Vec<&str> = self.parts().iter().filter_map(|p| p.text.as_deref()).collect();
        if texts.is_empty() {
            return Err(anyhow!("gemini response has no text"));
        }
        Ok(texts.join(""))
    }

    pub fn first_text(&self) -> Option<&str> {
        self.parts().iter().find_map(|p| p.text.as_deref())
    }

    pub fn first_inline_data(&self) -> Option<&InlineData> {
        self.parts().iter().find_map(|p| p.inline_data.as_ref())
    }
}

// ── Client ───────────────────────────────────────────────────────────

pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &AppSettings) -> Result<Self> {
        let base_url = if settings.base_url.trim().is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            settings.base_url.clone()
        };
        Self::new(
            settings.api_key.clone().unwrap_or_default(),
            base_url,
            settings.request_timeout_secs.map(Duration::from_secs),
        )
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        )
    }
}

#[async_trait]
impl GenerativeProvider for GeminiClient {
    async fn generate_content(&self, model: &str, request: &GenerateRequest) -> Result<GenerateResponse> {
        if self.api_key.is_empty() {
            return Err(anyhow!("GEMINI_API_KEY not set"));
        }
        tracing::debug!(model, contents = request.contents.len(), "gemini generateContent");

        let resp = self.http.post(self.endpoint(model)).json(request).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let body = body.trim();
            if body.is_empty() {
                return Err(anyhow!("gemini error: {}", status));
            }
            let body = if body.chars().count() > 800 {
                format!("{}...", body.chars().take(800).collect::<String>())
            } else {
                body.to_string()
            };
            return Err(anyhow!("gemini error: {}\n{}", status, body));
        }
        Ok(resp.json().await?)
    }
}
