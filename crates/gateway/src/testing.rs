//! Scripted provider used by the gateway tests.

use anyhow::Result;
use async_trait::async_trait;
use providers::gemini::{Candidate, Content, InlineData, Part};
use providers::{GenerateRequest, GenerateResponse, GenerativeProvider};
use std::sync::Mutex;

type Script = dyn Fn(&str, &GenerateRequest) -> Result<GenerateResponse> + Send + Sync;

pub struct ScriptedProvider {
    script: Box<Script>,
    calls: Mutex<Vec<(String, GenerateRequest)>>,
}

impl ScriptedProvider {
    pub fn new(script: impl Fn(&str, &GenerateRequest) -> Result<GenerateResponse> + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, GenerateRequest)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn models_called(&self) -> Vec<String> {
        self.calls().into_iter().map(|(model, _)| model).collect()
    }
}

#[async_trait]
impl GenerativeProvider for ScriptedProvider {
    async fn generate_content(&self, model: &str, request: &GenerateRequest) -> Result<GenerateResponse> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), request.clone()));
        (self.script)(model, request)
    }
}

pub fn response_with_parts(parts: Vec<Part>) -> GenerateResponse {
    GenerateResponse {
        candidates: vec![Candidate {
            content: Some(Content { role: None, parts }),
            finish_reason: Some("STOP".to_string()),
        }],
    }
}

pub fn text_response(text: &str) -> GenerateResponse {
    response_with_parts(vec![Part::text(text)])
}

pub fn no_candidates() -> GenerateResponse {
    GenerateResponse::default()
}

pub fn image_part(mime_type: &str, data: &str) -> Part {
    Part {
        text: None,
        inline_data: Some(InlineData {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        }),
    }
}

/// Text of the first part of the last request's last content.
pub fn prompt_text(request: &GenerateRequest) -> String {
    request
        .contents
        .last()
        .and_then(|c| c.parts.first())
        .and_then(|p| p.text.clone())
        .unwrap_or_default()
}
