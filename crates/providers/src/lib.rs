//! Provider clients for the generative-AI backend.
//!
//! The gateway only talks to [`GenerativeProvider`]; [`gemini::GeminiClient`]
//! is the production implementation.

use anyhow::Result;
use async_trait::async_trait;

pub mod gemini;
pub mod router;

pub use gemini::{GenerateRequest, GenerateResponse};

#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// One `generateContent` call against `model`.
    async fn generate_content(&self, model: &str, request: &GenerateRequest) -> Result<GenerateResponse>;
}
