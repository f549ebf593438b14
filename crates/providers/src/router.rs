use crate::gemini::GenerateRequest;
use crate::GenerativeProvider;
use anyhow::{anyhow, Result};
use shared::models::ModelType;

/// Sends the same request to a list of models until one answers with text.
pub struct ModelRouter<'a> {
    provider: &'a dyn GenerativeProvider,
    models: &'a [ModelType],
}

impl<'a> ModelRouter<'a> {
    pub fn new(provider: &'a dyn GenerativeProvider, models: &'a [ModelType]) -> Self {
        Self { provider, models }
    }

    /// Returns the first non-empty trimmed text, tagged with the model that
    /// produced it.
    pub async fn generate_text(&self, request: &GenerateRequest) -> Result<(ModelType, String)> {
        let mut last_error = None;

        for model in self.models {
            let result = self
                .provider
                .generate_content(model.as_str(), request)
                .await
                .and_then(|resp| resp.text());

            match result {
                Ok(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        return Ok((*model, text.to_string()));
                    }
                    tracing::debug!(model = model.as_str(), "empty response, trying next model");
                }
                Err(e) => {
                    tracing::warn!(model = model.as_str(), error = %e, "model failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("No model returned any text")))
    }
}
