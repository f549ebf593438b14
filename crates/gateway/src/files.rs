//! Image and PDF attachments sent along with a chat turn.

use anyhow::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use providers::gemini::{GenerationConfig, Part};
use providers::{GenerateRequest, GenerativeProvider};
use shared::models::{best_model_for, ModelType, FALLBACK_FILE_MODEL};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("Seuls les fichiers images (JPG, PNG, GIF, etc.) et PDF sont supportés.")]
    Unsupported { mime_type: String },

    #[error("Impossible de lire le fichier: {0}")]
    Io(#[from] std::io::Error),
}

pub fn is_supported(mime_type: &str) -> bool {
    mime_type.starts_with("image/") || mime_type == "application/pdf"
}

#[derive(Debug, Clone)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Result<Self, AttachmentError> {
        let mime_type = mime_type.into();
        if !is_supported(&mime_type) {
            return Err(AttachmentError::Unsupported { mime_type });
        }
        Ok(Self {
            name: name.into(),
            mime_type,
            bytes,
        })
    }

    /// Reads the file; its type is inferred from the extension and checked
    /// before anything is read.
    pub fn from_path(path: &Path) -> Result<Self, AttachmentError> {
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        if !is_supported(&mime_type) {
            return Err(AttachmentError::Unsupported { mime_type });
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = fs::read(path)?;
        Self::new(name, mime_type, bytes)
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// How the attachment shows up in the user's message.
    pub fn label(&self, text: &str) -> String {
        if text.is_empty() {
            format!("📄 **{}**", self.name)
        } else {
            format!("{}\n\n📄 **{}**", text, self.name)
        }
    }
}

pub fn analysis_prompt(attachment: &Attachment, text: &str) -> String {
    match (attachment.is_image(), text.is_empty()) {
        (true, false) => format!("Analyse cette image et réponds à ma demande: {}", text),
        (true, true) => "Analyse cette image et décris ce que tu vois en détail.".to_string(),
        (false, false) => format!("Analyse ce document et réponds à ma demande: {}", text),
        (false, true) => "Analyse ce document et résume son contenu.".to_string(),
    }
}

pub fn analysis_config() -> GenerationConfig {
    GenerationConfig::sampling(0.7, 40, 0.9, 2048).with_candidate_count(4)
}

/// Request sent for an attachment and the model it goes to.
pub fn analysis_request(attachment: &Attachment, text: &str) -> (ModelType, GenerateRequest) {
    let model = best_model_for(&attachment.mime_type);
    let mut parts = vec![Part::text(analysis_prompt(attachment, text))];

    let payload = attachment.to_base64();
    // The fallback model gets the prompt only
    if model != FALLBACK_FILE_MODEL && !payload.is_empty() {
        parts.push(Part::inline(attachment.mime_type.clone(), payload));
    }

    let request = GenerateRequest::from_parts(parts).with_config(analysis_config());
    (model, request)
}

pub async fn analyze_file(provider: &dyn GenerativeProvider, attachment: &Attachment, text: &str) -> Result<String> {
    let (model, request) = analysis_request(attachment, text);
    tracing::debug!(
        model = model.as_str(),
        mime_type = %attachment.mime_type,
        bytes = attachment.bytes.len(),
        "analysing attachment"
    );
    let response = provider.generate_content(model.as_str(), &request).await?;
    response.text()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unsupported_types() {
        let err = Attachment::new("notes.txt", "text/plain", b"hi".to_vec()).unwrap_err();
        assert!(matches!(err, AttachmentError::Unsupported { .. }));
        assert_eq!(
            err.to_string(),
            "Seuls les fichiers images (JPG, PNG, GIF, etc.) et PDF sont supportés."
        );
        assert!(Attachment::new("a.png", "image/png", vec![1]).is_ok());
        assert!(Attachment::new("a.pdf", "application/pdf", vec![1]).is_ok());
    }

    #[test]
    fn test_from_path_infers_type() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("rapport.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();
        let att = Attachment::from_path(&pdf).unwrap();
        assert_eq!(att.name, "rapport.pdf");
        assert_eq!(att.mime_type, "application/pdf");
        assert_eq!(att.bytes, b"%PDF-1.4");

        let txt = dir.path().join("notes.txt");
        std::fs::write(&txt, b"hello").unwrap();
        assert!(matches!(
            Attachment::from_path(&txt),
            Err(AttachmentError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_label_and_prompts() {
        let img = Attachment::new("chat.png", "image/png", vec![1, 2, 3]).unwrap();
        assert_eq!(img.label(""), "📄 **chat.png**");
        assert_eq!(img.label("C'est quoi ?"), "C'est quoi ?\n\n📄 **chat.png**");
        assert_eq!(
            analysis_prompt(&img, "C'est quoi ?"),
            "Analyse cette image et réponds à ma demande: C'est quoi ?"
        );

        let pdf = Attachment::new("cv.pdf", "application/pdf", vec![1]).unwrap();
        assert_eq!(analysis_prompt(&pdf, ""), "Analyse ce document et résume son contenu.");
    }

    #[test]
    fn test_request_carries_inline_payload() {
        let img = Attachment::new("chat.png", "image/png", b"png".to_vec()).unwrap();
        let (model, request) = analysis_request(&img, "");
        assert_eq!(model, ModelType::Gemini15Flash);

        let parts = &request.contents[0].parts;
        assert_eq!(parts.len(), 2);
        let inline = parts[1].inline_data.as_ref().unwrap();
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(inline.data, "cG5n");

        let config = request.generation_config.unwrap();
        assert_eq!(config.candidate_count, Some(4));
        assert_eq!(config.max_output_tokens, Some(2048));
    }

    #[test]
    fn test_empty_file_sends_prompt_only() {
        let img = Attachment::new("empty.png", "image/png", Vec::new()).unwrap();
        let (_, request) = analysis_request(&img, "");
        assert_eq!(request.contents[0].parts.len(), 1);
    }
}
