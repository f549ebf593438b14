pub mod chat;
pub mod error;
pub mod models;

pub mod settings {
    use crate::error::StorageError;
    use serde::{Deserialize, Serialize};
    use std::env;
    use std::fs;
    use std::path::{Path, PathBuf};

    pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

    fn default_base_url() -> String {
        DEFAULT_BASE_URL.to_string()
    }

    fn default_attribution() -> String {
        "Gaya Kaci".to_string()
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AppSettings {
        /// Gemini API key, sent as the `key` query parameter
        #[serde(default)]
        pub api_key: Option<String>,
        #[serde(default = "default_base_url")]
        pub base_url: String,
        /// Where `chat-storage.json` lives; platform data dir when unset
        #[serde(default)]
        pub data_dir: Option<PathBuf>,
        /// No timeout on provider calls when unset
        #[serde(default)]
        pub request_timeout_secs: Option<u64>,
        /// Reply given to "who made you" questions
        #[serde(default = "default_attribution")]
        pub creator_attribution: String,
    }

    impl Default for AppSettings {
        fn default() -> Self {
            Self {
                api_key: None,
                base_url: default_base_url(),
                data_dir: None,
                request_timeout_secs: None,
                creator_attribution: default_attribution(),
            }
        }
    }

    impl AppSettings {
        /// Settings file, then environment overrides.
        pub fn load() -> Result<Self, StorageError> {
            let mut settings = match Self::config_path() {
                Some(path) if path.exists() => Self::load_from(&path)?,
                _ => Self::default(),
            };
            settings.apply_env();
            Ok(settings)
        }

        pub fn load_from(path: &Path) -> Result<Self, StorageError> {
            let content = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }

        pub fn config_path() -> Option<PathBuf> {
            project_dirs().map(|p| p.config_dir().join("settings.json"))
        }

        pub fn apply_env(&mut self) {
            if let Ok(key) = env::var("GEMINI_API_KEY") {
                if !key.trim().is_empty() {
                    self.api_key = Some(key.trim().to_string());
                }
            }
            if let Ok(url) = env::var("LIGHTCHAT_BASE_URL") {
                if !url.trim().is_empty() {
                    self.base_url = url.trim().trim_end_matches('/').to_string();
                }
            }
            if let Ok(dir) = env::var("LIGHTCHAT_DATA_DIR") {
                if !dir.trim().is_empty() {
                    self.data_dir = Some(PathBuf::from(dir.trim()));
                }
            }
        }

        pub fn resolve_data_dir(&self) -> Result<PathBuf, StorageError> {
            if let Some(dir) = &self.data_dir {
                return Ok(dir.clone());
            }
            project_dirs()
                .map(|p| p.data_dir().to_path_buf())
                .ok_or(StorageError::NoDataDir)
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com.local", "LightChat", "LightChat")
    }
}

/// Provider-neutral chat types passed from the gateway to a provider
pub mod agent_api {
    use crate::chat::{Message, MessageType};
    use serde::{Deserialize, Serialize};

    /// Roles understood by the provider. Assistant turns are `model`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Role {
        User,
        Model,
    }

    impl From<MessageType> for Role {
        fn from(kind: MessageType) -> Self {
            match kind {
                MessageType::User => Role::User,
                MessageType::Ai => Role::Model,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ChatMessage {
        pub role: Role,
        pub content: String,
    }

    impl From<&Message> for ChatMessage {
        fn from(msg: &Message) -> Self {
            Self {
                role: msg.kind.into(),
                content: msg.content.clone(),
            }
        }
    }

    /// Map a stored transcript to the provider's history.
    pub fn to_history(messages: &[Message]) -> Vec<ChatMessage> {
        messages.iter().map(ChatMessage::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::agent_api::{to_history, Role};
    use super::chat::{Message, MessageType};
    use super::settings::AppSettings;

    #[test]
    fn test_history_role_mapping() {
        let msgs = vec![
            Message::new("hi", MessageType::User),
            Message::new("hello!", MessageType::Ai),
        ];
        let history = to_history(&msgs);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].role, Role::Model);
        assert_eq!(history[1].content, "hello!");
    }

    #[test]
    fn test_settings_defaults_fill_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"api_key": "abc"}"#).unwrap();

        let settings = AppSettings::load_from(&path).unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("abc"));
        assert_eq!(settings.base_url, super::settings::DEFAULT_BASE_URL);
        assert_eq!(settings.creator_attribution, "Gaya Kaci");
        assert!(settings.request_timeout_secs.is_none());
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let settings = AppSettings {
            data_dir: Some("/tmp/lightchat".into()),
            ..AppSettings::default()
        };
        assert_eq!(
            settings.resolve_data_dir().unwrap(),
            std::path::PathBuf::from("/tmp/lightchat")
        );
    }
}
