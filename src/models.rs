use serde::{Deserialize, Serialize};

/// Body of `POST /api/public/translate`. `text` is optional so the
/// validation scenario can leave it out entirely.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub from_language: String,
    pub to_language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl TranslateRequest {
    pub fn new(text: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            from_language: from.into(),
            to_language: to.into(),
            context: None,
        }
    }

    pub fn without_text(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            text: None,
            from_language: from.into(),
            to_language: to.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Short label for logs and failure messages.
    pub fn label(&self) -> String {
        format!(
            "{} {} -> {}",
            self.text.as_deref().unwrap_or("<no text>"),
            self.from_language,
            self.to_language
        )
    }
}

/// Success body of the translate endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub translated_text: String,
    pub from_language: String,
    pub to_language: String,
    pub original_text: String,
}

/// Body of `POST /api/chats`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CreateChatRequest {
    pub title: String,
}

pub mod fields {
    pub const TRANSLATED_TEXT: &str = "translatedText";
    pub const ORIGINAL_TEXT: &str = "originalText";
    pub const FROM_LANGUAGE: &str = "fromLanguage";
    pub const TO_LANGUAGE: &str = "toLanguage";

    pub const ENDPOINTS: &str = "endpoints";
    pub const VOICES: &str = "voices";
    pub const RATE_LIMIT: &str = "rateLimit";
}
