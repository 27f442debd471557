//! Seams to the conversational-voice vendor: language model, speech
//! synthesis and transcription.

pub mod client;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Raw text of the model's reply to `messages`.
    async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<String>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// URL where the spoken rendition of `text` can be fetched.
    async fn synthesize(&self, text: &str) -> anyhow::Result<String>;
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: Vec<u8>, content_type: &str) -> anyhow::Result<String>;
}

/// The vendor services the app was started with.
#[derive(Clone)]
pub struct VoiceServices {
    pub language_model: Option<Arc<dyn LanguageModel>>,
    pub synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    pub transcriber: Option<Arc<dyn Transcriber>>,
}

impl VoiceServices {
    pub fn disabled() -> Self {
        Self {
            language_model: None,
            synthesizer: None,
            transcriber: None,
        }
    }
}
