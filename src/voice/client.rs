//! HTTP client for the vendor's REST endpoints.
//!
//! The language model speaks the OpenAI-style chat-completions protocol;
//! speech synthesis and transcription are plain JSON/binary POSTs.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ChatMessage, LanguageModel, SpeechSynthesizer, Transcriber, VoiceServices};
use crate::config::VoiceVendorSettings;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const TEMPERATURE: f32 = 0.3;

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: ChatMessage,
}

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesisResponse {
    audio_url: String,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

pub struct VendorClient {
    http: reqwest::Client,
    settings: VoiceVendorSettings,
}

impl VendorClient {
    pub fn new(settings: VoiceVendorSettings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, settings })
    }

    /// Wires one client into every seam it has an endpoint for.
    pub fn into_services(self) -> VoiceServices {
        let has_tts = self.settings.tts_url.is_some();
        let has_stt = self.settings.stt_url.is_some();
        let client = Arc::new(self);
        let language_model: Arc<dyn LanguageModel> = client.clone();
        let synthesizer: Arc<dyn SpeechSynthesizer> = client.clone();
        let transcriber: Arc<dyn Transcriber> = client;
        VoiceServices {
            language_model: Some(language_model),
            synthesizer: has_tts.then_some(synthesizer),
            transcriber: has_stt.then_some(transcriber),
        }
    }

    fn vendor_request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.http.post(url);
        match &self.settings.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[async_trait]
impl LanguageModel for VendorClient {
    async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<String> {
        let body = CompletionRequest {
            model: &self.settings.llm_model,
            messages,
            temperature: TEMPERATURE,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };
        let response = self
            .http
            .post(format!(
                "{}/chat/completions",
                self.settings.llm_url.trim_end_matches('/')
            ))
            .bearer_auth(&self.settings.llm_api_key)
            .json(&body)
            .send()
            .await
            .context("completion request failed")?
            .error_for_status()
            .context("completion request rejected")?
            .json::<CompletionResponse>()
            .await
            .context("unreadable completion response")?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .context("completion response has no choices")
    }
}

#[async_trait]
impl SpeechSynthesizer for VendorClient {
    async fn synthesize(&self, text: &str) -> anyhow::Result<String> {
        let url = self
            .settings
            .tts_url
            .as_deref()
            .context("no speech synthesis endpoint configured")?;
        let response = self
            .vendor_request(url)
            .json(&SynthesisRequest { text })
            .send()
            .await
            .context("synthesis request failed")?
            .error_for_status()
            .context("synthesis request rejected")?
            .json::<SynthesisResponse>()
            .await
            .context("unreadable synthesis response")?;
        Ok(response.audio_url)
    }
}

#[async_trait]
impl Transcriber for VendorClient {
    async fn transcribe(&self, audio: Vec<u8>, content_type: &str) -> anyhow::Result<String> {
        let url = self
            .settings
            .stt_url
            .as_deref()
            .context("no transcription endpoint configured")?;
        let response = self
            .vendor_request(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(audio)
            .send()
            .await
            .context("transcription request failed")?
            .error_for_status()
            .context("transcription request rejected")?
            .json::<TranscriptionResponse>()
            .await
            .context("unreadable transcription response")?;
        Ok(response.text)
    }
}
