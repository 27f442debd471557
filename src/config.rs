use std::time::Duration;

use anyhow::Context;

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_SESSION_MAX_AGE_SECS: i64 = 3600;
const DEFAULT_CONVERSATION_TTL_SECS: u64 = 900;
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Endpoints and credentials of the conversational-voice vendor.
#[derive(Clone, Debug)]
pub struct VoiceVendorSettings {
    pub llm_url: String,
    pub llm_api_key: String,
    pub llm_model: String,
    pub tts_url: Option<String>,
    pub stt_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    pub voice_shared_secret: String,
    /// Bearer sessions older than this are rejected.
    pub session_max_age_secs: i64,
    /// Idle conversations are dropped after this long.
    pub conversation_ttl: Duration,
    pub vendor: Option<VoiceVendorSettings>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let voice_shared_secret = required("VOICE_SHARED_SECRET")?;
        let bind_addr = optional("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let session_max_age_secs = match optional("SESSION_MAX_AGE_SECS") {
            Some(v) => v.parse().context("SESSION_MAX_AGE_SECS is not a number")?,
            None => DEFAULT_SESSION_MAX_AGE_SECS,
        };
        let conversation_ttl = match optional("CONVERSATION_TTL_SECS") {
            Some(v) => Duration::from_secs(
                v.parse()
                    .context("CONVERSATION_TTL_SECS is not a number")?,
            ),
            None => Duration::from_secs(DEFAULT_CONVERSATION_TTL_SECS),
        };

        let vendor = match optional("LLM_API_URL") {
            Some(llm_url) => Some(VoiceVendorSettings {
                llm_url,
                llm_api_key: required("LLM_API_KEY")?,
                llm_model: optional("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
                tts_url: optional("TTS_API_URL"),
                stt_url: optional("STT_API_URL"),
                api_key: optional("VOICE_API_KEY"),
            }),
            None => None,
        };

        Ok(Self {
            database_url,
            bind_addr,
            voice_shared_secret,
            session_max_age_secs,
            conversation_ttl,
            vendor,
        })
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    optional(key).with_context(|| format!("{} not found", key))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
