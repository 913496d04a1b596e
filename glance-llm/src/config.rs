//! Runtime provider configuration.
//!
//! Resolution is pure: callers hand in an environment map and (optionally)
//! layer persisted settings on top, field by field. Every field always
//! resolves to a concrete value because the hardcoded defaults are the last
//! tier. A value counts as set only when non-empty after trimming.
//!
//! Recognized environment variables:
//! `GLANCE_PROVIDER`, `GEMINI_MODEL`, `GEMINI_API_KEY`, `ANTHROPIC_MODEL`,
//! `ANTHROPIC_API_KEY`, `ANTHROPIC_BASE_URL`, `ANTHROPIC_VERSION`,
//! `OPENAI_MODEL`, `OPENAI_API_KEY`, `LOCAL_LLM_MODEL`, `LOCAL_LLM_BASE_URL`,
//! `LOCAL_LLM_API_KEY`.

use crate::anthropic::ANTHROPIC_API_KEY_VAR;
use crate::gemini::GEMINI_API_KEY_VAR;
use crate::openai::{LOCAL_API_KEY_VAR, OPENAI_API_KEY_VAR};
use crate::types::ProviderKind;
use std::collections::HashMap;
use url::Url;

pub const PROVIDER_VAR: &str = "GLANCE_PROVIDER";
pub const GEMINI_MODEL_VAR: &str = "GEMINI_MODEL";
pub const ANTHROPIC_MODEL_VAR: &str = "ANTHROPIC_MODEL";
pub const ANTHROPIC_BASE_URL_VAR: &str = "ANTHROPIC_BASE_URL";
pub const ANTHROPIC_VERSION_VAR: &str = "ANTHROPIC_VERSION";
pub const OPENAI_MODEL_VAR: &str = "OPENAI_MODEL";
pub const LOCAL_MODEL_VAR: &str = "LOCAL_LLM_MODEL";
pub const LOCAL_BASE_URL_VAR: &str = "LOCAL_LLM_BASE_URL";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-latest";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_LOCAL_MODEL: &str = "llama3.2:3b";
pub const DEFAULT_LOCAL_BASE_URL: &str = "http://localhost:11434";

/// Fully resolved configuration for every provider family. Recomputed on
/// demand rather than cached so settings changes take effect immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfiguration {
    pub default_provider: ProviderKind,
    pub gemini_model: String,
    pub gemini_api_key: Option<String>,
    pub anthropic_model: String,
    pub anthropic_api_key: Option<String>,
    pub anthropic_base_url: Url,
    pub anthropic_version: String,
    pub openai_model: String,
    pub openai_api_key: Option<String>,
    pub local_model: String,
    pub local_base_url: Url,
    pub local_api_key: Option<String>,
}

impl RuntimeConfiguration {
    pub fn from_env(environment: &HashMap<String, String>) -> Self {
        let default_provider = environment
            .get(PROVIDER_VAR)
            .and_then(|value| ProviderKind::parse(value))
            .unwrap_or(ProviderKind::Gemini);

        Self {
            default_provider,
            gemini_model: normalized(environment.get(GEMINI_MODEL_VAR))
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_api_key: normalized(environment.get(GEMINI_API_KEY_VAR)),
            anthropic_model: normalized(environment.get(ANTHROPIC_MODEL_VAR))
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
            anthropic_api_key: normalized(environment.get(ANTHROPIC_API_KEY_VAR)),
            anthropic_base_url: env_url(environment.get(ANTHROPIC_BASE_URL_VAR))
                .unwrap_or_else(default_anthropic_base_url),
            anthropic_version: normalized(environment.get(ANTHROPIC_VERSION_VAR))
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_VERSION.to_string()),
            openai_model: normalized(environment.get(OPENAI_MODEL_VAR))
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_api_key: normalized(environment.get(OPENAI_API_KEY_VAR)),
            local_model: normalized(environment.get(LOCAL_MODEL_VAR))
                .unwrap_or_else(|| DEFAULT_LOCAL_MODEL.to_string()),
            local_base_url: env_url(environment.get(LOCAL_BASE_URL_VAR))
                .unwrap_or_else(default_local_base_url),
            local_api_key: normalized(environment.get(LOCAL_API_KEY_VAR)),
        }
    }
}

/// Trims surrounding whitespace; whitespace-only values count as unset.
pub fn normalized(raw: Option<&String>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

// A malformed URL string is treated as unset so resolution falls through to
// the next tier instead of producing a broken endpoint.
fn env_url(raw: Option<&String>) -> Option<Url> {
    Url::parse(&normalized(raw)?).ok()
}

fn default_anthropic_base_url() -> Url {
    Url::parse(DEFAULT_ANTHROPIC_BASE_URL).expect("default anthropic base URL parses")
}

fn default_local_base_url() -> Url {
    Url::parse(DEFAULT_LOCAL_BASE_URL).expect("default local base URL parses")
}
