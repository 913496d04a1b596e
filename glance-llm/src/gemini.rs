use crate::error::{ProviderError, Result};
use crate::provider::Provider;
use crate::response::{decode_body, ensure_success, non_empty_text};
use crate::transport::{HttpRequest, HttpTransport};
use crate::types::{GenerationInput, ProviderKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

const GEMINI_MODELS_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Gemini has no system-message field in this endpoint, so the system prompt
/// is folded into one concatenated user prompt. The API key travels as a
/// query parameter rather than a header.
pub struct GeminiProvider {
    model: String,
    api_key: Option<String>,
    transport: Arc<dyn HttpTransport>,
}

impl GeminiProvider {
    pub fn new(model: &str, api_key: Option<&str>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            model: model.to_string(),
            api_key: api_key.map(str::to_string),
            transport,
        }
    }

    // Building from the constant base and pushing the model as a path
    // segment percent-encodes whatever the model string contains, so
    // construction cannot fail.
    fn generate_url(&self, api_key: &str) -> Url {
        let mut url = Url::parse(GEMINI_MODELS_URL).expect("gemini models URL parses");
        url.path_segments_mut()
            .expect("gemini models URL has a path")
            .push(&format!("{}:generateContent", self.model));
        url.query_pairs_mut().append_pair("key", api_key);
        url
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    #[tracing::instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn generate_text(&self, input: &GenerationInput) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref().filter(|key| !key.is_empty()) else {
            return Err(ProviderError::MissingApiKey {
                provider: self.kind(),
                env_var: GEMINI_API_KEY_VAR,
            });
        };

        let prompt = match input.system_prompt.as_deref().filter(|s| !s.is_empty()) {
            Some(system) => format!("{system}\n\n{}", input.user_prompt),
            None => input.user_prompt.clone(),
        };
        let body = GeminiGenerateRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: input.temperature,
                max_output_tokens: input.max_output_tokens,
            },
        };

        let request = HttpRequest::post_json(self.generate_url(api_key), serde_json::to_vec(&body)?);
        let response = self.transport.send(request).await?;
        ensure_success(&response)?;

        let decoded: GeminiGenerateResponse = decode_body(&response)?;
        let text = decoded
            .candidates
            .into_iter()
            .flat_map(|candidate| candidate.content.parts)
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("\n");
        non_empty_text(text)
    }
}

#[derive(Debug, Serialize)]
struct GeminiGenerateRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiGenerateResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiCandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: Option<String>,
}
