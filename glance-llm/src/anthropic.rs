use crate::endpoint::resolve_endpoint;
use crate::error::{ProviderError, Result};
use crate::provider::Provider;
use crate::response::{decode_body, ensure_success, non_empty_text};
use crate::transport::{HttpRequest, HttpTransport};
use crate::types::{GenerationInput, ProviderKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

pub const ANTHROPIC_API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
const MESSAGES_PATH: &str = "/v1/messages";
const VERSION_SEGMENT: &str = "/v1";

// The messages endpoint requires max_tokens; this cap applies when the
// caller leaves it unset.
const DEFAULT_MAX_TOKENS: u32 = 420;

/// Anthropic messages API: API key in `x-api-key` (not `Authorization`), a
/// pinned `anthropic-version` header, and the system prompt as a separate
/// request field.
pub struct AnthropicProvider {
    model: String,
    api_key: Option<String>,
    base_url: Url,
    version: String,
    transport: Arc<dyn HttpTransport>,
}

impl AnthropicProvider {
    pub fn new(
        model: &str,
        api_key: Option<&str>,
        base_url: Url,
        version: &str,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            model: model.to_string(),
            api_key: api_key.map(str::to_string),
            base_url,
            version: version.to_string(),
            transport,
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    #[tracing::instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn generate_text(&self, input: &GenerationInput) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref().filter(|key| !key.is_empty()) else {
            return Err(ProviderError::MissingApiKey {
                provider: self.kind(),
                env_var: ANTHROPIC_API_KEY_VAR,
            });
        };

        let body = AnthropicMessagesRequest {
            model: &self.model,
            max_tokens: input.max_output_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: input.temperature,
            system: input.system_prompt.as_deref(),
            messages: vec![AnthropicMessage {
                role: "user",
                content: &input.user_prompt,
            }],
        };

        let url = resolve_endpoint(&self.base_url, VERSION_SEGMENT, MESSAGES_PATH);
        let request = HttpRequest::post_json(url, serde_json::to_vec(&body)?)
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.version);
        let response = self.transport.send(request).await?;
        ensure_success(&response)?;

        let decoded: AnthropicMessagesResponse = decode_body(&response)?;
        let text = decoded
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n");
        non_empty_text(text)
    }
}

#[derive(Debug, Serialize)]
struct AnthropicMessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicMessagesResponse {
    #[serde(default)]
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}
