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

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const LOCAL_API_KEY_VAR: &str = "LOCAL_LLM_API_KEY";
const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
const VERSION_SEGMENT: &str = "/v1";

/// Chat-completions adapter shared by hosted OpenAI and local
/// OpenAI-compatible servers. The two differ only in base URL and whether a
/// key is mandatory: hosted deployments refuse to run without one, local
/// servers accept anonymous requests but still send a bearer token when one
/// is configured.
pub struct OpenAiCompatibleProvider {
    kind: ProviderKind,
    model: String,
    base_url: Url,
    api_key: Option<String>,
    requires_api_key: bool,
    missing_key_var: &'static str,
    transport: Arc<dyn HttpTransport>,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        kind: ProviderKind,
        model: &str,
        base_url: Url,
        api_key: Option<&str>,
        requires_api_key: bool,
        missing_key_var: &'static str,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            kind,
            model: model.to_string(),
            base_url,
            api_key: api_key.map(str::to_string),
            requires_api_key,
            missing_key_var,
            transport,
        }
    }
}

#[async_trait]
impl Provider for OpenAiCompatibleProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    #[tracing::instrument(level = "info", skip_all, fields(model = %self.model, kind = self.kind.display_name()))]
    async fn generate_text(&self, input: &GenerationInput) -> Result<String> {
        let api_key = self.api_key.as_deref().filter(|key| !key.is_empty());
        if self.requires_api_key && api_key.is_none() {
            return Err(ProviderError::MissingApiKey {
                provider: self.kind,
                env_var: self.missing_key_var,
            });
        }

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = input.system_prompt.as_deref().filter(|s| !s.is_empty()) {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &input.user_prompt,
        });

        let body = ChatCompletionsRequest {
            model: &self.model,
            messages,
            max_tokens: input.max_output_tokens,
            temperature: input.temperature,
        };

        let url = resolve_endpoint(&self.base_url, VERSION_SEGMENT, CHAT_COMPLETIONS_PATH);
        let mut request = HttpRequest::post_json(url, serde_json::to_vec(&body)?);
        if let Some(api_key) = api_key {
            request = request.header("authorization", &format!("Bearer {api_key}"));
        }
        let response = self.transport.send(request).await?;
        ensure_success(&response)?;

        let decoded: ChatCompletionsResponse = decode_body(&response)?;
        let text = decoded
            .choices
            .into_iter()
            .filter_map(|choice| choice.message.content)
            .collect::<Vec<_>>()
            .join("\n");
        non_empty_text(text)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
