use crate::anthropic::AnthropicProvider;
use crate::config::RuntimeConfiguration;
use crate::gemini::GeminiProvider;
use crate::openai::{LOCAL_API_KEY_VAR, OPENAI_API_KEY_VAR, OpenAiCompatibleProvider};
use crate::provider::Provider;
use crate::transport::HttpTransport;
use crate::types::ProviderKind;
use std::sync::Arc;
use url::Url;

const OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Builds the adapter for the configured provider. Deliberately uncached:
/// callers construct a fresh adapter per use so settings changes apply to
/// the very next request.
pub fn make_provider(
    configuration: &RuntimeConfiguration,
    transport: Arc<dyn HttpTransport>,
) -> Box<dyn Provider> {
    match configuration.default_provider {
        ProviderKind::Gemini => Box::new(GeminiProvider::new(
            &configuration.gemini_model,
            configuration.gemini_api_key.as_deref(),
            transport,
        )),
        ProviderKind::Anthropic => Box::new(AnthropicProvider::new(
            &configuration.anthropic_model,
            configuration.anthropic_api_key.as_deref(),
            configuration.anthropic_base_url.clone(),
            &configuration.anthropic_version,
            transport,
        )),
        ProviderKind::OpenAi => Box::new(OpenAiCompatibleProvider::new(
            ProviderKind::OpenAi,
            &configuration.openai_model,
            Url::parse(OPENAI_BASE_URL).expect("openai base URL parses"),
            configuration.openai_api_key.as_deref(),
            true,
            OPENAI_API_KEY_VAR,
            transport,
        )),
        ProviderKind::Local => Box::new(OpenAiCompatibleProvider::new(
            ProviderKind::Local,
            &configuration.local_model,
            configuration.local_base_url.clone(),
            configuration.local_api_key.as_deref(),
            false,
            LOCAL_API_KEY_VAR,
            transport,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::testing::RecordingTransport;
    use crate::types::GenerationInput;
    use std::collections::HashMap;

    fn configuration(kind: ProviderKind) -> RuntimeConfiguration {
        let mut config = RuntimeConfiguration::from_env(&HashMap::new());
        config.default_provider = kind;
        config
    }

    #[test]
    fn factory_selects_matching_adapter_kind() {
        for kind in ProviderKind::all() {
            let provider = make_provider(&configuration(kind), RecordingTransport::new());
            assert_eq!(provider.kind(), kind);
        }
    }

    #[tokio::test]
    async fn each_keyed_provider_reports_its_own_env_var_when_unconfigured() {
        let cases = [
            (ProviderKind::Gemini, "GEMINI_API_KEY"),
            (ProviderKind::Anthropic, "ANTHROPIC_API_KEY"),
            (ProviderKind::OpenAi, "OPENAI_API_KEY"),
        ];
        let input = GenerationInput {
            system_prompt: None,
            user_prompt: "hello".to_string(),
            max_output_tokens: None,
            temperature: None,
        };

        for (kind, env_var) in cases {
            let transport = RecordingTransport::new();
            let provider = make_provider(&configuration(kind), transport.clone());
            let error = provider
                .generate_text(&input)
                .await
                .expect_err("missing key should fail");
            assert_eq!(
                error,
                ProviderError::MissingApiKey {
                    provider: kind,
                    env_var,
                }
            );
            assert_eq!(transport.request_count(), 0);
        }
    }
}
