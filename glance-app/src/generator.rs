//! Turns a captured selection (and an optional follow-up question) into
//! provider requests. The session layer only sees [`ResponseGenerator`], so
//! the debug echo generator can stand in for a live provider end to end.

use crate::selection::SelectionSource;
use async_trait::async_trait;
use glance_llm::{GenerationInput, Provider};

const SYSTEM_PROMPT: &str = "You are a concise assistant embedded in a desktop tool. \
The user highlighted text on their screen. Explain it or answer questions about it \
in plain language. Keep responses short and directly useful.";

const MAX_OUTPUT_TOKENS: u32 = 420;
const TEMPERATURE: f64 = 0.2;

#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn explain(
        &self,
        selection_text: &str,
        source: SelectionSource,
    ) -> glance_llm::Result<String>;

    async fn answer(
        &self,
        prompt: &str,
        selection_text: &str,
        source: SelectionSource,
    ) -> glance_llm::Result<String>;
}

/// Live generator: wraps whatever provider the factory produced.
pub struct ProviderResponseGenerator {
    provider: Box<dyn Provider>,
}

impl ProviderResponseGenerator {
    pub fn new(provider: Box<dyn Provider>) -> Self {
        Self { provider }
    }

    async fn generate(&self, user_prompt: String) -> glance_llm::Result<String> {
        let input = GenerationInput {
            system_prompt: Some(SYSTEM_PROMPT.to_string()),
            user_prompt,
            max_output_tokens: Some(MAX_OUTPUT_TOKENS),
            temperature: Some(TEMPERATURE),
        };
        self.provider.generate_text(&input).await
    }
}

#[async_trait]
impl ResponseGenerator for ProviderResponseGenerator {
    async fn explain(
        &self,
        selection_text: &str,
        source: SelectionSource,
    ) -> glance_llm::Result<String> {
        let user_prompt = format!(
            "The user selected the following text (captured via {}):\n\n{}\n\n\
             Explain what this text means.",
            source.display_label(),
            selection_text
        );
        self.generate(user_prompt).await
    }

    async fn answer(
        &self,
        prompt: &str,
        selection_text: &str,
        source: SelectionSource,
    ) -> glance_llm::Result<String> {
        let user_prompt = format!(
            "The user selected the following text (captured via {}):\n\n{}\n\n\
             Question about the selection: {}",
            source.display_label(),
            selection_text,
            prompt
        );
        self.generate(user_prompt).await
    }
}

/// Echo generator for offline runs; never touches the network.
pub struct DebugResponseGenerator;

#[async_trait]
impl ResponseGenerator for DebugResponseGenerator {
    async fn explain(
        &self,
        selection_text: &str,
        source: SelectionSource,
    ) -> glance_llm::Result<String> {
        Ok(format!(
            "Debug explain response ({}):\n\n{}",
            source.display_label(),
            selection_text
        ))
    }

    async fn answer(
        &self,
        prompt: &str,
        selection_text: &str,
        source: SelectionSource,
    ) -> glance_llm::Result<String> {
        Ok(format!(
            "Debug answer ({}) for prompt: \"{}\"\n\nSelection:\n{}",
            source.display_label(),
            prompt,
            selection_text
        ))
    }
}
