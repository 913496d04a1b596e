//! Provider-agnostic LLM client for glance.
//!
//! Four backend adapters behind one [`Provider`] trait, an environment-driven
//! [`RuntimeConfiguration`], and a [`make_provider`] factory. All HTTP goes
//! through the [`HttpTransport`] capability so tests never touch the network.

mod anthropic;
mod config;
mod endpoint;
mod error;
mod factory;
mod gemini;
mod openai;
mod provider;
mod response;
#[cfg(test)]
mod testing;
mod transport;
mod types;

pub use anthropic::{ANTHROPIC_API_KEY_VAR, AnthropicProvider};
pub use config::{
    ANTHROPIC_BASE_URL_VAR, ANTHROPIC_MODEL_VAR, ANTHROPIC_VERSION_VAR, DEFAULT_ANTHROPIC_BASE_URL,
    DEFAULT_ANTHROPIC_MODEL, DEFAULT_ANTHROPIC_VERSION, DEFAULT_GEMINI_MODEL,
    DEFAULT_LOCAL_BASE_URL, DEFAULT_LOCAL_MODEL, DEFAULT_OPENAI_MODEL, GEMINI_MODEL_VAR,
    LOCAL_BASE_URL_VAR, LOCAL_MODEL_VAR, OPENAI_MODEL_VAR, PROVIDER_VAR, RuntimeConfiguration,
    normalized,
};
pub use error::{ProviderError, Result};
pub use factory::make_provider;
pub use gemini::{GEMINI_API_KEY_VAR, GeminiProvider};
pub use openai::{LOCAL_API_KEY_VAR, OPENAI_API_KEY_VAR, OpenAiCompatibleProvider};
pub use provider::Provider;
pub use transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError,
};
pub use types::{GenerationInput, ProviderKind};
