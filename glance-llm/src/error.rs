use crate::transport::TransportError;
use crate::types::ProviderKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Classified generation failures. The display text doubles as the
/// user-facing message, so it has to stand on its own.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    /// Raised before any network call when a required credential is absent.
    #[error("missing API key for {}; set {env_var}", .provider.display_name())]
    MissingApiKey {
        provider: ProviderKind,
        env_var: &'static str,
    },

    /// The response could not be decoded into the provider's wire shape.
    #[error("provider returned an invalid response")]
    InvalidResponse,

    /// Non-2xx status; the message is a best-effort extract from the
    /// provider's error envelope.
    #[error("{}", http_status_description(*.status, .message.as_deref()))]
    HttpStatus { status: u16, message: Option<String> },

    /// 2xx with no usable text after parsing and trimming.
    #[error("provider returned an empty response")]
    EmptyResponse,

    #[error("transport error: {0}")]
    Transport(String),
}

fn http_status_description(status: u16, message: Option<&str>) -> String {
    match message {
        Some(message) if !message.is_empty() => {
            format!("provider request failed ({status}): {message}")
        }
        _ => format!("provider request failed ({status})"),
    }
}

impl From<TransportError> for ProviderError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(_: serde_json::Error) -> Self {
        Self::InvalidResponse
    }
}
