//! Response validation shared by all adapters. Gemini, Anthropic, and
//! OpenAI-compatible servers all wrap failures in the same
//! `{"error": {"message": ...}}` envelope shape.

use crate::error::{ProviderError, Result};
use crate::transport::HttpResponse;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Turns a non-2xx response into a classified `HttpStatus` error. The
/// envelope parse is best-effort; an unparseable body just means no message.
pub(crate) fn ensure_success(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(ProviderError::HttpStatus {
        status: response.status,
        message: parse_error_message(&response.body),
    })
}

pub(crate) fn decode_body<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    serde_json::from_slice(&response.body).map_err(|_| ProviderError::InvalidResponse)
}

/// Rejects output that trims to nothing.
pub(crate) fn non_empty_text(text: String) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(trimmed.to_string())
}

fn parse_error_message(body: &[u8]) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_slice(body).ok()?;
    let message = envelope.error?.message?;
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorPayload>,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn success_statuses_pass() {
        assert!(ensure_success(&response(200, "")).is_ok());
        assert!(ensure_success(&response(204, "")).is_ok());
    }

    #[test]
    fn failure_extracts_envelope_message() {
        let result = ensure_success(&response(429, r#"{"error":{"message":" rate limited "}}"#));
        assert_eq!(
            result,
            Err(ProviderError::HttpStatus {
                status: 429,
                message: Some("rate limited".to_string()),
            })
        );
    }

    #[test]
    fn unparseable_error_body_yields_no_message() {
        let result = ensure_success(&response(500, "<html>oops</html>"));
        assert_eq!(
            result,
            Err(ProviderError::HttpStatus {
                status: 500,
                message: None,
            })
        );
    }

    #[test]
    fn whitespace_only_text_is_empty_response() {
        assert_eq!(
            non_empty_text("   \n ".to_string()),
            Err(ProviderError::EmptyResponse)
        );
        assert_eq!(
            non_empty_text("  ok  ".to_string()),
            Ok("ok".to_string())
        );
    }
}
