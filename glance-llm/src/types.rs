use serde::{Deserialize, Serialize};

/// Backend family for text generation. `Local` covers any OpenAI-compatible
/// server running on the user's machine (ollama, LM Studio).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Anthropic,
    OpenAi,
    Local,
}

impl ProviderKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gemini => "Gemini",
            Self::Anthropic => "Anthropic",
            Self::OpenAi => "OpenAI",
            Self::Local => "Local",
        }
    }

    /// Case-insensitive parse with the aliases users actually type.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" => Some(Self::Gemini),
            "anthropic" | "claude" => Some(Self::Anthropic),
            "openai" | "open_ai" => Some(Self::OpenAi),
            "local" | "ollama" | "lmstudio" | "lm_studio" => Some(Self::Local),
            _ => None,
        }
    }

    pub fn all() -> [Self; 4] {
        [Self::Gemini, Self::Anthropic, Self::OpenAi, Self::Local]
    }
}

/// One canonical generation request. Adapters translate this into each
/// backend's wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationInput {
    pub system_prompt: Option<String>,
    pub user_prompt: String,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_names_case_insensitively() {
        assert_eq!(ProviderKind::parse("gemini"), Some(ProviderKind::Gemini));
        assert_eq!(ProviderKind::parse("GEMINI"), Some(ProviderKind::Gemini));
        assert_eq!(
            ProviderKind::parse("  Anthropic "),
            Some(ProviderKind::Anthropic)
        );
        assert_eq!(ProviderKind::parse("openai"), Some(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::parse("local"), Some(ProviderKind::Local));
    }

    #[test]
    fn parses_aliases() {
        assert_eq!(ProviderKind::parse("claude"), Some(ProviderKind::Anthropic));
        assert_eq!(ProviderKind::parse("open_ai"), Some(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::parse("ollama"), Some(ProviderKind::Local));
        assert_eq!(ProviderKind::parse("lmstudio"), Some(ProviderKind::Local));
        assert_eq!(ProviderKind::parse("lm_studio"), Some(ProviderKind::Local));
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!(ProviderKind::parse(""), None);
        assert_eq!(ProviderKind::parse("mistral"), None);
    }

    #[test]
    fn serializes_as_lowercase() {
        let encoded = serde_json::to_string(&ProviderKind::OpenAi).expect("encode");
        assert_eq!(encoded, "\"openai\"");
        let decoded: ProviderKind = serde_json::from_str("\"anthropic\"").expect("decode");
        assert_eq!(decoded, ProviderKind::Anthropic);
    }
}
