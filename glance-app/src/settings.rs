//! Persisted provider preferences plus the runtime-configuration merge.
//!
//! Precedence per field, highest first: persisted setting (when non-empty
//! after trim), secret-store value, environment variable, hardcoded default.
//! The merge itself is side-effect free; all I/O happens on load and on
//! explicit updates.

use crate::secrets::{SecretStore, account};
use crate::selection::normalize_text;
use glance_llm::{ProviderKind, RuntimeConfiguration};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

/// The one serializable preferences record. Every field carries a default so
/// records written by older builds decode without failing the whole load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderPreferences {
    pub selected_provider: ProviderKind,
    pub gemini_model: String,
    pub anthropic_model: String,
    pub anthropic_base_url: String,
    pub anthropic_version: String,
    pub openai_model: String,
    pub local_model: String,
    pub local_base_url: String,
}

impl Default for ProviderPreferences {
    fn default() -> Self {
        Self {
            selected_provider: ProviderKind::Gemini,
            gemini_model: glance_llm::DEFAULT_GEMINI_MODEL.to_string(),
            anthropic_model: glance_llm::DEFAULT_ANTHROPIC_MODEL.to_string(),
            anthropic_base_url: glance_llm::DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            anthropic_version: glance_llm::DEFAULT_ANTHROPIC_VERSION.to_string(),
            openai_model: glance_llm::DEFAULT_OPENAI_MODEL.to_string(),
            local_model: glance_llm::DEFAULT_LOCAL_MODEL.to_string(),
            local_base_url: glance_llm::DEFAULT_LOCAL_BASE_URL.to_string(),
        }
    }
}

pub struct SettingsStore {
    preferences: ProviderPreferences,
    preferences_path: PathBuf,
    secrets: Arc<dyn SecretStore>,
    last_save_error: Option<String>,
}

impl SettingsStore {
    /// Reads preferences from disk; a missing or unreadable file falls back
    /// to defaults rather than failing.
    pub fn load(preferences_path: PathBuf, secrets: Arc<dyn SecretStore>) -> Self {
        let preferences = match std::fs::read(&preferences_path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!(path = %preferences_path.display(), error = %e,
                    "unreadable preferences; using defaults");
                ProviderPreferences::default()
            }),
            Err(_) => ProviderPreferences::default(),
        };
        Self {
            preferences,
            preferences_path,
            secrets,
            last_save_error: None,
        }
    }

    pub fn preferences(&self) -> &ProviderPreferences {
        &self.preferences
    }

    pub fn update_preferences(&mut self, preferences: ProviderPreferences) {
        self.preferences = preferences;
        self.persist_preferences();
    }

    pub fn api_key(&self, provider: ProviderKind) -> Option<String> {
        self.secrets
            .get(secret_account(provider))
            .as_deref()
            .and_then(normalize_text)
    }

    /// Stores the key for a provider; a value that trims to empty removes
    /// the stored secret instead.
    pub fn set_api_key(&mut self, provider: ProviderKind, value: &str) {
        let account = secret_account(provider);
        let result = match normalize_text(value) {
            Some(value) => self.secrets.set(account, &value),
            None => self.secrets.remove(account),
        };
        self.last_save_error = result
            .err()
            .map(|e| format!("failed to save secure setting: {e}"));
    }

    pub fn last_save_error(&self) -> Option<&str> {
        self.last_save_error.as_deref()
    }

    /// Resolves the concrete configuration from current preferences, stored
    /// secrets, and the given environment. Recomputed per call on purpose.
    pub fn runtime_configuration(
        &self,
        environment: &HashMap<String, String>,
    ) -> RuntimeConfiguration {
        let env = RuntimeConfiguration::from_env(environment);
        let p = &self.preferences;

        RuntimeConfiguration {
            default_provider: p.selected_provider,
            gemini_model: normalize_text(&p.gemini_model).unwrap_or(env.gemini_model),
            gemini_api_key: self.api_key(ProviderKind::Gemini).or(env.gemini_api_key),
            anthropic_model: normalize_text(&p.anthropic_model).unwrap_or(env.anthropic_model),
            anthropic_api_key: self
                .api_key(ProviderKind::Anthropic)
                .or(env.anthropic_api_key),
            anthropic_base_url: parse_url(&p.anthropic_base_url).unwrap_or(env.anthropic_base_url),
            anthropic_version: normalize_text(&p.anthropic_version)
                .unwrap_or(env.anthropic_version),
            openai_model: normalize_text(&p.openai_model).unwrap_or(env.openai_model),
            openai_api_key: self.api_key(ProviderKind::OpenAi).or(env.openai_api_key),
            local_model: normalize_text(&p.local_model).unwrap_or(env.local_model),
            local_base_url: parse_url(&p.local_base_url).unwrap_or(env.local_base_url),
            local_api_key: self.api_key(ProviderKind::Local).or(env.local_api_key),
        }
    }

    fn persist_preferences(&mut self) {
        let result = write_preferences(&self.preferences_path, &self.preferences);
        self.last_save_error = result.err().map(|e| format!("failed to save settings: {e}"));
    }
}

fn write_preferences(path: &Path, preferences: &ProviderPreferences) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let encoded = serde_json::to_vec_pretty(preferences)?;
    std::fs::write(path, encoded)?;
    Ok(())
}

fn secret_account(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Gemini => account::GEMINI,
        ProviderKind::Anthropic => account::ANTHROPIC,
        ProviderKind::OpenAi => account::OPENAI,
        ProviderKind::Local => account::LOCAL,
    }
}

// A preferences URL that fails to parse is treated as unset so the
// environment or default tier supplies a well-formed one.
fn parse_url(raw: &str) -> Option<Url> {
    Url::parse(&normalize_text(raw)?).ok()
}

pub fn default_preferences_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".glance").join("settings.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::InMemorySecretStore;

    fn store_in(dir: &Path, secrets: Arc<dyn SecretStore>) -> SettingsStore {
        SettingsStore::load(dir.join("settings.json"), secrets)
    }

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn stored_settings_win_over_environment() {
        let dir = tempfile::tempdir().expect("tempdir");
        let secrets = Arc::new(InMemorySecretStore::new());
        let mut store = store_in(dir.path(), secrets);

        store.update_preferences(ProviderPreferences {
            selected_provider: ProviderKind::Anthropic,
            gemini_model: "gemini-custom".to_string(),
            anthropic_model: "claude-custom".to_string(),
            anthropic_base_url: "https://example.anthropic.local".to_string(),
            anthropic_version: "2025-01-01".to_string(),
            openai_model: "openai-custom".to_string(),
            local_model: "local-custom".to_string(),
            local_base_url: "http://localhost:12345".to_string(),
        });
        store.set_api_key(ProviderKind::Anthropic, "anthropic-secret");

        let config = store.runtime_configuration(&env(&[
            ("ANTHROPIC_MODEL", "env-model"),
            ("ANTHROPIC_API_KEY", "env-secret"),
        ]));

        assert_eq!(config.default_provider, ProviderKind::Anthropic);
        assert_eq!(config.gemini_model, "gemini-custom");
        assert_eq!(config.anthropic_model, "claude-custom");
        assert_eq!(config.anthropic_api_key.as_deref(), Some("anthropic-secret"));
        assert_eq!(
            config.anthropic_base_url.as_str(),
            "https://example.anthropic.local/"
        );
        assert_eq!(config.anthropic_version, "2025-01-01");
        assert_eq!(config.local_base_url.as_str(), "http://localhost:12345/");
    }

    #[test]
    fn missing_secrets_fall_back_to_environment_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path(), Arc::new(InMemorySecretStore::new()));

        let config = store.runtime_configuration(&env(&[
            ("GEMINI_API_KEY", "env-gemini"),
            ("OPENAI_API_KEY", "env-openai"),
        ]));

        assert_eq!(config.gemini_api_key.as_deref(), Some("env-gemini"));
        assert_eq!(config.openai_api_key.as_deref(), Some("env-openai"));
        assert_eq!(config.anthropic_api_key, None);
    }

    #[test]
    fn no_environment_and_no_settings_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path(), Arc::new(InMemorySecretStore::new()));

        let config = store.runtime_configuration(&HashMap::new());

        assert_eq!(config.default_provider, ProviderKind::Gemini);
        assert_eq!(config.gemini_model, "gemini-2.5-flash");
        assert_eq!(config.local_base_url.as_str(), "http://localhost:11434/");
    }

    #[test]
    fn settings_persist_across_store_instances() {
        let dir = tempfile::tempdir().expect("tempdir");
        let secrets: Arc<dyn SecretStore> = Arc::new(InMemorySecretStore::new());

        {
            let mut store = store_in(dir.path(), secrets.clone());
            let mut preferences = store.preferences().clone();
            preferences.selected_provider = ProviderKind::OpenAi;
            preferences.openai_model = "gpt-custom".to_string();
            store.update_preferences(preferences);
            store.set_api_key(ProviderKind::OpenAi, "persisted-openai");
            assert_eq!(store.last_save_error(), None);
        }

        let reloaded = store_in(dir.path(), secrets);
        assert_eq!(
            reloaded.preferences().selected_provider,
            ProviderKind::OpenAi
        );
        assert_eq!(reloaded.preferences().openai_model, "gpt-custom");

        let config = reloaded.runtime_configuration(&HashMap::new());
        assert_eq!(config.openai_api_key.as_deref(), Some("persisted-openai"));
    }

    #[test]
    fn legacy_records_missing_fields_decode_with_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"selected_provider":"openai","openai_model":"legacy-openai"}"#,
        )
        .expect("write legacy settings");

        let store = SettingsStore::load(path, Arc::new(InMemorySecretStore::new()));
        assert_eq!(store.preferences().selected_provider, ProviderKind::OpenAi);
        assert_eq!(store.preferences().openai_model, "legacy-openai");
        assert_eq!(store.preferences().gemini_model, "gemini-2.5-flash");
    }

    #[test]
    fn malformed_preferences_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").expect("write garbage");

        let store = SettingsStore::load(path, Arc::new(InMemorySecretStore::new()));
        assert_eq!(store.preferences(), &ProviderPreferences::default());
    }

    #[test]
    fn malformed_preference_url_falls_back_to_environment_tier() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = store_in(dir.path(), Arc::new(InMemorySecretStore::new()));

        let mut preferences = store.preferences().clone();
        preferences.local_base_url = "not a url".to_string();
        store.update_preferences(preferences);

        let config = store.runtime_configuration(&env(&[(
            "LOCAL_LLM_BASE_URL",
            "http://localhost:9000",
        )]));
        assert_eq!(config.local_base_url.as_str(), "http://localhost:9000/");
    }

    #[test]
    fn blank_api_key_removes_stored_secret() {
        let dir = tempfile::tempdir().expect("tempdir");
        let secrets = Arc::new(InMemorySecretStore::new());
        let mut store = store_in(dir.path(), secrets.clone());

        store.set_api_key(ProviderKind::Gemini, "secret");
        assert_eq!(store.api_key(ProviderKind::Gemini).as_deref(), Some("secret"));

        store.set_api_key(ProviderKind::Gemini, "   ");
        assert_eq!(store.api_key(ProviderKind::Gemini), None);
        assert_eq!(secrets.get(crate::secrets::account::GEMINI), None);
    }
}
