//! Credential storage behind a narrow trait: one account per provider API
//! key. The production store sits on the OS credential manager via the
//! `keyring` crate; the in-memory store backs tests and headless runs.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Mutex;

pub mod account {
    pub const GEMINI: &str = "gemini.api_key";
    pub const ANTHROPIC: &str = "anthropic.api_key";
    pub const OPENAI: &str = "openai.api_key";
    pub const LOCAL: &str = "local.api_key";
}

pub trait SecretStore: Send + Sync {
    fn get(&self, account: &str) -> Option<String>;
    fn set(&self, account: &str, value: &str) -> Result<()>;
    fn remove(&self, account: &str) -> Result<()>;
}

pub struct KeyringSecretStore {
    service: String,
}

impl KeyringSecretStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, account: &str) -> Result<keyring::Entry> {
        Ok(keyring::Entry::new(&self.service, account)?)
    }
}

impl SecretStore for KeyringSecretStore {
    fn get(&self, account: &str) -> Option<String> {
        let entry = keyring::Entry::new(&self.service, account).ok()?;
        match entry.get_password() {
            Ok(value) => Some(value),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                tracing::warn!(account, error = %e, "keyring read failed");
                None
            }
        }
    }

    fn set(&self, account: &str, value: &str) -> Result<()> {
        self.entry(account)?.set_password(value)?;
        Ok(())
    }

    fn remove(&self, account: &str) -> Result<()> {
        match self.entry(account)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Default)]
pub struct InMemorySecretStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for InMemorySecretStore {
    fn get(&self, account: &str) -> Option<String> {
        self.values
            .lock()
            .expect("secret store lock")
            .get(account)
            .cloned()
    }

    fn set(&self, account: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .expect("secret store lock")
            .insert(account.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, account: &str) -> Result<()> {
        self.values
            .lock()
            .expect("secret store lock")
            .remove(account);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_store_round_trips_and_removes() {
        let store = InMemorySecretStore::new();
        assert_eq!(store.get(account::GEMINI), None);

        store.set(account::GEMINI, "secret").expect("set");
        assert_eq!(store.get(account::GEMINI), Some("secret".to_string()));

        store.remove(account::GEMINI).expect("remove");
        assert_eq!(store.get(account::GEMINI), None);
    }
}
