//! Append-only interaction history.
//!
//! Mutations happen synchronously in memory and bump a version counter;
//! every mutation schedules a background save of the full snapshot. The
//! initial load from disk is guarded by that same counter: if anything
//! mutated the collection while the load was in flight, the loaded result
//! is stale and gets discarded instead of clobbering newer state.

use crate::selection::SelectionSource;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use glance_llm::ProviderKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_MAX_ENTRIES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    Explain,
    Ask,
}

impl InteractionMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Explain => "Explain",
            Self::Ask => "Ask",
        }
    }
}

/// What the orchestrator hands over on a successful generation; the store
/// assigns id and timestamp at record time.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecordInput {
    pub interaction_mode: InteractionMode,
    pub source: SelectionSource,
    pub app_name: Option<String>,
    pub provider: ProviderKind,
    pub selection_text: String,
    pub prompt: Option<String>,
    pub response_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub interaction_mode: InteractionMode,
    pub source: SelectionSource,
    pub app_name: Option<String>,
    pub provider: ProviderKind,
    pub selection_text: String,
    pub prompt: Option<String>,
    pub response_text: String,
}

#[derive(Debug, Error)]
pub enum HistoryIoError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Whole-collection durable storage; there is no query capability.
#[async_trait]
pub trait HistoryPersistence: Send + Sync {
    async fn load(&self) -> Result<Vec<HistoryEntry>, HistoryIoError>;
    async fn save(&self, entries: &[HistoryEntry]) -> Result<(), HistoryIoError>;
}

pub struct FileHistoryPersistence {
    path: PathBuf,
}

impl FileHistoryPersistence {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        Path::new(&home).join(".glance").join("history.json")
    }
}

#[async_trait]
impl HistoryPersistence for FileHistoryPersistence {
    async fn load(&self) -> Result<Vec<HistoryEntry>, HistoryIoError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, entries: &[HistoryEntry]) -> Result<(), HistoryIoError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let encoded = serde_json::to_vec(entries)?;
        // Write-then-rename keeps a crash from truncating the log.
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, encoded).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct HistoryStore {
    inner: Arc<HistoryInner>,
}

struct HistoryInner {
    persistence: Arc<dyn HistoryPersistence>,
    max_entries: usize,
    state: Mutex<HistoryState>,
}

#[derive(Default)]
struct HistoryState {
    entries: Vec<HistoryEntry>,
    version: u64,
    last_error: Option<String>,
}

impl HistoryStore {
    pub fn new(persistence: Arc<dyn HistoryPersistence>, max_entries: usize) -> Self {
        Self {
            inner: Arc::new(HistoryInner {
                persistence,
                max_entries,
                state: Mutex::new(HistoryState::default()),
            }),
        }
    }

    /// Constructs the store and runs the guarded initial load to completion.
    pub async fn load_or_new(persistence: Arc<dyn HistoryPersistence>, max_entries: usize) -> Self {
        let store = Self::new(persistence, max_entries);
        store.load_initial().await;
        store
    }

    /// Reads the durable snapshot and applies it only if nothing mutated the
    /// collection since the load started. A failed load leaves the
    /// collection empty and surfaces the error message.
    pub async fn load_initial(&self) {
        let version_at_start = self.lock_state().version;
        let loaded = self.inner.persistence.load().await;

        let mut state = self.lock_state();
        if state.version != version_at_start {
            tracing::debug!("discarding stale history load");
            return;
        }
        match loaded {
            Ok(mut entries) => {
                entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                state.entries = entries;
                state.last_error = None;
            }
            Err(e) => {
                state.entries = Vec::new();
                state.last_error = Some(format!("failed to load history: {e}"));
            }
        }
    }

    /// Assigns id and timestamp, inserts at the head, trims to the cap, and
    /// schedules a background save of the resulting snapshot.
    pub fn record(&self, input: HistoryRecordInput) -> HistoryEntry {
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            interaction_mode: input.interaction_mode,
            source: input.source,
            app_name: input.app_name,
            provider: input.provider,
            selection_text: input.selection_text,
            prompt: input.prompt,
            response_text: input.response_text,
        };

        let snapshot = {
            let mut state = self.lock_state();
            state.entries.insert(0, entry.clone());
            state.entries.truncate(self.inner.max_entries);
            state.version += 1;
            state.entries.clone()
        };
        self.persist_in_background(snapshot);
        entry
    }

    pub fn clear_all(&self) {
        {
            let mut state = self.lock_state();
            state.entries.clear();
            state.version += 1;
        }
        self.persist_in_background(Vec::new());
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock_state().entries.clone()
    }

    pub fn entry(&self, id: Option<Uuid>) -> Option<HistoryEntry> {
        let id = id?;
        self.lock_state()
            .entries
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock_state().last_error.clone()
    }

    /// Saves the current snapshot inline. Used at shutdown so a
    /// fire-and-forget save still in flight cannot be lost with the process.
    pub async fn flush(&self) -> Result<(), HistoryIoError> {
        let snapshot = self.entries();
        self.inner.persistence.save(&snapshot).await
    }

    fn persist_in_background(&self, snapshot: Vec<HistoryEntry>) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let result = inner.persistence.save(&snapshot).await;
            let mut state = inner.state.lock().expect("history state lock");
            state.last_error = match result {
                Ok(()) => None,
                Err(e) => {
                    tracing::warn!(error = %e, "history save failed");
                    Some(format!("failed to save history: {e}"))
                }
            };
        });
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, HistoryState> {
        self.inner.state.lock().expect("history state lock")
    }
}
