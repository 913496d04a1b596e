//! Per-popover orchestration: one session per captured selection, holding
//! the response text, the in-flight request gauge, and the explain one-shot
//! guard. All state is interior so callers can share the session across
//! tasks behind an `Arc`.

use crate::generator::ResponseGenerator;
use crate::history::{HistoryRecordInput, HistoryStore, InteractionMode};
use crate::selection::{SelectionCaptureResult, normalize_text};
use glance_llm::ProviderKind;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

const FAILURE_PREFIX: &str = "Error: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Explain,
    Ask,
}

pub struct SelectionSession {
    selection: SelectionCaptureResult,
    mode: SessionMode,
    generator: std::sync::Arc<dyn ResponseGenerator>,
    history: Option<HistoryStore>,
    provider_kind: ProviderKind,
    active_app_name: Option<String>,
    response_text: Mutex<String>,
    // Re-armed when the initial explain fails so a reopen can retry.
    explain_attempted: AtomicBool,
    in_flight: AtomicUsize,
}

impl SelectionSession {
    pub fn new(
        selection: SelectionCaptureResult,
        mode: SessionMode,
        generator: std::sync::Arc<dyn ResponseGenerator>,
        provider_kind: ProviderKind,
    ) -> Self {
        Self {
            selection,
            mode,
            generator,
            history: None,
            provider_kind,
            active_app_name: None,
            response_text: Mutex::new(String::new()),
            explain_attempted: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_history(mut self, history: HistoryStore) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_active_app_name(mut self, app_name: Option<String>) -> Self {
        self.active_app_name = app_name;
        self
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn title_text(&self) -> &'static str {
        match self.mode {
            SessionMode::Explain => "Explain Selection",
            SessionMode::Ask => "Ask About Selection",
        }
    }

    pub fn source_text(&self) -> String {
        format!("Source: {}", self.selection.source.display_label())
    }

    pub fn response_text(&self) -> String {
        self.response_text.lock().expect("response lock").clone()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Runs the automatic explain request at most once per session. A
    /// failed attempt re-arms the guard so the next call retries.
    pub async fn load_explain_if_needed(&self) {
        if self.mode != SessionMode::Explain {
            return;
        }
        if self
            .explain_attempted
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        let _guard = LoadingGuard::new(&self.in_flight);
        let result = self
            .generator
            .explain(&self.selection.text, self.selection.source)
            .await;

        match result {
            Ok(response) => {
                self.set_response(&response);
                self.record_history(InteractionMode::Explain, None, &response);
            }
            Err(e) => {
                self.explain_attempted.store(false, Ordering::SeqCst);
                self.set_response(&format!("{FAILURE_PREFIX}{e}"));
            }
        }
    }

    /// Submits a follow-up question. Whitespace-only prompts are ignored
    /// without touching the response text.
    pub async fn submit_prompt(&self, raw_prompt: &str) {
        let Some(prompt) = normalize_text(raw_prompt) else {
            return;
        };

        let _guard = LoadingGuard::new(&self.in_flight);
        let result = self
            .generator
            .answer(&prompt, &self.selection.text, self.selection.source)
            .await;

        match result {
            Ok(response) => {
                self.set_response(&response);
                self.record_history(InteractionMode::Ask, Some(prompt), &response);
            }
            Err(e) => {
                self.set_response(&format!("{FAILURE_PREFIX}{e}"));
            }
        }
    }

    fn set_response(&self, text: &str) {
        *self.response_text.lock().expect("response lock") = text.to_string();
    }

    fn record_history(&self, mode: InteractionMode, prompt: Option<String>, response: &str) {
        let Some(history) = &self.history else {
            return;
        };
        history.record(HistoryRecordInput {
            interaction_mode: mode,
            source: self.selection.source,
            app_name: self.active_app_name.clone(),
            provider: self.provider_kind,
            selection_text: self.selection.text.clone(),
            prompt,
            response_text: response.to_string(),
        });
    }
}

struct LoadingGuard<'a> {
    gauge: &'a AtomicUsize,
}

impl<'a> LoadingGuard<'a> {
    fn new(gauge: &'a AtomicUsize) -> Self {
        gauge.fetch_add(1, Ordering::SeqCst);
        Self { gauge }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.gauge.fetch_sub(1, Ordering::SeqCst);
    }
}
