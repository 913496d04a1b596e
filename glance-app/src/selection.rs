//! Captured-selection types. The OS-level capture (accessibility tree walk,
//! clipboard-copy fallback) lives outside this core and is consumed through
//! the [`SelectionCapture`] trait.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionSource {
    Accessibility,
    Clipboard,
}

impl SelectionSource {
    pub fn display_label(&self) -> &'static str {
        match self {
            Self::Accessibility => "Accessibility",
            Self::Clipboard => "Clipboard fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionCaptureResult {
    pub text: String,
    pub source: SelectionSource,
}

pub trait SelectionCapture: Send + Sync {
    /// Returns the current selection, or `None` when nothing usable is
    /// selected. Implementations hand back already-validated text.
    fn capture_selection(&self) -> Option<SelectionCaptureResult>;
}

/// Shared normalization for selections and submitted prompts: trim
/// surrounding whitespace, reject what's left if empty.
pub fn normalize_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}
