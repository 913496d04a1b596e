//! Glance command-line harness.
//!
//! The desktop shell (hotkeys, popover UI) lives elsewhere; this binary
//! drives the same core: capture text, resolve a provider, generate an
//! explanation or an answer, record history.

mod generator;
mod history;
mod secrets;
mod selection;
mod session;
mod settings;

use clap::Parser;
use generator::{DebugResponseGenerator, ProviderResponseGenerator, ResponseGenerator};
use glance_llm::{ProviderKind, ReqwestTransport, make_provider};
use history::{DEFAULT_MAX_ENTRIES, FileHistoryPersistence, HistoryStore};
use secrets::KeyringSecretStore;
use selection::{SelectionCapture, SelectionCaptureResult, SelectionSource, normalize_text};
use session::{SelectionSession, SessionMode};
use settings::{SettingsStore, default_preferences_path};
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const KEYRING_SERVICE: &str = "dev.glance.app";

#[derive(Debug, Parser)]
#[command(name = "glance", version, about = "Explain or ask about selected text")]
struct Cli {
    /// Text to explain. Reads stdin when omitted.
    text: Option<String>,

    /// Ask a question about the text instead of explaining it.
    #[arg(long, value_name = "QUESTION")]
    ask: Option<String>,

    /// Override the configured provider (gemini, anthropic, openai, local).
    #[arg(long)]
    provider: Option<String>,

    /// Echo the input instead of calling a provider.
    #[arg(long)]
    debug: bool,

    /// Skip recording this interaction in history.
    #[arg(long)]
    no_history: bool,
}

/// CLI stand-in for the desktop capture service: the argument plays the
/// accessibility path, piped stdin plays the clipboard fallback.
struct StdinSelectionCapture {
    argument: Option<String>,
}

impl SelectionCapture for StdinSelectionCapture {
    fn capture_selection(&self) -> Option<SelectionCaptureResult> {
        if let Some(text) = self.argument.as_deref().and_then(normalize_text) {
            return Some(SelectionCaptureResult {
                text,
                source: SelectionSource::Accessibility,
            });
        }
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer).ok()?;
        Some(SelectionCaptureResult {
            text: normalize_text(&buffer)?,
            source: SelectionSource::Clipboard,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;
    install_panic_hook();

    let cli = Cli::parse();

    let capture = StdinSelectionCapture {
        argument: cli.text.clone(),
    };
    let Some(selection) = capture.capture_selection() else {
        anyhow::bail!("no text to work with; pass an argument or pipe stdin");
    };

    let settings = SettingsStore::load(
        default_preferences_path(),
        Arc::new(KeyringSecretStore::new(KEYRING_SERVICE)),
    );
    let environment: HashMap<String, String> = std::env::vars().collect();
    let mut configuration = settings.runtime_configuration(&environment);

    if let Some(raw) = &cli.provider {
        // One-shot override; never persisted back into preferences.
        configuration.default_provider = ProviderKind::parse(raw)
            .ok_or_else(|| anyhow::anyhow!("unknown provider {raw:?}"))?;
    }
    let provider_kind = configuration.default_provider;

    let generator: Arc<dyn ResponseGenerator> = if cli.debug {
        Arc::new(DebugResponseGenerator)
    } else {
        let transport = Arc::new(ReqwestTransport::new());
        Arc::new(ProviderResponseGenerator::new(make_provider(
            &configuration,
            transport,
        )))
    };

    let history = if cli.no_history {
        None
    } else {
        let persistence = Arc::new(FileHistoryPersistence::new(
            FileHistoryPersistence::default_path(),
        ));
        Some(HistoryStore::load_or_new(persistence, DEFAULT_MAX_ENTRIES).await)
    };

    let mode = if cli.ask.is_some() {
        SessionMode::Ask
    } else {
        SessionMode::Explain
    };
    let mut session = SelectionSession::new(selection, mode, generator, provider_kind);
    if let Some(history) = history.clone() {
        session = session.with_history(history);
    }

    match &cli.ask {
        Some(question) => session.submit_prompt(question).await,
        None => session.load_explain_if_needed().await,
    }

    let response = session.response_text();
    if response.is_empty() {
        anyhow::bail!("empty prompt; nothing to ask");
    }
    println!("{response}");

    if let Some(history) = &history {
        if let Err(e) = history.flush().await {
            tracing::warn!(error = %e, "history flush failed");
        }
    }
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,glance=debug,glance_llm=debug"));
    let log_format = std::env::var("GLANCE_LOG_FORMAT")
        .unwrap_or_else(|_| "compact".to_string())
        .to_ascii_lowercase();

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .json()
                .flatten_event(true)
                .init();
        }
        "pretty" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .pretty()
                .init();
        }
        "compact" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .compact()
                .init();
        }
        other => {
            anyhow::bail!(
                "unsupported GLANCE_LOG_FORMAT={other:?}; expected one of: json, pretty, compact"
            );
        }
    }
    Ok(())
}

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        tracing::error!(panic_location = %location, "panic captured");
        default_hook(panic_info);
    }));
}
