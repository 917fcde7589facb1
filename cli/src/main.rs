//! CLI entrypoint for parley
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::Result;
use clap::Parser;
use parley_application::{ChatController, ChatTransport, ContextReader, SessionBackend};
use parley_domain::SessionId;
use parley_infrastructure::{
    AppConfig, ConfigLoader, HttpBackend, InMemoryBackend, JsonlTranscriptLogger,
};
use parley_presentation::{ChatRepl, Cli};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    // Load configuration
    let config = if cli.no_config {
        AppConfig::default()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };

    // Tracing goes to a file when configured, stderr otherwise. The
    // guard must outlive main for the non-blocking writer to flush.
    let _log_guard = match config.logging.log_file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let file = path.file_name().unwrap_or_else(|| "parley.log".as_ref());
            let appender =
                tracing_appender::rolling::never(dir.unwrap_or_else(|| Path::new(".")), file);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .init();
            None
        }
    };

    info!("Starting parley");

    // === Dependency Injection ===
    // One concrete backend serves all three ports.
    let backend_url = cli.backend.clone().or_else(|| config.backend.url.clone());
    let (transport, store, context): (
        Arc<dyn ChatTransport>,
        Arc<dyn SessionBackend>,
        Arc<dyn ContextReader>,
    ) = match backend_url {
        Some(url) => {
            info!("Using agent backend at {}", url);
            let mut builder = reqwest::Client::builder();
            if let Some(secs) = config.backend.request_timeout_seconds {
                builder = builder.connect_timeout(Duration::from_secs(secs));
            }
            let backend = Arc::new(HttpBackend::new(url).with_client(builder.build()?));
            (backend.clone(), backend.clone(), backend)
        }
        None => {
            info!("No backend configured, using the built-in echo backend");
            let backend = Arc::new(InMemoryBackend::new());
            (backend.clone(), backend.clone(), backend)
        }
    };

    // Establish the initial session
    let session_id = match store.create_session().await {
        Ok(id) => id,
        Err(e) => {
            warn!("backend session create failed, minting local id: {}", e);
            SessionId::generate()
        }
    };

    let mut controller = ChatController::new(transport, store, context, session_id);

    // Optional JSONL transcript log
    let transcript_path = cli
        .transcript_log
        .clone()
        .or_else(|| config.logging.transcript_file.as_deref().map(PathBuf::from));
    if let Some(path) = transcript_path
        && let Some(logger) = JsonlTranscriptLogger::new(&path)
    {
        info!("Writing transcript to {}", logger.path().display());
        controller = controller.with_transcript_logger(Arc::new(logger));
    }

    if let Err(e) = controller.refresh_sessions().await {
        warn!("could not list sessions: {}", e);
    }

    let show_progress = !cli.quiet && config.repl.show_progress;
    let mut repl = ChatRepl::new(controller).with_progress(show_progress);

    // One-shot mode: send, stream, exit
    match cli.message {
        Some(message) => repl.run_once(&message).await,
        None => repl.run().await?,
    }

    Ok(())
}
