//! Infrastructure layer for parley
//!
//! This crate contains the adapters behind the application layer's ports:
//! the HTTP streaming backend, an in-memory echo backend for offline use
//! and tests, the JSONL transcript logger, and the configuration loader.

pub mod backend;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use backend::http::HttpBackend;
pub use backend::memory::InMemoryBackend;
pub use config::loader::{AppConfig, BackendConfig, ConfigLoader, LoggingConfig, ReplConfig};
pub use logging::jsonl_logger::JsonlTranscriptLogger;
