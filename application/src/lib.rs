//! Application layer for parley
//!
//! This crate contains the chat controller use case and the port
//! definitions its adapters implement. It depends only on the domain
//! layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    context_reader::ContextReader,
    session_backend::{BackendError, SessionBackend},
    transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger},
    transport::{ChatTransport, StreamHandle, TransportError},
};
pub use use_cases::chat_controller::ChatController;
