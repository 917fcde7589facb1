//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod context_reader;
pub mod session_backend;
pub mod transcript_logger;
pub mod transport;
