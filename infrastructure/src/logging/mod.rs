//! Structured logging adapters.

pub mod jsonl_logger;
