//! Core domain concepts shared across all subdomains.
//!
//! - [`id::SessionId`] — opaque session identifier
//! - [`error::DomainError`] — domain-level errors
//! - [`string`] — preview and log truncation helpers

pub mod error;
pub mod id;
pub mod string;
