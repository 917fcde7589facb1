//! Backend adapters.
//!
//! - [`http::HttpBackend`] — talks to a running agent server over HTTP
//!   with newline-delimited JSON streaming
//! - [`memory::InMemoryBackend`] — self-contained echo backend for
//!   offline use and tests

pub mod http;
pub mod memory;
