//! Use cases (application services)

pub mod chat_controller;

pub use chat_controller::ChatController;
