//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// These cover synchronous validation failures. They never carry
/// transport or backend detail — those belong to the application layer.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Message content is empty")]
    EmptyContent,

    #[error("Invalid message index: {0}")]
    InvalidIndex(usize),

    #[error("Message at index {0} is not a user message")]
    NotUserMessage(usize),

    #[error("An exchange is already in flight")]
    ExchangeInFlight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            DomainError::EmptyContent.to_string(),
            "Message content is empty"
        );
        assert_eq!(
            DomainError::NotUserMessage(3).to_string(),
            "Message at index 3 is not a user message"
        );
    }
}
