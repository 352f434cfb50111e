/// Result type for aichemy-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the types layer
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A message role outside {user, assistant}
    #[error("Unknown message role: {0}")]
    UnknownRole(String),

    /// Payload could not be decoded
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_role_message() {
        let err = Error::UnknownRole("system".to_string());
        assert_eq!(err.to_string(), "Unknown message role: system");
    }
}
