/// Result type for aichemy-index operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the index layer
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database operation failed
    #[error("{}", describe_database_error(.0))]
    Database(#[from] rusqlite::Error),

    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored JSON column could not be decoded or encoded
    #[error("Corrupt project payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Query-specific error (invalid input, bad timestamp, etc.)
    #[error("Query error: {0}")]
    Query(String),
}

fn describe_database_error(err: &rusqlite::Error) -> String {
    let msg = err.to_string();
    // Detect schema mismatch errors and provide actionable hint
    if msg.contains("no such column") || msg.contains("no such table") {
        format!(
            "Database schema mismatch: {}. Please restart the CLI to auto-migrate.",
            msg
        )
    } else {
        format!("Database error: {}", msg)
    }
}
