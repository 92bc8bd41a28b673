//! Error types for potion-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from potion-core
    #[error(transparent)]
    Core(#[from] potion_core::Error),

    /// Error from potion-fs
    #[error(transparent)]
    Fs(#[from] potion_fs::Error),

    /// JSON rendering error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The registry did not resolve; the individual errors were already printed
    #[error("{context} failed with {count} error(s)")]
    Unresolved { context: &'static str, count: usize },
}
