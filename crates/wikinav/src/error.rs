//! CLI error types.

use wikinav_config::ConfigError;
use wikinav_storage::StorageError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize sidebar: {0}")]
    Json(#[from] serde_json::Error),
}
