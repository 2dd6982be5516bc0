use thiserror::Error;

/// Errors produced by a generation round trip (recipe or image)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// Network failure or a non-success status from the generator
    #[error("Transport error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// The generator answered, but the payload was missing or malformed
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Client is missing credentials or other required settings
    #[error("Generator not configured: {0}")]
    NotConfigured(String),
}

impl GenerationError {
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        GenerationError::Transport {
            status,
            message: message.into(),
        }
    }

    /// Only connectivity problems are worth another attempt; a malformed
    /// answer will come back malformed again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerationError::Transport { .. })
    }
}

impl From<reqwest::Error> for GenerationError {
    // The request URL is stripped so credentials and query strings never
    // reach logs or status text.
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.without_url().to_string(),
        }
    }
}

/// User-input and session preconditions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Please add at least one ingredient to generate a recipe.")]
    EmptyIngredients,

    #[error("Ingredient already added: {0}")]
    Duplicate(String),

    /// A generation run is already in flight
    #[error("A recipe is already being generated")]
    Busy,

    #[error("Nothing to save!")]
    NothingToSave,

    #[error("No saved recipe with id {0}")]
    UnknownRecipe(i64),
}

/// Local persistence failures. These never escape the archive; they are
/// logged and the archive degrades to what it holds in memory.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Top-level error for the binary and the session builder
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
