use thiserror::Error;

/// Result type alias using ArmorError
pub type Result<T> = std::result::Result<T, ArmorError>;

/// Canonical error type for the ARMOR pipeline
///
/// The variants follow the tool's error categories: invocation errors are
/// handled by the argument parser before this type is ever constructed;
/// parse errors skip the affected header and the run continues; I/O
/// failures exit non-zero; context and internal errors are logic errors
/// and abort the run.
#[derive(Debug, Error)]
pub enum ArmorError {
    /// A report or dump file could not be written
    #[error("failed to write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The front-end could not produce a usable translation unit
    #[error("failed to parse '{file}': {message}")]
    Parse { file: String, message: String },

    /// A value could not be serialized to JSON
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No normalized context exists for the requested file (logic error)
    #[error("no normalized context was created for file: {file}")]
    MissingContext { file: String },

    /// Invariant violation inside the core (logic error)
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ArmorError {
    /// True for errors that skip the current header but let the run continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ArmorError::Parse { .. })
    }
}
