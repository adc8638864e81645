//! Error types for the onboarding wizard.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Snapshot storage errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A step refused to let the user leave it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error(
        "Please select at least one document type, or select \"Not Sure / Don't Remember\" if you're uncertain."
    )]
    NoDocumentSelected,
}

/// Errors raised by wizard operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Step {step} does not exist (wizard has {step_count} steps)")]
    UnknownStep { step: u32, step_count: u32 },

    #[error("Unknown document type: {value}")]
    UnknownDocument { value: String },

    #[error("Document type {value} is not part of the upload section")]
    NotInUploadSection { value: String },

    #[error("Invalid date for {value}: {date} (expected YYYY-MM-DD)")]
    InvalidDate { value: String, date: String },
}

/// Errors while assembling a submission or building its multipart form.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("No content available for {file_name} ({doc_value})")]
    MissingContent { doc_value: String, file_name: String },

    #[error("Invalid content type for {file_name}: {reason}")]
    ContentType { file_name: String, reason: String },

    #[error("Failed to encode selected documents: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
