use thiserror::Error;

/// Errors from repository operations (used by trait definitions in tutoria-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Validation errors for user profiles.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("too many interests: at most {max} allowed, got {actual}")]
    TooManyInterests { max: usize, actual: usize },

    #[error("invalid interest: {0}")]
    InvalidInterest(String),

    #[error("persona too long: at most {max} characters allowed, got {actual}")]
    PersonaTooLong { max: usize, actual: usize },
}

/// Errors raised while loading configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {message}")]
    Read { path: String, message: String },

    #[error("failed to parse config file '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("missing API key: set the {env_var} environment variable")]
    MissingApiKey { env_var: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
