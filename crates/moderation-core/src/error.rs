//! Error types for the moderation pipeline

/// Result type alias using the moderation Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for moderation operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Lemmatizer model could not be loaded
    #[error("lemmatizer error: {0}")]
    Lemmatizer(String),

    /// Persisted artifacts are missing or inconsistent
    #[error("artifact error: {0}")]
    Artifact(String),

    /// Dataset definition errors
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Classifier fitting or inference errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML errors
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Binary artifact encoding errors
    #[error("encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

impl Error {
    /// Create a new lemmatizer error
    pub fn lemmatizer(msg: impl Into<String>) -> Self {
        Self::Lemmatizer(msg.into())
    }

    /// Create a new artifact error
    pub fn artifact(msg: impl Into<String>) -> Self {
        Self::Artifact(msg.into())
    }

    /// Create a new dataset error
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
