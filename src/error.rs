use thiserror::Error;

/// Main error type for weekly-recap
#[derive(Error, Debug)]
pub enum RecapError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parsing errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// HTTP/API errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GitHub API errors (recoverable per repository)
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// AI backend errors
    #[error("AI provider error: {0}")]
    AiApi(String),

    /// Calendar API errors
    #[error("Calendar API error: {0}")]
    Calendar(String),

    /// Prompt template errors (missing placeholder, unbalanced braces)
    #[error("Template error: {0}")]
    Template(String),

    /// Missing configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),
}

/// Result type alias for weekly-recap operations
pub type Result<T> = std::result::Result<T, RecapError>;

impl RecapError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new GitHub API error
    pub fn github<S: Into<String>>(msg: S) -> Self {
        Self::GitHubApi(msg.into())
    }

    /// Create a new AI backend error
    pub fn ai_api<S: Into<String>>(msg: S) -> Self {
        Self::AiApi(msg.into())
    }

    /// Create a new calendar error
    pub fn calendar<S: Into<String>>(msg: S) -> Self {
        Self::Calendar(msg.into())
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        Self::Template(msg.into())
    }
}
