use std::path::PathBuf;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the application
#[derive(Debug)]
pub enum Error {
    InvalidRoute { uri: String, reason: String },
    ConfigError { file: PathBuf, message: String },
}

impl Error {
    /// Shorthand for a route that cannot be turned into a `RouteRecord`
    pub fn invalid_route(uri: &str, reason: impl Into<String>) -> Self {
        Error::InvalidRoute {
            uri: uri.to_string(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::InvalidRoute { uri, reason } => {
                write!(f, "invalid route '{}': {}", uri, reason)
            }
            Error::ConfigError { file, message } => {
                write!(f, "configuration error in {}: {}", file.display(), message)
            }
        }
    }
}

impl std::error::Error for Error {}
