//! Error types for Pyre

use thiserror::Error;

/// The main error type for Pyre operations
#[derive(Debug, Error)]
pub enum PyreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),

    #[error("Render error: {0}")]
    RenderError(String),
}

/// Result type alias for Pyre operations
pub type Result<T> = std::result::Result<T, PyreError>;

impl From<toml::de::Error> for PyreError {
    fn from(err: toml::de::Error) -> Self {
        PyreError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for PyreError {
    fn from(err: toml::ser::Error) -> Self {
        PyreError::TomlSerError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_errors_convert() {
        let err: PyreError = toml::from_str::<toml::value::Table>("capacity = [")
            .unwrap_err()
            .into();
        assert!(matches!(err, PyreError::TomlParseError(_)));
        assert!(err.to_string().starts_with("TOML parse error"));
    }

    #[test]
    fn io_errors_convert() {
        let err: PyreError = std::fs::read_to_string("/nonexistent/pyre/fire.toml")
            .unwrap_err()
            .into();
        assert!(matches!(err, PyreError::IoError(_)));
        assert!(err.to_string().starts_with("IO error"));
    }
}
