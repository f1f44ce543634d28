// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Core error type for colocation configuration handling
#[derive(Error, Debug, Diagnostic)]
pub enum ColocationError {
    /// Serialization error
    #[error("Serialization error: {message}")]
    #[diagnostic(
        code(colocation::serialization_error),
        help("Ensure the configuration is valid JSON or YAML using the camelCase field names")
    )]
    SerializationError {
        #[allow(unused)]
        message: String,
        #[source]
        #[allow(unused)]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration file could not be read
    #[error("Failed to read {path}: {message}")]
    #[diagnostic(
        code(colocation::io_error),
        help("Check that the file exists and is readable")
    )]
    IoError {
        #[allow(unused)]
        path: String,
        #[allow(unused)]
        message: String,
        #[source]
        #[allow(unused)]
        source: Option<std::io::Error>,
    },

    /// File extension does not map to a known format
    #[error("Unsupported configuration format: {path}")]
    #[diagnostic(
        code(colocation::unsupported_format),
        help("Use a file ending in .yaml, .yml or .json")
    )]
    UnsupportedFormat {
        #[allow(unused)]
        path: String,
    },
}

/// Result type alias for colocation core operations
pub type Result<T> = std::result::Result<T, ColocationError>;

impl ColocationError {
    /// Create a SerializationError
    pub fn serialization_error(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::SerializationError {
            message: message.into(),
            source,
        }
    }

    /// Create an IoError
    pub fn io_error(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create an UnsupportedFormat error
    pub fn unsupported_format(path: impl Into<String>) -> Self {
        Self::UnsupportedFormat { path: path.into() }
    }
}
