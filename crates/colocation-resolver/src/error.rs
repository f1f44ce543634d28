// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Resolver error type
#[derive(Error, Debug, Diagnostic)]
pub enum ResolverError {
    /// Label selector could not be compiled into a matcher
    #[error("Invalid label selector: {reason}")]
    #[diagnostic(
        code(resolver::invalid_selector),
        help("Use operators In, NotIn, Exists or DoesNotExist and valid label keys and values")
    )]
    InvalidSelector { reason: String },

    /// Override cannot be merged onto the base strategy
    #[error("Cannot merge {field}: {reason}")]
    #[diagnostic(
        code(resolver::incompatible_merge),
        help("Make the override use the same value shape as the strategy it is applied to")
    )]
    IncompatibleMerge { field: String, reason: String },

    /// Strategy set failed validation
    #[error("Validation failed for {target}: {details}")]
    #[diagnostic(
        code(resolver::validation_failed),
        help("{help_text}")
    )]
    ValidationFailed {
        target: String,
        details: String,
        help_text: String,
    },

    /// Core error
    #[error("Core error: {0}")]
    #[diagnostic(
        code(resolver::core_error),
        help("Check the configuration file")
    )]
    CoreError(#[from] colocation_core::ColocationError),
}

/// Result type for resolver operations
pub type Result<T> = std::result::Result<T, ResolverError>;

impl ResolverError {
    /// Create an InvalidSelector error
    pub fn invalid_selector(reason: impl Into<String>) -> Self {
        Self::InvalidSelector {
            reason: reason.into(),
        }
    }

    /// Create an IncompatibleMerge error
    pub fn incompatible_merge(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::IncompatibleMerge {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a ValidationFailed error
    pub fn validation_failed(
        target: impl Into<String>,
        details: impl Into<String>,
        help_text: impl Into<String>,
    ) -> Self {
        Self::ValidationFailed {
            target: target.into(),
            details: details.into(),
            help_text: help_text.into(),
        }
    }
}
