//! # Ledger Error Types
//!
//! Registration, code generation, configuration and persistence failures.
//! Ledger transition errors live in `stampbook_core::LedgerError`.

use std::path::PathBuf;

use stampbook_core::FieldError;
use thiserror::Error;

/// A code could not be derived from the inputs.
///
/// Callers must treat this as "retry with different input" and never
/// persist a customer bearing the `ERROR-CODE` sentinel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The name contributes no letters.
    #[error("name {0:?} contains no letters")]
    NoLetters(String),

    /// The document number contributes no digits.
    #[error("document number {0:?} contains no digits")]
    NoDigits(String),
}

/// Errors from [`crate::book::CustomerBook::register`]. Nothing is written
/// to the collection when any of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// One or more fields failed validation.
    #[error("validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    /// Another customer already holds this document.
    #[error("a customer with document {cedula} already exists")]
    DuplicateIdentity {
        /// The duplicated document, as `"{idType}-{idNumber}"`.
        cedula: String,
    },

    /// The code generator could not produce a code.
    #[error("code generation failed: {0}")]
    GenerationFailed(#[from] GenerationError),

    /// Every suffix up to the retry cap was taken.
    #[error("code {0} is already taken and the retry limit was reached")]
    CodeExhausted(String),
}

impl RegistrationError {
    /// Field-level view of this error, for form display.
    pub fn field_errors(&self) -> Vec<FieldError> {
        match self {
            Self::Validation(fields) => fields.clone(),
            Self::DuplicateIdentity { .. } => vec![FieldError::new(
                stampbook_core::Field::IdNumber,
                self.to_string(),
            )],
            Self::GenerationFailed(_) | Self::CodeExhausted(_) => Vec::new(),
        }
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Configuration could not be loaded or is out of range.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The YAML is malformed or has wrongly typed keys.
    #[error("malformed config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A value is outside its accepted range.
    #[error("invalid config value for {key}: {reason}")]
    OutOfRange {
        /// Offending key.
        key: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// A persistence collaborator failed.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the backing medium failed.
    #[error("store i/o error at {path}: {source}")]
    Io {
        /// Location of the collection.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The stored collection could not be (de)serialized.
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
