//! # Error Types — Structured Error Hierarchy
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Validation errors are detected before any state mutation and are
//!   reported per field, so a form can highlight every offending input
//!   at once.
//! - Ledger errors carry the numbers needed to explain the rejection
//!   (stamps held vs stamps required).
//! - Expected business conditions are values, never panics.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity field a validation failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// Customer display name.
    Name,
    /// Contact phone number.
    Phone,
    /// Document type prefix (`V`, `E`, `J`).
    IdType,
    /// Document number.
    IdNumber,
}

impl Field {
    /// The wire name of this field, matching the record's JSON keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::IdType => "idType",
            Self::IdNumber => "idNumber",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failure for a single identity field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is shorter than the minimum length after trimming.
    #[error("name must have at least {min} characters, got {got:?}")]
    NameTooShort {
        /// Minimum accepted length.
        min: usize,
        /// The rejected input.
        got: String,
    },

    /// Phone does not have 8-15 digits after normalization.
    #[error("phone must have 8 to 15 digits, got {0:?}")]
    InvalidPhone(String),

    /// Document type is not one of `V`, `E`, `J`.
    #[error("document type must be V, E or J, got {0:?}")]
    InvalidIdType(String),

    /// Document number does not have 6-12 digits after normalization.
    #[error("document number must have 6 to 12 digits, got {0:?}")]
    InvalidIdNumber(String),
}

impl ValidationError {
    /// The field this failure is attributed to.
    pub fn field(&self) -> Field {
        match self {
            Self::NameTooShort { .. } => Field::Name,
            Self::InvalidPhone(_) => Field::Phone,
            Self::InvalidIdType(_) => Field::IdType,
            Self::InvalidIdNumber(_) => Field::IdNumber,
        }
    }
}

/// A field-level error as reported to a caller (e.g. a form).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// The offending field.
    pub field: Field,
    /// Human-readable explanation.
    pub message: String,
}

impl FieldError {
    /// Build a field error with an arbitrary message.
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl From<ValidationError> for FieldError {
    fn from(err: ValidationError) -> Self {
        Self {
            field: err.field(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A timestamp string could not be interpreted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid timestamp {input:?}: {reason}")]
pub struct TimestampError {
    /// The rejected input.
    pub input: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Errors raised by ledger transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Redemption attempted without a full reward's worth of stamps.
    #[error("insufficient stamps: have {have}, need {need}")]
    InsufficientStamps {
        /// Stamps currently held.
        have: u32,
        /// Stamps required for one reward.
        need: u32,
    },

    /// No customer with the given id exists in the collection.
    #[error("unknown customer: {0}")]
    UnknownCustomer(String),
}
