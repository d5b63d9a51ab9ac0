//! # Identity Newtypes
//!
//! Domain-primitive newtypes for customer identifiers. Each identifier is a
//! distinct type — you cannot pass an [`EventId`] where a [`CustomerId`] is
//! expected.
//!
//! ## Validation
//!
//! [`IdType`] validates at construction. Opaque handles ([`CustomerId`],
//! [`EventId`]) are always valid; fresh ones are UUID v4 strings, while
//! records written by older clients may carry numeric handles, which are
//! accepted and kept in their decimal form.
//!
//! ## Field Rules
//!
//! - Document numbers: 6–12 digits after stripping non-digits.
//! - Phones: 8–15 digits after stripping non-digits.
//! - Names: at least [`MIN_NAME_LEN`] characters after trimming.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Reserved code returned when a code cannot be derived from the inputs.
/// A customer bearing this code must never be persisted.
pub const ERROR_CODE: &str = "ERROR-CODE";

/// Minimum trimmed name length accepted at registration.
pub const MIN_NAME_LEN: usize = 3;

/// Accepted document number length, in digits.
pub const ID_NUMBER_DIGITS: std::ops::RangeInclusive<usize> = 6..=12;

/// Accepted phone length, in digits.
pub const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 8..=15;

/// Opaque handles arrive either as strings or as bare JSON integers
/// (timestamp-derived ids from older clients).
#[derive(Deserialize)]
#[serde(untagged)]
enum OpaqueHandle {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl From<OpaqueHandle> for String {
    fn from(raw: OpaqueHandle) -> Self {
        match raw {
            OpaqueHandle::Text(s) => s,
            OpaqueHandle::Signed(n) => n.to_string(),
            OpaqueHandle::Unsigned(n) => n.to_string(),
        }
    }
}

/// Implements `Deserialize` for an opaque string handle, accepting either
/// a JSON string or a JSON integer.
macro_rules! impl_opaque_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                OpaqueHandle::deserialize(deserializer).map(|raw| Self(raw.into()))
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Opaque handles
// ---------------------------------------------------------------------------

/// Unique handle for a customer. Assigned at creation, immutable, never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CustomerId(String);

impl_opaque_deserialize!(CustomerId);

impl CustomerId {
    /// Create a fresh random customer handle.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing handle as-is.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Access the handle.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CustomerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique handle for a purchase or redemption event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EventId(String);

impl_opaque_deserialize!(EventId);

impl EventId {
    /// Create a fresh random event handle.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing handle as-is.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Access the handle.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Document type
// ---------------------------------------------------------------------------

/// Document type prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum IdType {
    /// National natural person.
    V,
    /// Foreign resident.
    E,
    /// Juridical entity.
    J,
}

impl IdType {
    /// Every accepted document type.
    pub const ALL: [IdType; 3] = [IdType::V, IdType::E, IdType::J];

    /// Parse after trimming and case-folding. Unknown values yield `None`.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "V" => Some(Self::V),
            "E" => Some(Self::E),
            "J" => Some(Self::J),
            _ => None,
        }
    }

    /// The single-letter prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V => "V",
            Self::E => "E",
            Self::J => "J",
        }
    }
}

impl std::str::FromStr for IdType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_lenient(s).ok_or_else(|| ValidationError::InvalidIdType(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for IdType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for IdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serde helper for stored records: a missing, empty or unrecognised
/// document type deserializes as `None` instead of failing the whole load.
pub fn deserialize_lenient_id_type<'de, D>(deserializer: D) -> Result<Option<IdType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(IdType::parse_lenient))
}

// ---------------------------------------------------------------------------
// Customer code
// ---------------------------------------------------------------------------

/// Short human-readable customer code, e.g. `JUA5678` or `JUA5678-1`.
///
/// Unique within a collection and immutable once assigned. An empty code
/// marks a record written before codes existed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerCode(String);

impl CustomerCode {
    /// Wrap a code string.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The generation-failure sentinel.
    pub fn sentinel() -> Self {
        Self(ERROR_CODE.to_string())
    }

    /// Whether this is the generation-failure sentinel.
    pub fn is_sentinel(&self) -> bool {
        self.0 == ERROR_CODE
    }

    /// Whether no code has been assigned.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this code can identify a persisted customer.
    pub fn is_assigned(&self) -> bool {
        !self.is_empty() && !self.is_sentinel()
    }

    /// Case-insensitive comparison against user input.
    pub fn matches(&self, input: &str) -> bool {
        self.0.eq_ignore_ascii_case(input.trim())
    }

    /// Access the code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CustomerCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Field normalization and validation
// ---------------------------------------------------------------------------

/// Strip every character that is not an ASCII digit.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Normalize a phone number to digits only.
pub fn normalize_phone(raw: &str) -> String {
    digits_only(raw)
}

/// Validate a display name, returning it trimmed.
pub fn validate_name(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.chars().count() < MIN_NAME_LEN {
        return Err(ValidationError::NameTooShort {
            min: MIN_NAME_LEN,
            got: raw.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Validate a phone number, returning its digit-only form.
pub fn validate_phone(raw: &str) -> Result<String, ValidationError> {
    let digits = normalize_phone(raw);
    if !PHONE_DIGITS.contains(&digits.len()) {
        return Err(ValidationError::InvalidPhone(raw.to_string()));
    }
    Ok(digits)
}

/// Validate a document number, returning its digit-only form.
pub fn validate_id_number(raw: &str) -> Result<String, ValidationError> {
    let digits = digits_only(raw);
    if !ID_NUMBER_DIGITS.contains(&digits.len()) {
        return Err(ValidationError::InvalidIdNumber(raw.to_string()));
    }
    Ok(digits)
}
