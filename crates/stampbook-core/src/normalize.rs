//! # Identifier Normalizer
//!
//! Canonicalizes raw identity input (document type, document number and the
//! composite cédula string) into a [`CanonicalIdentity`], or reports that the
//! document type cannot be inferred.
//!
//! ## Algorithm
//!
//! 1. Trim and case-fold the type; strip non-digits from the number.
//! 2. If either is missing and a cédula is present, parse it as
//!    `<V|E|J><optional separator><digits>` and fill the gaps.
//! 3. A number without a type (including an all-digit cédula) is
//!    [`Normalization::Ambiguous`]: the proposal defaults to `V` but is
//!    never committed by this function.
//! 4. A type without a number adopts the digits of an all-digit cédula.
//! 5. With both present the cédula is recomputed; the result is
//!    [`Normalization::Changed`] only if any of the three stored fields
//!    differs from the input.
//!
//! Normalization never fails: every input maps to exactly one variant.

use serde::{Deserialize, Serialize};

use crate::identity::{digits_only, IdType};

/// Identity fields exactly as they were stored or typed. Missing values are
/// empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawIdentity {
    /// Document type as entered.
    pub id_type: String,
    /// Document number as entered.
    pub id_number: String,
    /// Composite cédula string as entered.
    pub cedula: String,
}

impl RawIdentity {
    /// Build a raw identity from borrowed fields.
    pub fn new(id_type: &str, id_number: &str, cedula: &str) -> Self {
        Self {
            id_type: id_type.to_string(),
            id_number: id_number.to_string(),
            cedula: cedula.to_string(),
        }
    }

    /// A raw identity carrying only a cédula string.
    pub fn from_cedula(cedula: &str) -> Self {
        Self {
            cedula: cedula.to_string(),
            ..Self::default()
        }
    }
}

/// A fully determined identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalIdentity {
    /// Document type.
    pub id_type: IdType,
    /// Digit-only document number.
    pub id_number: String,
}

impl CanonicalIdentity {
    /// Build a canonical identity, stripping non-digits from the number.
    pub fn new(id_type: IdType, id_number: &str) -> Self {
        Self {
            id_type,
            id_number: digits_only(id_number),
        }
    }

    /// The composite display string `"{idType}-{idNumber}"`.
    pub fn cedula(&self) -> String {
        format!("{}-{}", self.id_type, self.id_number)
    }
}

impl std::fmt::Display for CanonicalIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.id_type, self.id_number)
    }
}

/// Outcome of normalizing one raw identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalization {
    /// Already canonical; nothing to write.
    Unchanged(CanonicalIdentity),
    /// Canonical form differs from the stored fields and should be committed.
    Changed(CanonicalIdentity),
    /// A number was found but its type could not be inferred. Carries a
    /// proposal (type `V`) that requires caller confirmation.
    Ambiguous(CanonicalIdentity),
    /// Not enough information to build or propose an identity.
    Incomplete {
        /// Type recovered so far, if any.
        id_type: Option<IdType>,
        /// Digits recovered so far (possibly empty).
        id_number: String,
    },
}

impl Normalization {
    /// The committed canonical identity, if any.
    pub fn canonical(&self) -> Option<&CanonicalIdentity> {
        match self {
            Self::Unchanged(c) | Self::Changed(c) => Some(c),
            Self::Ambiguous(_) | Self::Incomplete { .. } => None,
        }
    }

    /// Whether the stored fields should be rewritten.
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }

    /// Whether the record needs a caller decision.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Ambiguous(_))
    }
}

/// Normalize a raw identity. See the module documentation for the rules.
pub fn normalize_identity(raw: &RawIdentity) -> Normalization {
    let mut id_type = IdType::parse_lenient(&raw.id_type);
    let mut id_number = digits_only(&raw.id_number);
    let cedula = raw.cedula.trim();

    if (id_type.is_none() || id_number.is_empty()) && !cedula.is_empty() {
        if let Some(parsed) = parse_prefixed_cedula(cedula) {
            if id_type.is_none() {
                id_type = Some(parsed.id_type);
            }
            if id_number.is_empty() {
                id_number = parsed.id_number;
            }
        }
    }

    let bare_digits = bare_cedula_digits(cedula);

    let Some(id_type) = id_type else {
        if id_number.is_empty() {
            if let Some(digits) = bare_digits {
                id_number = digits;
            }
        }
        if id_number.is_empty() {
            return Normalization::Incomplete {
                id_type: None,
                id_number,
            };
        }
        return Normalization::Ambiguous(CanonicalIdentity {
            id_type: IdType::V,
            id_number,
        });
    };

    if id_number.is_empty() {
        if let Some(digits) = bare_digits {
            id_number = digits;
        }
    }
    if id_number.is_empty() {
        return Normalization::Incomplete {
            id_type: Some(id_type),
            id_number,
        };
    }

    let canonical = CanonicalIdentity { id_type, id_number };
    let unchanged = raw.id_type == canonical.id_type.as_str()
        && raw.id_number == canonical.id_number
        && raw.cedula == canonical.cedula();
    if unchanged {
        Normalization::Unchanged(canonical)
    } else {
        Normalization::Changed(canonical)
    }
}

/// Parse `<letter><optional separator><digits>`, letter case-insensitive.
/// Digits may carry `.` grouping (e.g. `V-12.345.678`).
fn parse_prefixed_cedula(cedula: &str) -> Option<CanonicalIdentity> {
    let mut chars = cedula.chars();
    let id_type = chars
        .next()
        .and_then(|c| IdType::parse_lenient(c.encode_utf8(&mut [0; 4])))?;
    let mut rest = chars.as_str();
    if let Some(stripped) = rest.strip_prefix(['-', ' ', '_', '.']) {
        rest = stripped;
    }
    let rest = rest.trim();
    if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let id_number = digits_only(rest);
    if id_number.is_empty() {
        return None;
    }
    Some(CanonicalIdentity {
        id_type,
        id_number,
    })
}

/// Digits of a cédula that carries no type letter at all, e.g. `12345678`
/// or `12.345.678`.
fn bare_cedula_digits(cedula: &str) -> Option<String> {
    let only_digits_and_grouping = cedula
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | ' '));
    if !only_digits_and_grouping {
        return None;
    }
    let digits = digits_only(cedula);
    (!digits.is_empty()).then_some(digits)
}
