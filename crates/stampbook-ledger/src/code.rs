//! # Customer Code Generator
//!
//! Codes are the first three letters of the name (ASCII, uppercased,
//! non-letters dropped) followed by the last four digits of the document
//! number: `generate("Juan Pérez", "12345678")` → `JUA5678`.
//!
//! ## Collisions
//!
//! The candidate is compared for exact equality against every code in the
//! collection passed in, never a cached subset. On collision `-1`, `-2`, …
//! are appended up to the configured limit. When every suffix is taken the
//! last candidate is returned anyway; [`crate::book::CustomerBook`] re-checks
//! before persisting.

use stampbook_core::{digits_only, Customer, CustomerCode};

use crate::error::GenerationError;

/// Default number of suffixed candidates tried after the base code.
pub const DEFAULT_COLLISION_LIMIT: u32 = 100;

const NAME_LETTERS: usize = 3;
const ID_DIGITS: usize = 4;

/// Derives collision-free customer codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeGenerator {
    collision_limit: u32,
}

impl CodeGenerator {
    /// Create a generator trying at most `collision_limit` suffixes
    /// (at least one).
    pub fn new(collision_limit: u32) -> Self {
        Self {
            collision_limit: collision_limit.max(1),
        }
    }

    /// The suffix cap.
    pub fn collision_limit(&self) -> u32 {
        self.collision_limit
    }

    /// Generate a code unique within `existing`, or the last suffixed
    /// candidate if the cap is exhausted.
    ///
    /// # Errors
    ///
    /// [`GenerationError`] when the name has no letters or the document
    /// number has no digits.
    pub fn generate(
        &self,
        name: &str,
        id_number: &str,
        existing: &[Customer],
    ) -> Result<CustomerCode, GenerationError> {
        let base = base_code(name, id_number)?;
        if !is_taken(existing, &base) {
            return Ok(CustomerCode::new(base));
        }

        let mut candidate = base.clone();
        for n in 1..=self.collision_limit {
            candidate = format!("{base}-{n}");
            if !is_taken(existing, &candidate) {
                tracing::debug!(base = %base, code = %candidate, "resolved code collision");
                return Ok(CustomerCode::new(candidate));
            }
        }

        tracing::warn!(
            base = %base,
            code = %candidate,
            attempts = self.collision_limit,
            "code collision limit reached; returning last candidate"
        );
        Ok(CustomerCode::new(candidate))
    }

    /// Like [`generate`](Self::generate) but maps failure to the
    /// `ERROR-CODE` sentinel instead of an error.
    pub fn generate_or_sentinel(
        &self,
        name: &str,
        id_number: &str,
        existing: &[Customer],
    ) -> CustomerCode {
        self.generate(name, id_number, existing).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "code generation failed");
            CustomerCode::sentinel()
        })
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_COLLISION_LIMIT)
    }
}

/// The uncollided code for a name and document number.
pub fn base_code(name: &str, id_number: &str) -> Result<String, GenerationError> {
    let letters: String = name
        .chars()
        .filter(char::is_ascii_alphabetic)
        .take(NAME_LETTERS)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if letters.is_empty() {
        return Err(GenerationError::NoLetters(name.to_string()));
    }

    let digits = digits_only(id_number);
    if digits.is_empty() {
        return Err(GenerationError::NoDigits(id_number.to_string()));
    }
    let tail = &digits[digits.len().saturating_sub(ID_DIGITS)..];

    Ok(format!("{letters}{tail}"))
}

/// Whether any customer in `existing` already holds `code` exactly.
pub fn is_taken(existing: &[Customer], code: &str) -> bool {
    existing.iter().any(|c| c.code.as_str() == code)
}
