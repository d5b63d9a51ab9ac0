//! # stampbook-core — Foundational Types for the Stamp Tracker
//!
//! This crate is the leaf of the stampbook workspace. It defines the
//! domain primitives every other crate builds on and depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `CustomerId`, `EventId` and
//!    `CustomerCode` are distinct types. No bare strings cross module
//!    boundaries where an identifier is meant.
//!
//! 2. **One identity shape.** Every document number flows through
//!    [`normalize_identity`], which yields a tagged [`Normalization`]:
//!    callers cannot commit an ambiguous record without matching on it.
//!
//! 3. **`cedula` is derived.** The composite `"{idType}-{idNumber}"` string
//!    is only ever produced by [`CanonicalIdentity::cedula`]; it is never an
//!    independent source of truth once normalized.
//!
//! 4. **UTC-only timestamps.** [`Timestamp`] enforces UTC with seconds
//!    precision.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `stampbook-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod customer;
pub mod error;
pub mod identity;
pub mod normalize;
pub mod policy;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use customer::{Customer, PrefixCandidate, PurchaseEvent, RedeemedReward, RewardType};
pub use error::{Field, FieldError, LedgerError, TimestampError, ValidationError};
pub use identity::{
    digits_only, normalize_phone, CustomerCode, CustomerId, EventId, IdType, ERROR_CODE,
};
pub use normalize::{normalize_identity, CanonicalIdentity, Normalization, RawIdentity};
pub use policy::{progress_percentage, RewardPolicy};
pub use temporal::Timestamp;
