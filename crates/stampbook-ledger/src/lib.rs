//! # stampbook-ledger — Stamp Ledger Engine
//!
//! Implements the computational rules of the stamp tracker on top of the
//! primitives in `stampbook-core`.
//!
//! ## Components
//!
//! - **Code Generator** ([`code`]): derives `NAM1234`-style codes from a
//!   name and document number, appending `-1`, `-2`, … on collision with a
//!   bounded number of attempts.
//!
//! - **Ledger Engine** ([`engine`]): pure transitions over one customer —
//!   add stamp, remove stamp, redeem reward — that always leave
//!   `rewardsEarned == floor(stamps / stampsPerReward)`.
//!
//! - **Customer Book** ([`book`]): the collection handed over by the
//!   persistence collaborator. Registration (validation, duplicate-document
//!   guard, code generation) and by-id ledger operations.
//!
//! - **Migration Resolver** ([`migration`]): batch normalization of legacy
//!   identity records with a deferred decision for ambiguous ones.
//!
//! ## Collaborators
//!
//! Notification ([`notify::Notifier`]) and persistence
//! ([`store::CustomerStore`]) are traits. The engine never waits on them and
//! never depends on their return values beyond a load/save `Result`.
//!
//! ## Concurrency
//!
//! Everything here is synchronous and single-writer. [`book::CustomerBook`]
//! takes `&mut self` for every mutation, so a second writer needs an
//! external lock around the book, not around individual customers.

pub mod book;
pub mod code;
pub mod config;
pub mod engine;
pub mod error;
pub mod migration;
pub mod notify;
pub mod store;

pub use book::{CustomerBook, LedgerSummary, NewCustomer};
pub use code::CodeGenerator;
pub use config::LedgerConfig;
pub use engine::{Ledger, Redemption, StampAdded, StampNotice};
pub use error::{ConfigError, GenerationError, RegistrationError, StoreError};
pub use migration::{
    AppliedPrefixes, MigrationReport, MigrationResolver, PrefixResolution, Resolution,
};
pub use notify::{NoticeKind, Notifier, NullNotifier, TracingNotifier};
pub use store::{CustomerStore, JsonFileStore, MemoryStore};
