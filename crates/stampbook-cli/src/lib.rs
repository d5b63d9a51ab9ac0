//! # stampbook-cli — Command-Line Front End for the Stamp Tracker
//!
//! Provides the `stampbook` binary. Every command loads the whole customer
//! collection from the JSON store, runs one ledger operation, and saves the
//! collection back when it changed.
//!
//! ## Subcommands
//!
//! - `stampbook customer` — Register, show and list customers.
//! - `stampbook stamp` — Add or remove a stamp.
//! - `stampbook reward` — Redeem a reward.
//! - `stampbook progress` — Show progress towards the next reward.
//! - `stampbook migrate` — Normalize legacy identity records.
//! - `stampbook summary` — Collection-wide totals.
//!
//! ```bash
//! stampbook customer add --name "Juan Pérez" --phone 04141234567 --id-type V --id-number 12345678
//! stampbook stamp add JUA5678 --amount 12.50
//! stampbook reward redeem JUA5678
//! stampbook migrate scan --apply
//! ```
//!
//! ## Exit Codes
//!
//! | Code | Meaning                                                    |
//! |------|------------------------------------------------------------|
//! | 0    | Success                                                    |
//! | 1    | Error (unreadable store, malformed config, unknown code)   |
//! | 2    | Rejected (validation, duplicate document, too few stamps)  |

pub mod context;
pub mod customer;
pub mod ledger;
pub mod migrate;
pub mod notify;

/// Exit code for success.
pub const EXIT_OK: u8 = 0;

/// Exit code for a request the ledger declined.
pub const EXIT_REJECTED: u8 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        assert_ne!(EXIT_OK, EXIT_REJECTED);
        assert_ne!(EXIT_REJECTED, 1);
    }

    #[test]
    fn public_modules_are_accessible() {
        let _ = std::any::type_name::<customer::CustomerArgs>();
        let _ = std::any::type_name::<ledger::StampArgs>();
        let _ = std::any::type_name::<ledger::RewardArgs>();
        let _ = std::any::type_name::<migrate::MigrateArgs>();
        let _ = std::any::type_name::<context::Session>();
    }
}
