//! # Ledger Subcommands
//!
//! Stamp, reward, progress and summary commands. Each mutating command
//! loads the collection, applies one transition through the
//! [`stampbook_ledger::CustomerBook`], and saves the result.

use anyhow::Result;
use clap::{Args, Subcommand};
use stampbook_core::{LedgerError, Timestamp};

use crate::context::{customer_id_for_code, Session};
use crate::notify::ConsoleNotifier;
use crate::{EXIT_OK, EXIT_REJECTED};

/// Arguments for the `stampbook stamp` subcommand.
#[derive(Args, Debug)]
pub struct StampArgs {
    #[command(subcommand)]
    pub command: StampCommand,
}

/// Stamp subcommands.
#[derive(Subcommand, Debug)]
pub enum StampCommand {
    /// Record a purchase and grant one stamp.
    Add {
        /// Customer code.
        code: String,
        /// Purchase amount; negative values are recorded as 0.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        amount: f64,
    },

    /// Remove the most recent stamp (manual correction).
    Remove {
        /// Customer code.
        code: String,
    },
}

/// Arguments for the `stampbook reward` subcommand.
#[derive(Args, Debug)]
pub struct RewardArgs {
    #[command(subcommand)]
    pub command: RewardCommand,
}

/// Reward subcommands.
#[derive(Subcommand, Debug)]
pub enum RewardCommand {
    /// Exchange one reward's worth of stamps.
    Redeem {
        /// Customer code.
        code: String,
    },
}

/// Arguments for the `stampbook progress` subcommand.
#[derive(Args, Debug)]
pub struct ProgressArgs {
    /// Customer code.
    pub code: String,
}

/// Arguments for the `stampbook summary` subcommand.
#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Print the totals as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the stamp subcommand.
pub fn run_stamp(args: &StampArgs, session: &Session) -> Result<u8> {
    let mut book = session.load_book()?;
    let now = Timestamp::now();

    match &args.command {
        StampCommand::Add { code, amount } => {
            let id = customer_id_for_code(&book, code)?;
            let out = book.add_stamp(&id, *amount, now, &ConsoleNotifier)?;
            session.save(book.customers())?;
            println!(
                "OK: {} now has {} stamp(s), {} reward(s) available",
                out.customer.code, out.customer.stamps, out.customer.rewards_earned
            );
        }
        StampCommand::Remove { code } => {
            let id = customer_id_for_code(&book, code)?;
            let before = book.find_by_id(&id).map(|c| c.stamps).unwrap_or_default();
            let next = book.remove_stamp(&id, now)?;
            if before == 0 {
                println!("OK: {} has no stamps to remove", next.code);
                return Ok(EXIT_OK);
            }
            session.save(book.customers())?;
            println!("OK: {} now has {} stamp(s)", next.code, next.stamps);
        }
    }
    Ok(EXIT_OK)
}

/// Execute the reward subcommand.
pub fn run_reward(args: &RewardArgs, session: &Session) -> Result<u8> {
    let RewardCommand::Redeem { code } = &args.command;
    let mut book = session.load_book()?;
    let id = customer_id_for_code(&book, code)?;

    match book.redeem_reward(&id, Timestamp::now(), &ConsoleNotifier) {
        Ok(out) => {
            session.save(book.customers())?;
            println!(
                "OK: {} redeemed {} stamps, {} stamp(s) left",
                out.customer.code, out.reward.stamps_used, out.customer.stamps
            );
            Ok(EXIT_OK)
        }
        Err(err @ LedgerError::InsufficientStamps { .. }) => {
            eprintln!("REJECTED: {err}");
            Ok(EXIT_REJECTED)
        }
        Err(err) => Err(err.into()),
    }
}

/// Execute the progress subcommand.
pub fn run_progress(args: &ProgressArgs, session: &Session) -> Result<u8> {
    let book = session.load_book()?;
    let id = customer_id_for_code(&book, &args.code)?;
    let Some(customer) = book.find_by_id(&id) else {
        return Err(LedgerError::UnknownCustomer(id.to_string()).into());
    };

    let policy = book.ledger().policy();
    println!(
        "{}: {} / {} stamps ({:.0}%), {} more for the next reward",
        customer.code,
        customer.stamps % policy.stamps_per_reward(),
        policy.stamps_per_reward(),
        book.ledger().progress(customer),
        policy.remaining_for_next(customer.stamps)
    );
    Ok(EXIT_OK)
}

/// Execute the summary subcommand.
pub fn run_summary(args: &SummaryArgs, session: &Session) -> Result<u8> {
    let summary = session.load_book()?.summary();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(EXIT_OK);
    }
    println!("Customers: {}", summary.customers);
    println!("  Stamps held: {}", summary.total_stamps);
    println!("  Rewards available: {}", summary.rewards_available);
    println!("  Rewards redeemed: {}", summary.rewards_redeemed);
    println!("  Purchases: {}", summary.total_purchases);
    Ok(EXIT_OK)
}
