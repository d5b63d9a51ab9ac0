//! # Customer Subcommand
//!
//! - `add` — Register a customer (validation, duplicate-document guard,
//!   code assignment).
//! - `show` — Print one customer by code.
//! - `list` — List customers, optionally filtered by a search query.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use stampbook_core::{Customer, Timestamp};
use stampbook_ledger::{NewCustomer, RegistrationError};

use crate::context::Session;
use crate::{EXIT_OK, EXIT_REJECTED};

/// Arguments for the `stampbook customer` subcommand.
#[derive(Args, Debug)]
pub struct CustomerArgs {
    #[command(subcommand)]
    pub command: CustomerCommand,
}

/// Customer subcommands.
#[derive(Subcommand, Debug)]
pub enum CustomerCommand {
    /// Register a new customer.
    Add {
        /// Full name (at least 3 characters).
        #[arg(long)]
        name: String,
        /// Phone number; punctuation is ignored.
        #[arg(long)]
        phone: String,
        /// Document type: V, E or J.
        #[arg(long)]
        id_type: String,
        /// Document number; punctuation is ignored.
        #[arg(long)]
        id_number: String,
    },

    /// Show a customer by code.
    Show {
        /// Customer code (case-insensitive).
        code: String,
        /// Print the stored record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List customers.
    List {
        /// Filter by name, code, document or phone.
        #[arg(long, short)]
        query: Option<String>,
    },
}

/// Execute the customer subcommand.
pub fn run_customer(args: &CustomerArgs, session: &Session) -> Result<u8> {
    match &args.command {
        CustomerCommand::Add {
            name,
            phone,
            id_type,
            id_number,
        } => cmd_add(
            session,
            &NewCustomer {
                name: name.clone(),
                phone: phone.clone(),
                id_type: id_type.clone(),
                id_number: id_number.clone(),
            },
        ),
        CustomerCommand::Show { code, json } => cmd_show(session, code, *json),
        CustomerCommand::List { query } => cmd_list(session, query.as_deref().unwrap_or("")),
    }
}

fn cmd_add(session: &Session, input: &NewCustomer) -> Result<u8> {
    let mut book = session.load_book()?;
    match book.register(input, Timestamp::now()) {
        Ok(customer) => {
            session.save(book.customers())?;
            println!(
                "OK: registered {} ({}, {})",
                customer.code, customer.name, customer.cedula
            );
            Ok(EXIT_OK)
        }
        Err(err) => {
            report_rejection(&err);
            Ok(EXIT_REJECTED)
        }
    }
}

fn report_rejection(err: &RegistrationError) {
    tracing::warn!(error = %err, "registration rejected");
    let fields = err.field_errors();
    if fields.is_empty() {
        eprintln!("REJECTED: {err}");
    } else {
        for field in fields {
            eprintln!("REJECTED: {field}");
        }
    }
}

fn cmd_show(session: &Session, code: &str, json: bool) -> Result<u8> {
    let book = session.load_book()?;
    let Some(customer) = book.find_by_code(code) else {
        bail!("no customer with code {:?}", code.trim());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(customer)?);
        return Ok(EXIT_OK);
    }

    let ledger = book.ledger();
    println!("Customer: {}", customer.code);
    println!("  Name: {}", customer.name);
    println!("  Document: {}", customer.cedula);
    println!("  Phone: {}", customer.phone);
    println!(
        "  Stamps: {} ({:.0}% of current card)",
        customer.stamps,
        ledger.progress(customer)
    );
    println!("  Rewards available: {}", customer.rewards_earned);
    println!("  Rewards redeemed: {}", customer.redeemed_rewards.len());
    println!("  Purchases: {}", customer.total_purchases);
    println!("  Joined: {}", customer.join_date);
    match customer.last_purchase {
        Some(ts) => println!("  Last purchase: {ts}"),
        None => println!("  Last purchase: never"),
    }
    Ok(EXIT_OK)
}

fn cmd_list(session: &Session, query: &str) -> Result<u8> {
    let book = session.load_book()?;
    let matches = book.search(query);
    if matches.is_empty() {
        println!("No customers found.");
        return Ok(EXIT_OK);
    }
    for customer in &matches {
        println!("{}", list_line(customer));
    }
    println!("{} customer(s)", matches.len());
    Ok(EXIT_OK)
}

/// One row of `customer list`.
pub fn list_line(customer: &Customer) -> String {
    format!(
        "{:<12} {:<28} {:<14} {:>3} stamps",
        customer.code.as_str(),
        customer.name,
        customer.cedula,
        customer.stamps
    )
}
