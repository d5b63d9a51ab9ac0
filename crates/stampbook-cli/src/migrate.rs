//! # Migrate Subcommand
//!
//! - `scan` — Normalize legacy identity records. Without `--apply` this is
//!   a dry run; ambiguous records are listed either way.
//! - `resolve` — Confirm the document type of one ambiguous record.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use stampbook_core::identity::validate_id_number;
use stampbook_core::{CustomerId, IdType, PrefixCandidate, Timestamp};
use stampbook_ledger::PrefixResolution;

use crate::context::Session;
use crate::{EXIT_OK, EXIT_REJECTED};

/// Arguments for the `stampbook migrate` subcommand.
#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands.
#[derive(Subcommand, Debug)]
pub enum MigrateCommand {
    /// Normalize legacy records and list the ambiguous ones.
    Scan {
        /// Persist the fixes (default is a dry run).
        #[arg(long)]
        apply: bool,
        /// Print ambiguous candidates as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Apply a confirmed document type to an ambiguous record.
    Resolve {
        /// Customer id, as listed by `migrate scan`.
        #[arg(long)]
        id: String,
        /// Confirmed document type: V, E or J.
        #[arg(long)]
        id_type: String,
        /// Confirmed document number.
        #[arg(long)]
        id_number: String,
    },
}

/// Execute the migrate subcommand.
pub fn run_migrate(args: &MigrateArgs, session: &Session) -> Result<u8> {
    match &args.command {
        MigrateCommand::Scan { apply, json } => cmd_scan(session, *apply, *json),
        MigrateCommand::Resolve {
            id,
            id_type,
            id_number,
        } => cmd_resolve(session, id, id_type, id_number),
    }
}

fn cmd_scan(session: &Session, apply: bool, json: bool) -> Result<u8> {
    let customers = session.load()?;
    let report = session.resolver().resolve_batch(&customers, Timestamp::now());

    if apply && report.fixed_count > 0 {
        session.save(&report.updated)?;
        println!("OK: fixed {} record(s)", report.fixed_count);
    } else if apply {
        println!("OK: nothing to fix");
    } else {
        println!(
            "DRY RUN: {} of {} record(s) would be fixed; rerun with --apply",
            report.fixed_count,
            customers.len()
        );
    }

    for id in &report.conflicts {
        eprintln!("CONFLICT: {id} normalizes to a document held by another customer; left as is");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report.ambiguous)?);
    } else {
        for candidate in &report.ambiguous {
            println!("{}", ambiguous_line(candidate));
        }
    }
    Ok(EXIT_OK)
}

/// One row of ambiguous output, with the command that would confirm the
/// proposal.
pub fn ambiguous_line(candidate: &PrefixCandidate) -> String {
    format!(
        "AMBIGUOUS: {} {:?} number {} (proposed {}): \
         stampbook migrate resolve --id {} --id-type {} --id-number {}",
        candidate.id,
        candidate.name,
        candidate.id_number,
        candidate.id_type,
        candidate.id,
        candidate.id_type,
        candidate.id_number
    )
}

fn cmd_resolve(session: &Session, id: &str, id_type: &str, id_number: &str) -> Result<u8> {
    let id_type = match id_type.parse::<IdType>() {
        Ok(t) => t,
        Err(err) => {
            eprintln!("REJECTED: {err}");
            return Ok(EXIT_REJECTED);
        }
    };
    let id_number = match validate_id_number(id_number) {
        Ok(n) => n,
        Err(err) => {
            eprintln!("REJECTED: {err}");
            return Ok(EXIT_REJECTED);
        }
    };

    let customers = session.load()?;
    let resolution = PrefixResolution {
        id: CustomerId::from_string(id),
        id_type,
        id_number,
    };
    let out = session.resolver().apply_resolved_prefixes(
        &customers,
        std::slice::from_ref(&resolution),
        Timestamp::now(),
    );

    if !out.unknown.is_empty() {
        bail!("no customer with id {id:?}");
    }
    if !out.conflicts.is_empty() || !out.invalid.is_empty() {
        eprintln!(
            "REJECTED: document {}-{} is already registered to another customer",
            resolution.id_type, resolution.id_number
        );
        return Ok(EXIT_REJECTED);
    }

    session.save(&out.customers)?;
    if let Some(c) = out.customers.iter().find(|c| c.id == resolution.id) {
        println!("OK: {} is now {} (code {})", c.name, c.cedula, c.code);
    }
    Ok(EXIT_OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::temp_session;

    const LEGACY: &str = r#"[
      {"id": "a1", "code": "ANA4321", "name": "Ana Ruiz", "phone": "04141234567",
       "cedula": "E-87.654.321", "stamps": 3,
       "joinDate": "2024-05-01T10:00:00Z", "createdAt": "2024-05-01T10:00:00Z",
       "updatedAt": "2024-05-01T10:00:00Z"},
      {"id": "b2", "code": "", "name": "Pedro Gil", "phone": "04241234567",
       "cedula": "11222333",
       "joinDate": "2024-06-01T10:00:00Z", "createdAt": "2024-06-01T10:00:00Z",
       "updatedAt": "2024-06-01T10:00:00Z"}
    ]"#;

    fn scan(apply: bool) -> MigrateArgs {
        MigrateArgs {
            command: MigrateCommand::Scan { apply, json: false },
        }
    }

    fn resolve(id: &str, id_type: &str, id_number: &str) -> MigrateArgs {
        MigrateArgs {
            command: MigrateCommand::Resolve {
                id: id.into(),
                id_type: id_type.into(),
                id_number: id_number.into(),
            },
        }
    }

    #[test]
    fn dry_run_does_not_write() {
        let (_dir, s) = temp_session();
        std::fs::write(s.store().path(), LEGACY).unwrap();
        assert_eq!(run_migrate(&scan(false), &s).unwrap(), 0);
        assert_eq!(std::fs::read_to_string(s.store().path()).unwrap(), LEGACY);
    }

    #[test]
    fn apply_then_resolve() {
        let (_dir, s) = temp_session();
        std::fs::write(s.store().path(), LEGACY).unwrap();

        assert_eq!(run_migrate(&scan(true), &s).unwrap(), 0);
        let stored = s.load().unwrap();
        assert_eq!(stored[0].cedula, "E-87654321");
        assert_eq!(stored[1].cedula, "11222333");

        assert_eq!(run_migrate(&resolve("b2", "j", "11.222.333"), &s).unwrap(), 0);
        let stored = s.load().unwrap();
        assert_eq!(stored[1].cedula, "J-11222333");
        assert_eq!(stored[1].code.as_str(), "PED2333");
    }

    #[test]
    fn resolve_rejects_bad_input() {
        let (_dir, s) = temp_session();
        std::fs::write(s.store().path(), LEGACY).unwrap();
        assert_eq!(run_migrate(&resolve("b2", "X", "11222333"), &s).unwrap(), EXIT_REJECTED);
        assert_eq!(run_migrate(&resolve("b2", "V", "12"), &s).unwrap(), EXIT_REJECTED);
        assert!(run_migrate(&resolve("zz", "V", "11222333"), &s).is_err());
    }

    #[test]
    fn resolve_rejects_conflicting_document() {
        let (_dir, s) = temp_session();
        std::fs::write(s.store().path(), LEGACY).unwrap();
        run_migrate(&scan(true), &s).unwrap();
        assert_eq!(
            run_migrate(&resolve("b2", "E", "87654321"), &s).unwrap(),
            EXIT_REJECTED
        );
    }

    #[test]
    fn apply_leaves_duplicate_document_unwritten() {
        let (_dir, s) = temp_session();
        let dup = r#"[
          {"id": "a1", "code": "ANA4321", "name": "Ana Ruiz", "phone": "04141234567",
           "idType": "E", "idNumber": "87654321", "cedula": "E-87654321",
           "joinDate": "2024-05-01T10:00:00Z", "createdAt": "2024-05-01T10:00:00Z",
           "updatedAt": "2024-05-01T10:00:00Z"},
          {"id": "c3", "code": "", "name": "Ana R.", "phone": "04141234567",
           "cedula": "e-87.654.321",
           "joinDate": "2024-07-01T10:00:00Z", "createdAt": "2024-07-01T10:00:00Z",
           "updatedAt": "2024-07-01T10:00:00Z"}
        ]"#;
        std::fs::write(s.store().path(), dup).unwrap();
        assert_eq!(run_migrate(&scan(true), &s).unwrap(), EXIT_OK);
        assert_eq!(std::fs::read_to_string(s.store().path()).unwrap(), dup);
    }

    #[test]
    fn ambiguous_line_contains_command() {
        let line = ambiguous_line(&PrefixCandidate {
            id: CustomerId::from_string("b2"),
            name: "Pedro Gil".into(),
            id_number: "11222333".into(),
            id_type: IdType::V,
        });
        assert!(line.contains("--id b2 --id-type V --id-number 11222333"));
    }
}
