//! # Migration Resolver
//!
//! Batch repair of records written by older clients. Each record is run
//! through [`normalize_identity`]:
//!
//! | Normalization | Action                                           |
//! |---------------|--------------------------------------------------|
//! | `Changed`     | rewrite identity fields, stamp `updatedAt`       |
//! | `Ambiguous`   | emit a [`PrefixCandidate`], leave record as is   |
//! | `Unchanged`   | pass through                                     |
//! | `Incomplete`  | pass through (logged)                            |
//!
//! Resolved records additionally get a drifted `rewardsEarned` recomputed
//! and, once their identity is canonical, an empty or `ERROR-CODE` code
//! replaced by a freshly generated one.
//!
//! A rewrite that would give a record a document already held by another
//! customer is not committed; the record is carried over untouched and
//! reported in [`MigrationReport::conflicts`].
//!
//! Ambiguous records wait for an operator to confirm a document type; the
//! confirmed tuples are fed back through
//! [`MigrationResolver::apply_resolved_prefixes`].

use serde::{Deserialize, Serialize};
use stampbook_core::{
    normalize_identity, CanonicalIdentity, Customer, CustomerId, IdType, Normalization,
    PrefixCandidate, Timestamp,
};

use crate::code::{is_taken, CodeGenerator};
use crate::config::LedgerConfig;
use crate::engine::Ledger;

/// Outcome of resolving one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The record can be committed as returned.
    Resolved {
        /// Next state (equal to the input when `changed` is false).
        customer: Customer,
        /// Whether anything was rewritten.
        changed: bool,
    },
    /// The document type must be confirmed by a caller.
    Ambiguous(PrefixCandidate),
}

/// Result of [`MigrationResolver::resolve_batch`].
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationReport {
    /// The full next collection, in input order. Ambiguous and untouched
    /// records are carried over unchanged.
    pub updated: Vec<Customer>,
    /// Records awaiting a confirmed document type.
    pub ambiguous: Vec<PrefixCandidate>,
    /// Records whose normalized document is already held by another
    /// customer. Carried over unchanged.
    pub conflicts: Vec<CustomerId>,
    /// Number of records rewritten. Ambiguous proposals and conflicts are
    /// not counted.
    pub fixed_count: usize,
}

/// A caller-confirmed document for one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefixResolution {
    /// Customer the confirmation applies to.
    pub id: CustomerId,
    /// Confirmed document type.
    pub id_type: IdType,
    /// Document number; punctuation is stripped.
    pub id_number: String,
}

/// Result of [`MigrationResolver::apply_resolved_prefixes`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppliedPrefixes {
    /// The full next collection, in input order.
    pub customers: Vec<Customer>,
    /// Customers whose identity was rewritten.
    pub applied: Vec<CustomerId>,
    /// Resolutions naming a customer not in the collection.
    pub unknown: Vec<CustomerId>,
    /// Resolutions whose document is already held by another customer.
    pub conflicts: Vec<CustomerId>,
    /// Resolutions whose number contains no digits.
    pub invalid: Vec<CustomerId>,
}

/// Normalizes legacy identity records in bulk.
#[derive(Debug, Clone, Copy, Default)]
pub struct MigrationResolver {
    ledger: Ledger,
    codes: CodeGenerator,
}

impl MigrationResolver {
    /// Resolver using the configured reward policy and code generator.
    pub fn new(config: &LedgerConfig) -> Self {
        Self::with_parts(config.ledger(), config.code_generator())
    }

    /// Resolver with an explicit engine and generator.
    pub fn with_parts(ledger: Ledger, codes: CodeGenerator) -> Self {
        Self { ledger, codes }
    }

    /// Resolve a single record without looking at the rest of the
    /// collection (no code backfill).
    pub fn resolve_customer(&self, customer: &Customer, now: Timestamp) -> Resolution {
        let mut next = customer.clone();
        let mut changed = false;

        match normalize_identity(&customer.raw_identity()) {
            Normalization::Ambiguous(proposal) => {
                tracing::debug!(
                    customer = %customer.id,
                    proposed = %proposal,
                    "document type needs confirmation"
                );
                return Resolution::Ambiguous(PrefixCandidate {
                    id: customer.id.clone(),
                    name: customer.name.clone(),
                    id_number: proposal.id_number,
                    id_type: proposal.id_type,
                });
            }
            Normalization::Changed(canonical) => {
                next.set_identity(&canonical, now);
                changed = true;
            }
            Normalization::Unchanged(_) => {}
            Normalization::Incomplete { id_type, id_number } => {
                tracing::warn!(
                    customer = %customer.id,
                    id_type = ?id_type,
                    id_number = %id_number,
                    "identity too incomplete to normalize"
                );
            }
        }

        if self.ledger.reconcile_rewards(&mut next) {
            next.updated_at = now;
            changed = true;
        }

        Resolution::Resolved {
            customer: next,
            changed,
        }
    }

    /// Resolve every record, roll back rewrites that would duplicate a
    /// document, then backfill missing codes against the in-progress
    /// collection.
    pub fn resolve_batch(&self, customers: &[Customer], now: Timestamp) -> MigrationReport {
        let mut updated = Vec::with_capacity(customers.len());
        let mut fixed = Vec::with_capacity(customers.len());
        let mut ambiguous = Vec::new();

        for customer in customers {
            match self.resolve_customer(customer, now) {
                Resolution::Resolved { customer, changed } => {
                    updated.push(customer);
                    fixed.push(changed);
                }
                Resolution::Ambiguous(candidate) => {
                    ambiguous.push(candidate);
                    updated.push(customer.clone());
                    fixed.push(false);
                }
            }
        }

        let clashing: Vec<usize> = (0..updated.len())
            .filter(|&i| takes_held_document(&customers[i], &updated, i))
            .collect();
        let mut conflicts = Vec::with_capacity(clashing.len());
        for &i in &clashing {
            tracing::warn!(
                customer = %customers[i].id,
                cedula = %updated[i].cedula,
                "normalized document already held by another customer"
            );
            updated[i] = customers[i].clone();
            fixed[i] = false;
            conflicts.push(customers[i].id.clone());
        }

        let pending: Vec<usize> = (0..updated.len())
            .filter(|&i| !clashing.contains(&i))
            .filter(|&i| !ambiguous.iter().any(|a| a.id == updated[i].id))
            .collect();
        for i in pending {
            if self.backfill_code(&mut updated, i, now) {
                fixed[i] = true;
            }
        }

        let fixed_count = fixed.iter().filter(|&&f| f).count();
        tracing::info!(
            scanned = customers.len(),
            fixed = fixed_count,
            ambiguous = ambiguous.len(),
            conflicts = conflicts.len(),
            "migration batch resolved"
        );
        MigrationReport {
            updated,
            ambiguous,
            conflicts,
            fixed_count,
        }
    }

    /// Commit caller-confirmed document types, exactly like a `Changed`
    /// normalization. Confirmations that would duplicate another
    /// customer's document are skipped and reported.
    pub fn apply_resolved_prefixes(
        &self,
        customers: &[Customer],
        resolutions: &[PrefixResolution],
        now: Timestamp,
    ) -> AppliedPrefixes {
        let mut out = AppliedPrefixes {
            customers: customers.to_vec(),
            ..AppliedPrefixes::default()
        };

        for resolution in resolutions {
            let Some(slot) = out.customers.iter().position(|c| c.id == resolution.id) else {
                out.unknown.push(resolution.id.clone());
                continue;
            };

            let identity = CanonicalIdentity::new(resolution.id_type, &resolution.id_number);
            if identity.id_number.is_empty() {
                out.invalid.push(resolution.id.clone());
                continue;
            }
            let clash = out
                .customers
                .iter()
                .any(|c| c.id != resolution.id && c.holds_document(&identity));
            if clash {
                tracing::warn!(
                    customer = %resolution.id,
                    cedula = %identity,
                    "confirmed document already held by another customer"
                );
                out.conflicts.push(resolution.id.clone());
                continue;
            }

            let customer = &mut out.customers[slot];
            customer.set_identity(&identity, now);
            self.ledger.reconcile_rewards(customer);
            self.backfill_code(&mut out.customers, slot, now);
            out.applied.push(resolution.id.clone());
        }

        tracing::info!(
            applied = out.applied.len(),
            unknown = out.unknown.len(),
            conflicts = out.conflicts.len(),
            invalid = out.invalid.len(),
            "confirmed prefixes applied"
        );
        out
    }

    /// Give `customers[slot]` a code if it has none and its identity is
    /// canonical. Returns whether a code was assigned.
    fn backfill_code(&self, customers: &mut [Customer], slot: usize, now: Timestamp) -> bool {
        let customer = &customers[slot];
        if customer.code.is_assigned() || customer.name.trim().is_empty() {
            return false;
        }
        let Some(identity) = customer.identity() else {
            return false;
        };

        let code = match self
            .codes
            .generate(&customer.name, &identity.id_number, customers)
        {
            Ok(code) if !is_taken(customers, code.as_str()) => code,
            Ok(code) => {
                tracing::warn!(customer = %customer.id, code = %code, "no free code to backfill");
                return false;
            }
            Err(err) => {
                tracing::warn!(customer = %customer.id, error = %err, "cannot backfill code");
                return false;
            }
        };

        let customer = &mut customers[slot];
        tracing::debug!(customer = %customer.id, code = %code, "code backfilled");
        customer.code = code;
        customer.updated_at = now;
        true
    }
}

/// Whether `updated[slot]` acquired a document that `before` did not hold
/// and that another record in `updated` already holds.
fn takes_held_document(before: &Customer, updated: &[Customer], slot: usize) -> bool {
    let Some(identity) = updated[slot].identity() else {
        return false;
    };
    if before.holds_document(&identity) {
        return false;
    }
    updated
        .iter()
        .enumerate()
        .any(|(i, c)| i != slot && c.holds_document(&identity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stampbook_core::{CustomerCode, RewardPolicy};

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn t0() -> Timestamp {
        ts("2026-01-15T12:00:00Z")
    }

    fn later() -> Timestamp {
        ts("2026-03-01T08:00:00Z")
    }

    fn resolver() -> MigrationResolver {
        MigrationResolver::new(&LedgerConfig::default())
    }

    fn legacy(code: &str, name: &str, id_type: Option<IdType>, id_number: &str, cedula: &str) -> Customer {
        let mut c = Customer::open(
            CustomerCode::new(code),
            name,
            "04141234567",
            &CanonicalIdentity::new(IdType::V, "1"),
            t0(),
        );
        c.id_type = id_type;
        c.id_number = id_number.to_string();
        c.cedula = cedula.to_string();
        c
    }

    // ── Single record ────────────────────────────────────────────────

    #[test]
    fn canonical_record_is_untouched() {
        let c = legacy("JUA5678", "Juan", Some(IdType::V), "12345678", "V-12345678");
        assert_eq!(
            resolver().resolve_customer(&c, later()),
            Resolution::Resolved {
                customer: c.clone(),
                changed: false
            }
        );
    }

    #[test]
    fn prefixed_cedula_fills_missing_fields() {
        let c = legacy("JUA5678", "Juan", None, "", "e 12.345.678");
        let Resolution::Resolved { customer, changed } = resolver().resolve_customer(&c, later())
        else {
            panic!("expected resolved");
        };
        assert!(changed);
        assert_eq!(customer.id_type, Some(IdType::E));
        assert_eq!(customer.id_number, "12345678");
        assert_eq!(customer.cedula, "E-12345678");
        assert_eq!(customer.updated_at, later());
    }

    #[test]
    fn bare_digits_are_ambiguous() {
        let c = legacy("JUA5678", "Juan", None, "", "12345678");
        assert_eq!(
            resolver().resolve_customer(&c, later()),
            Resolution::Ambiguous(PrefixCandidate {
                id: c.id.clone(),
                name: "Juan".into(),
                id_number: "12345678".into(),
                id_type: IdType::V,
            })
        );
    }

    #[test]
    fn drifted_rewards_are_recomputed() {
        let mut c = legacy("JUA5678", "Juan", Some(IdType::V), "12345678", "V-12345678");
        c.stamps = 23;
        c.rewards_earned = 0;
        let Resolution::Resolved { customer, changed } = resolver().resolve_customer(&c, later())
        else {
            panic!("expected resolved");
        };
        assert!(changed);
        assert_eq!(customer.rewards_earned, 2);
    }

    #[test]
    fn incomplete_record_passes_through() {
        let c = legacy("ANA0000", "Ana", Some(IdType::J), "", "");
        assert_eq!(
            resolver().resolve_customer(&c, later()),
            Resolution::Resolved {
                customer: c.clone(),
                changed: false
            }
        );
    }

    // ── Batch ────────────────────────────────────────────────────────

    #[test]
    fn batch_counts_only_committed_fixes() {
        let ok = legacy("JUA5678", "Juan", Some(IdType::V), "12345678", "V-12345678");
        let fixable = legacy("MAR4321", "María", Some(IdType::E), "87.654.321", "");
        let ambiguous = legacy("PED1111", "Pedro", None, "", "11111111");
        let input = vec![ok.clone(), fixable.clone(), ambiguous.clone()];

        let report = resolver().resolve_batch(&input, later());
        assert_eq!(report.fixed_count, 1);
        assert_eq!(report.updated.len(), 3);
        assert_eq!(report.updated[0], ok);
        assert_eq!(report.updated[1].cedula, "E-87654321");
        assert_eq!(report.updated[2], ambiguous);
        assert_eq!(report.ambiguous.len(), 1);
        assert_eq!(report.ambiguous[0].id, ambiguous.id);
    }

    #[test]
    fn batch_backfills_missing_codes_without_collisions() {
        let holder = legacy("JUA5678", "Juan", Some(IdType::V), "12345678", "V-12345678");
        let blank = legacy("", "Juana", Some(IdType::E), "12345678", "E-12345678");
        let sentinel = legacy("ERROR-CODE", "Juanita", Some(IdType::J), "5678", "J-5678");

        let report = resolver().resolve_batch(&[holder, blank, sentinel], later());
        assert_eq!(report.fixed_count, 2);
        assert_eq!(report.updated[1].code.as_str(), "JUA5678-1");
        assert_eq!(report.updated[2].code.as_str(), "JUA5678-2");
        assert_eq!(report.updated[2].updated_at, later());
    }

    #[test]
    fn ambiguous_records_keep_blank_code() {
        let blank = legacy("", "Pedro", None, "", "11111111");
        let report = resolver().resolve_batch(std::slice::from_ref(&blank), later());
        assert_eq!(report.updated[0], blank);
        assert_eq!(report.fixed_count, 0);
    }

    #[test]
    fn second_batch_is_a_fixed_point() {
        let input = vec![
            legacy("", "María", Some(IdType::E), "87.654.321", ""),
            legacy("JUA5678", "Juan", None, "", "v-12345678"),
        ];
        let first = resolver().resolve_batch(&input, later());
        let second = resolver().resolve_batch(&first.updated, later());
        assert_eq!(second.fixed_count, 0);
        assert_eq!(second.updated, first.updated);
    }

    #[test]
    fn batch_skips_rewrite_onto_held_document() {
        let holder = legacy("JUA5678", "Juan", Some(IdType::V), "12345678", "V-12345678");
        let mut copy = legacy("", "Juana", None, "", "v-12.345.678");
        copy.stamps = 12;
        copy.rewards_earned = 0;

        let report = resolver().resolve_batch(&[holder.clone(), copy.clone()], later());
        assert_eq!(report.conflicts, vec![copy.id.clone()]);
        assert_eq!(report.fixed_count, 0);
        assert_eq!(report.updated, vec![holder.clone(), copy]);

        let doc = holder.identity().unwrap();
        let holders = report.updated.iter().filter(|c| c.holds_document(&doc)).count();
        assert_eq!(holders, 1);
    }

    #[test]
    fn batch_skips_two_records_normalizing_to_same_document() {
        let a = legacy("ANA4321", "Ana", None, "", "E-87.654.321");
        let b = legacy("ANA4321-1", "Anabel", None, "", "e 87654321");
        let report = resolver().resolve_batch(&[a.clone(), b.clone()], later());
        assert_eq!(report.conflicts, vec![a.id.clone(), b.id.clone()]);
        assert_eq!(report.updated, vec![a, b]);
        assert_eq!(report.fixed_count, 0);
    }

    // ── Confirmed prefixes ───────────────────────────────────────────

    #[test]
    fn apply_confirmed_prefix() {
        let amb = legacy("PED1111", "Pedro", None, "", "11111111");
        let out = resolver().apply_resolved_prefixes(
            std::slice::from_ref(&amb),
            &[PrefixResolution {
                id: amb.id.clone(),
                id_type: IdType::J,
                id_number: "11.111.111".into(),
            }],
            later(),
        );
        assert_eq!(out.applied, vec![amb.id.clone()]);
        let c = &out.customers[0];
        assert_eq!(c.cedula, "J-11111111");
        assert_eq!(c.id_type, Some(IdType::J));
        assert_eq!(c.updated_at, later());
        assert_eq!(c.code.as_str(), "PED1111");
    }

    #[test]
    fn apply_reports_unknown_conflict_and_invalid() {
        let holder = legacy("JUA5678", "Juan", Some(IdType::V), "12345678", "V-12345678");
        let amb = legacy("", "Pedro", None, "", "12345678");
        let ghost = CustomerId::from_string("ghost");
        let out = resolver().apply_resolved_prefixes(
            &[holder.clone(), amb.clone()],
            &[
                PrefixResolution {
                    id: ghost.clone(),
                    id_type: IdType::V,
                    id_number: "1".into(),
                },
                PrefixResolution {
                    id: amb.id.clone(),
                    id_type: IdType::V,
                    id_number: "12345678".into(),
                },
                PrefixResolution {
                    id: amb.id.clone(),
                    id_type: IdType::E,
                    id_number: "n/a".into(),
                },
            ],
            later(),
        );
        assert_eq!(out.unknown, vec![ghost]);
        assert_eq!(out.conflicts, vec![amb.id.clone()]);
        assert_eq!(out.invalid, vec![amb.id.clone()]);
        assert!(out.applied.is_empty());
        assert_eq!(out.customers, vec![holder, amb]);
    }

    #[test]
    fn apply_backfills_code_and_rewards() {
        let mut amb = legacy("", "Pedro", None, "", "11111111");
        amb.stamps = 7;
        amb.rewards_earned = 3;
        let r = MigrationResolver::with_parts(
            Ledger::new(RewardPolicy::new(5).unwrap()),
            CodeGenerator::default(),
        );
        let out = r.apply_resolved_prefixes(
            std::slice::from_ref(&amb),
            &[PrefixResolution {
                id: amb.id.clone(),
                id_type: IdType::E,
                id_number: "11111111".into(),
            }],
            later(),
        );
        let c = &out.customers[0];
        assert_eq!(c.code.as_str(), "PED1111");
        assert_eq!(c.rewards_earned, 1);
    }
}
