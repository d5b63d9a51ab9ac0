//! # Customer Book
//!
//! The customer collection as handed over by the persistence collaborator,
//! together with the operations that change it: registration and the
//! by-id ledger transitions.
//!
//! ## Uniqueness
//!
//! Two properties hold across the whole collection after every mutation:
//!
//! - `code` is unique (exact comparison).
//! - `(idType, idNumber)` is unique.
//!
//! Both are checked against the full `Vec` at call time. Mutations take
//! `&mut self`, so two writers cannot interleave on the same book.

use serde::Serialize;
use stampbook_core::identity::{validate_id_number, validate_name, validate_phone};
use stampbook_core::{
    digits_only, CanonicalIdentity, Customer, CustomerId, FieldError, IdType,
    LedgerError, Timestamp,
};

use crate::code::{is_taken, CodeGenerator};
use crate::config::LedgerConfig;
use crate::engine::{Ledger, Redemption, StampAdded};
use crate::error::RegistrationError;
use crate::notify::{NoticeKind, Notifier};

/// Raw registration input, as typed by an operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCustomer {
    /// Display name; trimmed, at least three characters.
    pub name: String,
    /// Phone in any punctuation; 8-15 digits.
    pub phone: String,
    /// `V`, `E` or `J`, any case.
    pub id_type: String,
    /// Document number in any punctuation; 6-12 digits.
    pub id_number: String,
}

/// Collection-wide totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    /// Number of customers.
    pub customers: usize,
    /// Sum of current stamp balances.
    pub total_stamps: u64,
    /// Sum of `rewardsEarned`, i.e. rewards that could be redeemed now.
    pub rewards_available: u64,
    /// Number of redemptions ever recorded.
    pub rewards_redeemed: u64,
    /// Sum of `totalPurchases`.
    pub total_purchases: u64,
}

/// The authoritative customer collection.
#[derive(Debug, Clone)]
pub struct CustomerBook {
    customers: Vec<Customer>,
    ledger: Ledger,
    codes: CodeGenerator,
}

impl CustomerBook {
    /// Wrap a loaded collection with the given settings.
    pub fn new(customers: Vec<Customer>, config: &LedgerConfig) -> Self {
        Self::with_parts(customers, config.ledger(), config.code_generator())
    }

    /// Wrap a loaded collection with an explicit engine and generator.
    pub fn with_parts(customers: Vec<Customer>, ledger: Ledger, codes: CodeGenerator) -> Self {
        Self {
            customers,
            ledger,
            codes,
        }
    }

    /// The ledger engine in use.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Every customer, in stored order.
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// Number of customers.
    pub fn len(&self) -> usize {
        self.customers.len()
    }

    /// Whether the book is empty.
    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// Hand the collection back for persistence.
    pub fn into_customers(self) -> Vec<Customer> {
        self.customers
    }

    // ── Registration ─────────────────────────────────────────────────

    /// Validate, de-duplicate, assign a code and append a new customer.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::Validation`] with every failing field.
    /// - [`RegistrationError::DuplicateIdentity`] when the document is
    ///   already registered.
    /// - [`RegistrationError::GenerationFailed`] or
    ///   [`RegistrationError::CodeExhausted`] when no usable code exists.
    ///
    /// The collection is unchanged on error.
    pub fn register(
        &mut self,
        input: &NewCustomer,
        now: Timestamp,
    ) -> Result<Customer, RegistrationError> {
        let mut errors: Vec<FieldError> = Vec::new();
        let name = validate_name(&input.name)
            .map_err(|e| errors.push(e.into()))
            .ok();
        let phone = validate_phone(&input.phone)
            .map_err(|e| errors.push(e.into()))
            .ok();
        let id_type = input
            .id_type
            .parse::<IdType>()
            .map_err(|e| errors.push(e.into()))
            .ok();
        let id_number = validate_id_number(&input.id_number)
            .map_err(|e| errors.push(e.into()))
            .ok();

        let (Some(name), Some(phone), Some(id_type), Some(id_number)) =
            (name, phone, id_type, id_number)
        else {
            tracing::debug!(errors = errors.len(), "registration rejected by validation");
            return Err(RegistrationError::Validation(errors));
        };

        let identity = CanonicalIdentity::new(id_type, &id_number);
        if self.customers.iter().any(|c| c.holds_document(&identity)) {
            return Err(RegistrationError::DuplicateIdentity {
                cedula: identity.cedula(),
            });
        }

        let code = self
            .codes
            .generate(&name, &identity.id_number, &self.customers)?;
        if is_taken(&self.customers, code.as_str()) {
            return Err(RegistrationError::CodeExhausted(code.as_str().to_string()));
        }

        let customer = Customer::open(code, name, phone, &identity, now);
        tracing::info!(
            customer = %customer.id,
            code = %customer.code,
            cedula = %customer.cedula,
            "customer registered"
        );
        self.customers.push(customer.clone());
        Ok(customer)
    }

    // ── Lookup ───────────────────────────────────────────────────────

    /// Customer by handle.
    pub fn find_by_id(&self, id: &CustomerId) -> Option<&Customer> {
        self.customers.iter().find(|c| &c.id == id)
    }

    /// Customer by code, ignoring surrounding whitespace. An exact match
    /// wins; otherwise the first code equal ignoring case.
    pub fn find_by_code(&self, code: &str) -> Option<&Customer> {
        let code = code.trim();
        let assigned = || self.customers.iter().filter(|c| c.code.is_assigned());
        assigned()
            .find(|c| c.code.as_str() == code)
            .or_else(|| assigned().find(|c| c.code.matches(code)))
    }

    /// Customers whose name, code or document contains `query` (case
    /// insensitive), or whose phone contains the query's digits. An empty
    /// query matches everyone.
    pub fn search(&self, query: &str) -> Vec<&Customer> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.customers.iter().collect();
        }
        let needle_digits = digits_only(&needle);
        self.customers
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle)
                    || c.code.as_str().to_lowercase().contains(&needle)
                    || c.cedula.to_lowercase().contains(&needle)
                    || (!needle_digits.is_empty() && c.phone.contains(&needle_digits))
            })
            .collect()
    }

    /// Totals over the collection.
    pub fn summary(&self) -> LedgerSummary {
        self.customers
            .iter()
            .fold(LedgerSummary::default(), |mut acc, c| {
                acc.customers += 1;
                acc.total_stamps += u64::from(c.stamps);
                acc.rewards_available += u64::from(c.rewards_earned);
                acc.rewards_redeemed += c.redeemed_rewards.len() as u64;
                acc.total_purchases += u64::from(c.total_purchases);
                acc
            })
    }

    // ── Ledger transitions ───────────────────────────────────────────

    /// Grant a stamp and raise the near-threshold notice, if any.
    pub fn add_stamp(
        &mut self,
        id: &CustomerId,
        amount: f64,
        now: Timestamp,
        notifier: &dyn Notifier,
    ) -> Result<StampAdded, LedgerError> {
        let slot = self.slot(id)?;
        let out = self.ledger.add_stamp(&self.customers[slot], amount, now);
        self.customers[slot] = out.customer.clone();

        if let (Some(kind), Some(text)) = (out.notice.kind(), out.notice.text(&out.customer.name))
        {
            notifier.notify(kind, &text);
        }
        Ok(out)
    }

    /// Remove the most recent stamp. A customer with no stamps is left as is.
    pub fn remove_stamp(&mut self, id: &CustomerId, now: Timestamp) -> Result<Customer, LedgerError> {
        let slot = self.slot(id)?;
        let next = self.ledger.remove_stamp(&self.customers[slot], now);
        self.customers[slot] = next.clone();
        Ok(next)
    }

    /// Redeem one reward, notifying success or the shortfall.
    pub fn redeem_reward(
        &mut self,
        id: &CustomerId,
        now: Timestamp,
        notifier: &dyn Notifier,
    ) -> Result<Redemption, LedgerError> {
        let slot = self.slot(id)?;
        let current = &self.customers[slot];
        match self.ledger.redeem_reward(current, now) {
            Ok(out) => {
                notifier.notify(
                    NoticeKind::Success,
                    &format!("{} redeemed a reward", out.customer.name),
                );
                self.customers[slot] = out.customer.clone();
                Ok(out)
            }
            Err(err) => {
                notifier.notify(
                    NoticeKind::Warning,
                    &format!("{} cannot redeem yet: {err}", current.name),
                );
                Err(err)
            }
        }
    }

    fn slot(&self, id: &CustomerId) -> Result<usize, LedgerError> {
        self.customers
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| LedgerError::UnknownCustomer(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::testing::RecordingNotifier;
    use crate::notify::NullNotifier;
    use stampbook_core::{CustomerCode, Field};

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn t0() -> Timestamp {
        ts("2026-01-15T12:00:00Z")
    }

    fn input(name: &str, id_type: &str, id_number: &str) -> NewCustomer {
        NewCustomer {
            name: name.into(),
            phone: "0414-123.45.67".into(),
            id_type: id_type.into(),
            id_number: id_number.into(),
        }
    }

    fn book() -> CustomerBook {
        CustomerBook::new(Vec::new(), &LedgerConfig::default())
    }

    // ── Registration ─────────────────────────────────────────────────

    #[test]
    fn register_builds_initial_state() {
        let mut b = book();
        let c = b
            .register(&input("  Juan Pérez ", "v", "12.345.678"), t0())
            .unwrap();
        assert_eq!(c.code.as_str(), "JUA5678");
        assert_eq!(c.name, "Juan Pérez");
        assert_eq!(c.phone, "04141234567");
        assert_eq!(c.id_type, Some(IdType::V));
        assert_eq!(c.id_number, "12345678");
        assert_eq!(c.cedula, "V-12345678");
        assert_eq!(c.stamps, 0);
        assert_eq!(c.rewards_earned, 0);
        assert!(c.purchase_history.is_empty());
        assert_eq!(c.last_purchase, None);
        assert_eq!(c.join_date, t0());
        assert_eq!(c.created_at, t0());
        assert_eq!(c.updated_at, t0());
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn register_collects_every_field_error() {
        let mut b = book();
        let err = b
            .register(
                &NewCustomer {
                    name: "Al".into(),
                    phone: "123".into(),
                    id_type: "X".into(),
                    id_number: "12".into(),
                },
                t0(),
            )
            .unwrap_err();
        let fields: Vec<Field> = err.field_errors().iter().map(|f| f.field).collect();
        assert_eq!(
            fields,
            vec![Field::Name, Field::Phone, Field::IdType, Field::IdNumber]
        );
        assert!(b.is_empty());
    }

    #[test]
    fn register_rejects_duplicate_document() {
        let mut b = book();
        b.register(&input("Juan Pérez", "V", "12345678"), t0())
            .unwrap();
        let err = b
            .register(&input("Otro Nombre", "v", "12-345-678"), t0())
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateIdentity {
                cedula: "V-12345678".into()
            }
        );
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn same_number_different_type_is_allowed() {
        let mut b = book();
        let first = b
            .register(&input("Juan Pérez", "V", "12345678"), t0())
            .unwrap();
        let second = b
            .register(&input("Juana Díaz", "E", "12345678"), t0())
            .unwrap();
        assert_eq!(first.code.as_str(), "JUA5678");
        assert_eq!(second.code.as_str(), "JUA5678-1");
    }

    #[test]
    fn register_rejects_name_without_letters() {
        let mut b = book();
        let err = b
            .register(&input("123", "V", "12345678"), t0())
            .unwrap_err();
        assert!(matches!(err, RegistrationError::GenerationFailed(_)));
        assert!(b.is_empty());
    }

    #[test]
    fn register_rejects_exhausted_codes() {
        let mut b = CustomerBook::with_parts(Vec::new(), Ledger::default(), CodeGenerator::new(1));
        b.register(&input("Ana Ruiz", "V", "11114321"), t0())
            .unwrap();
        b.register(&input("Ana Ruiz", "E", "11114321"), t0())
            .unwrap();
        let err = b
            .register(&input("Ana Ruiz", "J", "11114321"), t0())
            .unwrap_err();
        assert_eq!(err, RegistrationError::CodeExhausted("ANA4321-1".into()));
        assert_eq!(b.len(), 2);
    }

    // ── Lookup ───────────────────────────────────────────────────────

    #[test]
    fn find_by_code_ignores_case() {
        let mut b = book();
        let c = b
            .register(&input("Juan Pérez", "V", "12345678"), t0())
            .unwrap();
        assert_eq!(b.find_by_code(" jua5678 ").map(|x| &x.id), Some(&c.id));
        assert!(b.find_by_code("JUA567").is_none());
        assert_eq!(b.find_by_id(&c.id).map(|x| &x.code), Some(&c.code));
    }

    #[test]
    fn find_by_code_prefers_exact_match() {
        let holder = |code: &str, number: &str| {
            Customer::open(
                CustomerCode::new(code),
                "Juan Pérez",
                "04141234567",
                &CanonicalIdentity::new(IdType::V, number),
                t0(),
            )
        };
        let legacy = holder("jua5678", "11115678");
        let current = holder("JUA5678", "12345678");
        let b = CustomerBook::new(
            vec![legacy.clone(), current.clone()],
            &LedgerConfig::default(),
        );
        assert_eq!(b.find_by_code("JUA5678").map(|x| &x.id), Some(&current.id));
        assert_eq!(b.find_by_code("jua5678").map(|x| &x.id), Some(&legacy.id));
        assert_eq!(b.find_by_code("Jua5678").map(|x| &x.id), Some(&legacy.id));
    }

    #[test]
    fn search_matches_name_code_document_and_phone() {
        let mut b = book();
        b.register(&input("Juan Pérez", "V", "12345678"), t0())
            .unwrap();
        b.register(&input("María Gómez", "E", "87654321"), t0())
            .unwrap();
        assert_eq!(b.search("pérez").len(), 1);
        assert_eq!(b.search("MAR").len(), 1);
        assert_eq!(b.search("e-8765").len(), 1);
        assert_eq!(b.search("0414-123").len(), 2);
        assert_eq!(b.search("").len(), 2);
        assert!(b.search("zzz").is_empty());
    }

    // ── Transitions ──────────────────────────────────────────────────

    #[test]
    fn add_stamp_notifies_near_threshold() {
        let mut b = book();
        let id = b
            .register(&input("Juan Pérez", "V", "12345678"), t0())
            .unwrap()
            .id;
        let rec = RecordingNotifier::default();
        for _ in 0..9 {
            b.add_stamp(&id, 1.0, t0(), &rec).unwrap();
        }
        let out = b.add_stamp(&id, 1.0, t0(), &rec).unwrap();
        assert_eq!(out.customer.rewards_earned, 1);
        assert_eq!(b.find_by_id(&id).unwrap().stamps, 10);

        let kinds: Vec<NoticeKind> = rec.notices.borrow().iter().map(|(k, _)| *k).collect();
        // 7, 8, 9 stamps are info notices; 10 is the reward.
        assert_eq!(
            kinds,
            vec![
                NoticeKind::Info,
                NoticeKind::Info,
                NoticeKind::Info,
                NoticeKind::Success
            ]
        );
    }

    #[test]
    fn redeem_without_stamps_warns_and_keeps_state() {
        let mut b = book();
        let id = b
            .register(&input("Juan Pérez", "V", "12345678"), t0())
            .unwrap()
            .id;
        let before = b.find_by_id(&id).unwrap().clone();
        let rec = RecordingNotifier::default();
        let err = b.redeem_reward(&id, t0(), &rec).unwrap_err();
        assert_eq!(err, LedgerError::InsufficientStamps { have: 0, need: 10 });
        assert_eq!(b.find_by_id(&id).unwrap(), &before);
        assert_eq!(rec.notices.borrow()[0].0, NoticeKind::Warning);
    }

    #[test]
    fn redeem_swaps_next_state_in() {
        let mut b = book();
        let id = b
            .register(&input("Juan Pérez", "V", "12345678"), t0())
            .unwrap()
            .id;
        for _ in 0..12 {
            b.add_stamp(&id, 0.0, t0(), &NullNotifier).unwrap();
        }
        b.redeem_reward(&id, t0(), &NullNotifier).unwrap();
        let c = b.find_by_id(&id).unwrap();
        assert_eq!((c.stamps, c.rewards_earned), (2, 0));
        assert_eq!(c.redeemed_rewards.len(), 1);
    }

    #[test]
    fn remove_stamp_updates_book() {
        let mut b = book();
        let id = b
            .register(&input("Juan Pérez", "V", "12345678"), t0())
            .unwrap()
            .id;
        b.add_stamp(&id, 0.0, t0(), &NullNotifier).unwrap();
        let later = ts("2026-02-01T00:00:00Z");
        let next = b.remove_stamp(&id, later).unwrap();
        assert_eq!(next.stamps, 0);
        assert_eq!(b.find_by_id(&id).unwrap().updated_at, later);
    }

    #[test]
    fn unknown_customer_is_reported() {
        let mut b = book();
        let ghost = CustomerId::from_string("ghost");
        assert_eq!(
            b.remove_stamp(&ghost, t0()).unwrap_err(),
            LedgerError::UnknownCustomer("ghost".into())
        );
    }

    #[test]
    fn summary_totals() {
        let mut b = book();
        let a = b
            .register(&input("Juan Pérez", "V", "12345678"), t0())
            .unwrap()
            .id;
        let m = b
            .register(&input("María Gómez", "E", "87654321"), t0())
            .unwrap()
            .id;
        for _ in 0..11 {
            b.add_stamp(&a, 0.0, t0(), &NullNotifier).unwrap();
        }
        for _ in 0..3 {
            b.add_stamp(&m, 0.0, t0(), &NullNotifier).unwrap();
        }
        b.redeem_reward(&a, t0(), &NullNotifier).unwrap();
        assert_eq!(
            b.summary(),
            LedgerSummary {
                customers: 2,
                total_stamps: 4,
                rewards_available: 0,
                rewards_redeemed: 1,
                total_purchases: 14,
            }
        );
    }
}
