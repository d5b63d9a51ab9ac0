//! # Customer Records
//!
//! The unit of the ledger and its append-only event records. Field names
//! serialize in camelCase to stay compatible with collections written by
//! earlier clients; any field those clients did not write deserializes to
//! an empty or zero default.

use serde::{Deserialize, Serialize};

use crate::identity::{deserialize_lenient_id_type, CustomerCode, CustomerId, EventId, IdType};
use crate::normalize::{CanonicalIdentity, RawIdentity};
use crate::temporal::Timestamp;

/// Kind of reward handed out at redemption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardType {
    /// One full card exchanged for the house reward.
    #[default]
    Standard,
}

/// One stamp-earning purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseEvent {
    /// Event handle.
    pub id: EventId,
    /// When the stamp was granted.
    pub date: Timestamp,
    /// Purchase amount. Non-negative; `0` when not recorded.
    #[serde(default)]
    pub amount: f64,
    /// Stamp count right after this purchase.
    #[serde(default)]
    pub stamp_number: u32,
}

/// One reward redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemedReward {
    /// Event handle.
    pub id: EventId,
    /// When the reward was redeemed.
    pub date: Timestamp,
    /// Stamps deducted for this reward.
    pub stamps_used: u32,
    /// Reward kind.
    #[serde(default)]
    pub reward_type: RewardType,
}

/// A loyalty customer and their stamp ledger.
///
/// Mutated only through ledger transitions and migration fixes. The
/// stored `cedula` is always `"{idType}-{idNumber}"` once the record has
/// been normalized; records written by older clients may still carry a
/// missing type or a free-text cédula until the migration resolver runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Immutable handle.
    pub id: CustomerId,
    /// Short human-readable code, unique within the collection.
    #[serde(default)]
    pub code: CustomerCode,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Digit-only phone.
    #[serde(default)]
    pub phone: String,
    /// Document type; `None` on records that predate document types.
    #[serde(default, deserialize_with = "deserialize_lenient_id_type")]
    pub id_type: Option<IdType>,
    /// Digit-only document number.
    #[serde(default)]
    pub id_number: String,
    /// Composite `"{idType}-{idNumber}"` display string.
    #[serde(default)]
    pub cedula: String,
    /// Current stamp balance.
    #[serde(default)]
    pub stamps: u32,
    /// Stamp-earning events recorded (net of manual removals).
    #[serde(default)]
    pub total_purchases: u32,
    /// Purchase log, oldest first.
    #[serde(default)]
    pub purchase_history: Vec<PurchaseEvent>,
    /// Redemption log, oldest first.
    #[serde(default)]
    pub redeemed_rewards: Vec<RedeemedReward>,
    /// `floor(stamps / stampsPerReward)`; recomputed on every transition.
    #[serde(default)]
    pub rewards_earned: u32,
    /// When the customer joined.
    pub join_date: Timestamp,
    /// Most recent stamp, if any.
    #[serde(default)]
    pub last_purchase: Option<Timestamp>,
    /// Record creation time.
    pub created_at: Timestamp,
    /// Last modification time.
    pub updated_at: Timestamp,
}

impl Customer {
    /// Build the initial ledger state for a freshly registered customer.
    pub fn open(
        code: CustomerCode,
        name: impl Into<String>,
        phone: impl Into<String>,
        identity: &CanonicalIdentity,
        now: Timestamp,
    ) -> Self {
        Self {
            id: CustomerId::new(),
            code,
            name: name.into(),
            phone: phone.into(),
            id_type: Some(identity.id_type),
            id_number: identity.id_number.clone(),
            cedula: identity.cedula(),
            stamps: 0,
            total_purchases: 0,
            purchase_history: Vec::new(),
            redeemed_rewards: Vec::new(),
            rewards_earned: 0,
            join_date: now,
            last_purchase: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The identity fields as currently stored.
    pub fn raw_identity(&self) -> RawIdentity {
        RawIdentity {
            id_type: self.id_type.map(|t| t.as_str().to_string()).unwrap_or_default(),
            id_number: self.id_number.clone(),
            cedula: self.cedula.clone(),
        }
    }

    /// The stored identity, if both type and number are present.
    pub fn identity(&self) -> Option<CanonicalIdentity> {
        let id_type = self.id_type?;
        if self.id_number.is_empty() {
            return None;
        }
        Some(CanonicalIdentity::new(id_type, &self.id_number))
    }

    /// Whether this customer holds the given document.
    pub fn holds_document(&self, identity: &CanonicalIdentity) -> bool {
        self.id_type == Some(identity.id_type) && self.id_number == identity.id_number
    }

    /// Overwrite the identity fields with a canonical identity.
    pub fn set_identity(&mut self, identity: &CanonicalIdentity, now: Timestamp) {
        self.id_type = Some(identity.id_type);
        self.id_number = identity.id_number.clone();
        self.cedula = identity.cedula();
        self.updated_at = now;
    }
}

/// A customer whose document type could not be inferred, with a proposed
/// default awaiting confirmation. Never persisted as a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefixCandidate {
    /// Handle of the customer the proposal is for.
    pub id: CustomerId,
    /// Customer name, for display.
    pub name: String,
    /// Digits recovered from the record.
    pub id_number: String,
    /// Proposed (unconfirmed) document type.
    pub id_type: IdType,
}
