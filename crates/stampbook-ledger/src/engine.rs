//! # Ledger Engine
//!
//! Pure transitions over one customer's stamp ledger, parameterized by a
//! [`RewardPolicy`]. Each transition takes the current record and returns
//! the next one; the input is never modified.
//!
//! ## Transitions
//!
//! ```text
//! add_stamp      stamps+1, totalPurchases+1, append purchase, lastPurchase=now
//! remove_stamp   stamps-1, totalPurchases-1, drop last purchase  (no-op at 0)
//! redeem_reward  stamps-N, append redemption                      (needs stamps >= N)
//! ```
//!
//! Every transition recomputes `rewardsEarned = floor(stamps / N)` and sets
//! `updatedAt`. `remove_stamp` is a manual correction, not an inverse of
//! `add_stamp`: it leaves `lastPurchase` alone.

use stampbook_core::{
    Customer, EventId, LedgerError, PurchaseEvent, RedeemedReward, RewardPolicy, RewardType,
    Timestamp,
};

use crate::notify::NoticeKind;

/// Default upper bound of the "a few stamps left" window.
pub const DEFAULT_NEAR_THRESHOLD_WINDOW: u32 = 3;

/// What a caller should announce after a stamp is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampNotice {
    /// Nothing worth announcing.
    None,
    /// The stamp completed a card.
    RewardReady,
    /// Exactly one stamp is missing.
    OneLeft,
    /// Between two and the configured window of stamps are missing.
    FewLeft(u32),
}

impl StampNotice {
    /// Notification severity, if the notice should be shown.
    pub fn kind(&self) -> Option<NoticeKind> {
        match self {
            Self::None => None,
            Self::RewardReady => Some(NoticeKind::Success),
            Self::OneLeft | Self::FewLeft(_) => Some(NoticeKind::Info),
        }
    }

    /// Notification text for the named customer, if the notice should be shown.
    pub fn text(&self, name: &str) -> Option<String> {
        match self {
            Self::None => None,
            Self::RewardReady => Some(format!("{name} has earned a reward")),
            Self::OneLeft => Some(format!("{name} is one stamp away from a reward")),
            Self::FewLeft(n) => Some(format!("{name} needs {n} more stamps for a reward")),
        }
    }
}

/// Result of [`Ledger::add_stamp`].
#[derive(Debug, Clone, PartialEq)]
pub struct StampAdded {
    /// Next state.
    pub customer: Customer,
    /// Near-threshold notice for the new balance.
    pub notice: StampNotice,
}

/// Result of a successful [`Ledger::redeem_reward`].
#[derive(Debug, Clone, PartialEq)]
pub struct Redemption {
    /// Next state.
    pub customer: Customer,
    /// The appended redemption record.
    pub reward: RedeemedReward,
}

/// The ledger state machine for a fixed reward policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ledger {
    policy: RewardPolicy,
    near_threshold_window: u32,
}

impl Ledger {
    /// Create a ledger with the default near-threshold window.
    pub fn new(policy: RewardPolicy) -> Self {
        Self {
            policy,
            near_threshold_window: DEFAULT_NEAR_THRESHOLD_WINDOW,
        }
    }

    /// Override the "a few stamps left" window (at least 1).
    pub fn with_near_threshold_window(mut self, window: u32) -> Self {
        self.near_threshold_window = window.max(1);
        self
    }

    /// The reward policy in force.
    pub fn policy(&self) -> RewardPolicy {
        self.policy
    }

    /// Grant one stamp for a purchase of `amount`.
    ///
    /// Negative or non-finite amounts are recorded as `0`.
    pub fn add_stamp(&self, customer: &Customer, amount: f64, now: Timestamp) -> StampAdded {
        let mut next = customer.clone();
        next.stamps = next.stamps.saturating_add(1);
        next.total_purchases = next.total_purchases.saturating_add(1);
        next.purchase_history.push(PurchaseEvent {
            id: EventId::new(),
            date: now,
            amount: sanitize_amount(amount),
            stamp_number: next.stamps,
        });
        next.rewards_earned = self.policy.rewards_for(next.stamps);
        next.last_purchase = Some(now);
        next.updated_at = now;

        let notice = self.notice_for(next.stamps);
        tracing::debug!(
            customer = %next.id,
            stamps_before = customer.stamps,
            stamps_after = next.stamps,
            rewards = next.rewards_earned,
            "stamp added"
        );
        StampAdded {
            customer: next,
            notice,
        }
    }

    /// Remove the most recent stamp. Returns the input unchanged when the
    /// customer has no stamps.
    pub fn remove_stamp(&self, customer: &Customer, now: Timestamp) -> Customer {
        if customer.stamps == 0 {
            tracing::debug!(customer = %customer.id, "no stamps to remove");
            return customer.clone();
        }

        let mut next = customer.clone();
        next.stamps = next.stamps.saturating_sub(1);
        next.total_purchases = next.total_purchases.saturating_sub(1);
        next.purchase_history.pop();
        next.rewards_earned = self.policy.rewards_for(next.stamps);
        next.updated_at = now;

        tracing::debug!(
            customer = %next.id,
            stamps_before = customer.stamps,
            stamps_after = next.stamps,
            "stamp removed"
        );
        next
    }

    /// Exchange one reward's worth of stamps. Only one reward is redeemed
    /// per call, however many the balance covers.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientStamps`] when the balance is short; the
    /// customer is left untouched.
    pub fn redeem_reward(
        &self,
        customer: &Customer,
        now: Timestamp,
    ) -> Result<Redemption, LedgerError> {
        let need = self.policy.stamps_per_reward();
        if !self.policy.can_redeem(customer.stamps) {
            return Err(LedgerError::InsufficientStamps {
                have: customer.stamps,
                need,
            });
        }

        let reward = RedeemedReward {
            id: EventId::new(),
            date: now,
            stamps_used: need,
            reward_type: RewardType::Standard,
        };

        let mut next = customer.clone();
        next.stamps -= need;
        next.rewards_earned = self.policy.rewards_for(next.stamps);
        next.redeemed_rewards.push(reward.clone());
        next.updated_at = now;

        tracing::debug!(
            customer = %next.id,
            stamps_before = customer.stamps,
            stamps_after = next.stamps,
            "reward redeemed"
        );
        Ok(Redemption {
            customer: next,
            reward,
        })
    }

    /// Progress of the customer's current card, in `[0, 100)`.
    pub fn progress(&self, customer: &Customer) -> f64 {
        self.policy.progress(customer.stamps)
    }

    /// The notice raised when a balance of `stamps` is reached by adding a stamp.
    /// The most specific condition wins.
    pub fn notice_for(&self, stamps: u32) -> StampNotice {
        if stamps == 0 {
            return StampNotice::None;
        }
        let remaining = self.policy.remaining_for_next(stamps);
        if remaining == self.policy.stamps_per_reward() {
            StampNotice::RewardReady
        } else if remaining == 1 {
            StampNotice::OneLeft
        } else if remaining <= self.near_threshold_window {
            StampNotice::FewLeft(remaining)
        } else {
            StampNotice::None
        }
    }

    /// Bring a stored `rewardsEarned` back in line with the balance.
    /// Returns whether the record was modified.
    pub fn reconcile_rewards(&self, customer: &mut Customer) -> bool {
        let expected = self.policy.rewards_for(customer.stamps);
        if customer.rewards_earned == expected {
            return false;
        }
        customer.rewards_earned = expected;
        true
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(RewardPolicy::default())
    }
}

fn sanitize_amount(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}
