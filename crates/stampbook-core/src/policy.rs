//! # Reward Policy
//!
//! The single numeric parameter of the ledger: how many stamps make one
//! reward. Every derived quantity (`rewardsEarned`, stamps remaining,
//! card progress) is computed here so that no caller can drift from
//! `rewardsEarned == floor(stamps / stampsPerReward)`.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Stamps required for one reward. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RewardPolicy {
    stamps_per_reward: NonZeroU32,
}

impl RewardPolicy {
    /// Stamps per reward when nothing is configured.
    pub const DEFAULT_STAMPS_PER_REWARD: u32 = 10;

    /// Build a policy. Returns `None` for zero.
    pub fn new(stamps_per_reward: u32) -> Option<Self> {
        NonZeroU32::new(stamps_per_reward).map(|n| Self {
            stamps_per_reward: n,
        })
    }

    /// Build a policy from an untrusted configuration value, clamping
    /// zero and negative values to one.
    pub fn clamped(stamps_per_reward: i64) -> Self {
        let n = stamps_per_reward.clamp(1, i64::from(u32::MAX)) as u32;
        Self {
            stamps_per_reward: NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN),
        }
    }

    /// Stamps required for one reward.
    pub fn stamps_per_reward(&self) -> u32 {
        self.stamps_per_reward.get()
    }

    /// Whole rewards covered by `stamps`.
    pub fn rewards_for(&self, stamps: u32) -> u32 {
        stamps / self.stamps_per_reward.get()
    }

    /// Stamps still missing before the next reward. A card that just
    /// completed a reward reports a full card's worth.
    pub fn remaining_for_next(&self, stamps: u32) -> u32 {
        let n = self.stamps_per_reward.get();
        n - stamps % n
    }

    /// Whether `stamps` covers at least one reward.
    pub fn can_redeem(&self, stamps: u32) -> bool {
        stamps >= self.stamps_per_reward.get()
    }

    /// Progress of the current card in percent, in `[0, 100)`.
    pub fn progress(&self, stamps: u32) -> f64 {
        progress_percentage(i64::from(stamps), i64::from(self.stamps_per_reward.get()))
    }
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self::clamped(i64::from(Self::DEFAULT_STAMPS_PER_REWARD))
    }
}

/// Progress of the current card in percent.
///
/// `(stamps mod n) * (100 / n)` with `n = max(1, stamps_per_reward)` and
/// `stamps` clamped to non-negative. Always in `[0, 100)`.
pub fn progress_percentage(stamps: i64, stamps_per_reward: i64) -> f64 {
    let n = stamps_per_reward.max(1);
    let stamps = stamps.max(0);
    let pct = (stamps % n) as f64 * (100.0 / n as f64);
    // Rounding can land on 100 when `n` exceeds f64 precision.
    pct.min(JUST_BELOW_100)
}

/// Largest `f64` strictly below 100.
const JUST_BELOW_100: f64 = 99.999_999_999_999_99;
