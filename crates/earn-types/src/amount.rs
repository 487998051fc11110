use serde::{Deserialize, Serialize};
use std::fmt;

pub const REWARD_DECIMALS: u32 = 7;
pub const REWARD_BASE_UNIT: u128 = 10_000_000; // 10^7

/// Reward denominated in base units of the quest's reward asset.
/// The ledger contract consumes the raw u128.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RewardAmount(u128);

impl RewardAmount {
    pub const ZERO: Self = Self(0);

    pub fn from_tokens(tokens: f64) -> Self {
        Self((tokens * REWARD_BASE_UNIT as f64) as u128)
    }

    pub fn from_base_units(units: u128) -> Self {
        Self(units)
    }

    pub fn to_tokens(&self) -> f64 {
        self.0 as f64 / REWARD_BASE_UNIT as f64
    }

    pub fn to_base_units(&self) -> u128 {
        self.0
    }

    pub fn checked_add(&self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(&self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RewardAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.7}", self.to_tokens())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_conversion() {
        let amount = RewardAmount::from_tokens(100.0);
        assert_eq!(amount.to_base_units(), 100 * REWARD_BASE_UNIT);
        assert_eq!(amount.to_tokens(), 100.0);
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = RewardAmount::from_base_units(10);
        let b = RewardAmount::from_base_units(4);
        assert_eq!(a.checked_add(b), Some(RewardAmount::from_base_units(14)));
        assert_eq!(a.checked_sub(b), Some(RewardAmount::from_base_units(6)));
        assert_eq!(b.checked_sub(a), None);
        assert_eq!(
            RewardAmount::from_base_units(u128::MAX).checked_add(a),
            None
        );
    }

    #[test]
    fn test_zero() {
        assert!(RewardAmount::ZERO.is_zero());
        assert!(!RewardAmount::from_tokens(0.5).is_zero());
    }
}
