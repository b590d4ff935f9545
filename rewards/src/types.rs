//! Core types for the weekly rewards pipeline.
//!
//! These types model the leaderboard, card holdings, per-rank quotas and
//! the per-address claim entries that feed the Merkle commitment.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::{Result, RewardsError};

/// Season/week/budget context for one weekly run.
///
/// Passed explicitly into every operation; nothing in the pipeline reads
/// a "current week" from ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekContext {
    /// Season identifier, e.g. `"2026-S1"`
    pub season: String,
    /// ISO-week style identifier, e.g. `"2026-W35"`
    pub week: String,
    /// Total points distributed across all ranked builders this week
    pub weekly_budget: u64,
}

impl WeekContext {
    /// Create a context, rejecting a malformed week identifier up front.
    pub fn new(season: impl Into<String>, week: impl Into<String>, weekly_budget: u64) -> Result<Self> {
        let ctx = Self {
            season: season.into(),
            week: week.into(),
            weekly_budget,
        };
        ctx.validate()?;
        Ok(ctx)
    }

    /// Validate the week identifier (`YYYY-WNN`, week 1-53).
    pub fn validate(&self) -> Result<()> {
        let (year, num) = self
            .week
            .split_once("-W")
            .ok_or_else(|| RewardsError::InvalidWeek(self.week.clone()))?;

        let year_ok = year.len() == 4 && year.chars().all(|c| c.is_ascii_digit());
        let week_num: u32 = num
            .parse()
            .map_err(|_| RewardsError::InvalidWeek(self.week.clone()))?;

        if !year_ok || num.len() != 2 || !(1..=53).contains(&week_num) {
            return Err(RewardsError::InvalidWeek(self.week.clone()));
        }
        Ok(())
    }
}

/// Raw weekly stats for one builder, as returned by the leaderboard source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderStats {
    /// Builder identity
    pub builder_id: Uuid,
    /// Display name, used as the final tie-break
    pub display_name: String,
    /// Gems collected during the week
    pub gems_collected: u64,
    /// Timestamp of the builder's earliest qualifying event this week
    pub earliest_event_at: DateTime<Utc>,
}

/// One row of the ranked weekly leaderboard.
///
/// Ranks are 1-based and contiguous; ties never share a rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Builder identity
    pub builder_id: Uuid,
    /// 1-based rank after the deterministic sort
    pub rank: u32,
    /// Gems collected during the week
    pub gems_collected: u64,
}

/// Collectible card kind, weighted differently when splitting scout points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NftType {
    /// Full-price collectible
    Default,
    /// Discounted starter-pack collectible
    StarterPack,
}

impl NftType {
    /// Weight multiplier applied to purchased units when computing
    /// scout shares. Starter packs carry a tenth of the weight of the
    /// full-price card.
    pub fn weight(&self) -> u64 {
        match self {
            Self::Default => 10,
            Self::StarterPack => 1,
        }
    }
}

/// Cumulative units a scout purchased of one builder's collectible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardHolding {
    /// Scout identity
    pub scout_id: Uuid,
    /// Card kind, determines the weight multiplier
    pub nft_type: NftType,
    /// Units purchased (cumulative within the season)
    pub tokens_purchased: u64,
}

/// Per-rank quota after applying the decay curve and normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankQuota {
    /// 1-based rank
    pub rank: u32,
    /// Decay-curve output before normalization
    pub raw_quota: f64,
    /// Integer quota after normalization and flooring
    pub normalized_quota: u64,
}

/// One builder's quota divided between the builder and their scouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderSplit {
    /// Builder identity
    pub builder_id: Uuid,
    /// Builder's own share of the quota
    pub points_for_builder: u64,
    /// Each backing scout's share, keyed by scout id
    pub points_per_scout: HashMap<Uuid, u64>,
}

impl BuilderSplit {
    /// Total points this split emits (builder plus all scouts).
    pub fn total_points(&self) -> u64 {
        self.points_for_builder + self.points_per_scout.values().sum::<u64>()
    }
}

/// A 20-byte on-chain wallet address.
///
/// Parsed from and displayed as a `0x`-prefixed lowercase hex string;
/// ordered so claim sets can be emitted deterministically.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// Wrap raw address bytes.
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// The raw 20 address bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = RewardsError;

    fn from_str(s: &str) -> Result<Self> {
        let hex_part = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(hex_part).map_err(|_| RewardsError::InvalidAddress(s.to_string()))?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| RewardsError::InvalidAddress(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One per-address payout committed into the weekly Merkle tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimEntry {
    /// Wallet address the claim pays out to
    pub address: Address,
    /// Claimable points, merged across builder and scout roles
    pub amount: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_context_accepts_iso_week() {
        let ctx = WeekContext::new("2026-S1", "2026-W35", 100_000).unwrap();
        assert_eq!(ctx.week, "2026-W35");
    }

    #[test]
    fn test_week_context_rejects_malformed_week() {
        assert!(WeekContext::new("2026-S1", "2026-35", 100).is_err());
        assert!(WeekContext::new("2026-S1", "26-W35", 100).is_err());
        assert!(WeekContext::new("2026-S1", "2026-W00", 100).is_err());
        assert!(WeekContext::new("2026-S1", "2026-W54", 100).is_err());
        assert!(WeekContext::new("2026-S1", "2026-W5", 100).is_err());
        assert!(WeekContext::new("2026-S1", "", 100).is_err());
    }

    #[test]
    fn test_nft_type_weights() {
        assert_eq!(NftType::Default.weight(), 10);
        assert_eq!(NftType::StarterPack.weight(), 1);
    }

    #[test]
    fn test_address_round_trip() {
        let addr: Address = "0x00112233445566778899aabbccddeeff00112233".parse().unwrap();
        assert_eq!(addr.to_string(), "0x00112233445566778899aabbccddeeff00112233");

        // Without the 0x prefix
        let bare: Address = "00112233445566778899aabbccddeeff00112233".parse().unwrap();
        assert_eq!(addr, bare);
    }

    #[test]
    fn test_address_rejects_bad_input() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzz112233445566778899aabbccddeeff00112233".parse::<Address>().is_err());
        assert!("".parse::<Address>().is_err());
    }

    #[test]
    fn test_address_serde_as_hex_string() {
        let addr: Address = "0x00112233445566778899aabbccddeeff00112233".parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0x00112233445566778899aabbccddeeff00112233\"");

        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);
    }
}
