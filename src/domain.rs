use crate::config::RankThresholds;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Partner rank ladder (§3, §4.6). Ordering follows declaration order
/// so `rank as index` never decreases once promoted (invariant 4, §8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Starter,
    Achiever,
    Leader,
    ProLeader,
    Champion,
    Legend,
}

impl Rank {
    pub const LADDER: [Rank; 6] = [
        Rank::Starter,
        Rank::Achiever,
        Rank::Leader,
        Rank::ProLeader,
        Rank::Champion,
        Rank::Legend,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Starter => "starter",
            Rank::Achiever => "achiever",
            Rank::Leader => "leader",
            Rank::ProLeader => "pro_leader",
            Rank::Champion => "champion",
            Rank::Legend => "legend",
        }
    }

    /// The next rank in the ladder, if any.
    pub fn next(&self) -> Option<Rank> {
        let idx = Rank::LADDER.iter().position(|r| r == self)?;
        Rank::LADDER.get(idx + 1).copied()
    }

    /// Threshold (in sales units), bonus, and insurance entitlement for
    /// crossing into this rank. `Starter` has no threshold; it's the
    /// rank everyone begins at.
    pub fn requirements(&self, thresholds: &RankThresholds) -> Option<(i64, Decimal, Decimal)> {
        match self {
            Rank::Starter => None,
            Rank::Achiever => Some((
                thresholds.achiever_units,
                thresholds.achiever_bonus,
                thresholds.achiever_insurance,
            )),
            Rank::Leader => Some((
                thresholds.leader_units,
                thresholds.leader_bonus,
                thresholds.leader_insurance,
            )),
            Rank::ProLeader => Some((
                thresholds.pro_leader_units,
                thresholds.pro_leader_bonus,
                thresholds.pro_leader_insurance,
            )),
            Rank::Champion => Some((
                thresholds.champion_units,
                thresholds.champion_bonus,
                thresholds.champion_insurance,
            )),
            Rank::Legend => Some((
                thresholds.legend_units,
                thresholds.legend_bonus,
                thresholds.legend_insurance,
            )),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starter" => Ok(Rank::Starter),
            "achiever" => Ok(Rank::Achiever),
            "leader" => Ok(Rank::Leader),
            "pro_leader" => Ok(Rank::ProLeader),
            "champion" => Ok(Rank::Champion),
            "legend" => Ok(Rank::Legend),
            other => Err(format!("unknown rank: {other}")),
        }
    }
}

/// Compute the tiered team-commission rate for a given cumulative team
/// sales volume (§4.2). Boundaries are inclusive on the lower tier,
/// matching scenario S2 in §8.
pub fn tiered_rate(total_team_units: i64, thresholds: &crate::config::TierThresholds) -> Decimal {
    if total_team_units <= thresholds.tier1_max_units {
        thresholds.tier1_rate
    } else if total_team_units <= thresholds.tier2_max_units {
        thresholds.tier2_rate
    } else {
        thresholds.tier3_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TierThresholds;

    #[test]
    fn rank_ordering_is_monotone() {
        assert!(Rank::Starter < Rank::Achiever);
        assert!(Rank::Achiever < Rank::Leader);
        assert!(Rank::Leader < Rank::ProLeader);
        assert!(Rank::ProLeader < Rank::Champion);
        assert!(Rank::Champion < Rank::Legend);
    }

    #[test]
    fn next_rank_chains_to_legend_then_stops() {
        assert_eq!(Rank::Starter.next(), Some(Rank::Achiever));
        assert_eq!(Rank::Legend.next(), None);
    }

    #[test]
    fn tier_boundaries_are_inclusive_on_the_lower_tier() {
        let t = TierThresholds::default();
        assert_eq!(tiered_rate(1000, &t), t.tier1_rate);
        assert_eq!(tiered_rate(1001, &t), t.tier2_rate);
        assert_eq!(tiered_rate(10_000, &t), t.tier2_rate);
        assert_eq!(tiered_rate(10_001, &t), t.tier3_rate);
    }
}
