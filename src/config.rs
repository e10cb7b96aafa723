use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::env;

/// Settings bag for the compensation engine, loaded once at boot.
///
/// Mirrors the teacher's `AppConfig::default()` pattern of reading the
/// process environment (via `dotenvy`) rather than threading a config
/// file through the binary.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub allowed_origins: Vec<String>,
    pub database_max_connections: u32,

    /// Currency units per sales unit (§3, §9).
    pub unit_price: Decimal,
    /// Tier boundaries for `tiered_rate`, in ascending team-unit thresholds.
    pub tier_thresholds: TierThresholds,
    pub rank_thresholds: RankThresholds,

    pub min_wallet_withdrawal: Decimal,
    /// Reserved for a future queued-payout flow; not enforced today (§9).
    pub min_weekly_payout: Decimal,

    pub direct_referral_rate: Decimal,

    /// Day of week (0 = Sunday .. 6 = Saturday) and local hour the
    /// Weekly Settler fires.
    pub scheduler_day_of_week: u32,
    pub scheduler_hour: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TierThresholds {
    pub tier1_max_units: i64,
    pub tier1_rate: Decimal,
    pub tier2_max_units: i64,
    pub tier2_rate: Decimal,
    pub tier3_rate: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankThresholds {
    pub achiever_units: i64,
    pub achiever_bonus: Decimal,
    pub achiever_insurance: Decimal,
    pub leader_units: i64,
    pub leader_bonus: Decimal,
    pub leader_insurance: Decimal,
    pub pro_leader_units: i64,
    pub pro_leader_bonus: Decimal,
    pub pro_leader_insurance: Decimal,
    pub champion_units: i64,
    pub champion_bonus: Decimal,
    pub champion_insurance: Decimal,
    pub legend_units: i64,
    pub legend_bonus: Decimal,
    pub legend_insurance: Decimal,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            tier1_max_units: 1_000,
            tier1_rate: dec!(0.02),
            tier2_max_units: 10_000,
            tier2_rate: dec!(0.01),
            tier3_rate: dec!(0.001),
        }
    }
}

impl Default for RankThresholds {
    fn default() -> Self {
        Self {
            achiever_units: 100,
            achiever_bonus: dec!(10_000),
            achiever_insurance: dec!(0),
            leader_units: 1_000,
            leader_bonus: dec!(100_000),
            leader_insurance: dec!(100_000),
            pro_leader_units: 10_000,
            pro_leader_bonus: dec!(1_000_000),
            pro_leader_insurance: dec!(1_000_000),
            champion_units: 100_000,
            champion_bonus: dec!(10_000_000),
            champion_insurance: dec!(10_000_000),
            legend_units: 1_000_000,
            legend_bonus: dec!(100_000_000),
            legend_insurance: dec!(100_000_000),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        // Load .env file if it exists, same as the teacher's boot sequence.
        dotenvy::dotenv().ok();

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            allowed_origins,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            unit_price: dec!(5000),
            tier_thresholds: TierThresholds::default(),
            rank_thresholds: RankThresholds::default(),
            min_wallet_withdrawal: dec!(1000),
            min_weekly_payout: dec!(5000),
            direct_referral_rate: dec!(0.20),
            scheduler_day_of_week: env::var("SCHEDULER_DAY_OF_WEEK")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1), // Monday
            scheduler_hour: env::var("SCHEDULER_HOUR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(16),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::default()
    }
}
