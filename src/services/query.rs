//! Query API (C10). Read-only summaries over the Ledger and Commission
//! Queue (§4.10).

use crate::error::AppResult;
use crate::models::LedgerKind;
use crate::services::{commission_queue, ledger, partner_registry::PartnerRegistry};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize)]
pub struct CompensationSummary {
    pub total_earnings: Decimal,
    pub wallet_balance: Decimal,
    pub pending_payouts: Decimal,
    pub direct_referral_bonus: Decimal,
    pub team_commission: Decimal,
    pub rank_bonuses: Decimal,
    pub pending_weekly_commissions: Decimal,
}

pub async fn summary(pool: &PgPool, partner_id: i64) -> AppResult<CompensationSummary> {
    let registry = PartnerRegistry::new(pool.clone());
    let partner = registry.get_by_id(partner_id).await?;

    let direct_referral_bonus = ledger::sum_by_kind(pool, partner_id, LedgerKind::DirectReferral).await?;
    let team_commission = ledger::sum_by_kind(pool, partner_id, LedgerKind::TeamCommission).await?;
    let rank_bonuses = ledger::sum_by_kind(pool, partner_id, LedgerKind::RankBonus).await?;
    let pending_payouts = ledger::sum_pending_payouts(pool, partner_id).await?;
    let pending_weekly_commissions = commission_queue::pending_amount_for_partner(pool, partner_id).await?;

    Ok(CompensationSummary {
        total_earnings: partner.total_earnings,
        wallet_balance: partner.wallet_balance,
        pending_payouts,
        direct_referral_bonus,
        team_commission,
        rank_bonuses,
        pending_weekly_commissions,
    })
}
