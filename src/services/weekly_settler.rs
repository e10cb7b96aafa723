//! Weekly Settler (C7). Aggregates pending commission rows into one
//! `team_commission` ledger credit per partner, idempotently (§4.7,
//! scenario S5, invariants 5 and 7 in §8).

use crate::error::AppResult;
use crate::models::LedgerKind;
use crate::services::{commission_queue, ledger};
use rust_decimal::Decimal;
use sqlx::PgPool;

#[derive(Debug, Default, Clone, Copy)]
pub struct SettlementStats {
    pub partners_processed: u64,
    pub total_credited: Decimal,
}

/// Runs one settlement pass. Safe to call repeatedly: a partner with no
/// pending rows contributes nothing, and `mark_processed` only touches
/// rows still `pending`, so a second consecutive run is a no-op
/// (invariant 7, §8).
pub async fn run_once(pool: &PgPool) -> AppResult<SettlementStats> {
    let mut tx = pool.begin().await?;

    let groups = commission_queue::drain_pending_grouped(&mut tx).await?;

    let mut stats = SettlementStats::default();

    for group in &groups {
        if group.total_amount <= Decimal::ZERO {
            continue;
        }

        ledger::record_credit(
            &mut tx,
            group.partner_id,
            LedgerKind::TeamCommission,
            group.total_amount,
            &format!(
                "Weekly team commission: {} units, {} commission(s)",
                group.total_units, group.row_count
            ),
            None,
        )
        .await?;

        commission_queue::mark_processed(&mut tx, &group.row_ids).await?;

        stats.partners_processed += 1;
        stats.total_credited += group.total_amount;
    }

    tx.commit().await?;

    Ok(stats)
}
