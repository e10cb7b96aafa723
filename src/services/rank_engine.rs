//! Rank Engine (C6). Checks thresholds after each purchase, awards one
//! rank step at a time, assigns insurance once per rank (§4.6).
//!
//! The legacy per-level simplified rate function from the original
//! source is deliberately absent: the tiered/queued path is the only
//! one wired into Order Ingest (§9, Open Question).

use crate::config::RankThresholds;
use crate::error::AppResult;
use crate::models::{LedgerKind, Partner};
use crate::services::{ledger, partner_registry};
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};
use std::str::FromStr;

use crate::domain::Rank;

/// Evaluates the buyer's rank after a purchase and, if they qualify
/// for the next rank, awards exactly one step: a `rank_bonus` credit
/// and, if the rank carries one, a fresh `InsuranceAssignment` (§4.6,
/// scenario S4). Never promotes more than one step per call.
pub async fn apply(
    tx: &mut Transaction<'_, Postgres>,
    buyer: &Partner,
    thresholds: &RankThresholds,
) -> AppResult<()> {
    let current_rank = Rank::from_str(&buyer.rank).unwrap_or(Rank::Starter);
    let Some(next_rank) = current_rank.next() else {
        return Ok(());
    };
    let Some((required_units, bonus, insurance)) = next_rank.requirements(thresholds) else {
        return Ok(());
    };

    let total_sales = buyer.total_sales_units();
    if total_sales < required_units {
        return Ok(());
    }

    partner_registry::set_rank(tx, buyer.id, next_rank.as_str()).await?;

    ledger::record_credit(
        tx,
        buyer.id,
        LedgerKind::RankBonus,
        bonus,
        &format!("Rank advancement bonus - {next_rank}"),
        None,
    )
    .await?;

    if insurance > Decimal::ZERO {
        sqlx::query(
            r#"
            INSERT INTO insurance_assignments (partner_id, rank, amount, status)
            VALUES ($1, $2, $3, 'active')
            "#,
        )
        .bind(buyer.id)
        .bind(next_rank.as_str())
        .bind(insurance)
        .execute(&mut **tx)
        .await?;

        partner_registry::set_insurance(tx, buyer.id, insurance).await?;
    }

    Ok(())
}
