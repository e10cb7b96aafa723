//! Payout Service (C8). Withdrawal requests with minimums, balance
//! enforcement, and a pending/approved/cancelled lifecycle with
//! refund-on-reject (§4.8).

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::models::LedgerEntry;
use crate::services::ledger;
use rust_decimal::Decimal;
use sqlx::PgPool;

/// Requests a withdrawal from the wallet (§4.8, scenario S6).
pub async fn request(
    pool: &PgPool,
    partner_id: i64,
    amount: Decimal,
    config: &AppConfig,
) -> AppResult<LedgerEntry> {
    if amount < config.min_wallet_withdrawal {
        return Err(AppError::MinWithdrawal);
    }

    let mut tx = pool.begin().await?;
    let entry = ledger::record_payout(&mut tx, partner_id, amount).await?;
    tx.commit().await?;

    Ok(entry)
}

/// Approves a pending payout (admin-only, §6). No balance change: the
/// funds were already reserved at request time.
pub async fn approve(pool: &PgPool, entry_id: i64) -> AppResult<LedgerEntry> {
    let mut tx = pool.begin().await?;
    let entry = ledger::approve_payout(&mut tx, entry_id).await?;
    tx.commit().await?;
    Ok(entry)
}

/// Rejects a pending payout and refunds the wallet (admin-only, §6).
pub async fn reject(pool: &PgPool, entry_id: i64) -> AppResult<LedgerEntry> {
    let mut tx = pool.begin().await?;
    let entry = ledger::reject_payout(&mut tx, entry_id).await?;
    tx.commit().await?;
    Ok(entry)
}
