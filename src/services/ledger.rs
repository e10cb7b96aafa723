//! Ledger (C3). The sole authority for wallet/earnings mutations; every
//! credit or payout passes through here so the wallet-consistency
//! invariant (§8, property 1) has exactly one writer to reason about.

use crate::error::{AppError, AppResult};
use crate::models::{LedgerEntry, LedgerKind, LedgerStatus};
use crate::services::partner_registry;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

/// Writes a credit entry and bumps wallet/earnings in the same
/// statement group. A non-positive amount is a no-op that returns a
/// synthetic zero entry rather than writing a row (§4.3).
pub async fn record_credit(
    tx: &mut Transaction<'_, Postgres>,
    partner_id: i64,
    kind: LedgerKind,
    amount: Decimal,
    description: &str,
    reference_id: Option<i64>,
) -> AppResult<LedgerEntry> {
    if amount <= Decimal::ZERO {
        return Ok(LedgerEntry {
            id: 0,
            partner_id,
            kind: kind.as_str().to_string(),
            amount: Decimal::ZERO,
            description: description.to_string(),
            reference_id,
            status: LedgerStatus::Approved.as_str().to_string(),
            created_at: Utc::now(),
            processed_at: None,
        });
    }

    let entry = sqlx::query_as::<_, LedgerEntry>(
        r#"
        INSERT INTO ledger_entries (partner_id, kind, amount, description, reference_id, status)
        VALUES ($1, $2, $3, $4, $5, 'approved')
        RETURNING *
        "#,
    )
    .bind(partner_id)
    .bind(kind.as_str())
    .bind(amount)
    .bind(description)
    .bind(reference_id)
    .fetch_one(&mut **tx)
    .await?;

    partner_registry::credit(tx, partner_id, amount).await?;

    Ok(entry)
}

/// Records a pending payout: writes a negative-amount entry and
/// reserves the funds by decreasing the wallet balance (§3, §4.8).
/// `amount` must be positive; fails with `InsufficientFunds` if the
/// wallet can't cover it (enforced by `partner_registry::debit`).
pub async fn record_payout(
    tx: &mut Transaction<'_, Postgres>,
    partner_id: i64,
    amount: Decimal,
) -> AppResult<LedgerEntry> {
    if amount <= Decimal::ZERO {
        return Err(AppError::Validation(
            "payout amount must be positive".to_string(),
        ));
    }

    partner_registry::debit(tx, partner_id, amount).await?;

    let entry = sqlx::query_as::<_, LedgerEntry>(
        r#"
        INSERT INTO ledger_entries (partner_id, kind, amount, description, reference_id, status)
        VALUES ($1, 'payout', $2, $3, NULL, 'pending')
        RETURNING *
        "#,
    )
    .bind(partner_id)
    .bind(-amount)
    .bind(format!("payout request for {amount}"))
    .fetch_one(&mut **tx)
    .await?;

    Ok(entry)
}

async fn fetch_payout_for_update(
    tx: &mut Transaction<'_, Postgres>,
    entry_id: i64,
) -> AppResult<LedgerEntry> {
    let entry = sqlx::query_as::<_, LedgerEntry>(
        "SELECT * FROM ledger_entries WHERE id = $1 FOR UPDATE",
    )
    .bind(entry_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("ledger entry {entry_id}")))?;

    if entry.kind != LedgerKind::Payout.as_str() {
        return Err(AppError::Conflict("entry is not a payout".to_string()));
    }
    Ok(entry)
}

/// Approves a pending payout. No balance change: the funds were
/// already reserved at `record_payout` time (§4.8).
pub async fn approve_payout(tx: &mut Transaction<'_, Postgres>, entry_id: i64) -> AppResult<LedgerEntry> {
    let entry = fetch_payout_for_update(tx, entry_id).await?;
    if entry.status != LedgerStatus::Pending.as_str() {
        return Err(AppError::Conflict("payout is already terminal".to_string()));
    }

    let updated = sqlx::query_as::<_, LedgerEntry>(
        r#"
        UPDATE ledger_entries
        SET status = 'approved', processed_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(entry_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(updated)
}

/// Rejects a pending payout and refunds the reserved amount back to
/// the wallet (§4.8, scenario S6). `entry.amount` is stored negative,
/// so refunding means adding back `|amount|`.
pub async fn reject_payout(tx: &mut Transaction<'_, Postgres>, entry_id: i64) -> AppResult<LedgerEntry> {
    let entry = fetch_payout_for_update(tx, entry_id).await?;
    if entry.status != LedgerStatus::Pending.as_str() {
        return Err(AppError::Conflict("payout is already terminal".to_string()));
    }

    sqlx::query("UPDATE partners SET wallet_balance = wallet_balance + $2 WHERE id = $1")
        .bind(entry.partner_id)
        .bind(-entry.amount)
        .execute(&mut **tx)
        .await?;

    let updated = sqlx::query_as::<_, LedgerEntry>(
        r#"
        UPDATE ledger_entries
        SET status = 'cancelled', processed_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(entry_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(updated)
}

/// Sums approved credits for a partner, grouped by kind (§4.10).
pub async fn sum_by_kind(pool: &PgPool, partner_id: i64, kind: LedgerKind) -> AppResult<Decimal> {
    let total: Option<Decimal> = sqlx::query_scalar(
        "SELECT SUM(amount) FROM ledger_entries WHERE partner_id = $1 AND kind = $2 AND status = 'approved'",
    )
    .bind(partner_id)
    .bind(kind.as_str())
    .fetch_one(pool)
    .await?;

    Ok(total.unwrap_or(Decimal::ZERO))
}

pub async fn sum_pending_payouts(pool: &PgPool, partner_id: i64) -> AppResult<Decimal> {
    let total: Option<Decimal> = sqlx::query_scalar(
        "SELECT SUM(-amount) FROM ledger_entries WHERE partner_id = $1 AND kind = 'payout' AND status = 'pending'",
    )
    .bind(partner_id)
    .fetch_one(pool)
    .await?;

    Ok(total.unwrap_or(Decimal::ZERO))
}

/// Most-recent ledger entries for a partner (§4.10).
pub async fn feed(pool: &PgPool, partner_id: i64, limit: i64) -> AppResult<Vec<LedgerEntry>> {
    let entries = sqlx::query_as::<_, LedgerEntry>(
        "SELECT * FROM ledger_entries WHERE partner_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(partner_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}
