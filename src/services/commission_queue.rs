//! Commission Queue (C4). Durable buffer of per-upline commission rows
//! awaiting weekly settlement (§4.4). Rows are append-only; nothing in
//! this module ever deletes a row.

use crate::error::AppResult;
use crate::models::{PendingCommissionGroup, QueuedCommission};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};

/// Enqueues a pending commission row for `partner_id`. A non-positive
/// amount is skipped entirely (§4.4) rather than stored as a zero row.
pub async fn enqueue(
    tx: &mut Transaction<'_, Postgres>,
    partner_id: i64,
    source_order_id: i64,
    level: i32,
    sales_units: i64,
    amount: Decimal,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> AppResult<Option<QueuedCommission>> {
    if amount <= Decimal::ZERO {
        return Ok(None);
    }

    let row = sqlx::query_as::<_, QueuedCommission>(
        r#"
        INSERT INTO queued_commissions
            (partner_id, source_order_id, level, sales_units, amount, window_start, window_end, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
        RETURNING *
        "#,
    )
    .bind(partner_id)
    .bind(source_order_id)
    .bind(level)
    .bind(sales_units)
    .bind(amount)
    .bind(window_start)
    .bind(window_end)
    .fetch_one(&mut **tx)
    .await?;

    Ok(Some(row))
}

/// Groups every pending row by recipient partner (§4.4, §4.7). Run
/// inside the Settler's transaction so the grouping and the later
/// `mark_processed` call see a consistent snapshot.
pub async fn drain_pending_grouped(
    tx: &mut Transaction<'_, Postgres>,
) -> AppResult<Vec<PendingCommissionGroup>> {
    #[derive(sqlx::FromRow)]
    struct Row {
        partner_id: i64,
        total_amount: Decimal,
        total_units: i64,
        row_count: i64,
        row_ids: Vec<i64>,
    }

    let rows = sqlx::query_as::<_, Row>(
        r#"
        SELECT
            partner_id,
            SUM(amount) AS total_amount,
            SUM(sales_units) AS total_units,
            COUNT(*) AS row_count,
            ARRAY_AGG(id ORDER BY id) AS row_ids
        FROM queued_commissions
        WHERE status = 'pending'
        GROUP BY partner_id
        "#,
    )
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| PendingCommissionGroup {
            partner_id: r.partner_id,
            total_amount: r.total_amount,
            total_units: r.total_units,
            row_count: r.row_count,
            row_ids: r.row_ids,
        })
        .collect())
}

/// Marks the given rows processed (§4.4, §4.7). Idempotent: rows
/// already `processed` are left untouched by the `status = 'pending'`
/// guard, so re-running the Settler never double-marks anything.
pub async fn mark_processed(tx: &mut Transaction<'_, Postgres>, row_ids: &[i64]) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE queued_commissions
        SET status = 'processed', processed_at = NOW()
        WHERE id = ANY($1) AND status = 'pending'
        "#,
    )
    .bind(row_ids)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Sum of pending commission amount for one partner (§4.10 /
/// `pending_weekly_commissions`).
pub async fn pending_amount_for_partner(
    pool: &sqlx::PgPool,
    partner_id: i64,
) -> AppResult<Decimal> {
    let total: Option<Decimal> = sqlx::query_scalar(
        "SELECT SUM(amount) FROM queued_commissions WHERE partner_id = $1 AND status = 'pending'",
    )
    .bind(partner_id)
    .fetch_one(pool)
    .await?;

    Ok(total.unwrap_or(Decimal::ZERO))
}
