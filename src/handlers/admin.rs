use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::auth::AuthenticatedAdmin;
use crate::error::AppResult;
use crate::models::LedgerEntry;
use crate::services::payout;
use crate::state::AppState;

pub async fn approve_payout(
    AuthenticatedAdmin(_admin): AuthenticatedAdmin,
    State(state): State<AppState>,
    Path(entry_id): Path<i64>,
) -> AppResult<Json<LedgerEntry>> {
    let entry = payout::approve(&state.pool, entry_id).await?;
    Ok(Json(entry))
}

pub async fn reject_payout(
    AuthenticatedAdmin(_admin): AuthenticatedAdmin,
    State(state): State<AppState>,
    Path(entry_id): Path<i64>,
) -> AppResult<Json<LedgerEntry>> {
    let entry = payout::reject(&state.pool, entry_id).await?;
    Ok(Json(entry))
}

#[derive(Debug, Deserialize)]
pub struct LedgerListQuery {
    pub limit: Option<i64>,
}

pub async fn list_ledger(
    AuthenticatedAdmin(_admin): AuthenticatedAdmin,
    State(state): State<AppState>,
    Query(params): Query<LedgerListQuery>,
) -> AppResult<Json<Vec<LedgerEntry>>> {
    let limit = params.limit.unwrap_or(100);
    let entries = sqlx::query_as::<_, LedgerEntry>(
        "SELECT * FROM ledger_entries ORDER BY created_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(&state.pool)
    .await
    .map_err(crate::error::AppError::from)?;
    Ok(Json(entries))
}
