use axum::extract::{Query, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::auth::AuthenticatedPartner;
use crate::error::AppResult;
use crate::models::LedgerEntry;
use crate::services::ledger;
use crate::services::query::{self, CompensationSummary};
use crate::state::AppState;

pub async fn summary(
    AuthenticatedPartner(partner): AuthenticatedPartner,
    State(state): State<AppState>,
) -> AppResult<Json<CompensationSummary>> {
    let summary = query::summary(&state.pool, partner.id).await?;
    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<i64>,
}

pub async fn transactions(
    AuthenticatedPartner(partner): AuthenticatedPartner,
    State(state): State<AppState>,
    Query(params): Query<FeedQuery>,
) -> AppResult<Json<Vec<LedgerEntry>>> {
    let limit = params.limit.unwrap_or(50);
    let entries = ledger::feed(&state.pool, partner.id, limit).await?;
    Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
pub struct PayoutRequest {
    pub amount: Decimal,
}

pub async fn request_payout(
    AuthenticatedPartner(partner): AuthenticatedPartner,
    State(state): State<AppState>,
    Json(payload): Json<PayoutRequest>,
) -> AppResult<Json<LedgerEntry>> {
    let entry = crate::services::payout::request(&state.pool, partner.id, payload.amount, &state.config).await?;
    Ok(Json(entry))
}
