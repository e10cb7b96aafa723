use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::auth::AuthenticatedPartner;
use crate::error::{AppError, AppResult};
use crate::models::{Order, OrderCreate};
use crate::services::order_ingest;
use crate::state::AppState;

pub async fn create(
    AuthenticatedPartner(partner): AuthenticatedPartner,
    State(state): State<AppState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<Order>> {
    let order = order_ingest::create_order(&state.pool, partner.id, payload, &state.config).await?;
    Ok(Json(order))
}

pub async fn list_mine(
    AuthenticatedPartner(partner): AuthenticatedPartner,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = order_ingest::list_orders_for_partner(&state.pool, partner.id).await?;
    Ok(Json(orders))
}

pub async fn get_one(
    AuthenticatedPartner(partner): AuthenticatedPartner,
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> AppResult<Json<Order>> {
    let order = order_ingest::get_order(&state.pool, order_id).await?;
    if order.buyer_partner_id != partner.id && !partner.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateQuery {
    pub new_status: String,
}

pub async fn update_status(
    AuthenticatedPartner(partner): AuthenticatedPartner,
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
    Query(query): Query<StatusUpdateQuery>,
) -> AppResult<Json<Order>> {
    let order = order_ingest::get_order(&state.pool, order_id).await?;
    if order.buyer_partner_id != partner.id && !partner.is_admin() {
        return Err(AppError::Forbidden);
    }

    let updated = order_ingest::update_status(&state.pool, order_id, &query.new_status).await?;
    Ok(Json(updated))
}
