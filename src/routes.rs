use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, compensation, health_check, orders, partners};
use crate::state::AppState;

pub fn configure_app(state: AppState) -> Router {
    let allowed_origins: Vec<_> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new().allow_origin(AllowOrigin::list(allowed_origins));

    Router::new()
        .route("/health", get(health_check))
        .route("/partners", post(partners::register))
        .route("/partners/me", get(partners::me))
        .route("/orders", post(orders::create).get(orders::list_mine))
        .route("/orders/:id", get(orders::get_one))
        .route("/orders/:id/status", patch(orders::update_status))
        .route("/compensation/summary", get(compensation::summary))
        .route("/compensation/transactions", get(compensation::transactions))
        .route("/compensation/payout", post(compensation::request_payout))
        .route("/admin/payouts/:id/approve", post(admin::approve_payout))
        .route("/admin/payouts/:id/reject", post(admin::reject_payout))
        .route("/admin/ledger", get(admin::list_ledger))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
