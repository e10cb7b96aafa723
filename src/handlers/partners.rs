use axum::extract::State;
use axum::Json;

use crate::auth::AuthenticatedPartner;
use crate::error::AppResult;
use crate::models::{Partner, PartnerRegistration};
use crate::services::partner_registry::PartnerRegistry;
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<PartnerRegistration>,
) -> AppResult<Json<Partner>> {
    let registry = PartnerRegistry::new(state.pool.clone());
    let partner = registry
        .create(
            &payload.full_name,
            &payload.email,
            payload.referrer_code.as_deref(),
        )
        .await?;
    Ok(Json(partner))
}

pub async fn me(AuthenticatedPartner(partner): AuthenticatedPartner) -> Json<Partner> {
    Json(partner)
}
