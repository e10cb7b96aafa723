//! The caller-identity auth shim described in §6/§9 of the spec: this
//! crate does not implement session or JWT mechanics, it only trusts
//! and resolves an identity it is handed. A real deployment terminates
//! a proper auth layer in front of this service and forwards the
//! resolved partner id as `X-Partner-Id`.

use crate::error::AppError;
use crate::models::Partner;
use crate::services::partner_registry::PartnerRegistry;
use crate::state::AppState;
use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

pub const PARTNER_ID_HEADER: &str = "x-partner-id";

/// The authenticated caller for a request. Extracting this fails with
/// `Unauthorized` if the header is missing, malformed, or names an
/// unknown partner.
pub struct AuthenticatedPartner(pub Partner);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedPartner
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let header_value = parts
            .headers
            .get(PARTNER_ID_HEADER)
            .ok_or(AppError::Unauthorized)?
            .to_str()
            .map_err(|_| AppError::Unauthorized)?;

        let partner_id: i64 = header_value.parse().map_err(|_| AppError::Unauthorized)?;

        let registry = PartnerRegistry::new(app_state.pool.clone());
        let partner = registry
            .get_by_id(partner_id)
            .await
            .map_err(|_| AppError::Unauthorized)?;

        Ok(AuthenticatedPartner(partner))
    }
}

/// The authenticated caller, additionally required to have `role = admin`
/// (§6, admin endpoints).
pub struct AuthenticatedAdmin(pub Partner);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedPartner(partner) = AuthenticatedPartner::from_request_parts(parts, state).await?;
        if !partner.is_admin() {
            return Err(AppError::Forbidden);
        }
        Ok(AuthenticatedAdmin(partner))
    }
}
