use axum::{extract::{Path, State}, response::IntoResponse, Json};
use crate::api::extractors::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;

/// Create-or-reconcile the payment for an inscription. Safe to call again
/// from a payment-status page: an already-confirmed payment comes back
/// untouched and an unconfirmed one is re-checked against the gateway.
pub async fn create_payment(
    State(state): State<Arc<AppState>>,
    Path((event_id, inscription_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let payment = state.payment_service
        .create_for_inscription(&event_id, &inscription_id)
        .await?;
    Ok(Json(payment))
}

pub async fn get_payment(
    State(state): State<Arc<AppState>>,
    Path((_, inscription_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let payment = state.payment_repo.find_by_inscription(&inscription_id).await?
        .ok_or(AppError::NotFound("No payment for this inscription".into()))?;
    Ok(Json(payment))
}

pub async fn get_payment_by_id(
    State(state): State<Arc<AppState>>,
    Path(payment_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let payment = state.payment_repo.find_by_id(&payment_id).await?
        .ok_or(AppError::NotFound("Payment not found".into()))?;
    Ok(Json(payment))
}

/// The caller's own payments, any event.
pub async fn list_my_payments(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let payments = state.payment_repo.list_by_user(&identity.id).await?;
    Ok(Json(payments))
}
