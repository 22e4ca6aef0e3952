use axum::{extract::State, response::IntoResponse, Json};
use crate::api::extractors::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

/// Sweep open events past their end date. Fired by an external scheduler;
/// this service keeps no resident timer.
pub async fn close_expired_events(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let closed = state.event_service.close_expired().await?;
    info!("Maintenance sweep closed {} events", closed);
    Ok(Json(serde_json::json!({ "closed": closed })))
}
