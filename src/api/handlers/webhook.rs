use axum::{extract::State, http::HeaderMap, response::IntoResponse, Json};
use crate::api::dtos::requests::GatewayWebhookRequest;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

/// Gateway callback. Responds 200 with a structured result for anything the
/// service decides; only a bad shared token is rejected outright.
pub async fn handle_gateway_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<GatewayWebhookRequest>,
) -> Result<impl IntoResponse, AppError> {
    let expected = &state.config.gateway_webhook_token;
    if !expected.is_empty() {
        let presented = headers.get("x-gateway-token")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if presented != expected {
            return Err(AppError::Unauthorized);
        }
    }

    info!("Webhook received: {} for charge {}", payload.event, payload.payment.id);

    let outcome = state.webhook_service
        .process(&payload.event, &payload.payment)
        .await;

    Ok(Json(outcome))
}
