use axum::{
    body::Body,
    extract::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{event, health, inscription, maintenance, member, payment, webhook};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Members (profiles only; credentials live with the identity provider)
        .route("/api/v1/users", post(member::create_member).get(member::list_members))
        .route("/api/v1/users/{user_id}", axum::routing::delete(member::delete_member))

        // Events
        .route("/api/v1/events", post(event::create_event).get(event::list_events))
        .route("/api/v1/events/{event_id}", get(event::get_event).put(event::update_event).delete(event::delete_event))
        .route("/api/v1/events/{event_id}/status", axum::routing::patch(event::transition_event))
        .route("/api/v1/events/{event_id}/close", post(event::close_event))
        .route("/api/v1/events/{event_id}/summary", get(event::event_summary))
        .route("/api/v1/events/{event_id}/categories", post(event::add_category))
        .route("/api/v1/events/{event_id}/categories/{category_id}", axum::routing::delete(event::delete_category))

        // Registration flow
        .route("/api/v1/events/{event_id}/inscriptions", post(inscription::create_inscription).get(inscription::list_inscriptions))
        .route("/api/v1/events/{event_id}/inscriptions/{inscription_id}", get(inscription::get_inscription).delete(inscription::delete_inscription))
        .route("/api/v1/events/{event_id}/inscriptions/{inscription_id}/cancel", post(inscription::cancel_inscription))
        .route("/api/v1/events/{event_id}/inscriptions/{inscription_id}/confirm", post(inscription::confirm_inscription))
        .route("/api/v1/inscriptions/lookup", get(inscription::lookup_by_cpf))
        .route("/api/v1/me/inscriptions", get(inscription::list_my_inscriptions))

        // Payment flow
        .route("/api/v1/events/{event_id}/inscriptions/{inscription_id}/payment", post(payment::create_payment).get(payment::get_payment))
        .route("/api/v1/payments/{payment_id}", get(payment::get_payment_by_id))
        .route("/api/v1/me/payments", get(payment::list_my_payments))

        // Gateway callback
        .route("/api/v1/webhooks/gateway", post(webhook::handle_gateway_webhook))

        // Maintenance (external scheduler trigger)
        .route("/api/v1/maintenance/close-expired", post(maintenance::close_expired_events))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
