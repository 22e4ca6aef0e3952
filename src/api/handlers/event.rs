use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use crate::api::dtos::requests::{
    CreateCategoryRequest, CreateEventRequest, ListQuery, TransitionEventRequest,
    UpdateEventRequest,
};
use crate::api::dtos::responses::EventSummaryResponse;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::event::{Event, EventCategory, EventUpdate, NewEventParams};
use crate::domain::models::values::Money;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(payload): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut event = Event::new(NewEventParams {
        title: payload.title,
        subtitle: payload.subtitle,
        description: payload.description,
        location: payload.location,
        starts_at: payload.starts_at,
        ends_at: payload.ends_at,
        payment_methods: payload.payment_methods,
    })?;

    for (i, category) in payload.categories.into_iter().enumerate() {
        event.categories.push(build_category(&event.id, category, i as i32)?);
    }

    let created = state.event_repo.create(&event).await?;
    info!("Event created: {}", created.id);
    Ok(Json(created))
}

fn build_category(
    event_id: &str,
    payload: CreateCategoryRequest,
    position: i32,
) -> Result<EventCategory, AppError> {
    let price = Money::from_cents(payload.price_cents).map_err(AppError::Validation)?;
    Ok(EventCategory::new(
        event_id.to_string(),
        payload.name,
        price,
        payload.description,
        payload.sort_order.unwrap_or(position),
    ))
}

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let events = state.event_repo.list(
        query.status.as_deref(),
        query.limit.unwrap_or(50),
        query.offset.unwrap_or(0),
    ).await?;
    Ok(Json(events))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_id(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    Ok(Json(event))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut event = state.event_repo.find_by_id(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    event.apply_update(EventUpdate {
        title: payload.title,
        subtitle: payload.subtitle,
        description: payload.description,
        location: payload.location,
        starts_at: payload.starts_at,
        ends_at: payload.ends_at,
        payment_methods: payload.payment_methods,
    })?;

    let updated = state.event_repo.update(&event).await?;
    info!("Event updated: {}", updated.id);
    Ok(Json(updated))
}

pub async fn transition_event(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<TransitionEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.event_service.transition(&event_id, &payload.status).await?;
    Ok(Json(updated))
}

pub async fn close_event(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut event = state.event_repo.find_by_id(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    event.close()?;
    let updated = state.event_repo.update(&event).await?;
    info!("Event closed: {}", updated.id);
    Ok(Json(updated))
}

pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.event_repo.delete(&event_id).await?;
    info!("Event deleted: {}", event_id);
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}

pub async fn add_category(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    // Categories only exist under a persisted event.
    let event = state.event_repo.find_by_id(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    let position = event.categories.len() as i32;
    let category = build_category(&event.id, payload, position)?;
    let created = state.event_repo.add_category(&category).await?;
    Ok(Json(created))
}

pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path((event_id, category_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.event_repo.delete_category(&event_id, &category_id).await?;
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}

pub async fn event_summary(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_id(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    let pending = state.inscription_repo.count_by_status(&event.id, "PENDING").await?;
    let confirmed = state.inscription_repo.count_by_status(&event.id, "CONFIRMED").await?;
    let cancelled = state.inscription_repo.count_by_status(&event.id, "CANCELLED").await?;
    let revenue_cents = state.payment_repo.sum_confirmed_by_event(&event.id).await?;
    let revenue = Money::from_cents(revenue_cents).map_err(AppError::InternalWithMsg)?;

    Ok(Json(EventSummaryResponse {
        event_id: event.id,
        pending,
        confirmed,
        cancelled,
        confirmed_revenue_cents: revenue_cents,
        confirmed_revenue: revenue.format_brl(),
    }))
}
