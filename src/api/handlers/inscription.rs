use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use crate::api::dtos::requests::{CpfLookupQuery, CreateInscriptionRequest, ListQuery};
use crate::api::extractors::{auth::AuthUser, maybe_auth::MaybeAuthUser};
use crate::domain::models::inscription::GuestData;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

/// Authenticated callers register as themselves; anonymous callers must
/// submit guest data.
pub async fn create_inscription(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(identity): MaybeAuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<CreateInscriptionRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("create_inscription: Starting for event {}", event_id);

    let created = match identity {
        Some(identity) => {
            state.inscription_service.create_for_user(
                &event_id,
                &payload.category_id,
                &identity.id,
                &payload.payment_method,
            ).await?
        }
        None => {
            let guest = payload.guest.ok_or(AppError::Validation(
                "Guest data is required for unauthenticated registration".into(),
            ))?;
            let guest = GuestData::parse(
                &guest.full_name,
                &guest.email,
                &guest.phone,
                &guest.cpf,
                guest.birth_date,
                &guest.gender,
            )?;
            state.inscription_service.create_for_guest(
                &event_id,
                &payload.category_id,
                guest,
                &payload.payment_method,
            ).await?
        }
    };

    Ok(Json(created))
}

pub async fn get_inscription(
    State(state): State<Arc<AppState>>,
    Path((event_id, inscription_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let inscription = state.inscription_repo.find_by_id(&event_id, &inscription_id).await?
        .ok_or(AppError::NotFound("Inscription not found".into()))?;
    Ok(Json(inscription))
}

pub async fn list_inscriptions(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(event_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let inscriptions = state.inscription_repo.list_by_event(
        &event_id,
        query.limit.unwrap_or(100),
        query.offset.unwrap_or(0),
    ).await?;
    Ok(Json(inscriptions))
}

/// The caller's own registrations, any event.
pub async fn list_my_inscriptions(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let inscriptions = state.inscription_repo.find_by_user(&identity.id).await?;
    Ok(Json(inscriptions))
}

/// Recovery path for the duplicate error: find existing registrations by CPF.
pub async fn lookup_by_cpf(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CpfLookupQuery>,
) -> Result<impl IntoResponse, AppError> {
    let inscriptions = state.inscription_service.find_by_cpf(&query.cpf).await?;
    Ok(Json(inscriptions))
}

pub async fn cancel_inscription(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path((event_id, inscription_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let cancelled = state.inscription_service.cancel(&event_id, &inscription_id).await?;
    Ok(Json(cancelled))
}

/// Hard removal, e.g. to let someone re-register after a cancellation.
pub async fn delete_inscription(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path((event_id, inscription_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.inscription_repo.delete(&event_id, &inscription_id).await?;
    info!("Inscription deleted: {}", inscription_id);
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}

/// Organizer override for cash payments collected outside the gateway.
pub async fn confirm_inscription(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path((event_id, inscription_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let confirmed = state.inscription_service
        .confirm_manually(&event_id, &inscription_id, &identity.id)
        .await?;
    Ok(Json(confirmed))
}
