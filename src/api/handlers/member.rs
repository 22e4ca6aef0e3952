use axum::{extract::{Path, State}, response::IntoResponse, Json};
use crate::api::dtos::requests::CreateMemberRequest;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::user::User;
use crate::domain::models::values::{Cpf, Email, PersonName, Phone};
use crate::error::{AppError, FieldError};
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

pub async fn create_member(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(payload): Json<CreateMemberRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut errors: Vec<FieldError> = Vec::new();

    let name = PersonName::parse(&payload.name).map_err(|message| {
        errors.push(FieldError { field: "name".to_string(), message });
    });
    let email = Email::parse(&payload.email).map_err(|message| {
        errors.push(FieldError { field: "email".to_string(), message });
    });
    let cpf = Cpf::parse(&payload.cpf).map_err(|message| {
        errors.push(FieldError { field: "cpf".to_string(), message });
    });
    let phone = Phone::parse(&payload.phone).map_err(|message| {
        errors.push(FieldError { field: "phone".to_string(), message });
    });

    if !errors.is_empty() {
        return Err(AppError::ValidationDetails(errors));
    }

    let member = User::new(
        name.unwrap(),
        email.unwrap(),
        cpf.unwrap(),
        phone.unwrap(),
        payload.role,
    );

    let created = state.user_repo.create(&member).await?;
    info!("Member created: {}", created.id);
    Ok(Json(created))
}

pub async fn list_members(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let members = state.user_repo.list().await?;
    Ok(Json(members))
}

pub async fn delete_member(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.user_repo.delete(&user_id).await?;
    Ok(Json(serde_json::json!({ "status": "deleted" })))
}
