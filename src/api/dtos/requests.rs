use crate::domain::services::webhook_service::WebhookPayment;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub price_cents: i64,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub subtitle: Option<String>,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub payment_methods: Vec<String>,
    #[serde(default)]
    pub categories: Vec<CreateCategoryRequest>,
}

#[derive(Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub payment_methods: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct TransitionEventRequest {
    pub status: String,
}

#[derive(Deserialize)]
pub struct GuestPayload {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub cpf: String,
    pub birth_date: NaiveDate,
    pub gender: String,
}

#[derive(Deserialize)]
pub struct CreateInscriptionRequest {
    pub category_id: String,
    pub payment_method: String,
    pub guest: Option<GuestPayload>,
}

#[derive(Deserialize)]
pub struct CpfLookupQuery {
    pub cpf: String,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateMemberRequest {
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub phone: String,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct GatewayWebhookRequest {
    pub event: String,
    pub payment: WebhookPayment,
}
