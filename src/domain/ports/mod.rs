use crate::domain::models::{
    event::{Event, EventCategory},
    inscription::Inscription,
    payment::{GatewayCharge, GatewayPaymentStatus, NewChargeRequest, Payment, PixQrCode},
    user::User,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<Event, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError>;
    async fn list(&self, status: Option<&str>, limit: i64, offset: i64) -> Result<Vec<Event>, AppError>;
    async fn find_expired_open(&self, now: DateTime<Utc>) -> Result<Vec<Event>, AppError>;
    async fn update(&self, event: &Event) -> Result<Event, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;

    async fn add_category(&self, category: &EventCategory) -> Result<EventCategory, AppError>;
    async fn list_categories(&self, event_id: &str) -> Result<Vec<EventCategory>, AppError>;
    async fn find_category(&self, event_id: &str, category_id: &str) -> Result<Option<EventCategory>, AppError>;
    async fn delete_category(&self, event_id: &str, category_id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait InscriptionRepository: Send + Sync {
    async fn create(&self, inscription: &Inscription) -> Result<Inscription, AppError>;
    async fn find_by_id(&self, event_id: &str, id: &str) -> Result<Option<Inscription>, AppError>;
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Inscription>, AppError>;
    async fn list_by_event(&self, event_id: &str, limit: i64, offset: i64) -> Result<Vec<Inscription>, AppError>;
    async fn find_by_event_and_user(&self, event_id: &str, user_id: &str) -> Result<Option<Inscription>, AppError>;
    async fn find_by_event_and_cpf(&self, event_id: &str, cpf: &str) -> Result<Option<Inscription>, AppError>;
    async fn find_by_cpf(&self, cpf: &str) -> Result<Vec<Inscription>, AppError>;
    async fn update(&self, inscription: &Inscription) -> Result<Inscription, AppError>;
    async fn delete(&self, event_id: &str, id: &str) -> Result<(), AppError>;
    async fn count_by_status(&self, event_id: &str, status: &str) -> Result<i64, AppError>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: &Payment) -> Result<Payment, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>, AppError>;
    async fn find_by_charge_id(&self, charge_id: &str) -> Result<Option<Payment>, AppError>;
    async fn find_by_inscription(&self, inscription_id: &str) -> Result<Option<Payment>, AppError>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Payment>, AppError>;
    async fn update(&self, payment: &Payment) -> Result<Payment, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn sum_confirmed_by_event(&self, event_id: &str) -> Result<i64, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<User>, AppError>;
    async fn list(&self) -> Result<Vec<User>, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

/// External payment provider. Creates charges, serves PIX QR codes and
/// reports authoritative charge status.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn find_or_create_customer(&self, name: &str, email: &str, cpf: &str, phone: &str) -> Result<String, AppError>;
    async fn create_charge(&self, request: &NewChargeRequest) -> Result<GatewayCharge, AppError>;
    async fn get_pix_qr_code(&self, charge_id: &str) -> Result<PixQrCode, AppError>;
    async fn get_payment(&self, charge_id: &str) -> Result<GatewayPaymentStatus, AppError>;
}
