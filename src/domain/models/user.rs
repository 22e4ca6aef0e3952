use crate::domain::models::values::{Cpf, Email, PersonName, Phone};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Member profile. Credentials and sessions live in the external identity
/// provider; this record only carries what registration and billing need.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub phone: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: PersonName, email: Email, cpf: Cpf, phone: Phone, role: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.as_str().to_string(),
            email: email.as_str().to_string(),
            cpf: cpf.as_str().to_string(),
            phone: phone.as_str().to_string(),
            role: role.unwrap_or_else(|| "MEMBER".to_string()),
            created_at: Utc::now(),
        }
    }
}
