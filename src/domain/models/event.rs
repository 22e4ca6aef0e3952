use crate::domain::models::values::Money;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Registration category with a fixed price in cents. A price of zero is a
/// legal "free category". Categories only exist under a persisted event.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct EventCategory {
    pub id: String,
    pub event_id: String,
    pub name: String,
    pub price_cents: i64,
    pub description: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl EventCategory {
    pub fn new(
        event_id: String,
        name: String,
        price: Money,
        description: Option<String>,
        sort_order: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            name,
            price_cents: price.cents(),
            description,
            sort_order,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub status: String,
    pub payment_methods: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub categories: Vec<EventCategory>,
}

pub struct NewEventParams {
    pub title: String,
    pub subtitle: Option<String>,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub payment_methods: Vec<String>,
}

pub struct EventUpdate {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub payment_methods: Option<Vec<String>>,
}

impl Event {
    pub fn new(params: NewEventParams) -> Result<Self, AppError> {
        for method in &params.payment_methods {
            if method != "PIX" && method != "CASH" {
                return Err(AppError::Validation(format!(
                    "Unknown payment method: {}", method
                )));
            }
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            title: params.title,
            subtitle: params.subtitle,
            description: params.description,
            location: params.location,
            starts_at: params.starts_at,
            ends_at: params.ends_at,
            status: "DRAFT".to_string(),
            payment_methods: Json(params.payment_methods),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            categories: Vec::new(),
        })
    }

    pub fn apply_update(&mut self, update: EventUpdate) -> Result<(), AppError> {
        if let Some(title) = update.title { self.title = title; }
        if let Some(subtitle) = update.subtitle { self.subtitle = Some(subtitle); }
        if let Some(description) = update.description { self.description = description; }
        if let Some(location) = update.location { self.location = location; }
        if let Some(starts_at) = update.starts_at { self.starts_at = starts_at; }
        if let Some(ends_at) = update.ends_at { self.ends_at = Some(ends_at); }
        if let Some(methods) = update.payment_methods {
            for method in &methods {
                if method != "PIX" && method != "CASH" {
                    return Err(AppError::Validation(format!(
                        "Unknown payment method: {}", method
                    )));
                }
            }
            self.payment_methods = Json(methods);
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Only an OPEN event can be closed out; the result is ENDED.
    pub fn close(&mut self) -> Result<(), AppError> {
        if self.status != "OPEN" {
            return Err(AppError::Validation(format!(
                "Cannot close event in status {}", self.status
            )));
        }
        self.status = "ENDED".to_string();
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.status == "OPEN"
    }

    pub fn accepts_payment_method(&self, method: &str) -> bool {
        self.payment_methods.0.iter().any(|m| m == method)
    }

    /// Pure predicate; the sweep itself belongs to the maintenance batch.
    pub fn should_auto_close(&self, now: DateTime<Utc>) -> bool {
        self.status == "OPEN" && now > self.ends_at.unwrap_or(self.starts_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_event() -> Event {
        Event::new(NewEventParams {
            title: "Winter Retreat".to_string(),
            subtitle: None,
            description: "Annual retreat".to_string(),
            location: "Campos do Jordao".to_string(),
            starts_at: Utc::now() + Duration::days(10),
            ends_at: Some(Utc::now() + Duration::days(12)),
            payment_methods: vec!["PIX".to_string(), "CASH".to_string()],
        })
        .unwrap()
    }

    #[test]
    fn test_new_event_starts_draft() {
        let event = sample_event();
        assert_eq!(event.status, "DRAFT");
        assert!(!event.is_open());
    }

    #[test]
    fn test_rejects_unknown_payment_method() {
        let result = Event::new(NewEventParams {
            title: "X".to_string(),
            subtitle: None,
            description: "Y".to_string(),
            location: "Z".to_string(),
            starts_at: Utc::now(),
            ends_at: None,
            payment_methods: vec!["CARD".to_string()],
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_close_requires_open() {
        let mut event = sample_event();
        assert!(event.close().is_err());

        event.status = "OPEN".to_string();
        event.close().unwrap();
        assert_eq!(event.status, "ENDED");

        assert!(event.close().is_err());
    }

    #[test]
    fn test_accepts_payment_method() {
        let event = sample_event();
        assert!(event.accepts_payment_method("PIX"));
        assert!(!event.accepts_payment_method("CARD"));
    }

    #[test]
    fn test_should_auto_close_uses_end_then_start() {
        let mut event = sample_event();
        event.status = "OPEN".to_string();
        assert!(!event.should_auto_close(Utc::now()));

        assert!(event.should_auto_close(Utc::now() + Duration::days(13)));

        event.ends_at = None;
        assert!(event.should_auto_close(Utc::now() + Duration::days(11)));

        event.status = "ENDED".to_string();
        assert!(!event.should_auto_close(Utc::now() + Duration::days(13)));
    }
}
