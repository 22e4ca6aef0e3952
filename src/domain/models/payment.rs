use crate::error::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Local mirror of one gateway charge against an inscription. The status
/// vocabulary is the gateway's; transitions are forward-only and keyed to
/// gateway-reported events, never invented locally.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Payment {
    pub id: String,
    pub inscription_id: String,
    pub event_id: String,
    pub user_id: Option<String>,
    pub charge_id: String,
    pub amount_cents: i64,
    pub billing_type: String,
    pub status: String,
    pub pix_payload: Option<String>,
    pub pix_encoded_image: Option<String>,
    pub slip_url: Option<String>,
    pub external_reference: String,
    pub due_date: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewPaymentParams {
    pub inscription_id: String,
    pub event_id: String,
    pub user_id: Option<String>,
    pub charge_id: String,
    pub amount_cents: i64,
    pub billing_type: String,
    pub pix_payload: Option<String>,
    pub pix_encoded_image: Option<String>,
    pub slip_url: Option<String>,
    pub external_reference: String,
    pub due_date: DateTime<Utc>,
}

impl Payment {
    pub fn new(params: NewPaymentParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            inscription_id: params.inscription_id,
            event_id: params.event_id,
            user_id: params.user_id,
            charge_id: params.charge_id,
            amount_cents: params.amount_cents,
            billing_type: params.billing_type,
            status: "PENDING".to_string(),
            pix_payload: params.pix_payload,
            pix_encoded_image: params.pix_encoded_image,
            slip_url: params.slip_url,
            external_reference: params.external_reference,
            due_date: params.due_date,
            paid_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn transition(&mut self, to: &str, allowed_from: &[&str]) -> Result<(), AppError> {
        if !allowed_from.contains(&self.status.as_str()) {
            return Err(AppError::Validation(format!(
                "Cannot move payment from {} to {}", self.status, to
            )));
        }
        self.status = to.to_string();
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn mark_as_received(&mut self, paid_at: DateTime<Utc>) -> Result<(), AppError> {
        self.transition("RECEIVED", &["PENDING", "OVERDUE"])?;
        self.paid_at = Some(paid_at);
        Ok(())
    }

    pub fn mark_as_confirmed(&mut self, paid_at: Option<DateTime<Utc>>) -> Result<(), AppError> {
        self.transition("CONFIRMED", &["PENDING", "RECEIVED", "OVERDUE"])?;
        if let Some(paid_at) = paid_at {
            self.paid_at = Some(paid_at);
        }
        Ok(())
    }

    pub fn mark_as_overdue(&mut self) -> Result<(), AppError> {
        self.transition("OVERDUE", &["PENDING"])
    }

    pub fn mark_as_refunded(&mut self) -> Result<(), AppError> {
        self.transition("REFUNDED", &["RECEIVED", "CONFIRMED"])
    }

    pub fn mark_as_cancelled(&mut self) -> Result<(), AppError> {
        self.transition("CANCELLED", &["PENDING", "OVERDUE"])
    }

    /// The gateway uses RECEIVED and CONFIRMED as near-synonyms for "money
    /// arrived"; both unlock the registration.
    pub fn is_confirmed(&self) -> bool {
        self.status == "CONFIRMED" || self.status == "RECEIVED"
    }
}

/// Gateway timestamps arrive either as RFC 3339 or as a plain date.
pub fn parse_gateway_date(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

// Boundary value types for the gateway port.

#[derive(Debug, Clone)]
pub struct NewChargeRequest {
    pub customer_id: String,
    pub billing_type: String,
    pub amount_cents: i64,
    pub due_date: DateTime<Utc>,
    pub description: String,
    pub external_reference: String,
}

#[derive(Debug, Clone)]
pub struct GatewayCharge {
    pub id: String,
    pub status: String,
    pub slip_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PixQrCode {
    pub payload: String,
    pub encoded_image: String,
}

#[derive(Debug, Clone)]
pub struct GatewayPaymentStatus {
    pub status: String,
    pub payment_date: Option<DateTime<Utc>>,
}

impl GatewayPaymentStatus {
    pub fn is_paid(&self) -> bool {
        self.status == "CONFIRMED" || self.status == "RECEIVED"
    }
}
