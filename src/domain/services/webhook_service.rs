use std::sync::Arc;
use crate::domain::models::payment::parse_gateway_date;
use crate::domain::ports::{InscriptionRepository, PaymentRepository};
use crate::error::AppError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Charge payload as delivered by the gateway webhook.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayment {
    pub id: String,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub payment_date: Option<String>,
    #[serde(default)]
    pub external_reference: Option<String>,
}

/// Structured webhook result. The handler never throws outward; a failure
/// here must not trip the gateway's retry machinery.
#[derive(Debug, Serialize)]
pub struct WebhookOutcome {
    pub success: bool,
    pub message: String,
    pub event_id: Option<String>,
    pub inscription_id: Option<String>,
}

impl WebhookOutcome {
    fn failure(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), event_id: None, inscription_id: None }
    }

    fn ignored(event_name: &str) -> Self {
        Self {
            success: true,
            message: format!("Event {} acknowledged and ignored", event_name),
            event_id: None,
            inscription_id: None,
        }
    }
}

pub struct WebhookService {
    inscription_repo: Arc<dyn InscriptionRepository>,
    payment_repo: Arc<dyn PaymentRepository>,
}

impl WebhookService {
    pub fn new(
        inscription_repo: Arc<dyn InscriptionRepository>,
        payment_repo: Arc<dyn PaymentRepository>,
    ) -> Self {
        Self { inscription_repo, payment_repo }
    }

    /// Stateless per delivery and idempotent: replaying a confirming event
    /// against an already-confirmed inscription is a no-op success.
    pub async fn process(&self, event_name: &str, payment: &WebhookPayment) -> WebhookOutcome {
        if event_name != "PAYMENT_CONFIRMED" && event_name != "PAYMENT_RECEIVED" {
            info!("Webhook event {} ignored", event_name);
            return WebhookOutcome::ignored(event_name);
        }

        match self.apply(event_name, payment).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Webhook processing failed for charge {}: {}", payment.id, e);
                WebhookOutcome::failure(format!("Webhook processing failed: {}", e))
            }
        }
    }

    async fn apply(
        &self,
        event_name: &str,
        payment: &WebhookPayment,
    ) -> Result<WebhookOutcome, AppError> {
        let Some(reference) = payment.external_reference.as_deref() else {
            warn!("Webhook for charge {} has no external reference", payment.id);
            return Ok(WebhookOutcome::failure("Missing external reference"));
        };

        let Some((event_id, inscription_id)) = parse_reference(reference) else {
            warn!("Webhook for charge {} has malformed reference {}", payment.id, reference);
            return Ok(WebhookOutcome::failure("Malformed external reference"));
        };

        let Some(mut inscription) =
            self.inscription_repo.find_by_id(event_id, inscription_id).await?
        else {
            warn!("Webhook reference {} points at no inscription", reference);
            return Ok(WebhookOutcome::failure("Inscription not found"));
        };

        let Some(mut local) = self.payment_repo.find_by_charge_id(&payment.id).await? else {
            warn!("No local payment record for gateway charge {}", payment.id);
            return Ok(WebhookOutcome::failure("No local payment for this charge"));
        };

        let paid_at = parse_gateway_date(payment.payment_date.as_deref())
            .unwrap_or_else(Utc::now);

        // Payment write happens-before the inscription write. A crash in
        // between leaves money confirmed against a pending inscription,
        // which the pull path recovers.
        let transitioned = match event_name {
            "PAYMENT_RECEIVED" if local.status == "PENDING" || local.status == "OVERDUE" => {
                local.mark_as_received(paid_at)?;
                true
            }
            "PAYMENT_CONFIRMED" if local.status != "CONFIRMED" => {
                local.mark_as_confirmed(Some(paid_at))?;
                true
            }
            _ => false,
        };
        if transitioned {
            local = self.payment_repo.update(&local).await?;
        }

        if inscription.is_pending() {
            inscription.confirm(&local.id)?;
            self.inscription_repo.update(&inscription).await?;
            info!(
                "Inscription {} confirmed by webhook event {}",
                inscription.id, event_name
            );
        }

        Ok(WebhookOutcome {
            success: true,
            message: format!("Payment {} processed", local.id),
            event_id: Some(event_id.to_string()),
            inscription_id: Some(inscription_id.to_string()),
        })
    }
}

/// External references carry `<eventId>:<inscriptionId>`.
fn parse_reference(reference: &str) -> Option<(&str, &str)> {
    let (event_id, inscription_id) = reference.split_once(':')?;
    if event_id.is_empty() || inscription_id.is_empty() {
        return None;
    }
    Some((event_id, inscription_id))
}
