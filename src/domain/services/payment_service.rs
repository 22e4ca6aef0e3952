use std::sync::Arc;
use crate::domain::models::{
    inscription::Inscription,
    payment::{NewChargeRequest, NewPaymentParams, Payment},
};
use crate::domain::ports::{
    EventRepository, InscriptionRepository, PaymentGateway, PaymentRepository, UserRepository,
};
use crate::error::AppError;
use chrono::{Duration, Utc};
use tracing::info;

const DUE_DATE_OFFSET_DAYS: i64 = 3;

pub struct PaymentService {
    event_repo: Arc<dyn EventRepository>,
    inscription_repo: Arc<dyn InscriptionRepository>,
    payment_repo: Arc<dyn PaymentRepository>,
    user_repo: Arc<dyn UserRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentService {
    pub fn new(
        event_repo: Arc<dyn EventRepository>,
        inscription_repo: Arc<dyn InscriptionRepository>,
        payment_repo: Arc<dyn PaymentRepository>,
        user_repo: Arc<dyn UserRepository>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self { event_repo, inscription_repo, payment_repo, user_repo, gateway }
    }

    /// Idempotent create-or-reconcile. An existing confirmed payment is
    /// returned as-is; an existing unconfirmed one is re-checked against the
    /// gateway (the pull path, for when no webhook has arrived yet); only
    /// when no payment exists is a new gateway charge minted.
    pub async fn create_for_inscription(
        &self,
        event_id: &str,
        inscription_id: &str,
    ) -> Result<Payment, AppError> {
        let mut inscription = self.inscription_repo.find_by_id(event_id, inscription_id).await?
            .ok_or(AppError::NotFound("Inscription not found".into()))?;

        if let Some(existing) = self.payment_repo.find_by_inscription(inscription_id).await? {
            if existing.is_confirmed() {
                return Ok(existing);
            }
            return self.reconcile_with_gateway(existing, &mut inscription).await;
        }

        if inscription.is_cancelled() {
            return Err(AppError::Validation(
                "Cannot create a payment for a cancelled inscription".into(),
            ));
        }
        if inscription.is_cash_payment() {
            return Err(AppError::Validation(
                "Cash inscriptions are confirmed manually by an organizer".into(),
            ));
        }
        if inscription.is_confirmed() {
            return Err(AppError::Validation(
                "Inscription is already confirmed without a gateway charge".into(),
            ));
        }

        self.create_new_charge(event_id, inscription).await
    }

    /// Pull-based reconciliation: the gateway is authoritative for charge
    /// status. Payment state is persisted before the inscription confirm so
    /// a crash in between stays recoverable, never the reverse.
    async fn reconcile_with_gateway(
        &self,
        mut payment: Payment,
        inscription: &mut Inscription,
    ) -> Result<Payment, AppError> {
        let remote = self.gateway.get_payment(&payment.charge_id).await?;

        if remote.is_paid() {
            let paid_at = remote.payment_date.unwrap_or_else(Utc::now);
            match remote.status.as_str() {
                "RECEIVED" => payment.mark_as_received(paid_at)?,
                _ => payment.mark_as_confirmed(Some(paid_at))?,
            }
            payment = self.payment_repo.update(&payment).await?;

            if inscription.is_pending() {
                inscription.confirm(&payment.id)?;
                self.inscription_repo.update(inscription).await?;
            }

            info!("Payment {} reconciled as {} via poll", payment.id, payment.status);
            return Ok(payment);
        }

        if remote.status == "OVERDUE" && payment.status == "PENDING" {
            payment.mark_as_overdue()?;
            payment = self.payment_repo.update(&payment).await?;
        }

        Ok(payment)
    }

    async fn create_new_charge(
        &self,
        event_id: &str,
        mut inscription: Inscription,
    ) -> Result<Payment, AppError> {
        let event = self.event_repo.find_by_id(event_id).await?
            .ok_or(AppError::NotFound("Event not found".into()))?;

        let (name, email, cpf, phone) = self.billing_contact(&inscription).await?;

        let customer_id = self.gateway
            .find_or_create_customer(&name, &email, &cpf, &phone)
            .await?;

        let external_reference = format!("{}:{}", event_id, inscription.id);
        let due_date = Utc::now() + Duration::days(DUE_DATE_OFFSET_DAYS);

        let charge = self.gateway.create_charge(&NewChargeRequest {
            customer_id,
            billing_type: inscription.payment_method.clone(),
            amount_cents: inscription.amount_cents,
            due_date,
            description: format!("Registration for {}", event.title),
            external_reference: external_reference.clone(),
        }).await?;

        let qr = self.gateway.get_pix_qr_code(&charge.id).await?;

        let payment = Payment::new(NewPaymentParams {
            inscription_id: inscription.id.clone(),
            event_id: event_id.to_string(),
            user_id: inscription.user_id.clone(),
            charge_id: charge.id,
            amount_cents: inscription.amount_cents,
            billing_type: inscription.payment_method.clone(),
            pix_payload: Some(qr.payload),
            pix_encoded_image: Some(qr.encoded_image),
            slip_url: charge.slip_url,
            external_reference,
            due_date,
        });

        let created = self.payment_repo.create(&payment).await?;

        inscription.payment_id = Some(created.id.clone());
        inscription.updated_at = Utc::now();
        self.inscription_repo.update(&inscription).await?;

        info!("Payment created for inscription {}: {}", inscription.id, created.id);
        Ok(created)
    }

    async fn billing_contact(
        &self,
        inscription: &Inscription,
    ) -> Result<(String, String, String, String), AppError> {
        if let Some(user_id) = &inscription.user_id {
            let user = self.user_repo.find_by_id(user_id).await?
                .ok_or(AppError::NotFound("User profile not found".into()))?;
            return Ok((user.name, user.email, user.cpf, user.phone));
        }

        // Guest inscriptions always carry full guest data (entity invariant).
        let name = inscription.guest_name.clone().ok_or(AppError::Internal)?;
        let email = inscription.guest_email.clone().ok_or(AppError::Internal)?;
        let phone = inscription.guest_phone.clone().ok_or(AppError::Internal)?;
        Ok((name, email, inscription.cpf.clone(), phone))
    }
}
