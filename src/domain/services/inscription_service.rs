use std::sync::Arc;
use crate::domain::models::{
    event::Event,
    inscription::{GuestData, Inscription, NewInscriptionParams},
    values::{Cpf, Money},
};
use crate::domain::ports::{EventRepository, InscriptionRepository, UserRepository};
use crate::error::AppError;
use tracing::info;

pub struct InscriptionService {
    event_repo: Arc<dyn EventRepository>,
    inscription_repo: Arc<dyn InscriptionRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl InscriptionService {
    pub fn new(
        event_repo: Arc<dyn EventRepository>,
        inscription_repo: Arc<dyn InscriptionRepository>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        Self { event_repo, inscription_repo, user_repo }
    }

    /// Event must be open, the category must belong to it and the preferred
    /// payment method must be accepted. Returns the category price snapshot.
    async fn check_event_gates(
        &self,
        event_id: &str,
        category_id: &str,
        payment_method: &str,
    ) -> Result<(Event, Money), AppError> {
        let event = self.event_repo.find_by_id(event_id).await?
            .ok_or(AppError::NotFound("Event not found".into()))?;

        if !event.is_open() {
            return Err(AppError::EventNotOpen(format!(
                "Event {} is not open for registration", event.title
            )));
        }
        if !event.accepts_payment_method(payment_method) {
            return Err(AppError::Validation(format!(
                "Event does not accept payment method {}", payment_method
            )));
        }

        let category = self.event_repo.find_category(event_id, category_id).await?
            .ok_or(AppError::NotFound("Category not found for this event".into()))?;

        let price = Money::from_cents(category.price_cents)
            .map_err(AppError::InternalWithMsg)?;

        Ok((event, price))
    }

    /// Pre-check against existing registrations. Advisory only: the unique
    /// index on (event_id, cpf) is the authoritative gate under races.
    async fn check_duplicates(
        &self,
        event_id: &str,
        user_id: Option<&str>,
        cpf: &Cpf,
    ) -> Result<(), AppError> {
        if let Some(user_id) = user_id
            && self.inscription_repo.find_by_event_and_user(event_id, user_id).await?.is_some()
        {
            return Err(AppError::DuplicateInscription(
                "You already have a registration for this event".into(),
            ));
        }

        if self.inscription_repo.find_by_event_and_cpf(event_id, cpf.as_str()).await?.is_some() {
            return Err(AppError::DuplicateInscription(
                "A registration with this CPF already exists for this event".into(),
            ));
        }

        // A guest CPF that belongs to a registered member blocks the guest
        // path too: one person, one event, one registration.
        if user_id.is_none()
            && let Some(user) = self.user_repo.find_by_cpf(cpf.as_str()).await?
            && self.inscription_repo.find_by_event_and_user(event_id, &user.id).await?.is_some()
        {
            return Err(AppError::DuplicateInscription(
                "A registered member with this CPF already has a registration for this event".into(),
            ));
        }

        Ok(())
    }

    pub async fn create_for_user(
        &self,
        event_id: &str,
        category_id: &str,
        user_id: &str,
        payment_method: &str,
    ) -> Result<Inscription, AppError> {
        let (_, price) = self.check_event_gates(event_id, category_id, payment_method).await?;

        let user = self.user_repo.find_by_id(user_id).await?
            .ok_or(AppError::NotFound("User profile not found".into()))?;
        let cpf = Cpf::parse(&user.cpf).map_err(AppError::InternalWithMsg)?;

        self.check_duplicates(event_id, Some(user_id), &cpf).await?;

        let inscription = Inscription::new(NewInscriptionParams {
            event_id: event_id.to_string(),
            category_id: category_id.to_string(),
            user: Some((user.id.clone(), cpf)),
            guest: None,
            amount: price,
            payment_method: payment_method.to_string(),
        })?;

        let created = self.inscription_repo.create(&inscription).await?;
        info!("Inscription created for user {}: {}", user.id, created.id);
        Ok(created)
    }

    pub async fn create_for_guest(
        &self,
        event_id: &str,
        category_id: &str,
        guest: GuestData,
        payment_method: &str,
    ) -> Result<Inscription, AppError> {
        let (_, price) = self.check_event_gates(event_id, category_id, payment_method).await?;

        self.check_duplicates(event_id, None, &guest.cpf).await?;

        let inscription = Inscription::new(NewInscriptionParams {
            event_id: event_id.to_string(),
            category_id: category_id.to_string(),
            user: None,
            guest: Some(guest),
            amount: price,
            payment_method: payment_method.to_string(),
        })?;

        let created = self.inscription_repo.create(&inscription).await?;
        info!("Guest inscription created: {}", created.id);
        Ok(created)
    }

    /// Recovery path: find existing registrations by tax id, any event.
    pub async fn find_by_cpf(&self, raw_cpf: &str) -> Result<Vec<Inscription>, AppError> {
        let cpf = Cpf::parse(raw_cpf).map_err(AppError::Validation)?;
        self.inscription_repo.find_by_cpf(cpf.as_str()).await
    }

    pub async fn cancel(&self, event_id: &str, inscription_id: &str) -> Result<Inscription, AppError> {
        let mut inscription = self.inscription_repo.find_by_id(event_id, inscription_id).await?
            .ok_or(AppError::NotFound("Inscription not found".into()))?;

        inscription.cancel()?;
        let updated = self.inscription_repo.update(&inscription).await?;
        info!("Inscription cancelled: {}", updated.id);
        Ok(updated)
    }

    pub async fn confirm_manually(
        &self,
        event_id: &str,
        inscription_id: &str,
        actor_id: &str,
    ) -> Result<Inscription, AppError> {
        let mut inscription = self.inscription_repo.find_by_id(event_id, inscription_id).await?
            .ok_or(AppError::NotFound("Inscription not found".into()))?;

        inscription.confirm_manually(actor_id)?;
        let updated = self.inscription_repo.update(&inscription).await?;
        info!("Inscription manually confirmed by {}: {}", actor_id, updated.id);
        Ok(updated)
    }
}
