use std::sync::Arc;
use crate::config::Config;
use crate::domain::ports::{
    EventRepository, InscriptionRepository, PaymentGateway, PaymentRepository, UserRepository,
};
use crate::domain::services::{
    event_service::EventService, inscription_service::InscriptionService,
    payment_service::PaymentService, webhook_service::WebhookService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub event_repo: Arc<dyn EventRepository>,
    pub inscription_repo: Arc<dyn InscriptionRepository>,
    pub payment_repo: Arc<dyn PaymentRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub event_service: Arc<EventService>,
    pub inscription_service: Arc<InscriptionService>,
    pub payment_service: Arc<PaymentService>,
    pub webhook_service: Arc<WebhookService>,
}

impl AppState {
    pub fn build(
        config: Config,
        event_repo: Arc<dyn EventRepository>,
        inscription_repo: Arc<dyn InscriptionRepository>,
        payment_repo: Arc<dyn PaymentRepository>,
        user_repo: Arc<dyn UserRepository>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let event_service = Arc::new(EventService::new(event_repo.clone()));
        let inscription_service = Arc::new(InscriptionService::new(
            event_repo.clone(),
            inscription_repo.clone(),
            user_repo.clone(),
        ));
        let payment_service = Arc::new(PaymentService::new(
            event_repo.clone(),
            inscription_repo.clone(),
            payment_repo.clone(),
            user_repo.clone(),
            gateway.clone(),
        ));
        let webhook_service = Arc::new(WebhookService::new(
            inscription_repo.clone(),
            payment_repo.clone(),
        ));

        Self {
            config,
            event_repo,
            inscription_repo,
            payment_repo,
            user_repo,
            gateway,
            event_service,
            inscription_service,
            payment_service,
            webhook_service,
        }
    }
}
