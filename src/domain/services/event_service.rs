use std::sync::Arc;
use crate::domain::models::event::Event;
use crate::domain::ports::EventRepository;
use crate::error::AppError;
use chrono::Utc;
use tracing::info;

/// Guarded lifecycle transitions. ENDED and CANCELLED are terminal.
fn allowed_transitions(status: &str) -> &'static [&'static str] {
    match status {
        "DRAFT" => &["OPEN", "CANCELLED"],
        "OPEN" => &["CLOSED", "ENDED", "CANCELLED"],
        "CLOSED" => &["OPEN", "ENDED", "CANCELLED"],
        _ => &[],
    }
}

pub struct EventService {
    event_repo: Arc<dyn EventRepository>,
}

impl EventService {
    pub fn new(event_repo: Arc<dyn EventRepository>) -> Self {
        Self { event_repo }
    }

    pub async fn transition(&self, event_id: &str, new_status: &str) -> Result<Event, AppError> {
        let mut event = self.event_repo.find_by_id(event_id).await?
            .ok_or(AppError::NotFound("Event not found".into()))?;

        if !allowed_transitions(&event.status).contains(&new_status) {
            return Err(AppError::Validation(format!(
                "Illegal event transition {} -> {}", event.status, new_status
            )));
        }

        event.status = new_status.to_string();
        event.updated_at = Utc::now();
        let updated = self.event_repo.update(&event).await?;
        info!("Event {} moved to {}", updated.id, updated.status);
        Ok(updated)
    }

    /// Batch sweep over open events whose end (or start, when no end is set)
    /// has passed. Triggered by an external scheduler hitting the
    /// maintenance endpoint; there is no resident timer in this service.
    pub async fn close_expired(&self) -> Result<usize, AppError> {
        let now = Utc::now();
        let expired = self.event_repo.find_expired_open(now).await?;
        let mut closed = 0;

        for mut event in expired {
            if !event.should_auto_close(now) {
                continue;
            }
            event.close()?;
            self.event_repo.update(&event).await?;
            info!("Event auto-closed: {}", event.id);
            closed += 1;
        }

        Ok(closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        assert!(allowed_transitions("DRAFT").contains(&"OPEN"));
        assert!(allowed_transitions("DRAFT").contains(&"CANCELLED"));
        assert!(!allowed_transitions("DRAFT").contains(&"ENDED"));

        assert!(allowed_transitions("OPEN").contains(&"CLOSED"));
        assert!(allowed_transitions("OPEN").contains(&"ENDED"));
        assert!(!allowed_transitions("OPEN").contains(&"DRAFT"));

        assert!(allowed_transitions("CLOSED").contains(&"OPEN"));

        assert!(allowed_transitions("ENDED").is_empty());
        assert!(allowed_transitions("CANCELLED").is_empty());
    }
}
