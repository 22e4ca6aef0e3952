use crate::domain::{models::event::{Event, EventCategory}, ports::EventRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn hydrate(&self, mut event: Event) -> Result<Event, AppError> {
        event.categories = self.list_categories(&event.id).await?;
        Ok(event)
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepo {
    async fn create(&self, event: &Event) -> Result<Event, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let mut created = sqlx::query_as::<_, Event>(
            "INSERT INTO events (id, title, subtitle, description, location, starts_at, ends_at, status, payment_methods, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING *"
        )
            .bind(&event.id).bind(&event.title).bind(&event.subtitle).bind(&event.description)
            .bind(&event.location).bind(event.starts_at).bind(event.ends_at).bind(&event.status)
            .bind(&event.payment_methods).bind(event.created_at).bind(event.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        for category in &event.categories {
            let saved = sqlx::query_as::<_, EventCategory>(
                "INSERT INTO event_categories (id, event_id, name, price_cents, description, sort_order, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 RETURNING *"
            )
                .bind(&category.id).bind(&created.id).bind(&category.name).bind(category.price_cents)
                .bind(&category.description).bind(category.sort_order).bind(category.created_at)
                .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
            created.categories.push(saved);
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)?;
        match event {
            Some(event) => Ok(Some(self.hydrate(event).await?)),
            None => Ok(None),
        }
    }

    async fn list(&self, status: Option<&str>, limit: i64, offset: i64) -> Result<Vec<Event>, AppError> {
        let events = match status {
            Some(status) => sqlx::query_as::<_, Event>(
                "SELECT * FROM events WHERE status = $1 ORDER BY starts_at ASC LIMIT $2 OFFSET $3"
            )
                .bind(status).bind(limit).bind(offset)
                .fetch_all(&self.pool).await.map_err(AppError::Database)?,
            None => sqlx::query_as::<_, Event>(
                "SELECT * FROM events ORDER BY starts_at ASC LIMIT $1 OFFSET $2"
            )
                .bind(limit).bind(offset)
                .fetch_all(&self.pool).await.map_err(AppError::Database)?,
        };

        let mut hydrated = Vec::with_capacity(events.len());
        for event in events {
            hydrated.push(self.hydrate(event).await?);
        }
        Ok(hydrated)
    }

    async fn find_expired_open(&self, now: DateTime<Utc>) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE status = 'OPEN' AND COALESCE(ends_at, starts_at) < $1"
        )
            .bind(now)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, event: &Event) -> Result<Event, AppError> {
        let updated = sqlx::query_as::<_, Event>(
            "UPDATE events SET title=$1, subtitle=$2, description=$3, location=$4, starts_at=$5, ends_at=$6, status=$7, payment_methods=$8, updated_at=$9
             WHERE id=$10
             RETURNING *"
        )
            .bind(&event.title).bind(&event.subtitle).bind(&event.description).bind(&event.location)
            .bind(event.starts_at).bind(event.ends_at).bind(&event.status).bind(&event.payment_methods)
            .bind(event.updated_at).bind(&event.id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        self.hydrate(updated).await
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".into()));
        }
        Ok(())
    }

    async fn add_category(&self, category: &EventCategory) -> Result<EventCategory, AppError> {
        sqlx::query_as::<_, EventCategory>(
            "INSERT INTO event_categories (id, event_id, name, price_cents, description, sort_order, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *"
        )
            .bind(&category.id).bind(&category.event_id).bind(&category.name).bind(category.price_cents)
            .bind(&category.description).bind(category.sort_order).bind(category.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_categories(&self, event_id: &str) -> Result<Vec<EventCategory>, AppError> {
        sqlx::query_as::<_, EventCategory>(
            "SELECT * FROM event_categories WHERE event_id = $1 ORDER BY sort_order ASC, created_at ASC"
        )
            .bind(event_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_category(&self, event_id: &str, category_id: &str) -> Result<Option<EventCategory>, AppError> {
        sqlx::query_as::<_, EventCategory>(
            "SELECT * FROM event_categories WHERE event_id = $1 AND id = $2"
        )
            .bind(event_id).bind(category_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete_category(&self, event_id: &str, category_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM event_categories WHERE event_id = $1 AND id = $2")
            .bind(event_id).bind(category_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category not found".into()));
        }
        Ok(())
    }
}
