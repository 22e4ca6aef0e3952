use crate::domain::{models::inscription::Inscription, ports::InscriptionRepository};
use crate::error::{is_unique_violation, AppError};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

pub struct SqliteInscriptionRepo {
    pool: SqlitePool,
}

impl SqliteInscriptionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InscriptionRepository for SqliteInscriptionRepo {
    async fn create(&self, inscription: &Inscription) -> Result<Inscription, AppError> {
        sqlx::query_as::<_, Inscription>(
            "INSERT INTO inscriptions (id, event_id, category_id, user_id, guest_name, guest_email, guest_phone, guest_cpf, guest_birth_date, guest_gender, cpf, amount_cents, payment_method, status, payment_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&inscription.id).bind(&inscription.event_id).bind(&inscription.category_id)
            .bind(&inscription.user_id).bind(&inscription.guest_name).bind(&inscription.guest_email)
            .bind(&inscription.guest_phone).bind(&inscription.guest_cpf).bind(inscription.guest_birth_date)
            .bind(&inscription.guest_gender).bind(&inscription.cpf).bind(inscription.amount_cents)
            .bind(&inscription.payment_method).bind(&inscription.status).bind(&inscription.payment_id)
            .bind(inscription.created_at).bind(inscription.updated_at)
            .fetch_one(&self.pool).await
            .map_err(|e| {
                // The unique index on (event_id, cpf) is the authoritative
                // duplicate signal; pre-checks in the service are advisory.
                if is_unique_violation(&e) {
                    AppError::DuplicateInscription(
                        "A registration with this CPF already exists for this event".into(),
                    )
                } else {
                    AppError::Database(e)
                }
            })
    }

    async fn find_by_id(&self, event_id: &str, id: &str) -> Result<Option<Inscription>, AppError> {
        sqlx::query_as::<_, Inscription>("SELECT * FROM inscriptions WHERE event_id = ? AND id = ?")
            .bind(event_id).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Inscription>, AppError> {
        sqlx::query_as::<_, Inscription>(
            "SELECT * FROM inscriptions WHERE user_id = ? ORDER BY created_at DESC"
        )
            .bind(user_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_event(&self, event_id: &str, limit: i64, offset: i64) -> Result<Vec<Inscription>, AppError> {
        sqlx::query_as::<_, Inscription>(
            "SELECT * FROM inscriptions WHERE event_id = ? ORDER BY created_at ASC LIMIT ? OFFSET ?"
        )
            .bind(event_id).bind(limit).bind(offset)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_event_and_user(&self, event_id: &str, user_id: &str) -> Result<Option<Inscription>, AppError> {
        sqlx::query_as::<_, Inscription>(
            "SELECT * FROM inscriptions WHERE event_id = ? AND user_id = ?"
        )
            .bind(event_id).bind(user_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_event_and_cpf(&self, event_id: &str, cpf: &str) -> Result<Option<Inscription>, AppError> {
        sqlx::query_as::<_, Inscription>(
            "SELECT * FROM inscriptions WHERE event_id = ? AND cpf = ?"
        )
            .bind(event_id).bind(cpf)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_cpf(&self, cpf: &str) -> Result<Vec<Inscription>, AppError> {
        sqlx::query_as::<_, Inscription>(
            "SELECT * FROM inscriptions WHERE cpf = ? ORDER BY created_at DESC"
        )
            .bind(cpf)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, inscription: &Inscription) -> Result<Inscription, AppError> {
        sqlx::query_as::<_, Inscription>(
            "UPDATE inscriptions SET status=?, payment_id=?, updated_at=?
             WHERE id=? AND event_id=?
             RETURNING *"
        )
            .bind(&inscription.status).bind(&inscription.payment_id).bind(inscription.updated_at)
            .bind(&inscription.id).bind(&inscription.event_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, event_id: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM inscriptions WHERE event_id = ? AND id = ?")
            .bind(event_id).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Inscription not found".into()));
        }
        Ok(())
    }

    async fn count_by_status(&self, event_id: &str, status: &str) -> Result<i64, AppError> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM inscriptions WHERE event_id = ? AND status = ?"
        )
            .bind(event_id).bind(status)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(row.get::<i64, _>("count"))
    }
}
