use crate::domain::{models::payment::Payment, ports::PaymentRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

pub struct SqlitePaymentRepo {
    pool: SqlitePool,
}

impl SqlitePaymentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepo {
    async fn create(&self, payment: &Payment) -> Result<Payment, AppError> {
        sqlx::query_as::<_, Payment>(
            "INSERT INTO payments (id, inscription_id, event_id, user_id, charge_id, amount_cents, billing_type, status, pix_payload, pix_encoded_image, slip_url, external_reference, due_date, paid_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&payment.id).bind(&payment.inscription_id).bind(&payment.event_id)
            .bind(&payment.user_id).bind(&payment.charge_id).bind(payment.amount_cents)
            .bind(&payment.billing_type).bind(&payment.status).bind(&payment.pix_payload)
            .bind(&payment.pix_encoded_image).bind(&payment.slip_url).bind(&payment.external_reference)
            .bind(payment.due_date).bind(payment.paid_at).bind(payment.created_at).bind(payment.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>, AppError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_charge_id(&self, charge_id: &str) -> Result<Option<Payment>, AppError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE charge_id = ?")
            .bind(charge_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_inscription(&self, inscription_id: &str) -> Result<Option<Payment>, AppError> {
        sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE inscription_id = ? ORDER BY created_at DESC LIMIT 1"
        )
            .bind(inscription_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Payment>, AppError> {
        sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE user_id = ? ORDER BY created_at DESC"
        )
            .bind(user_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, payment: &Payment) -> Result<Payment, AppError> {
        sqlx::query_as::<_, Payment>(
            "UPDATE payments SET status=?, paid_at=?, pix_payload=?, pix_encoded_image=?, slip_url=?, updated_at=?
             WHERE id=?
             RETURNING *"
        )
            .bind(&payment.status).bind(payment.paid_at).bind(&payment.pix_payload)
            .bind(&payment.pix_encoded_image).bind(&payment.slip_url).bind(payment.updated_at)
            .bind(&payment.id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM payments WHERE id = ?")
            .bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Payment not found".into()));
        }
        Ok(())
    }

    async fn sum_confirmed_by_event(&self, event_id: &str) -> Result<i64, AppError> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(amount_cents), 0) as total FROM payments
             WHERE event_id = ? AND status IN ('RECEIVED', 'CONFIRMED')"
        )
            .bind(event_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(row.get::<i64, _>("total"))
    }
}
