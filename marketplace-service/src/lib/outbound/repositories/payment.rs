use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;

use super::is_unavailable;
use crate::domain::payment::models::Amount;
use crate::domain::payment::models::PaymentId;
use crate::domain::payment::models::PaymentPurpose;
use crate::domain::payment::models::PaymentReference;
use crate::domain::payment::models::PaymentRequest;
use crate::domain::payment::models::PaymentStatus;
use crate::domain::payment::models::TerminalStatus;
use crate::domain::payment::models::TransitionOutcome;
use crate::domain::payment::ports::PaymentStore;
use crate::domain::user::models::UserId;
use crate::payment::errors::PaymentError;

const PAYMENT_COLUMNS: &str = r#"
    id,
    amount,
    reference,
    qris_string,
    payer_id,
    purpose_type,
    purpose_id,
    status,
    created_at,
    expires_at,
    updated_at,
    event_published_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: String,
    amount: i64,
    reference: String,
    qris_string: String,
    payer_id: Option<i32>,
    purpose_type: Option<String>,
    purpose_id: Option<i32>,
    status: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    event_published_at: Option<DateTime<Utc>>,
}

impl PaymentRow {
    fn into_payment(self) -> Result<PaymentRequest, PaymentError> {
        let purpose = match (self.purpose_type.as_deref(), self.purpose_id) {
            (Some(kind), Some(target)) => PaymentPurpose::from_parts(kind, target),
            _ => None,
        };

        Ok(PaymentRequest {
            id: PaymentId::from_string(&self.id)?,
            amount: Amount::new(self.amount)?,
            reference: PaymentReference::new(self.reference)?,
            qris_string: self.qris_string,
            payer_id: self.payer_id.map(UserId),
            purpose,
            status: self.status.parse::<PaymentStatus>()?,
            created_at: self.created_at,
            expires_at: self.expires_at,
            updated_at: self.updated_at,
            event_published_at: self.event_published_at,
        })
    }
}

fn store_error(err: sqlx::Error) -> PaymentError {
    tracing::error!(error = %err, "Payment query failed");
    if is_unavailable(&err) {
        PaymentError::Unavailable(err.to_string())
    } else {
        PaymentError::DatabaseError(err.to_string())
    }
}

/// Durable payment store.
///
/// Transitions are a single conditional `UPDATE ... WHERE status = 'pending'`,
/// so concurrent writers across processes still see exactly one winner. The
/// owed event is tracked on the same row: a terminal `paid` or `failed` row
/// with a null `event_published_at` is the outbox entry.
pub struct PostgresPaymentStore {
    pool: PgPool,
}

impl PostgresPaymentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentStore for PostgresPaymentStore {
    async fn insert(&self, payment: PaymentRequest) -> Result<PaymentRequest, PaymentError> {
        sqlx::query(
            r#"
            INSERT INTO payment_requests (
                id,
                amount,
                reference,
                qris_string,
                payer_id,
                purpose_type,
                purpose_id,
                status,
                created_at,
                expires_at,
                updated_at,
                event_published_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(payment.id.as_str())
        .bind(payment.amount.value())
        .bind(payment.reference.as_str())
        .bind(&payment.qris_string)
        .bind(payment.payer_id.map(|id| id.as_i32()))
        .bind(payment.purpose.map(|p| p.kind()))
        .bind(payment.purpose.map(|p| p.target_id()))
        .bind(payment.status.as_str())
        .bind(payment.created_at)
        .bind(payment.expires_at)
        .bind(payment.updated_at)
        .bind(payment.event_published_at)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(payment)
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<PaymentRequest>, PaymentError> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payment_requests WHERE id = $1");

        let row = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.map(PaymentRow::into_payment).transpose()
    }

    async fn transition_from_pending(
        &self,
        id: &PaymentId,
        target: TerminalStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<TransitionOutcome>, PaymentError> {
        let sql = format!(
            r#"
            UPDATE payment_requests
            SET status = $2, updated_at = $3
            WHERE id = $1 AND status = 'pending'
            RETURNING {PAYMENT_COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(id.as_str())
            .bind(PaymentStatus::from(target).as_str())
            .bind(at)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        if let Some(row) = updated {
            return Ok(Some(TransitionOutcome::Applied(row.into_payment()?)));
        }

        // Lost the race or never pending: report what is stored now.
        Ok(self
            .find_by_id(id)
            .await?
            .map(TransitionOutcome::AlreadyTerminal))
    }

    async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<Vec<PaymentRequest>, PaymentError> {
        let sql = format!(
            r#"
            UPDATE payment_requests
            SET status = 'expired', updated_at = $1
            WHERE status = 'pending' AND expires_at <= $1
            RETURNING {PAYMENT_COLUMNS}
            "#
        );

        let rows = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        rows.into_iter().map(PaymentRow::into_payment).collect()
    }

    async fn has_paid(
        &self,
        payer: UserId,
        purpose: PaymentPurpose,
        at_least: i64,
    ) -> Result<bool, PaymentError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM payment_requests
                WHERE payer_id = $1
                  AND purpose_type = $2
                  AND purpose_id = $3
                  AND status = 'paid'
                  AND amount >= $4
            )
            "#,
        )
        .bind(payer.as_i32())
        .bind(purpose.kind())
        .bind(purpose.target_id())
        .bind(at_least)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)
    }

    async fn mark_event_published(
        &self,
        id: &PaymentId,
        at: DateTime<Utc>,
    ) -> Result<(), PaymentError> {
        sqlx::query(
            r#"
            UPDATE payment_requests
            SET event_published_at = $2
            WHERE id = $1 AND event_published_at IS NULL
            "#,
        )
        .bind(id.as_str())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(())
    }

    async fn find_undelivered(&self, limit: i64) -> Result<Vec<PaymentRequest>, PaymentError> {
        let sql = format!(
            r#"
            SELECT {PAYMENT_COLUMNS}
            FROM payment_requests
            WHERE status IN ('paid', 'failed') AND event_published_at IS NULL
            ORDER BY updated_at
            LIMIT $1
            "#
        );

        let rows = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        rows.into_iter().map(PaymentRow::into_payment).collect()
    }
}
