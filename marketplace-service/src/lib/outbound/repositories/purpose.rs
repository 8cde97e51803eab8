use async_trait::async_trait;
use sqlx::PgPool;

use super::is_unavailable;
use crate::domain::payment::models::PaymentPurpose;
use crate::domain::payment::models::PurposeQuote;
use crate::payment::errors::PaymentError;
use crate::payment::ports::PurposeCatalog;

/// Prices payment purposes from the course and project tables.
///
/// Only published courses can be bought; free courses quote zero. Projects
/// accept any amount.
pub struct PostgresPurposeCatalog {
    pool: PgPool,
}

impl PostgresPurposeCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn catalog_error(err: sqlx::Error) -> PaymentError {
    tracing::error!(error = %err, "Purpose lookup failed");
    if is_unavailable(&err) {
        PaymentError::Unavailable(err.to_string())
    } else {
        PaymentError::DatabaseError(err.to_string())
    }
}

#[async_trait]
impl PurposeCatalog for PostgresPurposeCatalog {
    async fn quote(&self, purpose: PaymentPurpose) -> Result<Option<PurposeQuote>, PaymentError> {
        match purpose {
            PaymentPurpose::Course(id) => {
                let row = sqlx::query_as::<_, (i64, bool)>(
                    "SELECT price, is_free FROM courses WHERE id = $1 AND status = 'published'",
                )
                .bind(id.as_i32())
                .fetch_optional(&self.pool)
                .await
                .map_err(catalog_error)?;

                Ok(row.map(|(price, is_free)| {
                    PurposeQuote::Fixed(if is_free { 0 } else { price })
                }))
            }
            PaymentPurpose::Project(id) => {
                let exists = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM projects WHERE id = $1)",
                )
                .bind(id.as_i32())
                .fetch_one(&self.pool)
                .await
                .map_err(catalog_error)?;

                Ok(exists.then_some(PurposeQuote::Open))
            }
        }
    }
}
