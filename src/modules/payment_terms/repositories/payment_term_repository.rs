use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::payment_terms::models::PaymentTerm;

#[async_trait]
pub trait PaymentTermRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<PaymentTerm>>;
}

pub struct MySqlPaymentTermRepository {
    pool: MySqlPool,
}

impl MySqlPaymentTermRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentTermRepository for MySqlPaymentTermRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<PaymentTerm>> {
        let row = sqlx::query_as::<_, (i64, String, Option<u32>)>(
            r#"
            SELECT id, name, due_nb_days
            FROM payment_terms
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch payment term: {}", e)))?;

        Ok(row.map(|(id, name, nb_days)| PaymentTerm::new(id, name, nb_days)))
    }
}
