use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{FromRow, MySqlPool};

use crate::core::{AppError, Result};
use crate::modules::products::models::{Product, Uom};

/// Read-only lookups of products and units of measure
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Find a product by ID, including its default tax ids
    async fn find_product(&self, id: i64) -> Result<Option<Product>>;

    /// Find a unit of measure by ID
    async fn find_uom(&self, id: i64) -> Result<Option<Uom>>;
}

pub struct MySqlProductRepository {
    pool: MySqlPool,
}

impl MySqlProductRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for MySqlProductRepository {
    async fn find_product(&self, id: i64) -> Result<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, price, cost, uom_id
            FROM products
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch product: {}", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let tax_ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT pt.tax_id
            FROM product_taxes pt
            JOIN taxes t ON t.id = pt.tax_id
            WHERE pt.product_id = ?
            ORDER BY t.sort ASC, t.id ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch product taxes: {}", e)))?;

        Ok(Some(row.into_product(tax_ids)))
    }

    async fn find_uom(&self, id: i64) -> Result<Option<Uom>> {
        sqlx::query_as::<_, Uom>(
            r#"
            SELECT id, name, category_id, factor
            FROM uoms
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch unit of measure: {}", e)))
    }
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    price: Decimal,
    cost: Option<Decimal>,
    uom_id: Option<i64>,
}

impl ProductRow {
    fn into_product(self, tax_ids: Vec<i64>) -> Product {
        Product {
            id: self.id,
            name: self.name,
            price: self.price,
            cost: self.cost,
            uom_id: self.uom_id,
            tax_ids,
        }
    }
}
