use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{FromRow, MySql, MySqlPool, QueryBuilder};

use crate::core::{AppError, Result};
use crate::modules::taxes::models::{Tax, TaxGroup, TaxUse};

/// Repository for tax lookups
///
/// Every method returning several taxes orders them by `sort` then `id`,
/// which is the order the tax sequence of a line is applied in.
#[async_trait]
pub trait TaxRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Tax>>;

    /// Taxes among `ids` that exist, ordered by sort. Unknown ids are skipped;
    /// callers decide whether a gap is an error.
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Tax>>;

    /// All taxes, optionally restricted to one usage
    async fn list(&self, type_tax_use: Option<TaxUse>) -> Result<Vec<Tax>>;

    async fn find_group(&self, id: i64) -> Result<Option<TaxGroup>>;
}

/// Resolve `ids` to taxes, failing on the first id that does not exist
pub async fn resolve_taxes(repo: &dyn TaxRepository, ids: &[i64]) -> Result<Vec<Tax>> {
    let taxes = repo.find_by_ids(ids).await?;

    if let Some(missing) = ids.iter().find(|id| !taxes.iter().any(|t| t.id == **id)) {
        return Err(AppError::missing_reference(format!("Tax {} does not exist", missing)));
    }

    Ok(taxes)
}

pub struct MySqlTaxRepository {
    pool: MySqlPool,
}

impl MySqlTaxRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const TAX_COLUMNS: &str = "SELECT id, name, amount, amount_type, sort, is_base_affected, \
     include_base_amount, tax_group_id, type_tax_use FROM taxes";

#[async_trait]
impl TaxRepository for MySqlTaxRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Tax>> {
        let row = sqlx::query_as::<_, TaxRow>(&format!("{} WHERE id = ?", TAX_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch tax: {}", e)))?;

        row.map(Tax::try_from).transpose()
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Tax>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let mut builder: QueryBuilder<MySql> = QueryBuilder::new(TAX_COLUMNS);
        builder.push(" WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY sort ASC, id ASC");

        let rows = builder
            .build_query_as::<TaxRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch taxes: {}", e)))?;

        rows.into_iter().map(Tax::try_from).collect()
    }

    async fn list(&self, type_tax_use: Option<TaxUse>) -> Result<Vec<Tax>> {
        let rows = match type_tax_use {
            Some(usage) => {
                sqlx::query_as::<_, TaxRow>(&format!(
                    "{} WHERE type_tax_use = ? ORDER BY sort ASC, id ASC",
                    TAX_COLUMNS
                ))
                .bind(usage.to_string())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, TaxRow>(&format!("{} ORDER BY sort ASC, id ASC", TAX_COLUMNS))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| AppError::Internal(format!("Failed to list taxes: {}", e)))?;

        rows.into_iter().map(Tax::try_from).collect()
    }

    async fn find_group(&self, id: i64) -> Result<Option<TaxGroup>> {
        let row = sqlx::query_as::<_, (i64, String, i32)>(
            r#"
            SELECT id, name, sequence
            FROM tax_groups
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch tax group: {}", e)))?;

        Ok(row.map(|(id, name, sequence)| TaxGroup { id, name, sequence }))
    }
}

// Helper struct for database mapping

#[derive(Debug, FromRow)]
struct TaxRow {
    id: i64,
    name: String,
    amount: Decimal,
    amount_type: String,
    sort: i32,
    is_base_affected: bool,
    include_base_amount: bool,
    tax_group_id: Option<i64>,
    type_tax_use: String,
}

impl TryFrom<TaxRow> for Tax {
    type Error = AppError;

    fn try_from(row: TaxRow) -> Result<Self> {
        Ok(Tax {
            id: row.id,
            name: row.name,
            amount: row.amount,
            amount_type: row
                .amount_type
                .parse()
                .map_err(|e| AppError::Internal(format!("Invalid tax in database: {}", e)))?,
            sort: row.sort,
            is_base_affected: row.is_base_affected,
            include_base_amount: row.include_base_amount,
            tax_group_id: row.tax_group_id,
            type_tax_use: row
                .type_tax_use
                .parse()
                .map_err(|e| AppError::Internal(format!("Invalid tax in database: {}", e)))?,
        })
    }
}
