// MoveRepository: storage of account moves and their lines.
//
// MySQL implementation notes:
// - line taxes live in `account_move_line_taxes`, read back in tax sort order
// - every multi-row write runs in one transaction
// - `apply_aggregation` locks the move row (FOR UPDATE) before writing

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, MySql, MySqlPool, Transaction};

use crate::core::{AppError, Result};
use crate::modules::moves::models::{
    AccountMove, AggregationPlan, DisplayType, MoveLine, MoveState, MoveTotals,
};

#[async_trait]
pub trait MoveRepository: Send + Sync {
    /// Store a new move and all of its lines in one write. Ids are assigned
    /// here and line sorts kept; the returned move carries its id.
    async fn create(&self, account_move: &AccountMove, lines: &[MoveLine]) -> Result<AccountMove>;

    async fn find_by_id(&self, id: i64) -> Result<Option<AccountMove>>;

    /// Most recent first
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<AccountMove>>;

    /// Every line of a move ordered by (sort, id)
    async fn find_lines(&self, move_id: i64) -> Result<Vec<MoveLine>>;

    async fn find_lines_by_display_type(
        &self,
        move_id: i64,
        display_type: DisplayType,
    ) -> Result<Vec<MoveLine>>;

    /// Set the move state and its lines' `parent_state`
    async fn update_state(&self, move_id: i64, state: MoveState) -> Result<()>;

    /// Number of moves whose name starts with `prefix`
    async fn count_by_name_prefix(&self, prefix: &str) -> Result<i64>;

    /// Next free number of the `prefix` sequence, starting at 1
    async fn next_sequence_number(&self, prefix: &str) -> Result<i64> {
        Ok(self.count_by_name_prefix(prefix).await? + 1)
    }

    /// Apply every write of an aggregation pass, all or nothing. Product
    /// lines with `id` 0 are inserted.
    async fn apply_aggregation(&self, plan: &AggregationPlan) -> Result<()>;
}

pub struct MySqlMoveRepository {
    pool: MySqlPool,
}

impl MySqlMoveRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> Result<Transaction<'_, MySql>> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to start transaction: {}", e)))
    }

    async fn commit(tx: Transaction<'_, MySql>) -> Result<()> {
        tx.commit()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to commit transaction: {}", e)))
    }

    async fn lock_move(tx: &mut Transaction<'_, MySql>, move_id: i64) -> Result<()> {
        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM account_moves WHERE id = ? FOR UPDATE")
                .bind(move_id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to lock move: {}", e)))?;

        match locked {
            Some(_) => Ok(()),
            None => Err(AppError::not_found(format!("Move {} not found", move_id))),
        }
    }

    async fn insert_line(tx: &mut Transaction<'_, MySql>, line: &MoveLine) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO account_move_lines (
                move_id, move_name, name, display_type, sort,
                product_id, uom_id, quantity, product_uom_qty, price_unit, discount, discount_date,
                price_subtotal, price_tax, price_total,
                tax_line_id, tax_group_id, tax_base_amount,
                debit, credit, balance, amount_currency, amount_residual, amount_residual_currency,
                date_maturity, date, currency_id, company_id, partner_id, parent_state, creator_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(line.move_id)
        .bind(&line.move_name)
        .bind(&line.name)
        .bind(line.display_type.to_string())
        .bind(line.sort)
        .bind(line.product_id)
        .bind(line.uom_id)
        .bind(line.quantity)
        .bind(line.product_uom_qty)
        .bind(line.price_unit)
        .bind(line.discount)
        .bind(line.discount_date)
        .bind(line.price_subtotal)
        .bind(line.price_tax)
        .bind(line.price_total)
        .bind(line.tax_line_id)
        .bind(line.tax_group_id)
        .bind(line.tax_base_amount)
        .bind(line.debit)
        .bind(line.credit)
        .bind(line.balance)
        .bind(line.amount_currency)
        .bind(line.amount_residual)
        .bind(line.amount_residual_currency)
        .bind(line.date_maturity)
        .bind(line.date)
        .bind(line.currency_id)
        .bind(line.company_id)
        .bind(line.partner_id)
        .bind(line.parent_state.to_string())
        .bind(line.creator_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create move line: {}", e)))?;

        let id = result.last_insert_id() as i64;
        Self::write_line_taxes(tx, id, &line.tax_ids).await?;

        Ok(id)
    }

    async fn update_line(tx: &mut Transaction<'_, MySql>, line: &MoveLine) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE account_move_lines SET
                move_name = ?, name = ?, sort = ?,
                product_id = ?, uom_id = ?, quantity = ?, product_uom_qty = ?, price_unit = ?,
                discount = ?, discount_date = ?,
                price_subtotal = ?, price_tax = ?, price_total = ?,
                tax_line_id = ?, tax_group_id = ?, tax_base_amount = ?,
                debit = ?, credit = ?, balance = ?, amount_currency = ?,
                amount_residual = ?, amount_residual_currency = ?,
                date_maturity = ?, currency_id = ?, company_id = ?, partner_id = ?, parent_state = ?
            WHERE id = ? AND move_id = ?
            "#,
        )
        .bind(&line.move_name)
        .bind(&line.name)
        .bind(line.sort)
        .bind(line.product_id)
        .bind(line.uom_id)
        .bind(line.quantity)
        .bind(line.product_uom_qty)
        .bind(line.price_unit)
        .bind(line.discount)
        .bind(line.discount_date)
        .bind(line.price_subtotal)
        .bind(line.price_tax)
        .bind(line.price_total)
        .bind(line.tax_line_id)
        .bind(line.tax_group_id)
        .bind(line.tax_base_amount)
        .bind(line.debit)
        .bind(line.credit)
        .bind(line.balance)
        .bind(line.amount_currency)
        .bind(line.amount_residual)
        .bind(line.amount_residual_currency)
        .bind(line.date_maturity)
        .bind(line.currency_id)
        .bind(line.company_id)
        .bind(line.partner_id)
        .bind(line.parent_state.to_string())
        .bind(line.id)
        .bind(line.move_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to update move line: {}", e)))?;

        if result.rows_affected() == 0 {
            // MySQL reports 0 for unchanged rows too; tell them apart
            let exists: Option<i64> = sqlx::query_scalar(
                "SELECT id FROM account_move_lines WHERE id = ? AND move_id = ?",
            )
            .bind(line.id)
            .bind(line.move_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to check move line: {}", e)))?;

            if exists.is_none() {
                return Err(AppError::not_found(format!(
                    "Line {} of move {} not found",
                    line.id, line.move_id
                )));
            }
        }

        Self::write_line_taxes(tx, line.id, &line.tax_ids).await
    }

    async fn delete_line(tx: &mut Transaction<'_, MySql>, move_id: i64, line_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM account_move_line_taxes WHERE move_line_id = ?")
            .bind(line_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete line taxes: {}", e)))?;

        sqlx::query("DELETE FROM account_move_lines WHERE id = ? AND move_id = ?")
            .bind(line_id)
            .bind(move_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete move line: {}", e)))?;

        Ok(())
    }

    async fn write_line_taxes(
        tx: &mut Transaction<'_, MySql>,
        line_id: i64,
        tax_ids: &[i64],
    ) -> Result<()> {
        sqlx::query("DELETE FROM account_move_line_taxes WHERE move_line_id = ?")
            .bind(line_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to clear line taxes: {}", e)))?;

        for tax_id in tax_ids {
            sqlx::query("INSERT INTO account_move_line_taxes (move_line_id, tax_id) VALUES (?, ?)")
                .bind(line_id)
                .bind(tax_id)
                .execute(&mut **tx)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to attach line tax: {}", e)))?;
        }

        Ok(())
    }

    async fn fetch_lines(&self, move_id: i64, display_type: Option<DisplayType>) -> Result<Vec<MoveLine>> {
        let rows = match display_type {
            Some(display_type) => {
                sqlx::query_as::<_, LineRow>(&format!(
                    "{} WHERE move_id = ? AND display_type = ? ORDER BY sort ASC, id ASC",
                    LINE_COLUMNS
                ))
                .bind(move_id)
                .bind(display_type.to_string())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, LineRow>(&format!(
                    "{} WHERE move_id = ? ORDER BY sort ASC, id ASC",
                    LINE_COLUMNS
                ))
                .bind(move_id)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| AppError::Internal(format!("Failed to fetch move lines: {}", e)))?;

        // Dangling tax ids are kept so aggregation can report them
        let tax_rows = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT lt.move_line_id, lt.tax_id
            FROM account_move_line_taxes lt
            JOIN account_move_lines l ON l.id = lt.move_line_id
            LEFT JOIN taxes t ON t.id = lt.tax_id
            WHERE l.move_id = ?
            ORDER BY COALESCE(t.sort, 0) ASC, lt.tax_id ASC
            "#,
        )
        .bind(move_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch line taxes: {}", e)))?;

        let mut taxes_by_line: HashMap<i64, Vec<i64>> = HashMap::new();
        for (line_id, tax_id) in tax_rows {
            taxes_by_line.entry(line_id).or_default().push(tax_id);
        }

        rows.into_iter()
            .map(|row| {
                let tax_ids = taxes_by_line.remove(&row.id).unwrap_or_default();
                row.into_line(tax_ids)
            })
            .collect()
    }
}

const MOVE_COLUMNS: &str = "SELECT id, name, move_type, state, payment_state, partner_id, reference, \
     invoice_origin, invoice_date, invoice_date_due, date, invoice_payment_term_id, currency_id, \
     company_id, creator_id, amount_untaxed, amount_tax, amount_total, amount_residual, \
     amount_untaxed_signed, amount_untaxed_in_currency_signed, amount_tax_signed, \
     amount_total_signed, amount_total_in_currency_signed, amount_residual_signed, \
     created_at, updated_at FROM account_moves";

const LINE_COLUMNS: &str = "SELECT id, move_id, move_name, name, display_type, sort, product_id, \
     uom_id, quantity, product_uom_qty, price_unit, discount, discount_date, price_subtotal, \
     price_tax, price_total, tax_line_id, tax_group_id, tax_base_amount, debit, credit, balance, \
     amount_currency, amount_residual, amount_residual_currency, date_maturity, date, \
     currency_id, company_id, partner_id, parent_state, creator_id FROM account_move_lines";

#[async_trait]
impl MoveRepository for MySqlMoveRepository {
    async fn create(&self, account_move: &AccountMove, lines: &[MoveLine]) -> Result<AccountMove> {
        let mut tx = self.begin().await?;
        let totals = &account_move.totals;

        let result = sqlx::query(
            r#"
            INSERT INTO account_moves (
                name, move_type, state, payment_state, partner_id, reference, invoice_origin,
                invoice_date, invoice_date_due, date, invoice_payment_term_id,
                currency_id, company_id, creator_id,
                amount_untaxed, amount_tax, amount_total, amount_residual,
                amount_untaxed_signed, amount_untaxed_in_currency_signed, amount_tax_signed,
                amount_total_signed, amount_total_in_currency_signed, amount_residual_signed,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account_move.name)
        .bind(account_move.move_type.to_string())
        .bind(account_move.state.to_string())
        .bind(account_move.payment_state.to_string())
        .bind(account_move.partner_id)
        .bind(&account_move.reference)
        .bind(&account_move.invoice_origin)
        .bind(account_move.invoice_date)
        .bind(account_move.invoice_date_due)
        .bind(account_move.date)
        .bind(account_move.invoice_payment_term_id)
        .bind(account_move.currency_id)
        .bind(account_move.company_id)
        .bind(account_move.creator_id)
        .bind(totals.amount_untaxed)
        .bind(totals.amount_tax)
        .bind(totals.amount_total)
        .bind(totals.amount_residual)
        .bind(totals.amount_untaxed_signed)
        .bind(totals.amount_untaxed_in_currency_signed)
        .bind(totals.amount_tax_signed)
        .bind(totals.amount_total_signed)
        .bind(totals.amount_total_in_currency_signed)
        .bind(totals.amount_residual_signed)
        .bind(account_move.created_at)
        .bind(account_move.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::invalid_input(format!(
                        "Move with name '{}' already exists",
                        account_move.name
                    ));
                }
            }
            AppError::Internal(format!("Failed to create move: {}", e))
        })?;

        let mut created = account_move.clone();
        created.id = result.last_insert_id() as i64;

        for line in lines {
            let mut line = line.clone();
            line.sync_header(&created);
            Self::insert_line(&mut tx, &line).await?;
        }

        Self::commit(tx).await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<AccountMove>> {
        let row = sqlx::query_as::<_, MoveRow>(&format!("{} WHERE id = ?", MOVE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch move: {}", e)))?;

        row.map(MoveRow::into_move).transpose()
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<AccountMove>> {
        let rows = sqlx::query_as::<_, MoveRow>(&format!(
            "{} ORDER BY id DESC LIMIT ? OFFSET ?",
            MOVE_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to list moves: {}", e)))?;

        rows.into_iter().map(MoveRow::into_move).collect()
    }

    async fn find_lines(&self, move_id: i64) -> Result<Vec<MoveLine>> {
        self.fetch_lines(move_id, None).await
    }

    async fn find_lines_by_display_type(
        &self,
        move_id: i64,
        display_type: DisplayType,
    ) -> Result<Vec<MoveLine>> {
        self.fetch_lines(move_id, Some(display_type)).await
    }

    async fn update_state(&self, move_id: i64, state: MoveState) -> Result<()> {
        let mut tx = self.begin().await?;

        let result = sqlx::query(
            "UPDATE account_moves SET state = ?, updated_at = ? WHERE id = ?",
        )
        .bind(state.to_string())
        .bind(Utc::now())
        .bind(move_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to update move state: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Move {} not found", move_id)));
        }

        sqlx::query("UPDATE account_move_lines SET parent_state = ? WHERE move_id = ?")
            .bind(state.to_string())
            .bind(move_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to update line state: {}", e)))?;

        Self::commit(tx).await
    }

    async fn count_by_name_prefix(&self, prefix: &str) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM account_moves WHERE name LIKE CONCAT(?, '%')")
            .bind(prefix)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to count moves: {}", e)))
    }

    async fn apply_aggregation(&self, plan: &AggregationPlan) -> Result<()> {
        let mut tx = self.begin().await?;
        Self::lock_move(&mut tx, plan.move_id).await?;

        let totals = &plan.totals;
        sqlx::query(
            r#"
            UPDATE account_moves SET
                amount_untaxed = ?, amount_tax = ?, amount_total = ?, amount_residual = ?,
                amount_untaxed_signed = ?, amount_untaxed_in_currency_signed = ?,
                amount_tax_signed = ?, amount_total_signed = ?,
                amount_total_in_currency_signed = ?, amount_residual_signed = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(totals.amount_untaxed)
        .bind(totals.amount_tax)
        .bind(totals.amount_total)
        .bind(totals.amount_residual)
        .bind(totals.amount_untaxed_signed)
        .bind(totals.amount_untaxed_in_currency_signed)
        .bind(totals.amount_tax_signed)
        .bind(totals.amount_total_signed)
        .bind(totals.amount_total_in_currency_signed)
        .bind(totals.amount_residual_signed)
        .bind(Utc::now())
        .bind(plan.move_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to update move totals: {}", e)))?;

        for line_id in plan.deleted_line_ids() {
            Self::delete_line(&mut tx, plan.move_id, line_id).await?;
        }

        for line in &plan.product_lines {
            if line.id == 0 {
                Self::insert_line(&mut tx, line).await?;
            } else {
                Self::update_line(&mut tx, line).await?;
            }
        }

        if plan.payment_term_line.id == 0 {
            Self::insert_line(&mut tx, &plan.payment_term_line).await?;
        } else {
            Self::update_line(&mut tx, &plan.payment_term_line).await?;
        }

        for line in &plan.tax_lines.update {
            Self::update_line(&mut tx, line).await?;
        }

        for line in &plan.tax_lines.create {
            Self::insert_line(&mut tx, line).await?;
        }

        Self::commit(tx).await
    }
}

// Helper structs for database mapping

#[derive(Debug, FromRow)]
struct MoveRow {
    id: i64,
    name: String,
    move_type: String,
    state: String,
    payment_state: String,
    partner_id: Option<i64>,
    reference: Option<String>,
    invoice_origin: Option<String>,
    invoice_date: Option<NaiveDate>,
    invoice_date_due: Option<NaiveDate>,
    date: NaiveDate,
    invoice_payment_term_id: Option<i64>,
    currency_id: i64,
    company_id: i64,
    creator_id: i64,
    amount_untaxed: Decimal,
    amount_tax: Decimal,
    amount_total: Decimal,
    amount_residual: Decimal,
    amount_untaxed_signed: Decimal,
    amount_untaxed_in_currency_signed: Decimal,
    amount_tax_signed: Decimal,
    amount_total_signed: Decimal,
    amount_total_in_currency_signed: Decimal,
    amount_residual_signed: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn invalid_column(e: String) -> AppError {
    AppError::Internal(format!("Invalid value in database: {}", e))
}

impl MoveRow {
    fn into_move(self) -> Result<AccountMove> {
        Ok(AccountMove {
            id: self.id,
            name: self.name,
            move_type: self.move_type.parse().map_err(invalid_column)?,
            state: self.state.parse().map_err(invalid_column)?,
            payment_state: self.payment_state.parse().map_err(invalid_column)?,
            partner_id: self.partner_id,
            reference: self.reference,
            invoice_origin: self.invoice_origin,
            invoice_date: self.invoice_date,
            invoice_date_due: self.invoice_date_due,
            date: self.date,
            invoice_payment_term_id: self.invoice_payment_term_id,
            currency_id: self.currency_id,
            company_id: self.company_id,
            creator_id: self.creator_id,
            totals: MoveTotals {
                amount_untaxed: self.amount_untaxed,
                amount_tax: self.amount_tax,
                amount_total: self.amount_total,
                amount_residual: self.amount_residual,
                amount_untaxed_signed: self.amount_untaxed_signed,
                amount_untaxed_in_currency_signed: self.amount_untaxed_in_currency_signed,
                amount_tax_signed: self.amount_tax_signed,
                amount_total_signed: self.amount_total_signed,
                amount_total_in_currency_signed: self.amount_total_in_currency_signed,
                amount_residual_signed: self.amount_residual_signed,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct LineRow {
    id: i64,
    move_id: i64,
    move_name: String,
    name: String,
    display_type: String,
    sort: i32,
    product_id: Option<i64>,
    uom_id: Option<i64>,
    quantity: Decimal,
    product_uom_qty: Decimal,
    price_unit: Decimal,
    discount: Decimal,
    discount_date: Option<NaiveDate>,
    price_subtotal: Decimal,
    price_tax: Decimal,
    price_total: Decimal,
    tax_line_id: Option<i64>,
    tax_group_id: Option<i64>,
    tax_base_amount: Decimal,
    debit: Decimal,
    credit: Decimal,
    balance: Decimal,
    amount_currency: Decimal,
    amount_residual: Decimal,
    amount_residual_currency: Decimal,
    date_maturity: Option<NaiveDate>,
    date: NaiveDate,
    currency_id: i64,
    company_id: i64,
    partner_id: Option<i64>,
    parent_state: String,
    creator_id: i64,
}

impl LineRow {
    fn into_line(self, tax_ids: Vec<i64>) -> Result<MoveLine> {
        Ok(MoveLine {
            id: self.id,
            move_id: self.move_id,
            move_name: self.move_name,
            name: self.name,
            display_type: self.display_type.parse().map_err(invalid_column)?,
            sort: self.sort,
            product_id: self.product_id,
            uom_id: self.uom_id,
            quantity: self.quantity,
            product_uom_qty: self.product_uom_qty,
            price_unit: self.price_unit,
            discount: self.discount,
            discount_date: self.discount_date,
            tax_ids,
            price_subtotal: self.price_subtotal,
            price_tax: self.price_tax,
            price_total: self.price_total,
            tax_line_id: self.tax_line_id,
            tax_group_id: self.tax_group_id,
            tax_base_amount: self.tax_base_amount,
            debit: self.debit,
            credit: self.credit,
            balance: self.balance,
            amount_currency: self.amount_currency,
            amount_residual: self.amount_residual,
            amount_residual_currency: self.amount_residual_currency,
            date_maturity: self.date_maturity,
            date: self.date,
            currency_id: self.currency_id,
            company_id: self.company_id,
            partner_id: self.partner_id,
            parent_state: self.parent_state.parse().map_err(invalid_column)?,
            creator_id: self.creator_id,
        })
    }
}
