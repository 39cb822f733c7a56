use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::info;

use crate::core::money::round_display;
use crate::core::{AppError, RequestContext, Result};
use crate::modules::moves::models::{
    AccountMove, CreateMoveRequest, DisplayType, MoveLine, MoveResponse, MoveState, MoveTotals,
    PaymentState, ProductLineRequest, ReplaceLinesRequest,
};
use crate::modules::moves::repositories::MoveRepository;
use crate::modules::moves::services::line_calculator::LineInput;
use crate::modules::moves::services::move_aggregator::MoveAggregator;
use crate::modules::payment_terms::PaymentTermRepository;
use crate::modules::products::{ProductRepository, UnitConversion};
use crate::modules::taxes::repositories::{resolve_taxes, TaxRepository};

/// Largest page `list_moves` serves
pub const MAX_PAGE_SIZE: i64 = 100;

/// Service for the bill/invoice lifecycle
pub struct MoveService {
    moves: Arc<dyn MoveRepository>,
    products: Arc<dyn ProductRepository>,
    taxes: Arc<dyn TaxRepository>,
    aggregator: MoveAggregator,
    conversion: UnitConversion,
}

impl MoveService {
    pub fn new(
        moves: Arc<dyn MoveRepository>,
        products: Arc<dyn ProductRepository>,
        taxes: Arc<dyn TaxRepository>,
        payment_terms: Arc<dyn PaymentTermRepository>,
    ) -> Self {
        let aggregator = MoveAggregator::new(
            moves.clone(),
            products.clone(),
            taxes.clone(),
            payment_terms,
        );

        Self {
            moves,
            products,
            taxes,
            aggregator,
            conversion: UnitConversion::new(),
        }
    }

    /// Create a draft move with its product lines and aggregate it.
    ///
    /// The move is stored together with its synthetic lines, so a line that
    /// fails to aggregate leaves nothing behind.
    pub async fn create_move(
        &self,
        ctx: &RequestContext,
        request: CreateMoveRequest,
    ) -> Result<MoveResponse> {
        let date = request.date.unwrap_or_else(|| Utc::now().date_naive());
        let name = self.next_name(request.move_type.sequence_prefix(), date).await?;
        let now = Utc::now();

        let mut account_move = AccountMove {
            id: 0,
            name,
            move_type: request.move_type,
            state: MoveState::Draft,
            payment_state: PaymentState::NotPaid,
            partner_id: request.partner_id,
            reference: request.reference,
            invoice_origin: request.invoice_origin,
            invoice_date: request.invoice_date,
            invoice_date_due: request
                .invoice_date_due
                .or(request.invoice_date)
                .or(Some(date)),
            date,
            invoice_payment_term_id: request.invoice_payment_term_id,
            currency_id: request.currency_id.unwrap_or(ctx.default_currency_id),
            company_id: ctx.company_id,
            creator_id: ctx.user_id,
            totals: MoveTotals::default(),
            created_at: now,
            updated_at: now,
        };

        let mut lines = self
            .build_product_lines(ctx, &account_move, &request.lines)
            .await?;
        for (index, line) in lines.iter_mut().enumerate() {
            line.sort = index as i32 + 1;
        }
        let product_count = lines.len();

        let plan = self.aggregator.plan(ctx, &account_move, lines).await?;
        account_move.totals = plan.totals;
        let created = self.moves.create(&account_move, &plan.written_lines()).await?;

        info!(
            move_id = created.id,
            move_name = %created.name,
            move_type = %created.move_type,
            lines = product_count,
            amount_total = %created.totals.amount_total,
            "Created move"
        );

        self.get_move(created.id).await
    }

    /// Replace every product line of a draft move
    pub async fn replace_lines(
        &self,
        ctx: &RequestContext,
        move_id: i64,
        request: ReplaceLinesRequest,
    ) -> Result<MoveResponse> {
        let account_move = self.find_move(move_id).await?;
        account_move.ensure_editable()?;

        let new_lines = self
            .build_product_lines(ctx, &account_move, &request.lines)
            .await?;
        let product_count = new_lines.len();

        let existing = self.moves.find_lines(move_id).await?;
        let mut sort = existing.iter().map(|l| l.sort).max().unwrap_or(0);
        let (replaced, mut lines): (Vec<MoveLine>, Vec<MoveLine>) =
            existing.into_iter().partition(|l| l.is_product());
        for mut line in new_lines {
            sort += 1;
            line.sort = sort;
            lines.push(line);
        }

        // Old product lines go in the same write as the new ones
        let mut plan = self.aggregator.plan(ctx, &account_move, lines).await?;
        plan.replaced_line_ids = replaced.iter().map(|l| l.id).collect();
        self.moves.apply_aggregation(&plan).await?;

        info!(
            move_id,
            lines = product_count,
            amount_total = %plan.totals.amount_total,
            "Replaced product lines"
        );

        self.get_move(move_id).await
    }

    /// Re-run aggregation and return the refreshed move
    pub async fn collect_totals(&self, ctx: &RequestContext, move_id: i64) -> Result<MoveResponse> {
        self.aggregator.collect_totals(ctx, move_id).await?;
        self.get_move(move_id).await
    }

    pub async fn post(&self, ctx: &RequestContext, move_id: i64) -> Result<MoveResponse> {
        let mut account_move = self.find_move(move_id).await?;
        account_move.transition_to(MoveState::Posted)?;

        let product_lines = self
            .moves
            .find_lines_by_display_type(move_id, DisplayType::Product)
            .await?;
        if product_lines.is_empty() {
            return Err(AppError::invalid_state(format!(
                "Move {} has no product lines and cannot be posted",
                account_move.name
            )));
        }

        self.aggregator.collect_totals(ctx, move_id).await?;
        self.moves.update_state(move_id, MoveState::Posted).await?;

        info!(move_id, move_name = %account_move.name, user_id = ctx.user_id, "Posted move");

        self.get_move(move_id).await
    }

    pub async fn cancel(&self, ctx: &RequestContext, move_id: i64) -> Result<MoveResponse> {
        let mut account_move = self.find_move(move_id).await?;
        account_move.transition_to(MoveState::Cancel)?;
        self.moves.update_state(move_id, MoveState::Cancel).await?;

        info!(move_id, move_name = %account_move.name, user_id = ctx.user_id, "Cancelled move");

        self.get_move(move_id).await
    }

    pub async fn reset_to_draft(&self, ctx: &RequestContext, move_id: i64) -> Result<MoveResponse> {
        let mut account_move = self.find_move(move_id).await?;
        account_move.reset_to_draft()?;
        self.moves.update_state(move_id, MoveState::Draft).await?;

        info!(move_id, move_name = %account_move.name, user_id = ctx.user_id, "Reset move to draft");

        self.get_move(move_id).await
    }

    pub async fn get_move(&self, move_id: i64) -> Result<MoveResponse> {
        let account_move = self.find_move(move_id).await?;
        let lines = self.moves.find_lines(move_id).await?;

        Ok(MoveResponse::new(account_move, lines))
    }

    pub async fn list_moves(&self, limit: i64, offset: i64) -> Result<Vec<AccountMove>> {
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(AppError::invalid_input(format!(
                "Limit must be between 1 and {}, got: {}",
                MAX_PAGE_SIZE, limit
            )));
        }
        if offset < 0 {
            return Err(AppError::invalid_input(format!(
                "Offset must not be negative, got: {}",
                offset
            )));
        }

        self.moves.list(limit, offset).await
    }

    pub async fn get_lines(&self, move_id: i64) -> Result<Vec<MoveLine>> {
        self.find_move(move_id).await?;
        self.moves.find_lines(move_id).await
    }

    async fn find_move(&self, move_id: i64) -> Result<AccountMove> {
        self.moves
            .find_by_id(move_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Move {} not found", move_id)))
    }

    /// `PREFIX/YYYY/NNNNN` numbering, one sequence per prefix and year
    async fn next_name(&self, prefix: &str, date: NaiveDate) -> Result<String> {
        let sequence_prefix = format!("{}/{}/", prefix, date.year());
        let number = self.moves.next_sequence_number(&sequence_prefix).await?;

        Ok(format!("{}{:05}", sequence_prefix, number))
    }

    /// Turn submitted lines into product lines, defaulting unit, price and
    /// taxes from the product
    async fn build_product_lines(
        &self,
        ctx: &RequestContext,
        account_move: &AccountMove,
        requests: &[ProductLineRequest],
    ) -> Result<Vec<MoveLine>> {
        let mut lines = Vec::with_capacity(requests.len());

        for request in requests {
            let product = self
                .products
                .find_product(request.product_id)
                .await?
                .ok_or_else(|| {
                    AppError::missing_reference(format!(
                        "Product {} does not exist",
                        request.product_id
                    ))
                })?;

            let uom = match request.uom_id.or(product.uom_id) {
                Some(uom_id) => Some(self.products.find_uom(uom_id).await?.ok_or_else(|| {
                    AppError::invalid_unit(format!("Unit of measure {} does not exist", uom_id))
                })?),
                None => None,
            };

            let tax_ids = request.tax_ids.as_ref().unwrap_or(&product.tax_ids);
            let taxes = resolve_taxes(self.taxes.as_ref(), tax_ids).await?;

            let price_unit = match request.price_unit {
                Some(price_unit) => price_unit,
                None => round_display(
                    self.conversion
                        .to_base_unit_price(uom.as_ref(), product.base_unit_price())?,
                ),
            };

            LineInput::new(request.quantity, price_unit, request.discount, vec![]).validate()?;

            let mut line = MoveLine::for_move(
                account_move,
                DisplayType::Product,
                product.name.clone(),
                ctx.user_id,
                account_move.date,
            );
            line.product_id = Some(product.id);
            line.uom_id = uom.as_ref().map(|u| u.id);
            line.quantity = request.quantity;
            line.product_uom_qty =
                round_display(self.conversion.to_base_quantity(uom.as_ref(), request.quantity)?);
            line.price_unit = price_unit;
            line.discount = request.discount;
            line.discount_date = (request.discount > Decimal::ZERO).then_some(line.date);
            line.tax_ids = taxes.iter().map(|t| t.id).collect();

            lines.push(line);
        }

        Ok(lines)
    }
}
