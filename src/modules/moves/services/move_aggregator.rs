use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::core::money::{self, round_money};
use crate::core::{AppError, RequestContext, Result};
use crate::modules::moves::models::{
    AccountMove, AggregationPlan, DisplayType, MoveLine, MoveTotals, TaxLineDiff,
};
use crate::modules::moves::repositories::MoveRepository;
use crate::modules::moves::services::line_calculator::{LineCalculator, LineInput};
use crate::modules::payment_terms::{PaymentTerm, PaymentTermRepository};
use crate::modules::products::ProductRepository;
use crate::modules::taxes::models::Tax;
use crate::modules::taxes::repositories::{resolve_taxes, TaxRepository};

/// Recomputes a move's totals and synthetic lines from its product lines
pub struct MoveAggregator {
    moves: Arc<dyn MoveRepository>,
    products: Arc<dyn ProductRepository>,
    taxes: Arc<dyn TaxRepository>,
    payment_terms: Arc<dyn PaymentTermRepository>,
}

impl MoveAggregator {
    pub fn new(
        moves: Arc<dyn MoveRepository>,
        products: Arc<dyn ProductRepository>,
        taxes: Arc<dyn TaxRepository>,
        payment_terms: Arc<dyn PaymentTermRepository>,
    ) -> Self {
        Self {
            moves,
            products,
            taxes,
            payment_terms,
        }
    }

    /// Recompute and store the totals, payment-term line and tax lines of a move.
    ///
    /// Every reference is resolved before anything is written, so a dangling
    /// product, unit, tax or payment term leaves the move untouched.
    pub async fn collect_totals(&self, ctx: &RequestContext, move_id: i64) -> Result<AccountMove> {
        let mut account_move = self
            .moves
            .find_by_id(move_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Move {} not found", move_id)))?;
        let lines = self.moves.find_lines(move_id).await?;

        let plan = self.plan(ctx, &account_move, lines).await?;

        debug!(
            move_id,
            product_lines = plan.product_lines.len(),
            tax_lines_created = plan.tax_lines.create.len(),
            tax_lines_updated = plan.tax_lines.update.len(),
            lines_deleted = plan.deleted_line_ids().count(),
            "Applying aggregation plan"
        );

        self.moves.apply_aggregation(&plan).await?;

        info!(
            move_id,
            move_name = %account_move.name,
            amount_untaxed = %plan.totals.amount_untaxed,
            amount_tax = %plan.totals.amount_tax,
            amount_total = %plan.totals.amount_total,
            "Collected move totals"
        );

        account_move.totals = plan.totals;
        Ok(account_move)
    }

    /// Resolve the references of `lines` and plan their aggregation without
    /// writing anything. `lines` may include product lines not stored yet
    /// (`id` 0), which the plan then inserts.
    pub async fn plan(
        &self,
        ctx: &RequestContext,
        account_move: &AccountMove,
        lines: Vec<MoveLine>,
    ) -> Result<AggregationPlan> {
        let mut checked_products = HashSet::new();
        let mut checked_uoms = HashSet::new();
        for line in lines.iter().filter(|l| l.is_product()) {
            let product_id = line.product_id.ok_or_else(|| {
                AppError::missing_reference(format!("Line {} has no product", line.id))
            })?;

            if checked_products.insert(product_id)
                && self.products.find_product(product_id).await?.is_none()
            {
                return Err(AppError::missing_reference(format!(
                    "Product {} does not exist",
                    product_id
                )));
            }

            if let Some(uom_id) = line.uom_id {
                if checked_uoms.insert(uom_id) && self.products.find_uom(uom_id).await?.is_none() {
                    return Err(AppError::missing_reference(format!(
                        "Unit of measure {} does not exist",
                        uom_id
                    )));
                }
            }
        }

        let mut tax_ids: Vec<i64> = lines
            .iter()
            .filter(|l| l.is_product())
            .flat_map(|l| l.tax_ids.iter().copied())
            .collect();
        tax_ids.sort_unstable();
        tax_ids.dedup();

        let taxes: HashMap<i64, Tax> = resolve_taxes(self.taxes.as_ref(), &tax_ids)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        let payment_term = match account_move.invoice_payment_term_id {
            Some(term_id) => Some(self.payment_terms.find_by_id(term_id).await?.ok_or_else(
                || AppError::missing_reference(format!("Payment term {} does not exist", term_id)),
            )?),
            None => None,
        };

        plan_aggregation(
            account_move,
            lines,
            &taxes,
            payment_term.as_ref(),
            ctx,
            Utc::now().date_naive(),
        )
    }
}

struct MergedTax<'a> {
    tax: &'a Tax,
    amount: Decimal,
    base: Decimal,
}

/// Build every write of an aggregation pass without touching storage.
///
/// `lines` are all lines of the move; `taxes` must hold every tax referenced
/// by a product line. Existing synthetic lines keep their id, sort and date,
/// so planning against the result of a previous pass changes nothing.
pub fn plan_aggregation(
    account_move: &AccountMove,
    lines: Vec<MoveLine>,
    taxes: &HashMap<i64, Tax>,
    payment_term: Option<&PaymentTerm>,
    ctx: &RequestContext,
    today: NaiveDate,
) -> Result<AggregationPlan> {
    let calculator = LineCalculator::new();
    let sign = account_move.move_type.direction_sign();
    let mut next_sort = lines.iter().map(|l| l.sort).max().unwrap_or(0) + 1;

    let mut product_lines = Vec::new();
    let mut payment_term_lines = Vec::new();
    let mut tax_lines = Vec::new();
    for line in lines {
        match line.display_type {
            DisplayType::Product => product_lines.push(line),
            DisplayType::PaymentTerm => payment_term_lines.push(line),
            DisplayType::Tax => tax_lines.push(line),
        }
    }
    product_lines.sort_by_key(|l| (l.sort, l.id));
    payment_term_lines.sort_by_key(|l| (l.sort, l.id));
    tax_lines.sort_by_key(|l| (l.sort, l.id));

    let mut totals = MoveTotals::default();
    let mut merged: Vec<MergedTax> = Vec::new();

    for line in product_lines.iter_mut() {
        let line_taxes = line
            .tax_ids
            .iter()
            .map(|id| {
                taxes.get(id).cloned().ok_or_else(|| {
                    AppError::missing_reference(format!("Tax {} does not exist", id))
                })
            })
            .collect::<Result<Vec<Tax>>>()?;

        let input = LineInput::new(line.quantity, line.price_unit, line.discount, line_taxes);
        let computation = calculator.compute(&input)?;

        line.sync_header(account_move);
        line.apply_totals(&computation.totals, sign);
        line.amount_residual = Decimal::ZERO;
        line.amount_residual_currency = Decimal::ZERO;
        line.discount_date = if line.discount > Decimal::ZERO {
            line.discount_date.or(Some(line.date))
        } else {
            None
        };
        totals.accumulate(&computation.totals, sign)?;

        // Chaining stays within the line; merging happens on the results
        for computed in &computation.taxes.taxes_computed {
            match merged.iter_mut().find(|m| m.tax.id == computed.tax_id) {
                Some(entry) => {
                    entry.amount = money::add(entry.amount, computed.tax_amount)?;
                    entry.base = money::add(entry.base, computed.tax_base_amount)?;
                }
                None => {
                    if let Some(tax) = taxes.get(&computed.tax_id) {
                        merged.push(MergedTax {
                            tax,
                            amount: computed.tax_amount,
                            base: computed.tax_base_amount,
                        });
                    }
                }
            }
        }
    }
    merged.sort_by_key(|m| (m.tax.sort, m.tax.id));

    // Payment-term line
    let mut stale_payment_term_ids = Vec::new();
    let mut payment_term_line = if payment_term_lines.is_empty() {
        let mut line = MoveLine::for_move(
            account_move,
            DisplayType::PaymentTerm,
            String::new(),
            ctx.user_id,
            today,
        );
        line.sort = next_sort;
        next_sort += 1;
        line
    } else {
        let mut existing = payment_term_lines.into_iter();
        let first = existing.next();
        stale_payment_term_ids.extend(existing.map(|l| l.id));
        first.ok_or_else(|| AppError::internal("Payment-term line disappeared"))?
    };

    let due_date = account_move.due_date();
    payment_term_line.sync_header(account_move);
    payment_term_line.name = payment_term.map(|t| t.name.clone()).unwrap_or_default();
    payment_term_line.date_maturity = Some(match payment_term {
        Some(term) => term.maturity_from(due_date),
        None => due_date,
    });
    let receivable = sign * totals.amount_total;
    payment_term_line.set_balance(receivable);
    payment_term_line.amount_residual = receivable;
    payment_term_line.amount_residual_currency = receivable;

    // Tax lines, keyed by tax; the first line per tax survives
    let mut existing_by_tax: HashMap<i64, MoveLine> = HashMap::new();
    let mut diff = TaxLineDiff::default();
    for line in tax_lines {
        match line.tax_line_id {
            Some(tax_id) if !existing_by_tax.contains_key(&tax_id) => {
                existing_by_tax.insert(tax_id, line);
            }
            _ => diff.delete.push(line.id),
        }
    }

    for entry in &merged {
        let amount = round_money(entry.amount);
        let (mut line, is_new) = match existing_by_tax.remove(&entry.tax.id) {
            Some(line) => (line, false),
            None => {
                let mut line = MoveLine::for_move(
                    account_move,
                    DisplayType::Tax,
                    entry.tax.name.clone(),
                    ctx.user_id,
                    today,
                );
                line.sort = next_sort;
                next_sort += 1;
                (line, true)
            }
        };

        line.sync_header(account_move);
        line.name = entry.tax.name.clone();
        line.tax_line_id = Some(entry.tax.id);
        line.tax_group_id = entry.tax.tax_group_id;
        line.tax_base_amount = round_money(entry.base);
        line.set_balance(-sign * amount);
        line.amount_residual = Decimal::ZERO;
        line.amount_residual_currency = Decimal::ZERO;

        if is_new {
            diff.create.push(line);
        } else {
            diff.update.push(line);
        }
    }

    let mut stale: Vec<i64> = existing_by_tax.into_values().map(|l| l.id).collect();
    stale.sort_unstable();
    diff.delete.extend(stale);

    Ok(AggregationPlan {
        move_id: account_move.id,
        totals,
        product_lines,
        replaced_line_ids: Vec::new(),
        payment_term_line,
        stale_payment_term_ids,
        tax_lines: diff,
    })
}
