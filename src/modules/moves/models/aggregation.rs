use serde::Serialize;

use super::account_move::MoveTotals;
use super::move_line::MoveLine;

/// Reconciliation of a move's tax lines against the freshly merged taxes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaxLineDiff {
    /// Taxes with no line yet; `id` is 0, `sort` already assigned
    pub create: Vec<MoveLine>,
    /// Existing lines rewritten in place, ids kept
    pub update: Vec<MoveLine>,
    /// Lines whose tax no longer appears on any product line
    pub delete: Vec<i64>,
}

impl TaxLineDiff {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }
}

/// Every write one aggregation pass performs on a move.
///
/// Repositories must apply a plan atomically. A plan for an unsaved move
/// (`move_id` 0) only creates lines; see [`AggregationPlan::written_lines`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationPlan {
    pub move_id: i64,
    pub totals: MoveTotals,
    /// Product lines with refreshed totals and accounting amounts.
    /// Inserted when `id` is 0, updated otherwise.
    pub product_lines: Vec<MoveLine>,
    /// Stored product lines superseded by `product_lines`
    pub replaced_line_ids: Vec<i64>,
    /// Created when `id` is 0, updated otherwise
    pub payment_term_line: MoveLine,
    /// Surplus payment-term lines left by older data
    pub stale_payment_term_ids: Vec<i64>,
    pub tax_lines: TaxLineDiff,
}

impl AggregationPlan {
    /// Ids of every line the plan deletes
    pub fn deleted_line_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.replaced_line_ids
            .iter()
            .chain(self.stale_payment_term_ids.iter())
            .chain(self.tax_lines.delete.iter())
            .copied()
    }

    /// Every line the plan leaves on the move, in sort order
    pub fn written_lines(&self) -> Vec<MoveLine> {
        let mut lines: Vec<MoveLine> = self
            .product_lines
            .iter()
            .chain(std::iter::once(&self.payment_term_line))
            .chain(self.tax_lines.update.iter())
            .chain(self.tax_lines.create.iter())
            .cloned()
            .collect();
        lines.sort_by_key(|l| (l.sort, l.id));
        lines
    }
}
