//! In-process storage backing every repository trait.
//!
//! Used by the `memory` storage backend and by tests. All data sits behind a
//! single `RwLock`; multi-row writes are staged on a copy and swapped in, so
//! a failing write leaves the store untouched.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::core::{AppError, Result};
use crate::modules::moves::models::{
    AccountMove, AggregationPlan, DisplayType, MoveLine, MoveState,
};
use crate::modules::moves::repositories::MoveRepository;
use crate::modules::payment_terms::{PaymentTerm, PaymentTermRepository};
use crate::modules::products::{Product, ProductRepository, Uom};
use crate::modules::taxes::models::{Tax, TaxGroup, TaxUse};
use crate::modules::taxes::repositories::TaxRepository;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    products: BTreeMap<i64, Product>,
    uoms: BTreeMap<i64, Uom>,
    taxes: BTreeMap<i64, Tax>,
    tax_groups: BTreeMap<i64, TaxGroup>,
    payment_terms: BTreeMap<i64, PaymentTerm>,
    moves: BTreeMap<i64, AccountMove>,
    lines: BTreeMap<i64, MoveLine>,
    last_move_id: i64,
    last_line_id: i64,
}

impl MemoryState {
    fn insert_line(&mut self, line: &MoveLine) -> i64 {
        self.last_line_id += 1;
        let mut line = line.clone();
        line.id = self.last_line_id;
        self.lines.insert(line.id, line);
        self.last_line_id
    }

    fn update_line(&mut self, line: &MoveLine) -> Result<()> {
        match self.lines.get_mut(&line.id) {
            Some(existing) if existing.move_id == line.move_id => {
                *existing = line.clone();
                Ok(())
            }
            _ => Err(AppError::not_found(format!(
                "Line {} of move {} not found",
                line.id, line.move_id
            ))),
        }
    }

    fn delete_line(&mut self, move_id: i64, line_id: i64) {
        if self.lines.get(&line_id).is_some_and(|l| l.move_id == move_id) {
            self.lines.remove(&line_id);
        }
    }

    fn lines_of(&self, move_id: i64) -> Vec<MoveLine> {
        let mut lines: Vec<MoveLine> = self
            .lines
            .values()
            .filter(|l| l.move_id == move_id)
            .cloned()
            .collect();
        lines.sort_by_key(|l| (l.sort, l.id));
        lines
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_product(&self, product: Product) {
        self.state.write().await.products.insert(product.id, product);
    }

    pub async fn insert_uom(&self, uom: Uom) {
        self.state.write().await.uoms.insert(uom.id, uom);
    }

    pub async fn insert_tax(&self, tax: Tax) {
        self.state.write().await.taxes.insert(tax.id, tax);
    }

    pub async fn remove_tax(&self, tax_id: i64) -> Option<Tax> {
        self.state.write().await.taxes.remove(&tax_id)
    }

    pub async fn remove_uom(&self, uom_id: i64) -> Option<Uom> {
        self.state.write().await.uoms.remove(&uom_id)
    }

    pub async fn insert_tax_group(&self, group: TaxGroup) {
        self.state.write().await.tax_groups.insert(group.id, group);
    }

    pub async fn insert_payment_term(&self, term: PaymentTerm) {
        self.state.write().await.payment_terms.insert(term.id, term);
    }

    pub async fn remove_payment_term(&self, term_id: i64) -> Option<PaymentTerm> {
        self.state.write().await.payment_terms.remove(&term_id)
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn find_product(&self, id: i64) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn find_uom(&self, id: i64) -> Result<Option<Uom>> {
        Ok(self.state.read().await.uoms.get(&id).cloned())
    }
}

#[async_trait]
impl TaxRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Tax>> {
        Ok(self.state.read().await.taxes.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Tax>> {
        let state = self.state.read().await;
        let mut taxes: Vec<Tax> = state
            .taxes
            .values()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect();
        taxes.sort_by_key(|t| (t.sort, t.id));
        Ok(taxes)
    }

    async fn list(&self, type_tax_use: Option<TaxUse>) -> Result<Vec<Tax>> {
        let state = self.state.read().await;
        let mut taxes: Vec<Tax> = state
            .taxes
            .values()
            .filter(|t| type_tax_use.map_or(true, |u| t.type_tax_use == u))
            .cloned()
            .collect();
        taxes.sort_by_key(|t| (t.sort, t.id));
        Ok(taxes)
    }

    async fn find_group(&self, id: i64) -> Result<Option<TaxGroup>> {
        Ok(self.state.read().await.tax_groups.get(&id).cloned())
    }
}

#[async_trait]
impl PaymentTermRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<PaymentTerm>> {
        Ok(self.state.read().await.payment_terms.get(&id).cloned())
    }
}

#[async_trait]
impl MoveRepository for MemoryStore {
    async fn create(&self, account_move: &AccountMove, lines: &[MoveLine]) -> Result<AccountMove> {
        let mut state = self.state.write().await;

        if state.moves.values().any(|m| m.name == account_move.name) {
            return Err(AppError::invalid_input(format!(
                "Move with name '{}' already exists",
                account_move.name
            )));
        }

        state.last_move_id += 1;
        let mut created = account_move.clone();
        created.id = state.last_move_id;
        state.moves.insert(created.id, created.clone());

        for line in lines {
            let mut line = line.clone();
            line.sync_header(&created);
            state.insert_line(&line);
        }

        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<AccountMove>> {
        Ok(self.state.read().await.moves.get(&id).cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<AccountMove>> {
        let state = self.state.read().await;
        Ok(state
            .moves
            .values()
            .rev()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn find_lines(&self, move_id: i64) -> Result<Vec<MoveLine>> {
        Ok(self.state.read().await.lines_of(move_id))
    }

    async fn find_lines_by_display_type(
        &self,
        move_id: i64,
        display_type: DisplayType,
    ) -> Result<Vec<MoveLine>> {
        let mut lines = self.state.read().await.lines_of(move_id);
        lines.retain(|l| l.display_type == display_type);
        Ok(lines)
    }

    async fn update_state(&self, move_id: i64, move_state: MoveState) -> Result<()> {
        let mut state = self.state.write().await;

        let account_move = state
            .moves
            .get_mut(&move_id)
            .ok_or_else(|| AppError::not_found(format!("Move {} not found", move_id)))?;
        account_move.state = move_state;
        account_move.updated_at = Utc::now();

        for line in state.lines.values_mut().filter(|l| l.move_id == move_id) {
            line.parent_state = move_state;
        }

        Ok(())
    }

    async fn count_by_name_prefix(&self, prefix: &str) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state
            .moves
            .values()
            .filter(|m| m.name.starts_with(prefix))
            .count() as i64)
    }

    async fn apply_aggregation(&self, plan: &AggregationPlan) -> Result<()> {
        let mut state = self.state.write().await;
        let mut staged = state.clone();

        let account_move = staged
            .moves
            .get_mut(&plan.move_id)
            .ok_or_else(|| AppError::not_found(format!("Move {} not found", plan.move_id)))?;
        account_move.totals = plan.totals;
        account_move.updated_at = Utc::now();

        for line_id in plan.deleted_line_ids() {
            staged.delete_line(plan.move_id, line_id);
        }

        for line in &plan.product_lines {
            if line.id == 0 {
                staged.insert_line(line);
            } else {
                staged.update_line(line)?;
            }
        }

        if plan.payment_term_line.id == 0 {
            staged.insert_line(&plan.payment_term_line);
        } else {
            staged.update_line(&plan.payment_term_line)?;
        }

        for line in &plan.tax_lines.update {
            staged.update_line(line)?;
        }

        for line in &plan.tax_lines.create {
            staged.insert_line(line);
        }

        *state = staged;
        Ok(())
    }
}
