// Line editor: the state of one product line while it is being edited and
// the reducer that applies a field change to it.
//
// `LineEditor::reduce` is pure. `LineEditService` resolves the ids carried by
// a `FieldEdit`, and the state's own tax ids, through the repositories and
// hands the result to the reducer. A state only ever carries ids.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::money::round_display;
use crate::core::{AppError, Result};
use crate::modules::moves::services::line_calculator::{LineCalculator, LineInput};
use crate::modules::products::{Product, ProductRepository, UnitConversion, Uom};
use crate::modules::taxes::models::Tax;
use crate::modules::taxes::repositories::{resolve_taxes, TaxRepository};

/// Editable fields of a product line plus its computed totals
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineState {
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub uom_id: Option<i64>,
    #[serde(default)]
    pub quantity: Decimal,
    #[serde(default)]
    pub product_uom_qty: Decimal,
    #[serde(default)]
    pub price_unit: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub tax_ids: Vec<i64>,
    #[serde(default)]
    pub price_subtotal: Decimal,
    #[serde(default)]
    pub price_tax: Decimal,
    #[serde(default)]
    pub price_total: Decimal,
}

impl LineState {
    /// Fresh line with quantity 1, the editor's starting point
    pub fn new() -> Self {
        Self {
            quantity: Decimal::ONE,
            ..Default::default()
        }
    }

    pub fn has_product(&self) -> bool {
        self.product_id.is_some()
    }
}

/// A field change with every reference already resolved
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    ProductSelected {
        product: Product,
        uom: Option<Uom>,
        taxes: Vec<Tax>,
    },
    QuantityChanged {
        quantity: Decimal,
        /// The line's current unit
        uom: Option<Uom>,
    },
    UomChanged {
        /// The line's current product, `None` when none is selected
        product: Option<Product>,
        uom: Option<Uom>,
    },
    TaxesChanged {
        taxes: Vec<Tax>,
    },
    DiscountChanged {
        discount: Decimal,
    },
    PriceUnitChanged {
        price_unit: Decimal,
    },
}

/// A field change as submitted by a client, carrying ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum FieldEdit {
    Product { product_id: i64 },
    Quantity { quantity: Decimal },
    Uom { uom_id: Option<i64> },
    Taxes { tax_ids: Vec<i64> },
    Discount { discount: Decimal },
    PriceUnit { price_unit: Decimal },
}

pub struct LineEditor {
    conversion: UnitConversion,
    calculator: LineCalculator,
}

impl LineEditor {
    pub fn new() -> Self {
        Self {
            conversion: UnitConversion::new(),
            calculator: LineCalculator::new(),
        }
    }

    /// Apply one change and return the new state.
    ///
    /// Product, quantity and unit changes only store the raw field while no
    /// product is selected. Every other accepted change recomputes the totals.
    /// On error the input state is dropped and nothing else changes.
    ///
    /// `taxes` are the resolved `state.tax_ids`; product and tax changes
    /// replace them.
    pub fn reduce(
        &self,
        state: LineState,
        taxes: Vec<Tax>,
        change: FieldChange,
    ) -> Result<LineState> {
        let mut next = state;
        let mut line_taxes = taxes;

        match change {
            FieldChange::ProductSelected {
                product,
                uom,
                taxes,
            } => {
                next.product_id = Some(product.id);
                next.uom_id = uom.as_ref().map(|u| u.id);
                next.price_unit = round_display(
                    self.conversion
                        .to_base_unit_price(uom.as_ref(), product.base_unit_price())?,
                );
                next.product_uom_qty =
                    round_display(self.conversion.to_base_quantity(uom.as_ref(), next.quantity)?);
                next.tax_ids = taxes.iter().map(|t| t.id).collect();
                line_taxes = taxes;
            }
            FieldChange::QuantityChanged { quantity, uom } => {
                next.quantity = quantity;
                if !next.has_product() {
                    return Ok(next);
                }
                next.product_uom_qty =
                    round_display(self.conversion.to_base_quantity(uom.as_ref(), quantity)?);
            }
            FieldChange::UomChanged { product, uom } => {
                next.uom_id = uom.as_ref().map(|u| u.id);
                let product = match (next.has_product(), product) {
                    (true, Some(product)) => product,
                    _ => return Ok(next),
                };
                next.product_uom_qty =
                    round_display(self.conversion.to_base_quantity(uom.as_ref(), next.quantity)?);
                next.price_unit = round_display(
                    self.conversion
                        .to_base_unit_price(uom.as_ref(), product.base_unit_price())?,
                );
            }
            FieldChange::TaxesChanged { taxes } => {
                next.tax_ids = taxes.iter().map(|t| t.id).collect();
                line_taxes = taxes;
            }
            FieldChange::DiscountChanged { discount } => next.discount = discount,
            FieldChange::PriceUnitChanged { price_unit } => next.price_unit = price_unit,
        }

        let totals = self.calculator.calculate_line_totals(&LineInput::new(
            next.quantity,
            next.price_unit,
            next.discount,
            line_taxes,
        ))?;
        next.price_subtotal = totals.price_subtotal;
        next.price_tax = totals.price_tax;
        next.price_total = totals.price_total;

        Ok(next)
    }
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves a `FieldEdit` and reduces it onto a line state
pub struct LineEditService {
    products: Arc<dyn ProductRepository>,
    taxes: Arc<dyn TaxRepository>,
    editor: LineEditor,
}

impl LineEditService {
    pub fn new(products: Arc<dyn ProductRepository>, taxes: Arc<dyn TaxRepository>) -> Self {
        Self {
            products,
            taxes,
            editor: LineEditor::new(),
        }
    }

    pub async fn apply(&self, state: LineState, edit: FieldEdit) -> Result<LineState> {
        debug!(?edit, product_id = ?state.product_id, "Applying line edit");

        let change = match edit {
            FieldEdit::Product { product_id } => {
                let product = self.product(product_id).await?;
                let uom = self.uom(product.uom_id).await?;
                let taxes = resolve_taxes(self.taxes.as_ref(), &product.tax_ids).await?;
                FieldChange::ProductSelected {
                    product,
                    uom,
                    taxes,
                }
            }
            FieldEdit::Quantity { quantity } => {
                let uom = if state.has_product() {
                    self.uom(state.uom_id).await?
                } else {
                    None
                };
                FieldChange::QuantityChanged { quantity, uom }
            }
            FieldEdit::Uom { uom_id } => {
                let uom = self.uom(uom_id).await?;
                let product = match state.product_id {
                    Some(product_id) => Some(self.product(product_id).await?),
                    None => None,
                };
                FieldChange::UomChanged { product, uom }
            }
            FieldEdit::Taxes { tax_ids } => FieldChange::TaxesChanged {
                taxes: resolve_taxes(self.taxes.as_ref(), &tax_ids).await?,
            },
            FieldEdit::Discount { discount } => FieldChange::DiscountChanged { discount },
            FieldEdit::PriceUnit { price_unit } => FieldChange::PriceUnitChanged { price_unit },
        };

        let taxes = match &change {
            FieldChange::ProductSelected { .. } | FieldChange::TaxesChanged { .. } => Vec::new(),
            _ => resolve_taxes(self.taxes.as_ref(), &state.tax_ids).await?,
        };

        self.editor.reduce(state, taxes, change)
    }

    async fn product(&self, product_id: i64) -> Result<Product> {
        self.products
            .find_product(product_id)
            .await?
            .ok_or_else(|| AppError::missing_reference(format!("Product {} does not exist", product_id)))
    }

    async fn uom(&self, uom_id: Option<i64>) -> Result<Option<Uom>> {
        match uom_id {
            Some(uom_id) => self
                .products
                .find_uom(uom_id)
                .await?
                .map(Some)
                .ok_or_else(|| AppError::invalid_unit(format!("Unit of measure {} does not exist", uom_id))),
            None => Ok(None),
        }
    }
}
