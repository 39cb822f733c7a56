use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a tax's `amount` is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountType {
    /// `amount` is a percentage of the (possibly chained) base
    Percent,
    /// `amount` is a fixed value charged per unit of quantity
    Fixed,
}

impl std::fmt::Display for AmountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmountType::Percent => write!(f, "percent"),
            AmountType::Fixed => write!(f, "fixed"),
        }
    }
}

impl std::str::FromStr for AmountType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "percent" => Ok(AmountType::Percent),
            "fixed" => Ok(AmountType::Fixed),
            _ => Err(format!("Invalid tax amount type: {}", s)),
        }
    }
}

/// Document kind a tax may be selected on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxUse {
    Sale,
    Purchase,
    None,
}

impl std::fmt::Display for TaxUse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaxUse::Sale => write!(f, "sale"),
            TaxUse::Purchase => write!(f, "purchase"),
            TaxUse::None => write!(f, "none"),
        }
    }
}

impl std::str::FromStr for TaxUse {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "sale" => Ok(TaxUse::Sale),
            "purchase" => Ok(TaxUse::Purchase),
            "none" => Ok(TaxUse::None),
            _ => Err(format!("Invalid tax use: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tax {
    pub id: i64,
    pub name: String,

    /// Rate in percent for `Percent` taxes, fixed value per unit for `Fixed` taxes
    pub amount: Decimal,
    pub amount_type: AmountType,

    /// Position in the tax sequence of a line (ascending)
    pub sort: i32,

    /// Base is enlarged by prior taxes flagged `include_base_amount`
    pub is_base_affected: bool,

    /// This tax's amount is added to the base of subsequent affected taxes
    pub include_base_amount: bool,

    pub tax_group_id: Option<i64>,
    pub type_tax_use: TaxUse,
}

impl Tax {
    /// Plain percentage tax that neither chains nor is chained
    pub fn percent(id: i64, name: impl Into<String>, rate: Decimal, sort: i32) -> Self {
        Self {
            id,
            name: name.into(),
            amount: rate,
            amount_type: AmountType::Percent,
            sort,
            is_base_affected: false,
            include_base_amount: false,
            tax_group_id: None,
            type_tax_use: TaxUse::Purchase,
        }
    }

    /// Fixed amount charged per unit of quantity
    pub fn fixed(id: i64, name: impl Into<String>, amount: Decimal, sort: i32) -> Self {
        Self {
            amount_type: AmountType::Fixed,
            ..Self::percent(id, name, amount, sort)
        }
    }

    pub fn with_base_affected(mut self, is_base_affected: bool) -> Self {
        self.is_base_affected = is_base_affected;
        self
    }

    pub fn with_include_base_amount(mut self, include_base_amount: bool) -> Self {
        self.include_base_amount = include_base_amount;
        self
    }

    pub fn with_group(mut self, tax_group_id: i64) -> Self {
        self.tax_group_id = Some(tax_group_id);
        self
    }

    pub fn with_use(mut self, type_tax_use: TaxUse) -> Self {
        self.type_tax_use = type_tax_use;
        self
    }

    pub fn is_percentage(&self) -> bool {
        self.amount_type == AmountType::Percent
    }
}

/// Display grouping of taxes on document summaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxGroup {
    pub id: i64,
    pub name: String,
    pub sequence: i32,
}
