use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Due-date rule of a payment term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueTerm {
    pub nb_days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTerm {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub due_term: Option<DueTerm>,
}

impl PaymentTerm {
    pub fn new(id: i64, name: impl Into<String>, nb_days: Option<u32>) -> Self {
        Self {
            id,
            name: name.into(),
            due_term: nb_days.map(|nb_days| DueTerm { nb_days }),
        }
    }

    /// Maturity of the receivable/payable for a document due on `due_date`.
    ///
    /// A due term with zero days leaves the date unchanged.
    pub fn maturity_from(&self, due_date: NaiveDate) -> NaiveDate {
        match self.due_term {
            Some(DueTerm { nb_days }) if nb_days > 0 => due_date
                .checked_add_days(Days::new(u64::from(nb_days)))
                .unwrap_or(due_date),
            _ => due_date,
        }
    }
}
