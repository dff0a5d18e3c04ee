use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::money::{as_amount, as_optional_amount};

/// Stored direction label of a transaction row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[default]
    Expense,
    Income,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Expense => "expense",
            TransactionType::Income => "income",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Some(TransactionType::Expense),
            "income" => Some(TransactionType::Income),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    #[serde(rename = "amount", with = "as_amount")]
    pub amount_cents: i64,
    pub category: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    pub date: NaiveDate,
    #[serde(rename = "amount", with = "as_amount")]
    pub amount_cents: i64,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: TransactionType,
}

/// Partial update payload; only provided fields are changed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionUpdate {
    pub date: Option<NaiveDate>,
    #[serde(rename = "amount", default, with = "as_optional_amount")]
    pub amount_cents: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
}

impl TransactionUpdate {
    pub fn apply_to(self, existing: &Transaction) -> NewTransaction {
        NewTransaction {
            date: self.date.unwrap_or(existing.date),
            amount_cents: self.amount_cents.unwrap_or(existing.amount_cents),
            category: self.category.unwrap_or_else(|| existing.category.clone()),
            description: self.description.or_else(|| existing.description.clone()),
            kind: self.kind.unwrap_or(existing.kind),
        }
    }
}
