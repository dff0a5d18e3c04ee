use serde::{Deserialize, Serialize};

use crate::models::money::as_amount;

/// A monthly spending limit for one category. Unique per (user, month, category).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    /// `YYYY-MM`
    pub month: String,
    pub category: String,
    #[serde(rename = "amount", with = "as_amount")]
    pub amount_cents: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBudget {
    pub month: String,
    pub category: String,
    #[serde(rename = "amount", with = "as_amount")]
    pub amount_cents: i64,
}
