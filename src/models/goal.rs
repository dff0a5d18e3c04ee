use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::money::{as_amount, as_optional_amount};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    #[serde(rename = "target_amount", with = "as_amount")]
    pub target_amount_cents: i64,
    #[serde(rename = "current_amount", with = "as_amount")]
    pub current_amount_cents: i64,
    pub target_date: Option<NaiveDate>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGoal {
    pub name: String,
    #[serde(rename = "target_amount", with = "as_amount")]
    pub target_amount_cents: i64,
    #[serde(rename = "current_amount", default, with = "as_amount")]
    pub current_amount_cents: i64,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalUpdate {
    pub name: Option<String>,
    #[serde(rename = "target_amount", default, with = "as_optional_amount")]
    pub target_amount_cents: Option<i64>,
    #[serde(rename = "current_amount", default, with = "as_optional_amount")]
    pub current_amount_cents: Option<i64>,
    pub target_date: Option<NaiveDate>,
}

impl GoalUpdate {
    pub fn apply_to(self, existing: &Goal) -> NewGoal {
        NewGoal {
            name: self.name.unwrap_or_else(|| existing.name.clone()),
            target_amount_cents: self
                .target_amount_cents
                .unwrap_or(existing.target_amount_cents),
            current_amount_cents: self
                .current_amount_cents
                .unwrap_or(existing.current_amount_cents),
            target_date: self.target_date.or(existing.target_date),
        }
    }
}
