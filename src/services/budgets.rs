//! Budget utilization: spent versus budgeted amounts per category for one month.

use std::collections::{HashMap, HashSet};

use rusqlite::Connection;
use serde::Serialize;

use crate::date_utils::{next_month_start, parse_month};
use crate::db::queries::{budgets, transactions};
use crate::error::{AppError, AppResult};
use crate::models::money::{cents_to_amount, round2};
use crate::models::Budget;

pub const WARNING_THRESHOLD_PCT: f64 = 90.0;
pub const CRITICAL_THRESHOLD_PCT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

impl Severity {
    pub fn classify(utilization_pct: f64) -> Self {
        if utilization_pct >= CRITICAL_THRESHOLD_PCT {
            Severity::Critical
        } else if utilization_pct >= WARNING_THRESHOLD_PCT {
            Severity::Warning
        } else {
            Severity::Normal
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetUtilization {
    pub month: String,
    pub category: String,
    pub budget: f64,
    pub spent: f64,
    pub utilization_pct: f64,
    pub severity: Severity,
    #[serde(skip)]
    budget_cents: i64,
    #[serde(skip)]
    spent_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UtilizationReport {
    pub month: String,
    pub items: Vec<BudgetUtilization>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetTotals {
    pub budget: f64,
    pub spent: f64,
    pub utilization_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetSummary {
    pub month: String,
    pub items: Vec<BudgetUtilization>,
    pub totals: BudgetTotals,
}

fn percent(spent_cents: i64, budget_cents: i64) -> f64 {
    if budget_cents > 0 {
        round2(spent_cents as f64 / budget_cents as f64 * 100.0)
    } else {
        0.0
    }
}

/// One item per budgeted category, followed by one per category that has
/// spending but no budget. `spent` holds signed expense sums per category.
pub fn utilization_items(
    month: &str,
    budgets: &[Budget],
    spent: &[(String, i64)],
) -> Vec<BudgetUtilization> {
    let spent_by_category: HashMap<&str, i64> = spent
        .iter()
        .map(|(category, cents)| (category.as_str(), cents.saturating_abs()))
        .collect();

    let mut covered = HashSet::new();
    let mut items = Vec::with_capacity(budgets.len() + spent.len());

    for budget in budgets {
        let spent_cents = spent_by_category
            .get(budget.category.as_str())
            .copied()
            .unwrap_or(0);
        let utilization_pct = percent(spent_cents, budget.amount_cents);
        items.push(BudgetUtilization {
            month: month.to_string(),
            category: budget.category.clone(),
            budget: round2(cents_to_amount(budget.amount_cents)),
            spent: round2(cents_to_amount(spent_cents)),
            utilization_pct,
            severity: Severity::classify(utilization_pct),
            budget_cents: budget.amount_cents,
            spent_cents,
        });
        covered.insert(budget.category.as_str());
    }

    for (category, cents) in spent {
        if covered.contains(category.as_str()) {
            continue;
        }
        let spent_cents = cents.saturating_abs();
        items.push(BudgetUtilization {
            month: month.to_string(),
            category: category.clone(),
            budget: 0.0,
            spent: round2(cents_to_amount(spent_cents)),
            utilization_pct: 0.0,
            severity: Severity::Normal,
            budget_cents: 0,
            spent_cents,
        });
    }

    items
}

/// Highest utilization first, then by category name ignoring case.
pub fn sort_by_utilization(items: &mut [BudgetUtilization]) {
    items.sort_by(|a, b| {
        b.utilization_pct
            .total_cmp(&a.utilization_pct)
            .then_with(|| a.category.to_lowercase().cmp(&b.category.to_lowercase()))
    });
}

pub fn summarize(month: &str, mut items: Vec<BudgetUtilization>) -> BudgetSummary {
    items.sort_by_key(|item| item.category.to_lowercase());

    let budget_cents = items
        .iter()
        .fold(0i64, |acc, i| acc.saturating_add(i.budget_cents));
    let spent_cents = items
        .iter()
        .fold(0i64, |acc, i| acc.saturating_add(i.spent_cents));

    BudgetSummary {
        month: month.to_string(),
        items,
        totals: BudgetTotals {
            budget: round2(cents_to_amount(budget_cents)),
            spent: round2(cents_to_amount(spent_cents)),
            utilization_pct: percent(spent_cents, budget_cents),
        },
    }
}

fn load_items(conn: &Connection, user_id: i64, month: &str) -> AppResult<Vec<BudgetUtilization>> {
    let start = parse_month(month)
        .ok_or_else(|| AppError::Validation("month must be in YYYY-MM format".into()))?;
    let end = next_month_start(start);

    let budgets = budgets::list_for_month(conn, user_id, month)?;
    let spent = transactions::expense_sums_by_category(conn, user_id, start, end)?;
    tracing::debug!(
        user_id,
        month,
        budgets = budgets.len(),
        categories = spent.len(),
        "Computing budget utilization"
    );

    Ok(utilization_items(month, &budgets, &spent))
}

/// Per-category utilization for `month`, most utilized first.
pub fn compute_utilization(conn: &Connection, user_id: i64, month: &str) -> AppResult<UtilizationReport> {
    let mut items = load_items(conn, user_id, month)?;
    sort_by_utilization(&mut items);
    Ok(UtilizationReport {
        month: month.to_string(),
        items,
    })
}

/// Per-category utilization for `month` in name order, with month totals.
pub fn compute_summary(conn: &Connection, user_id: i64, month: &str) -> AppResult<BudgetSummary> {
    let items = load_items(conn, user_id, month)?;
    Ok(summarize(month, items))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(category: &str, amount_cents: i64) -> Budget {
        Budget {
            id: 0,
            user_id: 1,
            month: "2024-03".into(),
            category: category.into(),
            amount_cents,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn item<'a>(items: &'a [BudgetUtilization], category: &str) -> &'a BudgetUtilization {
        items
            .iter()
            .find(|i| i.category == category)
            .expect("category present")
    }

    #[test]
    fn test_severity_thresholds() {
        assert_eq!(Severity::classify(0.0), Severity::Normal);
        assert_eq!(Severity::classify(89.99), Severity::Normal);
        assert_eq!(Severity::classify(90.0), Severity::Warning);
        assert_eq!(Severity::classify(99.99), Severity::Warning);
        assert_eq!(Severity::classify(100.0), Severity::Critical);
        assert_eq!(Severity::classify(250.0), Severity::Critical);
    }

    #[test]
    fn test_over_and_near_budget() {
        let budgets = vec![budget("Dining", 30_000), budget("Groceries", 30_000)];
        let spent = vec![
            ("Dining".to_string(), -27_000),
            ("Groceries".to_string(), -33_000),
        ];
        let items = utilization_items("2024-03", &budgets, &spent);

        let groceries = item(&items, "Groceries");
        assert_eq!(groceries.utilization_pct, 110.0);
        assert_eq!(groceries.severity, Severity::Critical);
        assert_eq!(groceries.spent, 330.0);

        let dining = item(&items, "Dining");
        assert_eq!(dining.utilization_pct, 90.0);
        assert_eq!(dining.severity, Severity::Warning);
    }

    #[test]
    fn test_unbudgeted_spend_and_unspent_budget() {
        let budgets = vec![budget("Travel", 50_000), budget("Free", 0)];
        let spent = vec![("Free".to_string(), 1_000), ("Gifts".to_string(), -4_500)];
        let items = utilization_items("2024-03", &budgets, &spent);
        assert_eq!(items.len(), 3);

        let gifts = item(&items, "Gifts");
        assert_eq!(gifts.budget, 0.0);
        assert_eq!(gifts.spent, 45.0);
        assert_eq!(gifts.utilization_pct, 0.0);
        assert_eq!(gifts.severity, Severity::Normal);

        let free = item(&items, "Free");
        assert_eq!(free.utilization_pct, 0.0);
        assert_eq!(free.spent, 10.0);

        let travel = item(&items, "Travel");
        assert_eq!(travel.spent, 0.0);
        assert_eq!(travel.severity, Severity::Normal);
    }

    #[test]
    fn test_sort_by_utilization_breaks_ties_by_name() {
        let budgets = vec![
            budget("beta", 10_000),
            budget("Alpha", 10_000),
            budget("Gamma", 10_000),
        ];
        let spent = vec![
            ("Alpha".to_string(), -5_000),
            ("beta".to_string(), -5_000),
            ("Gamma".to_string(), -12_000),
        ];
        let mut items = utilization_items("2024-03", &budgets, &spent);
        sort_by_utilization(&mut items);

        let order: Vec<&str> = items.iter().map(|i| i.category.as_str()).collect();
        assert_eq!(order, vec!["Gamma", "Alpha", "beta"]);
    }

    #[test]
    fn test_summary_totals_and_order() {
        let budgets = vec![budget("rent", 100_000), budget("Food", 20_000)];
        let spent = vec![
            ("Food".to_string(), -10_000),
            ("rent".to_string(), -100_000),
            ("Books".to_string(), -2_000),
        ];
        let summary = summarize("2024-03", utilization_items("2024-03", &budgets, &spent));

        let order: Vec<&str> = summary.items.iter().map(|i| i.category.as_str()).collect();
        assert_eq!(order, vec!["Books", "Food", "rent"]);
        assert_eq!(summary.totals.budget, 1200.0);
        assert_eq!(summary.totals.spent, 1120.0);
        assert_eq!(summary.totals.utilization_pct, 93.33);
    }

    #[test]
    fn test_summary_without_budgets() {
        let summary = summarize("2024-03", utilization_items("2024-03", &[], &[]));
        assert!(summary.items.is_empty());
        assert_eq!(summary.totals.budget, 0.0);
        assert_eq!(summary.totals.utilization_pct, 0.0);
    }
}
