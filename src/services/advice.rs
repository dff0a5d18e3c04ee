//! Savings advice and goal projections from the last 30 days of activity.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use crate::date_utils::{clamp_to_day_28, months_ahead_on_day_28, DateRange, Period};
use crate::db::queries::{goals, transactions};
use crate::models::money::{cents_to_amount, round2};
use crate::models::{Goal, Transaction};
use crate::services::analytics::{Aggregation, TOP_CATEGORY_COUNT};

/// Suggested cut, in percent, for the top spending categories by rank.
pub const REDUCTION_PCTS: [f64; TOP_CATEGORY_COUNT] = [10.0, 7.0, 5.0, 3.0, 3.0];

/// Days per month assumed when converting between daily and monthly figures.
const DAYS_PER_MONTH: f64 = 30.0;

/// Baseline nets at or below this are treated as no net at all.
const NET_EPSILON: f64 = 1e-6;

/// Income, spend and daily burn over a trailing window.
#[derive(Debug, Clone)]
pub struct Baseline {
    pub range: DateRange,
    pub aggregation: Aggregation,
    /// Spend divided by the days between the first and last transaction.
    pub avg_daily_spend: f64,
}

impl Baseline {
    pub fn from_transactions(range: DateRange, transactions: &[Transaction]) -> Self {
        let aggregation = Aggregation::collect(Period::Day, transactions);
        let avg_daily_spend = match aggregation.activity_days() {
            Some(days) => cents_to_amount(aggregation.expense_cents) / days as f64,
            None => 0.0,
        };
        Self {
            range,
            aggregation,
            avg_daily_spend,
        }
    }

    pub fn income(&self) -> f64 {
        cents_to_amount(self.aggregation.income_cents)
    }

    pub fn expenses(&self) -> f64 {
        cents_to_amount(self.aggregation.expense_cents)
    }

    pub fn net(&self) -> f64 {
        cents_to_amount(self.aggregation.net_cents())
    }
}

fn load_baseline(conn: &Connection, user_id: i64, today: NaiveDate) -> rusqlite::Result<Baseline> {
    let range = DateRange::trailing(today);
    let txs = transactions::list_in_range(conn, user_id, &range)?;
    Ok(Baseline::from_transactions(range, &txs))
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentTotals {
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavingsTargets {
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryReduction {
    pub category: String,
    pub current: f64,
    pub suggested_reduction_pct: f64,
    pub reduced_amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavingsAdvice {
    pub period: Period,
    pub range: DateRange,
    pub current: CurrentTotals,
    pub targets: SavingsTargets,
    pub category_reductions: Vec<CategoryReduction>,
}

/// `period` only labels the response; the window is always the trailing 30 days.
pub fn savings_advice(baseline: &Baseline, period: Period) -> SavingsAdvice {
    let category_reductions: Vec<CategoryReduction> = baseline
        .aggregation
        .categories
        .ranked()
        .into_iter()
        .zip(REDUCTION_PCTS)
        .map(|((category, cents), pct)| {
            let current = cents_to_amount(cents);
            CategoryReduction {
                category,
                current: round2(current),
                suggested_reduction_pct: pct,
                reduced_amount: round2(current * pct / 100.0),
            }
        })
        .collect();

    let reduction_total: f64 = category_reductions.iter().map(|r| r.reduced_amount).sum();
    let income = baseline.income();
    let net = baseline.net();

    let daily_current = if income > 0.0 {
        income / DAYS_PER_MONTH - baseline.avg_daily_spend
    } else {
        -baseline.avg_daily_spend
    };
    let daily_target = daily_current + reduction_total / DAYS_PER_MONTH;

    SavingsAdvice {
        period,
        range: baseline.range,
        current: CurrentTotals {
            income: round2(income),
            expenses: round2(baseline.expenses()),
            net: round2(net),
        },
        targets: SavingsTargets {
            daily: round2(daily_target),
            weekly: round2(daily_target * 7.0),
            monthly: round2(net + reduction_total),
        },
        category_reductions,
    }
}

pub fn compute_savings_advice(
    conn: &Connection,
    user_id: i64,
    period: Option<Period>,
    today: NaiveDate,
) -> rusqlite::Result<SavingsAdvice> {
    let baseline = load_baseline(conn, user_id, today)?;
    tracing::debug!(user_id, categories = baseline.aggregation.categories.len(), "Computing savings advice");
    Ok(savings_advice(&baseline, period.unwrap_or(Period::Month)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    OnTrack,
    Ahead,
    Behind,
    NoNet,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalProjection {
    pub id: i64,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub target_date: Option<NaiveDate>,
    pub remaining: f64,
    pub months_to_target: Option<f64>,
    pub projected_completion: Option<NaiveDate>,
    pub status: GoalStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanBaseline {
    pub monthly_net: f64,
    pub avg_daily_spend: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalsPlan {
    pub range: DateRange,
    pub baseline: PlanBaseline,
    pub goals: Vec<GoalProjection>,
}

/// Whole months needed to cover `months`, rounding any real fraction up.
/// `None` when the count does not fit a `u32`.
fn whole_months(months: f64) -> Option<u32> {
    let whole = months.trunc();
    let whole = if months > 0.0 && months - whole > 1e-9 {
        whole + 1.0
    } else {
        whole
    };
    (whole.is_finite() && (0.0..=u32::MAX as f64).contains(&whole)).then(|| whole as u32)
}

/// Project when `goal` completes if the monthly net keeps up.
///
/// Projected dates land on day 28 and target dates are clamped to day 28
/// before comparing, so late-month targets are judged against the same day.
pub fn project_goal(goal: &Goal, monthly_net: f64, today: NaiveDate) -> GoalProjection {
    let target = cents_to_amount(goal.target_amount_cents);
    let current = cents_to_amount(goal.current_amount_cents);
    let remaining = (target - current).max(0.0);

    let (months_to_target, projected_completion, status) = if monthly_net <= NET_EPSILON {
        (None, None, GoalStatus::NoNet)
    } else {
        let months = if remaining > 0.0 {
            round2(remaining / monthly_net)
        } else {
            0.0
        };
        // Projections past the calendar's range stay open-ended
        let projected =
            whole_months(months).and_then(|whole| months_ahead_on_day_28(today, whole));

        let status = match goal.target_date {
            None => GoalStatus::OnTrack,
            Some(target_date)
                if projected.is_some_and(|p| p <= clamp_to_day_28(target_date)) =>
            {
                GoalStatus::Ahead
            }
            Some(_) if remaining > 0.0 => GoalStatus::Behind,
            Some(_) => GoalStatus::Ahead,
        };
        (Some(months), projected, status)
    };

    GoalProjection {
        id: goal.id,
        name: goal.name.clone(),
        target_amount: round2(target),
        current_amount: round2(current),
        target_date: goal.target_date,
        remaining: round2(remaining),
        months_to_target,
        projected_completion,
        status,
    }
}

pub fn goals_plan(baseline: &Baseline, goals: &[Goal], today: NaiveDate) -> GoalsPlan {
    let monthly_net = baseline.net();
    GoalsPlan {
        range: baseline.range,
        baseline: PlanBaseline {
            monthly_net: round2(monthly_net),
            avg_daily_spend: round2(baseline.avg_daily_spend),
        },
        goals: goals
            .iter()
            .map(|goal| project_goal(goal, monthly_net, today))
            .collect(),
    }
}

pub fn compute_goals_plan(
    conn: &Connection,
    user_id: i64,
    today: NaiveDate,
) -> rusqlite::Result<GoalsPlan> {
    let baseline = load_baseline(conn, user_id, today)?;
    let goals = goals::list_goals(conn, user_id)?;
    tracing::debug!(user_id, goals = goals.len(), "Computing goals plan");
    Ok(goals_plan(&baseline, &goals, today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analytics::tests::{d, expense, income};

    fn goal(id: i64, target_cents: i64, current_cents: i64, target_date: Option<NaiveDate>) -> Goal {
        Goal {
            id,
            user_id: 1,
            name: format!("Goal {id}"),
            target_amount_cents: target_cents,
            current_amount_cents: current_cents,
            target_date,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn baseline(today: NaiveDate, txs: &[Transaction]) -> Baseline {
        Baseline::from_transactions(DateRange::trailing(today), txs)
    }

    #[test]
    fn test_reductions_follow_rank_table() {
        let today = d(2024, 3, 31);
        let txs = vec![
            expense(1, d(2024, 3, 2), -10_000, "Rent"),
            expense(2, d(2024, 3, 3), -5_000, "Food"),
            expense(3, d(2024, 3, 4), -4_000, "Fun"),
            expense(4, d(2024, 3, 5), -3_000, "Car"),
            expense(5, d(2024, 3, 6), -2_000, "Gym"),
            expense(6, d(2024, 3, 7), -1_000, "Books"),
        ];
        let advice = savings_advice(&baseline(today, &txs), Period::Month);

        assert_eq!(advice.category_reductions.len(), 5);
        let pcts: Vec<f64> = advice
            .category_reductions
            .iter()
            .map(|r| r.suggested_reduction_pct)
            .collect();
        assert_eq!(pcts, REDUCTION_PCTS.to_vec());

        let amounts: Vec<f64> = advice
            .category_reductions
            .iter()
            .map(|r| r.reduced_amount)
            .collect();
        assert_eq!(amounts, vec![10.0, 3.5, 2.0, 0.9, 0.6]);
        assert_eq!(advice.targets.monthly, -250.0 + 17.0);
    }

    #[test]
    fn test_income_only_window() {
        let today = d(2024, 3, 31);
        let txs = vec![income(1, d(2024, 3, 15), 500_000, "Salary")];
        let advice = savings_advice(&baseline(today, &txs), Period::Week);

        assert!(advice.category_reductions.is_empty());
        assert_eq!(advice.period, Period::Week);
        assert_eq!(advice.current.income, 5000.0);
        assert_eq!(advice.current.net, 5000.0);
        assert_eq!(advice.targets.daily, 166.67);
        assert_eq!(advice.targets.weekly, 1166.67);
        assert_eq!(advice.targets.monthly, 5000.0);
    }

    #[test]
    fn test_avg_daily_spend_uses_activity_span() {
        let today = d(2024, 3, 31);
        let txs = vec![
            expense(1, d(2024, 3, 10), -3_000, "Food"),
            expense(2, d(2024, 3, 12), -3_000, "Food"),
        ];
        let base = baseline(today, &txs);
        assert!((base.avg_daily_spend - 20.0).abs() < 1e-9);

        let empty = baseline(today, &[]);
        assert_eq!(empty.avg_daily_spend, 0.0);
    }

    #[test]
    fn test_goal_projection_whole_months() {
        let today = d(2024, 1, 15);
        let projection = project_goal(&goal(1, 120_000, 0, None), 400.0, today);

        assert_eq!(projection.months_to_target, Some(3.0));
        assert_eq!(projection.projected_completion, Some(d(2024, 4, 28)));
        assert_eq!(projection.status, GoalStatus::OnTrack);
        assert_eq!(projection.remaining, 1200.0);
    }

    #[test]
    fn test_goal_projection_rounds_partial_months_up() {
        let today = d(2024, 11, 3);
        let projection = project_goal(&goal(1, 100_000, 0, None), 400.0, today);

        assert_eq!(projection.months_to_target, Some(2.5));
        assert_eq!(projection.projected_completion, Some(d(2025, 2, 28)));
    }

    #[test]
    fn test_goal_status_against_target_date() {
        let today = d(2024, 1, 15);

        // Target on the 31st is clamped to the 28th, so a day-28 projection is ahead
        let ahead = project_goal(&goal(1, 120_000, 0, Some(d(2024, 4, 30))), 400.0, today);
        assert_eq!(ahead.status, GoalStatus::Ahead);

        let behind = project_goal(&goal(2, 120_000, 0, Some(d(2024, 3, 31))), 400.0, today);
        assert_eq!(behind.status, GoalStatus::Behind);

        let reached = project_goal(&goal(3, 50_000, 60_000, Some(d(2023, 6, 1))), 400.0, today);
        assert_eq!(reached.remaining, 0.0);
        assert_eq!(reached.months_to_target, Some(0.0));
        assert_eq!(reached.projected_completion, Some(d(2024, 1, 28)));
        assert_eq!(reached.status, GoalStatus::Ahead);
    }

    #[test]
    fn test_no_net_baseline() {
        let today = d(2024, 3, 31);
        let txs = vec![
            income(1, d(2024, 3, 1), 10_000, "Salary"),
            expense(2, d(2024, 3, 2), -10_000, "Rent"),
        ];
        let plan = goals_plan(
            &baseline(today, &txs),
            &[goal(1, 100_000, 0, None), goal(2, 5_000, 0, Some(d(2024, 6, 1)))],
            today,
        );

        assert_eq!(plan.baseline.monthly_net, 0.0);
        assert_eq!(plan.goals.len(), 2);
        for projection in &plan.goals {
            assert_eq!(projection.status, GoalStatus::NoNet);
            assert!(projection.months_to_target.is_none());
            assert!(projection.projected_completion.is_none());
        }
    }

    #[test]
    fn test_whole_months() {
        assert_eq!(whole_months(0.0), Some(0));
        assert_eq!(whole_months(3.0), Some(3));
        assert_eq!(whole_months(2.01), Some(3));
        assert_eq!(whole_months(1e12), None);
        assert_eq!(whole_months(f64::INFINITY), None);
    }

    #[test]
    fn test_goal_projection_beyond_calendar() {
        let today = d(2024, 1, 15);

        // 1,000,000 at 0.01 a month is 1e8 months away
        let open_ended = project_goal(&goal(1, 100_000_000, 0, None), 0.01, today);
        assert_eq!(open_ended.months_to_target, Some(100_000_000.0));
        assert_eq!(open_ended.projected_completion, None);
        assert_eq!(open_ended.status, GoalStatus::OnTrack);

        let dated = project_goal(&goal(2, 100_000_000, 0, Some(d(2030, 1, 1))), 0.01, today);
        assert_eq!(dated.projected_completion, None);
        assert_eq!(dated.status, GoalStatus::Behind);
    }
}
