//! Spending analytics over a user's transactions: totals, trend series,
//! category breakdown and simple behavioral insights.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::date_utils::{DateRange, Period};
use crate::db::queries::transactions;
use crate::models::money::{cents_to_amount, round2};
use crate::models::{Transaction, TransactionType};

/// How many categories the behavior and advice views rank.
pub const TOP_CATEGORY_COUNT: usize = 5;

/// Direction of money flow for a transaction.
///
/// The stored `type` is authoritative for income, but a positive amount also
/// counts as income regardless of its label. Everything else is an expense
/// whose magnitude is the absolute amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Income,
    Expense,
}

impl Direction {
    pub fn of(transaction: &Transaction) -> Self {
        if transaction.kind == TransactionType::Income || transaction.amount_cents > 0 {
            Direction::Income
        } else {
            Direction::Expense
        }
    }
}

/// A transaction reduced to what aggregation needs.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    pub date: NaiveDate,
    pub category: &'a str,
    pub direction: Direction,
    /// Income keeps its stored sign; expenses are absolute.
    pub cents: i64,
}

impl<'a> From<&'a Transaction> for Entry<'a> {
    fn from(transaction: &'a Transaction) -> Self {
        let direction = Direction::of(transaction);
        let cents = match direction {
            Direction::Income => transaction.amount_cents,
            Direction::Expense => transaction.amount_cents.saturating_abs(),
        };
        Self {
            date: transaction.date,
            category: &transaction.category,
            direction,
            cents,
        }
    }
}

/// Per-category totals that remember the order categories were first seen in.
///
/// Rankings are stable: categories with equal totals keep first-seen order.
#[derive(Debug, Clone, Default)]
pub struct CategoryTotals {
    totals: Vec<(String, i64)>,
    index: HashMap<String, usize>,
}

impl CategoryTotals {
    pub fn add(&mut self, category: &str, cents: i64) {
        match self.index.get(category) {
            Some(&i) => self.totals[i].1 = self.totals[i].1.saturating_add(cents),
            None => {
                self.index.insert(category.to_string(), self.totals.len());
                self.totals.push((category.to_string(), cents));
            }
        }
    }

    pub fn get(&self, category: &str) -> Option<i64> {
        self.index.get(category).map(|&i| self.totals[i].1)
    }

    pub fn total(&self) -> i64 {
        self.totals
            .iter()
            .fold(0i64, |acc, (_, c)| acc.saturating_add(*c))
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Largest totals first.
    pub fn ranked(&self) -> Vec<(String, i64)> {
        let mut ranked = self.totals.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// Sorted by category name, ignoring case.
    pub fn by_name(&self) -> Vec<(String, i64)> {
        let mut sorted = self.totals.clone();
        sorted.sort_by_key(|(name, _)| name.to_lowercase());
        sorted
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketTotals {
    pub income_cents: i64,
    pub expense_cents: i64,
}

/// Transactions of one range, split by direction and summed by category,
/// day and trend bucket.
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub period: Period,
    pub income_cents: i64,
    pub expense_cents: i64,
    pub categories: CategoryTotals,
    pub buckets: HashMap<String, BucketTotals>,
    pub daily_expenses: BTreeMap<NaiveDate, i64>,
    pub income_days: BTreeSet<NaiveDate>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl Aggregation {
    /// `transactions` must be ordered by date then id.
    pub fn collect(period: Period, transactions: &[Transaction]) -> Self {
        let mut agg = Self {
            period,
            income_cents: 0,
            expense_cents: 0,
            categories: CategoryTotals::default(),
            buckets: HashMap::new(),
            daily_expenses: BTreeMap::new(),
            income_days: BTreeSet::new(),
            first_date: transactions.first().map(|t| t.date),
            last_date: transactions.last().map(|t| t.date),
        };

        for entry in transactions.iter().map(Entry::from) {
            let bucket = agg
                .buckets
                .entry(period.bucket_label(entry.date))
                .or_default();
            match entry.direction {
                Direction::Income => {
                    agg.income_cents = agg.income_cents.saturating_add(entry.cents);
                    bucket.income_cents = bucket.income_cents.saturating_add(entry.cents);
                    agg.income_days.insert(entry.date);
                }
                Direction::Expense => {
                    agg.expense_cents = agg.expense_cents.saturating_add(entry.cents);
                    bucket.expense_cents = bucket.expense_cents.saturating_add(entry.cents);
                    agg.categories.add(entry.category, entry.cents);
                    let day = agg.daily_expenses.entry(entry.date).or_insert(0);
                    *day = day.saturating_add(entry.cents);
                }
            }
        }

        agg
    }

    pub fn net_cents(&self) -> i64 {
        self.income_cents.saturating_sub(self.expense_cents)
    }

    /// Days from the first to the last transaction, both included.
    /// `None` when there were no transactions.
    pub fn activity_days(&self) -> Option<i64> {
        match (self.first_date, self.last_date) {
            (Some(first), Some(last)) => Some(((last - first).num_days() + 1).max(1)),
            _ => None,
        }
    }

    fn bucket(&self, label: &str) -> BucketTotals {
        self.buckets.get(label).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Totals {
    pub income: f64,
    pub expenses: f64,
    pub net_cash_flow: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub period: String,
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
}

/// Category → spent amount, serialized as a JSON object whose keys keep
/// case-insensitive name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryBreakdown(pub Vec<(String, f64)>);

impl CategoryBreakdown {
    pub fn get(&self, category: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, amount)| *amount)
    }
}

impl Serialize for CategoryBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (category, amount) in &self.0 {
            map.serialize_entry(category, amount)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub range: DateRange,
    pub period: Period,
    pub totals: Totals,
    pub savings_rate: f64,
    pub avg_daily_spend: f64,
    pub category_breakdown: CategoryBreakdown,
    pub trend: Vec<TrendPoint>,
    /// Share of total spend per category, in percent. Not part of the response.
    #[serde(skip)]
    pub category_percentages: CategoryBreakdown,
}

pub fn summarize(period: Period, range: DateRange, transactions: &[Transaction]) -> SummaryReport {
    let agg = Aggregation::collect(period, transactions);

    let income = cents_to_amount(agg.income_cents);
    let net = cents_to_amount(agg.net_cents());
    let savings_rate = if agg.income_cents > 0 {
        net / income * 100.0
    } else {
        0.0
    };
    let avg_daily_spend = cents_to_amount(agg.expense_cents) / range.days() as f64;

    let trend = period
        .bucket_starts(&range)
        .into_iter()
        .map(|start| {
            let label = period.bucket_label(start);
            let bucket = agg.bucket(&label);
            TrendPoint {
                period: label,
                income: round2(cents_to_amount(bucket.income_cents)),
                expenses: round2(cents_to_amount(bucket.expense_cents)),
                net: round2(cents_to_amount(
                    bucket.income_cents.saturating_sub(bucket.expense_cents),
                )),
            }
        })
        .collect();

    let by_name = agg.categories.by_name();
    let category_total = agg.categories.total();
    let category_breakdown = CategoryBreakdown(
        by_name
            .iter()
            .map(|(name, cents)| (name.clone(), round2(cents_to_amount(*cents))))
            .collect(),
    );
    let category_percentages = CategoryBreakdown(
        by_name
            .iter()
            .map(|(name, cents)| {
                let share = if category_total > 0 {
                    *cents as f64 / category_total as f64 * 100.0
                } else {
                    0.0
                };
                (name.clone(), round2(share))
            })
            .collect(),
    );

    SummaryReport {
        range,
        period,
        totals: Totals {
            income: round2(income),
            expenses: round2(cents_to_amount(agg.expense_cents)),
            net_cash_flow: round2(net),
        },
        savings_rate: round2(savings_rate),
        avg_daily_spend: round2(avg_daily_spend),
        category_breakdown,
        trend,
        category_percentages,
    }
}

/// Summary analytics for `user_id` over the normalized request range.
pub fn compute_summary(
    conn: &Connection,
    user_id: i64,
    period: Option<Period>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> rusqlite::Result<SummaryReport> {
    let (period, range) = DateRange::normalize(period, start, end, today);
    let txs = transactions::list_in_range(conn, user_id, &range)?;
    tracing::debug!(user_id, %period, start = %range.start, end = %range.end, count = txs.len(), "Computing summary");
    Ok(summarize(period, range, &txs))
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpensiveDay {
    pub date: NaiveDate,
    pub total_spent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BehaviorReport {
    pub range: DateRange,
    pub top_spending_categories: Vec<CategoryAmount>,
    pub most_expensive_day: Option<ExpensiveDay>,
    pub income_days_count: usize,
}

pub fn behaviors(range: DateRange, transactions: &[Transaction]) -> BehaviorReport {
    let agg = Aggregation::collect(Period::Day, transactions);

    let top_spending_categories = agg
        .categories
        .ranked()
        .into_iter()
        .take(TOP_CATEGORY_COUNT)
        .map(|(category, cents)| CategoryAmount {
            category,
            amount: round2(cents_to_amount(cents)),
        })
        .collect();

    // Earliest day wins ties
    let mut most_expensive: Option<(NaiveDate, i64)> = None;
    for (&date, &cents) in &agg.daily_expenses {
        if most_expensive.map_or(true, |(_, best)| cents > best) {
            most_expensive = Some((date, cents));
        }
    }

    BehaviorReport {
        range,
        top_spending_categories,
        most_expensive_day: most_expensive.map(|(date, cents)| ExpensiveDay {
            date,
            total_spent: round2(cents_to_amount(cents)),
        }),
        income_days_count: agg.income_days.len(),
    }
}

pub fn compute_behaviors(
    conn: &Connection,
    user_id: i64,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> rusqlite::Result<BehaviorReport> {
    let (_, range) = DateRange::normalize(None, start, end, today);
    let txs = transactions::list_in_range(conn, user_id, &range)?;
    tracing::debug!(user_id, start = %range.start, end = %range.end, count = txs.len(), "Computing behaviors");
    Ok(behaviors(range, &txs))
}
