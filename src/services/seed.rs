//! Demo data generation.
//!
//! Produces a few months of plausible activity: recurring bills, a monthly
//! salary with the occasional extra income, and scattered daily expenses.
//! A fixed seed makes the output reproducible.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::date_utils::{month_start, PROJECTION_DAY};
use crate::db::queries::transactions;
use crate::error::{AppError, AppResult};
use crate::models::{NewTransaction, TransactionType};

pub const MAX_MONTHS_BACK: u32 = 24;
pub const MAX_APPROX_TOTAL: usize = 5000;

/// Generated batches may exceed the requested size by this much before
/// variable expenses get trimmed.
const OVERSHOOT_ALLOWANCE: usize = 100;

const EXTRA_INCOME_PROBABILITY: f64 = 0.35;
const RECURRING_PREFIX: &str = "Recurring: ";

/// (category, amount in cents, day of month)
const RECURRING_BILLS: [(&str, i64, u32); 5] = [
    ("Rent/Mortgage", 150_000, 1),
    ("Utilities", 12_000, 5),
    ("Subscriptions", 1_999, 9),
    ("Insurance", 8_500, 13),
    ("Utilities", 6_500, 17),
];

/// (category, min, max) with amounts in whole currency units.
const EXPENSE_CATEGORIES: [(&str, i64, i64); 14] = [
    ("Rent/Mortgage", 1200, 2000),
    ("Utilities", 50, 200),
    ("Groceries", 20, 150),
    ("Transportation", 5, 80),
    ("Healthcare", 10, 150),
    ("Insurance", 40, 120),
    ("Dining", 8, 60),
    ("Entertainment", 5, 120),
    ("Shopping", 10, 250),
    ("Travel", 30, 400),
    ("Subscriptions", 5, 30),
    ("Education", 10, 150),
    ("Gifts/Donations", 5, 120),
    ("Fees", 1, 25),
];

const EXTRA_INCOME_CATEGORIES: [&str; 3] = ["Bonus", "Investment", "Refund"];

fn descriptions(category: &str) -> &'static [&'static str] {
    match category {
        "Groceries" => &["SuperMart", "Fresh Foods", "Local Market", "GreenGrocer"],
        "Dining" => &["Bistro Cafe", "Pizza Place", "Sushi Bar", "Steak House"],
        "Transportation" => &["Gas Station", "Ride-share", "Metro Card", "Parking"],
        "Subscriptions" => &["StreamFlix", "Music+", "News Premium", "Cloud Storage"],
        "Entertainment" => &["Cinema", "Concert", "eBooks", "Gaming"],
        "Shopping" => &["Online Store", "Department Store", "Electronics"],
        "Travel" => &["Airline", "Hotel", "Car Rental", "Travel Agent"],
        "Rent/Mortgage" => &["Monthly rent", "Mortgage payment"],
        "Utilities" => &["Electricity", "Water", "Internet", "Mobile"],
        "Healthcare" => &["Pharmacy", "Clinic", "Dental"],
        "Insurance" => &["Auto Insurance", "Home Insurance", "Health Insurance"],
        "Education" => &["Online Course", "Books", "Workshop"],
        "Gifts/Donations" => &["Charity", "Birthday Gift", "Holiday Gift"],
        "Fees" => &["Bank Fee", "ATM Fee", "Service Charge"],
        "Salary" => &["Monthly Salary"],
        "Bonus" => &["Quarterly Bonus"],
        "Investment" => &["Dividend", "Capital Gains"],
        "Refund" => &["Store Refund", "Tax Refund"],
        _ => &["Misc"],
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeedOptions {
    pub months_back: u32,
    pub approx_total: usize,
    /// `None` draws a fresh seed from the OS.
    pub random_seed: Option<u64>,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            months_back: 6,
            approx_total: 500,
            random_seed: Some(42),
        }
    }
}

impl SeedOptions {
    pub fn validate(&self) -> AppResult<()> {
        if self.months_back == 0 || self.months_back > MAX_MONTHS_BACK {
            return Err(AppError::Validation(format!(
                "months_back must be between 1 and {}",
                MAX_MONTHS_BACK
            )));
        }
        if self.approx_total == 0 || self.approx_total > MAX_APPROX_TOTAL {
            return Err(AppError::Validation(format!(
                "approx_total must be between 1 and {}",
                MAX_APPROX_TOTAL
            )));
        }
        Ok(())
    }

    fn rng(&self) -> StdRng {
        match self.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub user_id: i64,
    pub inserted: usize,
    pub total_transactions: i64,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub months: usize,
}

/// Whether an entry survives trimming unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Fixed,
    Variable,
}

fn on_day(month: NaiveDate, day: u32) -> NaiveDate {
    month + Duration::days((day.clamp(1, PROJECTION_DAY) - 1) as i64)
}

fn pick<'a, R: Rng>(rng: &mut R, options: &'a [&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or("Misc")
}

fn entry(
    date: NaiveDate,
    amount_cents: i64,
    category: &str,
    description: String,
    kind: TransactionType,
) -> NewTransaction {
    NewTransaction {
        date,
        amount_cents,
        category: category.to_string(),
        description: Some(description),
        kind,
    }
}

/// First days of the `months_back` months ending with the current one, oldest first.
pub fn month_starts(today: NaiveDate, months_back: u32) -> Vec<NaiveDate> {
    let mut months = Vec::with_capacity(months_back as usize);
    let mut cur = month_start(today);
    for _ in 0..months_back {
        months.push(cur);
        cur = month_start(cur - Duration::days(1));
    }
    months.reverse();
    months
}

fn generate_month<R: Rng>(
    rng: &mut R,
    month: NaiveDate,
    out: &mut Vec<(Origin, NewTransaction)>,
) {
    for (category, cents, day) in RECURRING_BILLS {
        let description = format!("{}{}", RECURRING_PREFIX, pick(rng, descriptions(category)));
        out.push((
            Origin::Fixed,
            entry(on_day(month, day), -cents, category, description, TransactionType::Expense),
        ));
    }

    let salary_day = rng.gen_range(25..=28);
    let salary = rng.gen_range(300_000..=600_000);
    out.push((
        Origin::Fixed,
        entry(
            on_day(month, salary_day),
            salary,
            "Salary",
            pick(rng, descriptions("Salary")).to_string(),
            TransactionType::Income,
        ),
    ));

    if rng.gen_bool(EXTRA_INCOME_PROBABILITY) {
        let category = pick(rng, &EXTRA_INCOME_CATEGORIES);
        let day = rng.gen_range(10..=22);
        let amount = rng.gen_range(10_000..=120_000);
        out.push((
            Origin::Fixed,
            entry(
                on_day(month, day),
                amount,
                category,
                pick(rng, descriptions(category)).to_string(),
                TransactionType::Income,
            ),
        ));
    }

    let day_count = rng.gen_range(18..=24);
    let mut days: Vec<u32> = index::sample(rng, PROJECTION_DAY as usize, day_count)
        .into_iter()
        .map(|i| i as u32 + 1)
        .collect();
    days.sort_unstable();

    for day in days {
        for _ in 0..rng.gen_range(1..=3) {
            let (category, lo, hi) = EXPENSE_CATEGORIES[rng.gen_range(0..EXPENSE_CATEGORIES.len())];
            let amount = rng.gen_range(lo * 100..=hi * 100);
            out.push((
                Origin::Variable,
                entry(
                    on_day(month, day),
                    -amount,
                    category,
                    pick(rng, descriptions(category)).to_string(),
                    TransactionType::Expense,
                ),
            ));
        }
    }
}

/// Keep every fixed entry and sample variable ones down to what is left of
/// `approx_total`. Entries come back in date order.
fn trim<R: Rng>(
    rng: &mut R,
    entries: Vec<(Origin, NewTransaction)>,
    approx_total: usize,
) -> Vec<NewTransaction> {
    let (fixed, variable): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .partition(|(origin, _)| *origin == Origin::Fixed);

    let keep = approx_total.saturating_sub(fixed.len()).min(variable.len());
    let mut picked: Vec<usize> = index::sample(rng, variable.len(), keep).into_vec();
    picked.sort_unstable();

    let mut variable: Vec<Option<NewTransaction>> = variable.into_iter().map(|(_, t)| Some(t)).collect();
    let mut kept: Vec<NewTransaction> = fixed.into_iter().map(|(_, t)| t).collect();
    kept.extend(picked.into_iter().filter_map(|i| variable[i].take()));
    kept.sort_by_key(|t| t.date);
    kept
}

/// Generate the demo batch for the months leading up to `today`.
pub fn generate(options: &SeedOptions, today: NaiveDate) -> (Vec<NewTransaction>, usize) {
    let mut rng = options.rng();
    let months = month_starts(today, options.months_back);

    let mut entries = Vec::new();
    for &month in &months {
        generate_month(&mut rng, month, &mut entries);
    }

    let generated = if entries.len() > options.approx_total + OVERSHOOT_ALLOWANCE {
        tracing::debug!(
            generated = entries.len(),
            approx_total = options.approx_total,
            "Trimming demo batch"
        );
        trim(&mut rng, entries, options.approx_total)
    } else {
        entries.into_iter().map(|(_, t)| t).collect()
    };

    (generated, months.len())
}

/// Replace all of the user's transactions with a freshly generated demo batch.
pub fn load_demo_data(
    conn: &mut Connection,
    user_id: i64,
    options: &SeedOptions,
    today: NaiveDate,
) -> AppResult<SeedReport> {
    options.validate()?;
    let (batch, months) = generate(options, today);

    let tx = conn.transaction()?;
    transactions::delete_all_for_user(&tx, user_id)?;
    for new_transaction in &batch {
        transactions::create_transaction(&tx, user_id, new_transaction)?;
    }
    let total_transactions = transactions::count_for_user(&tx, user_id)?;
    tx.commit()?;

    tracing::info!(user_id, inserted = batch.len(), months, "Loaded demo data");

    Ok(SeedReport {
        user_id,
        inserted: batch.len(),
        total_transactions,
        from: batch.iter().map(|t| t.date).min(),
        to: batch.iter().map(|t| t.date).max(),
        months,
    })
}

pub fn clear_demo_data(conn: &Connection, user_id: i64) -> rusqlite::Result<usize> {
    transactions::delete_all_for_user(conn, user_id)
}
