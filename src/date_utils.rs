use std::str::FromStr;

use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Length of the default trailing window, in days (today included).
pub const TRAILING_WINDOW_DAYS: i64 = 30;

/// Day of month used for projected and clamped dates. Every month has one.
pub const PROJECTION_DAY: u32 = 28;

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Trend bucketing granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
}

impl FromStr for Period {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(()),
        }
    }
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Label of the bucket `date` falls into.
    pub fn bucket_label(&self, date: NaiveDate) -> String {
        match self {
            Self::Day => date.format("%Y-%m-%d").to_string(),
            Self::Week => {
                let week = date.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Self::Month => format!("{:04}-{:02}", date.year(), date.month()),
        }
    }

    /// First date of every bucket overlapping `range`, in order.
    pub fn bucket_starts(&self, range: &DateRange) -> Vec<NaiveDate> {
        let mut starts = Vec::new();
        match self {
            Self::Day => {
                let mut cur = range.start;
                while cur <= range.end {
                    starts.push(cur);
                    cur += Duration::days(1);
                }
            }
            Self::Week => {
                let mut cur = week_start(range.start);
                while cur <= range.end {
                    starts.push(cur);
                    cur += Duration::days(7);
                }
            }
            Self::Month => {
                let mut cur = month_start(range.start);
                let last = month_start(range.end);
                while cur <= last {
                    starts.push(cur);
                    cur = next_month_start(cur);
                }
            }
        }
        starts
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inclusive date range; `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Builds a range from two dates in either order.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a > b {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    /// The 30 days ending on (and including) `end`.
    pub fn trailing(end: NaiveDate) -> Self {
        Self {
            start: end - Duration::days(TRAILING_WINDOW_DAYS - 1),
            end,
        }
    }

    /// Number of calendar days covered, both ends included. Never below 1.
    pub fn days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Resolve an open-ended request into a concrete range and a bucketing period.
    ///
    /// Missing bounds default to a 30-day window ending today (or ending on
    /// `end` when only that is given); a start without an end runs to today.
    /// Without an explicit period, spans of up to 31 days bucket by day and
    /// longer ones by month.
    pub fn normalize(
        period: Option<Period>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> (Period, Self) {
        let range = match (start, end) {
            (None, None) => Self::trailing(today),
            (None, Some(end)) => Self::trailing(end),
            (Some(start), None) => Self::new(start, today),
            (Some(start), Some(end)) => Self::new(start, end),
        };

        let period = period.unwrap_or_else(|| {
            if (range.end - range.start).num_days() <= 31 {
                Period::Day
            } else {
                Period::Month
            }
        });

        (period, range)
    }
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_from_monday = date.weekday().num_days_from_monday();
    date - Duration::days(days_from_monday as i64)
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

pub fn next_month_start(date: NaiveDate) -> NaiveDate {
    month_start(date)
        .checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX)
}

/// Day 28 of the month `months` whole months after the month containing `date`,
/// or `None` past the last representable date.
pub fn months_ahead_on_day_28(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    month_start(date)
        .checked_add_months(Months::new(months))?
        .with_day(PROJECTION_DAY)
}

/// `date` with its day of month capped at 28.
pub fn clamp_to_day_28(date: NaiveDate) -> NaiveDate {
    if date.day() > PROJECTION_DAY {
        month_start(date) + Duration::days((PROJECTION_DAY - 1) as i64)
    } else {
        date
    }
}

/// Parse a strict `YYYY-MM` label into the first day of that month.
pub fn parse_month(month: &str) -> Option<NaiveDate> {
    let bytes = month.as_bytes();
    let well_formed = bytes.len() == 7
        && bytes[4] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || b.is_ascii_digit());
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d").ok()
}
