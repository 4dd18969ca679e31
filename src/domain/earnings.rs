//! Windowed earnings aggregation over employee payroll runs.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::domain::entities::EmployeePayrollRun;
use crate::domain::error::DomainError;

/// Key in the category table whose value overrides the fallback category.
pub const OTHER_EARNINGS_KEY: &str = "Other Allowances or Earnings";

/// Category for codes without a mapping when the table defines none.
pub const DEFAULT_FALLBACK_CATEGORY: &str = "Other Allowances";

/// Which run date decides window membership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFilter {
    /// Period end date of the run
    #[default]
    EndDate,
    /// Check (payment) date, for sources whose end date is unreliable
    CheckDate,
}

impl DateFilter {
    pub fn date_of(&self, run: &EmployeePayrollRun) -> Option<NaiveDate> {
        match self {
            DateFilter::EndDate => run.end_date,
            DateFilter::CheckDate => run.check_date,
        }
    }
}

impl FromStr for DateFilter {
    type Err = String;

    /// Accepts `end_date` / `check_date`, also with dashes.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "end_date" => Ok(DateFilter::EndDate),
            "check_date" => Ok(DateFilter::CheckDate),
            other => Err(format!(
                "unknown date filter '{other}' (expected end_date or check_date)"
            )),
        }
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WindowBounds {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Jan 1 through Dec 31 of `year`.
    pub fn calendar_year(year: i32) -> Option<Self> {
        Some(Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1)?,
            end: NaiveDate::from_ymd_opt(year, 12, 31)?,
        })
    }

    /// The same window one year earlier; Feb 29 maps to Feb 28.
    pub fn previous_year(&self) -> Self {
        let shift = |date: NaiveDate| date.checked_sub_months(Months::new(12)).unwrap_or(date);
        Self {
            start: shift(self.start),
            end: shift(self.end),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Fiscal year label: the year the window ends in.
    pub fn year(&self) -> i32 {
        self.end.year()
    }
}

/// Code→label and code→category tables with the fallback category resolved.
#[derive(Debug, Clone, Default)]
pub struct EarningsLookup {
    labels: HashMap<String, String>,
    categories: HashMap<String, String>,
    fallback_category: String,
}

impl EarningsLookup {
    pub fn new(
        labels: HashMap<String, String>,
        categories: HashMap<String, String>,
        default_fallback: &str,
    ) -> Self {
        let fallback_category = categories
            .get(OTHER_EARNINGS_KEY)
            .cloned()
            .unwrap_or_else(|| default_fallback.to_string());
        Self {
            labels,
            categories,
            fallback_category,
        }
    }

    /// Human label for `code`, or the code itself when unmapped.
    pub fn label<'a>(&'a self, code: &'a str) -> &'a str {
        self.labels.get(code).map(String::as_str).unwrap_or(code)
    }

    pub fn category<'a>(&'a self, code: &'a str) -> &'a str {
        self.categories
            .get(code)
            .map(String::as_str)
            .unwrap_or(self.fallback_category.as_str())
    }

    pub fn fallback_category(&self) -> &str {
        &self.fallback_category
    }
}

/// Summed amount of one earning code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EarningDetail {
    pub earning_code: String,
    pub label: String,
    pub amount: Decimal,
}

/// Aggregated earnings of one inclusive date window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiscalWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub year: i32,
    pub run_count: usize,
    #[serde(rename = "net_pay")]
    pub net_pay_total: Decimal,
    #[serde(rename = "total_gross_earnings")]
    pub gross_total: Decimal,
    #[serde(rename = "earnings_by_type")]
    pub by_code: BTreeMap<String, EarningDetail>,
    #[serde(rename = "earnings_by_category")]
    pub by_category: BTreeMap<String, Decimal>,
}

impl FiscalWindow {
    pub fn empty(bounds: WindowBounds) -> Self {
        Self {
            start_date: bounds.start,
            end_date: bounds.end,
            year: bounds.year(),
            run_count: 0,
            net_pay_total: Decimal::ZERO,
            gross_total: Decimal::ZERO,
            by_code: BTreeMap::new(),
            by_category: BTreeMap::new(),
        }
    }

    pub fn code_total(&self) -> Decimal {
        self.by_code.values().map(|d| d.amount).sum()
    }

    pub fn category_total(&self) -> Decimal {
        self.by_category.values().copied().sum()
    }
}

/// Aggregate the runs whose selected date falls inside `bounds`.
///
/// Runs without the selected date are skipped. Earning lines with a missing
/// or zero amount are skipped entirely; net pay is summed for every selected
/// run regardless of its earnings.
#[instrument(level = "debug", skip(runs, lookup), fields(run_count = runs.len()))]
pub fn aggregate_window(
    runs: &[EmployeePayrollRun],
    bounds: WindowBounds,
    filter: DateFilter,
    lookup: &EarningsLookup,
) -> FiscalWindow {
    let mut window = FiscalWindow::empty(bounds);

    let selected = runs
        .iter()
        .filter(|run| filter.date_of(run).is_some_and(|date| bounds.contains(date)));

    for run in selected {
        window.run_count += 1;
        window.net_pay_total += run.net_pay.unwrap_or_default();

        for earning in &run.earnings {
            let amount = match earning.amount {
                Some(amount) if !amount.is_zero() => amount,
                _ => continue,
            };
            let code = earning.code.as_str();

            window.gross_total += amount;
            window
                .by_code
                .entry(code.to_string())
                .or_insert_with(|| EarningDetail {
                    earning_code: code.to_string(),
                    label: lookup.label(code).to_string(),
                    amount: Decimal::ZERO,
                })
                .amount += amount;
            *window
                .by_category
                .entry(lookup.category(code).to_string())
                .or_insert(Decimal::ZERO) += amount;
        }
    }

    trace!(
        year = window.year,
        selected = window.run_count,
        gross = %window.gross_total,
        "aggregated window"
    );
    window
}
