//! Payroll earnings service
//!
//! Summarizes an employee's payroll runs for a fiscal window and the window
//! one year earlier.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::earnings::{
    aggregate_window, DateFilter, EarningsLookup, FiscalWindow, WindowBounds,
};
use crate::domain::entities::EmployeePayrollRun;

/// Current and prior fiscal window of one summary request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayrollSummary {
    #[serde(rename = "current_fy")]
    pub current: FiscalWindow,
    #[serde(rename = "last_fy")]
    pub prior: FiscalWindow,
}

/// Service for windowed earnings summaries.
pub struct PayrollService {
    lookup: EarningsLookup,
    filter: DateFilter,
}

impl PayrollService {
    pub fn new(lookup: EarningsLookup, filter: DateFilter) -> Self {
        Self { lookup, filter }
    }

    pub fn date_filter(&self) -> DateFilter {
        self.filter
    }

    /// Resolve the current window; missing bounds default to Jan 1 / Dec 31
    /// of `today`'s year.
    pub fn resolve_window(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> ApplicationResult<WindowBounds> {
        let year = WindowBounds::calendar_year(today.year()).ok_or_else(|| {
            ApplicationError::Config {
                message: format!("no calendar year window for {}", today.year()),
            }
        })?;
        let bounds = WindowBounds::new(start.unwrap_or(year.start), end.unwrap_or(year.end))?;
        debug!(start = %bounds.start, end = %bounds.end, "resolved fiscal window");
        Ok(bounds)
    }

    /// Aggregate `current` and the window one year earlier in parallel.
    ///
    /// With `employee` set, only runs of that employee are considered.
    #[instrument(level = "debug", skip(self, runs), fields(run_count = runs.len()))]
    pub fn summarize(
        &self,
        runs: &[EmployeePayrollRun],
        current: WindowBounds,
        employee: Option<&str>,
    ) -> PayrollSummary {
        let selected: Vec<EmployeePayrollRun>;
        let runs = match employee {
            Some(id) => {
                selected = runs
                    .iter()
                    .filter(|run| run.employee.as_deref() == Some(id))
                    .cloned()
                    .collect();
                debug!(employee = id, matched = selected.len(), "filtered runs");
                selected.as_slice()
            }
            None => runs,
        };

        let prior = current.previous_year();
        let (current, prior) = rayon::join(
            || aggregate_window(runs, current, self.filter, &self.lookup),
            || aggregate_window(runs, prior, self.filter, &self.lookup),
        );
        info!(
            current_year = current.year,
            prior_year = prior.year,
            "summarized payroll runs"
        );
        PayrollSummary { current, prior }
    }

    pub fn to_json(summary: &PayrollSummary) -> ApplicationResult<String> {
        serde_json::to_string_pretty(summary).map_err(|e| ApplicationError::OperationFailed {
            context: "serialize payroll summary".to_string(),
            source: Box::new(e),
        })
    }

    /// Human-readable report, current window first.
    pub fn render_text(summary: &PayrollSummary) -> String {
        format!(
            "{}\n{}",
            render_window("Current fiscal year", &summary.current),
            render_window("Last fiscal year", &summary.prior)
        )
    }
}

fn render_window(title: &str, window: &FiscalWindow) -> String {
    let mut lines = vec![
        format!(
            "{} {} ({} .. {})",
            title, window.year, window.start_date, window.end_date
        ),
        format!("  Payroll runs:         {}", window.run_count),
        format!("  Net pay:              {}", window.net_pay_total),
        format!("  Total gross earnings: {}", window.gross_total),
        "  Earnings by type:".to_string(),
    ];
    if window.by_code.is_empty() {
        lines.push("    (none)".to_string());
    }
    lines.extend(window.by_code.values().map(|detail| {
        if detail.label == detail.earning_code {
            format!("    {}: {}", detail.earning_code, detail.amount)
        } else {
            format!(
                "    {} ({}): {}",
                detail.earning_code, detail.label, detail.amount
            )
        }
    }));

    lines.push("  Earnings by category:".to_string());
    if window.by_category.is_empty() {
        lines.push("    (none)".to_string());
    }
    lines.extend(
        window
            .by_category
            .iter()
            .map(|(category, amount)| format!("    {}: {}", category, amount)),
    );

    lines.iter().map(|line| format!("{line}\n")).collect()
}
