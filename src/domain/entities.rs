//! Domain entities: records as delivered by the unified HRIS API

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Partition assigned to groups that carry no `type`.
pub const UNKNOWN_PARTITION: &str = "UNKNOWN";

/// A record that references its parent by id.
///
/// This is the only contract the hierarchy builder relies on. Records that
/// segregate into independent hierarchies (e.g. groups by type) override
/// [`HierarchyRecord::partition_key`].
pub trait HierarchyRecord {
    /// Unique identifier of this record.
    fn record_id(&self) -> &str;

    /// Id of the parent record, if any.
    fn parent_ref(&self) -> Option<&str>;

    /// Classification used to split one input into several forests.
    fn partition_key(&self) -> Option<&str> {
        None
    }
}

/// Organizational group (team, department, cost center, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    pub id: String,
    pub remote_id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub group_type: Option<String>,
    pub parent_group: Option<String>,
    pub is_commonly_used_as_team: Option<bool>,
}

impl HierarchyRecord for Group {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn parent_ref(&self) -> Option<&str> {
        non_blank(self.parent_group.as_deref())
    }

    fn partition_key(&self) -> Option<&str> {
        non_blank(self.group_type.as_deref())
    }
}

/// Employee with an optional reporting line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Employee {
    pub id: String,
    pub remote_id: Option<String>,
    pub employee_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub preferred_name: Option<String>,
    pub display_full_name: Option<String>,
    pub work_email: Option<String>,
    pub personal_email: Option<String>,
    pub job_title: Option<String>,
    pub employment_status: Option<String>,
    pub manager: Option<String>,
}

impl HierarchyRecord for Employee {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn parent_ref(&self) -> Option<&str> {
        non_blank(self.manager.as_deref())
    }
}

/// Single earning line of a payroll run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Earning {
    pub id: Option<String>,
    /// Earning code as reported by the upstream payroll system
    #[serde(rename = "type", deserialize_with = "deserialize_null_as_empty")]
    pub code: String,
    pub amount: Option<Decimal>,
}

/// Payroll run of one employee with its expanded earnings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmployeePayrollRun {
    pub id: Option<String>,
    pub employee: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(deserialize_with = "deserialize_opt_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(deserialize_with = "deserialize_opt_date")]
    pub check_date: Option<NaiveDate>,
    pub gross_pay: Option<Decimal>,
    pub net_pay: Option<Decimal>,
    pub earnings: Vec<Earning>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn deserialize_null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts RFC 3339 timestamps (`2017-06-30T00:00:00Z`) and plain dates.
///
/// Timestamps are reduced to their UTC calendar date. Unparsable values
/// become `None`, so the run drops out of any window selected by that date.
fn deserialize_opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(None);
    };
    let date = parse_date(&raw);
    if date.is_none() {
        warn!(value = %raw, "ignoring invalid date or timestamp");
    }
    Ok(date)
}

/// Parse a date from either an RFC 3339 timestamp or `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc().date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
