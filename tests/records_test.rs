//! Tests for RecordLoader: input shapes and mapping-table search

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rstest::{fixture, rstest};
use rust_decimal::Decimal;
use tempfile::TempDir;

use hris_forest::application::services::PayrollService;
use hris_forest::domain::earnings::{DateFilter, EarningsLookup, WindowBounds};
use hris_forest::domain::entities::{Employee, EmployeePayrollRun, Group};
use hris_forest::infrastructure::records::RecordLoader;
use hris_forest::infrastructure::traits::RealFileSystem;
use hris_forest::infrastructure::InfraError;

#[fixture]
fn loader() -> RecordLoader {
    RecordLoader::new(Arc::new(RealFileSystem))
}

/// Helper to create a file below the temp dir, creating parents as needed
fn create_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(&path, content).expect("write file");
    path
}

#[rstest]
#[case::bare_array(r#"[{"id": "g1", "type": "TEAM"}, {"id": "g2", "parent_group": "g1"}]"#)]
#[case::single_page(r#"{"next": null, "previous": null, "results": [{"id": "g1", "type": "TEAM"}, {"id": "g2", "parent_group": "g1"}]}"#)]
#[case::page_array(r#"[{"next": "c2", "results": [{"id": "g1", "type": "TEAM"}]}, {"next": null, "results": [{"id": "g2", "parent_group": "g1"}]}]"#)]
fn given_supported_shape_when_loading_groups_then_returns_all_records(
    loader: RecordLoader,
    #[case] content: &str,
) {
    let temp = TempDir::new().unwrap();
    let path = create_file(&temp, "groups.json", content);

    let groups: Vec<Group> = loader.load(&path).unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].group_type.as_deref(), Some("TEAM"));
    assert_eq!(groups[1].parent_group.as_deref(), Some("g1"));
}

#[rstest]
fn given_employee_with_extra_fields_when_loading_then_ignores_them(loader: RecordLoader) {
    let temp = TempDir::new().unwrap();
    let path = create_file(
        &temp,
        "employees.json",
        r#"[{"id": "e1", "first_name": "Ada", "manager": null, "field_mappings": {}, "remote_data": []}]"#,
    );

    let employees: Vec<Employee> = loader.load(&path).unwrap();

    assert_eq!(employees.len(), 1);
    assert_eq!(employees[0].first_name.as_deref(), Some("Ada"));
    assert!(employees[0].manager.is_none());
}

#[rstest]
fn given_timestamps_when_loading_runs_then_reduces_to_utc_dates(loader: RecordLoader) {
    let temp = TempDir::new().unwrap();
    let path = create_file(
        &temp,
        "runs.json",
        r#"[{"id": "r1", "end_date": "2017-06-30T23:30:00-02:00", "check_date": "2017-07-05", "earnings": []}]"#,
    );

    let runs: Vec<EmployeePayrollRun> = loader.load(&path).unwrap();

    assert_eq!(runs[0].end_date.unwrap().to_string(), "2017-07-01");
    assert_eq!(runs[0].check_date.unwrap().to_string(), "2017-07-05");
    assert!(runs[0].start_date.is_none());
}

#[rstest]
#[case::by_end_date(DateFilter::EndDate, 1, "7")]
#[case::by_check_date(DateFilter::CheckDate, 2, "12")]
fn given_run_with_invalid_date_when_summarizing_then_only_that_run_is_skipped(
    loader: RecordLoader,
    #[case] filter: DateFilter,
    #[case] run_count: usize,
    #[case] gross: &str,
) {
    let temp = TempDir::new().unwrap();
    let path = create_file(
        &temp,
        "runs.json",
        r#"[
            {"id": "r1", "end_date": "garbage", "check_date": "2017-03-05",
             "earnings": [{"type": null, "amount": 5}]},
            {"id": "r2", "end_date": "2017-04-30", "check_date": "2017-05-05",
             "earnings": [{"type": "REG", "amount": 7}]}
        ]"#,
    );

    let runs: Vec<EmployeePayrollRun> = loader.load(&path).unwrap();
    let lookup = EarningsLookup::new(HashMap::new(), HashMap::new(), "Other Allowances");
    let summary = PayrollService::new(lookup, filter).summarize(
        &runs,
        WindowBounds::calendar_year(2017).unwrap(),
        None,
    );

    assert_eq!(runs.len(), 2);
    assert_eq!(summary.current.run_count, run_count);
    assert_eq!(summary.current.gross_total, gross.parse::<Decimal>().unwrap());
}

#[rstest]
fn given_missing_file_when_loading_then_returns_io_error(loader: RecordLoader) {
    let err = loader
        .load::<Group>(Path::new("/definitely/not/here/groups.json"))
        .unwrap_err();

    match err {
        InfraError::Io { source, .. } => {
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound)
        }
        other => panic!("expected I/O error, got {other}"),
    }
}

#[rstest]
fn given_table_in_payroll_subdir_when_loading_mapping_then_finds_it(loader: RecordLoader) {
    let temp = TempDir::new().unwrap();
    create_file(
        &temp,
        "payroll/earnings_ukg.json",
        r#"{"REG": "Regular Pay", "OT": "Overtime"}"#,
    );

    let table = loader
        .load_mapping(Path::new("earnings_ukg.json"), temp.path())
        .unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table["REG"], "Regular Pay");
}

#[rstest]
fn given_table_in_cwd_and_subdir_when_loading_mapping_then_cwd_wins(loader: RecordLoader) {
    let temp = TempDir::new().unwrap();
    create_file(&temp, "labels.json", r#"{"REG": "from cwd"}"#);
    create_file(&temp, "payroll/labels.json", r#"{"REG": "from payroll"}"#);

    let table = loader
        .load_mapping(Path::new("labels.json"), temp.path())
        .unwrap();

    assert_eq!(table["REG"], "from cwd");
}

#[rstest]
fn given_missing_table_when_loading_mapping_then_returns_empty(loader: RecordLoader) {
    let temp = TempDir::new().unwrap();

    let table = loader
        .load_mapping(Path::new("nowhere.json"), temp.path())
        .unwrap();

    assert!(table.is_empty());
}
