//! End-to-end audit runs over files in a temporary directory.

use std::fs;
use std::path::Path;

use dq_cli::pipeline::{AuditOptions, run_audit};
use dq_report::REPORT_COLUMNS;
use dq_validate::RunStatus;

const SUBJECT: &str = "id,email,age\n1,a@x.pe,30\n2,,45\n3,c@x.pe,150\n";

fn write_config(dir: &Path, rules: &str) -> std::path::PathBuf {
    let config = format!(
        r#"{{
            "input": {{
                "country": "pe", "project": "crm", "entity": "clients",
                "data_date": "2024-05-31", "path": "clients.csv", "valid_data": true
            }},
            "output": {{"path": "out/report.csv", "delimiter": ";"}},
            "error": {{"path": "out/errors.csv"}},
            "data": {{"fields": ["id"], "path": "out/clean.csv"}},
            "rules": {rules}
        }}"#
    );
    let path = dir.join("audit.json");
    fs::write(&path, config).unwrap();
    path
}

#[test]
fn run_writes_every_table() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("clients.csv"), SUBJECT).unwrap();
    let config = write_config(
        dir.path(),
        r#"{
            "100": {"fields": ["id", "email"]},
            "101": {"fields": ["email"]},
            "105": {"fields": ["age"], "min_range": 0, "max_range": 120},
            "114": {"fields": ["age"], "output": "out/age_stats.csv"}
        }"#,
    );

    let result = run_audit(&AuditOptions::new(&config)).unwrap();

    assert_eq!(result.run.status, RunStatus::Completed);
    assert_eq!(result.report.len(), 2);
    let tables: Vec<&str> = result
        .written
        .iter()
        .map(|written| written.table.as_str())
        .collect();
    assert_eq!(tables, ["report", "errors", "clean", "statistics:114"]);

    let out = dir.path().join("out");
    let report = fs::read_to_string(out.join("report.csv")).unwrap();
    let mut lines = report.lines();
    assert_eq!(lines.next().unwrap(), REPORT_COLUMNS.join(";"));
    assert_eq!(lines.count(), 2);

    let errors = fs::read_to_string(out.join("errors.csv")).unwrap();
    assert_eq!(errors.lines().count(), 3);
    assert!(errors.lines().next().unwrap().starts_with("id,email,age,error,run_time"));

    let clean = fs::read_to_string(out.join("clean.csv")).unwrap();
    assert_eq!(clean.lines().collect::<Vec<_>>(), ["id,email,age", "1,a@x.pe,30"]);

    let stats = fs::read_to_string(out.join("age_stats.csv")).unwrap();
    assert_eq!(stats.lines().count(), 2);
}

#[test]
fn failed_prerequisites_still_write_the_report() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("clients.csv"), SUBJECT).unwrap();
    let config = write_config(
        dir.path(),
        r#"{"100": {"fields": ["id", "phone"]}, "101": {"fields": ["email"]}}"#,
    );

    let result = run_audit(&AuditOptions::new(&config)).unwrap();

    assert!(result.run.prerequisites_failed());
    assert_eq!(result.report.len(), 1);
    assert_eq!(result.report.rows[0].failed_registers_amount, 3);
    assert!(dir.path().join("out/report.csv").exists());
    assert!(!dir.path().join("out/clean.csv").exists());
}

#[test]
fn dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("clients.csv"), SUBJECT).unwrap();
    let config = write_config(dir.path(), r#"{"101": {"fields": ["email"]}}"#);
    let options = AuditOptions {
        dry_run: true,
        ..AuditOptions::new(&config)
    };

    let result = run_audit(&options).unwrap();

    assert_eq!(result.run.results[0].failed_count, 1);
    assert!(result.written.is_empty());
    assert!(!dir.path().join("out").exists());
}

#[test]
fn missing_subject_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), r#"{"101": {"fields": ["email"]}}"#);

    let error = run_audit(&AuditOptions::new(&config)).unwrap_err();

    assert!(format!("{error:#}").contains("load subject dataset"));
}

#[test]
fn json_report_sink() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("clients.csv"), SUBJECT).unwrap();
    let config = r#"{
        "input": {"entity": "clients", "path": "clients.csv"},
        "output": {"path": "report.json"},
        "rules": {"101": {"fields": ["email"]}}
    }"#;
    let path = dir.path().join("audit.json");
    fs::write(&path, config).unwrap();

    run_audit(&AuditOptions::new(&path)).unwrap();

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap()).unwrap();
    assert_eq!(report[0]["FailedRegistersAmount"], 1);
    assert_eq!(report[0]["TestedFields"], "EMAIL");
}
