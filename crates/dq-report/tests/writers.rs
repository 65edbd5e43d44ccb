//! Report and table writers against temporary files.

use std::fs;

use chrono::NaiveDate;
use dq_ingest::CsvOptions;
use dq_model::{RuleKind, RunMetadata, SinkConfig};
use dq_report::{build_failure_report, build_report, write_report_csv, write_report_json, write_sink};
use dq_validate::RuleOutcome;
use polars::prelude::*;

fn metadata() -> RunMetadata {
    RunMetadata {
        country: "pe".to_string(),
        project: "retail".to_string(),
        entity: "clients".to_string(),
        data_date: "2024-05-31".to_string(),
        ..RunMetadata::default()
    }
}

fn prerequisites_failure() -> RuleOutcome {
    RuleOutcome {
        config_code: "100".to_string(),
        kind: RuleKind::Prerequisites,
        tested_field_label: "id,email".to_string(),
        function_code: "100".to_string(),
        rule_code: "100/CLIENTS/id,email".to_string(),
        data_requirement: "Error en esquema de la tabla, revisar los siguientes campos: email"
            .to_string(),
        threshold_percent: 100.0,
        rule_group: "Requisitos Previos".to_string(),
        rule_property: "Requisitos Previos".to_string(),
        tested_count: 2,
        failed_count: 2,
        write_violations: false,
        violating_rows: None,
    }
}

#[test]
fn failure_report_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.csv");
    let audit_time = NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    let mut report = build_failure_report(&prerequisites_failure(), &metadata(), audit_time);
    report.rows[0].library_version = "x.y.z".to_string();
    let options = CsvOptions {
        delimiter: b';',
        has_header: true,
    };
    write_report_csv(&report, &path, options).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    insta::assert_snapshot!(text, @r"
    DataDate;CountryId;Project;Entity;TestedFields;Domain;SubDomain;Segment;Area;AuditDate;FunctionCode;RuleCode;DataRequirement;Threshold;RuleGroup;RuleProperty;TestedRegisterAmount;PassedRegistersAmount;SuccessRate;FailedRegistersAmount;FailRate;LibraryVersion
    -;-;RETAIL;CLIENTS;ID,EMAIL;;;;;2024-06-01_08-00-00;100;100/CLIENTS/id,email;Error en esquema de la tabla, revisar los siguientes campos: email;100;Requisitos Previos;Requisitos Previos;2;0;0.00;2;100.00;x.y.z
    ");
}

#[test]
fn empty_report_still_has_a_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("report.csv");
    let audit_time = NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    let report = build_report(&[], &metadata(), audit_time);
    write_report_csv(&report, &path, CsvOptions::default()).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(text.starts_with("DataDate,CountryId,"));

    let json_path = dir.path().join("report.json");
    write_report_json(&report, &json_path).unwrap();
    assert_eq!(fs::read_to_string(&json_path).unwrap().trim(), "[]");
}

#[test]
fn sink_writes_nulls_as_empty_cells() {
    let dir = tempfile::tempdir().unwrap();
    let frame = DataFrame::new(vec![
        Column::new("id".into(), vec![Some("1"), Some("2")]),
        Column::new("email".into(), vec![None, Some("a@b.pe")]),
        Column::new("error".into(), vec!["Nulos - email", "Email - email"]),
    ])
    .unwrap();
    let sink = SinkConfig {
        path: Some("errors.csv".to_string()),
        format: Some("csv".to_string()),
        delimiter: Some("|".to_string()),
        header: Some(true),
    };
    let path = write_sink(&frame, &sink, "error", Some(dir.path())).unwrap();
    assert_eq!(path, dir.path().join("errors.csv"));
    let text = fs::read_to_string(&path).unwrap();
    insta::assert_snapshot!(text, @r"
    id|email|error
    1||Nulos - email
    2|a@b.pe|Email - email
    ");
}

#[test]
fn sink_without_path_is_an_error() {
    let frame = DataFrame::new(vec![Column::new("id".into(), vec!["1"])]).unwrap();
    let err = write_sink(&frame, &SinkConfig::default(), "clean", None).unwrap_err();
    assert_eq!(err.to_string(), "no output path configured for the clean table");
}
