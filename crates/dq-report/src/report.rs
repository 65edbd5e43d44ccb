//! Projection of rule outcomes into the fixed report schema.

use chrono::NaiveDateTime;
use dq_common::format_numeric;
use dq_model::{LIBRARY_VERSION, RunMetadata};
use dq_validate::{RuleOutcome, RunOutcome, RunStatus};
use polars::prelude::{Column, DataFrame};
use serde::Serialize;

use crate::error::Result;
use crate::schema::{AUDIT_DATE_FORMAT, MISSING_VALUE, REPORT_COLUMNS};

/// One report line. Field order matches [`REPORT_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportRow {
    pub data_date: String,
    pub country_id: String,
    pub project: String,
    pub entity: String,
    pub tested_fields: String,
    pub domain: String,
    pub sub_domain: String,
    pub segment: String,
    pub area: String,
    pub audit_date: String,
    pub function_code: String,
    pub rule_code: String,
    pub data_requirement: String,
    pub threshold: String,
    pub rule_group: String,
    pub rule_property: String,
    pub tested_register_amount: u64,
    pub passed_registers_amount: u64,
    pub success_rate: String,
    pub failed_registers_amount: u64,
    pub fail_rate: String,
    pub library_version: String,
}

/// The rendered audit report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReportTable {
    pub rows: Vec<ReportRow>,
}

impl ReportTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Typed frame: counts as `UInt64`, everything else as strings.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let text = |name: &str, value: fn(&ReportRow) -> &str| {
            Column::new(
                name.into(),
                self.rows.iter().map(value).collect::<Vec<&str>>(),
            )
        };
        let count = |name: &str, value: fn(&ReportRow) -> u64| {
            Column::new(name.into(), self.rows.iter().map(value).collect::<Vec<u64>>())
        };
        let [
            data_date,
            country_id,
            project,
            entity,
            tested_fields,
            domain,
            sub_domain,
            segment,
            area,
            audit_date,
            function_code,
            rule_code,
            data_requirement,
            threshold,
            rule_group,
            rule_property,
            tested,
            passed,
            success_rate,
            failed,
            fail_rate,
            library_version,
        ] = REPORT_COLUMNS;
        let columns = vec![
            text(data_date, |row| row.data_date.as_str()),
            text(country_id, |row| row.country_id.as_str()),
            text(project, |row| row.project.as_str()),
            text(entity, |row| row.entity.as_str()),
            text(tested_fields, |row| row.tested_fields.as_str()),
            text(domain, |row| row.domain.as_str()),
            text(sub_domain, |row| row.sub_domain.as_str()),
            text(segment, |row| row.segment.as_str()),
            text(area, |row| row.area.as_str()),
            text(audit_date, |row| row.audit_date.as_str()),
            text(function_code, |row| row.function_code.as_str()),
            text(rule_code, |row| row.rule_code.as_str()),
            text(data_requirement, |row| row.data_requirement.as_str()),
            text(threshold, |row| row.threshold.as_str()),
            text(rule_group, |row| row.rule_group.as_str()),
            text(rule_property, |row| row.rule_property.as_str()),
            count(tested, |row| row.tested_register_amount),
            count(passed, |row| row.passed_registers_amount),
            text(success_rate, |row| row.success_rate.as_str()),
            count(failed, |row| row.failed_registers_amount),
            text(fail_rate, |row| row.fail_rate.as_str()),
            text(library_version, |row| row.library_version.as_str()),
        ];
        Ok(DataFrame::new(columns)?)
    }
}

/// Percentage with two decimals.
pub fn format_rate(rate: f64) -> String {
    format!("{rate:.2}")
}

/// Project outcomes, in order, into report rows.
pub fn build_report(
    results: &[RuleOutcome],
    metadata: &RunMetadata,
    audit_time: NaiveDateTime,
) -> ReportTable {
    let audit_date = audit_time.format(AUDIT_DATE_FORMAT).to_string();
    ReportTable {
        rows: results
            .iter()
            .map(|outcome| {
                report_row(
                    outcome,
                    metadata,
                    &audit_date,
                    &metadata.data_date,
                    &metadata.country,
                )
            })
            .collect(),
    }
}

/// One-row report for a run stopped by the prerequisites gate.
pub fn build_failure_report(
    failure: &RuleOutcome,
    metadata: &RunMetadata,
    audit_time: NaiveDateTime,
) -> ReportTable {
    let audit_date = audit_time.format(AUDIT_DATE_FORMAT).to_string();
    ReportTable {
        rows: vec![report_row(
            failure,
            metadata,
            &audit_date,
            MISSING_VALUE,
            MISSING_VALUE,
        )],
    }
}

/// Report for a finished run, whichever way it ended.
pub fn build_run_report(run: &RunOutcome, metadata: &RunMetadata) -> ReportTable {
    match (run.status, run.results.first()) {
        (RunStatus::PrerequisitesFailed, Some(failure)) => {
            build_failure_report(failure, metadata, run.run_time)
        }
        _ => build_report(&run.results, metadata, run.run_time),
    }
}

fn report_row(
    outcome: &RuleOutcome,
    metadata: &RunMetadata,
    audit_date: &str,
    data_date: &str,
    country: &str,
) -> ReportRow {
    let success_rate = outcome.success_rate();
    ReportRow {
        data_date: data_date.to_string(),
        country_id: country.to_uppercase(),
        project: metadata.project.to_uppercase(),
        entity: metadata.entity.to_uppercase(),
        tested_fields: outcome.tested_field_label.to_uppercase(),
        domain: metadata.domain.to_uppercase(),
        sub_domain: metadata.sub_domain.to_uppercase(),
        segment: metadata.segment.to_uppercase(),
        area: metadata.area.to_uppercase(),
        audit_date: audit_date.to_string(),
        function_code: outcome.function_code.clone(),
        rule_code: outcome.rule_code.clone(),
        data_requirement: outcome.data_requirement.clone(),
        threshold: format_numeric(outcome.threshold_percent),
        rule_group: outcome.rule_group.clone(),
        rule_property: outcome.rule_property.clone(),
        tested_register_amount: outcome.tested_count as u64,
        passed_registers_amount: outcome.passed_count() as u64,
        success_rate: format_rate(success_rate),
        failed_registers_amount: outcome.failed_count as u64,
        fail_rate: format_rate(100.0 - success_rate),
        library_version: LIBRARY_VERSION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dq_model::RuleKind;

    fn audit_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(10, 30, 5)
            .unwrap()
    }

    fn metadata() -> RunMetadata {
        RunMetadata {
            country: "pe".to_string(),
            project: "retail".to_string(),
            entity: "clients".to_string(),
            domain: "sales".to_string(),
            sub_domain: "stores".to_string(),
            segment: "b2c".to_string(),
            area: "audit".to_string(),
            data_date: "2024-05-31".to_string(),
        }
    }

    fn null_outcome(tested: usize, failed: usize) -> RuleOutcome {
        RuleOutcome {
            config_code: "101".to_string(),
            kind: RuleKind::NullCheck,
            tested_field_label: "email".to_string(),
            function_code: "101".to_string(),
            rule_code: "101/CLIENTS/email".to_string(),
            data_requirement: "Nulos - email".to_string(),
            threshold_percent: 99.5,
            rule_group: "Nulos".to_string(),
            rule_property: "Completitud".to_string(),
            tested_count: tested,
            failed_count: failed,
            write_violations: true,
            violating_rows: None,
        }
    }

    #[test]
    fn rates_have_two_decimals() {
        assert_eq!(format_rate(80.0), "80.00");
        assert_eq!(format_rate(200.0 / 3.0), "66.67");
    }

    #[test]
    fn report_row_is_upper_cased_and_stamped() {
        let report = build_report(&[null_outcome(10, 2)], &metadata(), audit_time());
        let row = &report.rows[0];
        assert_eq!(row.country_id, "PE");
        assert_eq!(row.tested_fields, "EMAIL");
        assert_eq!(row.audit_date, "2024-06-01_10-30-05");
        assert_eq!(row.threshold, "99.5");
        assert_eq!((row.passed_registers_amount, row.success_rate.as_str()), (8, "80.00"));
        assert_eq!(row.fail_rate, "20.00");
    }

    #[test]
    fn failure_report_blanks_date_and_country() {
        let report = build_failure_report(&null_outcome(3, 3), &metadata(), audit_time());
        assert_eq!(report.len(), 1);
        assert_eq!(report.rows[0].data_date, "-");
        assert_eq!(report.rows[0].country_id, "-");
        assert_eq!(report.rows[0].project, "RETAIL");
        assert_eq!(report.rows[0].success_rate, "0.00");
    }

    #[test]
    fn empty_report_keeps_typed_schema() {
        let frame = build_report(&[], &metadata(), audit_time()).to_frame().unwrap();
        assert_eq!(frame.height(), 0);
        let names: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(names, REPORT_COLUMNS);
        assert_eq!(
            frame.column("TestedRegisterAmount").unwrap().dtype(),
            &polars::prelude::DataType::UInt64
        );
        assert_eq!(
            frame.column("SuccessRate").unwrap().dtype(),
            &polars::prelude::DataType::String
        );
    }

    #[test]
    fn report_row_json() {
        let report = build_report(&[null_outcome(4, 1)], &metadata(), audit_time());
        let mut row = serde_json::to_value(&report.rows[0]).unwrap();
        row["LibraryVersion"] = serde_json::Value::from("x.y.z");
        insta::assert_json_snapshot!(row, @r#"
        {
          "DataDate": "2024-05-31",
          "CountryId": "PE",
          "Project": "RETAIL",
          "Entity": "CLIENTS",
          "TestedFields": "EMAIL",
          "Domain": "SALES",
          "SubDomain": "STORES",
          "Segment": "B2C",
          "Area": "AUDIT",
          "AuditDate": "2024-06-01_10-30-05",
          "FunctionCode": "101",
          "RuleCode": "101/CLIENTS/email",
          "DataRequirement": "Nulos - email",
          "Threshold": "99.5",
          "RuleGroup": "Nulos",
          "RuleProperty": "Completitud",
          "TestedRegisterAmount": 4,
          "PassedRegistersAmount": 3,
          "SuccessRate": "75.00",
          "FailedRegistersAmount": 1,
          "FailRate": "25.00",
          "LibraryVersion": "x.y.z"
        }
        "#);
    }
}
