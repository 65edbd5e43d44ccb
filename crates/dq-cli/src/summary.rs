use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use dq_cli::types::AuditResult;
use dq_model::RuleKind;
use dq_validate::{RuleOutcome, success_rate};

pub fn print_summary(result: &AuditResult) {
    let run = &result.run;
    println!("Run time: {}", run.run_time_label());
    println!("Rows tested: {}", run.tested_rows);
    if run.prerequisites_failed() {
        println!("Prerequisites: FAILED");
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Rule"),
        header_cell("Fields"),
        header_cell("Tested"),
        header_cell("Failed"),
        header_cell("Success %"),
        header_cell("Threshold"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 3..7 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let mut total_tested = 0usize;
    let mut total_failed = 0usize;
    for outcome in &run.results {
        total_tested += outcome.tested_count;
        total_failed += outcome.failed_count;
        table.add_row(vec![
            Cell::new(&outcome.config_code),
            Cell::new(outcome.kind.label()),
            Cell::new(&outcome.tested_field_label),
            Cell::new(outcome.tested_count),
            count_cell(outcome.failed_count, Color::Red),
            rate_cell(outcome),
            dim_cell(format!("{:.2}", outcome.threshold_percent)),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} results", run.results.len()))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total_tested).add_attribute(Attribute::Bold),
        count_cell(total_failed, Color::Red).add_attribute(Attribute::Bold),
        Cell::new(format!("{:.2}", success_rate(total_tested, total_failed)))
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");

    for statistics in &run.statistics {
        println!(
            "Statistics {}: {} fields profiled",
            statistics.code,
            statistics.table.height()
        );
    }
    for written in &result.written {
        println!("Wrote {} ({} rows): {}", written.table, written.rows, written.path.display());
    }
    if !run.diagnostics.is_empty() {
        eprintln!("Skipped:");
        for diagnostic in &run.diagnostics {
            eprintln!("- {diagnostic}");
        }
    }
}

/// Print the supported rule codes.
pub fn print_rule_kinds() {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Rule"),
        header_cell("Group"),
        header_cell("Property"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    for kind in RuleKind::all() {
        table.add_row(vec![
            Cell::new(kind.code()),
            Cell::new(kind.label()),
            Cell::new(kind.group()),
            Cell::new(kind.property()),
        ]);
    }
    println!("{table}");
}

fn rate_cell(outcome: &RuleOutcome) -> Cell {
    let rate = outcome.success_rate();
    let cell = Cell::new(format!("{rate:.2}"));
    if rate < outcome.threshold_percent {
        cell.fg(Color::Yellow).add_attribute(Attribute::Bold)
    } else {
        cell.fg(Color::Green)
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
