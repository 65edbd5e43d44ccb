use anyhow::Result;
use dq_cli::pipeline::{self, AuditOptions};
use dq_cli::types::AuditResult;

use crate::cli::RunArgs;
use crate::summary::print_rule_kinds;

pub fn run_audit(args: &RunArgs) -> Result<AuditResult> {
    let options = AuditOptions {
        config: args.config.clone(),
        base_dir: args.base_dir.clone(),
        dry_run: args.dry_run,
    };
    pipeline::run_audit(&options)
}

pub fn run_rules() {
    print_rule_kinds();
}
