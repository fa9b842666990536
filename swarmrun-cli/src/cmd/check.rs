use std::fmt::{Display, Formatter};
use std::io;
use std::path::Path;

use clap::ValueEnum;
use log::info;
use swarmrun::acceptance::{check_runs, AcceptanceManifest, AcceptanceSuite};
use swarmrun::command::CommandSpec;
use swarmrun::tools::ToolPaths;

use crate::csv_report::{write_csv_report, write_json_report};
use crate::PROGRESS_BAR;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Csv,
    Json,
}

impl Display for ReportFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Csv => write!(f, "csv"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

/// Runs the acceptance suite and prints the report. Returns whether every
/// check passed.
pub fn check(
    manifest: AcceptanceManifest,
    tools: ToolPaths,
    scratch: &Path,
    format: ReportFormat,
) -> anyhow::Result<bool> {
    let suite = AcceptanceSuite::new(manifest, tools, scratch);
    let mut report = suite.run(&*PROGRESS_BAR);

    let help = CommandSpec::new(std::env::current_exe()?).arg("--help");
    report.push(check_runs("run-swarm --help", &help));

    PROGRESS_BAR.finish();
    match format {
        ReportFormat::Csv => write_csv_report(&report, io::stdout())?,
        ReportFormat::Json => write_json_report(&report, io::stdout())?,
    }

    info!(
        "{} of {} checks passed",
        report.checks.len() - report.failures(),
        report.checks.len()
    );
    Ok(report.passed())
}
