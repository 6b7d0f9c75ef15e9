use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::{
    config::{Config, ReportConfig},
    format::ReportFields,
    loader::{load_records, select_records},
    message::{ReportMessage, build_report},
    types::{Notifier, PullRequestRecord, PullRequestStats},
};

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutcome {
    /// PR numbers reported, in the order they were sent.
    pub reported: Vec<u64>,
}

/// A message ready to send, tagged with the PR it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedReport {
    pub number: u64,
    pub message: ReportMessage,
}

/// Converts one CSV row into the message that will be sent for it.
pub fn render_record(
    record: &PullRequestRecord,
    config: &ReportConfig,
) -> Result<PreparedReport> {
    let stats = PullRequestStats::try_from(record)
        .with_context(|| format!("Invalid statistics for PR '{}'", record.number))?;
    let fields = ReportFields::from(&stats);

    Ok(PreparedReport {
        number: stats.number,
        message: build_report(&fields, config),
    })
}

/// Loads the statistics file, selects rows and renders every message before
/// anything is sent, so a malformed row aborts the run without a partial
/// delivery.
pub fn prepare_reports(config: &Config) -> Result<Vec<PreparedReport>> {
    let records = load_records(&config.csv_path)?;
    let selected = select_records(records, config.selection)
        .with_context(|| format!("Nothing to report from {}", config.csv_path.display()))?;

    selected
        .iter()
        .map(|record| render_record(record, &config.report))
        .collect()
}

/// Runs the whole pipeline: load, select, format, build, send.
///
/// Messages are sent one at a time in row order; the first delivery failure
/// ends the run.
pub async fn run_report<N>(config: &Config, notifier: &N) -> Result<ReportOutcome>
where
    N: Notifier + Sync,
{
    let reports = prepare_reports(config)?;
    debug!(count = reports.len(), "Prepared reports");

    let mut reported = Vec::with_capacity(reports.len());
    for report in &reports {
        notifier
            .notify(&report.message)
            .await
            .with_context(|| format!("Failed to deliver report for PR #{}", report.number))?;
        info!(pr = report.number, "Reported pull request statistics");
        reported.push(report.number);
    }

    Ok(ReportOutcome { reported })
}
