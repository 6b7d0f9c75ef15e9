//! pr-stats: pull request review statistics reporter.
//!
//! Reads a CSV export of pull request statistics, renders the interesting
//! fields (KST timestamps, review durations, change counts) and posts a
//! summary message to a chat webhook. Intended to run once per CI job.

pub mod cli;
pub mod config;
pub mod format;
pub mod loader;
pub mod message;
pub mod notifier;
pub mod report;
pub mod types;

pub use cli::parse_args;
pub use config::{Config, MessageFormat, ReportConfig, SelectionPolicy, WebhookConfig};
pub use format::{
    DurationParts, FormattedDuration, Mood, NOT_AVAILABLE, ReportFields, format_duration,
    format_duration_str, format_instant, format_timestamp,
};
pub use loader::{load_records, select_records};
pub use message::{Block, FactLine, ReportMessage, build_report, fact_lines};
pub use notifier::{PrintNotifier, WebhookError, WebhookNotifier};
pub use report::{PreparedReport, ReportOutcome, prepare_reports, render_record, run_report};
pub use types::{
    Notifier, PullRequestRecord, PullRequestStats, RecordError, WebhookUrl, WebhookUrlError,
};
