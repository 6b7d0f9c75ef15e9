use std::{path::PathBuf, time::Duration};

use clap::ValueEnum;

use crate::types::WebhookUrl;

pub const DEFAULT_CSV_PATH: &str = "./stats/pr.csv";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Which rows of the statistics file get reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SelectionPolicy {
    /// Only the first data row.
    #[default]
    First,
    /// Every row, one message each, in file order.
    All,
}

/// Shape of the JSON payload sent to the webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MessageFormat {
    /// Section, divider and bullet-list blocks with a text fallback.
    #[default]
    Blocks,
    /// A single `text` field.
    Text,
}

/// Inputs the message builder needs besides the statistics themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub pr_url: String,
    pub assignee: String,
    pub format: MessageFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    pub url: WebhookUrl,
    pub timeout: Duration,
}

/// Everything a run needs, resolved once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub csv_path: PathBuf,
    pub selection: SelectionPolicy,
    pub report: ReportConfig,
    pub webhook: WebhookConfig,
    pub dry_run: bool,
}
