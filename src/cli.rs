use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use url::Url;

use crate::{
    config::{
        Config, DEFAULT_CSV_PATH, DEFAULT_TIMEOUT_SECS, MessageFormat, ReportConfig,
        SelectionPolicy, WebhookConfig,
    },
    types::WebhookUrl,
};

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

#[derive(Parser, Debug)]
#[command(name = "pr-stats")]
#[command(
    about = "Reads pull request review statistics from a CSV export and posts a summary to a chat webhook"
)]
#[command(long_version = BUILD_INFO_HUMAN)]
#[command(after_help = r#"EXAMPLES:
  SLACK_WEBHOOK_URL=https://hooks.slack.com/services/... \
  PR_URL=https://github.com/acme/app/pull/42 PR_ASSIGNEE=jimin pr-stats
      Report the first row of ./stats/pr.csv

  pr-stats --csv out/pr.csv --select all --format text --dry-run ...
      Print one plain-text payload per row instead of posting"#)]
struct CliArgs {
    /// Statistics CSV file (header row first)
    #[arg(long, env = "PR_STATS_CSV", default_value = DEFAULT_CSV_PATH)]
    csv: PathBuf,

    /// Webhook endpoint the report is posted to
    #[arg(long, env = "SLACK_WEBHOOK_URL", hide_env_values = true)]
    webhook_url: String,

    /// Pull request URL linked from the report header
    #[arg(long, env = "PR_URL")]
    pr_url: String,

    /// Name shown as the person the report is addressed to
    #[arg(long, env = "PR_ASSIGNEE")]
    assignee: String,

    /// Which CSV rows to report on
    #[arg(long, value_enum, default_value_t = SelectionPolicy::First)]
    select: SelectionPolicy,

    /// Payload shape sent to the webhook
    #[arg(long, value_enum, default_value_t = MessageFormat::Blocks)]
    format: MessageFormat,

    /// Request timeout in seconds for the webhook call
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Print the JSON payload instead of posting it
    #[arg(long)]
    dry_run: bool,
}

impl CliArgs {
    fn validate(&self) -> Result<()> {
        if self.pr_url.trim().is_empty() {
            anyhow::bail!("--pr-url (PR_URL) must not be empty");
        }

        if self.assignee.trim().is_empty() {
            anyhow::bail!("--assignee (PR_ASSIGNEE) must not be empty");
        }

        if self.timeout == 0 {
            anyhow::bail!("--timeout must be at least 1 second");
        }

        Ok(())
    }
}

fn parse_pr_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let url = Url::parse(raw)
        .with_context(|| format!("Invalid pull request URL '{}' in --pr-url (PR_URL)", raw))?;

    match url.scheme() {
        "http" | "https" => Ok(url.to_string()),
        other => anyhow::bail!(
            "Invalid pull request URL '{}' in --pr-url (PR_URL): unsupported scheme '{}'",
            raw,
            other
        ),
    }
}

fn create_config(cli: CliArgs) -> Result<Config> {
    cli.validate()?;

    let url = WebhookUrl::new(&cli.webhook_url)
        .context("Invalid webhook URL in --webhook-url (SLACK_WEBHOOK_URL)")?;
    let pr_url = parse_pr_url(&cli.pr_url)?;

    Ok(Config {
        csv_path: cli.csv,
        selection: cli.select,
        report: ReportConfig {
            pr_url,
            assignee: cli.assignee.trim().to_string(),
            format: cli.format,
        },
        webhook: WebhookConfig {
            url,
            timeout: Duration::from_secs(cli.timeout),
        },
        dry_run: cli.dry_run,
    })
}

/// Parses command-line arguments, falling back to environment variables,
/// into a validated [`Config`].
///
/// Clap errors (including `--help` and `--version`) are returned as
/// `clap::Error` inside the `anyhow::Error` so callers can tell them apart.
pub fn parse_args<I, T>(args: I) -> Result<Config>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = CliArgs::try_parse_from(args)?;
    create_config(cli)
}
