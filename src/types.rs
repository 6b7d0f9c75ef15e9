use std::{fmt, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;

use crate::message::ReportMessage;

/// Value the statistics export writes when a duration could not be
/// computed (for example a PR merged without any review).
pub const NOT_COMPUTED_MARKER: &str = "NaN";

/// One row of the pull request statistics CSV, exactly as read.
///
/// Every field stays a string here; [`PullRequestStats`] is the typed view.
/// Columns not listed below are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestRecord {
    pub number: String,
    pub title: String,
    pub created_at: String,
    pub merged_at: String,
    pub file_count: String,
    pub changed_line_count: String,
    // Older exports do not carry this column.
    #[serde(default)]
    pub conversation_count: Option<String>,
    pub average_response_time: String,
    pub average_time_to_approval: String,
}

/// Typed view of a [`PullRequestRecord`].
///
/// Durations the export marked as not computed are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestStats {
    pub number: u64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub merged_at: DateTime<Utc>,
    pub file_count: u64,
    pub changed_line_count: u64,
    pub conversation_count: Option<u64>,
    pub average_response_time: Option<Duration>,
    pub average_time_to_approval: Option<Duration>,
}

impl TryFrom<&PullRequestRecord> for PullRequestStats {
    type Error = RecordError;

    fn try_from(record: &PullRequestRecord) -> std::result::Result<Self, Self::Error> {
        let conversation_count = record
            .conversation_count
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_number("conversationCount", raw))
            .transpose()?;

        Ok(PullRequestStats {
            number: parse_number("number", &record.number)?,
            title: record.title.trim().to_string(),
            created_at: parse_epoch_millis("createdAt", &record.created_at)?,
            merged_at: parse_epoch_millis("mergedAt", &record.merged_at)?,
            file_count: parse_number("fileCount", &record.file_count)?,
            changed_line_count: parse_number("changedLineCount", &record.changed_line_count)?,
            conversation_count,
            average_response_time: parse_elapsed(
                "averageResponseTime",
                &record.average_response_time,
            )?,
            average_time_to_approval: parse_elapsed(
                "averageTimeToApproval",
                &record.average_time_to_approval,
            )?,
        })
    }
}

/// A field of a statistics row that could not be converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    InvalidTimestamp { field: &'static str, value: String },
    InvalidDuration { field: &'static str, value: String },
    InvalidNumber { field: &'static str, value: String },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::InvalidTimestamp { field, value } => write!(
                f,
                "Invalid timestamp in '{}': '{}' is not an epoch-millisecond value",
                field, value
            ),
            RecordError::InvalidDuration { field, value } => write!(
                f,
                "Invalid duration in '{}': '{}' is neither a millisecond count nor {}",
                field, value, NOT_COMPUTED_MARKER
            ),
            RecordError::InvalidNumber { field, value } => {
                write!(f, "Invalid number in '{}': '{}'", field, value)
            }
        }
    }
}

impl std::error::Error for RecordError {}

/// Parses an epoch-millisecond string into a UTC instant.
pub fn parse_epoch_millis(
    field: &'static str,
    raw: &str,
) -> std::result::Result<DateTime<Utc>, RecordError> {
    let invalid = || RecordError::InvalidTimestamp {
        field,
        value: raw.to_string(),
    };

    let millis: i64 = raw.trim().parse().map_err(|_| invalid())?;
    DateTime::from_timestamp_millis(millis).ok_or_else(invalid)
}

/// Parses a millisecond duration. The not-computed marker maps to `None`.
pub fn parse_elapsed(
    field: &'static str,
    raw: &str,
) -> std::result::Result<Option<Duration>, RecordError> {
    let raw_trimmed = raw.trim();
    if raw_trimmed == NOT_COMPUTED_MARKER {
        return Ok(None);
    }

    raw_trimmed
        .parse::<u64>()
        .map(|millis| Some(Duration::from_millis(millis)))
        .map_err(|_| RecordError::InvalidDuration {
            field,
            value: raw.to_string(),
        })
}

fn parse_number(field: &'static str, raw: &str) -> std::result::Result<u64, RecordError> {
    raw.trim()
        .parse()
        .map_err(|_| RecordError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

/// Validated webhook endpoint. Only http and https URLs are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookUrl(Url);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookUrlError {
    Parse(String),
    UnsupportedScheme(String),
}

impl fmt::Display for WebhookUrlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebhookUrlError::Parse(reason) => write!(f, "not a valid URL: {}", reason),
            WebhookUrlError::UnsupportedScheme(scheme) => {
                write!(f, "unsupported scheme '{}', expected http or https", scheme)
            }
        }
    }
}

impl std::error::Error for WebhookUrlError {}

impl WebhookUrl {
    pub fn new(raw: &str) -> std::result::Result<Self, WebhookUrlError> {
        let url = Url::parse(raw.trim()).map_err(|e| WebhookUrlError::Parse(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(Self(url)),
            other => Err(WebhookUrlError::UnsupportedScheme(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }
}

impl fmt::Display for WebhookUrl {
    // Webhook paths embed the secret, so only the host is shown.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/…", self.0.scheme(), self.host().unwrap_or("?"))
    }
}

/// Destination for finished report messages.
#[async_trait]
pub trait Notifier {
    async fn notify(&self, message: &ReportMessage) -> Result<()>;
}
