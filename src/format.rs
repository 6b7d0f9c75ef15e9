//! Rendering of raw statistics values into the strings shown in reports.
//!
//! Timestamps are shown in Korea Standard Time using a fixed UTC+9 offset;
//! there is no timezone database lookup.

use std::{fmt, time::Duration};

use chrono::{DateTime, FixedOffset, Utc};

use crate::types::{PullRequestStats, RecordError, parse_elapsed, parse_epoch_millis};

/// Placeholder rendered wherever a value is not available.
pub const NOT_AVAILABLE: &str = "정보 없음";

const KST_OFFSET_SECS: i32 = 9 * 3600;
const TIMESTAMP_PATTERN: &str = "%m월 %d일 %H시 %M분";

const SECS_PER_DAY: u64 = 86_400;
const SECS_PER_HOUR: u64 = 3_600;
const SECS_PER_MINUTE: u64 = 60;

fn kst() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_SECS).expect("UTC+9 is a valid offset")
}

/// Renders an instant as `MM월 DD일 HH시 MM분` in KST.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&kst()).format(TIMESTAMP_PATTERN).to_string()
}

/// Renders an epoch-millisecond string as `MM월 DD일 HH시 MM분` in KST.
pub fn format_timestamp(raw: &str) -> Result<String, RecordError> {
    parse_epoch_millis("timestamp", raw).map(format_instant)
}

/// How a duration should feel to the reader. Anything spanning at least a
/// full day is `Sad`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Neutral,
    Sad,
}

impl Mood {
    /// Slack emoji name, without the surrounding colons.
    pub fn emoji_name(&self) -> &'static str {
        match self {
            Mood::Neutral => "neutral_face",
            Mood::Sad => "cry",
        }
    }
}

/// Whole days, hours and minutes of a duration; seconds are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationParts {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
}

impl DurationParts {
    pub fn from_duration(duration: Duration) -> Self {
        let total_secs = duration.as_secs();
        let days = total_secs / SECS_PER_DAY;
        let remainder = total_secs % SECS_PER_DAY;
        let hours = remainder / SECS_PER_HOUR;
        let minutes = (remainder % SECS_PER_HOUR) / SECS_PER_MINUTE;

        Self {
            days,
            hours,
            minutes,
        }
    }

    #[cfg(test)]
    fn as_secs(&self) -> u64 {
        self.days * SECS_PER_DAY + self.hours * SECS_PER_HOUR + self.minutes * SECS_PER_MINUTE
    }

    pub fn mood(&self) -> Mood {
        if self.days > 0 { Mood::Sad } else { Mood::Neutral }
    }
}

impl fmt::Display for DurationParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.days > 0 {
            write!(f, "{}일 {}시간 {}분", self.days, self.hours, self.minutes)
        } else {
            write!(f, "{}시간 {}분", self.hours, self.minutes)
        }
    }
}

/// A rendered duration and the mood marker that goes with it.
///
/// `mood` is `None` for the not-available placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedDuration {
    pub text: String,
    pub mood: Option<Mood>,
}

impl FormattedDuration {
    pub fn not_available() -> Self {
        Self {
            text: NOT_AVAILABLE.to_string(),
            mood: None,
        }
    }
}

impl fmt::Display for FormattedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mood {
            Some(mood) => write!(f, "{} :{}:", self.text, mood.emoji_name()),
            None => write!(f, "{}", self.text),
        }
    }
}

pub fn format_duration(duration: Option<Duration>) -> FormattedDuration {
    match duration {
        Some(duration) => {
            let parts = DurationParts::from_duration(duration);
            FormattedDuration {
                text: parts.to_string(),
                mood: Some(parts.mood()),
            }
        }
        None => FormattedDuration::not_available(),
    }
}

/// Formats a raw millisecond duration field, honouring the `NaN` marker.
pub fn format_duration_str(raw: &str) -> Result<FormattedDuration, RecordError> {
    parse_elapsed("duration", raw).map(format_duration)
}

fn format_count(count: Option<u64>) -> String {
    count
        .map(|n| n.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Display-ready values for one pull request report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFields {
    pub number: u64,
    pub title: String,
    pub created_at: String,
    pub merged_at: String,
    pub file_count: String,
    pub changed_line_count: String,
    pub conversation_count: String,
    pub response_time: FormattedDuration,
    pub approval_time: FormattedDuration,
}

impl From<&PullRequestStats> for ReportFields {
    fn from(stats: &PullRequestStats) -> Self {
        ReportFields {
            number: stats.number,
            title: stats.title.clone(),
            created_at: format_instant(stats.created_at),
            merged_at: format_instant(stats.merged_at),
            file_count: stats.file_count.to_string(),
            changed_line_count: stats.changed_line_count.to_string(),
            conversation_count: format_count(stats.conversation_count),
            response_time: format_duration(stats.average_response_time),
            approval_time: format_duration(stats.average_time_to_approval),
        }
    }
}
