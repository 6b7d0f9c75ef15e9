use serde::Serialize;

use crate::{
    config::{MessageFormat, ReportConfig},
    format::{FormattedDuration, Mood, ReportFields},
};

/// JSON payload posted to the webhook.
///
/// `text` is always present: it is the whole message for
/// [`MessageFormat::Text`] and the notification fallback for
/// [`MessageFormat::Blocks`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportMessage {
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section { text: TextObject },
    Divider,
    RichText { elements: Vec<RichTextElement> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    Mrkdwn { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichTextElement {
    RichTextList {
        style: ListStyle,
        elements: Vec<RichTextElement>,
    },
    RichTextSection {
        elements: Vec<RichTextSpan>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStyle {
    Bullet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichTextSpan {
    Text { text: String },
    Emoji { name: String },
}

/// One bullet of the report, optionally followed by a mood marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactLine {
    pub text: String,
    pub mood: Option<Mood>,
}

impl FactLine {
    fn plain(text: String) -> Self {
        Self { text, mood: None }
    }

    fn duration(label: &str, duration: &FormattedDuration) -> Self {
        Self {
            text: format!("{}: {}", label, duration.text),
            mood: duration.mood,
        }
    }

    fn to_plain_text(&self) -> String {
        match self.mood {
            Some(mood) => format!("{} :{}:", self.text, mood.emoji_name()),
            None => self.text.clone(),
        }
    }

    fn to_rich_text(&self) -> RichTextElement {
        let mut spans = vec![RichTextSpan::Text {
            text: self.text.clone(),
        }];
        if let Some(mood) = self.mood {
            spans.push(RichTextSpan::Text {
                text: " ".to_string(),
            });
            spans.push(RichTextSpan::Emoji {
                name: mood.emoji_name().to_string(),
            });
        }
        RichTextElement::RichTextSection { elements: spans }
    }
}

/// The five report lines, always in this order: date range, change size,
/// conversations, response time, approval time.
pub fn fact_lines(fields: &ReportFields) -> Vec<FactLine> {
    vec![
        FactLine::plain(format!("기간: {} ~ {}", fields.created_at, fields.merged_at)),
        FactLine::plain(format!(
            "변경 규모: 파일 {}개, 라인 {}줄",
            fields.file_count, fields.changed_line_count
        )),
        FactLine::plain(format!("대화 수: {}", fields.conversation_count)),
        FactLine::duration("평균 응답 시간", &fields.response_time),
        FactLine::duration("승인까지 걸린 시간", &fields.approval_time),
    ]
}

// Slack mrkdwn treats these three as control characters.
fn escape_mrkdwn(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// `|` separates the target from the label and `<` `>` delimit the link.
fn escape_link_target(url: &str) -> String {
    url.replace('|', "%7C")
        .replace('<', "%3C")
        .replace('>', "%3E")
}

// The header must stay on one line in plain-text payloads.
fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

/// Introductory line naming the assignee and linking the PR by its title.
pub fn header_line(fields: &ReportFields, config: &ReportConfig) -> String {
    format!(
        "*{}*님, <{}|#{} {}> PR의 리뷰 통계입니다.",
        escape_mrkdwn(&single_line(&config.assignee)),
        escape_link_target(&config.pr_url),
        fields.number,
        escape_mrkdwn(&single_line(&fields.title))
    )
}

/// Builds the webhook message for one pull request.
pub fn build_report(fields: &ReportFields, config: &ReportConfig) -> ReportMessage {
    let header = header_line(fields, config);
    let lines = fact_lines(fields);

    match config.format {
        MessageFormat::Text => {
            let mut text = header;
            for line in &lines {
                text.push_str("\n• ");
                text.push_str(&line.to_plain_text());
            }
            ReportMessage {
                text,
                blocks: Vec::new(),
            }
        }
        MessageFormat::Blocks => {
            let list = RichTextElement::RichTextList {
                style: ListStyle::Bullet,
                elements: lines.iter().map(FactLine::to_rich_text).collect(),
            };
            ReportMessage {
                text: header.clone(),
                blocks: vec![
                    Block::Section {
                        text: TextObject::Mrkdwn { text: header },
                    },
                    Block::Divider,
                    Block::RichText {
                        elements: vec![list],
                    },
                ],
            }
        }
    }
}
