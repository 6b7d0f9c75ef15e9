use std::{io::Write, path::Path, sync::Mutex, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use pr_stats::{
    Block, Config, MessageFormat, NOT_AVAILABLE, Notifier, ReportConfig, ReportMessage,
    SelectionPolicy, WebhookConfig, WebhookUrl,
    message::{RichTextElement, RichTextSpan},
    prepare_reports, run_report,
};
use tempfile::NamedTempFile;

const HEADER: &str = "number,title,createdAt,mergedAt,fileCount,changedLineCount,conversationCount,averageResponseTime,averageTimeToApproval";

/// Mock notifier that records every message it is given.
///
/// With `fail_after` set, delivery fails once that many messages have been
/// accepted.
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<ReportMessage>>,
    fail_after: Option<usize>,
}

impl RecordingNotifier {
    fn failing_after(accepted: usize) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_after: Some(accepted),
        }
    }

    fn sent(&self) -> Vec<ReportMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &ReportMessage) -> Result<()> {
        let mut sent = self.sent.lock().unwrap();
        if self.fail_after.is_some_and(|limit| sent.len() >= limit) {
            anyhow::bail!("webhook unavailable");
        }
        sent.push(message.clone());
        Ok(())
    }
}

fn write_csv(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file.flush().unwrap();
    file
}

fn test_config(csv_path: &Path, selection: SelectionPolicy, format: MessageFormat) -> Config {
    Config {
        csv_path: csv_path.to_path_buf(),
        selection,
        report: ReportConfig {
            pr_url: "https://github.com/acme/app/pull/42".to_string(),
            assignee: "지민".to_string(),
            format,
        },
        webhook: WebhookConfig {
            url: WebhookUrl::new("https://hooks.slack.com/services/T000/B000/XXXX").unwrap(),
            timeout: Duration::from_secs(5),
        },
        dry_run: false,
    }
}

/// Extracts the bullet lines of a block message as plain strings.
fn bullet_lines(message: &ReportMessage) -> Vec<String> {
    let Some(Block::RichText { elements }) = message.blocks.last() else {
        panic!("last block is not rich text: {:?}", message.blocks);
    };
    let [RichTextElement::RichTextList { elements: items, .. }] = elements.as_slice() else {
        panic!("rich text block does not hold a single list");
    };

    items
        .iter()
        .map(|item| match item {
            RichTextElement::RichTextSection { elements } => elements
                .iter()
                .map(|span| match span {
                    RichTextSpan::Text { text } => text.clone(),
                    RichTextSpan::Emoji { name } => format!(":{name}:"),
                })
                .collect::<String>(),
            other => panic!("unexpected list item: {other:?}"),
        })
        .collect()
}

const FULL_ROW: &str =
    "42,Add retry to uploader,1700000000000,1700200000000,3,120,7,5400000,200000000";

#[tokio::test]
async fn test_single_row_produces_five_ordered_bullets() {
    let csv = write_csv(&[FULL_ROW]);
    let config = test_config(csv.path(), SelectionPolicy::First, MessageFormat::Blocks);
    let notifier = RecordingNotifier::default();

    let outcome = run_report(&config, &notifier).await.unwrap();
    assert_eq!(outcome.reported, vec![42]);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    let message = &sent[0];

    assert!(message.text.contains("Add retry to uploader"));
    assert!(message.text.contains("지민"));
    assert!(message.text.contains("https://github.com/acme/app/pull/42"));
    assert!(matches!(message.blocks[1], Block::Divider));

    assert_eq!(
        bullet_lines(message),
        vec![
            "기간: 11월 15일 07시 13분 ~ 11월 17일 14시 46분".to_string(),
            "변경 규모: 파일 3개, 라인 120줄".to_string(),
            "대화 수: 7".to_string(),
            "평균 응답 시간: 1시간 30분 :neutral_face:".to_string(),
            "승인까지 걸린 시간: 2일 7시간 33분 :cry:".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_not_computed_durations_render_placeholder() {
    let csv = write_csv(&["8,Bump deps,1700000000000,1700000600000,1,2,,NaN,NaN"]);
    let config = test_config(csv.path(), SelectionPolicy::First, MessageFormat::Blocks);
    let notifier = RecordingNotifier::default();

    run_report(&config, &notifier).await.unwrap();

    let lines = bullet_lines(&notifier.sent()[0]);
    assert_eq!(lines[2], format!("대화 수: {NOT_AVAILABLE}"));
    assert_eq!(lines[3], format!("평균 응답 시간: {NOT_AVAILABLE}"));
    assert_eq!(lines[4], format!("승인까지 걸린 시간: {NOT_AVAILABLE}"));
}

#[tokio::test]
async fn test_first_policy_reports_only_first_row() {
    let csv = write_csv(&[
        FULL_ROW,
        "41,Older change,1690000000000,1690003600000,1,1,0,NaN,NaN",
    ]);
    let config = test_config(csv.path(), SelectionPolicy::First, MessageFormat::Text);
    let notifier = RecordingNotifier::default();

    let outcome = run_report(&config, &notifier).await.unwrap();
    assert_eq!(outcome.reported, vec![42]);
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_all_policy_reports_every_row_in_order() {
    let csv = write_csv(&[
        FULL_ROW,
        "41,Older change,1690000000000,1690003600000,1,1,0,NaN,NaN",
        "40,Oldest change,1680000000000,1680003600000,2,2,1,60000,60000",
    ]);
    let config = test_config(csv.path(), SelectionPolicy::All, MessageFormat::Text);
    let notifier = RecordingNotifier::default();

    let outcome = run_report(&config, &notifier).await.unwrap();
    assert_eq!(outcome.reported, vec![42, 41, 40]);

    let sent = notifier.sent();
    assert!(sent[0].text.contains("#42 Add retry to uploader"));
    assert!(sent[1].text.contains("#41 Older change"));
    assert!(sent[2].text.contains("#40 Oldest change"));
    assert!(sent.iter().all(|m| m.blocks.is_empty()));
    assert!(sent.iter().all(|m| m.text.lines().count() == 6));
}

#[tokio::test]
async fn test_invalid_row_aborts_before_sending() {
    let csv = write_csv(&[
        FULL_ROW,
        "41,Broken,not-a-time,1690003600000,1,1,0,NaN,NaN",
    ]);
    let config = test_config(csv.path(), SelectionPolicy::All, MessageFormat::Blocks);
    let notifier = RecordingNotifier::default();

    let err = run_report(&config, &notifier).await.unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("createdAt"), "{chain}");
    assert!(chain.contains("not-a-time"), "{chain}");
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_delivery_failure_stops_the_run() {
    let csv = write_csv(&[
        FULL_ROW,
        "41,Older change,1690000000000,1690003600000,1,1,0,NaN,NaN",
        "40,Oldest change,1680000000000,1680003600000,2,2,1,60000,60000",
    ]);
    let config = test_config(csv.path(), SelectionPolicy::All, MessageFormat::Blocks);
    let notifier = RecordingNotifier::failing_after(1);

    let err = run_report(&config, &notifier).await.unwrap_err();
    assert!(err.to_string().contains("PR #41"));
    assert!(format!("{err:#}").contains("webhook unavailable"));
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_header_only_file_is_an_error() {
    let csv = write_csv(&[]);
    let config = test_config(csv.path(), SelectionPolicy::First, MessageFormat::Blocks);
    let notifier = RecordingNotifier::default();

    let err = run_report(&config, &notifier).await.unwrap_err();
    assert!(format!("{err:#}").contains("No pull request rows"));
    assert!(notifier.sent().is_empty());
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(
        &dir.path().join("pr.csv"),
        SelectionPolicy::First,
        MessageFormat::Blocks,
    );
    let err = prepare_reports(&config).unwrap_err();
    assert!(err.to_string().contains("pr.csv"));
}

#[test]
fn test_prepared_block_payload_shape() {
    let csv = write_csv(&[FULL_ROW]);
    let config = test_config(csv.path(), SelectionPolicy::First, MessageFormat::Blocks);

    let reports = prepare_reports(&config).unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].number, 42);

    let value = serde_json::to_value(&reports[0].message).unwrap();
    let types: Vec<&str> = value["blocks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["section", "divider", "rich_text"]);
}
