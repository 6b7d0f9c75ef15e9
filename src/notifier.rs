use std::{fmt, io::Write, sync::Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::{
    config::WebhookConfig,
    message::ReportMessage,
    types::{Notifier, WebhookUrl},
};

/// The webhook answered with something other than `200 OK`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookError {
    pub status: u16,
    pub body: String,
}

impl fmt::Display for WebhookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Request to webhook returned an error {}, the response is:\n{}",
            self.status, self.body
        )
    }
}

impl std::error::Error for WebhookError {}

/// Posts report messages as JSON to an incoming-webhook endpoint.
///
/// One attempt per message; there is no retry.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: WebhookUrl,
}

impl WebhookNotifier {
    pub fn new(config: &WebhookConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, message: &ReportMessage) -> Result<()> {
        debug!(url = %self.url, blocks = message.blocks.len(), "Posting report");

        // `json` sets Content-Type: application/json.
        let response = self
            .client
            .post(self.url.as_str())
            .json(message)
            .send()
            .await
            .with_context(|| format!("Failed to send report to {}", self.url))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable response body: {}>", e));
            return Err(WebhookError {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        info!(url = %self.url, status = status.as_u16(), "Report delivered");
        Ok(())
    }
}

/// Writes each message as pretty-printed JSON instead of posting it.
pub struct PrintNotifier<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> PrintNotifier<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl<W: Write + Send> Notifier for PrintNotifier<W> {
    async fn notify(&self, message: &ReportMessage) -> Result<()> {
        let json = serde_json::to_string_pretty(message).context("Failed to encode report")?;
        let mut out = self
            .out
            .lock()
            .map_err(|_| anyhow::anyhow!("Output writer lock poisoned"))?;
        writeln!(out, "{}", json).context("Failed to write report")?;
        Ok(())
    }
}
