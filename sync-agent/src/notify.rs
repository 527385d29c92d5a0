//! Run notifications
//!
//! Best-effort webhook messages about what a run did (and what went wrong).
//! A notification failure is logged and swallowed; it must never fail the
//! run that produced the underlying data change.

use reqwest::Client;
use serde::Serialize;

/// One attachment block of a webhook message
#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    pub title: String,
    pub text: String,
    /// Accent color hint, e.g. "danger" or "good"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Attachment {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    text: &'a str,
    attachments: &'a [Attachment],
}

/// Outbound webhook notifier
///
/// Constructed with `None` it is a no-op, so callers never need to branch on
/// whether notifications are configured.
pub struct Notifier {
    client: Client,
    webhook_url: Option<String>,
}

impl Notifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            webhook_url,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Send a message, swallowing every failure
    pub async fn send(&self, text: &str, attachments: &[Attachment]) {
        let Some(url) = &self.webhook_url else {
            tracing::debug!("Notifications disabled, dropping message");
            return;
        };

        let message = WebhookMessage { text, attachments };
        match self.client.post(url).json(&message).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!("Notification delivered");
            }
            Ok(response) => {
                tracing::warn!(status = %response.status(), "Notification rejected");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Notification failed");
            }
        }
    }

    pub async fn send_text(&self, text: &str) {
        self.send(text, &[]).await;
    }
}
