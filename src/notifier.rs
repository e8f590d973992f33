// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Best-effort operator notification for accepted submissions.
//!
//! A [`Notifier`] renders a [`NotificationMessage`] into plain text and HTML
//! and hands it to a [`MailTransport`]. The outcome is logged and returned
//! for observability; it never fails the request. Without a mail credential
//! the notifier is disabled and every call is a no-op.

use crate::config::NotifierConfig;
use crate::error::NotifyError;
use crate::validator::Submission;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt::{self, Debug, Write};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// A submission projected into notification content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
    pub client: String,
}

impl NotificationMessage {
    /// Build the message for a validated submission.
    ///
    /// A blank company is dropped so no empty label gets rendered.
    pub fn new(submission: &Submission, client: &str, submitted_at: DateTime<Utc>) -> Self {
        Self {
            name: submission.name.clone(),
            email: submission.email.clone(),
            company: submission
                .company
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            message: submission.message.clone(),
            submitted_at,
            client: client.to_string(),
        }
    }

    pub fn subject(&self) -> String {
        format!("New contact form submission from {}", self.name)
    }

    fn timestamp(&self) -> String {
        self.submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Plain text rendering.
    pub fn render_text(&self) -> String {
        let mut out = String::from("New contact form submission\n\n");
        let _ = writeln!(out, "Name: {}", self.name);
        let _ = writeln!(out, "Email: {}", self.email);
        if let Some(company) = &self.company {
            let _ = writeln!(out, "Company: {company}");
        }
        let _ = writeln!(out, "Submitted: {}", self.timestamp());
        let _ = writeln!(out, "Client: {}", self.client);
        let _ = write!(out, "\nMessage:\n{}\n", self.message);
        out
    }

    /// HTML rendering. Message whitespace is kept with `pre-wrap`.
    pub fn render_html(&self) -> String {
        let mut out = String::from("<h2>New contact form submission</h2>\n<table>\n");
        push_row(&mut out, "Name", &self.name);
        push_row(&mut out, "Email", &self.email);
        if let Some(company) = &self.company {
            push_row(&mut out, "Company", company);
        }
        push_row(&mut out, "Submitted", &self.timestamp());
        push_row(&mut out, "Client", &self.client);
        out.push_str("</table>\n<h3>Message</h3>\n<div style=\"white-space: pre-wrap\">");
        out.push_str(&html_escape(&self.message));
        out.push_str("</div>\n");
        out
    }
}

fn push_row(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(
        out,
        "<tr><td><strong>{label}</strong></td><td>{}</td></tr>",
        html_escape(value)
    );
}

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Email as handed to the transport.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Boxed future returned by a transport.
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>>;

/// Something that can deliver an [`OutboundEmail`].
pub trait MailTransport: Send + Sync + Debug {
    fn send<'a>(&'a self, email: &'a OutboundEmail) -> TransportFuture<'a>;
}

/// Transport for JSON mail APIs using bearer authentication.
pub struct HttpMailTransport {
    api_url: Url,
    api_key: String,
    client: reqwest::Client,
}

impl Debug for HttpMailTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMailTransport")
            .field("api_url", &self.api_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpMailTransport {
    /// Create a transport; `timeout` also bounds the underlying HTTP client.
    pub fn new(api_url: &str, api_key: String, timeout: Duration) -> Result<Self, NotifyError> {
        let api_url = Url::parse(api_url)
            .map_err(|e| NotifyError::InvalidConfig(format!("mail API URL {api_url}: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            api_url,
            api_key,
            client,
        })
    }
}

impl HttpMailTransport {
    async fn deliver(&self, email: &OutboundEmail) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.api_url.clone())
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "Mail API accepted message");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

impl MailTransport for HttpMailTransport {
    fn send<'a>(&'a self, email: &'a OutboundEmail) -> TransportFuture<'a> {
        Box::pin(self.deliver(email))
    }
}

/// Result of one notification attempt.
#[derive(Debug)]
pub enum NotifyOutcome {
    Sent,
    Disabled,
    Failed(NotifyError),
}

impl NotifyOutcome {
    /// Metrics label for this outcome.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Disabled => "disabled",
            Self::Failed(_) => "failed",
        }
    }
}

/// Operator notifier.
#[derive(Debug, Clone)]
pub struct Notifier {
    transport: Option<Arc<dyn MailTransport>>,
    from: String,
    to: String,
    timeout: Duration,
}

impl Notifier {
    /// Build from configuration. A missing credential yields a disabled notifier.
    pub fn from_config(config: &NotifierConfig) -> Result<Self, NotifyError> {
        let transport: Option<Arc<dyn MailTransport>> = match &config.api_key {
            Some(key) if config.is_enabled() => Some(Arc::new(HttpMailTransport::new(
                &config.api_url,
                key.clone(),
                config.timeout(),
            )?)),
            _ => {
                info!("MAIL_API_KEY not set, contact notifications disabled");
                None
            }
        };
        Ok(Self::build(config, transport))
    }

    /// A notifier that never sends.
    pub fn disabled(config: &NotifierConfig) -> Self {
        Self::build(config, None)
    }

    /// A notifier using the given transport.
    pub fn with_transport(config: &NotifierConfig, transport: Arc<dyn MailTransport>) -> Self {
        Self::build(config, Some(transport))
    }

    fn build(config: &NotifierConfig, transport: Option<Arc<dyn MailTransport>>) -> Self {
        Self {
            transport,
            from: config.from.clone(),
            to: config.to.clone(),
            timeout: config.timeout(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    fn compose(&self, message: &NotificationMessage) -> OutboundEmail {
        OutboundEmail {
            from: self.from.clone(),
            to: vec![self.to.clone()],
            reply_to: message.email.clone(),
            subject: message.subject(),
            html: message.render_html(),
            text: message.render_text(),
        }
    }

    /// Attempt delivery. Never fails; the outcome is logged and returned.
    pub async fn notify(&self, message: &NotificationMessage) -> NotifyOutcome {
        let Some(transport) = &self.transport else {
            debug!(client = %message.client, "Notification skipped, transport disabled");
            return NotifyOutcome::Disabled;
        };

        let email = self.compose(message);
        let outcome = match tokio::time::timeout(self.timeout, transport.send(&email)).await {
            Ok(Ok(())) => NotifyOutcome::Sent,
            Ok(Err(err)) => NotifyOutcome::Failed(err),
            Err(_) => NotifyOutcome::Failed(NotifyError::Timeout(self.timeout)),
        };

        match &outcome {
            NotifyOutcome::Sent => {
                info!(client = %message.client, to = %self.to, "Contact notification sent");
            }
            NotifyOutcome::Failed(err) => {
                warn!(client = %message.client, error = %err, "Contact notification failed");
            }
            NotifyOutcome::Disabled => {}
        }
        outcome
    }
}
