mod smtp;
mod templates;
mod webhook;

pub use smtp::SmtpNotifier;
pub use templates::EmailTemplate;
pub use webhook::WebhookNotifier;

use async_trait::async_trait;
use mention_core::{MentionError, MentionReport, MentionResult, MentionSink};
use serde::{Deserialize, Serialize};

/// One notification covering every message with mentions from a poll cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionDigest {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub title: String,
    pub reports: Vec<MentionReport>,
}

impl MentionDigest {
    /// Keeps only reports that carry at least one mention.
    pub fn new(reports: &[MentionReport]) -> Self {
        let reports: Vec<MentionReport> = reports
            .iter()
            .filter(|r| !r.result.is_empty())
            .cloned()
            .collect();

        let mut symbols: Vec<&str> = Vec::new();
        for symbol in reports.iter().flat_map(|r| r.result.symbols()) {
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }
        let title = if symbols.is_empty() {
            "Ticker mentions".to_string()
        } else {
            format!("Ticker mentions: {}", symbols.join(", "))
        };

        Self {
            timestamp: chrono::Utc::now(),
            title,
            reports,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn mention_count(&self) -> usize {
        self.reports.iter().map(|r| r.result.len()).sum()
    }

    /// One-line summary used by the webhook, the email footers and logs.
    pub fn summary(&self) -> String {
        format!(
            "{} mentions across {} messages",
            self.mention_count(),
            self.reports.len()
        )
    }
}

/// Trait for notification channels.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, digest: &MentionDigest) -> Result<(), DeliveryError>;
    fn name(&self) -> &str;
}

/// Errors from the notification system.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("SMTP error: {0}")]
    Smtp(String),
    #[error("Webhook error: {0}")]
    Webhook(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<DeliveryError> for MentionError {
    fn from(e: DeliveryError) -> Self {
        MentionError::Delivery(e.to_string())
    }
}

/// Configuration for the notification service.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: Option<String>,
    pub smtp_to: Vec<String>,
    pub smtp_tls: SmtpTls,
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SmtpTls {
    #[default]
    Tls,
    StartTls,
    None,
}

impl SmtpTls {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "starttls" => SmtpTls::StartTls,
            "none" => SmtpTls::None,
            _ => SmtpTls::Tls,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn split_addresses(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl NotificationConfig {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        Self {
            smtp_host: non_empty_var("SMTP_HOST"),
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(465),
            smtp_username: non_empty_var("SMTP_USERNAME"),
            smtp_password: non_empty_var("SMTP_PASSWORD"),
            smtp_from: non_empty_var("SMTP_FROM_ADDRESS"),
            smtp_to: split_addresses(&std::env::var("NOTIFICATION_EMAIL_TO").unwrap_or_default()),
            smtp_tls: SmtpTls::parse(&std::env::var("SMTP_TLS").unwrap_or_default()),
            webhook_url: non_empty_var("MENTION_WEBHOOK_URL"),
        }
    }

    fn smtp_enabled(&self) -> bool {
        self.smtp_host.is_some() && self.smtp_from.is_some() && !self.smtp_to.is_empty()
    }
}

/// Dispatches mention digests to every configured channel.
pub struct NotificationService {
    channels: Vec<Box<dyn NotificationChannel>>,
}

impl NotificationService {
    pub fn new(config: &NotificationConfig) -> Result<Self, DeliveryError> {
        let mut channels: Vec<Box<dyn NotificationChannel>> = Vec::new();

        if config.smtp_enabled() {
            let notifier = SmtpNotifier::new(config)?;
            tracing::info!(
                "Email notifications enabled (SMTP -> {} recipients)",
                config.smtp_to.len()
            );
            channels.push(Box::new(notifier));
        }

        if let Some(ref url) = config.webhook_url {
            channels.push(Box::new(WebhookNotifier::new(url.clone())));
            tracing::info!("Webhook notifications enabled");
        }

        if channels.is_empty() {
            tracing::info!(
                "No notification channels configured (set SMTP_HOST or MENTION_WEBHOOK_URL)"
            );
        }

        Ok(Self { channels })
    }

    pub fn with_channels(channels: Vec<Box<dyn NotificationChannel>>) -> Self {
        Self { channels }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Deliver one digest of `reports` to all channels.
    ///
    /// Every channel is attempted; the first failure is returned afterwards.
    pub async fn send(&self, reports: &[MentionReport]) -> Result<(), DeliveryError> {
        let digest = MentionDigest::new(reports);
        if digest.is_empty() {
            return Ok(());
        }

        let mut first_error = None;
        for channel in &self.channels {
            match channel.send(&digest).await {
                Ok(()) => tracing::info!("Sent {} via {}", digest.summary(), channel.name()),
                Err(e) => {
                    tracing::warn!("Failed to send notification via {}: {}", channel.name(), e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MentionSink for NotificationService {
    async fn send(&self, reports: &[MentionReport]) -> MentionResult<()> {
        Ok(NotificationService::send(self, reports).await?)
    }
}
