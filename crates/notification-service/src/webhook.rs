use async_trait::async_trait;

use crate::{DeliveryError, MentionDigest, NotificationChannel};

/// Posts the digest as JSON to a chat webhook.
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }

    fn payload(digest: &MentionDigest) -> serde_json::Value {
        serde_json::json!({
            "content": format!("**{}**: {}", digest.title, digest.summary()),
            "timestamp": digest.timestamp.to_rfc3339(),
            "reports": digest.reports,
        })
    }
}

#[async_trait]
impl NotificationChannel for WebhookNotifier {
    async fn send(&self, digest: &MentionDigest) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.url)
            .json(&Self::payload(digest))
            .send()
            .await
            .map_err(|e| DeliveryError::Webhook(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DeliveryError::Webhook(format!(
                "HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "webhook"
    }
}
