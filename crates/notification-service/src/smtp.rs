use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::templates::EmailTemplate;
use crate::{DeliveryError, MentionDigest, NotificationChannel, NotificationConfig, SmtpTls};

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl SmtpNotifier {
    pub fn new(config: &NotificationConfig) -> Result<Self, DeliveryError> {
        let host = config
            .smtp_host
            .as_deref()
            .ok_or_else(|| DeliveryError::Config("SMTP_HOST not set".into()))?;
        let from_addr = config
            .smtp_from
            .as_deref()
            .ok_or_else(|| DeliveryError::Config("SMTP_FROM_ADDRESS not set".into()))?;

        let from: Mailbox = from_addr
            .parse()
            .map_err(|e| DeliveryError::Config(format!("Invalid from address: {}", e)))?;

        let to: Vec<Mailbox> = config
            .smtp_to
            .iter()
            .filter_map(|addr| match addr.parse::<Mailbox>() {
                Ok(mailbox) => Some(mailbox),
                Err(e) => {
                    tracing::warn!("Skipping invalid recipient {}: {}", addr, e);
                    None
                }
            })
            .collect();

        if to.is_empty() {
            return Err(DeliveryError::Config(
                "No valid NOTIFICATION_EMAIL_TO addresses".into(),
            ));
        }

        let mut builder = match config.smtp_tls {
            SmtpTls::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(host),
            SmtpTls::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host),
            SmtpTls::None => Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(
                host,
            )),
        }
        .map_err(|e| DeliveryError::Smtp(format!("SMTP transport error: {}", e)))?;

        builder = builder.port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let transport = builder.build();

        Ok(Self {
            transport,
            from,
            to,
        })
    }
}

#[async_trait]
impl NotificationChannel for SmtpNotifier {
    async fn send(&self, digest: &MentionDigest) -> Result<(), DeliveryError> {
        let html_body = EmailTemplate::render(digest);
        let text_body = EmailTemplate::render_text(digest);

        for recipient in &self.to {
            let email = Message::builder()
                .from(self.from.clone())
                .to(recipient.clone())
                .subject(&digest.title)
                .multipart(MultiPart::alternative_plain_html(
                    text_body.clone(),
                    html_body.clone(),
                ))
                .map_err(|e| DeliveryError::Smtp(format!("Failed to build email: {}", e)))?;

            self.transport
                .send(email)
                .await
                .map_err(|e| DeliveryError::Smtp(format!("Failed to send email: {}", e)))?;
        }

        tracing::debug!(
            "Emailed {} to {} recipients",
            digest.summary(),
            self.to.len()
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "smtp"
    }
}
