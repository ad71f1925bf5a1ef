// src/notify/email.rs
use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::{ChangeNotification, Notifier};
use crate::config::SmtpConfig;

pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailNotifier {
    pub fn new(smtp: SmtpConfig) -> Result<Self> {
        let creds = Credentials::new(smtp.user, smtp.pass);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
            .with_context(|| format!("invalid SMTP host {}", smtp.host))?
            .credentials(creds)
            .build();
        Ok(Self { mailer })
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, notification: &ChangeNotification) -> Result<()> {
        if notification.recipients.is_empty() {
            tracing::warn!(
                url = %notification.url,
                "no recipients configured (EMAIL_RECIPIENTS empty); skipping notification"
            );
            return Ok(());
        }

        let from: Mailbox = notification
            .from
            .parse()
            .with_context(|| format!("invalid sender address {}", notification.from))?;

        let mut builder = Message::builder()
            .from(from)
            .subject(notification.subject.clone())
            .header(header::ContentType::TEXT_HTML);
        for addr in &notification.recipients {
            let to: Mailbox = addr
                .parse()
                .with_context(|| format!("invalid recipient address {addr}"))?;
            builder = builder.to(to);
        }

        let msg = builder
            .body(notification.html_body.clone())
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_recipient_list_skips_delivery() {
        let notifier = EmailNotifier::new(SmtpConfig {
            host: "localhost".to_string(),
            user: "user".to_string(),
            pass: "pass".to_string(),
        })
        .unwrap();

        let notification = ChangeNotification {
            url: "http://example.com/a".to_string(),
            from: "Sitewatch <noreply@example.com>".to_string(),
            recipients: Vec::new(),
            subject: "Page Updated".to_string(),
            html_body: "changed".to_string(),
        };

        // Returns before touching the SMTP relay.
        assert!(notifier.send(&notification).await.is_ok());
    }
}
