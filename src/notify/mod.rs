// src/notify/mod.rs
pub mod email;

use anyhow::Result;

use crate::config::Config;

pub use email::EmailNotifier;

/// One outbound change alert: all configured recipients get the same message
/// in a single dispatch.
#[derive(Debug, Clone)]
pub struct ChangeNotification {
    pub url: String,
    pub from: String,
    pub recipients: Vec<String>,
    pub subject: String,
    pub html_body: String,
}

impl ChangeNotification {
    /// Build the alert for `url` from the configured templates. The body
    /// template carries a single `{url}` placeholder.
    pub fn for_url(cfg: &Config, url: &str) -> Self {
        Self {
            url: url.to_string(),
            from: cfg.from.clone(),
            recipients: cfg.recipients.clone(),
            subject: cfg.subject.clone(),
            html_body: render_template(&cfg.body_template, url),
        }
    }
}

pub fn render_template(template: &str, url: &str) -> String {
    template.replace("{url}", url)
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &ChangeNotification) -> Result<()>;
}

/// Soft-off notifier used when SMTP credentials are not configured: detection
/// and history keep working, alerts are logged and dropped.
pub struct DisabledNotifier;

#[async_trait::async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, notification: &ChangeNotification) -> Result<()> {
        tracing::warn!(
            url = %notification.url,
            "notifications disabled (SMTP_HOST/SMTP_USER/SMTP_PASS not set); skipping"
        );
        Ok(())
    }
}

/// Pick the notifier the configuration calls for.
pub fn from_config(cfg: &Config) -> Result<Box<dyn Notifier>> {
    match &cfg.smtp {
        Some(smtp) => Ok(Box::new(EmailNotifier::new(smtp.clone())?)),
        None => Ok(Box::new(DisabledNotifier)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_substitutes_url() {
        let out = render_template("Changed: <a href='{url}'>{url}</a>", "http://x.example");
        assert_eq!(
            out,
            "Changed: <a href='http://x.example'>http://x.example</a>"
        );
    }

    #[test]
    fn template_without_placeholder_passes_through() {
        assert_eq!(render_template("no placeholder", "http://x"), "no placeholder");
    }
}
