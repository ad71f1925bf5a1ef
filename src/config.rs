// src/config.rs
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

/// Default body template; `{url}` is replaced with the page that changed.
const DEFAULT_BODY_TEMPLATE: &str =
    "The page has been updated! <br> <a href='{url}'>View page</a>";

/// SMTP relay credentials. Absent as a whole when notifications are disabled.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub user: String,
    pub pass: String,
}

/// Per-run configuration, loaded once from the environment and passed into
/// the orchestrator explicitly so tests can inject their own.
#[derive(Debug, Clone)]
pub struct Config {
    pub urls: Vec<String>,
    pub recipients: Vec<String>,
    pub from: String,
    pub subject: String,
    pub body_template: String,
    pub smtp: Option<SmtpConfig>,
    pub history_dir: PathBuf,
    pub fetch_timeout: Duration,
}

impl Config {
    /// Read configuration from env vars:
    /// MONITOR_URLS, EMAIL_RECIPIENTS (comma-delimited), EMAIL_FROM,
    /// EMAIL_SUBJECT, EMAIL_HTML, SMTP_HOST / SMTP_USER / SMTP_PASS,
    /// HISTORY_DIR, FETCH_TIMEOUT_SECS.
    pub fn from_env() -> Result<Self> {
        let urls = split_list(&env_or_default("MONITOR_URLS", ""));
        let recipients = split_list(&env_or_default("EMAIL_RECIPIENTS", ""));

        let smtp = match (
            std::env::var("SMTP_HOST").ok(),
            std::env::var("SMTP_USER").ok(),
            std::env::var("SMTP_PASS").ok(),
        ) {
            (Some(host), Some(user), Some(pass)) => Some(SmtpConfig { host, user, pass }),
            _ => None,
        };

        let timeout_secs: u64 = std::env::var("FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            urls,
            recipients,
            from: env_or_default("EMAIL_FROM", "Notification <watcher@localhost>"),
            subject: env_or_default("EMAIL_SUBJECT", "Page Updated"),
            body_template: env_or_default("EMAIL_HTML", DEFAULT_BODY_TEMPLATE),
            smtp,
            history_dir: PathBuf::from(env_or_default("HISTORY_DIR", "webpage_versions")),
            fetch_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Split a comma-delimited list, trimming entries and dropping empties.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn split_list_trims_and_drops_empties() {
        let v = split_list(" http://a.example ,, http://b.example ,");
        assert_eq!(v, vec!["http://a.example", "http://b.example"]);
        assert!(split_list("").is_empty());
        assert!(split_list(" , ,").is_empty());
    }

    #[serial_test::serial]
    #[test]
    fn from_env_applies_defaults() {
        for k in [
            "MONITOR_URLS",
            "EMAIL_RECIPIENTS",
            "EMAIL_FROM",
            "EMAIL_SUBJECT",
            "EMAIL_HTML",
            "SMTP_HOST",
            "SMTP_USER",
            "SMTP_PASS",
            "HISTORY_DIR",
            "FETCH_TIMEOUT_SECS",
        ] {
            env::remove_var(k);
        }

        let cfg = Config::from_env().unwrap();
        assert!(cfg.urls.is_empty());
        assert!(cfg.recipients.is_empty());
        assert!(cfg.smtp.is_none());
        assert_eq!(cfg.subject, "Page Updated");
        assert!(cfg.body_template.contains("{url}"));
        assert_eq!(cfg.history_dir, PathBuf::from("webpage_versions"));
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(30));
    }

    #[serial_test::serial]
    #[test]
    fn from_env_reads_lists_and_smtp() {
        env::set_var("MONITOR_URLS", "http://a.example, http://b.example");
        env::set_var("EMAIL_RECIPIENTS", "one@example.com,two@example.com");
        env::set_var("SMTP_HOST", "smtp.example.com");
        env::set_var("SMTP_USER", "user");
        env::set_var("SMTP_PASS", "pass");
        env::set_var("FETCH_TIMEOUT_SECS", "5");

        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.urls.len(), 2);
        assert_eq!(cfg.recipients.len(), 2);
        assert!(cfg.smtp.is_some());
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(5));

        for k in [
            "MONITOR_URLS",
            "EMAIL_RECIPIENTS",
            "SMTP_HOST",
            "SMTP_USER",
            "SMTP_PASS",
            "FETCH_TIMEOUT_SECS",
        ] {
            env::remove_var(k);
        }
    }
}
