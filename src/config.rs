use std::{fmt, net::SocketAddr, path::PathBuf};

use dotenvy::dotenv;
use url::Url;

use crate::error::ConfigError;

const DEFAULT_LOG_LEVEL: &str = "error";

/// Public URL Telegram pushes updates to, and the local address behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    pub url: Url,
    pub addr: SocketAddr,
    /// Public key of a self-signed certificate, uploaded to Telegram when
    /// the webhook is registered.
    pub certificate: Option<PathBuf>,
}

#[derive(Clone)]
pub struct Config {
    pub token: String,
    /// Postgres URL. Without it questions and sessions stay in memory.
    pub database_url: Option<String>,
    pub log_level: String,
    /// Webhook mode when set, long polling otherwise.
    pub webhook: Option<WebhookConfig>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<hidden>")
            .field("database_url", &self.database_url.as_ref().map(|_| "<hidden>"))
            .field("log_level", &self.log_level)
            .field("webhook", &self.webhook)
            .finish()
    }
}

impl Config {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let token = get("TELOXIDE_TOKEN").ok_or(ConfigError::Missing("TELOXIDE_TOKEN"))?;
        let database_url = get("DATABASE_URL");
        let log_level = get("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned());

        let certificate = get("WEBHOOK_CERT").map(PathBuf::from);
        let webhook = match (get("NGROK_URL"), get("NGROK_ADDR")) {
            (Some(url), Some(addr)) => Some(WebhookConfig {
                url: url.parse().map_err(|e: url::ParseError| ConfigError::Invalid {
                    key: "NGROK_URL",
                    reason: e.to_string(),
                })?,
                addr: addr.parse().map_err(|e: std::net::AddrParseError| {
                    ConfigError::Invalid {
                        key: "NGROK_ADDR",
                        reason: e.to_string(),
                    }
                })?,
                certificate,
            }),
            (None, None) if certificate.is_none() => None,
            _ => return Err(ConfigError::IncompleteWebhook),
        };

        Ok(Self {
            token,
            database_url,
            log_level,
            webhook,
        })
    }
}
