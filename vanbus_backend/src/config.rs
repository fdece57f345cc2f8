use crate::content::feed::{DEFAULT_RELAY_URL, DEFAULT_SITE_URL};
use crate::content::structured_api::DEFAULT_API_BASE_URL;
use crate::registration::delivery::{
    EmailRelaySettings, DEFAULT_EMAIL_ENDPOINT, DEFAULT_EMAIL_PUBLIC_KEY, DEFAULT_EMAIL_SERVICE_ID,
    DEFAULT_EMAIL_TEMPLATE_ID,
};
use config::ConfigError;
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

/// Where posts come from and how long each source may take.
#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    pub api_base_url: String,
    pub site_url: String,
    /// Empty means the feed is fetched directly.
    pub feed_relay_url: String,
    pub api_timeout_ms: u64,
    pub feed_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    pub endpoint: String,
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub web: WebConfig,
    pub content: ContentConfig,
    pub email: EmailConfig,
    pub allowed_origins: String,
    pub log_level: String,
    pub session_secret_key: String,
    pub use_secure_cookies: bool,
    pub registration_idle_minutes: u64,
}

fn missing(name: &str) -> ConfigError {
    ConfigError::Message(format!(
        "FATAL: Environment variable '{}' is not set in your .env file.",
        name
    ))
}

fn positive_number(name: &str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::Message(format!(
            "FATAL: '{}' must be a positive whole number, got '{}'.",
            name, raw
        ))),
    }
}

fn http_url(name: &str, value: &str) -> Result<(), ConfigError> {
    match url::Url::parse(value) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => Ok(()),
        _ => Err(ConfigError::Message(format!(
            "FATAL: '{}' must be an absolute http(s) URL, got '{}'.",
            name, value
        ))),
    }
}

impl Config {
    pub fn from_env(env_path: &Path) -> Result<Self, ConfigError> {
        dotenvy::from_path(env_path).map_err(|e| {
            ConfigError::Message(format!(
                "FATAL: Failed to load .env file from '{}'. Error: {}",
                env_path.display(),
                e
            ))
        })?;

        Config::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable lookup, layered over
    /// `config/default.toml` when that file is present.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let session_secret_key = lookup("SESSION_SECRET_KEY").ok_or_else(|| missing("SESSION_SECRET_KEY"))?;
        // 64 bytes, hex encoded.
        if session_secret_key.len() != 128 || !session_secret_key.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::Message(
                "FATAL: 'SESSION_SECRET_KEY' must be 128 hexadecimal characters long (64 bytes).".to_string(),
            ));
        }

        let allowed_origins = var("ALLOWED_ORIGINS", "");
        let log_level = var("LOG_LEVEL", "info");
        let use_secure_cookies = var("USE_SECURE_COOKIES", "false").parse::<bool>().unwrap_or(false);

        let api_base_url = var("CONTENT_API_BASE_URL", DEFAULT_API_BASE_URL);
        http_url("CONTENT_API_BASE_URL", &api_base_url)?;
        let site_url = var("CONTENT_SITE_URL", DEFAULT_SITE_URL);
        http_url("CONTENT_SITE_URL", &site_url)?;
        let feed_relay_url = var("FEED_RELAY_URL", DEFAULT_RELAY_URL).trim().to_string();
        if !feed_relay_url.is_empty() {
            http_url("FEED_RELAY_URL", &feed_relay_url)?;
        }
        let api_timeout_ms = positive_number("CONTENT_API_TIMEOUT_MS", lookup("CONTENT_API_TIMEOUT_MS"), 3000)?;
        let feed_timeout_ms = positive_number("FEED_TIMEOUT_MS", lookup("FEED_TIMEOUT_MS"), 5000)?;
        let registration_idle_minutes =
            positive_number("REGISTRATION_IDLE_MINUTES", lookup("REGISTRATION_IDLE_MINUTES"), 60)?;

        let email_endpoint = var("EMAIL_RELAY_ENDPOINT", DEFAULT_EMAIL_ENDPOINT);
        http_url("EMAIL_RELAY_ENDPOINT", &email_endpoint)?;

        let builder = config::Config::builder()
            .set_default("web.host", "127.0.0.1")?
            .set_default("web.port", 8080)?
            .add_source(config::File::new("config/default.toml", config::FileFormat::Toml).required(false))
            .set_override("allowed_origins", allowed_origins)?
            .set_override("log_level", log_level)?
            .set_override("session_secret_key", session_secret_key)?
            .set_override("use_secure_cookies", use_secure_cookies)?
            .set_override("registration_idle_minutes", registration_idle_minutes)?
            .set_override("content.api_base_url", api_base_url)?
            .set_override("content.site_url", site_url)?
            .set_override("content.feed_relay_url", feed_relay_url)?
            .set_override("content.api_timeout_ms", api_timeout_ms)?
            .set_override("content.feed_timeout_ms", feed_timeout_ms)?
            .set_override("email.endpoint", email_endpoint)?
            .set_override("email.service_id", var("EMAIL_SERVICE_ID", DEFAULT_EMAIL_SERVICE_ID))?
            .set_override("email.template_id", var("EMAIL_TEMPLATE_ID", DEFAULT_EMAIL_TEMPLATE_ID))?
            .set_override("email.public_key", var("EMAIL_PUBLIC_KEY", DEFAULT_EMAIL_PUBLIC_KEY))?
            .build()?;

        builder.try_deserialize()
    }

    pub fn feed_relay(&self) -> Option<String> {
        Some(self.content.feed_relay_url.clone()).filter(|r| !r.is_empty())
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_millis(self.content.api_timeout_ms)
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_millis(self.content.feed_timeout_ms)
    }

    pub fn registration_idle(&self) -> Duration {
        Duration::from_secs(self.registration_idle_minutes.saturating_mul(60))
    }

    pub fn email_relay_settings(&self) -> EmailRelaySettings {
        EmailRelaySettings {
            endpoint: self.email.endpoint.clone(),
            service_id: self.email.service_id.clone(),
            template_id: self.email.template_id.clone(),
            public_key: self.email.public_key.clone(),
            ..EmailRelaySettings::default()
        }
    }
}
