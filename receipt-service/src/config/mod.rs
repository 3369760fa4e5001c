use secrecy::SecretString;
use serde::Deserialize;
use service_core::config::{self as core_config, get_env, get_flag, is_production};
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub store: StoreConfig,
    pub smtp: SmtpConfig,
    pub receipt: ReceiptSettings,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub mongodb: MongoConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

/// Outbound mail relay. Credentials only ever come from the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: SecretString,
    pub from_email: String,
    pub from_name: String,
    pub starttls: bool,
    pub timeout_secs: u64,
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptSettings {
    pub currency: String,
    pub mail_subject: String,
    pub mail_body: String,
}

impl Default for ReceiptSettings {
    fn default() -> Self {
        Self {
            currency: "TL".to_string(),
            mail_subject: "Your transaction receipt".to_string(),
            mail_body: "Please find your transaction receipt attached.".to_string(),
        }
    }
}

impl ReceiptConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = is_production();
        let defaults = ReceiptSettings::default();

        let backend: StoreBackend = get_env("RECEIPT_STORE", Some("mongo"), false)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let uri = match backend {
            StoreBackend::Mongo => get_env("MONGODB_URI", None, is_prod)?,
            StoreBackend::Memory => env::var("MONGODB_URI").unwrap_or_default(),
        };

        Ok(ReceiptConfig {
            common: common_config,
            store: StoreConfig {
                backend,
                mongodb: MongoConfig {
                    uri,
                    database: get_env("MONGODB_DATABASE", Some("receipt_db"), is_prod)?,
                },
            },
            smtp: SmtpConfig {
                host: get_env("SMTP_HOST", Some("smtp.gmail.com"), is_prod)?,
                port: parse_setting("SMTP_PORT", &get_env("SMTP_PORT", Some("587"), is_prod)?)?,
                user: get_env("SMTP_USER", Some(""), is_prod)?,
                password: SecretString::new(get_env("SMTP_PASSWORD", Some(""), is_prod)?),
                from_email: get_env("SMTP_FROM_EMAIL", Some("noreply@example.com"), is_prod)?,
                from_name: get_env("SMTP_FROM_NAME", Some("Receipts"), is_prod)?,
                starttls: env::var("SMTP_STARTTLS")
                    .map(|v| v != "false")
                    .unwrap_or(true),
                timeout_secs: parse_setting(
                    "SMTP_TIMEOUT_SECS",
                    &env::var("SMTP_TIMEOUT_SECS").unwrap_or_else(|_| "30".to_string()),
                )?,
                enabled: get_flag("SMTP_ENABLED"),
            },
            receipt: ReceiptSettings {
                currency: env::var("RECEIPT_CURRENCY").unwrap_or(defaults.currency),
                mail_subject: env::var("RECEIPT_MAIL_SUBJECT").unwrap_or(defaults.mail_subject),
                mail_body: env::var("RECEIPT_MAIL_BODY").unwrap_or(defaults.mail_body),
            },
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
        })
    }
}

fn parse_setting<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| {
        AppError::ConfigError(anyhow::anyhow!("Invalid value '{}' for {}: {}", raw, key, e))
    })
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Invalid receipt store backend: {}", s)),
        }
    }
}
