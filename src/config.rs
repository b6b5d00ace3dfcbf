use std::env;
use std::path::PathBuf;

use anyhow::Result;
use once_cell::sync::Lazy;
use thiserror::Error;
use tracing::warn;
use url::Url;

const DEFAULT_AWS_REGION: &str = "us-east-1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    MissingVar(&'static str),
    #[error("API_ENDPOINT_NAME '{0}' has surrounding whitespace")]
    PaddedEndpoint(String),
    #[error("API_ENDPOINT_NAME '{value}' is not an absolute URL: {source}")]
    InvalidEndpoint {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub aws_region: String,
    pub api_endpoint_name: String,
}

pub static CONFIG: Lazy<Config> =
    Lazy::new(|| Config::load().expect("Failed to load configuration"));

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn normalize_region(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        warn!(
            "AWS_REGION is empty; defaulting to {}.",
            DEFAULT_AWS_REGION
        );
        return DEFAULT_AWS_REGION.to_string();
    }
    trimmed.to_lowercase()
}

/// The endpoint is used verbatim as the URL prefix, so it is only checked,
/// never rewritten.
pub fn validate_endpoint(value: &str) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingVar("API_ENDPOINT_NAME"));
    }
    if value.trim() != value {
        return Err(ConfigError::PaddedEndpoint(value.to_string()));
    }
    Url::parse(value).map_err(|source| ConfigError::InvalidEndpoint {
        value: value.to_string(),
        source,
    })?;
    Ok(value.to_string())
}

impl Config {
    pub fn load() -> Result<Self> {
        let api_endpoint_name = validate_endpoint(&env_string("API_ENDPOINT_NAME", ""))?;

        Ok(Config {
            bot_token: env_string("BOT_TOKEN", ""),
            log_level: env_string("LOG_LEVEL", "info").to_lowercase(),
            log_dir: PathBuf::from(env_string("LOG_DIR", "logs")),
            aws_region: normalize_region(env_string("AWS_REGION", DEFAULT_AWS_REGION)),
            api_endpoint_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_absolute_endpoint_as_is() {
        let endpoint =
            validate_endpoint("https://abc123.execute-api.us-east-1.amazonaws.com/prod").unwrap();
        assert_eq!(
            endpoint,
            "https://abc123.execute-api.us-east-1.amazonaws.com/prod"
        );
    }

    #[test]
    fn keeps_trailing_slash_on_endpoint() {
        assert_eq!(
            validate_endpoint("https://example.com/").unwrap(),
            "https://example.com/"
        );
    }

    #[test]
    fn rejects_padded_endpoint_instead_of_rewriting_it() {
        assert!(matches!(
            validate_endpoint(" https://example.com/prod"),
            Err(ConfigError::PaddedEndpoint(value)) if value == " https://example.com/prod"
        ));
        assert!(matches!(
            validate_endpoint("https://example.com/prod\n"),
            Err(ConfigError::PaddedEndpoint(_))
        ));
    }

    #[test]
    fn rejects_missing_endpoint() {
        assert!(matches!(
            validate_endpoint("   "),
            Err(ConfigError::MissingVar("API_ENDPOINT_NAME"))
        ));
    }

    #[test]
    fn rejects_relative_endpoint() {
        assert!(matches!(
            validate_endpoint("/prod/generate"),
            Err(ConfigError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn falls_back_to_default_region() {
        assert_eq!(normalize_region(" ".to_string()), "us-east-1");
        assert_eq!(normalize_region(" EU-West-1 ".to_string()), "eu-west-1");
    }
}
