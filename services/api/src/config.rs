use assessor_core::{
    llm_client::{
        DEFAULT_API_BASE, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_REQUEST_TIMEOUT,
        DEFAULT_TEMPERATURE, GenerationParams,
    },
    session::FinalizationPolicy,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub completion_api_key: String,
    pub completion_api_base: String,
    pub completion_model: String,
    pub generation: GenerationParams,
    pub request_timeout: Duration,
    pub sendgrid_api_key: Option<String>,
    pub from_email: String,
    pub prompts_path: Option<PathBuf>,
    pub finalization_policy: FinalizationPolicy,
    pub log_level: Level,
}

/// Parses an optional variable, falling back to `default` when unset.
fn parse_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address = match std::env::var("BIND_ADDRESS") {
            Ok(raw) => raw.parse::<SocketAddr>().map_err(|e| {
                ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
            })?,
            Err(_) => SocketAddr::from(([0, 0, 0, 0], parse_var::<u16>("PORT", 5000)?)),
        };

        let completion_api_key = std::env::var("MISTRAL_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::MissingVar("MISTRAL_API_KEY".to_string()))?;

        let completion_api_base = std::env::var("COMPLETION_API_BASE")
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let completion_model =
            std::env::var("COMPLETION_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let generation = GenerationParams {
            temperature: parse_var("COMPLETION_TEMPERATURE", DEFAULT_TEMPERATURE)?,
            max_tokens: parse_var("COMPLETION_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
        };

        let request_timeout = Duration::from_secs(parse_var(
            "REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT.as_secs(),
        )?);
        if request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "REQUEST_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        // The email credential is optional here; its absence only matters
        // when a session actually ends with a recipient.
        let sendgrid_api_key = std::env::var("SENDGRID_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());
        let from_email =
            std::env::var("FROM_EMAIL").unwrap_or_else(|_| "no-reply@example.com".to_string());

        let prompts_path = std::env::var("PROMPTS_PATH").ok().map(PathBuf::from);

        let finalization_policy = parse_var("FINALIZATION_POLICY", FinalizationPolicy::Report)?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            completion_api_key,
            completion_api_base,
            completion_model,
            generation,
            request_timeout,
            sendgrid_api_key,
            from_email,
            prompts_path,
            finalization_policy,
            log_level,
        })
    }
}
