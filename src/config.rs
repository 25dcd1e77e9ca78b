//! Environment configuration.
//!
//! Values come from the process environment, with a `.env` file in the
//! working directory loaded first when present.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::pricing::{PricingCatalog, PricingError};
use crate::storage::DEFAULT_DRAFT_KEY;

const DEFAULT_API_URL: &str = "http://localhost:8080/api/quotes";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a whole number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} is not a valid URL: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to read pricing catalog {path}: {source}")]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid pricing catalog {path}: {source}")]
    Catalog {
        path: PathBuf,
        #[source]
        source: PricingError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" => Self::Test,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone)]
pub struct SubmissionConfig {
    pub endpoint: Url,
    pub timeout: Duration,
    pub max_retries: u32,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub draft_key: String,
    pub draft_dir: PathBuf,
    pub session_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// JSON lines instead of human-readable output.
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct QuoteConfig {
    pub environment: AppEnvironment,
    pub submission: SubmissionConfig,
    pub storage: StorageConfig,
    pub telemetry: TelemetryConfig,
    pub catalog_path: Option<PathBuf>,
}

impl QuoteConfig {
    /// Load `.env` (if any) and read the `QUOTE_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let environment = AppEnvironment::parse(&var("QUOTE_ENV").unwrap_or_default());

        let endpoint = var("QUOTE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let endpoint = Url::parse(endpoint.trim()).map_err(|source| ConfigError::InvalidUrl {
            name: "QUOTE_API_URL",
            source,
        })?;

        let timeout_secs = parse_number(&var, "QUOTE_SUBMIT_TIMEOUT_SECS", 30)?;
        let max_retries = parse_number(&var, "QUOTE_SUBMIT_MAX_RETRIES", 2)?;
        let session_ttl_mins = parse_number(&var, "QUOTE_SESSION_TTL_MINS", 120)?;

        Ok(Self {
            environment,
            submission: SubmissionConfig {
                endpoint,
                timeout: Duration::from_secs(timeout_secs),
                max_retries: u32::try_from(max_retries).map_err(|_| ConfigError::InvalidNumber {
                    name: "QUOTE_SUBMIT_MAX_RETRIES",
                    value: max_retries.to_string(),
                })?,
            },
            storage: StorageConfig {
                draft_key: var("QUOTE_DRAFT_KEY").unwrap_or_else(|| DEFAULT_DRAFT_KEY.to_string()),
                draft_dir: var("QUOTE_DRAFT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(".quote-drafts")),
                session_ttl: Duration::from_secs(session_ttl_mins * 60),
            },
            telemetry: TelemetryConfig {
                log_level: var("QUOTE_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
                json: environment.is_production(),
            },
            catalog_path: var("QUOTE_CATALOG_PATH").map(PathBuf::from),
        })
    }

    /// The catalog named by `QUOTE_CATALOG_PATH`, or the built-in one.
    pub fn load_catalog(&self) -> Result<PricingCatalog, ConfigError> {
        let Some(path) = &self.catalog_path else {
            return Ok(PricingCatalog::standard());
        };

        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::CatalogRead {
            path: path.clone(),
            source,
        })?;
        let catalog = PricingCatalog::from_json_str(&json).map_err(|source| ConfigError::Catalog {
            path: path.clone(),
            source,
        })?;

        tracing::info!(path = %path.display(), currency = catalog.currency(), "Pricing catalog loaded");
        Ok(catalog)
    }
}

fn parse_number<F>(var: &F, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
    }
}
