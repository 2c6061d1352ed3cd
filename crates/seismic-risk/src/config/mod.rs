use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::layer::{FeatureFilter, OutputFields, DEFAULT_ELIGIBILITY_FIELD};
use crate::scoring::{BoundsScope, CatalogError, RuleCatalog, RunOptions};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let catalog_path = env::var("RISK_CATALOG_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let eligibility_field = env::var("RISK_ELIGIBILITY_FIELD")
            .unwrap_or_else(|_| DEFAULT_ELIGIBILITY_FIELD.to_string());
        let bounds_scope = match env::var("RISK_BOUNDS_SCOPE") {
            Ok(raw) => raw
                .parse::<BoundsScope>()
                .map_err(|_| ConfigError::InvalidBoundsScope(raw))?,
            Err(_) => BoundsScope::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring: ScoringConfig {
                catalog_path,
                eligibility_field,
                bounds_scope,
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Defaults for scoring runs started by the CLI or the HTTP service.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// JSON rule catalog; the built-in standard catalog is used when unset.
    pub catalog_path: Option<PathBuf>,
    /// Boolean column selecting the features to score. Blank scores all.
    pub eligibility_field: String,
    pub bounds_scope: BoundsScope,
}

impl ScoringConfig {
    pub fn load_catalog(&self) -> Result<RuleCatalog, CatalogError> {
        match &self.catalog_path {
            Some(path) => RuleCatalog::from_path(path),
            None => Ok(RuleCatalog::standard()),
        }
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            filter: FeatureFilter::eligibility(&self.eligibility_field),
            output: OutputFields::default(),
            bounds_scope: self.bounds_scope,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidBoundsScope(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidBoundsScope(value) => write!(
                f,
                "RISK_BOUNDS_SCOPE must be 'eligible' or 'all' (got '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidBoundsScope(_) => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
