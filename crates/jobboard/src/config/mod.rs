use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::screening::ids::{
    ResponseIdSequence, DEFAULT_RESPONSE_ID_PREFIX, DEFAULT_RESPONSE_ID_WIDTH,
};

/// Widest suffix that still fits a `u64` counter.
const MAX_RESPONSE_ID_WIDTH: usize = 18;

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
    pub screening: ScreeningConfig,
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

        let response_id_prefix = env::var("APP_RESPONSE_ID_PREFIX")
            .map(|prefix| prefix.trim().to_string())
            .unwrap_or_else(|_| DEFAULT_RESPONSE_ID_PREFIX.to_string());
        if response_id_prefix.is_empty()
            || response_id_prefix.bytes().any(|byte| byte.is_ascii_digit())
        {
            return Err(ConfigError::InvalidResponseIdPrefix(response_id_prefix));
        }

        let response_id_width = match env::var("APP_RESPONSE_ID_WIDTH") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|width| (1..=MAX_RESPONSE_ID_WIDTH).contains(width))
                .ok_or(ConfigError::InvalidResponseIdWidth)?,
            Err(_) => DEFAULT_RESPONSE_ID_WIDTH,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            screening: ScreeningConfig {
                response_id_prefix,
                response_id_width,
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

/// Shape of generated question response ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreeningConfig {
    pub response_id_prefix: String,
    pub response_id_width: usize,
}

impl ScreeningConfig {
    pub fn response_id_sequence(&self) -> ResponseIdSequence {
        ResponseIdSequence::new(self.response_id_prefix.clone(), self.response_id_width)
    }
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            response_id_prefix: DEFAULT_RESPONSE_ID_PREFIX.to_string(),
            response_id_width: DEFAULT_RESPONSE_ID_WIDTH,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidResponseIdPrefix(String),
    InvalidResponseIdWidth,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidResponseIdPrefix(prefix) => write!(
                f,
                "APP_RESPONSE_ID_PREFIX must be non-empty and free of digits (got '{prefix}')"
            ),
            ConfigError::InvalidResponseIdWidth => write!(
                f,
                "APP_RESPONSE_ID_WIDTH must be between 1 and {MAX_RESPONSE_ID_WIDTH}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidResponseIdPrefix(_)
            | ConfigError::InvalidResponseIdWidth => None,
        }
    }
}
