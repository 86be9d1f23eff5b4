use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::matching::engine::DEFAULT_SNAPSHOT_STRIDE;

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
    pub matching: MatchingConfig,
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

        let snapshot_stride = env::var("APP_SNAPSHOT_STRIDE")
            .unwrap_or_else(|_| DEFAULT_SNAPSHOT_STRIDE.to_string())
            .parse::<usize>()
            .ok()
            .filter(|stride| *stride > 0)
            .ok_or(ConfigError::InvalidSnapshotStride)?;
        let snapshot_count = env::var("APP_SNAPSHOT_COUNT")
            .unwrap_or_else(|_| DEFAULT_SNAPSHOT_COUNT.to_string())
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidSnapshotCount)?;
        let input_path = env::var("APP_INPUT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_INPUT_PATH));

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            matching: MatchingConfig {
                snapshot_stride,
                snapshot_count,
                input_path,
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

pub const DEFAULT_SNAPSHOT_COUNT: usize = 20;
pub const DEFAULT_INPUT_PATH: &str = "data/entradaProj2.25TAG.txt";

/// Matching engine knobs and the default input location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchingConfig {
    pub snapshot_stride: usize,
    pub snapshot_count: usize,
    pub input_path: PathBuf,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            snapshot_stride: DEFAULT_SNAPSHOT_STRIDE,
            snapshot_count: DEFAULT_SNAPSHOT_COUNT,
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSnapshotStride,
    InvalidSnapshotCount,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSnapshotStride => {
                write!(f, "APP_SNAPSHOT_STRIDE must be a positive integer")
            }
            ConfigError::InvalidSnapshotCount => {
                write!(f, "APP_SNAPSHOT_COUNT must be a non-negative integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidSnapshotStride
            | ConfigError::InvalidSnapshotCount => None,
        }
    }
}
