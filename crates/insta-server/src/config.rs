//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::codec::DecodePolicy;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Store Configuration Constants
// ============================================================================

/// Default document store connection URL (Postgres backend only).
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/instagram";

/// Default logical database name holding the collections.
pub const DEFAULT_STORE_DATABASE: &str = "Instagram";

/// Default maximum store connections in the pool.
pub const DEFAULT_STORE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum store connections in the pool.
pub const DEFAULT_STORE_MIN_CONNECTIONS: u32 = 1;

/// Default connection timeout in seconds.
pub const DEFAULT_STORE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default bound on lookups and filtered finds, in seconds.
pub const DEFAULT_STORE_READ_TIMEOUT_SECS: u64 = 30;

/// Default bound on inserts, in seconds.
pub const DEFAULT_STORE_WRITE_TIMEOUT_SECS: u64 = 5;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub codec: CodecConfig,
    pub cors: CorsConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Which document store implementation to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local store; contents are lost on restart
    #[default]
    Memory,
    /// JSONB documents in PostgreSQL
    Postgres,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            _ => Err(anyhow::anyhow!("Invalid store backend: {}", s)),
        }
    }
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Postgres => write!(f, "postgres"),
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub url: String,
    pub database: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub write_timeout_secs: u64,
}

impl StoreConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

/// Request body decoding configuration
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CodecConfig {
    pub decode_policy: DecodePolicy,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment and defaults
    ///
    /// A `.env` file in the working directory is read first. Numeric values
    /// that fail to parse fall back to their defaults; an unknown
    /// `STORE_BACKEND` or `DECODE_POLICY` is an error.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend = match std::env::var("STORE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StoreBackend::default(),
        };

        let decode_policy = match std::env::var("DECODE_POLICY") {
            Ok(value) => value.parse()?,
            Err(_) => DecodePolicy::default(),
        };

        let config = Config {
            server: ServerConfig {
                host: std::env::var("INSTA_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: env_or("INSTA_PORT", DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_or(
                    "INSTA_SHUTDOWN_TIMEOUT",
                    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                ),
            },
            store: StoreConfig {
                backend,
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                database: std::env::var("STORE_DATABASE")
                    .unwrap_or_else(|_| DEFAULT_STORE_DATABASE.to_string()),
                max_connections: env_or("STORE_MAX_CONNECTIONS", DEFAULT_STORE_MAX_CONNECTIONS),
                min_connections: env_or("STORE_MIN_CONNECTIONS", DEFAULT_STORE_MIN_CONNECTIONS),
                connect_timeout_secs: env_or(
                    "STORE_CONNECT_TIMEOUT",
                    DEFAULT_STORE_CONNECT_TIMEOUT_SECS,
                ),
                read_timeout_secs: env_or("STORE_READ_TIMEOUT", DEFAULT_STORE_READ_TIMEOUT_SECS),
                write_timeout_secs: env_or(
                    "STORE_WRITE_TIMEOUT",
                    DEFAULT_STORE_WRITE_TIMEOUT_SECS,
                ),
            },
            codec: CodecConfig { decode_policy },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: env_or("CORS_ALLOW_CREDENTIALS", false),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.store.database.trim().is_empty() {
            anyhow::bail!("Store database name cannot be empty");
        }

        if self.store.backend == StoreBackend::Postgres {
            if self.store.url.is_empty() {
                anyhow::bail!("DATABASE_URL cannot be empty for the postgres backend");
            }

            if self.store.max_connections == 0 {
                anyhow::bail!("Store max_connections must be greater than 0");
            }

            if self.store.min_connections > self.store.max_connections {
                anyhow::bail!(
                    "Store min_connections ({}) cannot be greater than max_connections ({})",
                    self.store.min_connections,
                    self.store.max_connections
                );
            }
        }

        if self.store.read_timeout_secs == 0 || self.store.write_timeout_secs == 0 {
            anyhow::bail!("Store read and write timeouts must be greater than 0");
        }

        // tower-http refuses credentials together with a wildcard origin
        let wildcard = self.cors.allowed_origins.is_empty()
            || self.cors.allowed_origins.iter().any(|o| o == "*");
        if self.cors.allow_credentials && wildcard {
            anyhow::bail!("CORS_ALLOW_CREDENTIALS requires explicit CORS_ALLOWED_ORIGINS");
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            store: StoreConfig {
                backend: StoreBackend::Memory,
                url: DEFAULT_DATABASE_URL.to_string(),
                database: DEFAULT_STORE_DATABASE.to_string(),
                max_connections: DEFAULT_STORE_MAX_CONNECTIONS,
                min_connections: DEFAULT_STORE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_STORE_CONNECT_TIMEOUT_SECS,
                read_timeout_secs: DEFAULT_STORE_READ_TIMEOUT_SECS,
                write_timeout_secs: DEFAULT_STORE_WRITE_TIMEOUT_SECS,
            },
            codec: CodecConfig::default(),
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: false,
            },
        }
    }
}
