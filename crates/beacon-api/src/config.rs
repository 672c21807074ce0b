//! Environment-driven configuration.

use std::net::SocketAddr;

use beacon_assist::AssistProvider;

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Server settings read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Upper bound on pooled connections.
    pub database_max_connections: u32,
    /// Apply embedded migrations before serving.
    pub run_migrations: bool,
    /// Smart-Assist provider family.
    pub assist_provider: AssistProvider,
    /// OTLP collector endpoint; spans are exported only when set.
    pub otlp_endpoint: Option<String>,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `DATABASE_URL` is missing or any value
    /// fails to parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which returns the raw value of
    /// a variable if set.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").ok_or_else(|| {
            AppError::Config("DATABASE_URL environment variable must be set".to_owned())
        })?;
        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = match get("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => DEFAULT_PORT,
        };
        let database_max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.parse().map_err(|e| {
                AppError::Config(format!("DATABASE_MAX_CONNECTIONS must be a valid u32: {e}"))
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let run_migrations = match get("RUN_MIGRATIONS") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                AppError::Config(format!("RUN_MIGRATIONS must be true or false, got {raw}"))
            })?,
            None => true,
        };
        let assist_provider = match get("ASSIST_PROVIDER") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("ASSIST_PROVIDER: {e}")))?,
            None => AssistProvider::default(),
        };

        Ok(Self {
            database_url,
            host,
            port,
            database_max_connections,
            run_migrations,
            assist_provider,
            otlp_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }

    /// Address the server listens on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST` is not an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
