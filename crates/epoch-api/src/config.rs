//! Server configuration read from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use epoch_session::domain::settings::DecisionPolicy;

use crate::error::AppError;

/// Settings for one server process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Address to bind.
    pub addr: SocketAddr,
    /// PostgreSQL connection string. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Upper bound on any single store call.
    pub store_timeout: Duration,
    /// How repeated decisions for a turn are handled.
    pub decision_policy: DecisionPolicy,
    /// YAML event catalog. `None` selects the static generator.
    pub event_catalog: Option<PathBuf>,
    /// Seed for catalog selection. `None` seeds from the OS.
    pub rng_seed: Option<u64>,
    /// First turn of new sessions.
    pub initial_year: i64,
    /// OTLP collector endpoint. `None` disables trace export.
    pub otlp_endpoint: Option<String>,
}

impl ApiConfig {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but malformed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let port: u16 = parse(&var, "PORT")?.unwrap_or(3000);
        let addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;

        let decision_policy = match var("EPOCH_DECISION_POLICY") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("EPOCH_DECISION_POLICY: {e}")))?,
            None => DecisionPolicy::default(),
        };

        Ok(Self {
            addr,
            database_url: var("DATABASE_URL"),
            store_timeout: Duration::from_millis(
                parse(&var, "EPOCH_STORE_TIMEOUT_MS")?.unwrap_or(5000),
            ),
            decision_policy,
            event_catalog: var("EPOCH_EVENT_CATALOG").map(PathBuf::from),
            rng_seed: parse(&var, "EPOCH_RNG_SEED")?,
            initial_year: parse(&var, "EPOCH_INITIAL_YEAR")?.unwrap_or(2075),
            otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}

fn parse<T>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    var(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| AppError::Config(format!("{key} must be valid: {e}")))
        })
        .transpose()
}
