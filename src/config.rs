//! Process configuration read from the environment

use std::path::PathBuf;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5555;
const DEFAULT_DATABASE_NAME: &str = "booking";
const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:8080", "http://127.0.0.1:8080"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Connection string of the store, `None` when not configured
    pub database_url: Option<String>,
    /// Database used when the connection string does not name one
    pub database_name: String,
    pub allowed_origins: Vec<String>,
    /// Lesson catalog loaded into the in-memory store
    pub lessons_seed_file: Option<PathBuf>,
    pub log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT {0:?}: expected a number between 0 and 65535")]
    InvalidPort(String),
    #[error("invalid LOG_FORMAT {0:?}: expected `json` or `pretty`")]
    InvalidLogFormat(String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match var("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port))?,
            None => DEFAULT_PORT,
        };

        let log_format = match var("LOG_FORMAT").map(|f| f.trim().to_ascii_lowercase()) {
            None => LogFormat::default(),
            Some(f) if f == "pretty" => LogFormat::Pretty,
            Some(f) if f == "json" => LogFormat::Json,
            Some(f) => return Err(ConfigError::InvalidLogFormat(f)),
        };

        let allowed_origins = match var("ALLOWED_ORIGINS") {
            Some(origins) => origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_ALLOWED_ORIGINS.map(String::from).to_vec(),
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database_url: var("DATABASE_URL"),
            database_name: var("DATABASE_NAME")
                .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string()),
            allowed_origins,
            lessons_seed_file: var("LESSONS_SEED_FILE").map(PathBuf::from),
            log_format,
        })
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
