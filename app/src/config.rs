use crate::error::ConfigError;
use chrono_tz::Tz;
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DATABASE_URL: &str = "sqlite://db/irrigacao_local.db";
const DEFAULT_TEMPLATE_DIR: &str = "templates";
const DEFAULT_READINGS_LIMIT: i64 = 100;

#[derive(Debug, Clone)]
pub struct Config {
    bind_addr: SocketAddr,
    database_url: String,
    template_dir: PathBuf,
    readings_limit: i64,
    timezone: Tz,
}

impl Config {
    /// Reads the environment, a `.env` file is loaded first if present
    pub fn from_env() -> Result<Config, ConfigError> {
        dotenv::dotenv().ok();
        let mut config = Config::default();

        if let Ok(bind_addr) = env::var("BIND_ADDR") {
            config.bind_addr = bind_addr
                .parse()
                .map_err(|_| ConfigError::Invalid("BIND_ADDR", bind_addr))?;
        }
        if let Ok(database_url) = env::var("DATABASE_URL") {
            config.database_url = database_url;
        }
        if let Ok(template_dir) = env::var("TEMPLATE_DIR") {
            config.template_dir = PathBuf::from(template_dir);
        }
        if let Ok(limit) = env::var("RECENT_READINGS_LIMIT") {
            config.readings_limit = match limit.parse::<i64>() {
                Ok(parsed) if parsed > 0 => parsed,
                _ => return Err(ConfigError::Invalid("RECENT_READINGS_LIMIT", limit)),
            };
        }
        if let Ok(timezone) = env::var("TIMEZONE") {
            config.timezone = timezone
                .parse()
                .map_err(|_| ConfigError::Invalid("TIMEZONE", timezone))?;
        }
        Ok(config)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    pub fn readings_limit(&self) -> i64 {
        self.readings_limit
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    #[cfg(test)]
    pub fn with_template_dir(mut self, template_dir: PathBuf) -> Self {
        self.template_dir = template_dir;
        self
    }

    #[cfg(test)]
    pub fn with_readings_limit(mut self, readings_limit: i64) -> Self {
        self.readings_limit = readings_limit;
        self
    }
}

impl std::default::Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            template_dir: PathBuf::from(DEFAULT_TEMPLATE_DIR),
            readings_limit: DEFAULT_READINGS_LIMIT,
            timezone: Tz::UTC,
        }
    }
}
