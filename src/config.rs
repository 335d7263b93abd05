use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    /// `None` runs against the in-memory store.
    pub database_url: Option<String>,
    pub api_prefix: String,

    // Rate limiting, 0 disables
    pub rate_api_per_min: u32,
    pub rate_batch_per_min: u32,

    pub log_dir: String,
    pub log_level: tracing::Level,

    /// Count Rejected leaves as blocking in the overlap check.
    pub rejected_blocks_overlap: bool,
    pub employee_lock_idle: Duration,
}

fn var_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("invalid value `{raw}` for {name}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string()),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            rate_api_per_min: var_or("RATE_API_PER_MIN", 1000)?,
            rate_batch_per_min: var_or("RATE_BATCH_PER_MIN", 30)?,

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: var_or("LOG_LEVEL", tracing::Level::DEBUG)?,

            rejected_blocks_overlap: var_or("REJECTED_BLOCKS_OVERLAP", false)?,
            employee_lock_idle: Duration::from_secs(var_or("EMPLOYEE_LOCK_IDLE_SECS", 3600)?),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:3000".to_string(),
            database_url: None,
            api_prefix: "/api".to_string(),
            rate_api_per_min: 0,
            rate_batch_per_min: 0,
            log_dir: "logs".to_string(),
            log_level: tracing::Level::DEBUG,
            rejected_blocks_overlap: false,
            employee_lock_idle: Duration::from_secs(3600),
        }
    }
}
