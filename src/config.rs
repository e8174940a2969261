// Runtime settings read from the environment (and an optional `.env`
// file): platform and geocoder base URLs, timeout and log filter.

use std::env;
use std::time::Duration;

use crate::error::ClientError;

pub const DEFAULT_API_URL: &str = "http://localhost:3001";
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub geocoder_url: String,
    pub timeout: Duration,
    pub log_filter: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ClientError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            api_url: base_url("ENVIOS_API_URL", DEFAULT_API_URL),
            geocoder_url: base_url("ENVIOS_GEOCODER_URL", DEFAULT_GEOCODER_URL),
            timeout: Duration::from_secs(parse_or_default("ENVIOS_TIMEOUT_SECS", 30)?),
            log_filter: env::var("ENVIOS_LOG").ok().filter(|v| !v.trim().is_empty()),
        })
    }
}

fn base_url(key: &str, default: &str) -> String {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim().trim_end_matches('/').to_string()
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, ClientError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|err| ClientError::Config(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
