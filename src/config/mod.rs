use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::{info, warn};

use crate::services::issuer::DEFAULT_CODE_ATTEMPTS;

pub mod cors;
pub mod timeout;

pub use cors::create_cors_layer;
pub use timeout::RequestTimeoutLayer;

pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub max_connections: u32,
    pub request_timeout: Duration,
    pub code_generation_attempts: usize,
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/ticketing".to_string()),
            port: parse_or("PORT", 3001),
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5),
            request_timeout: Duration::from_secs(parse_or("REQUEST_TIMEOUT_SECS", 10)),
            code_generation_attempts: parse_or("CODE_GENERATION_ATTEMPTS", DEFAULT_CODE_ATTEMPTS),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string()),
        }
    }
}

fn parse_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{raw}': {e}, using default: {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}
