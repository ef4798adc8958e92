use std::env;

use rolegate_core::{AppError, AppResult};

/// Runtime configuration resolved from the process environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
}

impl ApiConfig {
    /// Reads configuration from the environment.
    ///
    /// `DATABASE_URL` is required; `API_HOST` and `API_PORT` fall back to
    /// loopback defaults suitable for local development.
    pub fn from_env() -> AppResult<Self> {
        let database_url = required_env("DATABASE_URL")?;
        let host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        Ok(Self {
            database_url,
            host,
            port,
        })
    }
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}
