//! Application configuration loaded from environment variables.

use fund_me::{Address, DEFAULT_PROGRAM_ID};

use crate::errors::{Result, ServerError};

#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database file
    pub database_url: String,
    /// Port for the REST API server
    pub api_port: u16,
    /// Program id record addresses are derived under (base58)
    pub program_id: Address,
    /// Size of the SQLite connection pool
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            database_url: env_var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./fund_me.db".to_string()),
            api_port: env_var("API_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .map_err(|_| ServerError::Config("Invalid API_PORT".to_string()))?,
            program_id: match env_var("PROGRAM_ID") {
                Ok(raw) => raw
                    .parse()
                    .map_err(|e| ServerError::Config(format!("Invalid PROGRAM_ID: {e}")))?,
                Err(_) => DEFAULT_PROGRAM_ID,
            },
            max_connections: env_var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| ServerError::Config("Invalid DB_MAX_CONNECTIONS".to_string()))?,
        })
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| ServerError::Config(format!("Missing env var: {key}")))
}
