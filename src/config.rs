use std::env;

use thiserror::Error;

const DEFAULT_DATABASE_NAME: &str = "TaskManagementDB";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://localhost:5174";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mongo_uri: String,
    pub database_name: String,
    pub access_token_secret: String,
    pub port: u16,
    /// Production mode switches the credential cookie to `Secure` + `SameSite=None`.
    pub production: bool,
    pub allowed_origins: Vec<String>,
    /// When set, task mutations are refused unless the caller's `email` claim owns the task.
    pub enforce_task_ownership: bool,
}

impl Config {
    /// Reads the process environment. `main` loads `.env` before this runs.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => match raw.trim().parse() {
                Ok(port) => port,
                Err(_) => return Err(ConfigError::Invalid { key: "PORT", value: raw }),
            },
            None => DEFAULT_PORT,
        };

        let enforce_task_ownership = match lookup("ENFORCE_TASK_OWNERSHIP") {
            Some(raw) => match parse_flag(&raw) {
                Some(flag) => flag,
                None => {
                    return Err(ConfigError::Invalid {
                        key: "ENFORCE_TASK_OWNERSHIP",
                        value: raw,
                    })
                }
            },
            None => false,
        };

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            mongo_uri: lookup("DB_URI").ok_or(ConfigError::Missing("DB_URI"))?,
            database_name: lookup("DATABASE_NAME")
                .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string()),
            access_token_secret: lookup("ACCESS_TOKEN_SECRET")
                .ok_or(ConfigError::Missing("ACCESS_TOKEN_SECRET"))?,
            port,
            production: lookup("APP_ENV").is_some_and(|mode| mode.trim() == "production"),
            allowed_origins,
            enforce_task_ownership,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            mongo_uri: "mongodb://localhost:27017".to_string(),
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            access_token_secret: "test-secret".to_string(),
            port: DEFAULT_PORT,
            production: false,
            allowed_origins: vec!["http://localhost:5173".to_string()],
            enforce_task_ownership: false,
        }
    }
}
