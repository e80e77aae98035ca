use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

const DEVELOPMENT_JWT_SECRET: &str = "development-only-secret-change-me";

/// Longest accepted token lifetime (one year).
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set in {0:?} mode")]
    MissingJwtSecret(Environment),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string. When absent the in-process store is used.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub password_hash_memory_kib: u32,
    pub password_hash_iterations: u32,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()?;

        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = parse_var("PORT", &v)?;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|url| !url.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse_var("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }

        // API overrides
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = parse_var("API_MAX_REQUEST_SIZE_BYTES", &v)?;
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRES_IN_HOURS") {
            self.security.jwt_expiry_hours = parse_var("JWT_EXPIRES_IN_HOURS", &v)?;
        }
        if let Ok(v) = env::var("PASSWORD_HASH_MEMORY_KIB") {
            self.security.password_hash_memory_kib = parse_var("PASSWORD_HASH_MEMORY_KIB", &v)?;
        }
        if let Ok(v) = env::var("PASSWORD_HASH_ITERATIONS") {
            self.security.password_hash_iterations = parse_var("PASSWORD_HASH_ITERATIONS", &v)?;
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::MissingJwtSecret(self.environment));
        }
        let hours = self.security.jwt_expiry_hours;
        if !(1..=MAX_JWT_EXPIRY_HOURS).contains(&hours) {
            return Err(ConfigError::InvalidValue {
                key: "JWT_EXPIRES_IN_HOURS",
                value: hours.to_string(),
            });
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                max_request_size_bytes: 10 * 1024, // 10KB
            },
            security: SecurityConfig {
                jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                password_hash_memory_kib: 19 * 1024,
                password_hash_iterations: 2,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                max_request_size_bytes: 10 * 1024,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7,
                password_hash_memory_kib: 19 * 1024,
                password_hash_iterations: 2,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                max_request_size_bytes: 10 * 1024,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7,
                password_hash_memory_kib: 19 * 1024,
                password_hash_iterations: 2,
                cors_origins: vec!["https://todo-frontend.vercel.app".to_string()],
            },
        }
    }

    /// Configuration for tests: in-process store, cheap password hashing.
    pub fn for_tests() -> Self {
        let mut config = Self::development();
        config.security.jwt_secret = "test-secret".to_string();
        config.security.password_hash_memory_kib = 1024;
        config.security.password_hash_iterations = 1;
        config
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.database.url.is_none());
        assert_eq!(config.security.jwt_expiry_hours, 168);
        assert_eq!(config.api.max_request_size_bytes, 10 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_production_config_requires_secret() {
        let config = AppConfig::production();
        assert_eq!(config.environment, Environment::Production);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingJwtSecret(Environment::Production))
        ));
    }

    #[test]
    fn test_token_lifetime_must_be_bounded() {
        let mut config = AppConfig::for_tests();
        for hours in [0, MAX_JWT_EXPIRY_HOURS + 1, u64::MAX] {
            config.security.jwt_expiry_hours = hours;
            match config.validate() {
                Err(ConfigError::InvalidValue { key, value }) => {
                    assert_eq!(key, "JWT_EXPIRES_IN_HOURS");
                    assert_eq!(value, hours.to_string());
                }
                other => panic!("expected InvalidValue for {} hours, got {:?}", hours, other),
            }
        }

        config.security.jwt_expiry_hours = MAX_JWT_EXPIRY_HOURS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_var_reports_key() {
        let err = parse_var::<u16>("PORT", "not-a-port").unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for PORT: not-a-port");
        assert_eq!(parse_var::<u16>("PORT", " 8080 ").unwrap(), 8080);
    }
}
