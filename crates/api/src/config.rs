//! Process configuration, read from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `BIND_ADDR` | `0.0.0.0:8000` |
//! | `DATABASE_URL` | unset (in-memory store) |
//! | `DATABASE_MAX_CONNECTIONS` | `10` |
//! | `JWT_SECRET` | `dev-secret` |
//! | `JWT_TTL_SECS` | `3600` |
//! | `BCRYPT_COST` | `10` |
//! | `COOKIE_SECURE` | `false` |
//! | `LOG_FORMAT` | `json` |

use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use fittrack_auth::DEFAULT_COST;
use fittrack_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_JWT_SECRET: &str = "dev-secret";
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}' ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    /// True when `JWT_SECRET` was not provided.
    pub jwt_secret_defaulted: bool,
    pub token_ttl_secs: i64,
    pub bcrypt_cost: u32,
    pub cookie_secure: bool,
    pub log_format: LogFormat,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr: SocketAddr = parse_or("BIND_ADDR", get("BIND_ADDR"), DEFAULT_BIND_ADDR.parse().ok())?;
        let database_max_connections =
            parse_or("DATABASE_MAX_CONNECTIONS", get("DATABASE_MAX_CONNECTIONS"), Some(DEFAULT_MAX_CONNECTIONS))?;
        if database_max_connections == 0 {
            return Err(invalid("DATABASE_MAX_CONNECTIONS", "0", "must be at least 1"));
        }

        let token_ttl_secs = parse_or("JWT_TTL_SECS", get("JWT_TTL_SECS"), Some(DEFAULT_TOKEN_TTL_SECS))?;
        if token_ttl_secs <= 0 {
            return Err(invalid("JWT_TTL_SECS", &token_ttl_secs.to_string(), "must be positive"));
        }

        let bcrypt_cost = parse_or("BCRYPT_COST", get("BCRYPT_COST"), Some(DEFAULT_COST))?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(invalid("BCRYPT_COST", &bcrypt_cost.to_string(), "must be between 4 and 31"));
        }

        let cookie_secure = match get("COOKIE_SECURE") {
            None => false,
            Some(raw) => parse_bool(&raw).ok_or_else(|| invalid("COOKIE_SECURE", &raw, "expected true or false"))?,
        };

        let (jwt_secret, jwt_secret_defaulted) = match get("JWT_SECRET") {
            Some(secret) => (secret, false),
            None => (DEFAULT_JWT_SECRET.to_string(), true),
        };

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL"),
            database_max_connections,
            jwt_secret,
            jwt_secret_defaulted,
            token_ttl_secs,
            bcrypt_cost,
            cookie_secure,
            log_format: get("LOG_FORMAT").map(|f| LogFormat::from_name(&f)).unwrap_or_default(),
        })
    }
}

fn invalid(var: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: Option<T>) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.parse().map_err(|e: T::Err| invalid(var, &raw, &e.to_string())),
        None => default.ok_or_else(|| invalid(var, "", "no default available")),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr.port(), 8000);
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.database_max_connections, 10);
        assert_eq!(cfg.jwt_secret, "dev-secret");
        assert!(cfg.jwt_secret_defaulted);
        assert_eq!(cfg.token_ttl_secs, 3600);
        assert_eq!(cfg.bcrypt_cost, 10);
        assert!(!cfg.cookie_secure);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn overrides() {
        let cfg = config(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("DATABASE_URL", "postgres://localhost/fittrack"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_TTL_SECS", "600"),
            ("BCRYPT_COST", "12"),
            ("COOKIE_SECURE", "true"),
            ("LOG_FORMAT", "pretty"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/fittrack"));
        assert!(!cfg.jwt_secret_defaulted);
        assert_eq!(cfg.token_ttl_secs, 600);
        assert_eq!(cfg.bcrypt_cost, 12);
        assert!(cfg.cookie_secure);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = config(&[("JWT_SECRET", "  "), ("DATABASE_URL", "")]).unwrap();
        assert!(cfg.jwt_secret_defaulted);
        assert_eq!(cfg.database_url, None);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(config(&[("BIND_ADDR", "nowhere")]).is_err());
        assert!(config(&[("BCRYPT_COST", "3")]).is_err());
        assert!(config(&[("BCRYPT_COST", "abc")]).is_err());
        assert!(config(&[("JWT_TTL_SECS", "0")]).is_err());
        assert!(config(&[("COOKIE_SECURE", "maybe")]).is_err());
        assert!(config(&[("DATABASE_MAX_CONNECTIONS", "0")]).is_err());
    }
}
