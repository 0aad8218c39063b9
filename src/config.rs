use std::{env, net::SocketAddr, str::FromStr};

use thiserror::Error;

/// Deployment environment; anything other than production exposes internal
/// error messages to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Production,
    Staging,
    Testing,
    Development,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "testing" | "test" => Ok(Self::Testing),
            "development" | "dev" => Ok(Self::Development),
            _ => Err(ConfigError::InvalidEnvironment),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub bind_port: u16,
    pub environment: Environment,
    pub access_violation_kinds: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BIND_PORT must be a valid u16")]
    InvalidPort,
    #[error("RPC_ENVIRONMENT must be one of: production, staging, testing, development")]
    InvalidEnvironment,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
        let bind_port = env::var("BIND_PORT")
            .ok()
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?
            .unwrap_or(8080);
        let environment = env::var("RPC_ENVIRONMENT")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(|value| value.parse::<Environment>())
            .transpose()?
            .unwrap_or_default();
        let access_violation_kinds = env::var("RPC_ACCESS_VIOLATION_KINDS")
            .map(|value| parse_kind_list(&value))
            .unwrap_or_default();

        let config = Self {
            bind_addr,
            bind_port,
            environment,
            access_violation_kinds,
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }
}

fn parse_kind_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|kind| !kind.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-mutating cases share one test so they cannot race each other.
    #[test]
    fn from_env_parses_defaults_and_overrides() {
        env::remove_var("BIND_ADDR");
        env::remove_var("BIND_PORT");
        env::remove_var("RPC_ENVIRONMENT");
        env::remove_var("RPC_ACCESS_VIOLATION_KINDS");

        let config = Config::from_env().expect("config should parse");
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.bind_port, 8080);
        assert_eq!(config.environment, Environment::Production);
        assert!(config.access_violation_kinds.is_empty());

        env::set_var("RPC_ENVIRONMENT", "development");
        env::set_var("RPC_ACCESS_VIOLATION_KINDS", "auth, acl,,");
        let config = Config::from_env().expect("config should parse");
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.access_violation_kinds, vec!["auth", "acl"]);

        env::set_var("BIND_PORT", "not-a-port");
        let err = Config::from_env().expect_err("expected invalid port error");
        assert!(matches!(err, ConfigError::InvalidPort));
        env::remove_var("BIND_PORT");

        env::set_var("RPC_ENVIRONMENT", "moon");
        let err = Config::from_env().expect_err("expected invalid environment error");
        assert!(matches!(err, ConfigError::InvalidEnvironment));

        env::remove_var("RPC_ENVIRONMENT");
        env::remove_var("RPC_ACCESS_VIOLATION_KINDS");
    }

    #[test]
    fn only_production_is_production() {
        assert!(Environment::Production.is_production());
        assert!(!Environment::Staging.is_production());
        assert!(!"dev".parse::<Environment>().expect("valid").is_production());
    }
}
