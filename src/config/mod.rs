use clap::Parser;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

use crate::api::DEFAULT_MAX_BODY_BYTES;
use crate::jsonlog::Level;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub log: LogConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" | "prod" => Ok(Environment::Production),
            "staging" | "stage" => Ok(Environment::Staging),
            "development" | "dev" => Ok(Environment::Development),
            other => Err(format!("unknown environment: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub min_level: Level,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

/// Command-line flags; each one, when given, wins over the environment.
#[derive(Debug, Default, Parser)]
#[command(name = "greenlight-api", version, about = "Movie catalog JSON API server")]
pub struct Cli {
    /// API server port
    #[arg(long)]
    pub port: Option<u16>,

    /// Environment (development|staging|production)
    #[arg(long = "env", value_enum)]
    pub environment: Option<Environment>,

    /// Minimum log level to write
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<Level>,

    /// Largest accepted request body, in bytes
    #[arg(long = "max-body-bytes")]
    pub max_body_bytes: Option<usize>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = env::var("APP_ENV")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Environment::Development);

        Self::for_environment(environment).with_env_overrides()
    }

    pub fn for_environment(environment: Environment) -> Self {
        // Set defaults based on environment
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Ok(v) = env::var("LOG_MIN_LEVEL") {
            self.log.min_level = v.parse().unwrap_or(self.log.min_level);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    /// Apply command-line flags. A different `--env` re-selects the presets
    /// before the remaining flags are applied.
    pub fn with_cli_overrides(self, cli: &Cli) -> Self {
        let mut config = match cli.environment {
            Some(environment) if environment != self.environment => {
                Self::for_environment(environment).with_env_overrides()
            }
            _ => self,
        };

        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(level) = cli.log_level {
            config.log.min_level = level;
        }
        if let Some(bytes) = cli.max_body_bytes {
            config.api.max_request_size_bytes = bytes;
        }
        config
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 4000 },
            api: ApiConfig {
                max_request_size_bytes: DEFAULT_MAX_BODY_BYTES,
            },
            log: LogConfig { min_level: Level::Info },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["*".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 4000 },
            api: ApiConfig {
                max_request_size_bytes: DEFAULT_MAX_BODY_BYTES,
            },
            log: LogConfig { min_level: Level::Info },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 4000 },
            api: ApiConfig {
                max_request_size_bytes: 512 * 1024,
            },
            log: LogConfig { min_level: Level::Error },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::default();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.api.max_request_size_bytes, 1_048_576);
        assert_eq!(config.log.min_level, Level::Info);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::for_environment(Environment::Production);
        assert_eq!(config.log.min_level, Level::Error);
        assert!(config.api.max_request_size_bytes < DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn cli_flags_win() {
        let cli = Cli::parse_from([
            "greenlight-api",
            "--port",
            "8080",
            "--log-level",
            "fatal",
            "--max-body-bytes",
            "2048",
        ]);
        let config = AppConfig::default().with_cli_overrides(&cli);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.log.min_level, Level::Fatal);
        assert_eq!(config.api.max_request_size_bytes, 2048);
    }

    #[test]
    fn cli_env_selects_presets() {
        let cli = Cli::parse_from(["greenlight-api", "--env", "staging"]);
        let config = AppConfig::default().with_cli_overrides(&cli);
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.security.cors_origins, vec!["https://staging.example.com"]);
    }

    #[test]
    fn environment_names() {
        assert_eq!("prod".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!(Environment::Staging.to_string(), "staging");
        assert!("qa".parse::<Environment>().is_err());
    }
}
