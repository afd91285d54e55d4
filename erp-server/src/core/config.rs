//! Server Configuration
//!
//! Reads configuration from environment variables with sensible defaults,
//! so the server starts with nothing but a work directory.

use std::path::{Path, PathBuf};

use crate::auth::JwtConfig;

/// Runtime configuration for the ERP server
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory for all persistent state (database, logs)
    pub work_dir: PathBuf,

    /// HTTP listen port
    pub http_port: u16,

    /// JWT signing configuration
    pub jwt: JwtConfig,

    /// Deployment environment: "development" or "production"
    pub environment: String,

    /// HTTP gateway used to deliver outbound email
    pub email_gateway_url: String,

    /// Base URL embedded in invitation links sent to new users
    pub invite_base_url: String,

    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Grace period for in-flight requests during shutdown
    pub shutdown_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/var/lib/erp/server"));

        let http_port = std::env::var("HTTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let email_gateway_url = std::env::var("EMAIL_GATEWAY_URL")
            .unwrap_or_else(|_| "http://localhost:8080/api/send".to_string());

        let invite_base_url = std::env::var("INVITE_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        let request_timeout_ms = std::env::var("REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30_000);

        let shutdown_timeout_ms = std::env::var("SHUTDOWN_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10_000);

        Self {
            work_dir,
            http_port,
            jwt: JwtConfig::default(),
            environment,
            email_gateway_url,
            invite_base_url,
            request_timeout_ms,
            shutdown_timeout_ms,
        }
    }

    /// Build a configuration for tests with an explicit work directory and port
    pub fn with_overrides(work_dir: impl AsRef<Path>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.as_ref().to_path_buf();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        !self.is_production()
    }

    /// Directory holding the embedded database files
    pub fn database_dir(&self) -> PathBuf {
        self.work_dir.join("db")
    }

    /// Directory holding rotated log files
    pub fn logs_dir(&self) -> PathBuf {
        self.work_dir.join("logs")
    }

    /// Create the work directory layout if it does not exist yet
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_overrides() {
        let config = Config::with_overrides("/tmp/erp-test", 0);
        assert_eq!(config.work_dir, PathBuf::from("/tmp/erp-test"));
        assert_eq!(config.http_port, 0);
        assert_eq!(config.database_dir(), PathBuf::from("/tmp/erp-test/db"));
        assert_eq!(config.logs_dir(), PathBuf::from("/tmp/erp-test/logs"));
    }

    #[test]
    fn test_environment_flags() {
        let mut config = Config::with_overrides("/tmp/erp-test", 0);
        config.environment = "production".to_string();
        assert!(config.is_production());
        assert!(!config.is_development());

        config.environment = "development".to_string();
        assert!(config.is_development());
    }
}
