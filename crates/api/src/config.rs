//! Application configuration loaded from environment variables.

use domain::TokenConfig;

const DEFAULT_JWT_SECRET: &str = "superSecretKey";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
/// - `DATABASE_URL`: PostgreSQL connection string; unset selects the in-memory store
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: `10`)
/// - `JWT_SECRET`: token signing secret
/// - `JWT_EXPIRATION_SECS`: token lifetime (default: `3600`)
/// - `ADMIN_USERNAME`, `ADMIN_PASSWORD`: bootstrap administrator
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: Option<String>,
    pub jwt_expiration_secs: i64,
    pub admin: Option<AdminBootstrap>,
}

/// Credentials of the administrator created at startup.
#[derive(Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    var(name).and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let admin = match (var("ADMIN_USERNAME"), var("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminBootstrap { username, password }),
            _ => None,
        };

        Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: parsed("PORT", defaults.port),
            log_level: var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: match var("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            database_url: var("DATABASE_URL"),
            database_max_connections: parsed(
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            ),
            jwt_secret: var("JWT_SECRET"),
            jwt_expiration_secs: parsed("JWT_EXPIRATION_SECS", defaults.jwt_expiration_secs),
            admin,
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns true when no signing secret was configured.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret.is_none()
    }

    /// Builds the token settings, falling back to the development secret.
    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            secret: self
                .jwt_secret
                .clone()
                .unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string()),
            expiration_secs: self.jwt_expiration_secs,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            database_url: None,
            database_max_connections: 10,
            jwt_secret: None,
            jwt_expiration_secs: 3600,
            admin: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.database_url.is_none());
        assert!(config.admin.is_none());
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_token_config_falls_back_to_default_secret() {
        let config = Config::default();
        assert!(config.uses_default_secret());
        assert_eq!(config.token_config().secret, "superSecretKey");
        assert_eq!(config.token_config().expiration_secs, 3600);

        let config = Config {
            jwt_secret: Some("s3cret".to_string()),
            jwt_expiration_secs: 60,
            ..Config::default()
        };
        assert!(!config.uses_default_secret());
        assert_eq!(config.token_config().secret, "s3cret");
        assert_eq!(config.token_config().expiration_secs, 60);
    }

    #[test]
    fn test_admin_password_is_not_debug_printed() {
        let admin = AdminBootstrap {
            username: "root".to_string(),
            password: "hunter22".to_string(),
        };
        let printed = format!("{admin:?}");
        assert!(printed.contains("root"));
        assert!(!printed.contains("hunter22"));
    }
}
