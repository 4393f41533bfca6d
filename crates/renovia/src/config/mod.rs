use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const DEV_JWT_SECRET: &str = "renovia-development-secret";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub subsidy: SubsidyConfig,
    pub bootstrap_admin: Option<AdminSeed>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = LogFormat::from_str(
            &env::var("APP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
        );

        let database = DatabaseConfig {
            url: non_empty_var("APP_DATABASE_URL"),
            name: env::var("APP_DATABASE_NAME").unwrap_or_else(|_| "renovia".to_string()),
        };

        let jwt_secret = match non_empty_var("APP_JWT_SECRET") {
            Some(secret) => secret,
            None if environment == AppEnvironment::Production => {
                return Err(ConfigError::MissingSecret)
            }
            None => DEV_JWT_SECRET.to_string(),
        };
        let token_ttl_hours = parse_var("APP_TOKEN_TTL_HOURS", 24_i64)?;
        if token_ttl_hours <= 0 {
            return Err(ConfigError::InvalidNumber {
                variable: "APP_TOKEN_TTL_HOURS",
            });
        }

        let grant_ratio = parse_var("APP_GRANT_RATIO", SubsidyConfig::DEFAULT_GRANT_RATIO)?;
        if !(0.0..=1.0).contains(&grant_ratio) {
            return Err(ConfigError::InvalidNumber {
                variable: "APP_GRANT_RATIO",
            });
        }

        let bootstrap_admin = match (
            non_empty_var("APP_ADMIN_EMAIL"),
            non_empty_var("APP_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(AdminSeed {
                name: non_empty_var("APP_ADMIN_NAME").unwrap_or_else(|| "Administrateur".into()),
                email,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                format: log_format,
            },
            database,
            auth: AuthConfig {
                jwt_secret,
                token_ttl_hours,
            },
            subsidy: SubsidyConfig { grant_ratio },
            bootstrap_admin,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match non_empty_var(name) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { variable: name }),
        None => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing output controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Compact,
        }
    }
}

/// Document store location. Without a URL the service keeps records in memory.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub name: String,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

/// Subsidy computation parameters.
#[derive(Debug, Clone, Copy)]
pub struct SubsidyConfig {
    pub grant_ratio: f64,
}

impl SubsidyConfig {
    pub const DEFAULT_GRANT_RATIO: f64 = 0.2857;
}

impl Default for SubsidyConfig {
    fn default() -> Self {
        Self {
            grant_ratio: Self::DEFAULT_GRANT_RATIO,
        }
    }
}

/// Administrator account created at startup when missing.
#[derive(Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSeed")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { variable: &'static str },
    MissingSecret,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { variable } => {
                write!(f, "{variable} is not a valid value")
            }
            ConfigError::MissingSecret => {
                write!(f, "APP_JWT_SECRET must be set in production")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::MissingSecret => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LOG_FORMAT",
            "APP_DATABASE_URL",
            "APP_DATABASE_NAME",
            "APP_JWT_SECRET",
            "APP_TOKEN_TTL_HOURS",
            "APP_GRANT_RATIO",
            "APP_ADMIN_EMAIL",
            "APP_ADMIN_PASSWORD",
            "APP_ADMIN_NAME",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.format, LogFormat::Compact);
        assert!(config.database.url.is_none());
        assert_eq!(config.database.name, "renovia");
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert!((config.subsidy.grant_ratio - 0.2857).abs() < f64::EPSILON);
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn production_requires_jwt_secret() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "production");
        let err = AppConfig::load().expect_err("secret is mandatory");
        assert!(matches!(err, ConfigError::MissingSecret));

        env::set_var("APP_JWT_SECRET", "s3cret");
        let config = AppConfig::load().expect("config loads with secret");
        assert_eq!(config.auth.jwt_secret, "s3cret");
        reset_env();
    }

    #[test]
    fn rejects_out_of_range_grant_ratio() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_GRANT_RATIO", "1.5");
        let err = AppConfig::load().expect_err("ratio above one");
        assert!(matches!(
            err,
            ConfigError::InvalidNumber {
                variable: "APP_GRANT_RATIO"
            }
        ));
        reset_env();
    }

    #[test]
    fn admin_seed_requires_email_and_password() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ADMIN_EMAIL", "admin@renovia.fr");
        let config = AppConfig::load().expect("config loads");
        assert!(config.bootstrap_admin.is_none());

        env::set_var("APP_ADMIN_PASSWORD", "changeme123");
        let config = AppConfig::load().expect("config loads");
        let seed = config.bootstrap_admin.expect("seed configured");
        assert_eq!(seed.email, "admin@renovia.fr");
        assert_eq!(seed.name, "Administrateur");
        reset_env();
    }
}
