use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::dispatch::{
    default_corpus, load_corpus_from_path, CorpusError, DepartmentLabel, DispatchSettings,
    RoutingTable, TrainingExample,
};

const DEFAULT_ROUTE_DOMAIN: &str = "university.example";
const MAX_NOTIFY_TIMEOUT_SECS: u64 = 120;

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
    pub dispatch: DispatchConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            dispatch: DispatchConfig::from_env()?,
        })
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

/// Training data, routing, and delivery settings for the dispatch core.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub store_path: PathBuf,
    pub notify_timeout: Duration,
    pub notifications_enabled: bool,
    /// CSV corpus replacing the built-in one when set.
    pub corpus_path: Option<PathBuf>,
    pub routes: RoutingTable,
}

impl DispatchConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let store_path = env::var("DISPATCH_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("outcomes.csv"));

        let notify_timeout = match env::var("DISPATCH_NOTIFY_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidNotifyTimeout(raw.clone()))?;
                if secs == 0 || secs > MAX_NOTIFY_TIMEOUT_SECS {
                    return Err(ConfigError::InvalidNotifyTimeout(raw));
                }
                Duration::from_secs(secs)
            }
            Err(_) => DispatchSettings::default().notify_timeout,
        };

        let notifications_enabled = match env::var("DISPATCH_NOTIFICATIONS") {
            Ok(raw) => parse_switch(&raw).ok_or(ConfigError::InvalidNotificationSwitch(raw))?,
            Err(_) => true,
        };

        let corpus_path = env::var("DISPATCH_CORPUS_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let routes = DepartmentLabel::ALL
            .into_iter()
            .map(|label| {
                let recipient = env::var(route_variable(label))
                    .unwrap_or_else(|_| format!("{}@{}", label.key(), DEFAULT_ROUTE_DOMAIN));
                (label, recipient)
            })
            .collect();

        Ok(Self {
            store_path,
            notify_timeout,
            notifications_enabled,
            corpus_path,
            routes,
        })
    }

    pub fn settings(&self) -> DispatchSettings {
        DispatchSettings {
            notify_timeout: self.notify_timeout,
            notifications_enabled: self.notifications_enabled,
        }
    }

    pub fn training_corpus(&self) -> Result<Vec<TrainingExample>, CorpusError> {
        match &self.corpus_path {
            Some(path) => load_corpus_from_path(path),
            None => Ok(default_corpus()),
        }
    }
}

fn route_variable(label: DepartmentLabel) -> String {
    format!("ROUTE_{}", label.key().to_ascii_uppercase())
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNotifyTimeout(String),
    InvalidNotificationSwitch(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNotifyTimeout(value) => write!(
                f,
                "DISPATCH_NOTIFY_TIMEOUT_SECS must be between 1 and {} (got '{}')",
                MAX_NOTIFY_TIMEOUT_SECS, value
            ),
            ConfigError::InvalidNotificationSwitch(value) => {
                write!(f, "DISPATCH_NOTIFICATIONS must be on or off (got '{}')", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNotifyTimeout(_)
            | ConfigError::InvalidNotificationSwitch(_) => None,
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
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "DISPATCH_STORE_PATH",
            "DISPATCH_NOTIFY_TIMEOUT_SECS",
            "DISPATCH_NOTIFICATIONS",
            "DISPATCH_CORPUS_PATH",
        ] {
            env::remove_var(key);
        }
        for label in DepartmentLabel::ALL {
            env::remove_var(route_variable(label));
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
        assert!(config.telemetry.ansi);
        assert_eq!(config.dispatch.store_path, PathBuf::from("outcomes.csv"));
        assert_eq!(config.dispatch.notify_timeout, Duration::from_secs(15));
        assert!(config.dispatch.notifications_enabled);
        assert!(config.dispatch.corpus_path.is_none());
        assert_eq!(
            config.dispatch.routes.resolve(DepartmentLabel::Hostel),
            Some("hostel@university.example")
        );
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn dispatch_settings_follow_env_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "production");
        env::set_var("DISPATCH_NOTIFY_TIMEOUT_SECS", "10");
        env::set_var("DISPATCH_NOTIFICATIONS", "off");
        env::set_var("ROUTE_SCHOLARSHIP", "aid-office@college.example");

        let config = AppConfig::load().expect("config loads");
        assert!(!config.telemetry.ansi);
        let settings = config.dispatch.settings();
        assert_eq!(settings.notify_timeout, Duration::from_secs(10));
        assert!(!settings.notifications_enabled);
        assert_eq!(
            config.dispatch.routes.resolve(DepartmentLabel::Scholarship),
            Some("aid-office@college.example")
        );
        reset_env();
    }

    #[test]
    fn rejects_out_of_range_timeout_and_bad_switch() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("DISPATCH_NOTIFY_TIMEOUT_SECS", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidNotifyTimeout(_))
        ));

        reset_env();
        env::set_var("DISPATCH_NOTIFICATIONS", "sometimes");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidNotificationSwitch(_))
        ));
        reset_env();
    }

    #[test]
    fn training_corpus_defaults_to_built_in_examples() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads");
        let corpus = config.dispatch.training_corpus().expect("built-in corpus");
        assert_eq!(corpus, default_corpus());
    }
}
