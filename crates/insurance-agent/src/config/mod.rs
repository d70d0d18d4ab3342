use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::workflows::session::DEFAULT_HISTORY_LIMIT;

const DEFAULT_IP_LOOKUP_URL: &str = "https://ipapi.co/json/";
const DEFAULT_REVERSE_BASE_URL: &str = "https://apis.mappls.com/advancedmaps/v1";
const DEFAULT_LLM_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_LLM_MODEL: &str = "gpt-3.5-turbo";

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
    pub geo: GeoConfig,
    pub llm: LlmConfig,
    pub claims: ClaimsConfig,
    pub history: HistoryConfig,
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
        let log_format = match env::var("APP_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw).ok_or(ConfigError::InvalidLogFormat(raw))?,
            Err(_) => LogFormat::Compact,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            geo: GeoConfig::from_env()?,
            llm: LlmConfig::from_env()?,
            claims: ClaimsConfig {
                table_path: optional_var("CLAIMS_TABLE_PATH").map(PathBuf::from),
            },
            history: HistoryConfig::from_env()?,
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

/// Output layout for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Endpoints and credential for the best-effort location lookup.
#[derive(Debug, Clone)]
pub struct GeoConfig {
    pub enabled: bool,
    pub ip_lookup_url: String,
    pub reverse_base_url: String,
    pub reverse_api_key: Option<String>,
    pub timeout: Duration,
}

impl GeoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let enabled = match optional_var("GEO_ENABLED") {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                variable: "GEO_ENABLED",
            })?,
            None => true,
        };

        Ok(Self {
            enabled,
            ip_lookup_url: optional_var("GEO_IP_LOOKUP_URL")
                .unwrap_or_else(|| DEFAULT_IP_LOOKUP_URL.to_string()),
            reverse_base_url: optional_var("GEO_REVERSE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_REVERSE_BASE_URL.to_string()),
            reverse_api_key: optional_var("GEO_REVERSE_API_KEY"),
            timeout: timeout_var("GEO_TIMEOUT_MS", 3_000)?,
        })
    }
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ip_lookup_url: DEFAULT_IP_LOOKUP_URL.to_string(),
            reverse_base_url: DEFAULT_REVERSE_BASE_URL.to_string(),
            reverse_api_key: None,
            timeout: Duration::from_millis(3_000),
        }
    }
}

/// Chat-completion endpoint used for quote narration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl LlmConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let temperature = match optional_var("LLM_TEMPERATURE") {
            Some(raw) => raw
                .parse::<f32>()
                .ok()
                .filter(|value| value.is_finite() && (0.0..=2.0).contains(value))
                .ok_or(ConfigError::InvalidTemperature)?,
            None => 0.2,
        };

        Ok(Self {
            api_url: optional_var("LLM_API_URL").unwrap_or_else(|| DEFAULT_LLM_API_URL.to_string()),
            api_key: optional_var("LLM_API_KEY"),
            model: optional_var("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            temperature,
            timeout: timeout_var("LLM_TIMEOUT_MS", 20_000)?,
        })
    }
}

/// Location of an optional claims table overriding the built-in records.
#[derive(Debug, Clone, Default)]
pub struct ClaimsConfig {
    pub table_path: Option<PathBuf>,
}

/// Retention for the in-memory interaction history.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Oldest entries are dropped once this many are held.
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl HistoryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let limit = match optional_var("HISTORY_LIMIT") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or(ConfigError::InvalidHistoryLimit)?,
            None => DEFAULT_HISTORY_LIMIT,
        };
        Ok(Self { limit })
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn timeout_var(variable: &'static str, default_ms: u64) -> Result<Duration, ConfigError> {
    let millis = match optional_var(variable) {
        Some(raw) => raw
            .parse::<u64>()
            .ok()
            .filter(|value| *value > 0)
            .ok_or(ConfigError::InvalidTimeout { variable })?,
        None => default_ms,
    };
    Ok(Duration::from_millis(millis))
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat(String),
    InvalidFlag { variable: &'static str },
    InvalidTimeout { variable: &'static str },
    InvalidTemperature,
    InvalidHistoryLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'json' (found '{value}')")
            }
            ConfigError::InvalidFlag { variable } => {
                write!(f, "{variable} must be true or false")
            }
            ConfigError::InvalidTimeout { variable } => {
                write!(f, "{variable} must be a positive number of milliseconds")
            }
            ConfigError::InvalidTemperature => {
                write!(f, "LLM_TEMPERATURE must be a number between 0 and 2")
            }
            ConfigError::InvalidHistoryLimit => {
                write!(f, "HISTORY_LIMIT must be a positive whole number")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
