// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub geolocation: GeolocationConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
}

/// Routes configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RoutesConfig {
    /// Path of the message endpoint
    #[serde(default = "default_messages_path")]
    pub messages_path: String,
    /// Page users land on after posting; `?user=<id>` is appended
    #[serde(default = "default_user_page")]
    pub user_page: String,
    /// Health check configuration
    #[serde(default)]
    pub health: HealthConfig,
}

#[allow(clippy::missing_const_for_fn)]
fn default_messages_path() -> String {
    "/messages".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_user_page() -> String {
    "/user-page.html".to_string()
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            messages_path: default_messages_path(),
            user_page: default_user_page(),
            health: HealthConfig::default(),
        }
    }
}

/// Health check configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HealthConfig {
    /// Enable health check endpoints
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,
    /// Liveness probe path (default: /healthz)
    #[serde(default = "default_healthz_path")]
    pub liveness_path: String,
    /// Readiness probe path (default: /readyz)
    #[serde(default = "default_readyz_path")]
    pub readiness_path: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_enabled() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_healthz_path() -> String {
    "/healthz".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_readyz_path() -> String {
    "/readyz".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            liveness_path: default_healthz_path(),
            readiness_path: default_readyz_path(),
        }
    }
}

/// Persistence backend selection
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

/// Message store configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// SQLite database file, ignored by the memory backend
    pub path: String,
}

/// Session authentication configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Cookie carrying the session token
    pub cookie_name: String,
    /// Where unauthenticated writers are sent
    pub login_url: String,
    /// Known sessions; tokens are kept in a list because config keys are case-folded
    #[serde(default)]
    pub sessions: Vec<SessionEntry>,
}

/// One `[[auth.sessions]]` table
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionEntry {
    pub token: String,
    pub email: String,
}

/// IP geolocation provider configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GeolocationConfig {
    pub enabled: bool,
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    pub timeout_ms: u64,
    /// JSON file mapping country codes to display names
    #[serde(default)]
    pub country_file: Option<String>,
    /// Use the first `X-Forwarded-For` entry instead of the peer address
    #[serde(default)]
    pub trust_forwarded_for: bool,
}
