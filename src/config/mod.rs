// Configuration module entry point
// Manages application configuration and shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{AuthConfig, Config, GeolocationConfig, SessionEntry, StoreBackend, StoreConfig};

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("BOARD")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "message-board/0.1")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("store.backend", "sqlite")?
            .set_default("store.path", "messages.db")?
            .set_default("auth.cookie_name", "session")?
            .set_default("auth.login_url", "/index.html")?
            .set_default("geolocation.enabled", true)?
            .set_default("geolocation.base_url", "https://ipinfo.io")?
            .set_default("geolocation.timeout_ms", 2000)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("does-not-exist/config").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.routes.messages_path, "/messages");
        assert_eq!(cfg.routes.user_page, "/user-page.html");
        assert_eq!(cfg.store.backend, StoreBackend::Sqlite);
        assert_eq!(cfg.auth.login_url, "/index.html");
        assert_eq!(cfg.auth.cookie_name, "session");
        assert!(cfg.auth.sessions.is_empty());
        assert!(cfg.geolocation.enabled);
        assert!(!cfg.geolocation.trust_forwarded_for);
        assert_eq!(cfg.logging.access_log_format, "combined");
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::load_from("does-not-exist/config").unwrap();
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 8080);
    }
}
