//! IP geolocation module
//!
//! Best-effort country lookup for the caller of a write. Failures here are
//! reported to the caller, who decides to log and move on.

mod countries;
mod ipinfo;

pub use countries::CountryNames;
pub use ipinfo::IpInfoClient;

use async_trait::async_trait;
use serde::Deserialize;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::GeolocationConfig;

/// Result of a successful lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IpDetails {
    #[serde(default)]
    pub ip: String,
    #[serde(default, rename = "country")]
    pub country_code: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    /// Private, loopback or otherwise unroutable address
    #[serde(default)]
    pub bogon: bool,
}

impl IpDetails {
    pub fn country_name<'a>(&self, names: &'a CountryNames) -> Option<&'a str> {
        self.country_code.as_deref().and_then(|code| names.get(code))
    }
}

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("geolocation rate limit exceeded")]
    RateLimited,

    #[error("geolocation request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("geolocation provider returned status {0}")]
    Status(u16),
}

#[async_trait]
pub trait GeoLocator: Send + Sync {
    async fn lookup(&self, ip: IpAddr) -> Result<IpDetails, GeoError>;
}

/// Locator used when geolocation is disabled; never finds a country
pub struct NoopLocator;

#[async_trait]
impl GeoLocator for NoopLocator {
    async fn lookup(&self, ip: IpAddr) -> Result<IpDetails, GeoError> {
        Ok(IpDetails {
            ip: ip.to_string(),
            ..IpDetails::default()
        })
    }
}

/// Build the locator selected in configuration
pub fn from_config(config: &GeolocationConfig) -> Result<Arc<dyn GeoLocator>, GeoError> {
    let locator: Arc<dyn GeoLocator> = if config.enabled {
        Arc::new(IpInfoClient::new(
            &config.base_url,
            config.token.clone(),
            Duration::from_millis(config.timeout_ms),
        )?)
    } else {
        Arc::new(NoopLocator)
    };
    Ok(locator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_provider_payload() {
        let details: IpDetails = serde_json::from_str(
            r#"{"ip":"8.8.8.8","hostname":"dns.google","city":"Mountain View","country":"US"}"#,
        )
        .unwrap();
        assert_eq!(details.ip, "8.8.8.8");
        assert_eq!(details.country_code.as_deref(), Some("US"));
        assert_eq!(details.hostname.as_deref(), Some("dns.google"));
        assert!(!details.bogon);
    }

    #[test]
    fn test_deserialize_bogon() {
        let details: IpDetails =
            serde_json::from_str(r#"{"ip":"127.0.0.1","bogon":true}"#).unwrap();
        assert!(details.bogon);
        assert_eq!(details.country_code, None);
    }

    #[tokio::test]
    async fn test_noop_locator() {
        let details = NoopLocator.lookup("1.2.3.4".parse().unwrap()).await.unwrap();
        assert_eq!(details.ip, "1.2.3.4");
        assert_eq!(details.country_code, None);
    }

    #[test]
    fn test_disabled_config_gives_noop() {
        let cfg = GeolocationConfig {
            enabled: false,
            base_url: "https://ipinfo.io".to_string(),
            token: None,
            timeout_ms: 100,
            country_file: None,
            trust_forwarded_for: false,
        };
        assert!(from_config(&cfg).is_ok());
    }
}
