// ipinfo.io client
// GET {base_url}/{ip}?token=... returning a JSON object per address

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::net::IpAddr;
use std::time::Duration;

use super::{GeoError, GeoLocator, IpDetails};

pub struct IpInfoClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl IpInfoClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, GeoError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    fn lookup_url(&self, ip: IpAddr) -> String {
        match &self.token {
            Some(token) => format!("{}/{ip}?token={token}", self.base_url),
            None => format!("{}/{ip}", self.base_url),
        }
    }
}

#[async_trait]
impl GeoLocator for IpInfoClient {
    async fn lookup(&self, ip: IpAddr) -> Result<IpDetails, GeoError> {
        let response = self.client.get(self.lookup_url(ip)).send().await?;
        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(GeoError::RateLimited),
            status if !status.is_success() => Err(GeoError::Status(status.as_u16())),
            _ => Ok(response.json::<IpDetails>().await?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_url() {
        let client =
            IpInfoClient::new("https://ipinfo.io/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.lookup_url("8.8.4.4".parse().unwrap()),
            "https://ipinfo.io/8.8.4.4"
        );
        assert_eq!(
            client.lookup_url("::1".parse().unwrap()),
            "https://ipinfo.io/::1"
        );
    }

    #[test]
    fn test_lookup_url_with_token() {
        let client = IpInfoClient::new(
            "https://ipinfo.io",
            Some("abc123".to_string()),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            client.lookup_url("8.8.4.4".parse().unwrap()),
            "https://ipinfo.io/8.8.4.4?token=abc123"
        );
    }

    #[test]
    fn test_blank_token_dropped() {
        let client = IpInfoClient::new(
            "https://ipinfo.io",
            Some(String::new()),
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(client.token.is_none());
    }
}
