//! Request input decoding
//!
//! Query strings and `application/x-www-form-urlencoded` bodies, plus body
//! collection bounded by the configured maximum size.

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use std::error::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BodyError {
    #[error("request body exceeds {0} bytes")]
    TooLarge(usize),

    #[error("failed to read request body: {0}")]
    Read(Box<dyn Error + Send + Sync>),
}

/// Collect the whole request body, failing once it grows past `limit` bytes
pub async fn read_body<B>(body: B, limit: usize) -> Result<Bytes, BodyError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => Err(BodyError::TooLarge(limit)),
        Err(e) => Err(BodyError::Read(e)),
    }
}

/// Decoded name/value pairs in input order
pub struct Params(Vec<(String, String)>);

impl Params {
    /// Decode a query string (without the leading `?`); undecodable input yields no pairs
    pub fn from_query(query: Option<&str>) -> Self {
        Self(query.and_then(|q| serde_urlencoded::from_str(q).ok()).unwrap_or_default())
    }

    /// Decode a url-encoded form body; undecodable input yields no pairs
    pub fn from_form(body: &[u8]) -> Self {
        Self(serde_urlencoded::from_bytes(body).unwrap_or_default())
    }

    /// First value of `name`, like a servlet's `getParameter`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Encode a single `name=value` pair for use in a URL
pub fn encode_pair(name: &str, value: &str) -> String {
    serde_urlencoded::to_string(&[(name, value)]).unwrap_or_default()
}
