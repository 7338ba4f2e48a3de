//! HTTP transport.
//!
//! The clients only ever issue GETs and need the raw status, headers and
//! body (rate-limit headers drive pacing), so the transport is a single
//! method behind a trait that tests replace.

use crate::config::ApiConfig;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

/// A buffered HTTP response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Header names are stored lowercased.
    headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Body as text, truncated for error messages.
    pub fn body_snippet(&self) -> String {
        let text = String::from_utf8_lossy(&self.body);
        text.chars().take(200).collect()
    }
}

/// Issues GET requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET `url`, optionally with a bearer token.
    ///
    /// Non-2xx statuses are returned as responses, not errors; only
    /// transport failures error.
    async fn get(&self, url: Url, bearer: Option<String>) -> Result<HttpResponse>;
}

/// [`HttpTransport`] backed by reqwest.
#[derive(Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: Url, bearer: Option<String>) -> Result<HttpResponse> {
        let mut request = self.http.get(url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_ignores_case() {
        let response = HttpResponse::new(200).with_header("X-Rate-Limit-Rules", "Account");
        assert_eq!(response.header("x-rate-limit-rules"), Some("Account"));
        assert_eq!(response.header("X-RATE-LIMIT-RULES"), Some("Account"));
        assert!(response.is_success());
    }

    #[test]
    fn test_body_snippet_truncates() {
        let response = HttpResponse::new(500).with_body("x".repeat(500));
        assert_eq!(response.body_snippet().len(), 200);
        assert!(!response.is_success());
    }
}
