//! HTTP client abstraction for the provider backends.
//!
//! This module provides a trait-based abstraction over HTTP clients, enabling
//! dependency injection and easy mocking in tests.

use anyhow::{Result, bail};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use tracing::debug;

/// Trait for HTTP communication with the generation backends.
///
/// This abstraction allows injecting mock HTTP clients for testing without
/// making real network requests.
///
/// # Example
///
/// ```ignore
/// use goco::http_client::{HttpClient, ReqwestHttpClient};
///
/// let client = ReqwestHttpClient::new();
/// let response = client.post_json(
///     "https://api.groq.com/openai/v1/chat/completions",
///     &[("Authorization", "Bearer gsk_...")],
///     &serde_json::json!({"model": "llama-3.3-70b-versatile", "messages": []}),
/// ).await?;
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a POST request with JSON body and returns the response text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the response cannot be read,
    /// or the server answers with a non-success status.
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<String>;

    /// Sends a GET request and returns the response text.
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<String>;
}

/// HTTP client implementation using reqwest.
///
/// No request timeout is configured: generation calls run until the backend
/// answers or the connection fails.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Creates a new HTTP client with default configuration.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    async fn send(request: RequestBuilder, headers: &[(&str, &str)]) -> Result<String> {
        let mut request = request;
        for (key, value) in headers {
            request = request.header(*key, *value);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!("HTTP {} ({} bytes)", status, text.len());

        if !status.is_success() {
            bail!("HTTP {}: {}", status, text.trim());
        }
        Ok(text)
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<String> {
        Self::send(self.client.post(url).json(body), headers).await
    }

    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<String> {
        Self::send(self.client.get(url), headers).await
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MockHttpClient;
    use super::*;

    #[tokio::test]
    async fn test_mock_http_client_returns_responses_in_order() {
        let client = MockHttpClient::new("first").then("second");

        assert_eq!(client.get("http://a", &[]).await.unwrap(), "first");
        let body = serde_json::json!({"k": "v"});
        assert_eq!(
            client.post_json("http://b", &[("x", "y")], &body).await.unwrap(),
            "second"
        );

        let requests = client.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[1].body.as_ref().unwrap(), &body);
        assert_eq!(requests[1].headers, vec![("x".to_string(), "y".to_string())]);
    }

    #[tokio::test]
    async fn test_mock_http_client_failure() {
        let client = MockHttpClient::failing("HTTP 500: boom");
        let err = client.get("http://a", &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500: boom");
    }
}
