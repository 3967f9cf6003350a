//! HTTP client implementation

use std::time::Duration;

use chrono::{DateTime, Utc};
use openapi_server::ApiEnvelope;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};
use url::Url;

use crate::errors::TrackerError;

/// Response payload paired with the time the server produced it
#[derive(Debug, Clone)]
pub struct Observed<T> {
    pub data: T,
    /// Envelope timestamp, or the local receive time when the server sent none
    pub observed_at: DateTime<Utc>,
}

/// HTTP client for the tracker API
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// `base_url` points at the API root, e.g. `http://localhost:3002/api`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TrackerError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| TrackerError::ConfigError(format!("invalid API url {}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TrackerError::ConfigError(format!(
                "unsupported API url scheme: {}",
                parsed.scheme()
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make a GET request and unwrap the response envelope
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, TrackerError> {
        Ok(self.get_observed(path).await?.data)
    }

    /// Make a GET request, keeping the envelope timestamp
    pub async fn get_observed<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Observed<T>, TrackerError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        Self::unwrap_envelope(response, "GET").await
    }

    /// Make a POST request, keeping the envelope timestamp
    pub async fn post_observed<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Observed<T>, TrackerError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self.client.post(&url).json(body).send().await?;
        Self::unwrap_envelope(response, "POST").await
    }

    async fn unwrap_envelope<T: DeserializeOwned>(
        response: Response,
        method: &str,
    ) -> Result<Observed<T>, TrackerError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // error bodies are envelopes too; fall back to the raw text otherwise
            let message = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.error)
                .unwrap_or(body);
            error!("HTTP {} failed: {} - {}", method, status, message);
            return Err(match status {
                StatusCode::NOT_FOUND => TrackerError::NotFound(message),
                StatusCode::BAD_REQUEST => TrackerError::Validation(message),
                _ => TrackerError::Server(format!("{}: {}", status, message)),
            });
        }

        let envelope: ApiEnvelope<T> = serde_json::from_str(&body)
            .map_err(|e| TrackerError::Decode(format!("unexpected response body: {}", e)))?;
        let observed_at = envelope.timestamp.unwrap_or_else(Utc::now);
        let data = envelope.into_result().map_err(TrackerError::Server)?;
        Ok(Observed { data, observed_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = ApiClient::new("http://localhost:3002/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3002/api");
    }

    #[test]
    fn test_rejects_invalid_urls() {
        assert!(matches!(
            ApiClient::new("not a url", Duration::from_secs(1)),
            Err(TrackerError::ConfigError(_))
        ));
        assert!(matches!(
            ApiClient::new("ftp://localhost/api", Duration::from_secs(1)),
            Err(TrackerError::ConfigError(_))
        ));
    }
}
