use std::fmt;
use std::time::Duration;

use crate::ports::spotify::{ApiRequest, RequestExecutor};
use crate::spotify_rs::error::SpotifyApiError;
use crate::spotify_rs::types::SpotifyErrorResponse;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Bearer token for the Web API. Acquiring and refreshing it happens elsewhere.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Spotify API client
pub struct SpotifyHttpClient {
    access_token: AccessToken,
    client: reqwest::Client,
    timeout: Duration,
}

impl SpotifyHttpClient {
    pub fn new(access_token: AccessToken) -> Self {
        Self {
            access_token,
            client: reqwest::Client::new(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait::async_trait]
impl RequestExecutor for SpotifyHttpClient {
    async fn perform_request(
        &self,
        request: ApiRequest,
    ) -> Result<serde_json::Value, SpotifyApiError> {
        let ApiRequest { method, url, body } = request;
        log::debug!("{} {}", method, url);

        let mut builder = self
            .client
            .request(method, url.clone())
            .bearer_auth(self.access_token.secret())
            .timeout(self.timeout);
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let transport = |source: reqwest::Error| SpotifyApiError::Transport {
            url: url.to_string(),
            source,
        };

        let response = builder.send().await.map_err(transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(transport)?;

        if !status.is_success() {
            let message = serde_json::from_slice::<SpotifyErrorResponse>(&bytes)
                .ok()
                .and_then(|body| body.error.message);
            log::debug!("{} answered {}", url, status);
            return Err(SpotifyApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        // Some mutations answer 2xx without a body
        if bytes.is_empty() {
            return Ok(serde_json::Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(|source| SpotifyApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
