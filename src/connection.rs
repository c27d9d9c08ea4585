use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult, AvrError, Result};
use crate::protocol::{ApiCall, Reply, Request, Response, Service};
use reqwest::{Client, Url};
use serde_json::Value;

/// Low-level JSON-RPC connection to one receiver
///
/// Each call is a single HTTP POST to `{base_url}/{service}`. The connection keeps
/// no device state and never retries; a failed call is reported and the next poll
/// tries again.
#[derive(Debug, Clone)]
pub struct Connection {
    http: Client,
    base_url: String,
    request_id: u32,
}

impl Connection {
    /// Create a connection to the given base URL
    ///
    /// Fails only when the configuration or the base URL is unusable.
    pub fn new(base_url: impl Into<String>, config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url)
            .map_err(|e| AvrError::InvalidConfig(format!("base URL {}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AvrError::InvalidConfig(format!(
                "base URL {} is not an HTTP URL",
                base_url
            )));
        }

        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            base_url,
            request_id: config.request_id,
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint URL for a service family
    pub fn endpoint(&self, service: Service) -> String {
        format!("{}/{}", self.base_url, service)
    }

    /// Invoke one of the fixed API calls
    pub async fn invoke(&self, call: &ApiCall, params: Vec<Value>) -> ApiResult<Reply> {
        self.call(call.service, call.method, call.version, params)
            .await
    }

    /// Send a request and wait for the reply
    pub async fn call(
        &self,
        service: Service,
        method: &str,
        version: &str,
        params: Vec<Value>,
    ) -> ApiResult<Reply> {
        let url = self.endpoint(service);
        let request = Request::new(method, version)
            .with_id(self.request_id)
            .with_params(params);

        tracing::debug!("POST {} {}", url, serde_json::to_string(&request).unwrap_or_default());

        let response = match self.http.post(&url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("{} to {} failed: {}", method, url, e);
                return Err(ApiError::Unreachable(e.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("{} to {} returned HTTP {}", method, url, status);
            return Err(ApiError::Unreachable(format!("HTTP status {}", status)));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to read {} response from {}: {}", method, url, e);
                return Err(ApiError::Unreachable(e.to_string()));
            }
        };

        tracing::debug!("Response to {}: {}", method, body);

        let envelope: Response = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!("Unparseable {} response from {}: {}", method, url, e);
            ApiError::InvalidResponse(e.to_string())
        })?;

        envelope.into_reply().inspect_err(|e| {
            if let ApiError::Rejected { code, message } = e {
                tracing::warn!("{} returned error: {} - {}", method, code, message);
            }
        })
    }
}
