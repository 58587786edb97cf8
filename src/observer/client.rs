//! Thin HTTP clients bound to resolved observability endpoints.

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::ObserverConfig;
use crate::error::{parse_base_url, truncate_body, ClientError};
use crate::resolver::ObservabilityUrls;

/// Builds [`ObserverClient`]s sharing one connection pool.
#[derive(Clone, Debug)]
pub struct ObservabilityClientFactory {
    http: Client,
}

impl ObservabilityClientFactory {
    pub fn new(config: &ObserverConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;
        Ok(Self { http })
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    /// Client bound to an arbitrary base URL.
    pub fn client_for(&self, base_url: &str) -> Result<ObserverClient, ClientError> {
        let mut base_url = parse_base_url(base_url)?;
        // Relative joins replace the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(ObserverClient {
            http: self.http.clone(),
            base_url,
        })
    }

    /// Client for the observer, or `None` when observability is not configured.
    pub fn for_observer(&self, urls: &ObservabilityUrls) -> Result<Option<ObserverClient>, ClientError> {
        urls.observer_url
            .as_deref()
            .map(|url| self.client_for(url))
            .transpose()
    }

    /// Client for the RCA agent, or `None` when it is not configured.
    pub fn for_rca_agent(&self, urls: &ObservabilityUrls) -> Result<Option<ObserverClient>, ClientError> {
        urls.rca_agent_url
            .as_deref()
            .map(|url| self.client_for(url))
            .transpose()
    }
}

/// HTTP client bound to one observer (or RCA agent) base URL.
#[derive(Clone, Debug)]
pub struct ObserverClient {
    http: Client,
    base_url: Url,
}

impl ObserverClient {
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL of `path` under the base URL.
    ///
    /// Absolute URLs and paths that climb out of the base are rejected.
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        if Url::parse(path).is_ok() {
            return Err(ClientError::InvalidUrl {
                url: path.to_string(),
                reason: "expected a path relative to the observer base URL".to_string(),
            });
        }

        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidUrl {
                url: path.to_string(),
                reason: e.to_string(),
            })?;

        if !url.as_str().starts_with(self.base_url.as_str()) {
            return Err(ClientError::InvalidUrl {
                url: path.to_string(),
                reason: "path escapes the observer base URL".to_string(),
            });
        }
        Ok(url)
    }

    /// GET `path` with query parameters and decode a JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        token: Option<&str>,
    ) -> Result<T, ClientError> {
        let url = self.endpoint(path)?;
        let request = self.http.get(url.clone()).query(query);
        self.send(url, request, token).await
    }

    /// POST a JSON body to `path` and decode a JSON response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B, token: Option<&str>) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let request = self.http.post(url.clone()).json(body);
        self.send(url, request, token).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        url: Url,
        mut request: RequestBuilder,
        token: Option<&str>,
    ) -> Result<T, ClientError> {
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "Observer request failed");
            return Err(ClientError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: truncate_body(text),
            });
        }

        serde_json::from_str(&text).map_err(|e| ClientError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}
