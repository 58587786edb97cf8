//! Resource API client over HTTP.
//!
//! # Responsibilities
//! - Map each lookup onto its REST path
//! - Forward the caller's bearer credential unchanged
//! - Classify failures (not found, timeout, bad status, malformed body)

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ResourceApiConfig;
use crate::error::{parse_base_url, truncate_body, ClientError};
use crate::observability::metrics;
use crate::resources::lookup::{qualified_name, LookupError, LookupResult, ResourceLookup};
use crate::resources::types::{Environment, ObservabilityPlane, Plane, Project, ResourceKind};

/// [`ResourceLookup`] backed by the resource REST API.
#[derive(Clone)]
pub struct HttpResourceClient {
    client: Client,
    base_url: Url,
    /// Used when a call carries no credential of its own.
    default_token: Option<String>,
}

impl HttpResourceClient {
    /// Create a client from configuration.
    ///
    /// The configured timeout bounds every lookup, so a stalled API surfaces
    /// as a [`LookupError::Timeout`] instead of hanging a resolution.
    pub fn new(config: &ResourceApiConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self::with_client(client, &config.base_url)?.with_token(config.token.clone()))
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
            default_token: None,
        })
    }

    /// Set the credential used when a call carries none.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.default_token = token;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the URL of a single resource.
    pub fn resource_url(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        name: &str,
    ) -> LookupResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| LookupError::Request {
                kind,
                name: qualified_name(namespace, name),
                reason: format!("base URL '{}' cannot carry a path", self.base_url),
            })?;
            segments.pop_if_empty().extend(["api", "v1"]);
            if let Some(ns) = namespace {
                segments.push("namespaces").push(ns);
            }
            segments.push(kind.collection()).push(name);
        }
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        name: &str,
        token: Option<&str>,
    ) -> LookupResult<T> {
        metrics::record_lookup(kind.as_str());
        let url = self.resource_url(kind, namespace, name)?;
        let qualified = qualified_name(namespace, name);

        tracing::debug!(kind = %kind, name = %qualified, url = %url, "Resource lookup");

        let mut request = self.client.get(url);
        if let Some(token) = token.or(self.default_token.as_deref()) {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| classify_transport(kind, &qualified, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound {
                kind,
                name: qualified,
            });
        }
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(kind = %kind, name = %qualified, error = %e, "Failed to read error body");
                    String::new()
                }
            };
            tracing::warn!(kind = %kind, name = %qualified, status = status.as_u16(), "Resource API error");
            return Err(LookupError::Status {
                kind,
                name: qualified,
                status: status.as_u16(),
                body: truncate_body(body),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_transport(kind, &qualified, e))?;

        serde_json::from_slice(&bytes).map_err(|e| LookupError::Decode {
            kind,
            name: qualified,
            reason: e.to_string(),
        })
    }
}

fn classify_transport(kind: ResourceKind, name: &str, err: reqwest::Error) -> LookupError {
    if err.is_timeout() {
        LookupError::Timeout {
            kind,
            name: name.to_string(),
        }
    } else {
        LookupError::Request {
            kind,
            name: name.to_string(),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl ResourceLookup for HttpResourceClient {
    async fn get_environment(
        &self,
        namespace: &str,
        name: &str,
        token: Option<&str>,
    ) -> LookupResult<Environment> {
        self.fetch(ResourceKind::Environment, Some(namespace), name, token)
            .await
    }

    async fn get_project(
        &self,
        namespace: &str,
        name: &str,
        token: Option<&str>,
    ) -> LookupResult<Project> {
        self.fetch(ResourceKind::Project, Some(namespace), name, token)
            .await
    }

    async fn get_data_plane(
        &self,
        namespace: &str,
        name: &str,
        token: Option<&str>,
    ) -> LookupResult<Plane> {
        self.fetch(ResourceKind::DataPlane, Some(namespace), name, token)
            .await
    }

    async fn get_cluster_data_plane(&self, name: &str, token: Option<&str>) -> LookupResult<Plane> {
        self.fetch(ResourceKind::ClusterDataPlane, None, name, token)
            .await
    }

    async fn get_build_plane(
        &self,
        namespace: &str,
        name: &str,
        token: Option<&str>,
    ) -> LookupResult<Plane> {
        self.fetch(ResourceKind::BuildPlane, Some(namespace), name, token)
            .await
    }

    async fn get_cluster_build_plane(&self, name: &str, token: Option<&str>) -> LookupResult<Plane> {
        self.fetch(ResourceKind::ClusterBuildPlane, None, name, token)
            .await
    }

    async fn get_observability_plane(
        &self,
        namespace: &str,
        name: &str,
        token: Option<&str>,
    ) -> LookupResult<ObservabilityPlane> {
        self.fetch(ResourceKind::ObservabilityPlane, Some(namespace), name, token)
            .await
    }

    async fn get_cluster_observability_plane(
        &self,
        name: &str,
        token: Option<&str>,
    ) -> LookupResult<ObservabilityPlane> {
        self.fetch(ResourceKind::ClusterObservabilityPlane, None, name, token)
            .await
    }
}

impl std::fmt::Debug for HttpResourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResourceClient")
            .field("base_url", &self.base_url.as_str())
            .field("has_default_token", &self.default_token.is_some())
            .finish()
    }
}
