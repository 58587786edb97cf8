//! The resource-lookup contract the resolver reads through.

use async_trait::async_trait;
use thiserror::Error;

use crate::resources::types::{Environment, ObservabilityPlane, Plane, Project, ResourceKind};

/// Errors a resource lookup can produce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The resource does not exist.
    #[error("{kind} '{name}' not found")]
    NotFound { kind: ResourceKind, name: String },

    /// The lookup did not complete within the client's deadline.
    #[error("lookup of {kind} '{name}' timed out")]
    Timeout { kind: ResourceKind, name: String },

    /// The resource API answered with an unexpected status.
    #[error("resource API returned status {status} for {kind} '{name}': {body}")]
    Status {
        kind: ResourceKind,
        name: String,
        status: u16,
        body: String,
    },

    /// The response body could not be decoded.
    #[error("malformed {kind} '{name}': {reason}")]
    Decode {
        kind: ResourceKind,
        name: String,
        reason: String,
    },

    /// The request could not be sent or completed.
    #[error("request for {kind} '{name}' failed: {reason}")]
    Request {
        kind: ResourceKind,
        name: String,
        reason: String,
    },
}

impl LookupError {
    pub fn not_found(kind: ResourceKind, namespace: Option<&str>, name: &str) -> Self {
        Self::NotFound {
            kind,
            name: qualified_name(namespace, name),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Kind of the resource whose lookup failed.
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::NotFound { kind, .. }
            | Self::Timeout { kind, .. }
            | Self::Status { kind, .. }
            | Self::Decode { kind, .. }
            | Self::Request { kind, .. } => *kind,
        }
    }
}

/// `namespace/name` for namespaced resources, `name` otherwise.
pub fn qualified_name(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) => format!("{}/{}", ns, name),
        None => name.to_string(),
    }
}

/// Result type for resource lookups.
pub type LookupResult<T> = Result<T, LookupError>;

/// Read access to the resources that make up a reference chain.
///
/// Every call takes an optional bearer credential which implementations
/// forward unchanged to the backing API.
#[async_trait]
pub trait ResourceLookup: Send + Sync {
    async fn get_environment(
        &self,
        namespace: &str,
        name: &str,
        token: Option<&str>,
    ) -> LookupResult<Environment>;

    async fn get_project(
        &self,
        namespace: &str,
        name: &str,
        token: Option<&str>,
    ) -> LookupResult<Project>;

    async fn get_data_plane(
        &self,
        namespace: &str,
        name: &str,
        token: Option<&str>,
    ) -> LookupResult<Plane>;

    async fn get_cluster_data_plane(&self, name: &str, token: Option<&str>) -> LookupResult<Plane>;

    async fn get_build_plane(
        &self,
        namespace: &str,
        name: &str,
        token: Option<&str>,
    ) -> LookupResult<Plane>;

    async fn get_cluster_build_plane(&self, name: &str, token: Option<&str>) -> LookupResult<Plane>;

    async fn get_observability_plane(
        &self,
        namespace: &str,
        name: &str,
        token: Option<&str>,
    ) -> LookupResult<ObservabilityPlane>;

    async fn get_cluster_observability_plane(
        &self,
        name: &str,
        token: Option<&str>,
    ) -> LookupResult<ObservabilityPlane>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LookupError::not_found(ResourceKind::DataPlane, Some("org-1"), "primary");
        assert_eq!(err.to_string(), "DataPlane 'org-1/primary' not found");
        assert!(err.is_not_found());
        assert_eq!(err.kind(), ResourceKind::DataPlane);

        let err = LookupError::Timeout {
            kind: ResourceKind::ClusterBuildPlane,
            name: "shared".into(),
        };
        assert_eq!(err.to_string(), "lookup of ClusterBuildPlane 'shared' timed out");
        assert!(!err.is_not_found());
    }
}
