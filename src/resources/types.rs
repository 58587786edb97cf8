//! Resource kinds and their declared fields.
//!
//! Resources are read in the custom-resource shape
//! `{"metadata": {...}, "spec": {...}}`. Only the fields the resolver reads
//! are modelled; everything else in a document is ignored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a resource lives inside a namespace or at cluster level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    Namespaced,
    Cluster,
}

/// Every resource kind the resolver may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Environment,
    Project,
    DataPlane,
    ClusterDataPlane,
    BuildPlane,
    ClusterBuildPlane,
    ObservabilityPlane,
    ClusterObservabilityPlane,
}

impl ResourceKind {
    /// The kind name as it appears in references.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Environment => "Environment",
            Self::Project => "Project",
            Self::DataPlane => "DataPlane",
            Self::ClusterDataPlane => "ClusterDataPlane",
            Self::BuildPlane => "BuildPlane",
            Self::ClusterBuildPlane => "ClusterBuildPlane",
            Self::ObservabilityPlane => "ObservabilityPlane",
            Self::ClusterObservabilityPlane => "ClusterObservabilityPlane",
        }
    }

    pub const fn scope(&self) -> Scope {
        match self {
            Self::ClusterDataPlane | Self::ClusterBuildPlane | Self::ClusterObservabilityPlane => {
                Scope::Cluster
            }
            _ => Scope::Namespaced,
        }
    }

    /// Plural path segment used by the resource API.
    pub const fn collection(&self) -> &'static str {
        match self {
            Self::Environment => "environments",
            Self::Project => "projects",
            Self::DataPlane => "dataplanes",
            Self::ClusterDataPlane => "clusterdataplanes",
            Self::BuildPlane => "buildplanes",
            Self::ClusterBuildPlane => "clusterbuildplanes",
            Self::ObservabilityPlane => "observabilityplanes",
            Self::ClusterObservabilityPlane => "clusterobservabilityplanes",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `{kind, name}` pointer to another resource, as declared on the wire.
///
/// Both fields may be missing. The kind stays a raw string here; it is
/// classified per hop by the resolver's dispatch table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ResourceRef {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            name: Some(name.into()),
        }
    }

    /// Declared kind. An empty string is still a declared (unsupported) kind.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Declared name, treating an empty string as absent.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectMeta {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// A resource document: metadata plus a kind-specific spec.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource<S> {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: S,
}

impl<S> Resource<S> {
    pub fn new(namespace: Option<&str>, name: &str, spec: S) -> Self {
        Self {
            metadata: ObjectMeta {
                name: name.to_string(),
                namespace: namespace.map(str::to_string),
            },
            spec,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnvironmentSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_plane_ref: Option<ResourceRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_plane_ref: Option<ResourceRef>,
}

/// Spec shared by data planes and build planes, in both scopes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaneSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observability_plane_ref: Option<ResourceRef>,
}

/// Terminal spec carrying the endpoint URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityPlaneSpec {
    #[serde(rename = "observerURL", skip_serializing_if = "Option::is_none")]
    pub observer_url: Option<String>,
    #[serde(rename = "rcaAgentURL", skip_serializing_if = "Option::is_none")]
    pub rca_agent_url: Option<String>,
}

pub type Environment = Resource<EnvironmentSpec>;
pub type Project = Resource<ProjectSpec>;
/// A data plane or build plane of either scope.
pub type Plane = Resource<PlaneSpec>;
/// An observability plane of either scope.
pub type ObservabilityPlane = Resource<ObservabilityPlaneSpec>;
