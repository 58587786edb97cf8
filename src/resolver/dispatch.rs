//! Per-hop kind dispatch.
//!
//! Each hop that follows a `{kind, name}` reference has one row here: the
//! namespace-scoped kind, the cluster-scoped kind, the default name and the
//! lookup for each scope. Both resolution paths go through these rows, so a
//! new kind is added by editing a row rather than the resolver.

use std::future::Future;
use std::pin::Pin;

use crate::resolver::error::{Hop, ResolveError};
use crate::resources::types::{ObservabilityPlane, Plane, ResourceKind, ResourceRef, Scope};
use crate::resources::{LookupResult, ResourceLookup};

/// Name substituted for any absent reference name.
pub const DEFAULT_NAME: &str = "default";

/// Boxed future returned by a table lookup.
pub type LookupFuture<'a, T> = Pin<Box<dyn Future<Output = LookupResult<T>> + Send + 'a>>;

/// Lookup function for one scope of a hop: `(lookup, namespace, name, token)`.
///
/// Cluster-scoped lookups ignore the namespace argument.
pub type Fetch<T> =
    for<'a> fn(&'a dyn ResourceLookup, &'a str, &'a str, Option<&'a str>) -> LookupFuture<'a, T>;

/// Dispatch row for one hop.
pub struct HopTable<T> {
    pub hop: Hop,
    pub namespaced: ResourceKind,
    pub cluster: ResourceKind,
    pub default_name: &'static str,
    fetch_namespaced: Fetch<T>,
    fetch_cluster: Fetch<T>,
}

/// A classified reference: which kind to look up, under which name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaneTarget {
    pub kind: ResourceKind,
    pub scope: Scope,
    pub name: String,
    /// Whether the parent declared a reference at all.
    pub explicit: bool,
}

impl<T> HopTable<T> {
    /// Classify a raw reference into a typed target.
    ///
    /// An absent reference targets `default_name` in `implicit_scope`. A
    /// present reference without a kind is namespace-scoped; a kind other
    /// than the two in this row is an error.
    pub fn classify(
        &self,
        reference: Option<&ResourceRef>,
        implicit_scope: Scope,
    ) -> Result<PlaneTarget, ResolveError> {
        let Some(reference) = reference else {
            return Ok(self.target(implicit_scope, self.default_name, false));
        };

        let scope = match reference.kind() {
            None => Scope::Namespaced,
            Some(kind) if kind == self.namespaced.as_str() => Scope::Namespaced,
            Some(kind) if kind == self.cluster.as_str() => Scope::Cluster,
            Some(kind) => {
                return Err(ResolveError::UnsupportedKind {
                    hop: self.hop,
                    kind: kind.to_string(),
                })
            }
        };
        let name = reference.name().unwrap_or(self.default_name);
        Ok(self.target(scope, name, true))
    }

    /// Target for the default name in the given scope.
    pub fn default_target(&self, scope: Scope) -> PlaneTarget {
        self.target(scope, self.default_name, false)
    }

    pub fn kind_for(&self, scope: Scope) -> ResourceKind {
        match scope {
            Scope::Namespaced => self.namespaced,
            Scope::Cluster => self.cluster,
        }
    }

    /// Look up the resource a target points at.
    pub fn fetch<'a>(
        &self,
        lookup: &'a dyn ResourceLookup,
        namespace: &'a str,
        target: &'a PlaneTarget,
        token: Option<&'a str>,
    ) -> LookupFuture<'a, T> {
        match target.scope {
            Scope::Namespaced => (self.fetch_namespaced)(lookup, namespace, &target.name, token),
            Scope::Cluster => (self.fetch_cluster)(lookup, namespace, &target.name, token),
        }
    }

    fn target(&self, scope: Scope, name: &str, explicit: bool) -> PlaneTarget {
        PlaneTarget {
            kind: self.kind_for(scope),
            scope,
            name: name.to_string(),
            explicit,
        }
    }
}

pub const DATA_PLANE_HOP: HopTable<Plane> = HopTable {
    hop: Hop::DataPlane,
    namespaced: ResourceKind::DataPlane,
    cluster: ResourceKind::ClusterDataPlane,
    default_name: DEFAULT_NAME,
    fetch_namespaced: data_plane,
    fetch_cluster: cluster_data_plane,
};

pub const BUILD_PLANE_HOP: HopTable<Plane> = HopTable {
    hop: Hop::BuildPlane,
    namespaced: ResourceKind::BuildPlane,
    cluster: ResourceKind::ClusterBuildPlane,
    default_name: DEFAULT_NAME,
    fetch_namespaced: build_plane,
    fetch_cluster: cluster_build_plane,
};

pub const OBSERVABILITY_PLANE_HOP: HopTable<ObservabilityPlane> = HopTable {
    hop: Hop::ObservabilityPlane,
    namespaced: ResourceKind::ObservabilityPlane,
    cluster: ResourceKind::ClusterObservabilityPlane,
    default_name: DEFAULT_NAME,
    fetch_namespaced: observability_plane,
    fetch_cluster: cluster_observability_plane,
};

fn data_plane<'a>(
    lookup: &'a dyn ResourceLookup,
    namespace: &'a str,
    name: &'a str,
    token: Option<&'a str>,
) -> LookupFuture<'a, Plane> {
    lookup.get_data_plane(namespace, name, token)
}

fn cluster_data_plane<'a>(
    lookup: &'a dyn ResourceLookup,
    _namespace: &'a str,
    name: &'a str,
    token: Option<&'a str>,
) -> LookupFuture<'a, Plane> {
    lookup.get_cluster_data_plane(name, token)
}

fn build_plane<'a>(
    lookup: &'a dyn ResourceLookup,
    namespace: &'a str,
    name: &'a str,
    token: Option<&'a str>,
) -> LookupFuture<'a, Plane> {
    lookup.get_build_plane(namespace, name, token)
}

fn cluster_build_plane<'a>(
    lookup: &'a dyn ResourceLookup,
    _namespace: &'a str,
    name: &'a str,
    token: Option<&'a str>,
) -> LookupFuture<'a, Plane> {
    lookup.get_cluster_build_plane(name, token)
}

fn observability_plane<'a>(
    lookup: &'a dyn ResourceLookup,
    namespace: &'a str,
    name: &'a str,
    token: Option<&'a str>,
) -> LookupFuture<'a, ObservabilityPlane> {
    lookup.get_observability_plane(namespace, name, token)
}

fn cluster_observability_plane<'a>(
    lookup: &'a dyn ResourceLookup,
    _namespace: &'a str,
    name: &'a str,
    token: Option<&'a str>,
) -> LookupFuture<'a, ObservabilityPlane> {
    lookup.get_cluster_observability_plane(name, token)
}
