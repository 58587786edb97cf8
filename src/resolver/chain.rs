//! Reference-chain resolution.
//!
//! ```text
//! Environment ─dataPlaneRef──▶ DataPlane | ClusterDataPlane ──┐
//!                                                             ├─observabilityPlaneRef─▶ ObservabilityPlane | ClusterObservabilityPlane
//! Project ─buildPlaneRef──▶ BuildPlane | ClusterBuildPlane ───┘
//! ```
//!
//! Each call checks the cache first. On a miss the chain is walked with one
//! lookup per hop and the URLs of the terminal plane are cached. Any failure
//! aborts the walk and is returned without touching the cache.

use std::sync::Arc;

use crate::observability::metrics;
use crate::resolver::cache::{CacheKey, ReferenceCache};
use crate::resolver::clock::{Clock, SystemClock};
use crate::resolver::dispatch::{
    PlaneTarget, BUILD_PLANE_HOP, DATA_PLANE_HOP, OBSERVABILITY_PLANE_HOP,
};
use crate::resolver::error::{Hop, ResolveError, ResolveResult};
use crate::resolver::fallback::{cluster_default_build_plane, should_fallback_to_cluster_default};
use crate::resolver::urls::ObservabilityUrls;
use crate::resources::types::{Plane, Scope};
use crate::resources::ResourceLookup;

const PATH_ENVIRONMENT: &str = "environment";
const PATH_BUILD: &str = "build";

/// Resolves observability endpoints for environments and projects.
pub struct ChainResolver<C: Clock = SystemClock> {
    lookup: Arc<dyn ResourceLookup>,
    cache: ReferenceCache<C>,
}

impl ChainResolver<SystemClock> {
    /// Create a resolver with a default (5 minute) cache.
    pub fn new(lookup: Arc<dyn ResourceLookup>) -> Self {
        Self::with_cache(lookup, ReferenceCache::default())
    }
}

impl<C: Clock> ChainResolver<C> {
    pub fn with_cache(lookup: Arc<dyn ResourceLookup>, cache: ReferenceCache<C>) -> Self {
        Self { lookup, cache }
    }

    pub fn cache(&self) -> &ReferenceCache<C> {
        &self.cache
    }

    /// Resolve the runtime observer for an environment.
    ///
    /// Walks Environment → DataPlane/ClusterDataPlane →
    /// ObservabilityPlane/ClusterObservabilityPlane.
    #[tracing::instrument(name = "resolve_environment", skip(self, token))]
    pub async fn resolve_for_environment(
        &self,
        namespace: &str,
        environment: &str,
        token: Option<&str>,
    ) -> ResolveResult<ObservabilityUrls> {
        let key = CacheKey::environment(namespace, environment);
        if let Some(urls) = self.cache.get(&key) {
            tracing::debug!(key = %key, "Resolution cache hit");
            return Ok(urls);
        }

        let result = self.walk_environment(namespace, environment, token).await;
        self.complete(PATH_ENVIRONMENT, key, result)
    }

    /// Resolve the build observer for a project.
    ///
    /// Walks Project → BuildPlane/ClusterBuildPlane →
    /// ObservabilityPlane/ClusterObservabilityPlane, with a single retry
    /// against `ClusterBuildPlane("default")` when the project declares no
    /// build plane and the namespace has no default one.
    #[tracing::instrument(name = "resolve_build", skip(self, token))]
    pub async fn resolve_for_build(
        &self,
        namespace: &str,
        project: &str,
        token: Option<&str>,
    ) -> ResolveResult<ObservabilityUrls> {
        let key = CacheKey::build(namespace, project);
        if let Some(urls) = self.cache.get(&key) {
            tracing::debug!(key = %key, "Resolution cache hit");
            return Ok(urls);
        }

        let result = self.walk_build(namespace, project, token).await;
        self.complete(PATH_BUILD, key, result)
    }

    pub fn invalidate_environment(&self, namespace: &str, environment: &str) -> bool {
        self.cache
            .invalidate(&CacheKey::environment(namespace, environment))
    }

    pub fn invalidate_build(&self, namespace: &str, project: &str) -> bool {
        self.cache.invalidate(&CacheKey::build(namespace, project))
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    fn complete(
        &self,
        path: &'static str,
        key: CacheKey,
        result: ResolveResult<ObservabilityUrls>,
    ) -> ResolveResult<ObservabilityUrls> {
        match result {
            Ok(urls) => {
                let outcome = if urls.is_configured() {
                    "resolved"
                } else {
                    tracing::info!(key = %key, "Observability not configured");
                    "not_configured"
                };
                metrics::record_resolution(path, outcome);
                self.cache.insert(key, urls.clone());
                Ok(urls)
            }
            Err(err) => {
                tracing::warn!(key = %key, hop = %err.hop(), error = %err, "Resolution failed");
                metrics::record_resolution(path, err.label());
                Err(err)
            }
        }
    }

    async fn walk_environment(
        &self,
        namespace: &str,
        environment: &str,
        token: Option<&str>,
    ) -> ResolveResult<ObservabilityUrls> {
        let env = self
            .lookup
            .get_environment(namespace, environment, token)
            .await
            .map_err(|e| ResolveError::from_lookup(Hop::Environment, e))?;

        let target = DATA_PLANE_HOP.classify(env.spec.data_plane_ref.as_ref(), Scope::Namespaced)?;
        tracing::debug!(kind = %target.kind, name = %target.name, explicit = target.explicit, "Data plane");

        let plane = DATA_PLANE_HOP
            .fetch(self.lookup.as_ref(), namespace, &target, token)
            .await
            .map_err(|e| ResolveError::from_lookup(Hop::DataPlane, e))?;

        self.resolve_observability_plane(namespace, &target, &plane, token)
            .await
    }

    async fn walk_build(
        &self,
        namespace: &str,
        project: &str,
        token: Option<&str>,
    ) -> ResolveResult<ObservabilityUrls> {
        let project = self
            .lookup
            .get_project(namespace, project, token)
            .await
            .map_err(|e| ResolveError::from_lookup(Hop::Project, e))?;

        let target =
            BUILD_PLANE_HOP.classify(project.spec.build_plane_ref.as_ref(), Scope::Namespaced)?;
        tracing::debug!(kind = %target.kind, name = %target.name, explicit = target.explicit, "Build plane");

        let fetched = BUILD_PLANE_HOP
            .fetch(self.lookup.as_ref(), namespace, &target, token)
            .await;

        let (target, plane) = match fetched {
            Ok(plane) => (target, plane),
            Err(err) if should_fallback_to_cluster_default(&target, &err) => {
                let fallback = cluster_default_build_plane();
                tracing::info!(
                    namespace = %namespace,
                    name = %fallback.name,
                    "No build plane in namespace, falling back to cluster build plane"
                );
                metrics::record_build_fallback();

                let plane = BUILD_PLANE_HOP
                    .fetch(self.lookup.as_ref(), namespace, &fallback, token)
                    .await
                    .map_err(|e| ResolveError::from_lookup(Hop::BuildPlane, e))?;
                (fallback, plane)
            }
            Err(err) => return Err(ResolveError::from_lookup(Hop::BuildPlane, err)),
        };

        self.resolve_observability_plane(namespace, &target, &plane, token)
            .await
    }

    /// Final hop, shared by both paths.
    ///
    /// An absent reference defaults to the parent plane's scope: a cluster
    /// plane falls back to `ClusterObservabilityPlane("default")`, a
    /// namespaced one to `ObservabilityPlane("default")`.
    async fn resolve_observability_plane(
        &self,
        namespace: &str,
        parent: &PlaneTarget,
        plane: &Plane,
        token: Option<&str>,
    ) -> ResolveResult<ObservabilityUrls> {
        let target = OBSERVABILITY_PLANE_HOP
            .classify(plane.spec.observability_plane_ref.as_ref(), parent.scope)?;
        tracing::debug!(kind = %target.kind, name = %target.name, explicit = target.explicit, "Observability plane");

        let observability = OBSERVABILITY_PLANE_HOP
            .fetch(self.lookup.as_ref(), namespace, &target, token)
            .await
            .map_err(|e| ResolveError::from_lookup(Hop::ObservabilityPlane, e))?;

        Ok(ObservabilityUrls::from(observability.spec))
    }
}

impl<C: Clock> std::fmt::Debug for ChainResolver<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainResolver")
            .field("cache", &self.cache)
            .finish()
    }
}
