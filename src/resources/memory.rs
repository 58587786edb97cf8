//! In-memory resource store.
//!
//! Serves lookups from a fixed set of resources, either built in code or
//! loaded from a JSON document. Used for offline resolution and in tests,
//! where the recorded call log shows exactly which lookups a resolution made.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, RwLock};

use crate::observability::metrics;
use crate::resources::lookup::{LookupError, LookupResult, ResourceLookup};
use crate::resources::types::{
    Environment, EnvironmentSpec, ObservabilityPlane, ObservabilityPlaneSpec, Plane, PlaneSpec,
    Project, ProjectSpec, Resource, ResourceKind, Scope,
};

/// A JSON document listing resources by kind.
///
/// ```json
/// {
///   "environments": [{"metadata": {"name": "dev", "namespace": "org-1"}, "spec": {}}],
///   "clusterObservabilityPlanes": [{"metadata": {"name": "default"}, "spec": {"observerURL": "..."}}]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourceSet {
    pub environments: Vec<Environment>,
    pub projects: Vec<Project>,
    pub data_planes: Vec<Plane>,
    pub cluster_data_planes: Vec<Plane>,
    pub build_planes: Vec<Plane>,
    pub cluster_build_planes: Vec<Plane>,
    pub observability_planes: Vec<ObservabilityPlane>,
    pub cluster_observability_planes: Vec<ObservabilityPlane>,
}

/// One lookup as observed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupCall {
    pub kind: ResourceKind,
    pub namespace: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ObjectKey {
    kind: ResourceKind,
    namespace: Option<String>,
    name: String,
}

impl ObjectKey {
    fn new(kind: ResourceKind, namespace: Option<&str>, name: &str) -> Self {
        // Cluster-scoped objects never carry a namespace.
        let namespace = match kind.scope() {
            Scope::Namespaced => namespace.map(str::to_string),
            Scope::Cluster => None,
        };
        Self {
            kind,
            namespace,
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
enum Stored {
    Environment(EnvironmentSpec),
    Project(ProjectSpec),
    Plane(PlaneSpec),
    ObservabilityPlane(ObservabilityPlaneSpec),
}

/// Error loading a [`ResourceSet`] from disk.
#[derive(Debug, thiserror::Error)]
pub enum ResourceSetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{kind} '{name}' has no namespace")]
    MissingNamespace { kind: ResourceKind, name: String },
}

/// [`ResourceLookup`] over resources held in memory.
#[derive(Debug, Default)]
pub struct InMemoryResources {
    objects: RwLock<HashMap<ObjectKey, Stored>>,
    failures: RwLock<HashMap<ObjectKey, LookupError>>,
    calls: Mutex<Vec<LookupCall>>,
}

impl InMemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a resource set.
    ///
    /// Namespaced resources must carry `metadata.namespace`.
    pub fn from_set(set: ResourceSet) -> Result<Self, ResourceSetError> {
        let store = Self::new();

        for env in set.environments {
            let ns = require_namespace(ResourceKind::Environment, &env)?;
            store.insert_environment(&ns, &env.metadata.name, env.spec);
        }
        for project in set.projects {
            let ns = require_namespace(ResourceKind::Project, &project)?;
            store.insert_project(&ns, &project.metadata.name, project.spec);
        }
        for (kind, planes) in [
            (ResourceKind::DataPlane, set.data_planes),
            (ResourceKind::ClusterDataPlane, set.cluster_data_planes),
            (ResourceKind::BuildPlane, set.build_planes),
            (ResourceKind::ClusterBuildPlane, set.cluster_build_planes),
        ] {
            for plane in planes {
                let ns = match kind.scope() {
                    Scope::Namespaced => Some(require_namespace(kind, &plane)?),
                    Scope::Cluster => None,
                };
                store.insert_plane(kind, ns.as_deref(), &plane.metadata.name, plane.spec);
            }
        }
        for (kind, planes) in [
            (ResourceKind::ObservabilityPlane, set.observability_planes),
            (ResourceKind::ClusterObservabilityPlane, set.cluster_observability_planes),
        ] {
            for plane in planes {
                let ns = match kind.scope() {
                    Scope::Namespaced => Some(require_namespace(kind, &plane)?),
                    Scope::Cluster => None,
                };
                store.insert_observability_plane(kind, ns.as_deref(), &plane.metadata.name, plane.spec);
            }
        }

        let count = store.len();
        tracing::info!(resources = count, "Loaded in-memory resource set");
        Ok(store)
    }

    /// Load a store from a JSON resource set file.
    pub fn load_from_file(path: &Path) -> Result<Self, ResourceSetError> {
        let content = std::fs::read_to_string(path)?;
        let set: ResourceSet = serde_json::from_str(&content)?;
        Self::from_set(set)
    }

    pub fn insert_environment(&self, namespace: &str, name: &str, spec: EnvironmentSpec) {
        self.put(ResourceKind::Environment, Some(namespace), name, Stored::Environment(spec));
    }

    pub fn insert_project(&self, namespace: &str, name: &str, spec: ProjectSpec) {
        self.put(ResourceKind::Project, Some(namespace), name, Stored::Project(spec));
    }

    /// Insert a data plane or build plane of either scope.
    ///
    /// `namespace` is ignored for cluster-scoped kinds.
    pub fn insert_plane(&self, kind: ResourceKind, namespace: Option<&str>, name: &str, spec: PlaneSpec) {
        self.put(kind, namespace, name, Stored::Plane(spec));
    }

    pub fn insert_observability_plane(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        name: &str,
        spec: ObservabilityPlaneSpec,
    ) {
        self.put(kind, namespace, name, Stored::ObservabilityPlane(spec));
    }

    /// Remove a resource; later lookups report not found.
    pub fn remove(&self, kind: ResourceKind, namespace: Option<&str>, name: &str) -> bool {
        self.objects
            .write()
            .expect("resource store lock poisoned")
            .remove(&ObjectKey::new(kind, namespace, name))
            .is_some()
    }

    /// Make lookups of one resource fail with `err` until cleared.
    pub fn fail_with(&self, kind: ResourceKind, namespace: Option<&str>, name: &str, err: LookupError) {
        self.failures
            .write()
            .expect("resource store lock poisoned")
            .insert(ObjectKey::new(kind, namespace, name), err);
    }

    pub fn clear_failures(&self) {
        self.failures
            .write()
            .expect("resource store lock poisoned")
            .clear();
    }

    /// Number of stored resources.
    pub fn len(&self) -> usize {
        self.objects.read().expect("resource store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every lookup made so far, in order.
    pub fn calls(&self) -> Vec<LookupCall> {
        self.calls.lock().expect("call log lock poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("call log lock poisoned").len()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().expect("call log lock poisoned").clear();
    }

    fn put(&self, kind: ResourceKind, namespace: Option<&str>, name: &str, value: Stored) {
        self.objects
            .write()
            .expect("resource store lock poisoned")
            .insert(ObjectKey::new(kind, namespace, name), value);
    }

    fn get(&self, kind: ResourceKind, namespace: Option<&str>, name: &str) -> LookupResult<Stored> {
        metrics::record_lookup(kind.as_str());
        let key = ObjectKey::new(kind, namespace, name);
        self.calls
            .lock()
            .expect("call log lock poisoned")
            .push(LookupCall {
                kind,
                namespace: key.namespace.clone(),
                name: key.name.clone(),
            });

        if let Some(err) = self
            .failures
            .read()
            .expect("resource store lock poisoned")
            .get(&key)
        {
            return Err(err.clone());
        }

        self.objects
            .read()
            .expect("resource store lock poisoned")
            .get(&key)
            .cloned()
            .ok_or_else(|| LookupError::not_found(kind, key.namespace.as_deref(), name))
    }

    fn get_plane(&self, kind: ResourceKind, namespace: Option<&str>, name: &str) -> LookupResult<Plane> {
        match self.get(kind, namespace, name)? {
            Stored::Plane(spec) => Ok(Resource::new(namespace_for(kind, namespace), name, spec)),
            _ => Err(mismatch(kind, namespace, name)),
        }
    }

    fn get_observability_plane_of(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        name: &str,
    ) -> LookupResult<ObservabilityPlane> {
        match self.get(kind, namespace, name)? {
            Stored::ObservabilityPlane(spec) => {
                Ok(Resource::new(namespace_for(kind, namespace), name, spec))
            }
            _ => Err(mismatch(kind, namespace, name)),
        }
    }
}

fn namespace_for(kind: ResourceKind, namespace: Option<&str>) -> Option<&str> {
    match kind.scope() {
        Scope::Namespaced => namespace,
        Scope::Cluster => None,
    }
}

fn require_namespace<S>(kind: ResourceKind, resource: &Resource<S>) -> Result<String, ResourceSetError> {
    resource
        .metadata
        .namespace
        .clone()
        .filter(|ns| !ns.is_empty())
        .ok_or_else(|| ResourceSetError::MissingNamespace {
            kind,
            name: resource.metadata.name.clone(),
        })
}

// Only reachable if a key was stored under the wrong variant.
fn mismatch(kind: ResourceKind, namespace: Option<&str>, name: &str) -> LookupError {
    LookupError::Decode {
        kind,
        name: crate::resources::lookup::qualified_name(namespace, name),
        reason: "stored resource has a different shape".to_string(),
    }
}

#[async_trait]
impl ResourceLookup for InMemoryResources {
    async fn get_environment(
        &self,
        namespace: &str,
        name: &str,
        _token: Option<&str>,
    ) -> LookupResult<Environment> {
        match self.get(ResourceKind::Environment, Some(namespace), name)? {
            Stored::Environment(spec) => Ok(Resource::new(Some(namespace), name, spec)),
            _ => Err(mismatch(ResourceKind::Environment, Some(namespace), name)),
        }
    }

    async fn get_project(
        &self,
        namespace: &str,
        name: &str,
        _token: Option<&str>,
    ) -> LookupResult<Project> {
        match self.get(ResourceKind::Project, Some(namespace), name)? {
            Stored::Project(spec) => Ok(Resource::new(Some(namespace), name, spec)),
            _ => Err(mismatch(ResourceKind::Project, Some(namespace), name)),
        }
    }

    async fn get_data_plane(
        &self,
        namespace: &str,
        name: &str,
        _token: Option<&str>,
    ) -> LookupResult<Plane> {
        self.get_plane(ResourceKind::DataPlane, Some(namespace), name)
    }

    async fn get_cluster_data_plane(&self, name: &str, _token: Option<&str>) -> LookupResult<Plane> {
        self.get_plane(ResourceKind::ClusterDataPlane, None, name)
    }

    async fn get_build_plane(
        &self,
        namespace: &str,
        name: &str,
        _token: Option<&str>,
    ) -> LookupResult<Plane> {
        self.get_plane(ResourceKind::BuildPlane, Some(namespace), name)
    }

    async fn get_cluster_build_plane(&self, name: &str, _token: Option<&str>) -> LookupResult<Plane> {
        self.get_plane(ResourceKind::ClusterBuildPlane, None, name)
    }

    async fn get_observability_plane(
        &self,
        namespace: &str,
        name: &str,
        _token: Option<&str>,
    ) -> LookupResult<ObservabilityPlane> {
        self.get_observability_plane_of(ResourceKind::ObservabilityPlane, Some(namespace), name)
    }

    async fn get_cluster_observability_plane(
        &self,
        name: &str,
        _token: Option<&str>,
    ) -> LookupResult<ObservabilityPlane> {
        self.get_observability_plane_of(ResourceKind::ClusterObservabilityPlane, None, name)
    }
}
