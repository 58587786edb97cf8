//! Build-plane cluster fallback policy.
//!
//! A project that declares no build-plane reference resolves to the
//! namespace's `BuildPlane("default")`. When that does not exist, the
//! resolver retries once against `ClusterBuildPlane("default")`. Any
//! declared reference, including one that only names a kind, is honoured
//! as written and never redirected.

use crate::resolver::dispatch::{PlaneTarget, BUILD_PLANE_HOP};
use crate::resources::types::{ResourceKind, Scope};
use crate::resources::LookupError;

/// Whether a failed build-plane lookup should be retried against the
/// cluster-scoped default.
pub fn should_fallback_to_cluster_default(target: &PlaneTarget, err: &LookupError) -> bool {
    !target.explicit
        && target.kind == ResourceKind::BuildPlane
        && target.name == BUILD_PLANE_HOP.default_name
        && err.is_not_found()
        && err.kind() == ResourceKind::BuildPlane
}

/// The target tried by the fallback.
pub fn cluster_default_build_plane() -> PlaneTarget {
    BUILD_PLANE_HOP.default_target(Scope::Cluster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceRef;

    fn not_found() -> LookupError {
        LookupError::not_found(ResourceKind::BuildPlane, Some("org-1"), "default")
    }

    #[test]
    fn test_implicit_default_falls_back() {
        let target = BUILD_PLANE_HOP.classify(None, Scope::Namespaced).unwrap();
        assert!(should_fallback_to_cluster_default(&target, &not_found()));
    }

    #[test]
    fn test_explicit_reference_never_falls_back() {
        let explicit = ResourceRef::new("BuildPlane", "default");
        let target = BUILD_PLANE_HOP.classify(Some(&explicit), Scope::Namespaced).unwrap();
        assert!(!should_fallback_to_cluster_default(&target, &not_found()));

        let cluster = ResourceRef::new("ClusterBuildPlane", "shared");
        let target = BUILD_PLANE_HOP.classify(Some(&cluster), Scope::Namespaced).unwrap();
        assert!(!should_fallback_to_cluster_default(&target, &not_found()));
    }

    #[test]
    fn test_only_not_found_triggers() {
        let target = BUILD_PLANE_HOP.classify(None, Scope::Namespaced).unwrap();
        let timeout = LookupError::Timeout {
            kind: ResourceKind::BuildPlane,
            name: "org-1/default".into(),
        };
        assert!(!should_fallback_to_cluster_default(&target, &timeout));

        let other = LookupError::not_found(ResourceKind::DataPlane, Some("org-1"), "default");
        assert!(!should_fallback_to_cluster_default(&target, &other));
    }

    #[test]
    fn test_fallback_target() {
        let target = cluster_default_build_plane();
        assert_eq!(target.kind, ResourceKind::ClusterBuildPlane);
        assert_eq!(target.name, "default");
        assert!(!target.explicit);
        // The fallback target itself never qualifies for another fallback.
        assert!(!should_fallback_to_cluster_default(&target, &not_found()));
    }
}
