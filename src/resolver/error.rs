//! Resolution errors.

use std::fmt;
use thiserror::Error;

use crate::resources::LookupError;

/// One step of a reference chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hop {
    Environment,
    Project,
    DataPlane,
    BuildPlane,
    ObservabilityPlane,
}

impl Hop {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Hop::Environment => "environment",
            Hop::Project => "project",
            Hop::DataPlane => "dataplane",
            Hop::BuildPlane => "buildplane",
            Hop::ObservabilityPlane => "observabilityplane",
        }
    }
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that abort a resolution.
///
/// "Observability not configured" is not one of them: a terminal plane with
/// no URLs resolves successfully to an empty result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A resource referenced at `hop` does not exist.
    #[error("{hop} not found: {source}")]
    NotFound {
        hop: Hop,
        #[source]
        source: LookupError,
    },

    /// A reference at `hop` names a kind outside the two allowed for it.
    #[error("unsupported {hop} reference kind '{kind}'")]
    UnsupportedKind { hop: Hop, kind: String },

    /// The lookup itself failed (network, timeout, bad status, bad body).
    #[error("{hop} lookup failed: {source}")]
    Transport {
        hop: Hop,
        #[source]
        source: LookupError,
    },
}

impl ResolveError {
    /// Attribute a lookup failure to the hop that made it.
    pub fn from_lookup(hop: Hop, err: LookupError) -> Self {
        if err.is_not_found() {
            ResolveError::NotFound { hop, source: err }
        } else {
            ResolveError::Transport { hop, source: err }
        }
    }

    pub fn hop(&self) -> Hop {
        match self {
            ResolveError::NotFound { hop, .. }
            | ResolveError::UnsupportedKind { hop, .. }
            | ResolveError::Transport { hop, .. } => *hop,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NotFound { .. })
    }

    /// Short label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ResolveError::NotFound { .. } => "not_found",
            ResolveError::UnsupportedKind { .. } => "unsupported_kind",
            ResolveError::Transport { .. } => "transport",
        }
    }
}

/// Result type for resolutions.
pub type ResolveResult<T> = Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceKind;

    #[test]
    fn test_from_lookup() {
        let err = ResolveError::from_lookup(
            Hop::DataPlane,
            LookupError::not_found(ResourceKind::DataPlane, Some("org-1"), "default"),
        );
        assert!(err.is_not_found());
        assert_eq!(err.hop(), Hop::DataPlane);
        assert_eq!(
            err.to_string(),
            "dataplane not found: DataPlane 'org-1/default' not found"
        );

        let err = ResolveError::from_lookup(
            Hop::Environment,
            LookupError::Status {
                kind: ResourceKind::Environment,
                name: "org-1/dev".into(),
                status: 503,
                body: "unavailable".into(),
            },
        );
        assert!(matches!(err, ResolveError::Transport { hop: Hop::Environment, .. }));
        assert_eq!(err.label(), "transport");
    }

    #[test]
    fn test_unsupported_kind_display() {
        let err = ResolveError::UnsupportedKind {
            hop: Hop::DataPlane,
            kind: "FooPlane".into(),
        };
        assert_eq!(err.to_string(), "unsupported dataplane reference kind 'FooPlane'");
    }
}
