//! The result of a resolution.

use serde::{Deserialize, Serialize};

use crate::resources::types::ObservabilityPlaneSpec;

/// Endpoint URLs carried by the terminal observability plane.
///
/// Either field may be absent. Both absent means observability is not
/// configured for the context, which is a normal outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObservabilityUrls {
    #[serde(rename = "observerURL")]
    pub observer_url: Option<String>,
    #[serde(rename = "rcaAgentURL")]
    pub rca_agent_url: Option<String>,
}

impl ObservabilityUrls {
    /// Whether an observer endpoint is available.
    pub fn is_configured(&self) -> bool {
        self.observer_url.is_some()
    }
}

impl From<ObservabilityPlaneSpec> for ObservabilityUrls {
    fn from(spec: ObservabilityPlaneSpec) -> Self {
        // Empty strings are how unset fields often round-trip through the API.
        Self {
            observer_url: spec.observer_url.filter(|u| !u.is_empty()),
            rca_agent_url: spec.rca_agent_url.filter(|u| !u.is_empty()),
        }
    }
}
