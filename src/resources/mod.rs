//! Resource access subsystem.
//!
//! # Data Flow
//! ```text
//! ChainResolver
//!     → lookup.rs (ResourceLookup trait, LookupError)
//!         → http.rs (resource REST API via reqwest)
//!         → memory.rs (static resource set, offline / tests)
//!     → types.rs (Environment, Project, Plane, ObservabilityPlane)
//! ```
//!
//! # Design Decisions
//! - Read-only: nothing here creates or mutates resources
//! - Bearer credentials are passed through untouched
//! - Not found is a distinct error so callers can name the missing hop

pub mod http;
pub mod lookup;
pub mod memory;
pub mod types;

pub use http::HttpResourceClient;
pub use lookup::{LookupError, LookupResult, ResourceLookup};
pub use memory::{InMemoryResources, ResourceSet};
pub use types::{ResourceKind, ResourceRef, Scope};
