//! Observability endpoint resolver library.

pub mod config;
pub mod error;
pub mod observability;
pub mod observer;
pub mod resolver;
pub mod resources;

pub use config::ResolverConfig;
pub use error::ClientError;
pub use observer::{ObservabilityClientFactory, ObserverClient};
pub use resolver::{ChainResolver, ObservabilityUrls, ResolveError};
pub use resources::{HttpResourceClient, InMemoryResources, ResourceLookup};
