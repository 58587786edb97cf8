//! Clients for resolved observability services.
//!
//! Log, metric and trace services resolve an [`ObservabilityUrls`] first and
//! then use the factory here to talk to the observer or RCA agent. A missing
//! URL yields no client rather than an error.
//!
//! [`ObservabilityUrls`]: crate::resolver::ObservabilityUrls

pub mod client;

pub use client::{ObservabilityClientFactory, ObserverClient};
