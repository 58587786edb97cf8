//! Observability endpoint resolution.
//!
//! # Data Flow
//! ```text
//! caller (logs / metrics / traces service)
//!     → chain.rs (ChainResolver)
//!         → cache.rs (hit: return cached URLs)
//!         → dispatch.rs (classify each reference, pick lookup)
//!         → fallback.rs (cluster build-plane retry policy)
//!         → resources::ResourceLookup (one lookup per hop)
//!     → urls.rs (ObservabilityUrls)
//! ```
//!
//! # Design Decisions
//! - References are classified into typed targets before any lookup; an
//!   unknown kind fails instead of defaulting
//! - The cache and its clock are injected, never global
//! - Every call is independent; the cache is the only shared state

pub mod cache;
pub mod chain;
pub mod clock;
pub mod dispatch;
pub mod error;
pub mod fallback;
pub mod urls;

pub use cache::{CacheKey, ReferenceCache, DEFAULT_TTL};
pub use chain::ChainResolver;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Hop, ResolveError, ResolveResult};
pub use urls::ObservabilityUrls;
