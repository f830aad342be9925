// # netserva-core
//
// Core library for synchronizing registrar-held domains into a local cache.
//
// ## Architecture Overview
//
// - **Registrar**: Trait for the registrar API, the system of record
// - **DomainStore**: Trait for the local domain cache (upsert by name)
// - **reconcile**: Pure diff of cached vs. authoritative state, reporting drift
// - **SyncEngine**: Orchestrates fetch → reconcile → upsert, single and bulk
// - **RegistrarRegistry**: Builds registrars and stores from configuration
//
// ## Design Principles
//
// 1. **Registry is authoritative**: the cache never overrides what the registrar reports
// 2. **Idempotent upsert**: re-syncing unchanged state reports no drift
// 3. **Audit over deletion**: cancelled domains and stale glue stay visible
// 4. **Library-first**: the CLI is a thin layer over this crate

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod registry;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use config::{CacheConfig, RegistrarConfig, StaleGluePolicy, SyncConfig, SyncSettings};
pub use engine::{DomainFilter, DomainSyncOutcome, SyncAction, SyncEngine, SyncEvent, SyncReport};
pub use error::{Error, Result};
pub use model::{
    Domain, DomainName, DomainStatus, GlueRecord, RemoteDomain, RemoteDomainSummary, RemoteHost,
};
pub use reconcile::{Drift, Reconciliation};
pub use registry::RegistrarRegistry;
pub use store::{FileDomainStore, MemoryDomainStore};
pub use traits::{DomainStore, Registrar};
