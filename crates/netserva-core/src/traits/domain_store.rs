// # Domain Store Trait
//
// Defines the interface for the local domain cache.
//
// ## Purpose
//
// The store holds the last reconciled view of every tracked domain, keyed by
// normalized domain name. Upserts by that key are what make repeated syncs
// idempotent, and cancelled records stay in the store for audit.
//
// ## Implementations
//
// - `FileDomainStore`: JSON file with atomic writes and backup recovery
// - `MemoryDomainStore`: non-persistent, for tests and one-shot runs

use async_trait::async_trait;

use crate::model::{Domain, DomainName};

/// Trait for domain cache implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
///
/// # Implementation Guidelines
///
/// - **Async I/O only**: never block the runtime
/// - **Explicit flush**: `flush()` must persist all pending changes
/// - **No business logic**: deciding what changed is the reconciler's job
#[async_trait]
pub trait DomainStore: Send + Sync {
    /// Get the cached record for a domain
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Domain))`: The cached record
    /// - `Ok(None)`: Domain not tracked
    /// - `Err(Error)`: Storage error
    async fn get(&self, name: &DomainName) -> Result<Option<Domain>, crate::Error>;

    /// Create or replace the record keyed by `domain.name`
    async fn upsert(&self, domain: &Domain) -> Result<(), crate::Error>;

    /// Delete a record
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: Record existed and was removed
    /// - `Ok(false)`: Nothing to remove
    async fn remove(&self, name: &DomainName) -> Result<bool, crate::Error>;

    /// All cached records, sorted by name
    async fn list(&self) -> Result<Vec<Domain>, crate::Error>;

    /// Persist any pending changes
    async fn flush(&self) -> Result<(), crate::Error>;
}

/// Helper trait for constructing domain stores from configuration
#[async_trait]
pub trait DomainStoreFactory: Send + Sync {
    /// Create a DomainStore instance from configuration
    async fn create(
        &self,
        config: &crate::config::CacheConfig,
    ) -> Result<Box<dyn DomainStore>, crate::Error>;
}
