// # Memory Domain Store
//
// In-memory implementation of DomainStore.
//
// Nothing survives a restart: the next sync reports every domain as newly
// created. Useful for tests, dry runs and one-shot drift reports.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Error;
use crate::config::CacheConfig;
use crate::model::{Domain, DomainName};
use crate::traits::{DomainStore, DomainStoreFactory};

/// In-memory domain store
///
/// # Example
///
/// ```rust,no_run
/// use netserva_core::store::MemoryDomainStore;
/// use netserva_core::traits::DomainStore;
/// use netserva_core::{Domain, DomainName};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryDomainStore::new();
///     let name = DomainName::parse("example.com.au")?;
///
///     store.upsert(&Domain::pending(name.clone(), chrono::Utc::now())).await?;
///     assert!(store.get(&name).await?.is_some());
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryDomainStore {
    inner: Arc<RwLock<HashMap<DomainName, Domain>>>,
}

impl MemoryDomainStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of cached domains
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl DomainStore for MemoryDomainStore {
    async fn get(&self, name: &DomainName) -> Result<Option<Domain>, Error> {
        Ok(self.inner.read().await.get(name).cloned())
    }

    async fn upsert(&self, domain: &Domain) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(domain.name.clone(), domain.clone());
        Ok(())
    }

    async fn remove(&self, name: &DomainName) -> Result<bool, Error> {
        Ok(self.inner.write().await.remove(name).is_some())
    }

    async fn list(&self) -> Result<Vec<Domain>, Error> {
        let guard = self.inner.read().await;
        let mut domains: Vec<Domain> = guard.values().cloned().collect();
        domains.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(domains)
    }

    async fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// Factory for the `memory` cache type
pub struct MemoryDomainStoreFactory;

#[async_trait]
impl DomainStoreFactory for MemoryDomainStoreFactory {
    async fn create(&self, config: &CacheConfig) -> Result<Box<dyn DomainStore>, Error> {
        match config {
            CacheConfig::Memory => Ok(Box::new(MemoryDomainStore::new())),
            _ => Err(Error::config("Invalid config for memory domain store")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain(name: &str) -> Domain {
        Domain::pending(DomainName::parse(name).unwrap(), chrono::Utc::now())
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryDomainStore::new();
        assert!(store.is_empty().await);

        let record = domain("example.com.au");
        store.upsert(&record).await.unwrap();
        assert_eq!(store.len().await, 1);

        let fetched = store.get(&record.name).await.unwrap();
        assert_eq!(fetched, Some(record.clone()));

        assert!(store.remove(&record.name).await.unwrap());
        assert!(!store.remove(&record.name).await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_name() {
        let store = MemoryDomainStore::new();
        let mut record = domain("example.com.au");
        store.upsert(&record).await.unwrap();

        record
            .metadata
            .insert("registrant".to_string(), "Example Pty Ltd".to_string());
        store.upsert(&record).await.unwrap();

        assert_eq!(store.len().await, 1);
        let fetched = store.get(&record.name).await.unwrap().unwrap();
        assert_eq!(fetched.metadata.get("registrant").unwrap(), "Example Pty Ltd");
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let store = MemoryDomainStore::new();
        store.upsert(&domain("zeta.net.au")).await.unwrap();
        store.upsert(&domain("alpha.com.au")).await.unwrap();

        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.name.to_string())
            .collect();
        assert_eq!(names, vec!["alpha.com.au", "zeta.net.au"]);
    }
}
