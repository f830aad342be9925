//! Plugin-based registrar registry
//!
//! The registry maps configuration type names to factories, so binaries can
//! build registrars and domain stores from configuration without hardcoded
//! if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use netserva_core::RegistrarRegistry;
//!
//! let registry = RegistrarRegistry::with_builtin_stores();
//! netserva_registrar_synergy::register(&registry);
//!
//! let registrar = registry.create_registrar(&config.registrar)?;
//! let store = registry.create_store(&config.cache).await?;
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::{CacheConfig, RegistrarConfig};
use crate::error::{Error, Result};
use crate::store::{FileDomainStoreFactory, MemoryDomainStoreFactory};
use crate::traits::{DomainStore, DomainStoreFactory, Registrar, RegistrarFactory};

/// Registry of registrar and domain store factories
///
/// Uses interior mutability, allowing concurrent reads and exclusive writes.
#[derive(Default)]
pub struct RegistrarRegistry {
    registrars: RwLock<HashMap<String, Box<dyn RegistrarFactory>>>,
    stores: RwLock<HashMap<String, Arc<dyn DomainStoreFactory>>>,
}

impl RegistrarRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the `file` and `memory` stores registered
    pub fn with_builtin_stores() -> Self {
        let registry = Self::new();
        registry.register_store("file", Box::new(FileDomainStoreFactory));
        registry.register_store("memory", Box::new(MemoryDomainStoreFactory));
        registry
    }

    /// Register a registrar factory under a type name (e.g., "synergy")
    pub fn register_registrar(&self, name: impl Into<String>, factory: Box<dyn RegistrarFactory>) {
        self.registrars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), factory);
    }

    /// Register a domain store factory under a type name (e.g., "file")
    pub fn register_store(&self, name: impl Into<String>, factory: Box<dyn DomainStoreFactory>) {
        self.stores
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), Arc::from(factory));
    }

    /// Create a registrar from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn Registrar>)`: Created registrar
    /// - `Err(Error)`: Type not registered, or the factory rejected the config
    pub fn create_registrar(&self, config: &RegistrarConfig) -> Result<Box<dyn Registrar>> {
        let registrar_type = config.type_name();
        let registrars = self
            .registrars
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let factory = registrars
            .get(registrar_type)
            .ok_or_else(|| Error::config(format!("Unknown registrar type: {}", registrar_type)))?;

        factory.create(config)
    }

    /// Create a domain store from configuration
    pub async fn create_store(&self, config: &CacheConfig) -> Result<Box<dyn DomainStore>> {
        let store_type = config.type_name();

        // Release the lock before awaiting the factory
        let factory = {
            let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);
            stores
                .get(store_type)
                .cloned()
                .ok_or_else(|| Error::config(format!("Unknown cache type: {}", store_type)))?
        };

        factory.create(config).await
    }

    /// List all registered registrar types
    pub fn list_registrars(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .registrars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Check if a registrar type is registered
    pub fn has_registrar(&self, name: &str) -> bool {
        self.registrars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Check if a store type is registered
    pub fn has_store(&self, name: &str) -> bool {
        self.stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockRegistrarFactory;

    impl RegistrarFactory for MockRegistrarFactory {
        fn create(&self, _config: &RegistrarConfig) -> Result<Box<dyn Registrar>> {
            Err(Error::not_found("Mock registrar not implemented"))
        }
    }

    #[test]
    fn test_registry_registration() {
        let registry = RegistrarRegistry::new();
        assert!(!registry.has_registrar("mock"));

        registry.register_registrar("mock", Box::new(MockRegistrarFactory));

        assert!(registry.has_registrar("mock"));
        assert_eq!(registry.list_registrars(), vec!["mock".to_string()]);
    }

    #[test]
    fn test_unknown_registrar_is_config_error() {
        let registry = RegistrarRegistry::new();
        let config = RegistrarConfig::Synergy {
            reseller_id: "1234".to_string(),
            api_key: "key".to_string(),
            api_url: None,
            timeout_secs: None,
        };

        let err = registry.create_registrar(&config).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_builtin_memory_store() {
        let registry = RegistrarRegistry::with_builtin_stores();
        assert!(registry.has_store("file"));

        let store = registry.create_store(&CacheConfig::Memory).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }
}
