// # Registrar Trait
//
// Defines the interface to a domain registrar's API, the system of record for
// live domain state.
//
// ## Implementations
//
// - Synergy Wholesale: `netserva-registrar-synergy` crate
//
// ## Usage
//
// ```rust,ignore
// use netserva_core::{DomainName, Registrar};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let registrar = /* Registrar implementation */;
//
//     let name = DomainName::parse("example.com.au")?;
//     let info = registrar.domain_info(&name).await?;
//     let hosts = registrar.list_hosts(&name).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

use crate::model::{DomainName, RemoteDomain, RemoteDomainSummary, RemoteHost};

/// Trait for registrar implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Responsibilities
///
/// A registrar performs exactly the API calls it is asked for and reports the
/// outcome. It is stateless and single-shot:
///
/// - No retry or backoff (owned by `SyncEngine`)
/// - No caching between calls (owned by `DomainStore`)
/// - No reconciliation or drift decisions (owned by the reconciler)
/// - No background tasks
///
/// Missing domains or hosts must surface as [`crate::Error::NotFound`] so the
/// engine can tell a cancelled domain from a failed request.
#[async_trait]
pub trait Registrar: Send + Sync {
    /// List every domain held by the account
    async fn list_domains(&self) -> Result<Vec<RemoteDomainSummary>, crate::Error>;

    /// Fetch the authoritative state of one domain
    ///
    /// # Returns
    ///
    /// - `Ok(RemoteDomain)`: Current registry state
    /// - `Err(Error::NotFound)`: The registry has no such domain
    /// - `Err(Error)`: The request failed
    async fn domain_info(&self, domain: &DomainName) -> Result<RemoteDomain, crate::Error>;

    /// List the host (glue) objects registered under a domain
    async fn list_hosts(&self, domain: &DomainName) -> Result<Vec<RemoteHost>, crate::Error>;

    /// Register a host object with the given addresses
    async fn add_host(
        &self,
        domain: &DomainName,
        hostname: &DomainName,
        ips: &[IpAddr],
    ) -> Result<(), crate::Error>;

    /// Delete a host object
    async fn delete_host(
        &self,
        domain: &DomainName,
        hostname: &DomainName,
    ) -> Result<(), crate::Error>;

    /// Replace the delegated nameservers
    async fn update_nameservers(
        &self,
        domain: &DomainName,
        nameservers: &[DomainName],
    ) -> Result<(), crate::Error>;

    /// Get the registrar name (for logging/debugging)
    fn registrar_name(&self) -> &'static str;
}

/// Helper trait for constructing registrars from configuration
pub trait RegistrarFactory: Send + Sync {
    /// Create a Registrar instance from configuration
    fn create(
        &self,
        config: &crate::config::RegistrarConfig,
    ) -> Result<Box<dyn Registrar>, crate::Error>;
}
