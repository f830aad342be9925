//! Core traits for domain synchronization
//!
//! - [`Registrar`]: Talk to the registrar API (system of record)
//! - [`DomainStore`]: Local cache of reconciled domain state

pub mod domain_store;
pub mod registrar;

pub use domain_store::{DomainStore, DomainStoreFactory};
pub use registrar::{Registrar, RegistrarFactory};
