// # Domain Model
//
// Types shared by the cache, the reconciler and registrar implementations.

pub mod domain;
pub mod name;
pub mod remote;

pub use domain::{Domain, DomainStatus, GlueRecord};
pub use name::DomainName;
pub use remote::{RemoteDomain, RemoteDomainSummary, RemoteHost};
