//! Registry-side views returned by a [`Registrar`](crate::traits::Registrar)

use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;

use chrono::{DateTime, Utc};

use super::domain::DomainStatus;
use super::name::DomainName;

/// One entry of the registrar's domain listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDomainSummary {
    pub name: DomainName,
    pub status: DomainStatus,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Authoritative domain state from the registry
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteDomain {
    pub name: DomainName,
    pub status: DomainStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub nameservers: BTreeSet<DomainName>,
    pub auth_code: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl std::fmt::Debug for RemoteDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteDomain")
            .field("name", &self.name)
            .field("status", &self.status)
            .field("expires_at", &self.expires_at)
            .field("nameservers", &self.nameservers)
            .field("auth_code", &self.auth_code.as_ref().map(|_| "<REDACTED>"))
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl RemoteDomain {
    /// A bare view with only name and status set
    pub fn new(name: DomainName, status: DomainStatus) -> Self {
        Self {
            name,
            status,
            expires_at: None,
            nameservers: BTreeSet::new(),
            auth_code: None,
            metadata: BTreeMap::new(),
        }
    }
}

/// A host (glue) object registered under a domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteHost {
    pub hostname: DomainName,
    pub ips: BTreeSet<IpAddr>,
}
