// # Cached Domain Model
//
// Local view of a registrar-tracked domain. Records are created on first sync
// or by explicit tracking, updated on every reconciliation, and kept after
// cancellation so the history stays auditable.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};

use super::name::DomainName;

/// Lifecycle status of a domain at the registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DomainStatus {
    /// Registration or transfer in progress, or tracked locally but never synced
    Pending,
    /// Registered and resolving
    Active,
    /// Past its expiry date
    Expired,
    /// Held or locked by the registry
    Locked,
    /// Moved to another registrar
    TransferredAway,
    /// Cancelled or deleted; terminal
    Cancelled,
    /// Any status string the mapping does not recognise
    Other(String),
}

impl DomainStatus {
    /// Map a registrar status string onto the lifecycle
    pub fn parse(raw: &str) -> Self {
        // "Transferred Away", "transferred-away" and "transferred_away" read alike
        let normalized = raw
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .replace('-', "_")
            .to_ascii_lowercase();
        match normalized.as_str() {
            "ok" | "active" | "registered" => Self::Active,
            "expired" => Self::Expired,
            "locked" | "clienthold" | "client_hold" | "serverhold" | "server_hold" => Self::Locked,
            "transferredaway" | "transferred_away" | "outbound_transfer" => Self::TransferredAway,
            "cancelled" | "canceled" | "deleted" | "redemption" => Self::Cancelled,
            s if s.starts_with("pending") => Self::Pending,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    /// Whether no further sync may change this record
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The canonical status string
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Locked => "locked",
            Self::TransferredAway => "transferred_away",
            Self::Cancelled => "cancelled",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for DomainStatus {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<DomainStatus> for String {
    fn from(status: DomainStatus) -> Self {
        status.as_str().to_string()
    }
}

/// A nameserver host record published at the registry for a name inside the domain
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GlueRecord {
    /// Host name, always within the owning domain
    pub hostname: DomainName,
    /// A and AAAA addresses
    pub ips: BTreeSet<IpAddr>,
    /// Present locally but absent from the registry's host list
    #[serde(default)]
    pub stale: bool,
    /// When the record was first seen missing at the registry
    #[serde(default)]
    pub stale_since: Option<DateTime<Utc>>,
}

impl GlueRecord {
    /// Create a fresh, non-stale glue record
    pub fn new(hostname: DomainName, ips: impl IntoIterator<Item = IpAddr>) -> Self {
        Self {
            hostname,
            ips: ips.into_iter().collect(),
            stale: false,
            stale_since: None,
        }
    }
}

/// Cached state of one domain
#[derive(Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Domain {
    /// Natural key
    pub name: DomainName,
    /// Registry status
    pub status: DomainStatus,
    /// Registration expiry
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Delegated nameservers
    #[serde(default)]
    pub nameservers: BTreeSet<DomainName>,
    /// EPP transfer code; never log this value
    #[serde(default)]
    pub auth_code: Option<String>,
    /// Glue records, sorted by hostname
    #[serde(default)]
    pub glue_records: Vec<GlueRecord>,
    /// Free-form key/value details
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// When the record entered the cache
    pub created_at: DateTime<Utc>,
    /// Last successful reconciliation
    #[serde(default)]
    pub synced_at: Option<DateTime<Utc>>,
}

// Keeps the auth code out of logs and panics.
impl fmt::Debug for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Domain")
            .field("name", &self.name)
            .field("status", &self.status)
            .field("expires_at", &self.expires_at)
            .field("nameservers", &self.nameservers)
            .field("auth_code", &self.auth_code.as_ref().map(|_| "<REDACTED>"))
            .field("glue_records", &self.glue_records)
            .field("metadata", &self.metadata)
            .field("created_at", &self.created_at)
            .field("synced_at", &self.synced_at)
            .finish()
    }
}

impl Domain {
    /// A domain tracked locally ahead of its first sync
    pub fn pending(name: DomainName, now: DateTime<Utc>) -> Self {
        Self {
            name,
            status: DomainStatus::Pending,
            expires_at: None,
            nameservers: BTreeSet::new(),
            auth_code: None,
            glue_records: Vec::new(),
            metadata: BTreeMap::new(),
            created_at: now,
            synced_at: None,
        }
    }

    /// Look up a glue record by hostname
    pub fn glue(&self, hostname: &DomainName) -> Option<&GlueRecord> {
        self.glue_records.iter().find(|g| &g.hostname == hostname)
    }

    /// Glue records the registry no longer publishes
    pub fn stale_glue(&self) -> impl Iterator<Item = &GlueRecord> {
        self.glue_records.iter().filter(|g| g.stale)
    }

    /// Whether any glue record is stale
    pub fn has_stale_glue(&self) -> bool {
        self.glue_records.iter().any(|g| g.stale)
    }

    /// Auth code with all but the last four characters hidden
    pub fn masked_auth_code(&self) -> Option<String> {
        self.auth_code.as_ref().map(|code| {
            let chars: Vec<char> = code.chars().collect();
            let visible = chars.len().saturating_sub(4);
            chars
                .iter()
                .enumerate()
                .map(|(i, c)| if i < visible { '*' } else { *c })
                .collect()
        })
    }
}
