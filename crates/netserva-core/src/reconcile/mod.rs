//! Reconciliation of cached domain state against the registry
//!
//! The registry is the system of record. [`reconcile`] takes the cached record
//! (if any) and the registry's view, and returns the next cached record plus
//! the list of [`Drift`] entries that explain every difference. It performs no
//! I/O and is deterministic for a given `now`, so running it twice over the
//! same registry view yields an empty drift list the second time.
//!
//! ```text
//!   local cache ──┐
//!                 ├──► reconcile() ──► (next Domain, Vec<Drift>)
//!   registry ─────┘
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};

use crate::model::{Domain, DomainName, DomainStatus, GlueRecord, RemoteDomain, RemoteHost};

/// One observed difference between the cache and the registry
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Drift {
    /// First time the domain enters the cache
    Created,
    /// Registry status moved
    StatusChanged {
        from: DomainStatus,
        to: DomainStatus,
    },
    /// Expiry date moved (renewal, or a correction at the registry)
    ExpiryChanged {
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    },
    /// Delegation differs
    NameserversChanged {
        added: Vec<DomainName>,
        removed: Vec<DomainName>,
    },
    /// The transfer code differs from the cached one
    AuthCodeRotated,
    /// Registry has a host the cache did not know
    GlueAdded { host: DomainName },
    /// Host addresses differ
    GlueChanged {
        host: DomainName,
        added: Vec<IpAddr>,
        removed: Vec<IpAddr>,
    },
    /// A stale host reappeared at the registry
    GlueRestored { host: DomainName },
    /// A cached host is no longer published by the registry
    GlueStale { host: DomainName },
    /// A registry-supplied metadata value changed
    MetadataChanged { key: String },
    /// The registry no longer knows the domain
    Cancelled,
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Drift::Created => write!(f, "created"),
            Drift::StatusChanged { from, to } => write!(f, "status {} -> {}", from, to),
            Drift::ExpiryChanged { from, to } => write!(
                f,
                "expiry {} -> {}",
                fmt_date(from.as_ref()),
                fmt_date(to.as_ref())
            ),
            Drift::NameserversChanged { added, removed } => write!(
                f,
                "nameservers +[{}] -[{}]",
                join(added),
                join(removed)
            ),
            Drift::AuthCodeRotated => write!(f, "auth code rotated"),
            Drift::GlueAdded { host } => write!(f, "glue {} added", host),
            Drift::GlueChanged {
                host,
                added,
                removed,
            } => write!(
                f,
                "glue {} addresses +[{}] -[{}]",
                host,
                join(added),
                join(removed)
            ),
            Drift::GlueRestored { host } => write!(f, "glue {} restored", host),
            Drift::GlueStale { host } => write!(f, "glue {} stale", host),
            Drift::MetadataChanged { key } => write!(f, "metadata {} changed", key),
            Drift::Cancelled => write!(f, "cancelled"),
        }
    }
}

fn fmt_date(date: Option<&DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "none".to_string())
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result of reconciling one domain
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// The record to write back to the cache
    pub domain: Domain,
    /// Differences found, in a stable order
    pub drift: Vec<Drift>,
}

impl Reconciliation {
    /// Whether the cache already matched the registry
    pub fn is_noop(&self) -> bool {
        self.drift.is_empty()
    }
}

/// Reconcile a cached record against the registry's view
///
/// `local` must describe the same domain as `remote` (or be `None` for a
/// domain seen for the first time). Cancelled records are terminal and come
/// back untouched with no drift.
pub fn reconcile(
    local: Option<&Domain>,
    remote: &RemoteDomain,
    hosts: &[RemoteHost],
    now: DateTime<Utc>,
) -> Reconciliation {
    if let Some(existing) = local
        && existing.status.is_terminal()
    {
        return Reconciliation {
            domain: existing.clone(),
            drift: Vec::new(),
        };
    }

    let mut drift = Vec::new();
    let mut next = match local {
        Some(existing) => existing.clone(),
        None => {
            drift.push(Drift::Created);
            Domain::pending(remote.name.clone(), now)
        }
    };
    let is_new = local.is_none();

    if next.status != remote.status {
        if !is_new {
            drift.push(Drift::StatusChanged {
                from: next.status.clone(),
                to: remote.status.clone(),
            });
        }
        next.status = remote.status.clone();
    }

    if next.expires_at != remote.expires_at {
        if !is_new {
            drift.push(Drift::ExpiryChanged {
                from: next.expires_at,
                to: remote.expires_at,
            });
        }
        next.expires_at = remote.expires_at;
    }

    if next.nameservers != remote.nameservers {
        if !is_new {
            drift.push(Drift::NameserversChanged {
                added: remote
                    .nameservers
                    .difference(&next.nameservers)
                    .cloned()
                    .collect(),
                removed: next
                    .nameservers
                    .difference(&remote.nameservers)
                    .cloned()
                    .collect(),
            });
        }
        next.nameservers = remote.nameservers.clone();
    }

    // A registry that stops reporting the code is not a rotation; keep the last known one.
    if let Some(remote_code) = &remote.auth_code
        && next.auth_code.as_ref() != Some(remote_code)
    {
        if !is_new {
            drift.push(Drift::AuthCodeRotated);
        }
        next.auth_code = Some(remote_code.clone());
    }

    let (glue, glue_drift) = reconcile_glue(&next.glue_records, hosts, now);
    next.glue_records = glue;
    drift.extend(glue_drift);

    for (key, value) in &remote.metadata {
        if next.metadata.get(key) != Some(value) {
            if !is_new {
                drift.push(Drift::MetadataChanged { key: key.clone() });
            }
            next.metadata.insert(key.clone(), value.clone());
        }
    }

    next.synced_at = Some(now);

    Reconciliation {
        domain: next,
        drift,
    }
}

fn reconcile_glue(
    local: &[GlueRecord],
    remote: &[RemoteHost],
    now: DateTime<Utc>,
) -> (Vec<GlueRecord>, Vec<Drift>) {
    let mut by_host: BTreeMap<DomainName, GlueRecord> = local
        .iter()
        .map(|g| (g.hostname.clone(), g.clone()))
        .collect();
    // A host without addresses is no glue at all
    let remote: Vec<&RemoteHost> = remote.iter().filter(|h| !h.ips.is_empty()).collect();
    let remote_hosts: BTreeSet<&DomainName> = remote.iter().map(|h| &h.hostname).collect();
    let mut drift = Vec::new();

    for &host in &remote {
        match by_host.get_mut(&host.hostname) {
            None => {
                drift.push(Drift::GlueAdded {
                    host: host.hostname.clone(),
                });
                by_host.insert(
                    host.hostname.clone(),
                    GlueRecord::new(host.hostname.clone(), host.ips.iter().copied()),
                );
            }
            Some(existing) => {
                if existing.stale {
                    drift.push(Drift::GlueRestored {
                        host: host.hostname.clone(),
                    });
                    existing.stale = false;
                    existing.stale_since = None;
                }
                if existing.ips != host.ips {
                    drift.push(Drift::GlueChanged {
                        host: host.hostname.clone(),
                        added: host.ips.difference(&existing.ips).copied().collect(),
                        removed: existing.ips.difference(&host.ips).copied().collect(),
                    });
                    existing.ips = host.ips.clone();
                }
            }
        }
    }

    for (hostname, record) in by_host.iter_mut() {
        if !remote_hosts.contains(hostname) && !record.stale {
            drift.push(Drift::GlueStale {
                host: hostname.clone(),
            });
            record.stale = true;
            record.stale_since = Some(now);
        }
    }

    (by_host.into_values().collect(), drift)
}

/// Terminal transition for a domain the registry no longer knows
///
/// Returns `None` if the record is already cancelled.
pub fn mark_cancelled(local: &Domain, now: DateTime<Utc>) -> Option<Reconciliation> {
    if local.status.is_terminal() {
        return None;
    }

    let mut domain = local.clone();
    domain.status = DomainStatus::Cancelled;
    domain.synced_at = Some(now);

    Some(Reconciliation {
        domain,
        drift: vec![Drift::Cancelled],
    })
}

/// Drop stale glue records, returning the hostnames removed
pub fn purge_stale_glue(domain: &mut Domain) -> Vec<DomainName> {
    let (stale, fresh): (Vec<GlueRecord>, Vec<GlueRecord>) =
        domain.glue_records.drain(..).partition(|g| g.stale);
    domain.glue_records = fresh;
    stale.into_iter().map(|g| g.hostname).collect()
}
