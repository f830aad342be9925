//! Domain sync engine
//!
//! The SyncEngine is responsible for:
//! - Fetching authoritative domain state via a Registrar
//! - Reconciling it against the DomainStore
//! - Upserting the result and reporting drift
//! - Pushing glue and nameserver changes to the registrar
//!
//! ## Architecture
//!
//! ```text
//!                ┌──────────────┐
//!                │  Registrar   │  (system of record)
//!                └──────┬───────┘
//!                       │ domain_info / list_hosts
//!                       ▼
//!                ┌──────────────┐      reconcile()
//!                │  SyncEngine  │ ───────────────────┐
//!                └──────┬───────┘                    │
//!         ┌─────────────┼──────────────┐             │
//!         ▼             ▼              ▼             │
//!  ┌─────────────┐ ┌──────────┐ ┌────────────┐       │
//!  │ DomainStore │ │  Events  │ │ SyncReport │ ◄─────┘
//!  │  (upsert)   │ │ (notify) │ │  (return)  │
//!  └─────────────┘ └──────────┘ └────────────┘
//! ```
//!
//! ## Bulk Sync Flow
//!
//! 1. List domains at the registrar
//! 2. Sync each one sequentially, pausing `bulk_delay_ms` between them
//! 3. Confirm cached domains the listing did not mention; cancel the missing
//! 4. Flush the store

use std::collections::BTreeSet;
use std::net::IpAddr;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::{StaleGluePolicy, SyncConfig, SyncSettings};
use crate::error::{Error, Result};
use crate::model::{Domain, DomainName, DomainStatus};
use crate::reconcile::{self, Drift, Reconciliation};
use crate::traits::{DomainStore, Registrar};

mod report;

pub use report::{DomainSyncOutcome, SyncAction, SyncReport};

/// Events emitted by the SyncEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Bulk sync started
    Started { domains_count: usize },

    /// A domain was reconciled
    DomainSynced {
        domain: DomainName,
        action: SyncAction,
        drift_count: usize,
    },

    /// A difference between cache and registry
    DriftDetected { domain: DomainName, drift: Drift },

    /// A domain could not be synced
    DomainFailed {
        domain: DomainName,
        error: String,
        retry_count: usize,
    },

    /// Bulk sync finished
    Finished {
        synced: usize,
        failed: usize,
    },
}

/// Filter for cached domain listings
#[derive(Debug, Clone, Default)]
pub struct DomainFilter {
    /// Only domains with this status
    pub status: Option<DomainStatus>,
    /// Only domains holding stale glue
    pub stale_only: bool,
}

impl DomainFilter {
    fn matches(&self, domain: &Domain) -> bool {
        if let Some(status) = &self.status
            && &domain.status != status
        {
            return false;
        }
        !self.stale_only || domain.has_stale_glue()
    }
}

/// Core sync engine
///
/// ## Threading
///
/// All registrar calls are made sequentially from the calling task; a bulk
/// sync over hundreds of domains is a plain loop. Methods take `&self`, so the
/// engine can be shared behind an `Arc`.
pub struct SyncEngine {
    /// Registrar (system of record)
    registrar: Box<dyn Registrar>,

    /// Local domain cache
    store: Box<dyn DomainStore>,

    /// Engine settings
    settings: SyncSettings,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<SyncEvent>,
}

impl SyncEngine {
    /// Create a new sync engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        registrar: Box<dyn Registrar>,
        store: Box<dyn DomainStore>,
        config: SyncConfig,
    ) -> Result<(Self, mpsc::Receiver<SyncEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.sync.event_channel_capacity);

        let engine = Self {
            registrar,
            store,
            settings: config.sync,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Engine settings
    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Sync one domain from the registry into the cache
    ///
    /// A registry miss for a previously synced, non-cancelled domain cancels
    /// the record. A miss for a domain that was never synced is an error.
    pub async fn sync_domain(&self, name: &DomainName) -> Result<DomainSyncOutcome> {
        self.sync_domain_removing(name, None).await
    }

    /// Sync one domain; `removed` names a glue host deleted on purpose,
    /// which is dropped from the cache instead of being marked stale
    async fn sync_domain_removing(
        &self,
        name: &DomainName,
        removed: Option<&DomainName>,
    ) -> Result<DomainSyncOutcome> {
        let mut retries = 0;
        match self.sync_domain_inner(name, removed, &mut retries).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.emit_event(SyncEvent::DomainFailed {
                    domain: name.clone(),
                    error: e.to_string(),
                    retry_count: retries,
                });
                Err(e)
            }
        }
    }

    async fn sync_domain_inner(
        &self,
        name: &DomainName,
        removed: Option<&DomainName>,
        retries: &mut usize,
    ) -> Result<DomainSyncOutcome> {
        let local = self.store.get(name).await?;

        if let Some(existing) = &local
            && existing.status.is_terminal()
            && !self.settings.include_cancelled
        {
            debug!("Domain {} is cancelled, skipping", name);
            let outcome = DomainSyncOutcome::new(name.clone(), SyncAction::Skipped, Vec::new());
            self.emit_synced(&outcome);
            return Ok(outcome);
        }

        let fetched = self
            .with_retry(name, retries, || self.registrar.domain_info(name))
            .await;

        let now = Utc::now();
        let (reconciliation, action) = match (fetched, &local) {
            (Ok(info), _) => {
                // Only a miss on the domain itself cancels it
                let hosts = match self
                    .with_retry(name, retries, || self.registrar.list_hosts(name))
                    .await
                {
                    Ok(hosts) => hosts,
                    Err(e) if e.is_not_found() => {
                        debug!("No hosts published for {}: {}", name, e);
                        Vec::new()
                    }
                    Err(e) => return Err(e),
                };

                let mut result = reconcile::reconcile(local.as_ref(), &info, &hosts, now);
                let dropped = removed.is_some_and(|host| Self::drop_removed_glue(&mut result, host));
                if self.settings.stale_glue == StaleGluePolicy::Purge {
                    let purged = reconcile::purge_stale_glue(&mut result.domain);
                    if !purged.is_empty() {
                        debug!("Purged {} stale glue record(s) from {}", purged.len(), name);
                    }
                }
                let action = if local.is_none() {
                    SyncAction::Created
                } else if result.is_noop() && !dropped {
                    SyncAction::Unchanged
                } else {
                    SyncAction::Updated
                };
                (result, action)
            }
            // Never-synced records were only tracked locally; a miss there is a plain error.
            (Err(e), Some(existing)) if e.is_not_found() && existing.synced_at.is_some() => {
                match reconcile::mark_cancelled(existing, now) {
                    Some(result) => {
                        warn!("Domain {} no longer exists at the registry, marking cancelled", name);
                        (result, SyncAction::Cancelled)
                    }
                    None => (
                        Reconciliation {
                            domain: existing.clone(),
                            drift: Vec::new(),
                        },
                        SyncAction::Unchanged,
                    ),
                }
            }
            (Err(e), _) => return Err(e),
        };

        for drift in &reconciliation.drift {
            info!("{}: {}", name, drift);
            self.emit_event(SyncEvent::DriftDetected {
                domain: name.clone(),
                drift: drift.clone(),
            });
        }

        if self.settings.dry_run {
            debug!("[DRY-RUN] Not writing {} to the cache", name);
        } else {
            self.store.upsert(&reconciliation.domain).await?;
        }

        let outcome = DomainSyncOutcome::new(name.clone(), action, reconciliation.drift);
        self.emit_synced(&outcome);
        Ok(outcome)
    }

    /// Sync every domain the registrar lists, plus cached domains it does not
    ///
    /// Failures are collected in the report; one bad domain never stops the sweep.
    pub async fn sync_all(&self) -> Result<SyncReport> {
        let listing = self
            .with_retry_label("domain listing", &mut 0, || self.registrar.list_domains())
            .await?;

        let remote_names: BTreeSet<DomainName> =
            listing.into_iter().map(|summary| summary.name).collect();

        let cached = self.store.list().await?;
        let orphans: Vec<DomainName> = cached
            .iter()
            .filter(|d| !remote_names.contains(&d.name))
            .filter(|d| self.settings.include_cancelled || !d.status.is_terminal())
            .map(|d| d.name.clone())
            .collect();

        let total = remote_names.len() + orphans.len();
        info!(
            "Syncing {} domain(s) from {} ({} cached only)",
            total,
            self.registrar.registrar_name(),
            orphans.len()
        );
        self.emit_event(SyncEvent::Started {
            domains_count: total,
        });

        let names: Vec<DomainName> = remote_names.into_iter().chain(orphans).collect();
        let report = self.sync_domains(&names).await;

        if !self.settings.dry_run {
            self.store.flush().await?;
        }

        info!("{}", report.summary());
        self.emit_event(SyncEvent::Finished {
            synced: report.outcomes.len(),
            failed: report.failures.len(),
        });

        Ok(report)
    }

    /// Sync the given domains in order, pausing `bulk_delay_ms` between them
    ///
    /// Failures are collected in the report instead of stopping the run.
    pub async fn sync_domains(&self, names: &[DomainName]) -> SyncReport {
        let mut report = SyncReport::default();
        let pace = Duration::from_millis(self.settings.bulk_delay_ms);

        for (index, name) in names.iter().enumerate() {
            if index > 0 && !pace.is_zero() {
                tokio::time::sleep(pace).await;
            }

            match self.sync_domain(name).await {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    error!("Failed to sync {}: {}", name, e);
                    report.record_failure(name.clone(), e.to_string());
                }
            }
        }
        report
    }

    /// Start tracking a domain ahead of its first sync
    ///
    /// Idempotent: an already cached record is returned as is.
    pub async fn track_domain(&self, name: &DomainName) -> Result<Domain> {
        if let Some(existing) = self.store.get(name).await? {
            debug!("Domain {} already tracked", name);
            return Ok(existing);
        }

        let domain = Domain::pending(name.clone(), Utc::now());
        if !self.settings.dry_run {
            self.store.upsert(&domain).await?;
        }
        info!("Tracking domain {}", name);
        Ok(domain)
    }

    /// Register a glue record at the registrar, then re-sync the domain
    pub async fn add_glue(
        &self,
        domain: &DomainName,
        hostname: &DomainName,
        ips: &[IpAddr],
    ) -> Result<DomainSyncOutcome> {
        Self::validate_glue_host(domain, hostname)?;
        if ips.is_empty() {
            return Err(Error::invalid_input(format!(
                "Glue record {} needs at least one IP address",
                hostname
            )));
        }

        let unique: Vec<IpAddr> = ips.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();

        if self.settings.dry_run {
            info!("[DRY-RUN] Would add glue {} -> {:?} on {}", hostname, unique, domain);
        } else {
            self.registrar.add_host(domain, hostname, &unique).await?;
            info!("Added glue {} on {}", hostname, domain);
        }

        self.sync_domain(domain).await
    }

    /// Delete a glue record at the registrar, then re-sync the domain
    ///
    /// The cached record disappears on the re-sync only if the registry also
    /// stops publishing it; otherwise it stays and the drift shows why.
    pub async fn remove_glue(
        &self,
        domain: &DomainName,
        hostname: &DomainName,
    ) -> Result<DomainSyncOutcome> {
        Self::validate_glue_host(domain, hostname)?;

        if self.settings.dry_run {
            info!("[DRY-RUN] Would delete glue {} on {}", hostname, domain);
            return self.sync_domain(domain).await;
        }

        self.registrar.delete_host(domain, hostname).await?;
        info!("Deleted glue {} on {}", hostname, domain);

        self.sync_domain_removing(domain, Some(hostname)).await
    }

    /// Replace the delegated nameservers, then re-sync the domain
    pub async fn set_nameservers(
        &self,
        domain: &DomainName,
        nameservers: &[DomainName],
    ) -> Result<DomainSyncOutcome> {
        let unique: Vec<DomainName> = nameservers
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if unique.len() < 2 {
            return Err(Error::invalid_input(format!(
                "{} needs at least two distinct nameservers, got {}",
                domain,
                unique.len()
            )));
        }

        if self.settings.dry_run {
            info!("[DRY-RUN] Would set nameservers of {} to {:?}", domain, unique);
        } else {
            self.registrar.update_nameservers(domain, &unique).await?;
            info!("Updated nameservers of {}", domain);
        }

        self.sync_domain(domain).await
    }

    /// Remove stale glue records from the cache
    pub async fn prune_stale_glue(&self, domain: &DomainName) -> Result<Vec<DomainName>> {
        let mut cached = self
            .store
            .get(domain)
            .await?
            .ok_or_else(|| Error::not_found(format!("Domain {} is not tracked", domain)))?;

        let removed = reconcile::purge_stale_glue(&mut cached);
        if removed.is_empty() {
            debug!("No stale glue on {}", domain);
            return Ok(removed);
        }

        if self.settings.dry_run {
            info!("[DRY-RUN] Would prune {} stale glue record(s) from {}", removed.len(), domain);
        } else {
            self.store.upsert(&cached).await?;
            info!("Pruned {} stale glue record(s) from {}", removed.len(), domain);
        }
        Ok(removed)
    }

    /// Cached record for a domain
    pub async fn show(&self, name: &DomainName) -> Result<Domain> {
        self.store
            .get(name)
            .await?
            .ok_or_else(|| Error::not_found(format!("Domain {} is not tracked", name)))
    }

    /// Cached records matching a filter
    pub async fn list(&self, filter: &DomainFilter) -> Result<Vec<Domain>> {
        Ok(self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|d| filter.matches(d))
            .collect())
    }

    fn validate_glue_host(domain: &DomainName, hostname: &DomainName) -> Result<()> {
        if hostname.is_within(domain) {
            Ok(())
        } else {
            Err(Error::invalid_input(format!(
                "Glue host {} must be a name within {}",
                hostname, domain
            )))
        }
    }

    /// Forget a glue host deleted on purpose: no stale drift, no stale record
    ///
    /// Returns whether a cached record was dropped.
    fn drop_removed_glue(result: &mut Reconciliation, hostname: &DomainName) -> bool {
        result
            .drift
            .retain(|d| !matches!(d, Drift::GlueStale { host } if host == hostname));

        let before = result.domain.glue_records.len();
        result
            .domain
            .glue_records
            .retain(|g| !(&g.hostname == hostname && g.stale));
        result.domain.glue_records.len() != before
    }

    async fn with_retry<T, F, Fut>(&self, name: &DomainName, retries: &mut usize, op: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        self.with_retry_label(name.as_str(), retries, op).await
    }

    /// Run a registrar read, retrying transient failures
    ///
    /// `retries` is increased by the number of retries made.
    async fn with_retry_label<T, F, Fut>(&self, label: &str, retries: &mut usize, op: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_permanent() || attempt >= self.settings.max_retries => {
                    return Err(e);
                }
                Err(e) => {
                    warn!("Attempt {} failed for {}: {}", attempt, label, e);
                    attempt += 1;
                    *retries += 1;
                    tokio::time::sleep(Duration::from_secs(self.settings.retry_delay_secs)).await;
                }
            }
        }
    }

    fn emit_synced(&self, outcome: &DomainSyncOutcome) {
        self.emit_event(SyncEvent::DomainSynced {
            domain: outcome.domain.clone(),
            action: outcome.action,
            drift_count: outcome.drift.len(),
        });
    }

    fn emit_event(&self, event: SyncEvent) {
        // A closed channel just means nobody is listening.
        if let Err(mpsc::error::TrySendError::Full(_)) = self.event_tx.try_send(event) {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}
