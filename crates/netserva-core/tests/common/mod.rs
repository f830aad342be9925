//! Test doubles and common utilities for sync contract tests
//!
//! `MockRegistrar` keeps a scripted registry in memory. Clones share state, so
//! a test can hand one clone to the engine and keep another to mutate the
//! "registry" and inspect call counters.

#![allow(dead_code)]

use netserva_core::error::{Error, Result};
use netserva_core::traits::Registrar;
use netserva_core::{
    DomainName, DomainStatus, RegistrarConfig, RemoteDomain, RemoteDomainSummary, RemoteHost,
    SyncConfig,
};
use std::collections::{BTreeMap, HashMap};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RegistryState {
    domains: BTreeMap<DomainName, (RemoteDomain, Vec<RemoteHost>)>,
    /// Remaining transient failures per domain
    failures: HashMap<DomainName, usize>,
    /// Domains that exist but are left out of the listing
    unlisted: Vec<DomainName>,
    /// Domains whose host listing answers "not found"
    hosts_missing: Vec<DomainName>,
}

#[derive(Clone, Default)]
pub struct MockRegistrar {
    state: Arc<Mutex<RegistryState>>,
    info_calls: Arc<AtomicUsize>,
    list_calls: Arc<AtomicUsize>,
    mutation_calls: Arc<AtomicUsize>,
}

impl MockRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a domain into the registry (replacing any previous version)
    pub fn put(&self, domain: RemoteDomain, hosts: Vec<RemoteHost>) {
        self.state
            .lock()
            .unwrap()
            .domains
            .insert(domain.name.clone(), (domain, hosts));
    }

    /// Delete a domain from the registry
    pub fn drop_domain(&self, name: &str) {
        self.state.lock().unwrap().domains.remove(&name_of(name));
    }

    /// Replace the host list of a domain
    pub fn set_hosts(&self, name: &str, hosts: Vec<RemoteHost>) {
        let mut state = self.state.lock().unwrap();
        if let Some(entry) = state.domains.get_mut(&name_of(name)) {
            entry.1 = hosts;
        }
    }

    /// Change a domain in place
    pub fn edit(&self, name: &str, f: impl FnOnce(&mut RemoteDomain)) {
        let mut state = self.state.lock().unwrap();
        if let Some(entry) = state.domains.get_mut(&name_of(name)) {
            f(&mut entry.0);
        }
    }

    /// Fail the next `times` info requests for a domain with a transient error
    pub fn fail_times(&self, name: &str, times: usize) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(name_of(name), times);
    }

    /// Keep a domain out of `list_domains` while it still answers `domain_info`
    pub fn hide_from_listing(&self, name: &str) {
        self.state.lock().unwrap().unlisted.push(name_of(name));
    }

    /// Answer `list_hosts` for a domain with "not found" while `domain_info` still succeeds
    pub fn hosts_not_found(&self, name: &str) {
        self.state.lock().unwrap().hosts_missing.push(name_of(name));
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn mutation_calls(&self) -> usize {
        self.mutation_calls.load(Ordering::SeqCst)
    }

    pub fn hosts_of(&self, name: &str) -> Vec<RemoteHost> {
        self.state
            .lock()
            .unwrap()
            .domains
            .get(&name_of(name))
            .map(|(_, hosts)| hosts.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Registrar for MockRegistrar {
    async fn list_domains(&self) -> Result<Vec<RemoteDomainSummary>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        Ok(state
            .domains
            .values()
            .filter(|(d, _)| !state.unlisted.contains(&d.name))
            .map(|(d, _)| RemoteDomainSummary {
                name: d.name.clone(),
                status: d.status.clone(),
                expires_at: d.expires_at,
            })
            .collect())
    }

    async fn domain_info(&self, domain: &DomainName) -> Result<RemoteDomain> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();

        if let Some(remaining) = state.failures.get_mut(domain)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(Error::provider("mock", "HTTP 503"));
        }

        state
            .domains
            .get(domain)
            .map(|(d, _)| d.clone())
            .ok_or_else(|| Error::not_found(domain.to_string()))
    }

    async fn list_hosts(&self, domain: &DomainName) -> Result<Vec<RemoteHost>> {
        let state = self.state.lock().unwrap();
        if state.hosts_missing.contains(domain) {
            return Err(Error::not_found("No hosts found for domain"));
        }
        state
            .domains
            .get(domain)
            .map(|(_, hosts)| hosts.clone())
            .ok_or_else(|| Error::not_found(domain.to_string()))
    }

    async fn add_host(
        &self,
        domain: &DomainName,
        hostname: &DomainName,
        ips: &[IpAddr],
    ) -> Result<()> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        let (_, hosts) = state
            .domains
            .get_mut(domain)
            .ok_or_else(|| Error::not_found(domain.to_string()))?;
        hosts.retain(|h| &h.hostname != hostname);
        hosts.push(RemoteHost {
            hostname: hostname.clone(),
            ips: ips.iter().copied().collect(),
        });
        Ok(())
    }

    async fn delete_host(&self, domain: &DomainName, hostname: &DomainName) -> Result<()> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        let (_, hosts) = state
            .domains
            .get_mut(domain)
            .ok_or_else(|| Error::not_found(domain.to_string()))?;
        let before = hosts.len();
        hosts.retain(|h| &h.hostname != hostname);
        if hosts.len() == before {
            return Err(Error::not_found(hostname.to_string()));
        }
        Ok(())
    }

    async fn update_nameservers(
        &self,
        domain: &DomainName,
        nameservers: &[DomainName],
    ) -> Result<()> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        let (remote, _) = state
            .domains
            .get_mut(domain)
            .ok_or_else(|| Error::not_found(domain.to_string()))?;
        remote.nameservers = nameservers.iter().cloned().collect();
        Ok(())
    }

    fn registrar_name(&self) -> &'static str {
        "mock"
    }
}

pub fn name_of(s: &str) -> DomainName {
    DomainName::parse(s).unwrap()
}

pub fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

/// An active domain with two in-zone nameservers
pub fn active_domain(name: &str) -> RemoteDomain {
    let mut remote = RemoteDomain::new(name_of(name), DomainStatus::Active);
    remote.nameservers = [format!("ns1.{}", name), format!("ns2.{}", name)]
        .iter()
        .map(|ns| name_of(ns))
        .collect();
    remote.auth_code = Some(format!("auth-{}", name));
    remote
}

/// A glue host with the given addresses
pub fn host(hostname: &str, ips: &[&str]) -> RemoteHost {
    RemoteHost {
        hostname: name_of(hostname),
        ips: ips.iter().map(|s| ip(s)).collect(),
    }
}

/// Minimal config for tests: no pacing, fast retries
pub fn test_config() -> SyncConfig {
    let mut config = SyncConfig::new(RegistrarConfig::Custom {
        factory: "mock".to_string(),
        config: serde_json::json!({}),
    });
    config.sync.max_retries = 2;
    config.sync.retry_delay_secs = 0;
    config.sync.bulk_delay_ms = 0;
    config.sync.event_channel_capacity = 100;
    config
}
