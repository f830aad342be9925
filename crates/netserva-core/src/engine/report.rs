//! Per-domain outcomes and bulk sync reports

use std::fmt;

use crate::model::DomainName;
use crate::reconcile::Drift;

/// What a sync did to the cached record
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Created,
    Updated,
    Unchanged,
    Cancelled,
    Skipped,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncAction::Created => "created",
            SyncAction::Updated => "updated",
            SyncAction::Unchanged => "unchanged",
            SyncAction::Cancelled => "cancelled",
            SyncAction::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// Result of syncing one domain
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DomainSyncOutcome {
    pub domain: DomainName,
    pub action: SyncAction,
    pub drift: Vec<Drift>,
}

impl DomainSyncOutcome {
    pub fn new(domain: DomainName, action: SyncAction, drift: Vec<Drift>) -> Self {
        Self {
            domain,
            action,
            drift,
        }
    }

    /// Whether any glue record went stale in this sync
    pub fn has_stale_glue(&self) -> bool {
        self.drift
            .iter()
            .any(|d| matches!(d, Drift::GlueStale { .. }))
    }
}

/// A domain that could not be synced
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SyncFailure {
    pub domain: DomainName,
    pub error: String,
}

/// Summary of a bulk sync
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct SyncReport {
    pub outcomes: Vec<DomainSyncOutcome>,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    pub(crate) fn record(&mut self, outcome: DomainSyncOutcome) {
        self.outcomes.push(outcome);
    }

    pub(crate) fn record_failure(&mut self, domain: DomainName, error: String) {
        self.failures.push(SyncFailure { domain, error });
    }

    /// Number of outcomes with the given action
    pub fn count(&self, action: SyncAction) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }

    /// Total drift entries across all domains
    pub fn drift_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.drift.len()).sum()
    }

    /// Whether every domain synced
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// One-line human summary
    pub fn summary(&self) -> String {
        format!(
            "{} created, {} updated, {} unchanged, {} cancelled, {} skipped, {} failed ({} drift)",
            self.count(SyncAction::Created),
            self.count(SyncAction::Updated),
            self.count(SyncAction::Unchanged),
            self.count(SyncAction::Cancelled),
            self.count(SyncAction::Skipped),
            self.failures.len(),
            self.drift_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let name = |s: &str| DomainName::parse(s).unwrap();
        let mut report = SyncReport::default();
        report.record(DomainSyncOutcome::new(
            name("a.com.au"),
            SyncAction::Created,
            vec![Drift::Created],
        ));
        report.record(DomainSyncOutcome::new(
            name("b.com.au"),
            SyncAction::Unchanged,
            Vec::new(),
        ));
        report.record_failure(name("c.com.au"), "HTTP 503".to_string());

        assert_eq!(report.count(SyncAction::Created), 1);
        assert!(!report.is_clean());
        assert_eq!(
            report.summary(),
            "1 created, 0 updated, 1 unchanged, 0 cancelled, 0 skipped, 1 failed (1 drift)"
        );
    }
}
