// # nssync - NetServa domain sync CLI
//
// A thin integration layer over `netserva-core`. Sync, glue and nameserver
// logic lives in the library; this binary only:
// 1. Reads configuration from environment variables
// 2. Initializes logging and the runtime
// 3. Registers the registrar and cache backends
// 4. Runs one command against the `SyncEngine` and prints the result
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Registrar
// - `NETSERVA_SW_RESELLER_ID`: Synergy Wholesale reseller ID (required)
// - `NETSERVA_SW_API_KEY`: Synergy Wholesale API key (required)
// - `NETSERVA_SW_API_URL`: API base URL override (optional)
//
// ### Cache
// - `NETSERVA_CACHE_TYPE`: `file` (default) or `memory`
// - `NETSERVA_CACHE_PATH`: Cache file path (default `netserva-domains.json`)
//
// ### Engine
// - `NETSERVA_MAX_RETRIES`: Retries per registrar read (0-10)
// - `NETSERVA_RETRY_DELAY_SECS`: Delay between retries (0-300)
// - `NETSERVA_BULK_DELAY_MS`: Pause between domains in a bulk sync
// - `NETSERVA_STALE_GLUE`: `mark` (default) or `purge`
// - `NETSERVA_INCLUDE_CANCELLED`: Re-check cancelled domains (`true`/`false`)
// - `NETSERVA_MODE`: `dry-run` to log mutations without sending them
// - `NETSERVA_LOG_LEVEL`: trace, debug, info, warn (default), error
//
// ## Example
//
// ```bash
// export NETSERVA_SW_RESELLER_ID=1234
// export NETSERVA_SW_API_KEY=your_key
// export NETSERVA_CACHE_PATH=/var/lib/netserva/domains.json
//
// nssync sync --all
// nssync glue add example.com.au ns1.example.com.au 203.0.113.10
// nssync list --stale --json
// ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use netserva_core::engine::DomainFilter;
use netserva_core::{
    CacheConfig, Domain, DomainName, DomainStatus, DomainSyncOutcome, RegistrarConfig,
    RegistrarRegistry, StaleGluePolicy, SyncConfig, SyncEngine, SyncEvent, SyncReport,
};
use std::env;
use std::net::IpAddr;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes
///
/// - 0: Command succeeded
/// - 1: Configuration error or failed command
/// - 2: Runtime setup failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NssyncExitCode {
    Success = 0,
    CommandError = 1,
    RuntimeError = 2,
}

impl From<NssyncExitCode> for ExitCode {
    fn from(code: NssyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Parser)]
#[command(name = "nssync")]
#[command(about = "Sync registrar-held domains into the NetServa cache")]
#[command(version)]
struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    /// Log registrar mutations and cache writes instead of performing them
    #[arg(long, global = true, default_value_t = false)]
    dry_run: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync the named domains, or every domain with --all
    Sync {
        domains: Vec<String>,
        #[arg(long, conflicts_with = "domains")]
        all: bool,
    },
    /// Show the cached record of a domain
    Show { domain: String },
    /// List cached domains
    List {
        /// Only domains holding stale glue
        #[arg(long)]
        stale: bool,
        /// Only domains with this status
        #[arg(long)]
        status: Option<String>,
    },
    /// Start tracking a domain ahead of its first sync
    Track { domain: String },
    /// Manage glue (host) records
    Glue {
        #[command(subcommand)]
        command: GlueCommand,
    },
    /// Replace the delegated nameservers of a domain
    Nameservers {
        domain: String,
        #[arg(required = true, num_args = 1..)]
        nameservers: Vec<String>,
    },
}

#[derive(Subcommand)]
enum GlueCommand {
    /// Register a glue record at the registrar
    Add {
        domain: String,
        host: String,
        #[arg(required = true, num_args = 1..)]
        ips: Vec<IpAddr>,
    },
    /// Delete a glue record at the registrar
    Remove { domain: String, host: String },
    /// Drop stale glue records from the cache
    Prune { domain: String },
}

/// Application configuration
struct Config {
    reseller_id: String,
    api_key: String,
    api_url: Option<String>,
    cache_type: String,
    cache_path: String,
    max_retries: Option<usize>,
    retry_delay_secs: Option<u64>,
    bulk_delay_ms: Option<u64>,
    stale_glue: StaleGluePolicy,
    include_cancelled: bool,
    dry_run: bool,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let parse_num = |key: &str| -> Result<Option<u64>> {
            lookup(key)
                .map(|raw| {
                    raw.trim()
                        .parse::<u64>()
                        .with_context(|| format!("{} must be a non-negative integer. Got: {}", key, raw))
                })
                .transpose()
        };

        let stale_glue = match lookup("NETSERVA_STALE_GLUE") {
            Some(raw) => raw.parse()?,
            None => StaleGluePolicy::default(),
        };

        let include_cancelled = match lookup("NETSERVA_INCLUDE_CANCELLED") {
            Some(raw) => parse_bool("NETSERVA_INCLUDE_CANCELLED", &raw)?,
            None => false,
        };

        Ok(Self {
            reseller_id: lookup("NETSERVA_SW_RESELLER_ID").unwrap_or_default(),
            api_key: lookup("NETSERVA_SW_API_KEY").unwrap_or_default(),
            api_url: lookup("NETSERVA_SW_API_URL").filter(|s| !s.is_empty()),
            cache_type: lookup("NETSERVA_CACHE_TYPE").unwrap_or_else(|| "file".to_string()),
            cache_path: lookup("NETSERVA_CACHE_PATH")
                .unwrap_or_else(|| "netserva-domains.json".to_string()),
            max_retries: parse_num("NETSERVA_MAX_RETRIES")?.map(|n| n as usize),
            retry_delay_secs: parse_num("NETSERVA_RETRY_DELAY_SECS")?,
            bulk_delay_ms: parse_num("NETSERVA_BULK_DELAY_MS")?,
            stale_glue,
            include_cancelled,
            dry_run: lookup("NETSERVA_MODE")
                .is_some_and(|mode| mode.eq_ignore_ascii_case("dry-run")),
            log_level: lookup("NETSERVA_LOG_LEVEL").unwrap_or_else(|| "warn".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.reseller_id.trim().is_empty() {
            anyhow::bail!(
                "NETSERVA_SW_RESELLER_ID is required. \
                Set it via: export NETSERVA_SW_RESELLER_ID=1234"
            );
        }

        if self.api_key.is_empty() {
            anyhow::bail!(
                "NETSERVA_SW_API_KEY is required. \
                Set it via: export NETSERVA_SW_API_KEY=your_key"
            );
        }

        match self.cache_type.as_str() {
            "file" | "memory" => {}
            _ => anyhow::bail!(
                "NETSERVA_CACHE_TYPE '{}' is not supported. \
                Supported types: file, memory",
                self.cache_type
            ),
        }

        if self.cache_type == "file" && self.cache_path.trim().is_empty() {
            anyhow::bail!("NETSERVA_CACHE_PATH cannot be empty when NETSERVA_CACHE_TYPE=file");
        }

        if let Some(max_retries) = self.max_retries
            && max_retries > 10
        {
            anyhow::bail!(
                "NETSERVA_MAX_RETRIES must be between 0 and 10. Got: {}",
                max_retries
            );
        }

        if let Some(retry_delay) = self.retry_delay_secs
            && retry_delay > 300
        {
            anyhow::bail!(
                "NETSERVA_RETRY_DELAY_SECS must be between 0 and 300 seconds. Got: {}",
                retry_delay
            );
        }

        if let Some(url) = &self.api_url
            && url.starts_with("http://")
        {
            eprintln!(
                "WARNING: NETSERVA_SW_API_URL uses HTTP (not HTTPS). \
                The API key is sent in the request body."
            );
        }

        log_level(&self.log_level)?;

        Ok(())
    }

    /// Library configuration for the engine and registry
    fn sync_config(&self, cli_dry_run: bool) -> SyncConfig {
        let mut config = SyncConfig::new(RegistrarConfig::Synergy {
            reseller_id: self.reseller_id.trim().to_string(),
            api_key: self.api_key.clone(),
            api_url: self.api_url.clone(),
            timeout_secs: None,
        });

        config.cache = match self.cache_type.as_str() {
            "memory" => CacheConfig::Memory,
            _ => CacheConfig::File {
                path: self.cache_path.clone(),
            },
        };

        if let Some(max_retries) = self.max_retries {
            config.sync.max_retries = max_retries;
        }
        if let Some(delay) = self.retry_delay_secs {
            config.sync.retry_delay_secs = delay;
        }
        if let Some(delay) = self.bulk_delay_ms {
            config.sync.bulk_delay_ms = delay;
        }
        config.sync.stale_glue = self.stale_glue;
        config.sync.include_cancelled = self.include_cancelled;
        config.sync.dry_run = self.dry_run || cli_dry_run;
        config
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => anyhow::bail!("{} must be true or false. Got: {}", key, raw),
    }
}

fn log_level(raw: &str) -> Result<Level> {
    match raw.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "NETSERVA_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            raw
        ),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return NssyncExitCode::CommandError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return NssyncExitCode::CommandError.into();
    }

    // Logs go to stderr so command output on stdout stays parseable
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(&config.log_level).unwrap_or(Level::WARN))
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return NssyncExitCode::RuntimeError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return NssyncExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run(cli, config)).into()
}

/// Build the engine and run one command
///
/// Engine construction failures are runtime errors; the command's own
/// failures are command errors.
async fn run(cli: Cli, config: Config) -> NssyncExitCode {
    let sync_config = config.sync_config(cli.dry_run);
    if let Err(e) = sync_config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return NssyncExitCode::CommandError;
    }

    let (engine, events) = match build_engine(sync_config).await {
        Ok(built) => built,
        Err(e) => {
            eprintln!("Setup error: {:#}", e);
            return NssyncExitCode::RuntimeError;
        }
    };

    match execute(engine, events, cli.command, cli.json).await {
        Ok(()) => NssyncExitCode::Success,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            NssyncExitCode::CommandError
        }
    }
}

/// Create the registrar, the cache store and the engine
async fn build_engine(sync_config: SyncConfig) -> Result<(SyncEngine, mpsc::Receiver<SyncEvent>)> {
    let registry = RegistrarRegistry::with_builtin_stores();

    #[cfg(feature = "synergy")]
    netserva_registrar_synergy::register(&registry);

    let registrar = registry
        .create_registrar(&sync_config.registrar)
        .context("Failed to create registrar")?;
    let store = registry
        .create_store(&sync_config.cache)
        .await
        .context("Failed to open domain cache")?;

    if sync_config.sync.dry_run {
        info!("Running in dry-run mode: no registrar or cache changes will be made");
    }

    Ok(SyncEngine::new(registrar, store, sync_config)?)
}

/// Run one command while logging engine events
async fn execute(
    engine: SyncEngine,
    events: mpsc::Receiver<SyncEvent>,
    command: Commands,
    json: bool,
) -> Result<()> {
    let event_logger = tokio::spawn(async move {
        let mut events = ReceiverStream::new(events);
        while let Some(event) = events.next().await {
            log_event(&event);
        }
    });

    let result = dispatch(&engine, command, json).await;

    // Dropping the engine closes the event channel and ends the logger
    drop(engine);
    if let Err(e) = event_logger.await {
        debug!("Event logger ended abnormally: {}", e);
    }

    result
}

async fn dispatch(engine: &SyncEngine, command: Commands, json: bool) -> Result<()> {
    match command {
        Commands::Sync { domains, all } => {
            if all {
                let report = engine.sync_all().await?;
                print_report(&report, json, true)?;
                if !report.is_clean() {
                    anyhow::bail!("{} domain(s) failed to sync", report.failures.len());
                }
                return Ok(());
            }

            if domains.is_empty() {
                anyhow::bail!("Specify one or more domains, or --all");
            }

            let names = domains
                .iter()
                .map(|raw| parse_name(raw))
                .collect::<Result<Vec<_>>>()?;
            let report = engine.sync_domains(&names).await;
            print_report(&report, json, false)?;
            if !report.is_clean() {
                anyhow::bail!("{} domain(s) failed to sync", report.failures.len());
            }
            Ok(())
        }
        Commands::Show { domain } => {
            let domain = engine.show(&parse_name(&domain)?).await?;
            print_domain(&domain, json)
        }
        Commands::List { stale, status } => {
            let filter = DomainFilter {
                status: status.as_deref().map(DomainStatus::parse),
                stale_only: stale,
            };
            let domains = engine.list(&filter).await?;
            print_domain_list(&domains, json)
        }
        Commands::Track { domain } => {
            let domain = engine.track_domain(&parse_name(&domain)?).await?;
            print_domain(&domain, json)
        }
        Commands::Glue { command } => match command {
            GlueCommand::Add { domain, host, ips } => {
                let outcome = engine
                    .add_glue(&parse_name(&domain)?, &parse_name(&host)?, &ips)
                    .await?;
                print_outcomes(&[outcome], json)
            }
            GlueCommand::Remove { domain, host } => {
                let outcome = engine
                    .remove_glue(&parse_name(&domain)?, &parse_name(&host)?)
                    .await?;
                print_outcomes(&[outcome], json)
            }
            GlueCommand::Prune { domain } => {
                let removed = engine.prune_stale_glue(&parse_name(&domain)?).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&removed)?);
                } else if removed.is_empty() {
                    println!("No stale glue records");
                } else {
                    for host in &removed {
                        println!("pruned {}", host);
                    }
                }
                Ok(())
            }
        },
        Commands::Nameservers {
            domain,
            nameservers,
        } => {
            let nameservers = nameservers
                .iter()
                .map(|ns| parse_name(ns))
                .collect::<Result<Vec<_>>>()?;
            let outcome = engine
                .set_nameservers(&parse_name(&domain)?, &nameservers)
                .await?;
            print_outcomes(&[outcome], json)
        }
    }
}

fn parse_name(raw: &str) -> Result<DomainName> {
    DomainName::parse(raw).with_context(|| format!("Invalid domain name '{}'", raw))
}

fn log_event(event: &SyncEvent) {
    match event {
        SyncEvent::Started { domains_count } => debug!("sync started: {} domain(s)", domains_count),
        SyncEvent::DomainSynced {
            domain,
            action,
            drift_count,
        } => debug!("{}: {} ({} drift)", domain, action, drift_count),
        SyncEvent::DriftDetected { domain, drift } => debug!("{}: drift {}", domain, drift),
        SyncEvent::DomainFailed {
            domain,
            error,
            retry_count,
        } => debug!("{}: failed after {} retries: {}", domain, retry_count, error),
        SyncEvent::Finished { synced, failed } => {
            debug!("sync finished: {} synced, {} failed", synced, failed)
        }
    }
}

fn print_outcomes(outcomes: &[DomainSyncOutcome], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcomes)?);
        return Ok(());
    }

    for outcome in outcomes {
        print_outcome(outcome);
    }
    Ok(())
}

fn print_outcome(outcome: &DomainSyncOutcome) {
    println!(
        "{}: {} ({} drift)",
        outcome.domain,
        outcome.action,
        outcome.drift.len()
    );
    for drift in &outcome.drift {
        println!("  - {}", drift);
    }
}

fn print_report(report: &SyncReport, json: bool, drift_only: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for outcome in report
        .outcomes
        .iter()
        .filter(|o| !drift_only || !o.drift.is_empty())
    {
        print_outcome(outcome);
    }
    for failure in &report.failures {
        println!("{}: FAILED ({})", failure.domain, failure.error);
    }
    println!("{}", report.summary());
    Ok(())
}

/// JSON view of a cached domain with the auth code masked
fn domain_json(domain: &Domain) -> Result<serde_json::Value> {
    let mut value = serde_json::to_value(domain)?;
    value["auth_code"] = serde_json::to_value(domain.masked_auth_code())?;
    Ok(value)
}

fn print_domain(domain: &Domain, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&domain_json(domain)?)?);
        return Ok(());
    }

    println!("Domain:      {}", domain.name);
    println!("Status:      {}", domain.status.as_str());
    println!("Expires:     {}", format_date(domain.expires_at));
    println!("Auth code:   {}", domain.masked_auth_code().unwrap_or_else(|| "-".to_string()));
    println!("Synced:      {}", format_date(domain.synced_at));

    println!("Nameservers:");
    for ns in &domain.nameservers {
        println!("  {}", ns);
    }

    if !domain.glue_records.is_empty() {
        println!("Glue records:");
        for glue in &domain.glue_records {
            let ips: Vec<String> = glue.ips.iter().map(|ip| ip.to_string()).collect();
            let marker = if glue.stale {
                format!(" [stale since {}]", format_date(glue.stale_since))
            } else {
                String::new()
            };
            println!("  {} -> {}{}", glue.hostname, ips.join(", "), marker);
        }
    }

    if !domain.metadata.is_empty() {
        println!("Metadata:");
        for (key, value) in &domain.metadata {
            println!("  {} = {}", key, value);
        }
    }
    Ok(())
}

fn print_domain_list(domains: &[Domain], json: bool) -> Result<()> {
    if json {
        let values = domains
            .iter()
            .map(domain_json)
            .collect::<Result<Vec<_>>>()?;
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    for domain in domains {
        let stale = domain.stale_glue().count();
        println!(
            "{:<40} {:<16} {:<10}{}",
            domain.name,
            domain.status.as_str(),
            domain
                .expires_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
            if stale > 0 {
                format!(" {} stale glue", stale)
            } else {
                String::new()
            }
        );
    }
    println!("{} domain(s)", domains.len());
    Ok(())
}

fn format_date(date: Option<chrono::DateTime<chrono::Utc>>) -> String {
    date.map(|d| d.to_rfc3339())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const CREDENTIALS: [(&str, &str); 2] = [
        ("NETSERVA_SW_RESELLER_ID", "1234"),
        ("NETSERVA_SW_API_KEY", "key"),
    ];

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_glue_add() {
        let cli = Cli::try_parse_from([
            "nssync",
            "--json",
            "glue",
            "add",
            "example.com.au",
            "ns1.example.com.au",
            "203.0.113.10",
            "2001:db8::10",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Glue {
                command: GlueCommand::Add { ips, .. },
            } => assert_eq!(ips.len(), 2),
            _ => panic!("expected glue add"),
        }
    }

    #[test]
    fn test_cli_rejects_all_with_domains() {
        assert!(Cli::try_parse_from(["nssync", "sync", "--all", "example.com.au"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&CREDENTIALS).unwrap();
        config.validate().unwrap();
        assert_eq!(config.cache_type, "file");
        assert_eq!(config.log_level, "warn");
        assert!(!config.dry_run);

        let sync = config.sync_config(false);
        assert!(matches!(sync.cache, CacheConfig::File { .. }));
        assert!(!sync.sync.dry_run);
        assert!(sync.validate().is_ok());
    }

    #[test]
    fn test_missing_credentials() {
        let config = config_from(&[]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_engine_overrides() {
        let mut vars = CREDENTIALS.to_vec();
        vars.extend([
            ("NETSERVA_CACHE_TYPE", "memory"),
            ("NETSERVA_MAX_RETRIES", "0"),
            ("NETSERVA_BULK_DELAY_MS", "1000"),
            ("NETSERVA_STALE_GLUE", "purge"),
            ("NETSERVA_INCLUDE_CANCELLED", "yes"),
            ("NETSERVA_MODE", "DRY-RUN"),
        ]);
        let config = config_from(&vars).unwrap();
        config.validate().unwrap();

        let sync = config.sync_config(false);
        assert!(matches!(sync.cache, CacheConfig::Memory));
        assert_eq!(sync.sync.max_retries, 0);
        assert_eq!(sync.sync.bulk_delay_ms, 1000);
        assert_eq!(sync.sync.stale_glue, StaleGluePolicy::Purge);
        assert!(sync.sync.include_cancelled);
        assert!(sync.sync.dry_run);
    }

    #[test]
    fn test_range_validation() {
        let mut vars = CREDENTIALS.to_vec();
        vars.push(("NETSERVA_MAX_RETRIES", "11"));
        assert!(config_from(&vars).unwrap().validate().is_err());

        let mut vars = CREDENTIALS.to_vec();
        vars.push(("NETSERVA_RETRY_DELAY_SECS", "301"));
        assert!(config_from(&vars).unwrap().validate().is_err());

        let mut vars = CREDENTIALS.to_vec();
        vars.push(("NETSERVA_MAX_RETRIES", "three"));
        assert!(config_from(&vars).is_err());

        let mut vars = CREDENTIALS.to_vec();
        vars.push(("NETSERVA_CACHE_TYPE", "redis"));
        assert!(config_from(&vars).unwrap().validate().is_err());

        let mut vars = CREDENTIALS.to_vec();
        vars.push(("NETSERVA_LOG_LEVEL", "loud"));
        assert!(config_from(&vars).unwrap().validate().is_err());

        let mut vars = CREDENTIALS.to_vec();
        vars.push(("NETSERVA_STALE_GLUE", "delete"));
        assert!(config_from(&vars).is_err());
    }

    #[test]
    fn test_cli_dry_run_flag() {
        let config = config_from(&CREDENTIALS).unwrap();
        assert!(config.sync_config(true).sync.dry_run);
    }

    #[tokio::test]
    async fn test_unreadable_cache_is_runtime_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the cache file should be
        let cache_path = dir.path().to_string_lossy().to_string();

        let mut vars = CREDENTIALS.to_vec();
        vars.push(("NETSERVA_CACHE_PATH", cache_path.as_str()));
        let config = config_from(&vars).unwrap();
        let cli = Cli::try_parse_from(["nssync", "list"]).unwrap();

        assert_eq!(run(cli, config).await, NssyncExitCode::RuntimeError);
    }

    #[tokio::test]
    async fn test_invalid_domain_is_command_error() {
        let mut vars = CREDENTIALS.to_vec();
        vars.push(("NETSERVA_CACHE_TYPE", "memory"));
        let config = config_from(&vars).unwrap();
        let cli =
            Cli::try_parse_from(["nssync", "sync", "example.com.au", "not a domain"]).unwrap();

        assert_eq!(run(cli, config).await, NssyncExitCode::CommandError);
    }

    #[test]
    fn test_domain_json_masks_auth_code() {
        let mut domain = Domain::pending(parse_name("example.com.au").unwrap(), chrono::Utc::now());
        domain.auth_code = Some("abcdef123456".to_string());

        let value = domain_json(&domain).unwrap();
        assert_eq!(value["auth_code"], "********3456");
        assert!(!value.to_string().contains("abcdef"));
    }
}
