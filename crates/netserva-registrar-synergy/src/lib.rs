// # Synergy Wholesale Registrar
//
// This crate provides the Synergy Wholesale reseller API client for NetServa
// domain sync.
//
// ## Responsibilities
//
// - One HTTP request per registrar call
// - Full error propagation to the engine (the engine owns retries and pacing)
// - HTTP timeout configured (30 seconds by default)
// - HTTP status and API `ERR_*` codes mapped to typed errors
// - Dry-run mode: reads go out, mutations are only logged
//
// The client holds no state between calls and never spawns tasks.
//
// ## Security Requirements
//
// - The API key NEVER appears in logs, Debug output or error messages
// - The factory fails fast on empty credentials
//
// ## Wire Format
//
// Every command is a JSON POST:
//
// ```http
// POST {api_url}/{command}
// Content-Type: application/json
//
// { "resellerID": "1234", "apiKey": "...", "domainName": "example.com.au" }
// ```
//
// The response always carries `status` (`"OK"` or an `ERR_*` code) and, on
// failure, `errorMessage`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use netserva_core::config::RegistrarConfig;
use netserva_core::traits::{Registrar, RegistrarFactory};
use netserva_core::{
    DomainName, DomainStatus, Error, RemoteDomain, RemoteDomainSummary, RemoteHost, Result,
};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;
use std::time::Duration;

/// Synergy Wholesale API base URL
pub const SYNERGY_API_BASE: &str = "https://api.synergywholesale.com/api";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const REGISTRAR_NAME: &str = "synergy";

/// `domainInfo` fields copied verbatim into `RemoteDomain::metadata`
const METADATA_FIELDS: &[&str] = &[
    "autoRenew",
    "idProtect",
    "dnsConfigName",
    "domain_created",
    "registrant",
    "eligibilityType",
];

/// Synergy Wholesale registrar client
///
/// Stateless and single-shot. All coordination (retries, pacing,
/// reconciliation) is owned by `SyncEngine`.
///
/// # Dry-Run Mode
///
/// When `dry_run` is true the client still performs every read
/// (`listDomains`, `domainInfo`, `listAllHosts`) but only logs the payload of
/// `addHost`, `deleteHost` and `updateNameServers`.
pub struct SynergyRegistrar {
    reseller_id: String,

    /// ⚠️ NEVER log this value
    api_key: String,

    api_url: String,

    client: reqwest::Client,

    dry_run: bool,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for SynergyRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynergyRegistrar")
            .field("reseller_id", &self.reseller_id)
            .field("api_key", &"<REDACTED>")
            .field("api_url", &self.api_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl SynergyRegistrar {
    /// Create a new Synergy Wholesale client
    ///
    /// # Parameters
    ///
    /// - `reseller_id`: Numeric reseller account ID
    /// - `api_key`: Reseller API key
    /// - `api_url`: Optional API base URL (defaults to [`SYNERGY_API_BASE`])
    /// - `timeout`: Per-request timeout
    /// - `dry_run`: If true, perform reads but skip mutations
    ///
    /// # Errors
    ///
    /// Returns a config error for empty credentials, or if the HTTP client
    /// cannot be built.
    pub fn new(
        reseller_id: impl Into<String>,
        api_key: impl Into<String>,
        api_url: Option<String>,
        timeout: Duration,
        dry_run: bool,
    ) -> Result<Self> {
        let reseller_id = reseller_id.into();
        let api_key = api_key.into();

        if reseller_id.trim().is_empty() {
            return Err(Error::config("Synergy reseller ID cannot be empty"));
        }
        if api_key.is_empty() {
            return Err(Error::config("Synergy API key cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let api_url = api_url
            .unwrap_or_else(|| SYNERGY_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            reseller_id: reseller_id.trim().to_string(),
            api_key,
            api_url,
            client,
            dry_run,
        })
    }

    /// Whether mutations are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Request body: command parameters plus credentials
    fn request_body(&self, params: Value) -> Value {
        let mut body = match params {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        body.insert(
            "resellerID".to_string(),
            Value::String(self.reseller_id.clone()),
        );
        body.insert("apiKey".to_string(), Value::String(self.api_key.clone()));
        Value::Object(body)
    }

    /// Send one command and return the checked response body
    ///
    /// ```http
    /// POST {api_url}/{command}
    /// ```
    async fn call(&self, command: &str, params: Value) -> Result<Value> {
        let url = format!("{}/{}", self.api_url, command);
        tracing::debug!("Synergy request: {}", command);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&self.request_body(params))
            .send()
            .await
            .map_err(|e| Error::http(format!("{} request failed: {}", command, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(map_http_status(command, status.as_u16(), &error_text));
        }

        let json: Value = response.json().await.map_err(|e| {
            Error::provider(
                REGISTRAR_NAME,
                format!("Failed to parse {} response: {}", command, e),
            )
        })?;

        check_status(command, &json)?;
        Ok(json)
    }

    /// Mutating command: sent in live mode, logged in dry-run mode
    async fn mutate(&self, command: &str, params: Value) -> Result<()> {
        if self.dry_run {
            // Parameters only; credentials are added by `request_body`
            tracing::info!(
                "[DRY-RUN] Would send {} with payload: {}",
                command,
                params
            );
            return Ok(());
        }

        self.call(command, params).await?;
        tracing::info!("Synergy {} succeeded", command);
        Ok(())
    }
}

#[async_trait]
impl Registrar for SynergyRegistrar {
    async fn list_domains(&self) -> Result<Vec<RemoteDomainSummary>> {
        let json = self.call("listDomains", serde_json::json!({})).await?;
        let domains = parse_domain_list(&json)?;
        tracing::debug!("Synergy listed {} domain(s)", domains.len());
        Ok(domains)
    }

    async fn domain_info(&self, domain: &DomainName) -> Result<RemoteDomain> {
        let json = self
            .call(
                "domainInfo",
                serde_json::json!({ "domainName": domain.as_str() }),
            )
            .await?;
        parse_domain_info(domain, &json)
    }

    async fn list_hosts(&self, domain: &DomainName) -> Result<Vec<RemoteHost>> {
        let json = self
            .call(
                "listAllHosts",
                serde_json::json!({ "domainName": domain.as_str() }),
            )
            .await?;
        parse_hosts(domain, &json)
    }

    async fn add_host(
        &self,
        domain: &DomainName,
        hostname: &DomainName,
        ips: &[IpAddr],
    ) -> Result<()> {
        let ips: Vec<String> = ips.iter().map(|ip| ip.to_string()).collect();
        self.mutate(
            "addHost",
            serde_json::json!({
                "domainName": domain.as_str(),
                "hostName": hostname.as_str(),
                "ipAddress": ips,
            }),
        )
        .await
    }

    async fn delete_host(&self, domain: &DomainName, hostname: &DomainName) -> Result<()> {
        self.mutate(
            "deleteHost",
            serde_json::json!({
                "domainName": domain.as_str(),
                "hostName": hostname.as_str(),
            }),
        )
        .await
    }

    async fn update_nameservers(
        &self,
        domain: &DomainName,
        nameservers: &[DomainName],
    ) -> Result<()> {
        let nameservers: Vec<&str> = nameservers.iter().map(|ns| ns.as_str()).collect();
        self.mutate(
            "updateNameServers",
            serde_json::json!({
                "domainName": domain.as_str(),
                "nameServers": nameservers,
            }),
        )
        .await
    }

    fn registrar_name(&self) -> &'static str {
        REGISTRAR_NAME
    }
}

/// Map a non-2xx HTTP status to an error
fn map_http_status(command: &str, status: u16, body: &str) -> Error {
    match status {
        401 | 403 => Error::auth(format!(
            "Synergy rejected the reseller credentials. Status: {}",
            status
        )),
        404 => Error::not_found(format!("Synergy command {} returned 404", command)),
        429 => Error::rate_limited(format!(
            "Synergy rate limit exceeded. Please retry later. Status: {}",
            status
        )),
        500..=599 => Error::provider(
            REGISTRAR_NAME,
            format!("Synergy server error (transient): {} - {}", status, body),
        ),
        _ => Error::provider(
            REGISTRAR_NAME,
            format!("{} failed: {} - {}", command, status, body),
        ),
    }
}

/// Check the API-level `status` of a response
fn check_status(command: &str, json: &Value) -> Result<()> {
    let status = json["status"].as_str().ok_or_else(|| {
        Error::provider(
            REGISTRAR_NAME,
            format!("Invalid {} response: missing status", command),
        )
    })?;

    if status == "OK" || status.starts_with("OK_") {
        return Ok(());
    }

    let message = json["errorMessage"].as_str().unwrap_or(status);

    if status == "ERR_LOGIN_FAILED" {
        return Err(Error::auth(format!("Synergy login failed: {}", message)));
    }
    if status.contains("NOT_FOUND") || message.to_ascii_lowercase().contains("not found") {
        return Err(Error::not_found(message.to_string()));
    }

    Err(Error::provider(
        REGISTRAR_NAME,
        format!("{} failed: {} ({})", command, message, status),
    ))
}

/// Parse the `domainList` of a `listDomains` response
///
/// Entries with an unparseable name are skipped with a warning.
fn parse_domain_list(json: &Value) -> Result<Vec<RemoteDomainSummary>> {
    let entries = json["domainList"].as_array().ok_or_else(|| {
        Error::provider(
            REGISTRAR_NAME,
            "Invalid listDomains response: domainList is not an array",
        )
    })?;

    let mut domains = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(raw) = entry["domainName"].as_str() else {
            tracing::warn!("Skipping domain list entry without domainName");
            continue;
        };
        match DomainName::parse(raw) {
            Ok(name) => domains.push(RemoteDomainSummary {
                name,
                status: parse_status(entry),
                expires_at: entry["domain_expiry"].as_str().and_then(parse_date),
            }),
            Err(e) => tracing::warn!("Skipping domain list entry {}: {}", raw, e),
        }
    }
    Ok(domains)
}

/// Parse a `domainInfo` response
fn parse_domain_info(domain: &DomainName, json: &Value) -> Result<RemoteDomain> {
    let mut remote = RemoteDomain::new(domain.clone(), parse_status(json));
    remote.expires_at = json["domain_expiry"].as_str().and_then(parse_date);

    if let Some(nameservers) = json["nameServers"].as_array() {
        remote.nameservers = nameservers
            .iter()
            .filter_map(Value::as_str)
            .filter(|ns| !ns.trim().is_empty())
            .map(DomainName::parse)
            .collect::<Result<BTreeSet<_>>>()?;
    }

    remote.auth_code = json["domainPassword"]
        .as_str()
        .filter(|code| !code.is_empty())
        .map(str::to_string);

    remote.metadata = METADATA_FIELDS
        .iter()
        .filter_map(|&key| {
            let value = match &json[key] {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.to_string(), value))
        })
        .collect::<BTreeMap<_, _>>();

    Ok(remote)
}

/// Parse the `hosts` of a `listAllHosts` response
///
/// The API may return either a fully qualified host name or a bare label
/// below the domain; both become a fully qualified `DomainName`.
fn parse_hosts(domain: &DomainName, json: &Value) -> Result<Vec<RemoteHost>> {
    let Some(entries) = json["hosts"].as_array() else {
        // No hosts registered
        return Ok(Vec::new());
    };

    let mut hosts = Vec::with_capacity(entries.len());
    for entry in entries {
        let raw = entry["hostName"].as_str().ok_or_else(|| {
            Error::provider(REGISTRAR_NAME, "Invalid host entry: hostName is not a string")
        })?;

        let label = raw.trim().trim_end_matches('.');
        let hostname = if label.contains('.') {
            DomainName::parse(label)?
        } else {
            DomainName::parse(&format!("{}.{}", label, domain))?
        };

        let ips = entry["ip"]
            .as_array()
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_str)
            .map(|ip| {
                ip.trim().parse::<IpAddr>().map_err(|e| {
                    Error::provider(
                        REGISTRAR_NAME,
                        format!("Invalid IP {} for host {}: {}", ip, hostname, e),
                    )
                })
            })
            .collect::<Result<BTreeSet<_>>>()?;

        if ips.is_empty() {
            tracing::warn!("Skipping host {} with no IP addresses", hostname);
            continue;
        }

        hosts.push(RemoteHost { hostname, ips });
    }
    Ok(hosts)
}

fn parse_status(json: &Value) -> DomainStatus {
    json["domain_status"]
        .as_str()
        .or_else(|| json["status_text"].as_str())
        .map(DomainStatus::parse)
        .unwrap_or_else(|| DomainStatus::Other("unknown".to_string()))
}

/// Parse a registry date: `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD` or RFC 3339, in UTC
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Factory for creating Synergy Wholesale registrars
pub struct SynergyFactory;

impl RegistrarFactory for SynergyFactory {
    fn create(&self, config: &RegistrarConfig) -> Result<Box<dyn Registrar>> {
        match config {
            RegistrarConfig::Synergy {
                reseller_id,
                api_key,
                api_url,
                timeout_secs,
            } => {
                config.validate()?;

                // Check for dry-run mode environment variable
                let dry_run = std::env::var("NETSERVA_MODE")
                    .unwrap_or_default()
                    .eq_ignore_ascii_case("dry-run");

                if dry_run {
                    tracing::warn!(
                        "Synergy registrar running in DRY-RUN mode - no changes will be made"
                    );
                }

                let timeout = timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_HTTP_TIMEOUT);

                Ok(Box::new(SynergyRegistrar::new(
                    reseller_id.clone(),
                    api_key.clone(),
                    api_url.clone(),
                    timeout,
                    dry_run,
                )?))
            }
            _ => Err(Error::config("Invalid config for Synergy registrar")),
        }
    }
}

/// Register the Synergy registrar with a registry
///
/// # Example
///
/// ```rust
/// use netserva_core::RegistrarRegistry;
///
/// let registry = RegistrarRegistry::with_builtin_stores();
/// netserva_registrar_synergy::register(&registry);
/// assert!(registry.has_registrar("synergy"));
/// ```
pub fn register(registry: &netserva_core::RegistrarRegistry) {
    registry.register_registrar(REGISTRAR_NAME, Box::new(SynergyFactory));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    fn name(s: &str) -> DomainName {
        DomainName::parse(s).unwrap()
    }

    fn registrar(dry_run: bool) -> SynergyRegistrar {
        SynergyRegistrar::new("1234", "secret_key_12345", None, DEFAULT_HTTP_TIMEOUT, dry_run)
            .unwrap()
    }

    fn synergy_config(api_key: &str) -> RegistrarConfig {
        RegistrarConfig::Synergy {
            reseller_id: "1234".to_string(),
            api_key: api_key.to_string(),
            api_url: None,
            timeout_secs: None,
        }
    }

    #[test]
    fn test_factory_creation() {
        let registrar = SynergyFactory.create(&synergy_config("key")).unwrap();
        assert_eq!(registrar.registrar_name(), "synergy");
    }

    #[test]
    fn test_factory_missing_key() {
        assert!(SynergyFactory.create(&synergy_config("")).is_err());
    }

    #[test]
    fn test_factory_rejects_other_config() {
        let config = RegistrarConfig::Custom {
            factory: "other".to_string(),
            config: json!({}),
        };
        let err = SynergyFactory.create(&config).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_empty_credentials_are_errors() {
        assert!(SynergyRegistrar::new("", "key", None, DEFAULT_HTTP_TIMEOUT, false).is_err());
        assert!(SynergyRegistrar::new("1234", "", None, DEFAULT_HTTP_TIMEOUT, false).is_err());
    }

    #[test]
    fn test_register() {
        let registry = netserva_core::RegistrarRegistry::new();
        register(&registry);
        assert_eq!(registry.list_registrars(), vec!["synergy".to_string()]);
    }

    #[test]
    fn test_api_key_not_exposed_in_debug() {
        let debug_str = format!("{:?}", registrar(false));
        assert!(!debug_str.contains("secret_key_12345"));
        assert!(debug_str.contains("SynergyRegistrar"));
        assert!(debug_str.contains("1234"));
    }

    #[test]
    fn test_api_url_override_trims_slash() {
        let registrar = SynergyRegistrar::new(
            "1234",
            "key",
            Some("https://sandbox.example.test/api/".to_string()),
            DEFAULT_HTTP_TIMEOUT,
            false,
        )
        .unwrap();
        assert_eq!(registrar.api_url, "https://sandbox.example.test/api");
        assert_eq!(registrar.registrar_name(), "synergy");
    }

    #[test]
    fn test_request_body_carries_credentials() {
        let body = registrar(false).request_body(json!({ "domainName": "example.com.au" }));
        assert_eq!(body["resellerID"], "1234");
        assert_eq!(body["apiKey"], "secret_key_12345");
        assert_eq!(body["domainName"], "example.com.au");
    }

    #[tokio::test]
    async fn test_dry_run_mutations_send_nothing() {
        // Unroutable URL: any real request would fail
        let registrar = SynergyRegistrar::new(
            "1234",
            "key",
            Some("http://127.0.0.1:9".to_string()),
            Duration::from_millis(50),
            true,
        )
        .unwrap();
        assert!(registrar.is_dry_run());

        let domain = name("example.com.au");
        registrar
            .add_host(&domain, &name("ns1.example.com.au"), &["203.0.113.10".parse().unwrap()])
            .await
            .unwrap();
        registrar
            .delete_host(&domain, &name("ns1.example.com.au"))
            .await
            .unwrap();
        registrar
            .update_nameservers(&domain, &[name("ns1.hosting.net"), name("ns2.hosting.net")])
            .await
            .unwrap();
    }

    #[test]
    fn test_http_status_mapping() {
        assert!(matches!(
            map_http_status("domainInfo", 401, ""),
            Error::Authentication(_)
        ));
        assert!(matches!(
            map_http_status("domainInfo", 403, ""),
            Error::Authentication(_)
        ));
        assert!(map_http_status("domainInfo", 404, "").is_not_found());
        assert!(matches!(
            map_http_status("domainInfo", 429, ""),
            Error::RateLimited(_)
        ));

        let err = map_http_status("domainInfo", 503, "maintenance");
        assert!(matches!(err, Error::Provider { .. }));
        assert!(!err.is_permanent());
    }

    #[test]
    fn test_api_status_mapping() {
        assert!(check_status("listDomains", &json!({ "status": "OK" })).is_ok());
        assert!(check_status("addHost", &json!({ "status": "OK_HOST_ADDED" })).is_ok());

        let err = check_status(
            "domainInfo",
            &json!({ "status": "ERR_LOGIN_FAILED", "errorMessage": "Unable to login" }),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));

        let err = check_status(
            "domainInfo",
            &json!({ "status": "ERR_DOMAININFO_FAILED", "errorMessage": "Domain Not Found" }),
        )
        .unwrap_err();
        assert!(err.is_not_found());

        let err = check_status("deleteHost", &json!({ "status": "ERR_HOST_NOT_FOUND" })).unwrap_err();
        assert!(err.is_not_found());

        let err = check_status(
            "addHost",
            &json!({ "status": "ERR_ADDHOST_FAILED", "errorMessage": "Invalid IP" }),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Provider { .. }));
        assert!(err.to_string().contains("Invalid IP"));

        assert!(check_status("listDomains", &json!({})).is_err());
    }

    #[test]
    fn test_parse_domain_list() {
        let json = json!({
            "status": "OK",
            "domainList": [
                { "domainName": "example.com.au", "domain_status": "ok", "domain_expiry": "2027-03-01 10:00:00" },
                { "domainName": "Other.NET.au", "domain_status": "Transferred Away" },
                { "domainName": "not a domain", "domain_status": "ok" },
                { "domain_status": "ok" }
            ]
        });

        let domains = parse_domain_list(&json).unwrap();
        assert_eq!(domains.len(), 2);
        assert_eq!(domains[0].name, name("example.com.au"));
        assert_eq!(domains[0].status, DomainStatus::Active);
        assert_eq!(domains[0].expires_at.unwrap().year(), 2027);
        assert_eq!(domains[1].name, name("other.net.au"));
        assert_eq!(domains[1].status, DomainStatus::TransferredAway);
        assert!(domains[1].expires_at.is_none());

        assert!(parse_domain_list(&json!({ "status": "OK" })).is_err());
    }

    #[test]
    fn test_parse_domain_info() {
        let json = json!({
            "status": "OK",
            "domainName": "example.com.au",
            "domain_status": "ok",
            "domain_expiry": "2027-03-01",
            "nameServers": ["NS1.example.com.au", "ns2.example.com.au.", ""],
            "domainPassword": "s3cret-code",
            "autoRenew": true,
            "idProtect": "Disabled"
        });

        let remote = parse_domain_info(&name("example.com.au"), &json).unwrap();
        assert_eq!(remote.status, DomainStatus::Active);
        assert_eq!(remote.nameservers.len(), 2);
        assert!(remote.nameservers.contains(&name("ns1.example.com.au")));
        assert_eq!(remote.auth_code.as_deref(), Some("s3cret-code"));
        assert_eq!(remote.metadata.get("autoRenew").map(String::as_str), Some("true"));
        assert_eq!(remote.metadata.get("idProtect").map(String::as_str), Some("Disabled"));
        assert!(!remote.metadata.contains_key("dnsConfigName"));

        let expiry = remote.expires_at.unwrap();
        assert_eq!((expiry.month(), expiry.day(), expiry.hour()), (3, 1, 0));
    }

    #[test]
    fn test_parse_domain_info_without_password() {
        let json = json!({ "status": "OK", "domain_status": "ok", "domainPassword": "" });
        let remote = parse_domain_info(&name("example.com.au"), &json).unwrap();
        assert!(remote.auth_code.is_none());
        assert!(remote.nameservers.is_empty());
    }

    #[test]
    fn test_parse_hosts() {
        let json = json!({
            "status": "OK",
            "hosts": [
                { "hostName": "ns1.example.com.au", "ip": ["203.0.113.10", "2001:db8::10"] },
                { "hostName": "ns2", "ip": ["203.0.113.11"] }
            ]
        });

        let hosts = parse_hosts(&name("example.com.au"), &json).unwrap();
        assert_eq!(hosts.len(), 2);
        assert_eq!(hosts[0].ips.len(), 2);
        assert_eq!(hosts[1].hostname, name("ns2.example.com.au"));

        let none = parse_hosts(&name("example.com.au"), &json!({ "status": "OK" })).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_parse_hosts_rejects_bad_ip() {
        let json = json!({
            "status": "OK",
            "hosts": [ { "hostName": "ns1", "ip": ["300.1.1.1"] } ]
        });
        assert!(parse_hosts(&name("example.com.au"), &json).is_err());
    }

    #[test]
    fn test_parse_hosts_skips_hosts_without_ips() {
        let json = json!({
            "status": "OK",
            "hosts": [
                { "hostName": "ns1", "ip": [] },
                { "hostName": "ns2" },
                { "hostName": "ns3", "ip": ["203.0.113.12"] }
            ]
        });

        let hosts = parse_hosts(&name("example.com.au"), &json).unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].hostname, name("ns3.example.com.au"));
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("2027-03-01T10:00:00Z").is_some());
        assert!(parse_date("2027-03-01T10:00:00+10:00").is_some());
        assert!(parse_date("2027-03-01 10:00:00").is_some());
        assert!(parse_date("2027-03-01").is_some());
        assert!(parse_date("March 2027").is_none());
    }
}
