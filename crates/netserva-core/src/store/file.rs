// # File Domain Store
//
// File-based implementation of DomainStore with crash recovery.
//
// ## Crash Recovery
//
// - Atomic writes: write-then-rename
// - Corruption detection: JSON validation on load
// - Automatic backup: keeps `.backup` of the last known good cache
// - Recovery: falls back to the backup if the main file is corrupted
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "domains": {
//     "example.com.au": {
//       "name": "example.com.au",
//       "status": "active",
//       "expires_at": "2027-03-01T00:00:00Z",
//       "nameservers": ["ns1.example.com.au", "ns2.example.com.au"],
//       "glue_records": [{ "hostname": "ns1.example.com.au", "ips": ["203.0.113.10"], "stale": false }],
//       "metadata": {},
//       "created_at": "2026-01-09T12:00:00Z",
//       "synced_at": "2026-10-19T08:00:00Z"
//     }
//   }
// }
// ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::config::CacheConfig;
use crate::model::{Domain, DomainName};
use crate::traits::{DomainStore, DomainStoreFactory};

/// Cache file format version
const CACHE_FILE_VERSION: &str = "1.0";

/// File-based domain store with crash recovery
///
/// Every mutation is written through to disk before the call returns.
///
/// # Example
///
/// ```rust,no_run
/// use netserva_core::store::FileDomainStore;
/// use netserva_core::traits::DomainStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileDomainStore::new("/var/lib/netserva/domains.json").await?;
///     for domain in store.list().await? {
///         println!("{} {}", domain.name, domain.status);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileDomainStore {
    path: PathBuf,
    state: Arc<RwLock<FileState>>,
}

#[derive(Debug)]
struct FileState {
    domains: BTreeMap<DomainName, Domain>,
    dirty: bool,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct CacheFileFormat {
    version: String,
    domains: BTreeMap<DomainName, Domain>,
}

impl FileDomainStore {
    /// Create or load a file domain store
    ///
    /// This will:
    /// 1. Create parent directories if needed
    /// 2. Load the existing cache file
    /// 3. If it is corrupted, load the backup instead
    /// 4. If both fail to parse, start empty
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create cache directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let domains = Self::load_with_recovery(&path).await?;

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(FileState {
                domains,
                dirty: false,
            })),
        })
    }

    /// Load the cache, falling back to the backup when the main file is corrupted
    async fn load_with_recovery(path: &Path) -> Result<BTreeMap<DomainName, Domain>, Error> {
        match Self::load(path).await {
            Ok(domains) => {
                tracing::debug!("Loaded domain cache: {} domains", domains.len());
                Ok(domains)
            }
            Err(Error::Json(e)) => {
                tracing::warn!(
                    "Domain cache appears corrupted: {}. Attempting recovery from backup.",
                    e
                );

                let backup_path = Self::backup_path(path);
                if !backup_path.exists() {
                    tracing::warn!("No backup file found. Starting with empty cache.");
                    return Ok(BTreeMap::new());
                }

                match Self::load(&backup_path).await {
                    Ok(domains) => {
                        tracing::info!("Recovered domain cache from backup: {} domains", domains.len());
                        if let Err(restore_err) = fs::copy(&backup_path, path).await {
                            tracing::error!(
                                "Failed to restore cache file from backup: {}",
                                restore_err
                            );
                        }
                        Ok(domains)
                    }
                    Err(backup_err) => {
                        tracing::error!(
                            "Backup also unreadable: {}. Starting with empty cache.",
                            backup_err
                        );
                        Ok(BTreeMap::new())
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn load(path: &Path) -> Result<BTreeMap<DomainName, Domain>, Error> {
        if !path.exists() {
            tracing::debug!("Cache file does not exist: {}", path.display());
            return Ok(BTreeMap::new());
        }

        let content = fs::read(path).await.map_err(|e| {
            Error::store(format!("Failed to read cache file {}: {}", path.display(), e))
        })?;

        // Bytes that are not valid UTF-8 surface as a JSON error and take the recovery path.
        let file: CacheFileFormat = serde_json::from_slice(&content)?;

        if file.version != CACHE_FILE_VERSION {
            tracing::warn!(
                "Cache file version mismatch: expected {}, got {}. Attempting to load anyway.",
                CACHE_FILE_VERSION,
                file.version
            );
        }

        Ok(file.domains)
    }

    /// Write the cache to disk atomically
    async fn write(&self) -> Result<(), Error> {
        let mut state = self.state.write().await;

        let file = CacheFileFormat {
            version: CACHE_FILE_VERSION.to_string(),
            domains: state.domains.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| Error::store(format!("Failed to serialize domain cache: {}", e)))?;

        let temp_path = self.temp_path();
        {
            let mut tmp = fs::File::create(&temp_path).await.map_err(|e| {
                Error::store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            tmp.write_all(json.as_bytes()).await.map_err(|e| {
                Error::store(format!(
                    "Failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            tmp.flush().await.map_err(|e| {
                Error::store(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        if self.path.exists()
            && let Err(e) = fs::copy(&self.path, Self::backup_path(&self.path)).await
        {
            tracing::warn!("Failed to create cache backup: {}", e);
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        state.dirty = false;
        tracing::trace!("Domain cache written: {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }

    /// Path of the cache file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DomainStore for FileDomainStore {
    async fn get(&self, name: &DomainName) -> Result<Option<Domain>, Error> {
        Ok(self.state.read().await.domains.get(name).cloned())
    }

    async fn upsert(&self, domain: &Domain) -> Result<(), Error> {
        {
            let mut state = self.state.write().await;
            state.domains.insert(domain.name.clone(), domain.clone());
            state.dirty = true;
        }
        self.write().await
    }

    async fn remove(&self, name: &DomainName) -> Result<bool, Error> {
        let removed = {
            let mut state = self.state.write().await;
            let removed = state.domains.remove(name).is_some();
            state.dirty |= removed;
            removed
        };
        if removed {
            self.write().await?;
        }
        Ok(removed)
    }

    async fn list(&self) -> Result<Vec<Domain>, Error> {
        Ok(self.state.read().await.domains.values().cloned().collect())
    }

    async fn flush(&self) -> Result<(), Error> {
        // Only a write that failed earlier leaves the store dirty
        let dirty = self.state.read().await.dirty;
        if dirty {
            self.write().await
        } else {
            Ok(())
        }
    }
}

/// Factory for the `file` cache type
pub struct FileDomainStoreFactory;

#[async_trait]
impl DomainStoreFactory for FileDomainStoreFactory {
    async fn create(&self, config: &CacheConfig) -> Result<Box<dyn DomainStore>, Error> {
        match config {
            CacheConfig::File { path } => Ok(Box::new(FileDomainStore::new(path).await?)),
            _ => Err(Error::config("Invalid config for file domain store")),
        }
    }
}
