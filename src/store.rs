use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::entry::{self, Entry};
use crate::error::StoreError;

/// Where entries are persisted. Both backends hand out complete snapshots
/// and only ever append.
pub enum Store {
    /// A JSON array on disk, rewritten on every append.
    Json { path: PathBuf },
    /// A sled tree keyed by monotonically increasing ids.
    Sled { db: sled::Db, path: PathBuf },
}

impl Store {
    pub fn json<P: AsRef<Path>>(path: P) -> Store {
        Store::Json {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn open_sled<P: AsRef<Path>>(path: P) -> Result<Store, StoreError> {
        let path = path.as_ref().to_path_buf();
        let db = sled::open(&path)?;
        Ok(Store::Sled { db, path })
    }

    pub fn describe(&self) -> String {
        match self {
            Store::Json { path } => format!("json:{}", path.display()),
            Store::Sled { path, .. } => format!("sled:{}", path.display()),
        }
    }

    /// Reads every stored entry. A JSON file that does not exist yet is an
    /// empty snapshot.
    pub async fn load(&self) -> Result<Vec<Entry>, StoreError> {
        let entries = match self {
            Store::Json { path } => load_json(path).await?,
            Store::Sled { db, path } => {
                let db = db.clone();
                let path = path.display().to_string();
                tokio::task::spawn_blocking(move || load_sled(&db, &path)).await??
            }
        };
        info!("Loaded {} entries from {}", entries.len(), self.describe());
        Ok(entries)
    }

    pub async fn append(&self, entry: &Entry) -> Result<(), StoreError> {
        match self {
            Store::Json { path } => {
                // rewrite the records as found, including ones that do not decode
                let mut records = load_records(path).await?;
                records.push(serde_json::to_value(entry).map_err(|source| StoreError::Malformed {
                    path: path.display().to_string(),
                    source,
                })?);
                write_records(path, &records).await?;
            }
            Store::Sled { db, path } => {
                let value = serde_json::to_vec(entry).map_err(|source| StoreError::Malformed {
                    path: path.display().to_string(),
                    source,
                })?;
                let id = db.generate_id()?;
                db.insert(id.to_be_bytes(), value)?;
                // block until the entry is stable on disk
                db.flush_async().await?;
            }
        }
        debug!("Appended entry for '{}' to {}", entry.get_fund_name(), self.describe());
        Ok(())
    }
}

async fn load_json(path: &Path) -> Result<Vec<Entry>, StoreError> {
    Ok(entry::from_records(load_records(path).await?))
}

async fn load_records(path: &Path) -> Result<Vec<serde_json::Value>, StoreError> {
    let data = match tokio::fs::read_to_string(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    entry::records_from_string(&data).map_err(|source| StoreError::Malformed {
        path: path.display().to_string(),
        source,
    })
}

/// Writes the whole snapshot to a sibling temp file first so a failed write
/// never leaves a truncated data file behind.
pub async fn write_json(path: &Path, entries: &[Entry]) -> Result<(), StoreError> {
    let json = entry::to_string(entries).map_err(|source| StoreError::Malformed {
        path: path.display().to_string(),
        source,
    })?;
    write_atomic(path, json).await
}

async fn write_records(path: &Path, records: &[serde_json::Value]) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(records).map_err(|source| StoreError::Malformed {
        path: path.display().to_string(),
        source,
    })?;
    write_atomic(path, json).await
}

async fn write_atomic(path: &Path, json: String) -> Result<(), StoreError> {
    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.display().to_string(),
        source,
    };
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, json).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
    Ok(())
}

fn load_sled(db: &sled::Db, path: &str) -> Result<Vec<Entry>, StoreError> {
    let mut entries = Vec::new();
    for item in db.iter() {
        let (key, value) = item?;
        match entry::from_record(&value) {
            Some(entry) => entries.push(entry),
            None => debug!("Skipped record {key:?} in {path}"),
        }
    }
    Ok(entries)
}
