/// Persistence for the most recent claim result.
///
/// The confirmation screen must survive a reload, so a successful claim
/// writes the prize name and photo reference as two independent string
/// entries. Only the latest result is ever kept; "return home" wipes it.
///
/// Storage sits behind `ResultRepository` so callers can swap the RocksDB
/// backed store for an in-memory map.
use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use log::{debug, info};
use rocksdb::{Options, DB};

use crate::error::StoreError;
use crate::model::ClaimResult;

pub const PRIZE_NAME_KEY: &str = "prizeName";
pub const PHOTO_URL_KEY: &str = "photoUrl";

/// String key/value storage for claim results.
pub trait ResultRepository: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<R: ResultRepository + ?Sized> ResultRepository for Arc<R> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Process-local repository. Nothing survives a restart.
#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultRepository for MemoryRepository {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// RocksDB-backed repository rooted at a directory on disk.
pub struct RocksRepository {
    pub inner: Arc<DB>,
}

impl RocksRepository {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path.as_ref())?;
        Ok(Self {
            inner: Arc::new(db),
        })
    }
}

impl ResultRepository for RocksRepository {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.inner.get(key.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| StoreError::Encoding {
                    key: key.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.put(key.as_bytes(), value.as_bytes())?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.delete(key.as_bytes())?;
        Ok(())
    }
}

/// Whatever the last successful claim left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredResult {
    pub prize_name: Option<String>,
    pub photo_url: Option<String>,
}

/// Typed view of a `ResultRepository` using the fixed result keys.
#[derive(Debug, Clone)]
pub struct ResultStore<R> {
    repository: R,
}

impl<R: ResultRepository> ResultStore<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Overwrites the stored result. A result without a photo drops any
    /// photo left over from an earlier claim.
    pub fn save(&self, result: &ClaimResult) -> Result<(), StoreError> {
        self.repository.set(PRIZE_NAME_KEY, &result.prize_name)?;
        match result.photo_url.as_deref() {
            Some(url) => self.repository.set(PHOTO_URL_KEY, url)?,
            None => self.repository.remove(PHOTO_URL_KEY)?,
        }
        info!("Persisted prize {:?}", result.prize_name);
        Ok(())
    }

    pub fn load(&self) -> Result<StoredResult, StoreError> {
        let prize_name = self.repository.get(PRIZE_NAME_KEY)?.filter(|v| !v.is_empty());
        let photo_url = self.repository.get(PHOTO_URL_KEY)?.filter(|v| !v.is_empty());
        debug!("Loaded stored result, prize present: {}", prize_name.is_some());
        Ok(StoredResult {
            prize_name,
            photo_url,
        })
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.repository.remove(PRIZE_NAME_KEY)?;
        self.repository.remove(PHOTO_URL_KEY)?;
        info!("Cleared stored claim result");
        Ok(())
    }
}
