use std::collections::BTreeMap;
use std::sync::RwLock;

use super::r#trait::{ArchiveError, ArchiveStore};

/// In-memory archive.
///
/// Intended for tests/dev. The write lock plays the role of the single
/// writer transaction.
#[derive(Debug, Default)]
pub struct InMemoryArchive {
    records: RwLock<BTreeMap<i64, Vec<u8>>>,
}

impl InMemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArchiveStore for InMemoryArchive {
    fn append(&self, key: i64, payload: &[u8]) -> Result<(), ArchiveError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| ArchiveError::storage("lock poisoned"))?;

        if records.contains_key(&key) {
            return Err(ArchiveError::DuplicateKey(key));
        }
        records.insert(key, payload.to_vec());
        Ok(())
    }

    fn get(&self, key: i64) -> Result<Vec<u8>, ArchiveError> {
        let records = self
            .records
            .read()
            .map_err(|_| ArchiveError::storage("lock poisoned"))?;

        records.get(&key).cloned().ok_or(ArchiveError::NotFound(key))
    }

    fn range(&self, from: Option<i64>, limit: usize) -> Result<Vec<(i64, Vec<u8>)>, ArchiveError> {
        let records = self
            .records
            .read()
            .map_err(|_| ArchiveError::storage("lock poisoned"))?;

        Ok(records
            .range(from.unwrap_or(i64::MIN)..)
            .take(limit)
            .map(|(k, v)| (*k, v.clone()))
            .collect())
    }
}
