//! redb-backed archive (production).
//!
//! Records live in the `mdm.Checkin.ARCHIVE` table, keyed by event timestamp
//! in nanoseconds. redb runs one write transaction at a time, which gives the
//! single-writer discipline appends rely on.

use std::path::Path;

use redb::backends::InMemoryBackend;
use redb::{Database, ReadableTable, TableDefinition, TableError, TableHandle};

use super::r#trait::{ArchiveError, ArchiveStore};

/// Table (bucket) holding archived check-in events.
pub const ARCHIVE_TABLE: &str = "mdm.Checkin.ARCHIVE";

const ARCHIVE: TableDefinition<i64, &[u8]> = TableDefinition::new(ARCHIVE_TABLE);

pub struct RedbArchive {
    db: Database,
}

impl core::fmt::Debug for RedbArchive {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RedbArchive")
            .field("table", &ARCHIVE_TABLE)
            .finish_non_exhaustive()
    }
}

impl RedbArchive {
    /// Open (or create) the database file at `path` and make sure the archive
    /// table exists. Callers treat an error here as fatal.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref();
        let db = Database::create(path).map_err(ArchiveError::storage)?;
        let archive = Self::from_database(db);
        archive.ensure_bucket()?;
        tracing::info!(path = %path.display(), table = ARCHIVE_TABLE, "archive opened");
        Ok(archive)
    }

    /// Non-persistent archive, for tests/dev.
    pub fn in_memory() -> Result<Self, ArchiveError> {
        let db = Database::builder()
            .create_with_backend(InMemoryBackend::new())
            .map_err(ArchiveError::storage)?;
        let archive = Self::from_database(db);
        archive.ensure_bucket()?;
        Ok(archive)
    }

    /// Wrap an already opened database. The archive table is *not* created;
    /// call [`RedbArchive::ensure_bucket`] first.
    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    /// Create the archive table if it does not exist. Idempotent.
    pub fn ensure_bucket(&self) -> Result<(), ArchiveError> {
        let txn = self.db.begin_write().map_err(ArchiveError::storage)?;
        txn.open_table(ARCHIVE).map_err(ArchiveError::storage)?;
        txn.commit().map_err(ArchiveError::storage)
    }
}

impl ArchiveStore for RedbArchive {
    fn append(&self, key: i64, payload: &[u8]) -> Result<(), ArchiveError> {
        let txn = self.db.begin_write().map_err(ArchiveError::storage)?;

        // `open_table` on a write transaction would create the table.
        let has_bucket = txn
            .list_tables()
            .map_err(ArchiveError::storage)?
            .any(|table| table.name() == ARCHIVE_TABLE);
        if !has_bucket {
            txn.abort().map_err(ArchiveError::storage)?;
            return Err(ArchiveError::BucketNotFound(ARCHIVE_TABLE.to_string()));
        }

        let written = {
            let mut table = txn.open_table(ARCHIVE).map_err(ArchiveError::storage)?;
            if table.get(key).map_err(ArchiveError::storage)?.is_some() {
                Err(ArchiveError::DuplicateKey(key))
            } else {
                table
                    .insert(key, payload)
                    .map(|_| ())
                    .map_err(ArchiveError::storage)
            }
        };

        match written {
            Ok(()) => txn.commit().map_err(ArchiveError::storage),
            Err(err) => {
                txn.abort().map_err(ArchiveError::storage)?;
                Err(err)
            }
        }
    }

    fn get(&self, key: i64) -> Result<Vec<u8>, ArchiveError> {
        let txn = self.db.begin_read().map_err(ArchiveError::storage)?;
        let table = open_read_table(&txn)?;

        let value = table
            .get(key)
            .map_err(ArchiveError::storage)?
            .ok_or(ArchiveError::NotFound(key))?;
        Ok(value.value().to_vec())
    }

    fn range(&self, from: Option<i64>, limit: usize) -> Result<Vec<(i64, Vec<u8>)>, ArchiveError> {
        let txn = self.db.begin_read().map_err(ArchiveError::storage)?;
        let table = open_read_table(&txn)?;

        let mut records = Vec::new();
        for entry in table
            .range(from.unwrap_or(i64::MIN)..)
            .map_err(ArchiveError::storage)?
            .take(limit)
        {
            let (key, value) = entry.map_err(ArchiveError::storage)?;
            records.push((key.value(), value.value().to_vec()));
        }
        Ok(records)
    }
}

fn open_read_table(
    txn: &redb::ReadTransaction,
) -> Result<redb::ReadOnlyTable<i64, &'static [u8]>, ArchiveError> {
    match txn.open_table(ARCHIVE) {
        Ok(table) => Ok(table),
        Err(TableError::TableDoesNotExist(_)) => {
            Err(ArchiveError::BucketNotFound(ARCHIVE_TABLE.to_string()))
        }
        Err(err) => Err(ArchiveError::storage(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_database() -> Database {
        Database::builder()
            .create_with_backend(InMemoryBackend::new())
            .unwrap()
    }

    #[test]
    fn append_then_get() {
        let archive = RedbArchive::in_memory().unwrap();
        archive.append(1_000, b"payload").unwrap();

        assert_eq!(archive.get(1_000).unwrap(), b"payload");
        assert_eq!(archive.get(1_001), Err(ArchiveError::NotFound(1_001)));
    }

    #[test]
    fn append_without_bucket_fails_and_does_not_create_it() {
        let archive = RedbArchive::from_database(bare_database());

        assert_eq!(
            archive.append(1, b"x"),
            Err(ArchiveError::BucketNotFound(ARCHIVE_TABLE.to_string()))
        );
        // Still missing afterwards: the failed append did not create the table.
        assert_eq!(
            archive.get(1),
            Err(ArchiveError::BucketNotFound(ARCHIVE_TABLE.to_string()))
        );

        archive.ensure_bucket().unwrap();
        archive.append(1, b"x").unwrap();
        assert_eq!(archive.get(1).unwrap(), b"x");
    }

    #[test]
    fn ensure_bucket_is_idempotent() {
        let archive = RedbArchive::in_memory().unwrap();
        archive.append(5, b"kept").unwrap();

        archive.ensure_bucket().unwrap();
        archive.ensure_bucket().unwrap();
        assert_eq!(archive.get(5).unwrap(), b"kept");
    }

    #[test]
    fn duplicate_key_rolls_back() {
        let archive = RedbArchive::in_memory().unwrap();
        archive.append(9, b"first").unwrap();

        assert_eq!(archive.append(9, b"second"), Err(ArchiveError::DuplicateKey(9)));
        assert_eq!(archive.get(9).unwrap(), b"first");
    }

    #[test]
    fn range_is_ordered_by_key() {
        let archive = RedbArchive::in_memory().unwrap();
        for key in [-5_i64, 300, 20, 1, 7_000_000_000] {
            archive.append(key, key.to_string().as_bytes()).unwrap();
        }

        let keys: Vec<_> = archive.range(None, 100).unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![-5, 1, 20, 300, 7_000_000_000]);

        let page = archive.range(Some(2), 2).unwrap();
        assert_eq!(page, vec![(20, b"20".to_vec()), (300, b"300".to_vec())]);
    }

    #[test]
    fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkin.redb");

        {
            let archive = RedbArchive::open(&path).unwrap();
            archive.append(42, b"durable").unwrap();
        }

        let reopened = RedbArchive::open(&path).unwrap();
        assert_eq!(reopened.get(42).unwrap(), b"durable");
    }
}
