use std::sync::Arc;

use thiserror::Error;

/// Archive store operation error.
///
/// ## Error Categories
///
/// - **BucketNotFound**: the storage namespace was never initialised
/// - **DuplicateKey**: a record already exists under the key (records are never overwritten)
/// - **NotFound**: point lookup of an absent key
/// - **Corrupt**: a stored record could not be decoded during replay
/// - **Storage**: the underlying transaction failed (nothing was written)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    #[error("bucket {0:?} not found")]
    BucketNotFound(String),

    #[error("key {0} already archived")]
    DuplicateKey(i64),

    #[error("no record under key {0}")]
    NotFound(i64),

    #[error("record under key {key} is corrupt: {reason}")]
    Corrupt { key: i64, reason: String },

    #[error("storage error: {0}")]
    Storage(String),
}

impl ArchiveError {
    pub(crate) fn storage(err: impl ToString) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Ordered, append-only store of encoded events.
///
/// Keys are event timestamps in nanoseconds, taken when the event is built.
/// Ascending key order is therefore event construction order. Under
/// concurrent requests it is not necessarily commit order: a request can build
/// its event first and still commit after one built later.
///
/// ## Implementation Requirements
///
/// Implementations must:
/// - write each record in a single atomic transaction (no partial record is ever visible)
/// - reject a key that is already present instead of overwriting it
/// - fail with [`ArchiveError::BucketNotFound`] rather than create the namespace mid-append
/// - serialise concurrent appends (single writer)
pub trait ArchiveStore: Send + Sync {
    fn append(&self, key: i64, payload: &[u8]) -> Result<(), ArchiveError>;

    /// Point lookup. Absent keys fail with [`ArchiveError::NotFound`].
    fn get(&self, key: i64) -> Result<Vec<u8>, ArchiveError>;

    /// Up to `limit` records with key `>= from` (or from the start), ascending.
    fn range(&self, from: Option<i64>, limit: usize) -> Result<Vec<(i64, Vec<u8>)>, ArchiveError>;
}

impl<S> ArchiveStore for Arc<S>
where
    S: ArchiveStore + ?Sized,
{
    fn append(&self, key: i64, payload: &[u8]) -> Result<(), ArchiveError> {
        (**self).append(key, payload)
    }

    fn get(&self, key: i64) -> Result<Vec<u8>, ArchiveError> {
        (**self).get(key)
    }

    fn range(&self, from: Option<i64>, limit: usize) -> Result<Vec<(i64, Vec<u8>)>, ArchiveError> {
        (**self).range(from, limit)
    }
}
