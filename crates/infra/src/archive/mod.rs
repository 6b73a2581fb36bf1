//! Ordered, append-only archive of check-in events.
//!
//! The archive is the authoritative record: every accepted check-in is written
//! here before it is published, and nothing is ever deleted.

pub mod in_memory;
pub mod r#trait;
pub mod redb_archive;

pub use in_memory::InMemoryArchive;
pub use r#trait::{ArchiveError, ArchiveStore};
pub use redb_archive::{RedbArchive, ARCHIVE_TABLE};

use checkin_events::Event;

/// Read back up to `limit` archived events starting at key `from`, in key
/// (event construction) order.
pub fn replay<S>(store: &S, from: Option<i64>, limit: usize) -> Result<Vec<Event>, ArchiveError>
where
    S: ArchiveStore + ?Sized,
{
    store
        .range(from, limit)?
        .into_iter()
        .map(|(key, payload)| {
            checkin_events::decode(&payload).map_err(|e| ArchiveError::Corrupt {
                key,
                reason: e.to_string(),
            })
        })
        .collect()
}
