//! Infrastructure layer: archive storage, broker publishers, and the
//! archive-then-publish dispatcher.

pub mod archive;
pub mod command_dispatcher;
pub mod publisher;


pub use archive::{ArchiveError, ArchiveStore, InMemoryArchive, RedbArchive};
pub use command_dispatcher::{CheckinDispatcher, CheckinService, DispatchError};
