use chrono::{DateTime, Utc};
use uuid::Uuid;

use checkin_core::CheckinCommand;

use crate::clock::MonotonicClock;

/// The durable record of an accepted check-in command.
///
/// Events are:
/// - **immutable**: `id` and timestamp are assigned once, at construction
/// - **ordered**: the timestamp comes from a [`MonotonicClock`] and is also the archive key
/// - **self-contained**: the event owns its command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    id: Uuid,
    /// Nanoseconds since the Unix epoch, UTC.
    timestamp: i64,
    command: CheckinCommand,
}

impl Event {
    /// Build an event with a random id and the process clock's current time.
    pub fn new(command: CheckinCommand) -> Self {
        Self::with_clock(command, MonotonicClock::process())
    }

    pub fn with_clock(command: CheckinCommand, clock: &MonotonicClock) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: clock.now_nanos(),
            command,
        }
    }

    /// Reassemble an event from decoded parts.
    pub(crate) fn from_parts(id: Uuid, timestamp: i64, command: CheckinCommand) -> Self {
        Self {
            id,
            timestamp,
            command,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.timestamp)
    }

    pub fn timestamp_nanos(&self) -> i64 {
        self.timestamp
    }

    /// Key under which this event is archived.
    pub fn archive_key(&self) -> i64 {
        self.timestamp
    }

    pub fn command(&self) -> &CheckinCommand {
        &self.command
    }

    pub fn message_type(&self) -> &str {
        &self.command.message_type
    }

    pub fn into_command(self) -> CheckinCommand {
        self.command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_events_get_distinct_ids_and_increasing_keys() {
        let a = Event::new(CheckinCommand::check_out("t", "dev-1"));
        let b = Event::new(CheckinCommand::check_out("t", "dev-1"));

        assert_ne!(a.id(), b.id());
        assert!(b.archive_key() > a.archive_key());
        assert_eq!(a.id().get_version_num(), 4);
    }

    #[test]
    fn time_matches_archive_key() {
        let event = Event::new(CheckinCommand::check_out("t", "dev-1"));
        assert_eq!(event.time().timestamp_nanos_opt(), Some(event.archive_key()));
        assert_eq!(event.message_type(), "CheckOut");
    }
}
