//! Infrastructure wiring: archive + publisher behind a dispatcher.

use std::sync::Arc;

use anyhow::Context;

use checkin_events::InMemoryPublisher;
use checkin_infra::archive::RedbArchive;
use checkin_infra::command_dispatcher::{CheckinDispatcher, CheckinService};
use checkin_infra::publisher::RedisPublisher;

use crate::config::Config;

pub type SharedCheckinService = Arc<dyn CheckinService>;

/// Messages kept by the in-memory publisher when no broker is configured.
pub const FALLBACK_PUBLISH_BACKLOG: usize = 1024;

fn fallback_publisher() -> InMemoryPublisher {
    InMemoryPublisher::bounded(FALLBACK_PUBLISH_BACKLOG)
}

/// Build the production check-in service from `config`.
///
/// The archive must open; there is no degraded mode without it. Without a
/// Redis URL the service publishes to an in-memory sink.
pub fn build_services(config: &Config) -> anyhow::Result<SharedCheckinService> {
    let archive = RedbArchive::open(&config.archive_path).with_context(|| {
        format!("failed to open archive at {}", config.archive_path.display())
    })?;

    let service: SharedCheckinService = match config.redis_url.as_deref() {
        Some(url) => {
            let publisher = RedisPublisher::new(url).context("invalid CHECKIN_REDIS_URL")?;
            tracing::info!("publishing check-ins to redis");
            Arc::new(CheckinDispatcher::new(archive, publisher))
        }
        None => {
            tracing::warn!("CHECKIN_REDIS_URL not set; check-ins are published in memory only");
            Arc::new(CheckinDispatcher::new(archive, fallback_publisher()))
        }
    };

    Ok(service)
}
