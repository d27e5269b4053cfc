use std::sync::Arc;

use crate::config::Config;
use crate::database::Database;
use crate::domain::ports::{MessageRepository, PresenceRepository, ThreadRepository};
use crate::events::EventBus;
use crate::services::{MessageLog, PresenceTracker, ReadTracker, Subscriptions, ThreadDirectory};

/// Fully wired messaging core. The application shell builds one of these at
/// startup and hands the services to whoever drives them.
#[derive(Clone)]
pub struct ChatCore {
    pub threads: ThreadDirectory,
    pub messages: MessageLog,
    pub reads: ReadTracker,
    pub presence: PresenceTracker,
    pub subscriptions: Subscriptions,
    pub event_bus: EventBus,
}

pub fn build_chat_core(db: Database, config: &Config) -> ChatCore {
    let event_bus = EventBus::new(config.event_capacity);

    let thread_repo = Arc::new(db.clone()) as Arc<dyn ThreadRepository>;
    let message_repo = Arc::new(db.clone()) as Arc<dyn MessageRepository>;
    let presence_repo = Arc::new(db) as Arc<dyn PresenceRepository>;

    let messages = MessageLog::new(
        message_repo.clone(),
        thread_repo.clone(),
        event_bus.clone(),
    );

    let threads = ThreadDirectory::new(
        thread_repo.clone(),
        message_repo.clone(),
        messages.clone(),
        event_bus.clone(),
        config.delete_batch_size,
    );

    let reads = ReadTracker::new(
        message_repo.clone(),
        thread_repo.clone(),
        event_bus.clone(),
        config.read_mark_window,
    );

    let presence = PresenceTracker::new(presence_repo.clone(), event_bus.clone());

    let subscriptions = Subscriptions::new(
        thread_repo,
        message_repo,
        presence_repo,
        event_bus.clone(),
    );

    tracing::info!(
        "Chat core initialized (event capacity {}, read window {}, delete batch {})",
        config.event_capacity,
        config.read_mark_window,
        config.delete_batch_size
    );

    ChatCore {
        threads,
        messages,
        reads,
        presence,
        subscriptions,
        event_bus,
    }
}
