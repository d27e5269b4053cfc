use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::domain::entities::{Message, Presence, Thread};
use crate::domain::events::ChatEvent;
use crate::domain::ports::{MessageRepository, PresenceRepository, ThreadRepository};
use crate::events::EventBus;

/// Which threads a thread-list subscription watches.
#[derive(Debug, Clone)]
pub enum ThreadScope {
    /// Threads containing this participant.
    User(String),
    /// Every thread (admin view).
    All,
}

impl ThreadScope {
    fn matches(&self, event: &ChatEvent) -> bool {
        let Some(participant_ids) = event.thread_participants() else {
            return false;
        };
        match self {
            ThreadScope::All => true,
            ThreadScope::User(uid) => participant_ids.iter().any(|id| id == uid),
        }
    }
}

/// Handle to a live query. Cancel it exactly once via `unsubscribe`;
/// dropping the handle without cancelling leaks the listener for the
/// process lifetime.
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        self.task.abort();
    }
}

/// Push-based change fan-out. Each subscription is a tokio task that
/// requeries its snapshot whenever a matching event lands on the bus and
/// hands the fresh snapshot to the caller's handler. Requery failures are
/// logged and the subscription stays open.
#[derive(Clone)]
pub struct Subscriptions {
    threads: Arc<dyn ThreadRepository>,
    messages: Arc<dyn MessageRepository>,
    presence: Arc<dyn PresenceRepository>,
    event_bus: EventBus,
}

impl Subscriptions {
    pub fn new(
        threads: Arc<dyn ThreadRepository>,
        messages: Arc<dyn MessageRepository>,
        presence: Arc<dyn PresenceRepository>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            threads,
            messages,
            presence,
            event_bus,
        }
    }

    /// Live thread list for one user or for everyone, ordered by newest
    /// activity. Delivers the current snapshot immediately, then again after
    /// every matching thread change (at least once per actual change).
    pub fn subscribe_to_threads<F>(&self, scope: ThreadScope, on_change: F) -> Subscription
    where
        F: Fn(Vec<Thread>) + Send + Sync + 'static,
    {
        let threads = self.threads.clone();
        // Subscribe before the initial query so no change slips between.
        let mut rx = self.event_bus.subscribe();

        let task = tokio::spawn(async move {
            push_threads(&*threads, &scope, &on_change).await;
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if scope.matches(&event) {
                            push_threads(&*threads, &scope, &on_change).await;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "thread subscription lagged, {} events skipped; resyncing",
                            skipped
                        );
                        push_threads(&*threads, &scope, &on_change).await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Subscription { task }
    }

    /// Live window of the newest `limit` messages in one thread.
    pub fn subscribe_to_messages<F>(
        &self,
        thread_id: &str,
        limit: i64,
        on_change: F,
    ) -> Subscription
    where
        F: Fn(Vec<Message>) + Send + Sync + 'static,
    {
        let messages = self.messages.clone();
        let thread_id = thread_id.to_string();
        let mut rx = self.event_bus.subscribe();

        let task = tokio::spawn(async move {
            push_messages(&*messages, &thread_id, limit, &on_change).await;
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if event.message_thread_id() == Some(thread_id.as_str()) {
                            push_messages(&*messages, &thread_id, limit, &on_change).await;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "message subscription lagged, {} events skipped; resyncing",
                            skipped
                        );
                        push_messages(&*messages, &thread_id, limit, &on_change).await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Subscription { task }
    }

    /// Single-user presence watch. Users never seen read as offline.
    pub fn subscribe_to_presence<F>(&self, user_id: &str, on_change: F) -> Subscription
    where
        F: Fn(Presence) + Send + Sync + 'static,
    {
        let presence = self.presence.clone();
        let user_id = user_id.to_string();
        let mut rx = self.event_bus.subscribe();

        let task = tokio::spawn(async move {
            push_presence(&*presence, &user_id, &on_change).await;
            loop {
                match rx.recv().await {
                    Ok(ChatEvent::PresenceChanged { user_id: uid, .. }) if uid == user_id => {
                        push_presence(&*presence, &user_id, &on_change).await;
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "presence subscription lagged, {} events skipped; resyncing",
                            skipped
                        );
                        push_presence(&*presence, &user_id, &on_change).await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Subscription { task }
    }
}

async fn push_threads<F>(repo: &dyn ThreadRepository, scope: &ThreadScope, on_change: &F)
where
    F: Fn(Vec<Thread>),
{
    let result = match scope {
        ThreadScope::User(uid) => repo.threads_for_participant(uid).await,
        ThreadScope::All => repo.all_threads().await,
    };
    match result {
        Ok(threads) => on_change(threads),
        Err(e) => tracing::warn!("thread subscription requery failed: {}", e),
    }
}

async fn push_messages<F>(repo: &dyn MessageRepository, thread_id: &str, limit: i64, on_change: &F)
where
    F: Fn(Vec<Message>),
{
    match repo.list_messages(thread_id, limit, None).await {
        Ok(messages) => on_change(messages),
        Err(e) => tracing::warn!("message subscription requery failed: {}", e),
    }
}

async fn push_presence<F>(repo: &dyn PresenceRepository, user_id: &str, on_change: &F)
where
    F: Fn(Presence),
{
    match repo.get_presence(user_id).await {
        Ok(found) => {
            on_change(found.unwrap_or_else(|| Presence::offline(user_id.to_string())))
        }
        Err(e) => tracing::warn!("presence subscription requery failed: {}", e),
    }
}
