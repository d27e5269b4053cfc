use tokio::sync::broadcast;

use crate::domain::events::ChatEvent;

/// Event bus for publishing and subscribing to chat change events.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ChatEvent>,
}

impl EventBus {
    /// Create a new event bus with specified capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all subscribers (non-blocking, fire-and-forget).
    pub fn publish(&self, event: ChatEvent) {
        // No subscribers is a normal state, not a failure of the mutation.
        if let Err(e) = self.tx.send(event) {
            tracing::debug!("event not delivered (no subscribers): {}", e);
        }
    }

    /// Subscribe to events (returns a receiver).
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.tx.subscribe()
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::now_rfc3339;

    #[test]
    fn test_event_bus_creation() {
        let bus = EventBus::new(100);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_event_publish_subscribe() {
        let bus = EventBus::new(100);
        let mut rx = bus.subscribe();

        bus.publish(ChatEvent::MessageAppended {
            message_id: "m1".to_string(),
            thread_id: "t1".to_string(),
            sender_id: "u1".to_string(),
            timestamp: now_rfc3339(),
        });

        let received = rx.recv().await.unwrap();
        match received {
            ChatEvent::MessageAppended { thread_id, .. } => {
                assert_eq!(thread_id, "t1");
            }
            _ => panic!("Unexpected event type"),
        }
    }
}
