pub mod message_log;
pub mod presence_tracker;
pub mod read_tracker;
pub mod subscriptions;
pub mod thread_directory;

pub use message_log::MessageLog;
pub use presence_tracker::PresenceTracker;
pub use read_tracker::ReadTracker;
pub use subscriptions::{Subscription, Subscriptions, ThreadScope};
pub use thread_directory::ThreadDirectory;
