pub mod message_repository;
pub mod presence_repository;
pub mod thread_repository;

pub use message_repository::MessageRepository;
pub use presence_repository::PresenceRepository;
pub use thread_repository::ThreadRepository;
