pub mod bootstrap;
pub mod config;
pub mod database;
pub mod domain;
pub mod events;
pub mod services;

pub use bootstrap::*;
pub use config::*;
pub use database::*;
pub use events::*;
pub use services::*;
