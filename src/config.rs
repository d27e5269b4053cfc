use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    /// Broadcast channel capacity for the event bus.
    pub event_capacity: usize,
    /// How many of the newest messages a read-mark scans for receipts.
    pub read_mark_window: i64,
    /// Messages deleted per commit during a thread cascade. 450 leaves
    /// headroom under a 500-operation provider ceiling once read rows are
    /// counted in.
    pub delete_batch_size: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://brokerline.db?mode=rwc".to_string());

        let event_capacity = env::var("EVENT_CAPACITY")
            .unwrap_or_else(|_| "1000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidNumber("EVENT_CAPACITY"))?;

        let read_mark_window = env::var("READ_MARK_WINDOW")
            .unwrap_or_else(|_| "50".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidNumber("READ_MARK_WINDOW"))?;

        let delete_batch_size = env::var("DELETE_BATCH_SIZE")
            .unwrap_or_else(|_| "450".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidNumber("DELETE_BATCH_SIZE"))?;

        if event_capacity == 0 {
            return Err(ConfigError::InvalidNumber("EVENT_CAPACITY"));
        }
        if read_mark_window <= 0 {
            return Err(ConfigError::InvalidNumber("READ_MARK_WINDOW"));
        }
        if delete_batch_size <= 0 {
            return Err(ConfigError::InvalidNumber("DELETE_BATCH_SIZE"));
        }

        Ok(Config {
            database_url,
            event_capacity,
            read_mark_window,
            delete_batch_size,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: "sqlite://brokerline.db?mode=rwc".to_string(),
            event_capacity: 1000,
            read_mark_window: 50,
            delete_batch_size: 450,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not a valid number")]
    InvalidNumber(&'static str),
}
