use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type ChatResult<T> = Result<T, ChatError>;
