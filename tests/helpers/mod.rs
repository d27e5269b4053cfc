pub mod chat_helpers;
pub mod test_db;
