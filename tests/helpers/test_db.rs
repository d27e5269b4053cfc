use std::sync::Once;

use brokerline::database::Database;
use uuid::Uuid;

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub async fn setup_test_db() -> Database {
    init_tracing();

    // Use file-based SQLite for tests (unique name per test for parallel
    // execution)
    let temp_file = format!("test_{}.db", Uuid::new_v4());
    let db_url = format!("sqlite://{}?mode=rwc", temp_file);

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");

    db.init_schema()
        .await
        .expect("Failed to initialize test schema");

    db
}
