#![allow(dead_code)]

use std::sync::Arc;

use api_scaffold::config::{EnvSource, Settings};
use api_scaffold::database::Database;
use api_scaffold::state::AppState;

/// Settings pointing at a private in-memory SQLite database.
///
/// A single pooled connection with no idle reaping keeps the in-memory
/// database alive for the whole test.
pub fn settings(env: &str) -> Settings {
    Settings::from_source(&EnvSource::from_pairs([
        ("app_name", "api-scaffold-tests"),
        ("env", env),
        ("database_url", "sqlite::memory:"),
        ("secret_key", "test-secret"),
        ("algorithm", "HS256"),
        ("access_token_expire_minutes", "15"),
        ("db_max_connections", "1"),
        ("db_min_connections", "1"),
        ("db_idle_timeout_secs", "0"),
        ("db_max_lifetime_secs", "0"),
    ]))
    .expect("test settings are valid")
}

pub async fn memory_db() -> Database {
    Database::connect(&settings("test"))
        .await
        .expect("failed to open in-memory database")
}

pub async fn state(env: &str) -> AppState {
    let settings = Arc::new(settings(env));
    let db = Database::connect(&settings)
        .await
        .expect("failed to open in-memory database");
    AppState::new(settings, db)
}
