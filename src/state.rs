use std::sync::Arc;

use crate::config::Settings;
use crate::database::Database;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: Database,
}

impl AppState {
    pub fn new(settings: Arc<Settings>, db: Database) -> Self {
        Self { settings, db }
    }
}
