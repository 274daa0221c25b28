use std::sync::Arc;

use api_scaffold::config::Settings;
use api_scaffold::database::Database;
use api_scaffold::error::AppError;
use api_scaffold::state::AppState;
use api_scaffold::{run, telemetry};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    telemetry::init();

    if let Err(e) = start().await {
        error!("❌ {e}");
        std::process::exit(1);
    }
}

async fn start() -> Result<(), AppError> {
    // Startup stops here on any missing or malformed setting.
    let settings = Arc::new(Settings::load()?);
    info!(
        app = %settings.app_name,
        env = %settings.env,
        "⚙️  Settings loaded"
    );

    let db = Database::connect(&settings).await?;
    run(AppState::new(settings, db)).await
}
