//! Creates the database schema from the entity declarations, then exits.
//! Not part of normal service startup.

use api_scaffold::config::Settings;
use api_scaffold::database::{self, Database};
use api_scaffold::error::AppError;
use api_scaffold::telemetry;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    telemetry::init();

    if let Err(e) = init().await {
        error!("❌ {e}");
        std::process::exit(1);
    }
}

async fn init() -> Result<(), AppError> {
    let settings = Settings::load()?;
    let db = Database::connect(&settings).await?;

    database::init_db(&db).await?;
    db.close().await?;

    info!("Database tables created successfully!");
    Ok(())
}
