use sea_orm::DbErr;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that stop the process from starting or serving.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}
