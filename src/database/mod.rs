//! Database engine and session factory.

use migration::{Migrator, MigratorTrait};
use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};
use tracing::info;

use crate::config::{DatabaseConfig, Settings};

/// A transactional unit of work. Nothing is committed unless [`Session::commit`]
/// is called; dropping it rolls back.
pub type Session = DatabaseTransaction;

/// Shared engine handle owning the connection pool.
#[derive(Clone)]
pub struct Database {
    conn: DatabaseConnection,
}

impl Database {
    /// Builds the engine from settings. The pool connects lazily, so an
    /// unreachable server only shows up at the first query.
    pub async fn connect(settings: &Settings) -> Result<Self, DbErr> {
        Self::connect_with(&settings.database_url, &settings.database).await
    }

    pub async fn connect_with(database_url: &str, config: &DatabaseConfig) -> Result<Self, DbErr> {
        let conn = sea_orm::Database::connect(config.connect_options(database_url)).await?;
        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "🔌 Database engine ready"
        );
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub fn sessions(&self) -> SessionFactory {
        SessionFactory {
            conn: self.conn.clone(),
        }
    }

    pub async fn ping(&self) -> Result<(), DbErr> {
        self.conn.ping().await
    }

    pub async fn close(self) -> Result<(), DbErr> {
        self.conn.close().await
    }
}

/// Produces sessions bound to one engine.
#[derive(Clone)]
pub struct SessionFactory {
    conn: DatabaseConnection,
}

impl SessionFactory {
    pub async fn session(&self) -> Result<Session, DbErr> {
        self.conn.begin().await
    }
}

/// Creates every table declared by the entity crate. Safe to run repeatedly.
pub async fn init_db(db: &Database) -> Result<(), DbErr> {
    let pending = Migrator::get_pending_migrations(db.connection()).await?;
    info!(pending = pending.len(), "📦 Creating schema from entity metadata...");
    Migrator::up(db.connection(), None).await?;
    info!("✅ Schema up to date");
    Ok(())
}
