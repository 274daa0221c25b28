use std::time::Duration;

use sea_orm::ConnectOptions;

use super::{Issues, RawSettings};

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(8);
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(8);
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_MAX_LIFETIME: Duration = Duration::from_secs(1800);

/// Connection pool policy for the database engine.
///
/// `idle_timeout` and `max_lifetime` are disabled with a value of `0` in the
/// environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
            max_lifetime: Some(DEFAULT_MAX_LIFETIME),
            sqlx_logging: false,
        }
    }
}

impl DatabaseConfig {
    pub(super) fn from_raw(raw: &RawSettings, issues: &mut Issues) -> Self {
        let defaults = Self::default();

        let max_connections = issues
            .parse_where::<u32>(
                "db_max_connections",
                raw.db_max_connections.as_deref(),
                |n| *n > 0,
                "a positive integer",
            )
            .unwrap_or(defaults.max_connections);
        let min_connections = issues
            .parse::<u32>(
                "db_min_connections",
                raw.db_min_connections.as_deref(),
                "a non-negative integer",
            )
            .unwrap_or(defaults.min_connections);

        if min_connections > max_connections {
            issues.push(
                "db_min_connections",
                format!("must not exceed db_max_connections ({max_connections})"),
            );
        }

        let connect_timeout = issues
            .parse_where::<u64>(
                "db_connect_timeout_secs",
                raw.db_connect_timeout_secs.as_deref(),
                |secs| *secs > 0,
                "a positive number of seconds",
            )
            .map_or(defaults.connect_timeout, Duration::from_secs);
        let acquire_timeout = issues
            .parse_where::<u64>(
                "db_acquire_timeout_secs",
                raw.db_acquire_timeout_secs.as_deref(),
                |secs| *secs > 0,
                "a positive number of seconds",
            )
            .map_or(defaults.acquire_timeout, Duration::from_secs);
        let idle_timeout = issues
            .parse::<u64>(
                "db_idle_timeout_secs",
                raw.db_idle_timeout_secs.as_deref(),
                "a number of seconds",
            )
            .map_or(defaults.idle_timeout, optional_secs);
        let max_lifetime = issues
            .parse::<u64>(
                "db_max_lifetime_secs",
                raw.db_max_lifetime_secs.as_deref(),
                "a number of seconds",
            )
            .map_or(defaults.max_lifetime, optional_secs);
        let sqlx_logging = issues
            .flag("db_sqlx_logging", raw.db_sqlx_logging.as_deref())
            .unwrap_or(defaults.sqlx_logging);

        Self {
            max_connections,
            min_connections,
            connect_timeout,
            acquire_timeout,
            idle_timeout,
            max_lifetime,
            sqlx_logging,
        }
    }

    /// Options for a lazily connected pool: nothing touches the network until
    /// the first query or ping.
    pub fn connect_options(&self, database_url: &str) -> ConnectOptions {
        let mut options = ConnectOptions::new(database_url);
        options
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(self.connect_timeout)
            .acquire_timeout(self.acquire_timeout)
            .sqlx_logging(self.sqlx_logging)
            .connect_lazy(true);
        if let Some(idle) = self.idle_timeout {
            options.idle_timeout(idle);
        }
        if let Some(lifetime) = self.max_lifetime {
            options.max_lifetime(lifetime);
        }
        options
    }
}

fn optional_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
