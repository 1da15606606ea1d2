use crate::log_info;
use crate::shared::config::PipelineConfig;
use crate::shared::errors::AppError;
use crate::shared::utils::logger::LogContext;
use diesel::pg::PgConnection;
use diesel::r2d2::{self, ConnectionManager, Pool};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::env;
use std::time::{Duration, Instant};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;
pub type DbConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Connections beyond the import lanes: validation lane, queue polling, enqueue callers
const SHARED_CONNECTIONS: u32 = 3;

/// Acquisitions slower than this are logged as a performance metric
const SLOW_ACQUIRE_MS: u64 = 100;

#[derive(Debug)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Connect using `DATABASE_URL` with a pool sized for the default pipeline
    pub fn new() -> Result<Self, AppError> {
        Self::for_pipeline(&PipelineConfig::default())
    }

    /// Connect using `DATABASE_URL` with one connection per import slot plus the shared ones
    pub fn for_pipeline(config: &PipelineConfig) -> Result<Self, AppError> {
        let database_url = database_url_from_env()?;
        Self::connect_with_size(&database_url, config.import.max_concurrent + SHARED_CONNECTIONS)
    }

    pub fn connect(database_url: &str) -> Result<Self, AppError> {
        let import_slots = PipelineConfig::default().import.max_concurrent;
        Self::connect_with_size(database_url, import_slots + SHARED_CONNECTIONS)
    }

    fn connect_with_size(database_url: &str, max_size: u32) -> Result<Self, AppError> {
        validate_database_url(database_url)?;
        log_info!("Connecting to database at {}", redact_credentials(database_url));

        let max_size = max_size.max(1);
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = r2d2::Pool::builder()
            .max_size(max_size)
            .min_idle(Some(1))
            .connection_timeout(Duration::from_secs(10))
            .idle_timeout(Some(Duration::from_secs(300)))
            .max_lifetime(Some(Duration::from_secs(1800)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to create connection pool: {}", e))
            })?;

        log_info!("Database connection pool ready (max_size: {})", max_size);
        Ok(Self { pool })
    }

    /// Wrap an existing pool (tests share one migrated pool)
    pub fn from_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn get_connection(&self) -> Result<DbConnection, AppError> {
        let start = Instant::now();

        let conn = self.pool.get().map_err(|e| {
            LogContext::error_with_context(&e, "Failed to acquire database connection from pool");
            AppError::from(e)
        })?;

        let waited = start.elapsed().as_millis() as u64;
        if waited > SLOW_ACQUIRE_MS {
            LogContext::performance_metric("db_connection_acquire", waited, Some("slow"));
        }
        Ok(conn)
    }

    /// Apply the embedded schema migrations
    pub fn run_migrations(&self) -> Result<(), AppError> {
        let mut conn = self.get_connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| AppError::DatabaseError(format!("Failed to run migrations: {}", e)))?;

        log_info!("Database migrations completed ({} applied)", applied.len());
        Ok(())
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn database_url_from_env() -> Result<String, AppError> {
    env::var("DATABASE_URL").map_err(|_| {
        AppError::DatabaseError("DATABASE_URL environment variable not found".to_string())
    })
}

fn validate_database_url(database_url: &str) -> Result<(), AppError> {
    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok(())
    } else {
        Err(AppError::DatabaseError(
            "Invalid database URL format. Must start with postgres:// or postgresql://"
                .to_string(),
        ))
    }
}

/// Host part of the URL only; user and password never reach the log
fn redact_credentials(database_url: &str) -> &str {
    database_url
        .rsplit_once('@')
        .map_or("unknown_host", |(_, host)| host)
}
