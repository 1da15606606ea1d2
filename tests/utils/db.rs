/// Postgres test utilities
///
/// Tests that need a real database call `test_pool()` and return early when
/// `TEST_DATABASE_URL` is not configured.
use contact_pipeline::shared::database::{Database, DbPool};
use diesel::prelude::*;
use std::sync::{Mutex, MutexGuard, OnceLock};

static DATABASE: OnceLock<Option<Database>> = OnceLock::new();

/// Shared migrated pool, or None when no test database is configured
pub fn test_pool() -> Option<DbPool> {
    DATABASE
        .get_or_init(|| {
            dotenvy::dotenv().ok();
            let url = std::env::var("TEST_DATABASE_URL").ok()?;
            let database = Database::connect(&url).expect("Failed to connect to test database");
            database
                .run_migrations()
                .expect("Failed to migrate test database");
            Some(database)
        })
        .as_ref()
        .map(|database| database.pool().clone())
}

/// Clean all pipeline tables - use at the start of each test
pub fn clean_test_db(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection");

    diesel::sql_query(
        "TRUNCATE TABLE background_jobs, import_jobs, contact_list_items RESTART IDENTITY CASCADE",
    )
    .execute(&mut conn)
    .expect("Failed to clean pipeline tables");
}

/// Global test mutex for serialization
static TEST_LOCK: Mutex<()> = Mutex::new(());

/// Acquire test lock to ensure database tests run serially
pub fn acquire_test_lock() -> MutexGuard<'static, ()> {
    TEST_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
