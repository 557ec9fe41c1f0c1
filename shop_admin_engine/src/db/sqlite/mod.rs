pub mod db;
mod errors;

pub mod notifications;
pub mod orders;
pub mod products;
pub mod shop_status;
pub mod users;

use std::env;

pub use db::SqliteDatabase;
pub use errors::SqliteDatabaseError;
use log::info;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

const SQLITE_DB_URL: &str = "sqlite://data/shop_admin.db";

pub fn db_url() -> String {
    let result = env::var("SAG_DATABASE_URL").unwrap_or_else(|_| {
        info!("SAG_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqliteDatabaseError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}

/// Applies the embedded schema migrations. The server calls this on startup, and the test
/// harness calls it against every throwaway database it creates.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteDatabaseError> {
    sqlx::migrate!("./src/db/sqlite/migrations").run(pool).await?;
    info!("🗃️ Migrations complete");
    Ok(())
}
