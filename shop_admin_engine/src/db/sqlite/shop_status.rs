use sqlx::SqliteConnection;

use crate::{db::sqlite::SqliteDatabaseError, db_types::ShopStatus};

pub async fn fetch_shop_status(
    conn: &mut SqliteConnection,
) -> Result<Option<ShopStatus>, SqliteDatabaseError> {
    let status = sqlx::query_as::<_, ShopStatus>(
        "SELECT is_open, reopen_time, reason, updated_at, updated_by FROM shop_status WHERE id = 1",
    )
    .fetch_optional(conn)
    .await?;
    Ok(status)
}

/// Writes the singleton row. The fixed id makes the insert collapse into an update when the row
/// already exists, so there is never more than one row.
pub async fn upsert_shop_status(
    status: &ShopStatus,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    sqlx::query(
        "INSERT INTO shop_status (id, is_open, reopen_time, reason, updated_at, updated_by) \
         VALUES (1, ?, ?, ?, ?, ?) \
         ON CONFLICT (id) DO UPDATE SET is_open = excluded.is_open, reopen_time = excluded.reopen_time, \
         reason = excluded.reason, updated_at = excluded.updated_at, updated_by = excluded.updated_by",
    )
    .bind(status.is_open)
    .bind(status.reopen_time)
    .bind(&status.reason)
    .bind(status.updated_at)
    .bind(&status.updated_by)
    .execute(conn)
    .await?;
    Ok(())
}
