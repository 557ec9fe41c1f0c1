use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{CustomerAudience, Role, User},
};

const USER_COLUMNS: &str = "id, user_id, name, email, phone, role, is_active, is_verified, created_at";

pub async fn fetch_user(
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<User>, SqliteDatabaseError> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?"))
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(user)
}

/// Batched lookup used to resolve buyer and delivery-partner references for a page of orders.
pub async fn fetch_users_by_ids(
    user_ids: &[String],
    conn: &mut SqliteConnection,
) -> Result<Vec<User>, SqliteDatabaseError> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users WHERE user_id IN ("));
    let mut ids = builder.separated(", ");
    for user_id in user_ids {
        ids.push_bind(user_id);
    }
    builder.push(")");
    let users = builder.build_query_as::<User>().fetch_all(conn).await?;
    Ok(users)
}

/// Counts customers matching the broadcast audience filter.
pub async fn count_customers(
    audience: &CustomerAudience,
    conn: &mut SqliteConnection,
) -> Result<i64, SqliteDatabaseError> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM users WHERE role = ");
    builder.push_bind(Role::Customer);
    if audience.active_only {
        builder.push(" AND is_active = 1");
    }
    if audience.verified_only {
        builder.push(" AND is_verified = 1");
    }
    let count = builder.build_query_scalar::<i64>().fetch_one(conn).await?;
    Ok(count)
}
