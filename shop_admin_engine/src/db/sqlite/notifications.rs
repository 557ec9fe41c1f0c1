use chrono::Utc;
use log::trace;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    admin_api::{
        notification_objects::{NotificationQueryFilter, TypeCount},
        order_objects::QueryWindow,
    },
    db::sqlite::SqliteDatabaseError,
    db_types::{NewNotification, Notification},
    helpers::{display_time, ids},
};

const NOTIFICATION_COLUMNS: &str = "id, notification_id, title, message, kind, audience, user_id, order_id, \
     target_user_count, read, read_at, created_at, created_at_display, display_timezone, created_by, \
     created_by_admin";

/// Appends predicates for the filter. Every query in this module is implicitly scoped to
/// admin-created notifications.
fn push_filter_predicates<'a>(builder: &mut QueryBuilder<'a, Sqlite>, filter: &'a NotificationQueryFilter) {
    builder.push(" WHERE created_by_admin = 1");
    if let Some(kind) = &filter.kind {
        builder.push(" AND kind = ");
        builder.push_bind(kind);
    }
    if let Some(audience) = filter.audience {
        builder.push(" AND audience = ");
        builder.push_bind(audience);
    }
    if let Some(since) = filter.since {
        builder.push(" AND created_at >= ");
        builder.push_bind(since);
    }
    if let Some(until) = filter.until {
        builder.push(" AND created_at <= ");
        builder.push_bind(until);
    }
    if let Some(read) = filter.read {
        builder.push(" AND read = ");
        builder.push_bind(read);
    }
}

/// Stores a notification. The creation instant is written twice: the UTC instant for querying and
/// sorting, and the preformatted display string so reads never convert timezones.
pub async fn insert_notification(
    notification: NewNotification,
    conn: &mut SqliteConnection,
) -> Result<String, SqliteDatabaseError> {
    let notification_id = ids::new_notification_id();
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO notifications (notification_id, title, message, kind, audience, user_id, order_id, \
         target_user_count, read, read_at, created_at, created_at_display, display_timezone, created_by, \
         created_by_admin) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, NULL, ?, ?, ?, ?, 1)",
    )
    .bind(&notification_id)
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(&notification.kind)
    .bind(notification.audience)
    .bind(&notification.user_id)
    .bind(&notification.order_id)
    .bind(notification.target_user_count)
    .bind(now)
    .bind(display_time::format_display(now))
    .bind(display_time::DISPLAY_TIMEZONE)
    .bind(&notification.created_by)
    .execute(conn)
    .await?;
    trace!("🗃️ Notification {notification_id} stored");
    Ok(notification_id)
}

pub async fn fetch_notifications(
    filter: &NotificationQueryFilter,
    window: QueryWindow,
    conn: &mut SqliteConnection,
) -> Result<Vec<Notification>, SqliteDatabaseError> {
    let mut builder = QueryBuilder::new(format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications"));
    push_filter_predicates(&mut builder, filter);
    builder.push(" ORDER BY created_at DESC LIMIT ");
    builder.push_bind(window.limit);
    builder.push(" OFFSET ");
    builder.push_bind(window.skip);
    trace!("🗃️ Executing query: {}", builder.sql());
    let notifications = builder.build_query_as::<Notification>().fetch_all(conn).await?;
    Ok(notifications)
}

pub async fn count_notifications(
    filter: &NotificationQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<i64, SqliteDatabaseError> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM notifications");
    push_filter_predicates(&mut builder, filter);
    let count = builder.build_query_scalar::<i64>().fetch_one(conn).await?;
    Ok(count)
}

/// Fetches a notification by external id, restricted to admin-created rows.
pub async fn fetch_admin_notification(
    notification_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Notification>, SqliteDatabaseError> {
    let notification = sqlx::query_as::<_, Notification>(&format!(
        "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE notification_id = ? AND created_by_admin = 1"
    ))
    .bind(notification_id)
    .fetch_optional(conn)
    .await?;
    Ok(notification)
}

pub async fn delete_notification(
    notification_id: &str,
    conn: &mut SqliteConnection,
) -> Result<bool, SqliteDatabaseError> {
    let result = sqlx::query("DELETE FROM notifications WHERE notification_id = ?")
        .bind(notification_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Grouped count per type tag over admin-created notifications.
pub async fn notification_type_counts(
    conn: &mut SqliteConnection,
) -> Result<Vec<TypeCount>, SqliteDatabaseError> {
    let counts = sqlx::query_as::<_, TypeCount>(
        "SELECT kind, COUNT(*) AS count FROM notifications WHERE created_by_admin = 1 GROUP BY kind",
    )
    .fetch_all(conn)
    .await?;
    Ok(counts)
}
