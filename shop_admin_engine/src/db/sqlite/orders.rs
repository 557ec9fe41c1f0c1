use chrono::Utc;
use log::trace;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    admin_api::order_objects::{OrderQueryFilter, QueryWindow},
    db::sqlite::SqliteDatabaseError,
    db_types::{Order, OrderId, OrderItem, OrderStatusType, StatusChange, StatusHistoryEntry},
    helpers::escape_like,
};

const ORDER_COLUMNS: &str = "id, order_id, user_id, delivery_partner_id, total_amount, \
     order_status AS status, status_message, delivery_address, assigned_at, created_at, updated_at";

/// Appends the WHERE clause for the given filter to the query. Every populated filter dimension
/// contributes one predicate, combined with AND.
fn push_filter_predicates<'a>(builder: &mut QueryBuilder<'a, Sqlite>, filter: &'a OrderQueryFilter) {
    if filter.is_empty() {
        return;
    }
    builder.push(" WHERE ");
    let mut where_clause = builder.separated(" AND ");
    if let Some(status) = filter.status {
        where_clause.push("order_status = ");
        where_clause.push_bind_unseparated(status);
    }
    if let Some(since) = filter.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = filter.until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
    if let Some(min_total) = filter.min_total {
        where_clause.push("total_amount >= ");
        where_clause.push_bind_unseparated(min_total);
    }
    if let Some(max_total) = filter.max_total {
        where_clause.push("total_amount <= ");
        where_clause.push_bind_unseparated(max_total);
    }
    if let Some(search) = &filter.search {
        where_clause.push("order_id LIKE ");
        where_clause.push_bind_unseparated(format!("%{}%", escape_like(search)));
        where_clause.push_unseparated(" ESCAPE '\\'");
    }
}

/// Fetches orders matching the filter, most recent first, optionally windowed.
pub async fn fetch_orders(
    filter: &OrderQueryFilter,
    window: Option<QueryWindow>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, SqliteDatabaseError> {
    let mut builder = QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders"));
    push_filter_predicates(&mut builder, filter);
    builder.push(" ORDER BY created_at DESC");
    if let Some(window) = window {
        builder.push(" LIMIT ");
        builder.push_bind(window.limit);
        builder.push(" OFFSET ");
        builder.push_bind(window.skip);
    }
    trace!("🗃️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    trace!("🗃️ fetch_orders returned {} rows", orders.len());
    Ok(orders)
}

/// Counts orders matching the filter.
pub async fn count_orders(
    filter: &OrderQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<i64, SqliteDatabaseError> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM orders");
    push_filter_predicates(&mut builder, filter);
    let count = builder.build_query_scalar::<i64>().fetch_one(conn).await?;
    Ok(count)
}

/// Returns the order with the given external id, if any.
pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let order = sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = ?"))
        .bind(order_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Fetches the line items for all the given orders in one query.
pub async fn fetch_items_for_orders(
    order_ids: &[OrderId],
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderItem>, SqliteDatabaseError> {
    if order_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new(
        "SELECT id, order_id, product_id, quantity, unit_price FROM order_items WHERE order_id IN (",
    );
    let mut ids = builder.separated(", ");
    for order_id in order_ids {
        ids.push_bind(order_id);
    }
    builder.push(") ORDER BY id ASC");
    let items = builder.build_query_as::<OrderItem>().fetch_all(conn).await?;
    Ok(items)
}

/// The status trail for one order, oldest entry first.
pub async fn fetch_status_history(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<StatusHistoryEntry>, SqliteDatabaseError> {
    let entries = sqlx::query_as::<_, StatusHistoryEntry>(
        "SELECT id, order_id, status, message, changed_by, partner_id, partner_name, changed_at \
         FROM order_status_history WHERE order_id = ? ORDER BY id ASC",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(entries)
}

/// Conditional status write keyed by the external order id. Returns the number of rows touched;
/// zero means the order does not exist and nothing may be appended to its history.
pub(crate) async fn set_order_status(
    order_id: &OrderId,
    status: OrderStatusType,
    message: &str,
    conn: &mut SqliteConnection,
) -> Result<u64, SqliteDatabaseError> {
    let now = Utc::now();
    let result = sqlx::query(
        "UPDATE orders SET order_status = ?, status_message = ?, updated_at = ? WHERE order_id = ?",
    )
    .bind(status)
    .bind(message)
    .bind(now)
    .bind(order_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Conditional assignment write: sets the partner, moves the order to `assigned` and stamps the
/// assignment time. Returns the number of rows touched.
pub(crate) async fn set_partner_assignment(
    order_id: &OrderId,
    partner_id: &str,
    message: &str,
    conn: &mut SqliteConnection,
) -> Result<u64, SqliteDatabaseError> {
    let now = Utc::now();
    let result = sqlx::query(
        "UPDATE orders SET delivery_partner_id = ?, order_status = ?, status_message = ?, \
         assigned_at = ?, updated_at = ? WHERE order_id = ?",
    )
    .bind(partner_id)
    .bind(OrderStatusType::Assigned)
    .bind(message)
    .bind(now)
    .bind(now)
    .bind(order_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Appends one entry to the order's status trail.
pub(crate) async fn insert_history_entry(
    order_id: &OrderId,
    change: &StatusChange,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    sqlx::query(
        "INSERT INTO order_status_history (order_id, status, message, changed_by, partner_id, partner_name, changed_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(order_id)
    .bind(change.status)
    .bind(&change.message)
    .bind(&change.changed_by)
    .bind(&change.partner_id)
    .bind(&change.partner_name)
    .bind(Utc::now())
    .execute(conn)
    .await?;
    Ok(())
}
