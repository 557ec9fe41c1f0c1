use crate::{
    admin_api::order_objects::{OrderQueryFilter, QueryWindow},
    db_types::{Order, OrderId, OrderItem, OrderStatusType, StatusChange, StatusHistoryEntry},
};

/// Order reads and the two admin-initiated order mutations.
///
/// Orders are created by the ordering subsystem; this gateway never inserts them. Both mutations
/// are conditional writes keyed by the external order id and append one status-history entry in
/// the same transaction. A mutation on an id that matches no order writes nothing (including no
/// history entry) and reports `false`.
#[allow(async_fn_in_trait)]
pub trait OrderManagement: Clone {
    type Error: std::error::Error;

    /// Fetches orders matching the filter, sorted by creation time, most recent first. The
    /// optional window applies skip/limit after sorting.
    async fn fetch_orders(
        &self,
        filter: &OrderQueryFilter,
        window: Option<QueryWindow>,
    ) -> Result<Vec<Order>, Self::Error>;

    /// Counts orders matching the filter.
    async fn count_orders(&self, filter: &OrderQueryFilter) -> Result<i64, Self::Error>;

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, Self::Error>;

    /// Fetches the line items for all the given orders in one call.
    async fn fetch_items_for_orders(&self, order_ids: &[OrderId]) -> Result<Vec<OrderItem>, Self::Error>;

    /// The append-only status trail for one order, oldest first.
    async fn fetch_status_history(&self, order_id: &OrderId) -> Result<Vec<StatusHistoryEntry>, Self::Error>;

    /// Sets the order's status, timestamp and status message, and appends a history entry, in a
    /// single transaction. Returns `false` when no order matched the id.
    async fn update_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatusType,
        change: StatusChange,
    ) -> Result<bool, Self::Error>;

    /// Sets the order's delivery partner, moves it to `assigned`, stamps the assignment time, and
    /// appends a history entry, in a single transaction. Returns `false` when no order matched.
    async fn assign_delivery_partner(
        &self,
        order_id: &OrderId,
        partner_id: &str,
        change: StatusChange,
    ) -> Result<bool, Self::Error>;
}
