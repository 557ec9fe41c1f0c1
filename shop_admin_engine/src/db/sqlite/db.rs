use std::fmt::Debug;

use log::trace;
use sqlx::SqlitePool;

use crate::{
    admin_api::{
        notification_objects::{NotificationQueryFilter, TypeCount},
        order_objects::{OrderQueryFilter, QueryWindow},
    },
    db::{
        sqlite::{db_url, new_pool, notifications, orders, products, shop_status, users, SqliteDatabaseError},
        traits::{NotificationManagement, OrderManagement, ProductCatalog, ShopStatusManagement, UserDirectory},
    },
    db_types::{
        CustomerAudience, NewNotification, Notification, Order, OrderId, OrderItem, OrderStatusType, Product,
        ShopStatus, StatusChange, StatusHistoryEntry, User,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL from the environment.
    pub async fn new(max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl OrderManagement for SqliteDatabase {
    type Error = SqliteDatabaseError;

    async fn fetch_orders(
        &self,
        filter: &OrderQueryFilter,
        window: Option<QueryWindow>,
    ) -> Result<Vec<Order>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders(filter, window, &mut conn).await
    }

    async fn count_orders(&self, filter: &OrderQueryFilter) -> Result<i64, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::count_orders(filter, &mut conn).await
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_order_id(order_id, &mut conn).await
    }

    async fn fetch_items_for_orders(&self, order_ids: &[OrderId]) -> Result<Vec<OrderItem>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_items_for_orders(order_ids, &mut conn).await
    }

    async fn fetch_status_history(&self, order_id: &OrderId) -> Result<Vec<StatusHistoryEntry>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_status_history(order_id, &mut conn).await
    }

    /// The status write and the history append commit together or not at all.
    async fn update_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatusType,
        change: StatusChange,
    ) -> Result<bool, Self::Error> {
        let mut tx = self.pool.begin().await?;
        let touched = orders::set_order_status(order_id, status, &change.message, &mut tx).await?;
        if touched == 0 {
            trace!("🗃️ Order {order_id} not found. Nothing written.");
            return Ok(false);
        }
        orders::insert_history_entry(order_id, &change, &mut tx).await?;
        tx.commit().await?;
        trace!("🗃️ Order {order_id} moved to {status}");
        Ok(true)
    }

    async fn assign_delivery_partner(
        &self,
        order_id: &OrderId,
        partner_id: &str,
        change: StatusChange,
    ) -> Result<bool, Self::Error> {
        let mut tx = self.pool.begin().await?;
        let touched = orders::set_partner_assignment(order_id, partner_id, &change.message, &mut tx).await?;
        if touched == 0 {
            trace!("🗃️ Order {order_id} not found. Assignment not written.");
            return Ok(false);
        }
        orders::insert_history_entry(order_id, &change, &mut tx).await?;
        tx.commit().await?;
        trace!("🗃️ Order {order_id} assigned to partner {partner_id}");
        Ok(true)
    }
}

impl UserDirectory for SqliteDatabase {
    type Error = SqliteDatabaseError;

    async fn fetch_user(&self, user_id: &str) -> Result<Option<User>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user(user_id, &mut conn).await
    }

    async fn fetch_users_by_ids(&self, user_ids: &[String]) -> Result<Vec<User>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_users_by_ids(user_ids, &mut conn).await
    }

    async fn count_customers(&self, audience: &CustomerAudience) -> Result<i64, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        users::count_customers(audience, &mut conn).await
    }
}

impl ProductCatalog for SqliteDatabase {
    type Error = SqliteDatabaseError;

    async fn fetch_products_by_ids(&self, product_ids: &[String]) -> Result<Vec<Product>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        products::fetch_products_by_ids(product_ids, &mut conn).await
    }
}

impl NotificationManagement for SqliteDatabase {
    type Error = SqliteDatabaseError;

    async fn insert_notification(&self, notification: NewNotification) -> Result<String, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        notifications::insert_notification(notification, &mut conn).await
    }

    async fn fetch_notifications(
        &self,
        filter: &NotificationQueryFilter,
        window: QueryWindow,
    ) -> Result<Vec<Notification>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        notifications::fetch_notifications(filter, window, &mut conn).await
    }

    async fn count_notifications(&self, filter: &NotificationQueryFilter) -> Result<i64, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        notifications::count_notifications(filter, &mut conn).await
    }

    async fn fetch_admin_notification(&self, notification_id: &str) -> Result<Option<Notification>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        notifications::fetch_admin_notification(notification_id, &mut conn).await
    }

    async fn delete_notification(&self, notification_id: &str) -> Result<bool, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        notifications::delete_notification(notification_id, &mut conn).await
    }

    async fn notification_type_counts(&self) -> Result<Vec<TypeCount>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        notifications::notification_type_counts(&mut conn).await
    }
}

impl ShopStatusManagement for SqliteDatabase {
    type Error = SqliteDatabaseError;

    async fn fetch_shop_status(&self) -> Result<Option<ShopStatus>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        shop_status::fetch_shop_status(&mut conn).await
    }

    async fn upsert_shop_status(&self, status: &ShopStatus) -> Result<(), Self::Error> {
        let mut conn = self.pool.acquire().await?;
        shop_status::upsert_shop_status(status, &mut conn).await
    }
}
