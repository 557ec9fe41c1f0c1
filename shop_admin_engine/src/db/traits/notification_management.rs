use crate::{
    admin_api::{
        notification_objects::{NotificationQueryFilter, TypeCount},
        order_objects::QueryWindow,
    },
    db_types::{NewNotification, Notification},
};

/// Storage operations for admin-created notifications.
#[allow(async_fn_in_trait)]
pub trait NotificationManagement: Clone {
    type Error: std::error::Error;

    /// Stores a new notification and returns its external id. Exactly one document is stored per
    /// call, broadcast or not.
    async fn insert_notification(&self, notification: NewNotification) -> Result<String, Self::Error>;

    /// Fetches admin-created notifications matching the filter, newest first.
    async fn fetch_notifications(
        &self,
        filter: &NotificationQueryFilter,
        window: QueryWindow,
    ) -> Result<Vec<Notification>, Self::Error>;

    /// Counts admin-created notifications matching the filter.
    async fn count_notifications(&self, filter: &NotificationQueryFilter) -> Result<i64, Self::Error>;

    /// Fetches a notification by external id, but only if it was created by an admin actor.
    /// Non-admin notifications are invisible through this call.
    async fn fetch_admin_notification(&self, notification_id: &str) -> Result<Option<Notification>, Self::Error>;

    /// Deletes a notification by external id. Returns `false` if nothing was deleted.
    async fn delete_notification(&self, notification_id: &str) -> Result<bool, Self::Error>;

    /// Grouped count of admin-created notifications per type tag.
    async fn notification_type_counts(&self) -> Result<Vec<TypeCount>, Self::Error>;
}
