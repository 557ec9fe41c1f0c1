use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt::Debug,
};

use log::*;

use crate::{
    admin_api::{
        errors::NotificationApiError,
        notification_objects::{
            BroadcastNotificationRequest, NotificationList, NotificationQueryFilter, NotificationReceipt,
            NotificationStats, NotificationView, TargetedNotificationRequest,
        },
        order_objects::QueryWindow,
    },
    db::traits::{NotificationManagement, UserDirectory},
    db_types::{CustomerAudience, NewNotification, Notification, NotificationAudience, User},
    helpers::display_time,
};

/// Default window size for the notification listing.
pub const DEFAULT_NOTIFICATION_LIMIT: i64 = 50;

/// `NotificationApi` covers the admin notification workflow: targeted and broadcast creation,
/// the filtered listing, statistics, and deletion.
pub struct NotificationApi<B> {
    db: B,
}

impl<B> Debug for NotificationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NotificationApi")
    }
}

impl<B> NotificationApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> NotificationApi<B>
where B: NotificationManagement + UserDirectory
{
    /// Lists admin-created notifications matching the filter, newest first, with recipient
    /// references resolved for display.
    pub async fn list_notifications(
        &self,
        filter: &NotificationQueryFilter,
        window: QueryWindow,
    ) -> Result<NotificationList, NotificationApiError> {
        let notifications = self
            .db
            .fetch_notifications(filter, window)
            .await
            .map_err(|e| NotificationApiError::DatabaseError(e.to_string()))?;
        let total =
            self.db.count_notifications(filter).await.map_err(|e| NotificationApiError::DatabaseError(e.to_string()))?;

        let user_ids: BTreeSet<String> = notifications
            .iter()
            .filter(|n| n.audience == NotificationAudience::SpecificUser)
            .filter_map(|n| n.user_id.clone())
            .collect();
        let user_ids: Vec<String> = user_ids.into_iter().collect();
        let users: HashMap<String, User> = self
            .db
            .fetch_users_by_ids(&user_ids)
            .await
            .map_err(|e| NotificationApiError::DatabaseError(e.to_string()))?
            .into_iter()
            .map(|u| (u.user_id.clone(), u))
            .collect();

        // One live audience count covers every broadcast row in the response.
        let broadcast_count = if notifications.iter().any(|n| n.audience == NotificationAudience::AllUsers) {
            Some(
                self.db
                    .count_customers(&CustomerAudience::default())
                    .await
                    .map_err(|e| NotificationApiError::DatabaseError(e.to_string()))?,
            )
        } else {
            None
        };

        let views = notifications.into_iter().map(|n| view_for(n, &users, broadcast_count)).collect::<Vec<_>>();
        debug!("🛎️ Returning {} of {total} admin notifications", views.len());
        Ok(NotificationList { notifications: views, total, skip: window.skip, limit: window.limit })
    }

    /// Sends a notification to a single user. The recipient must exist; all three of user id,
    /// title and message are required.
    pub async fn send_to_user(
        &self,
        request: TargetedNotificationRequest,
        created_by: &str,
    ) -> Result<NotificationReceipt, NotificationApiError> {
        let (user_id, title, message) = match (
            non_empty(request.user_id),
            non_empty(request.title),
            non_empty(request.message),
        ) {
            (Some(u), Some(t), Some(m)) => (u, t, m),
            _ => return Err(NotificationApiError::MissingFields("User ID, title, and message")),
        };
        let user = self
            .db
            .fetch_user(&user_id)
            .await
            .map_err(|e| NotificationApiError::DatabaseError(e.to_string()))?
            .ok_or(NotificationApiError::RecipientNotFound(user_id.clone()))?;

        let mut notification = NewNotification::targeted(user_id.clone(), title, message, created_by.to_string());
        if let Some(kind) = non_empty(request.kind) {
            notification = notification.with_kind(kind);
        }
        if let Some(order_id) = non_empty(request.order_id) {
            notification = notification.with_order_id(order_id);
        }
        let notification_id = self
            .db
            .insert_notification(notification)
            .await
            .map_err(|e| NotificationApiError::DatabaseError(e.to_string()))?;
        info!("🛎️ Admin {created_by} sent notification {notification_id} to user {user_id}");
        Ok(NotificationReceipt {
            notification_id,
            message: format!("Notification sent to {}", user.name),
            user_count: None,
        })
    }

    /// Creates a single broadcast notification addressed to an audience snapshot. The audience
    /// size is counted now and stored on the document; no per-recipient rows are materialised.
    /// An empty audience is a validation error and nothing is stored.
    pub async fn broadcast(
        &self,
        request: BroadcastNotificationRequest,
        created_by: &str,
    ) -> Result<NotificationReceipt, NotificationApiError> {
        let (title, message) = match (non_empty(request.title), non_empty(request.message)) {
            (Some(t), Some(m)) => (t, m),
            _ => return Err(NotificationApiError::MissingFields("Title and message")),
        };
        let audience_size = self
            .db
            .count_customers(&request.user_filter)
            .await
            .map_err(|e| NotificationApiError::DatabaseError(e.to_string()))?;
        if audience_size == 0 {
            return Err(NotificationApiError::EmptyAudience);
        }
        let mut notification = NewNotification::broadcast(title, message, audience_size, created_by.to_string());
        if let Some(kind) = non_empty(request.kind) {
            notification = notification.with_kind(kind);
        }
        let notification_id = self
            .db
            .insert_notification(notification)
            .await
            .map_err(|e| NotificationApiError::DatabaseError(e.to_string()))?;
        info!("🛎️ Admin {created_by} created broadcast notification {notification_id} for {audience_size} users");
        Ok(NotificationReceipt {
            notification_id,
            message: format!("Notification will be shown to {audience_size} users"),
            user_count: Some(audience_size),
        })
    }

    /// Deletes a notification. Only notifications created by an admin actor can be deleted, and a
    /// missing row and a non-admin row produce the same error.
    pub async fn delete(&self, notification_id: &str) -> Result<(), NotificationApiError> {
        let notification = self
            .db
            .fetch_admin_notification(notification_id)
            .await
            .map_err(|e| NotificationApiError::DatabaseError(e.to_string()))?
            .ok_or(NotificationApiError::NotFoundOrNotAuthorized)?;
        let deleted = self
            .db
            .delete_notification(&notification.notification_id)
            .await
            .map_err(|e| NotificationApiError::DatabaseError(e.to_string()))?;
        if !deleted {
            return Err(NotificationApiError::NotFoundOrNotAuthorized);
        }
        info!("🛎️ Notification {notification_id} deleted");
        Ok(())
    }

    /// Counts partitioned by audience mode and, for targeted notifications, read state, plus the
    /// grouped per-type breakdown.
    pub async fn stats(&self) -> Result<NotificationStats, NotificationApiError> {
        let db_err = |e: <B as NotificationManagement>::Error| NotificationApiError::DatabaseError(e.to_string());
        let all = NotificationQueryFilter::default();
        let broadcast = NotificationQueryFilter::default().with_audience(NotificationAudience::AllUsers);
        let single = NotificationQueryFilter::default().with_audience(NotificationAudience::SpecificUser);
        let unread = single.clone().with_read(false);
        let read = single.clone().with_read(true);

        let total = self.db.count_notifications(&all).await.map_err(db_err)?;
        let broadcast = self.db.count_notifications(&broadcast).await.map_err(db_err)?;
        let single_user = self.db.count_notifications(&single).await.map_err(db_err)?;
        let unread = self.db.count_notifications(&unread).await.map_err(db_err)?;
        let read = self.db.count_notifications(&read).await.map_err(db_err)?;
        let by_type: BTreeMap<String, i64> =
            self.db.notification_type_counts().await.map_err(db_err)?.into_iter().map(|t| (t.kind, t.count)).collect();

        Ok(NotificationStats { total, broadcast, single_user, unread, read, by_type })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Shapes one stored notification for the listing. The display time prefers the string stored at
/// creation; only records that predate it fall back to converting the UTC instant.
fn view_for(
    notification: Notification,
    users: &HashMap<String, User>,
    broadcast_count: Option<i64>,
) -> NotificationView {
    let created_at = notification
        .created_at_display
        .clone()
        .unwrap_or_else(|| display_time::format_display(notification.created_at));
    match notification.audience {
        NotificationAudience::AllUsers => NotificationView {
            id: notification.notification_id,
            title: notification.title,
            message: notification.message,
            kind: notification.kind,
            audience: notification.audience,
            created_at,
            created_by: notification.created_by,
            order_id: notification.order_id,
            user_id: None,
            user_name: "All Users".to_string(),
            user_email: "Broadcast".to_string(),
            recipient_count: broadcast_count,
        },
        NotificationAudience::SpecificUser => {
            let user = notification.user_id.as_deref().and_then(|id| users.get(id));
            NotificationView {
                id: notification.notification_id,
                title: notification.title,
                message: notification.message,
                kind: notification.kind,
                audience: notification.audience,
                created_at,
                created_by: notification.created_by,
                order_id: notification.order_id,
                user_name: user.map(|u| u.name.clone()).unwrap_or_else(|| "User Deleted".to_string()),
                user_email: user.map(|u| u.email.clone()).unwrap_or_else(|| "N/A".to_string()),
                user_id: notification.user_id,
                recipient_count: None,
            }
        },
    }
}
