use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::NotificationAudience;

//--------------------------------------NotificationQueryFilter------------------------------------------------------
/// Typed filter over admin-created notifications. Also reused internally for the statistics
/// counts, which partition on audience and read state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationQueryFilter {
    /// Free-form type tag to match exactly.
    pub kind: Option<String>,
    pub audience: Option<NotificationAudience>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub read: Option<bool>,
}

impl NotificationQueryFilter {
    pub fn with_kind<S: Into<String>>(mut self, kind: S) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_audience(mut self, audience: NotificationAudience) -> Self {
        self.audience = Some(audience);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn with_read(mut self, read: bool) -> Self {
        self.read = Some(read);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.audience.is_none()
            && self.since.is_none()
            && self.until.is_none()
            && self.read.is_none()
    }
}

//--------------------------------------  NotificationView     -------------------------------------------------------
/// A notification as listed to the admin frontend, with the recipient reference resolved and the
/// creation time already in display form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationView {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "for")]
    pub audience: NotificationAudience,
    /// Display-timezone string, precomputed at creation time where available.
    pub created_at: String,
    pub created_by: String,
    pub order_id: Option<String>,
    pub user_id: Option<String>,
    pub user_name: String,
    pub user_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_count: Option<i64>,
}

//--------------------------------------   NotificationList    -------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationList {
    pub notifications: Vec<NotificationView>,
    pub total: i64,
    pub skip: i64,
    pub limit: i64,
}

//--------------------------------------   NotificationStats   -------------------------------------------------------
/// Counts partitioned by audience mode and, for targeted notifications, by read state, plus a
/// per-type-tag breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationStats {
    pub total: i64,
    pub broadcast: i64,
    pub single_user: i64,
    pub unread: i64,
    pub read: i64,
    pub by_type: BTreeMap<String, i64>,
}

//--------------------------------------       TypeCount       -------------------------------------------------------
/// One bucket of the grouped per-type count.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TypeCount {
    pub kind: String,
    pub count: i64,
}

//--------------------------------------TargetedNotificationRequest---------------------------------------------------
/// Boundary-validated input for sending a notification to one user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetedNotificationRequest {
    pub user_id: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub order_id: Option<String>,
}

//-------------------------------------- BroadcastNotificationRequest ------------------------------------------------
/// Boundary-validated input for a broadcast notification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BroadcastNotificationRequest {
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub user_filter: crate::db_types::CustomerAudience,
}

//--------------------------------------  NotificationReceipt  -------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationReceipt {
    pub notification_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_count: Option<i64>,
}
