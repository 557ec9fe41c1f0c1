//! The wire-level message layer.
//!
//! Inbound messages are JSON objects carrying a `type` discriminator; they parse into the typed
//! [`WsCommand`] enum before any handler runs. Loose, user-supplied filter values (date strings,
//! amounts that may arrive as numbers or strings) are validated here, at the boundary: malformed
//! values are logged and dropped so the query still runs, exactly like absent filters.
//!
//! Outbound messages are JSON objects whose `type` is either an operation-specific success tag or
//! the generic `error` tag with a `message` string.

use std::fmt::Display;

use log::*;
use sag_common::Money;
use serde::Deserialize;
use serde_json::{json, Value};
use shop_admin_engine::{
    db_types::OrderStatusType,
    notification_objects::{BroadcastNotificationRequest, TargetedNotificationRequest},
    notifications_api::DEFAULT_NOTIFICATION_LIMIT,
    order_objects::{OrderQueryFilter, Pagination, QueryWindow, DEFAULT_PAGE_SIZE},
};

use chrono::{DateTime, Utc};

//--------------------------------------      WsCommand        -------------------------------------------------------
/// Every operation an admin session can request, selected by the message's `type` tag.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsCommand {
    Ping,
    GetOrders {
        #[serde(default)]
        filters: OrderFilterParams,
    },
    GetOrdersDownload {
        #[serde(default)]
        filters: OrderFilterParams,
    },
    UpdateOrderStatus {
        #[serde(default)]
        data: UpdateOrderStatusParams,
    },
    AssignDeliveryPartner {
        #[serde(default)]
        data: AssignPartnerParams,
    },
    GetNotifications {
        #[serde(default)]
        filters: NotificationFilterParams,
    },
    SendNotification {
        #[serde(default)]
        data: TargetedNotificationRequest,
    },
    BroadcastNotification {
        #[serde(default)]
        data: BroadcastNotificationRequest,
    },
    DeleteNotification {
        #[serde(default)]
        data: DeleteNotificationParams,
    },
    GetNotificationStats,
    GetShopStatus,
    UpdateShopStatus {
        #[serde(default)]
        data: ShopStatusParams,
    },
}

/// Parses a raw frame into a command. The error string is already user-facing.
pub fn parse_command(raw: &str) -> Result<WsCommand, String> {
    let value: Value = serde_json::from_str(raw).map_err(|e| format!("Message is not valid JSON: {e}"))?;
    let tag = value.get("type").and_then(Value::as_str).unwrap_or("<missing>").to_string();
    serde_json::from_value(value).map_err(|_| format!("Unknown message type: {tag}"))
}

//--------------------------------------   OrderFilterParams   -------------------------------------------------------
/// Raw order filters as sent by the frontend. Amounts may arrive as JSON numbers or strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilterParams {
    pub status: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub min_amount: Option<Value>,
    pub max_amount: Option<Value>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl OrderFilterParams {
    /// Builds the typed filter. Each malformed value is logged and dropped; it never aborts the
    /// query.
    pub fn filter(&self) -> OrderQueryFilter {
        let mut filter = OrderQueryFilter::default();
        if let Some(status) = &self.status {
            if status != "all" {
                match status.parse::<OrderStatusType>() {
                    Ok(status) => filter = filter.with_status(status),
                    Err(e) => warn!("💻️ Ignoring status filter: {e}"),
                }
            }
        }
        filter.since = self.from_date.as_deref().and_then(|raw| parse_instant("from_date", raw));
        filter.until = self.to_date.as_deref().and_then(|raw| parse_instant("to_date", raw));
        filter.min_total = self.min_amount.as_ref().and_then(|raw| parse_amount("min_amount", raw));
        filter.max_total = self.max_amount.as_ref().and_then(|raw| parse_amount("max_amount", raw));
        if let Some(search) = &self.search {
            filter = filter.with_search(search.as_str());
        }
        filter
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page.unwrap_or(1), self.limit.unwrap_or(DEFAULT_PAGE_SIZE))
    }
}

/// Parses an RFC 3339 instant, accepting a trailing `Z`. Malformed input is logged and dropped.
fn parse_instant(field: &str, raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            warn!("💻️ Invalid {field} format: {raw} ({e})");
            None
        },
    }
}

/// Accepts a rupee amount as a JSON number or a numeric string. Anything else is logged and
/// dropped.
fn parse_amount(field: &str, raw: &Value) -> Option<Money> {
    let rupees = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let Some(rupees) = rupees else {
        warn!("💻️ Invalid {field}: {raw}");
        return None;
    };
    match Money::from_rupees(rupees) {
        Ok(amount) => Some(amount),
        Err(e) => {
            warn!("💻️ Invalid {field}: {e}");
            None
        },
    }
}

//--------------------------------------NotificationFilterParams------------------------------------------------------
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationFilterParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(rename = "for")]
    pub audience: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl NotificationFilterParams {
    pub fn filter(&self) -> shop_admin_engine::notification_objects::NotificationQueryFilter {
        let mut filter = shop_admin_engine::notification_objects::NotificationQueryFilter::default();
        if let Some(kind) = &self.kind {
            filter = filter.with_kind(kind.clone());
        }
        if let Some(audience) = &self.audience {
            match audience.parse() {
                Ok(audience) => filter = filter.with_audience(audience),
                Err(e) => warn!("💻️ Ignoring audience filter: {e}"),
            }
        }
        filter.since = self.start_date.as_deref().and_then(|raw| parse_instant("start_date", raw));
        filter.until = self.end_date.as_deref().and_then(|raw| parse_instant("end_date", raw));
        filter
    }

    pub fn window(&self) -> QueryWindow {
        QueryWindow::new(self.skip.unwrap_or(0), self.limit.unwrap_or(DEFAULT_NOTIFICATION_LIMIT))
    }
}

//--------------------------------------  Mutation parameters  -------------------------------------------------------
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOrderStatusParams {
    #[serde(alias = "orderId")]
    pub order_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignPartnerParams {
    pub order_id: Option<String>,
    pub delivery_partner_id: Option<String>,
    pub admin_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteNotificationParams {
    pub notification_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShopStatusParams {
    pub is_open: Option<bool>,
    pub reopen_time: Option<String>,
    pub reason: Option<String>,
}

//--------------------------------------      Outbound         -------------------------------------------------------
/// The uniform wire-level error payload.
pub fn error_message<S: Display>(message: S) -> Value {
    json!({ "type": "error", "message": message.to_string() })
}
