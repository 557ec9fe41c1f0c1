//! Maps parsed commands onto engine API calls and shapes the JSON replies.
//!
//! Every handler returns exactly one payload for the calling session. Error mapping is uniform:
//! validation and not-found errors surface with their own message, while unexpected storage
//! failures are logged server-side in full and surfaced as a generic failure string.

use log::*;
use serde_json::{json, Value};
use shop_admin_engine::{
    db_types::{OrderId, OrderStatusType, ShopStatus},
    NotificationApi, NotificationApiError, OrderAdminApi, OrderApiError, ShopStatusApi, ShopStatusApiError,
    ShopStatusUpdate, SqliteDatabase,
};

use crate::{
    cache::ShopStatusCache,
    messages::{
        error_message, parse_command, AssignPartnerParams, DeleteNotificationParams, NotificationFilterParams,
        OrderFilterParams, ShopStatusParams, UpdateOrderStatusParams, WsCommand,
    },
    registry::{AdminInfo, AdminRegistry},
};

/// Everything a session handler needs, shared by all connections.
pub struct AppState {
    pub orders: OrderAdminApi<SqliteDatabase>,
    pub notifications: NotificationApi<SqliteDatabase>,
    pub shop_status: ShopStatusApi<SqliteDatabase>,
    pub registry: AdminRegistry,
    pub shop_cache: ShopStatusCache,
}

/// Handles one inbound frame and returns the reply payload for the calling session.
pub async fn dispatch(state: &AppState, admin: &AdminInfo, raw: &str) -> Value {
    let command = match parse_command(raw) {
        Ok(command) => command,
        Err(message) => {
            warn!("💻️ {message}");
            return error_message(message);
        },
    };
    match command {
        WsCommand::Ping => json!({ "type": "pong" }),
        WsCommand::GetOrders { filters } => get_orders(state, &filters).await,
        WsCommand::GetOrdersDownload { filters } => get_orders_download(state, &filters).await,
        WsCommand::UpdateOrderStatus { data } => update_order_status(state, admin, data).await,
        WsCommand::AssignDeliveryPartner { data } => assign_delivery_partner(state, admin, data).await,
        WsCommand::GetNotifications { filters } => get_notifications(state, &filters).await,
        WsCommand::SendNotification { data } => match state.notifications.send_to_user(data, &admin.email).await {
            Ok(receipt) => json!({ "type": "notification_sent", "message": receipt.message }),
            Err(e) => notification_error(e, "Failed to send notification"),
        },
        WsCommand::BroadcastNotification { data } => match state.notifications.broadcast(data, &admin.email).await {
            Ok(receipt) => json!({
                "type": "notification_broadcast_sent",
                "message": receipt.message,
                "user_count": receipt.user_count,
            }),
            Err(e) => notification_error(e, "Failed to send broadcast notification"),
        },
        WsCommand::DeleteNotification { data } => delete_notification(state, data).await,
        WsCommand::GetNotificationStats => match state.notifications.stats().await {
            Ok(stats) => json!({ "type": "notification_stats", "stats": stats }),
            Err(e) => notification_error(e, "Failed to fetch notification stats"),
        },
        WsCommand::GetShopStatus => get_shop_status(state).await,
        WsCommand::UpdateShopStatus { data } => update_shop_status(state, admin, data).await,
    }
}

//--------------------------------------        Orders         -------------------------------------------------------

async fn get_orders(state: &AppState, params: &OrderFilterParams) -> Value {
    let filter = params.filter();
    match state.orders.list_orders(&filter, params.pagination()).await {
        Ok(page) => json!({
            "type": "orders_data",
            "channel": "orders",
            "orders": page.orders,
            "pagination": page.pagination,
        }),
        Err(e) => order_error(e, "Failed to fetch orders"),
    }
}

async fn get_orders_download(state: &AppState, params: &OrderFilterParams) -> Value {
    let filter = params.filter();
    match state.orders.orders_for_download(&filter).await {
        Ok(download) => json!({
            "type": "orders_download_data",
            "orders": download.orders,
            "total_count": download.total_count,
        }),
        Err(e) => order_error(e, "Failed to fetch orders for download"),
    }
}

async fn update_order_status(state: &AppState, admin: &AdminInfo, data: UpdateOrderStatusParams) -> Value {
    let (order_id, status) = match (data.order_id, data.status) {
        (Some(order_id), Some(status)) if !order_id.is_empty() && !status.is_empty() => (order_id, status),
        _ => return error_message("Order ID and status are required"),
    };
    let status = match status.parse::<OrderStatusType>() {
        Ok(status) => status,
        Err(e) => return error_message(e),
    };
    let oid = OrderId::from(order_id.clone());
    match state.orders.update_order_status(&oid, status, Some(admin.name.as_str())).await {
        Ok(()) => json!({ "type": "order_updated", "success": true, "order_id": order_id }),
        Err(e) => order_error(e, "Failed to update order status"),
    }
}

async fn assign_delivery_partner(state: &AppState, admin: &AdminInfo, data: AssignPartnerParams) -> Value {
    let (order_id, partner_id) = match (data.order_id, data.delivery_partner_id) {
        (Some(order_id), Some(partner_id)) if !order_id.is_empty() && !partner_id.is_empty() => {
            (order_id, partner_id)
        },
        _ => return error_message("Order ID and delivery partner ID are required"),
    };
    let admin_name = data.admin_name.unwrap_or_else(|| admin.name.clone());
    let oid = OrderId::from(order_id);
    match state.orders.assign_delivery_partner(&oid, &partner_id, &admin_name).await {
        Ok(receipt) => json!({ "type": "order_assigned", "success": true, "data": receipt }),
        Err(e) => order_error(e, "Failed to assign delivery partner"),
    }
}

//--------------------------------------     Notifications     -------------------------------------------------------

async fn get_notifications(state: &AppState, params: &NotificationFilterParams) -> Value {
    match state.notifications.list_notifications(&params.filter(), params.window()).await {
        Ok(list) => json!({
            "type": "notifications_data",
            "notifications": list.notifications,
            "total": list.total,
            "skip": list.skip,
            "limit": list.limit,
        }),
        Err(e) => notification_error(e, "Failed to fetch notifications"),
    }
}

async fn delete_notification(state: &AppState, data: DeleteNotificationParams) -> Value {
    let Some(notification_id) = data.notification_id.filter(|id| !id.is_empty()) else {
        return error_message("Notification ID is required");
    };
    match state.notifications.delete(&notification_id).await {
        Ok(()) => json!({
            "type": "notification_deleted",
            "message": "Notification deleted successfully",
            "notification_id": notification_id,
        }),
        Err(e) => notification_error(e, "Failed to delete notification"),
    }
}

//--------------------------------------      Shop status      -------------------------------------------------------

async fn get_shop_status(state: &AppState) -> Value {
    if let Some(status) = state.shop_cache.get().await {
        trace!("💻️ Shop status served from cache");
        return shop_status_payload("shop_status", &status);
    }
    match state.shop_status.get().await {
        Ok(status) => {
            state.shop_cache.set(status.clone()).await;
            shop_status_payload("shop_status", &status)
        },
        Err(e) => shop_status_error(e, "Failed to get shop status"),
    }
}

async fn update_shop_status(state: &AppState, admin: &AdminInfo, data: ShopStatusParams) -> Value {
    let Some(is_open) = data.is_open else {
        return error_message(ShopStatusApiError::MissingOpenFlag);
    };
    let reopen_time = match data.reopen_time.as_deref().filter(|raw| !raw.is_empty()) {
        Some(raw) => match chrono::DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => Some(dt.with_timezone(&chrono::Utc)),
            Err(_) => return error_message("Invalid datetime format for reopen_time"),
        },
        None => None,
    };
    let update = ShopStatusUpdate { is_open, reopen_time, reason: data.reason };
    match state.shop_status.update(update, &admin.email).await {
        Ok(status) => {
            // Both side effects are best-effort. The broadcast to other sessions rides on the
            // engine's change event; the cache entry goes here.
            state.shop_cache.invalidate().await;
            let mut payload = shop_status_payload("shop_status_updated", &status);
            payload["message"] =
                json!(format!("Shop is now {}", if status.is_open { "open" } else { "closed" }));
            payload
        },
        Err(e) => shop_status_error(e, "Failed to update shop status"),
    }
}

fn shop_status_payload(tag: &str, status: &ShopStatus) -> Value {
    json!({
        "type": tag,
        "is_open": status.is_open,
        "reopen_time": status.reopen_time,
        "reason": status.reason,
        "updated_at": status.updated_at,
        "updated_by": status.updated_by,
    })
}

//--------------------------------------     Error mapping     -------------------------------------------------------

fn order_error(e: OrderApiError, generic: &str) -> Value {
    match e {
        OrderApiError::DatabaseError(detail) => {
            error!("💻️ {generic}: {detail}");
            error_message(generic)
        },
        other => error_message(other),
    }
}

fn notification_error(e: NotificationApiError, generic: &str) -> Value {
    match e {
        NotificationApiError::DatabaseError(detail) => {
            error!("💻️ {generic}: {detail}");
            error_message(generic)
        },
        other => error_message(other),
    }
}

fn shop_status_error(e: ShopStatusApiError, generic: &str) -> Value {
    match e {
        ShopStatusApiError::DatabaseError(detail) => {
            error!("💻️ {generic}: {detail}");
            error_message(generic)
        },
        other => error_message(other),
    }
}
