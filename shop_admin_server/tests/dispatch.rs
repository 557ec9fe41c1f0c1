//! End-to-end dispatch tests: raw JSON frames in, JSON payloads out, against a real database.

use std::time::Duration;

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use sag_common::Money;
use shop_admin_engine::{
    db_types::{OrderId, OrderStatusType, Role},
    events::EventProducers,
    test_utils::{prepare_test_env, random_db_path, seed},
    NotificationApi, OrderAdminApi, OrderManagement, ShopStatusApi, SqliteDatabase,
};
use shop_admin_server::{
    cache::ShopStatusCache,
    dispatch::{dispatch, AppState},
    registry::{AdminInfo, AdminRegistry},
};

async fn new_state() -> (AppState, SqliteDatabase) {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    let state = AppState {
        orders: OrderAdminApi::new(db.clone()),
        notifications: NotificationApi::new(db.clone()),
        shop_status: ShopStatusApi::new(db.clone(), EventProducers::default()),
        registry: AdminRegistry::new(),
        shop_cache: ShopStatusCache::new(true, Duration::from_secs(300)),
    };
    (state, db)
}

fn admin() -> AdminInfo {
    AdminInfo { email: "admin@example.com".to_string(), name: "Priya".to_string() }
}

#[tokio::test]
async fn ping_and_unknown_tags() {
    let (state, _db) = new_state().await;
    let reply = dispatch(&state, &admin(), r#"{"type":"ping"}"#).await;
    assert_eq!(reply["type"], "pong");

    let reply = dispatch(&state, &admin(), r#"{"type":"get_coupons"}"#).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["message"], "Unknown message type: get_coupons");

    let reply = dispatch(&state, &admin(), "not json at all").await;
    assert_eq!(reply["type"], "error");
}

#[tokio::test]
async fn orders_page_over_the_wire() {
    let (state, db) = new_state().await;
    seed::insert_user(db.pool(), "CUST001", "Asha", Role::Customer, true, true).await;
    let base = Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap();
    for i in 0..25i64 {
        seed::OrderSeed::new(&format!("ORD2025011000{i:02}"), "CUST001", Money::from(10_000))
            .with_created_at(base + ChronoDuration::minutes(i))
            .insert(db.pool())
            .await;
    }

    let frame = r#"{"type":"get_orders","filters":{"status":"all","page":1,"limit":10}}"#;
    let reply = dispatch(&state, &admin(), frame).await;
    assert_eq!(reply["type"], "orders_data");
    assert_eq!(reply["orders"].as_array().unwrap().len(), 10);
    assert_eq!(reply["pagination"]["total_pages"], 3);
    assert_eq!(reply["pagination"]["total_orders"], 25);
    assert_eq!(reply["pagination"]["has_next"], true);
    assert_eq!(reply["pagination"]["has_prev"], false);

    // Malformed range filters are dropped, not fatal: the query still matches everything.
    let frame = r#"{"type":"get_orders","filters":{"min_amount":"lots","from_date":"yesterday-ish"}}"#;
    let reply = dispatch(&state, &admin(), frame).await;
    assert_eq!(reply["type"], "orders_data");
    assert_eq!(reply["pagination"]["total_orders"], 25);
}

#[tokio::test]
async fn order_download_over_the_wire() {
    let (state, db) = new_state().await;
    seed::insert_user(db.pool(), "CUST001", "Asha", Role::Customer, true, true).await;
    seed::OrderSeed::new("ORD1", "CUST001", Money::from(10_000))
        .with_address(r#"{"city":"Bengaluru"}"#)
        .insert(db.pool())
        .await;

    let reply = dispatch(&state, &admin(), r#"{"type":"get_orders_download","filters":{}}"#).await;
    assert_eq!(reply["type"], "orders_download_data");
    assert_eq!(reply["total_count"], 1);
    assert_eq!(reply["orders"][0]["delivery_address"]["city"], "Bengaluru");
}

#[tokio::test]
async fn order_status_update_validation_and_success() {
    let (state, db) = new_state().await;
    seed::insert_user(db.pool(), "CUST001", "Asha", Role::Customer, true, true).await;
    seed::OrderSeed::new("ORD1", "CUST001", Money::from(10_000)).insert(db.pool()).await;

    let reply = dispatch(&state, &admin(), r#"{"type":"update_order_status","data":{"status":"confirmed"}}"#).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["message"], "Order ID and status are required");

    let frame = r#"{"type":"update_order_status","data":{"orderId":"ORD1","status":"out_for_delivery"}}"#;
    let reply = dispatch(&state, &admin(), frame).await;
    assert_eq!(reply["type"], "order_updated");
    assert_eq!(reply["success"], true);
    assert_eq!(reply["order_id"], "ORD1");

    let order = db.fetch_order_by_order_id(&OrderId::from("ORD1".to_string())).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::OutForDelivery);

    let frame = r#"{"type":"update_order_status","data":{"order_id":"ORDNOPE","status":"confirmed"}}"#;
    let reply = dispatch(&state, &admin(), frame).await;
    assert_eq!(reply["type"], "error");
}

#[tokio::test]
async fn assignment_with_wrong_role_partner_changes_nothing() {
    let (state, db) = new_state().await;
    seed::insert_user(db.pool(), "CUST001", "Asha", Role::Customer, true, true).await;
    seed::insert_user(db.pool(), "CUST002", "Vikram", Role::Customer, true, true).await;
    seed::insert_user(db.pool(), "DLP001", "Ravi", Role::DeliveryPartner, true, true).await;
    seed::OrderSeed::new("ORD1", "CUST001", Money::from(10_000)).insert(db.pool()).await;

    let frame = r#"{"type":"assign_delivery_partner","data":{"order_id":"ORD1","delivery_partner_id":"CUST002"}}"#;
    let reply = dispatch(&state, &admin(), frame).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["message"], "Delivery partner not found or inactive: CUST002");
    let order = db.fetch_order_by_order_id(&OrderId::from("ORD1".to_string())).await.unwrap().unwrap();
    assert!(order.delivery_partner_id.is_none());

    let frame = r#"{"type":"assign_delivery_partner","data":{"order_id":"ORD1","delivery_partner_id":"DLP001","admin_name":"Priya"}}"#;
    let reply = dispatch(&state, &admin(), frame).await;
    assert_eq!(reply["type"], "order_assigned");
    assert_eq!(reply["success"], true);
    assert_eq!(reply["data"]["delivery_partner_name"], "Ravi");
    assert_eq!(reply["data"]["status"], "assigned");
}

#[tokio::test]
async fn shop_status_round_trip_with_validation() {
    let (state, _db) = new_state().await;

    // First read lazily creates the default document.
    let reply = dispatch(&state, &admin(), r#"{"type":"get_shop_status"}"#).await;
    assert_eq!(reply["type"], "shop_status");
    assert_eq!(reply["is_open"], true);

    let reply = dispatch(&state, &admin(), r#"{"type":"update_shop_status","data":{"reason":"x"}}"#).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["message"], "is_open field is required");

    let frame = r#"{"type":"update_shop_status","data":{"is_open":false,"reopen_time":"soon"}}"#;
    let reply = dispatch(&state, &admin(), frame).await;
    assert_eq!(reply["message"], "Invalid datetime format for reopen_time");

    let past = (Utc::now() - ChronoDuration::hours(1)).to_rfc3339();
    let frame = format!(r#"{{"type":"update_shop_status","data":{{"is_open":false,"reopen_time":"{past}"}}}}"#);
    let reply = dispatch(&state, &admin(), &frame).await;
    assert_eq!(reply["message"], "Reopen time must be in the future");

    let future = (Utc::now() + ChronoDuration::hours(3)).to_rfc3339();
    let frame = format!(
        r#"{{"type":"update_shop_status","data":{{"is_open":false,"reopen_time":"{future}","reason":"stocktake"}}}}"#
    );
    let reply = dispatch(&state, &admin(), &frame).await;
    assert_eq!(reply["type"], "shop_status_updated");
    assert_eq!(reply["is_open"], false);
    assert_eq!(reply["reason"], "stocktake");
    assert_eq!(reply["updated_by"], "admin@example.com");
    assert_eq!(reply["message"], "Shop is now closed");

    // The cached entry was invalidated by the update, so the next read sees the new state.
    let reply = dispatch(&state, &admin(), r#"{"type":"get_shop_status"}"#).await;
    assert_eq!(reply["is_open"], false);
}

#[tokio::test]
async fn notification_flow_over_the_wire() {
    let (state, db) = new_state().await;
    seed::insert_user(db.pool(), "CUST001", "Asha", Role::Customer, true, true).await;

    let reply = dispatch(&state, &admin(), r#"{"type":"send_notification","data":{"title":"Hi"}}"#).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["message"], "User ID, title, and message are required");

    let frame = r#"{"type":"send_notification","data":{"user_id":"CUST001","title":"Hi","message":"Hello"}}"#;
    let reply = dispatch(&state, &admin(), frame).await;
    assert_eq!(reply["type"], "notification_sent");
    assert_eq!(reply["message"], "Notification sent to Asha");

    let frame = r#"{"type":"broadcast_notification","data":{"title":"Sale","message":"Everything must go"}}"#;
    let reply = dispatch(&state, &admin(), frame).await;
    assert_eq!(reply["type"], "notification_broadcast_sent");
    assert_eq!(reply["user_count"], 1);

    let reply = dispatch(&state, &admin(), r#"{"type":"get_notification_stats"}"#).await;
    assert_eq!(reply["type"], "notification_stats");
    assert_eq!(reply["stats"]["total"], 2);
    assert_eq!(reply["stats"]["broadcast"], 1);
    assert_eq!(reply["stats"]["single_user"], 1);

    let reply = dispatch(&state, &admin(), r#"{"type":"get_notifications","filters":{}}"#).await;
    assert_eq!(reply["type"], "notifications_data");
    assert_eq!(reply["total"], 2);
    let first_id = reply["notifications"][0]["id"].as_str().unwrap().to_string();

    let reply = dispatch(&state, &admin(), r#"{"type":"delete_notification","data":{}}"#).await;
    assert_eq!(reply["message"], "Notification ID is required");

    let frame = format!(r#"{{"type":"delete_notification","data":{{"notification_id":"{first_id}"}}}}"#);
    let reply = dispatch(&state, &admin(), &frame).await;
    assert_eq!(reply["type"], "notification_deleted");

    let reply = dispatch(&state, &admin(), &frame).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["message"], "Notification not found or not authorized");
}
