//! Status updates and delivery-partner assignment: conditional writes, history trail, and the
//! precondition checks.

use sag_common::Money;
use shop_admin_engine::{
    db_types::{OrderId, OrderStatusType, Role},
    test_utils::{prepare_test_env, random_db_path, seed},
    OrderAdminApi, OrderApiError, OrderManagement, SqliteDatabase,
};

async fn new_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

#[tokio::test]
async fn status_update_writes_order_and_history_together() {
    let db = new_db().await;
    seed::insert_user(db.pool(), "CUST001", "Asha", Role::Customer, true, true).await;
    seed::OrderSeed::new("ORD1", "CUST001", Money::from(10_000)).insert(db.pool()).await;
    let api = OrderAdminApi::new(db.clone());
    let oid = OrderId::from("ORD1".to_string());

    api.update_order_status(&oid, OrderStatusType::OutForDelivery, Some("priya@example.com")).await.unwrap();

    let order = db.fetch_order_by_order_id(&oid).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::OutForDelivery);
    assert_eq!(order.status_message.as_deref(), Some("Order is out for delivery"));

    let history = api.status_history(&oid).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, OrderStatusType::OutForDelivery);
    assert_eq!(history[0].changed_by.as_deref(), Some("priya@example.com"));
    assert!(history[0].partner_id.is_none());
}

#[tokio::test]
async fn status_update_on_missing_order_writes_nothing() {
    let db = new_db().await;
    let api = OrderAdminApi::new(db);
    let oid = OrderId::from("ORDMISSING".to_string());

    let err = api.update_order_status(&oid, OrderStatusType::Cancelled, None).await.unwrap_err();
    assert!(matches!(err, OrderApiError::OrderNotFound(_)));
    assert!(api.status_history(&oid).await.unwrap().is_empty());
}

#[tokio::test]
async fn assignment_sets_partner_status_and_history() {
    let db = new_db().await;
    seed::insert_user(db.pool(), "CUST001", "Asha", Role::Customer, true, true).await;
    seed::insert_user(db.pool(), "DLP001", "Ravi", Role::DeliveryPartner, true, true).await;
    seed::OrderSeed::new("ORD1", "CUST001", Money::from(10_000))
        .with_status(OrderStatusType::Assigning)
        .insert(db.pool())
        .await;
    let api = OrderAdminApi::new(db.clone());
    let oid = OrderId::from("ORD1".to_string());

    let receipt = api.assign_delivery_partner(&oid, "DLP001", "Priya").await.unwrap();
    assert_eq!(receipt.delivery_partner_id, "DLP001");
    assert_eq!(receipt.delivery_partner_name, "Ravi");
    assert_eq!(receipt.status, OrderStatusType::Assigned);

    let order = db.fetch_order_by_order_id(&oid).await.unwrap().unwrap();
    assert_eq!(order.delivery_partner_id.as_deref(), Some("DLP001"));
    assert_eq!(order.status, OrderStatusType::Assigned);
    assert!(order.assigned_at.is_some());
    assert_eq!(order.status_message.as_deref(), Some("Order assigned to Ravi by Priya"));

    let history = api.status_history(&oid).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].changed_by.as_deref(), Some("Priya"));
    assert_eq!(history[0].partner_id.as_deref(), Some("DLP001"));
    assert_eq!(history[0].partner_name.as_deref(), Some("Ravi"));
}

#[tokio::test]
async fn assignment_to_missing_order_never_creates_history() {
    let db = new_db().await;
    seed::insert_user(db.pool(), "DLP001", "Ravi", Role::DeliveryPartner, true, true).await;
    let api = OrderAdminApi::new(db);
    let oid = OrderId::from("ORDMISSING".to_string());

    let err = api.assign_delivery_partner(&oid, "DLP001", "Priya").await.unwrap_err();
    assert!(matches!(err, OrderApiError::OrderNotFound(_)));
    assert!(api.status_history(&oid).await.unwrap().is_empty());
}

#[tokio::test]
async fn assignment_requires_partner_role() {
    let db = new_db().await;
    seed::insert_user(db.pool(), "CUST001", "Asha", Role::Customer, true, true).await;
    seed::insert_user(db.pool(), "CUST002", "Vikram", Role::Customer, true, true).await;
    seed::OrderSeed::new("ORD1", "CUST001", Money::from(10_000)).insert(db.pool()).await;
    let api = OrderAdminApi::new(db.clone());
    let oid = OrderId::from("ORD1".to_string());

    let err = api.assign_delivery_partner(&oid, "CUST002", "Priya").await.unwrap_err();
    assert!(matches!(err, OrderApiError::PartnerNotFound(_)));

    // Precondition failure is a discrete error: the order is untouched.
    let order = db.fetch_order_by_order_id(&oid).await.unwrap().unwrap();
    assert!(order.delivery_partner_id.is_none());
    assert_eq!(order.status, OrderStatusType::Pending);
    assert!(api.status_history(&oid).await.unwrap().is_empty());
}

#[tokio::test]
async fn assignment_requires_active_partner() {
    let db = new_db().await;
    seed::insert_user(db.pool(), "CUST001", "Asha", Role::Customer, true, true).await;
    seed::insert_user(db.pool(), "DLP001", "Ravi", Role::DeliveryPartner, false, true).await;
    seed::OrderSeed::new("ORD1", "CUST001", Money::from(10_000)).insert(db.pool()).await;
    let api = OrderAdminApi::new(db.clone());
    let oid = OrderId::from("ORD1".to_string());

    let err = api.assign_delivery_partner(&oid, "DLP001", "Priya").await.unwrap_err();
    assert!(matches!(err, OrderApiError::PartnerNotFound(_)));
    let order = db.fetch_order_by_order_id(&oid).await.unwrap().unwrap();
    assert!(order.delivery_partner_id.is_none());
}

#[tokio::test]
async fn competing_updates_are_last_write_wins_with_both_histories() {
    let db = new_db().await;
    seed::insert_user(db.pool(), "CUST001", "Asha", Role::Customer, true, true).await;
    seed::OrderSeed::new("ORD1", "CUST001", Money::from(10_000)).insert(db.pool()).await;
    let api = OrderAdminApi::new(db.clone());
    let oid = OrderId::from("ORD1".to_string());

    // Two admins act on the same order; there is no conflict detection. The second write wins
    // and both history entries survive.
    api.update_order_status(&oid, OrderStatusType::Preparing, Some("admin-a")).await.unwrap();
    api.update_order_status(&oid, OrderStatusType::Cancelled, Some("admin-b")).await.unwrap();

    let order = db.fetch_order_by_order_id(&oid).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::Cancelled);
    let history = api.status_history(&oid).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status, OrderStatusType::Preparing);
    assert_eq!(history[1].status, OrderStatusType::Cancelled);
}
