//! Order listing, filtering, pagination and download behaviour against a real database.

use chrono::{Duration, TimeZone, Utc};
use sag_common::Money;
use shop_admin_engine::{
    db_types::{OrderStatusType, Role},
    order_objects::{OrderQueryFilter, Pagination},
    test_utils::{prepare_test_env, random_db_path, seed},
    OrderAdminApi, SqliteDatabase,
};

async fn new_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

#[tokio::test]
async fn twenty_five_orders_paginate_into_three_pages() {
    let db = new_db().await;
    seed::insert_user(db.pool(), "CUST001", "Asha", Role::Customer, true, true).await;
    let base = Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap();
    for i in 0..25i64 {
        seed::OrderSeed::new(&format!("ORD2025011000{i:02}"), "CUST001", Money::from(10_000 + i))
            .with_created_at(base + Duration::minutes(i))
            .insert(db.pool())
            .await;
    }
    let api = OrderAdminApi::new(db);

    let page = api.list_orders(&OrderQueryFilter::default(), Pagination::new(1, 10)).await.unwrap();
    assert_eq!(page.orders.len(), 10);
    assert_eq!(page.pagination.total_orders, 25);
    assert_eq!(page.pagination.total_pages, 3);
    assert!(page.pagination.has_next);
    assert!(!page.pagination.has_prev);

    // Most recent order first.
    assert_eq!(page.orders[0].id, "ORD202501100024");

    // Concatenating all pages reproduces the full match set, no duplicates or omissions.
    let mut seen = Vec::new();
    for p in 1..=3 {
        let page = api.list_orders(&OrderQueryFilter::default(), Pagination::new(p, 10)).await.unwrap();
        seen.extend(page.orders.into_iter().map(|o| o.id));
    }
    assert_eq!(seen.len(), 25);
    let mut deduped = seen.clone();
    deduped.dedup();
    assert_eq!(deduped.len(), 25);
    let mut sorted = seen.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(seen, sorted);

    let last = api.list_orders(&OrderQueryFilter::default(), Pagination::new(3, 10)).await.unwrap();
    assert_eq!(last.orders.len(), 5);
    assert!(!last.pagination.has_next);
    assert!(last.pagination.has_prev);
}

#[tokio::test]
async fn zero_matches_still_reports_one_empty_page() {
    let db = new_db().await;
    let api = OrderAdminApi::new(db);
    let page = api.list_orders(&OrderQueryFilter::default(), Pagination::new(1, 10)).await.unwrap();
    assert!(page.orders.is_empty());
    assert_eq!(page.pagination.total_pages, 1);
    assert_eq!(page.pagination.total_orders, 0);
    assert!(!page.pagination.has_next);
    assert!(!page.pagination.has_prev);
}

#[tokio::test]
async fn filters_combine_with_logical_and() {
    let db = new_db().await;
    seed::insert_user(db.pool(), "CUST001", "Asha", Role::Customer, true, true).await;
    let jan = Utc.with_ymd_and_hms(2025, 1, 5, 12, 0, 0).unwrap();
    let feb = Utc.with_ymd_and_hms(2025, 2, 5, 12, 0, 0).unwrap();
    seed::OrderSeed::new("ORDA", "CUST001", Money::from_rupees(150.0).unwrap())
        .with_status(OrderStatusType::Delivered)
        .with_created_at(jan)
        .insert(db.pool())
        .await;
    seed::OrderSeed::new("ORDB", "CUST001", Money::from_rupees(900.0).unwrap())
        .with_status(OrderStatusType::Delivered)
        .with_created_at(feb)
        .insert(db.pool())
        .await;
    seed::OrderSeed::new("ORDC", "CUST001", Money::from_rupees(900.0).unwrap())
        .with_status(OrderStatusType::Pending)
        .with_created_at(feb)
        .insert(db.pool())
        .await;
    let api = OrderAdminApi::new(db);

    let filter = OrderQueryFilter::default().with_status(OrderStatusType::Delivered);
    let page = api.list_orders(&filter, Pagination::default()).await.unwrap();
    assert_eq!(page.pagination.total_orders, 2);

    let filter = OrderQueryFilter::default()
        .with_status(OrderStatusType::Delivered)
        .with_min_total(Money::from_rupees(500.0).unwrap());
    let page = api.list_orders(&filter, Pagination::default()).await.unwrap();
    assert_eq!(page.pagination.total_orders, 1);
    assert_eq!(page.orders[0].id, "ORDB");

    let filter = OrderQueryFilter::default()
        .since(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap())
        .unwrap()
        .until(Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).unwrap())
        .unwrap();
    let page = api.list_orders(&filter, Pagination::default()).await.unwrap();
    assert_eq!(page.pagination.total_orders, 2);

    let filter = OrderQueryFilter::default().with_max_total(Money::from_rupees(200.0).unwrap());
    let page = api.list_orders(&filter, Pagination::default()).await.unwrap();
    assert_eq!(page.pagination.total_orders, 1);
    assert_eq!(page.orders[0].id, "ORDA");
}

#[tokio::test]
async fn search_matches_order_id_case_insensitively_with_hash_stripped() {
    let db = new_db().await;
    seed::insert_user(db.pool(), "CUST001", "Asha", Role::Customer, true, true).await;
    seed::OrderSeed::new("ORD20250110A7C9X2", "CUST001", Money::from(5000)).insert(db.pool()).await;
    seed::OrderSeed::new("ORD20250111B8D2Y3", "CUST001", Money::from(5000)).insert(db.pool()).await;
    let api = OrderAdminApi::new(db);

    let filter = OrderQueryFilter::default().with_search("#a7c9");
    let page = api.list_orders(&filter, Pagination::default()).await.unwrap();
    assert_eq!(page.pagination.total_orders, 1);
    assert_eq!(page.orders[0].id, "ORD20250110A7C9X2");

    // LIKE wildcards in the term are literals, not wildcards.
    let filter = OrderQueryFilter::default().with_search("%");
    let page = api.list_orders(&filter, Pagination::default()).await.unwrap();
    assert_eq!(page.pagination.total_orders, 0);
}

#[tokio::test]
async fn missing_references_resolve_to_sentinels() {
    let db = new_db().await;
    // No user row for GHOST; partner reference dangles; one of two products exists.
    seed::insert_user(db.pool(), "DLP001", "Ravi", Role::DeliveryPartner, true, true).await;
    seed::insert_product(db.pool(), "BNLGROC000001", "Basmati Rice", &["https://cdn.example.com/rice.jpg"]).await;
    seed::OrderSeed::new("ORDX", "GHOST", Money::from(10_000)).with_partner("DLPGONE").insert(db.pool()).await;
    seed::insert_order_item(db.pool(), "ORDX", "BNLGROC000001", 2, Money::from(2500)).await;
    seed::insert_order_item(db.pool(), "ORDX", "BNLGONE", 1, Money::from(5000)).await;
    let api = OrderAdminApi::new(db);

    let page = api.list_orders(&OrderQueryFilter::default(), Pagination::default()).await.unwrap();
    assert_eq!(page.orders.len(), 1);
    let order = &page.orders[0];
    assert_eq!(order.user_name, "Unknown");
    assert_eq!(order.user_email, "");
    assert_eq!(order.delivery_partner_name, None);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].product_name, "Basmati Rice");
    assert_eq!(order.items[0].product_images, vec!["https://cdn.example.com/rice.jpg".to_string()]);
    assert_eq!(order.items[1].product_name, "Unknown Product");
    assert!(order.items[1].product_images.is_empty());
}

#[tokio::test]
async fn resolved_partner_appears_by_name() {
    let db = new_db().await;
    seed::insert_user(db.pool(), "CUST001", "Asha", Role::Customer, true, true).await;
    seed::insert_user(db.pool(), "DLP001", "Ravi", Role::DeliveryPartner, true, true).await;
    seed::OrderSeed::new("ORDY", "CUST001", Money::from(10_000))
        .with_partner("DLP001")
        .with_status(OrderStatusType::Assigned)
        .insert(db.pool())
        .await;
    let api = OrderAdminApi::new(db);
    let page = api.list_orders(&OrderQueryFilter::default(), Pagination::default()).await.unwrap();
    assert_eq!(page.orders[0].delivery_partner_name.as_deref(), Some("Ravi"));
    assert_eq!(page.orders[0].user_phone, "9999900000");
}

#[tokio::test]
async fn download_includes_address_and_skips_unreadable_orders() {
    let db = new_db().await;
    seed::insert_user(db.pool(), "CUST001", "Asha", Role::Customer, true, true).await;
    seed::OrderSeed::new("ORDGOOD", "CUST001", Money::from(10_000))
        .with_address(r#"{"line1":"12 MG Road","city":"Bengaluru","pincode":"560001"}"#)
        .insert(db.pool())
        .await;
    seed::OrderSeed::new("ORDBAD", "CUST001", Money::from(10_000))
        .with_address("{not valid json")
        .insert(db.pool())
        .await;
    let api = OrderAdminApi::new(db);

    // The listing never parses addresses, so both orders appear there.
    let page = api.list_orders(&OrderQueryFilter::default(), Pagination::default()).await.unwrap();
    assert_eq!(page.orders.len(), 2);
    assert!(page.orders.iter().all(|o| o.delivery_address.is_none()));

    // The download parses them; the unreadable order is skipped, not fatal.
    let download = api.orders_for_download(&OrderQueryFilter::default()).await.unwrap();
    assert_eq!(download.total_count, 1);
    let address = download.orders[0].delivery_address.as_ref().unwrap();
    assert_eq!(address["city"], "Bengaluru");
}
