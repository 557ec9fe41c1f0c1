//! Seed helpers. Orders, users and products are created by subsystems outside this gateway, so
//! tests write them straight into the relevant tables.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use sag_common::Money;

use crate::db_types::{OrderStatusType, Role};

pub async fn insert_user(
    pool: &SqlitePool,
    user_id: &str,
    name: &str,
    role: Role,
    is_active: bool,
    is_verified: bool,
) {
    sqlx::query(
        "INSERT INTO users (user_id, name, email, phone, role, is_active, is_verified, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(name)
    .bind(format!("{}@example.com", user_id.to_lowercase()))
    .bind("9999900000")
    .bind(role)
    .bind(is_active)
    .bind(is_verified)
    .bind(Utc::now())
    .execute(pool)
    .await
    .expect("Error seeding user");
}

pub async fn insert_product(pool: &SqlitePool, product_id: &str, name: &str, images: &[&str]) {
    sqlx::query("INSERT INTO products (product_id, name, images, created_at) VALUES (?, ?, ?, ?)")
        .bind(product_id)
        .bind(name)
        .bind(serde_json::to_string(images).expect("Error encoding image list"))
        .bind(Utc::now())
        .execute(pool)
        .await
        .expect("Error seeding product");
}

pub async fn insert_order_item(
    pool: &SqlitePool,
    order_id: &str,
    product_id: &str,
    quantity: i64,
    unit_price: Money,
) {
    sqlx::query("INSERT INTO order_items (order_id, product_id, quantity, unit_price) VALUES (?, ?, ?, ?)")
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .bind(unit_price)
        .execute(pool)
        .await
        .expect("Error seeding order item");
}

/// A notification created by the customer-facing app rather than an admin. The admin gateway
/// must refuse to touch these.
pub async fn insert_customer_notification(pool: &SqlitePool, notification_id: &str, user_id: &str) {
    sqlx::query(
        "INSERT INTO notifications (notification_id, title, message, kind, audience, user_id, read, created_at, \
         created_by, created_by_admin) VALUES (?, 'Order update', 'Your order is on its way', 'order', \
         'specific_user', ?, 0, ?, 'app', 0)",
    )
    .bind(notification_id)
    .bind(user_id)
    .bind(Utc::now())
    .execute(pool)
    .await
    .expect("Error seeding customer notification");
}

/// An admin notification from before display strings were stored alongside the UTC instant.
/// Listing such a record must fall back to on-the-fly conversion.
pub async fn insert_legacy_admin_notification(
    pool: &SqlitePool,
    notification_id: &str,
    user_id: &str,
    created_at: DateTime<Utc>,
) {
    sqlx::query(
        "INSERT INTO notifications (notification_id, title, message, kind, audience, user_id, read, created_at, \
         created_at_display, display_timezone, created_by, created_by_admin) VALUES (?, 'Welcome', 'Hello', \
         'system', 'specific_user', ?, 0, ?, NULL, NULL, 'admin@example.com', 1)",
    )
    .bind(notification_id)
    .bind(user_id)
    .bind(created_at)
    .execute(pool)
    .await
    .expect("Error seeding legacy notification");
}

#[derive(Debug, Clone)]
pub struct OrderSeed {
    pub order_id: String,
    pub user_id: String,
    pub total: Money,
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
    pub delivery_partner_id: Option<String>,
    pub delivery_address: Option<String>,
}

impl OrderSeed {
    pub fn new(order_id: &str, user_id: &str, total: Money) -> Self {
        Self {
            order_id: order_id.to_string(),
            user_id: user_id.to_string(),
            total,
            status: OrderStatusType::Pending,
            created_at: Utc::now(),
            delivery_partner_id: None,
            delivery_address: None,
        }
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status = status;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_partner(mut self, partner_id: &str) -> Self {
        self.delivery_partner_id = Some(partner_id.to_string());
        self
    }

    pub fn with_address(mut self, address_json: &str) -> Self {
        self.delivery_address = Some(address_json.to_string());
        self
    }

    pub async fn insert(self, pool: &SqlitePool) {
        sqlx::query(
            "INSERT INTO orders (order_id, user_id, delivery_partner_id, total_amount, order_status, \
             status_message, delivery_address, assigned_at, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, NULL, ?, ?)",
        )
        .bind(&self.order_id)
        .bind(&self.user_id)
        .bind(&self.delivery_partner_id)
        .bind(self.total)
        .bind(self.status)
        .bind(self.status.status_message())
        .bind(&self.delivery_address)
        .bind(self.created_at)
        .bind(self.created_at)
        .execute(pool)
        .await
        .expect("Error seeding order");
    }
}
