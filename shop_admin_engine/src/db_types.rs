use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

use sag_common::Money;

//--------------------------------------        OrderId        -------------------------------------------------------
/// The application-assigned order identifier, as displayed to operators (e.g. `ORD20250102A7C9X2`).
/// This is distinct from the storage engine's internal row id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatusType {
    /// The order has been placed but not yet confirmed by the shop.
    Pending,
    /// The shop has confirmed the order.
    Confirmed,
    /// The order is being prepared.
    Preparing,
    /// The order is waiting for a delivery partner to be assigned.
    Assigning,
    /// A delivery partner has accepted the order themselves.
    Accepted,
    /// An admin has assigned a delivery partner to the order.
    Assigned,
    /// The order has left the shop.
    OutForDelivery,
    /// The order has been delivered to the customer.
    Delivered,
    /// The order has been cancelled.
    Cancelled,
}

impl OrderStatusType {
    /// The operator-facing sentence stored alongside the status and in the status history.
    pub fn status_message(&self) -> &'static str {
        match self {
            OrderStatusType::Pending => "Order has been placed",
            OrderStatusType::Confirmed => "Order has been confirmed",
            OrderStatusType::Preparing => "Order is being prepared",
            OrderStatusType::Assigning => "Looking for a delivery partner",
            OrderStatusType::Accepted => "A delivery partner has accepted the order",
            OrderStatusType::Assigned => "A delivery partner has been assigned",
            OrderStatusType::OutForDelivery => "Order is out for delivery",
            OrderStatusType::Delivered => "Order has been delivered",
            OrderStatusType::Cancelled => "Order has been cancelled",
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatusType::Pending => "pending",
            OrderStatusType::Confirmed => "confirmed",
            OrderStatusType::Preparing => "preparing",
            OrderStatusType::Assigning => "assigning",
            OrderStatusType::Accepted => "accepted",
            OrderStatusType::Assigned => "assigned",
            OrderStatusType::OutForDelivery => "out_for_delivery",
            OrderStatusType::Delivered => "delivered",
            OrderStatusType::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "preparing" => Ok(Self::Preparing),
            "assigning" => Ok(Self::Assigning),
            "accepted" => Ok(Self::Accepted),
            "assigned" => Ok(Self::Assigned),
            "out_for_delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatusType::Pending
        })
    }
}

//--------------------------------------        Role           -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    DeliveryPartner,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::DeliveryPartner => write!(f, "delivery_partner"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "delivery_partner" => Ok(Self::DeliveryPartner),
            "admin" => Ok(Self::Admin),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------        Order          -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// The application-assigned order id. All cross-entity joins use this field.
    pub order_id: OrderId,
    /// The external id of the buying customer.
    pub user_id: String,
    /// The external id of the assigned delivery partner, if any.
    pub delivery_partner_id: Option<String>,
    pub total_amount: Money,
    pub status: OrderStatusType,
    pub status_message: Option<String>,
    /// The delivery address as a JSON document, verbatim from the ordering subsystem.
    pub delivery_address: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      OrderItem        -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: OrderId,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: Money,
}

//--------------------------------------   StatusHistoryEntry  -------------------------------------------------------
/// A single entry in an order's append-only status-change trail.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub id: i64,
    pub order_id: OrderId,
    pub status: OrderStatusType,
    pub message: String,
    pub changed_by: Option<String>,
    pub partner_id: Option<String>,
    pub partner_name: Option<String>,
    pub changed_at: DateTime<Utc>,
}

//--------------------------------------     StatusChange      -------------------------------------------------------
/// The data for a new status-history entry, captured before the write.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: OrderStatusType,
    pub message: String,
    pub changed_by: Option<String>,
    pub partner_id: Option<String>,
    pub partner_name: Option<String>,
}

impl StatusChange {
    pub fn new(status: OrderStatusType) -> Self {
        Self {
            status,
            message: status.status_message().to_string(),
            changed_by: None,
            partner_id: None,
            partner_name: None,
        }
    }

    pub fn with_message<S: Into<String>>(mut self, message: S) -> Self {
        self.message = message.into();
        self
    }

    pub fn by<S: Into<String>>(mut self, actor: S) -> Self {
        self.changed_by = Some(actor.into());
        self
    }

    pub fn with_partner<S: Into<String>>(mut self, partner_id: S, partner_name: S) -> Self {
        self.partner_id = Some(partner_id.into());
        self.partner_name = Some(partner_name.into());
        self
    }
}

//--------------------------------------        User           -------------------------------------------------------
/// A user record, owned by the separate user-management subsystem. The admin gateway only ever
/// reads these rows to resolve references and to count broadcast audiences.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------       Product         -------------------------------------------------------
/// A product record, owned by the separate catalog subsystem.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub product_id: String,
    pub name: String,
    /// JSON array of image urls, stored verbatim.
    pub images: String,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Decodes the stored image list. A malformed value yields an empty list rather than an error;
    /// a product with unreadable images must not sink the page it appears on.
    pub fn image_list(&self) -> Vec<String> {
        serde_json::from_str(&self.images).unwrap_or_else(|e| {
            error!("Could not decode image list for product {}: {e}", self.product_id);
            Vec::new()
        })
    }
}

//--------------------------------------  NotificationAudience -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationAudience {
    /// A single stored document addressed to an audience snapshot of all matching customers.
    AllUsers,
    /// Addressed to exactly one user.
    SpecificUser,
}

impl Display for NotificationAudience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationAudience::AllUsers => write!(f, "all_users"),
            NotificationAudience::SpecificUser => write!(f, "specific_user"),
        }
    }
}

impl FromStr for NotificationAudience {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all_users" => Ok(Self::AllUsers),
            "specific_user" => Ok(Self::SpecificUser),
            s => Err(ConversionError(format!("Invalid notification audience: {s}"))),
        }
    }
}

//--------------------------------------     Notification      -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub notification_id: String,
    pub title: String,
    pub message: String,
    /// Free-form type tag ("system", "order", "promo", ...).
    pub kind: String,
    pub audience: NotificationAudience,
    pub user_id: Option<String>,
    pub order_id: Option<String>,
    /// For broadcasts: the audience size counted at creation time.
    pub target_user_count: Option<i64>,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Preformatted display string in the fixed regional time convention. Older records may lack
    /// it, in which case display falls back to converting `created_at` on the fly.
    pub created_at_display: Option<String>,
    pub display_timezone: Option<String>,
    pub created_by: String,
    pub created_by_admin: bool,
}

//--------------------------------------    NewNotification    -------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub kind: String,
    pub audience: NotificationAudience,
    pub user_id: Option<String>,
    pub order_id: Option<String>,
    pub target_user_count: Option<i64>,
    pub created_by: String,
}

impl NewNotification {
    pub fn targeted(user_id: String, title: String, message: String, created_by: String) -> Self {
        Self {
            title,
            message,
            kind: "system".to_string(),
            audience: NotificationAudience::SpecificUser,
            user_id: Some(user_id),
            order_id: None,
            target_user_count: None,
            created_by,
        }
    }

    pub fn broadcast(title: String, message: String, audience_size: i64, created_by: String) -> Self {
        Self {
            title,
            message,
            kind: "system".to_string(),
            audience: NotificationAudience::AllUsers,
            user_id: None,
            order_id: None,
            target_user_count: Some(audience_size),
            created_by,
        }
    }

    pub fn with_kind<S: Into<String>>(mut self, kind: S) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_order_id<S: Into<String>>(mut self, order_id: S) -> Self {
        self.order_id = Some(order_id.into());
        self
    }
}

//--------------------------------------      ShopStatus       -------------------------------------------------------
/// The singleton shop open/closed flag. At most one row exists; it is created on first read and
/// updated in place thereafter.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ShopStatus {
    pub is_open: bool,
    pub reopen_time: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

impl ShopStatus {
    /// The state a brand-new shop starts in: open, no scheduled reopen, no reason.
    pub fn default_open() -> Self {
        Self {
            is_open: true,
            reopen_time: None,
            reason: None,
            updated_at: Utc::now(),
            updated_by: "system".to_string(),
        }
    }
}

//--------------------------------------   CustomerAudience    -------------------------------------------------------
/// Filter describing which customers a broadcast notification is aimed at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerAudience {
    #[serde(default = "default_true")]
    pub active_only: bool,
    #[serde(default)]
    pub verified_only: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CustomerAudience {
    fn default() -> Self {
        Self { active_only: true, verified_only: false }
    }
}
