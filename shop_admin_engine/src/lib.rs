//! Shop Admin Engine
//!
//! The engine holds the core logic of the shop admin gateway: everything an admin session can do
//! to orders, notifications and the shop open/closed flag, independent of how those sessions are
//! connected. It is transport-agnostic; the companion server crate owns the WebSocket plumbing.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@db`], private). SQLite is the bundled backend. You
//!    should never need to access the database directly; use the public service APIs instead.
//!    The exception is the data types stored in the database, which are public in [`db_types`].
//! 2. The admin service APIs ([`mod@admin_api`]). These provide the public-facing functionality:
//!    order listing/export/mutation, notification dispatch and statistics, and the shop status
//!    singleton. Backends implement the storage traits re-exported at the crate root.
//!
//! The engine also emits events. When the shop status changes, a `ShopStatusChangedEvent` is
//! published; a small actor-style hook system lets the transport layer subscribe and fan the
//! change out to connected sessions.

mod db;

pub mod admin_api;
pub mod db_types;
pub mod events;
pub mod helpers;

#[cfg(feature = "sqlite")]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{run_migrations, SqliteDatabase, SqliteDatabaseError};
pub use admin_api::{
    errors::{NotificationApiError, OrderApiError, ShopStatusApiError},
    notification_objects,
    notifications_api::{self, NotificationApi},
    order_objects,
    orders_api::{self, OrderAdminApi},
    shop_status_api::{self, ShopStatusApi, ShopStatusUpdate},
};
pub use db::traits::{
    NotificationManagement,
    OrderManagement,
    ProductCatalog,
    ShopStatusManagement,
    UserDirectory,
};
