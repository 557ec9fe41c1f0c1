//! # Admin service APIs
//!
//! The `admin_api` module exposes the programmatic API of the admin gateway. The API is modular:
//! each service is a small struct generic over the storage traits it needs, so different parts
//! can be instantiated against different backends (or mocks) independently.
//!
//! * [`orders_api`] — filtered/paginated order listings with denormalised display fields, the
//!   bulk download variant, manual status updates, and delivery-partner assignment.
//! * [`notifications_api`] — targeted and broadcast notification creation, the filtered listing,
//!   statistics, and deletion.
//! * [`shop_status_api`] — the shop open/closed singleton with its validated update flow.
//!
//! The pattern for using the APIs is the same everywhere. An API instance is created by supplying
//! a database backend that implements the traits the API requires:
//!
//! ```rust,ignore
//! use shop_admin_engine::{OrderAdminApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/shop_admin.db", 25).await?;
//! let api = OrderAdminApi::new(db);
//! let page = api.list_orders(&Default::default(), Default::default()).await?;
//! ```

pub mod errors;
pub mod notification_objects;
pub mod notifications_api;
pub mod order_objects;
pub mod orders_api;
pub mod shop_status_api;
