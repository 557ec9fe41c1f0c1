//! Storage trait seams for the admin gateway.
//!
//! These traits are the boundary between the admin services and the document store. Each service
//! API is generic over exactly the traits it needs, so backends can be swapped (or mocked) per
//! concern. All lookups join on application-assigned external ids, never on the storage engine's
//! own row ids.

mod notification_management;
mod order_management;
mod product_catalog;
mod shop_status_management;
mod user_directory;

pub use notification_management::NotificationManagement;
pub use order_management::OrderManagement;
pub use product_catalog::ProductCatalog;
pub use shop_status_management::ShopStatusManagement;
pub use user_directory::UserDirectory;
