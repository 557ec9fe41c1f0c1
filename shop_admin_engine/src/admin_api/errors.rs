use thiserror::Error;

use crate::db_types::OrderId;

#[derive(Debug, Clone, Error)]
pub enum OrderApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),
    #[error("Delivery partner not found or inactive: {0}")]
    PartnerNotFound(String),
    #[error("User error constructing query: {0}")]
    QueryError(String),
}

#[derive(Debug, Clone, Error)]
pub enum NotificationApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("{0} are required")]
    MissingFields(&'static str),
    #[error("User not found: {0}")]
    RecipientNotFound(String),
    #[error("No users found matching the criteria")]
    EmptyAudience,
    /// Not-found and not-authorized deliberately collapse into one message so a caller cannot
    /// probe for the existence of other actors' notifications.
    #[error("Notification not found or not authorized")]
    NotFoundOrNotAuthorized,
}

#[derive(Debug, Clone, Error)]
pub enum ShopStatusApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Reopen time must be in the future")]
    ReopenTimeNotInFuture,
    #[error("is_open field is required")]
    MissingOpenFlag,
}
