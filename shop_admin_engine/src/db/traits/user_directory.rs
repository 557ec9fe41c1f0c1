use crate::db_types::{CustomerAudience, User};

/// Read-only access to the user collection, owned by the user-management subsystem.
#[allow(async_fn_in_trait)]
pub trait UserDirectory: Clone {
    type Error: std::error::Error;

    async fn fetch_user(&self, user_id: &str) -> Result<Option<User>, Self::Error>;

    /// Batched lookup by external id, for resolving references on a page of orders. Ids that
    /// match no user are simply absent from the result.
    async fn fetch_users_by_ids(&self, user_ids: &[String]) -> Result<Vec<User>, Self::Error>;

    /// Snapshot count of customers matching the audience filter.
    async fn count_customers(&self, audience: &CustomerAudience) -> Result<i64, Self::Error>;
}
