use crate::db_types::ShopStatus;

/// Storage for the shop open/closed singleton.
#[allow(async_fn_in_trait)]
pub trait ShopStatusManagement: Clone {
    type Error: std::error::Error;

    /// Fetches the singleton, or `None` if it has never been written.
    async fn fetch_shop_status(&self) -> Result<Option<ShopStatus>, Self::Error>;

    /// Writes the singleton, creating it if absent and replacing it otherwise.
    async fn upsert_shop_status(&self, status: &ShopStatus) -> Result<(), Self::Error>;
}
