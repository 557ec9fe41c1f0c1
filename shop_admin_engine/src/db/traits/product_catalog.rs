use crate::db_types::Product;

/// Read-only access to the product collection, owned by the catalog subsystem.
#[allow(async_fn_in_trait)]
pub trait ProductCatalog: Clone {
    type Error: std::error::Error;

    /// Batched lookup by external id. Ids that match no product are absent from the result.
    async fn fetch_products_by_ids(&self, product_ids: &[String]) -> Result<Vec<Product>, Self::Error>;
}
