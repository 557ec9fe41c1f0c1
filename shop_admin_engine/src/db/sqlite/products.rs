use sqlx::{QueryBuilder, SqliteConnection};

use crate::{db::sqlite::SqliteDatabaseError, db_types::Product};

/// Batched product lookup for resolving line-item references.
pub async fn fetch_products_by_ids(
    product_ids: &[String],
    conn: &mut SqliteConnection,
) -> Result<Vec<Product>, SqliteDatabaseError> {
    if product_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder =
        QueryBuilder::new("SELECT id, product_id, name, images, created_at FROM products WHERE product_id IN (");
    let mut ids = builder.separated(", ");
    for product_id in product_ids {
        ids.push_bind(product_id);
    }
    builder.push(")");
    let products = builder.build_query_as::<Product>().fetch_all(conn).await?;
    Ok(products)
}
