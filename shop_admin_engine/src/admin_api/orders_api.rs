use std::{
    collections::{BTreeSet, HashMap},
    fmt::Debug,
};

use chrono::Utc;
use log::*;

use crate::{
    admin_api::{
        errors::OrderApiError,
        order_objects::{
            AssignmentReceipt, OrderDownload, OrderItemView, OrderPage, OrderQueryFilter, OrderSummary, Pagination,
            PaginationInfo, QueryWindow,
        },
    },
    db::traits::{OrderManagement, ProductCatalog, UserDirectory},
    db_types::{Order, OrderId, OrderItem, OrderStatusType, Product, Role, StatusChange, StatusHistoryEntry, User},
};

/// Ceiling on the number of orders a single download request may return.
pub const MAX_DOWNLOAD_ORDERS: i64 = 10_000;

/// `OrderAdminApi` serves the admin order views: filtered, paginated listings with denormalised
/// display fields, the bulk download variant, manual status updates, and delivery-partner
/// assignment.
pub struct OrderAdminApi<B> {
    db: B,
}

impl<B> Debug for OrderAdminApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderAdminApi")
    }
}

impl<B> OrderAdminApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrderAdminApi<B>
where B: OrderManagement + UserDirectory + ProductCatalog
{
    /// Returns one page of orders matching the filter, sorted by creation time descending, with
    /// user, partner and product references resolved to display fields.
    pub async fn list_orders(
        &self,
        filter: &OrderQueryFilter,
        pagination: Pagination,
    ) -> Result<OrderPage, OrderApiError> {
        debug!("📦️ Listing orders. {filter} page {} ({} per page)", pagination.page, pagination.page_size);
        let total = self.db.count_orders(filter).await.map_err(|e| OrderApiError::DatabaseError(e.to_string()))?;
        let pagination_info = PaginationInfo::for_page(pagination, total);
        let orders = self
            .db
            .fetch_orders(filter, Some(pagination.window()))
            .await
            .map_err(|e| OrderApiError::DatabaseError(e.to_string()))?;
        let orders = self.build_summaries(orders, false).await?;
        debug!("📦️ Returning {} of {total} matching orders", orders.len());
        Ok(OrderPage { orders, pagination: pagination_info })
    }

    /// The bulk-download variant of the listing: same filter semantics, no pagination, capped at
    /// [`MAX_DOWNLOAD_ORDERS`] rows, and each order carries its full delivery address.
    pub async fn orders_for_download(&self, filter: &OrderQueryFilter) -> Result<OrderDownload, OrderApiError> {
        debug!("📦️ Collecting orders for download. {filter}");
        let window = QueryWindow::new(0, MAX_DOWNLOAD_ORDERS);
        let orders = self
            .db
            .fetch_orders(filter, Some(window))
            .await
            .map_err(|e| OrderApiError::DatabaseError(e.to_string()))?;
        let orders = self.build_summaries(orders, true).await?;
        Ok(OrderDownload { total_count: orders.len(), orders })
    }

    /// Sets the order's status and appends a history entry. The write is conditional on the
    /// external order id; a miss reports `OrderNotFound` and appends nothing.
    pub async fn update_order_status(
        &self,
        order_id: &OrderId,
        new_status: OrderStatusType,
        actor: Option<&str>,
    ) -> Result<(), OrderApiError> {
        let mut change = StatusChange::new(new_status);
        if let Some(actor) = actor {
            change = change.by(actor);
        }
        let updated = self
            .db
            .update_order_status(order_id, new_status, change)
            .await
            .map_err(|e| OrderApiError::DatabaseError(e.to_string()))?;
        if !updated {
            return Err(OrderApiError::OrderNotFound(order_id.clone()));
        }
        info!("📦️ Order {order_id} status changed to {new_status}");
        Ok(())
    }

    /// Assigns an active delivery partner to an order.
    ///
    /// Preconditions: the order exists, and the partner exists with the `delivery_partner` role
    /// and an active flag. A failed precondition reports a discrete error and writes nothing.
    /// The successful write moves the order to `assigned`, stamps the assignment time and appends
    /// a history entry recording actor and partner.
    pub async fn assign_delivery_partner(
        &self,
        order_id: &OrderId,
        partner_id: &str,
        admin_name: &str,
    ) -> Result<AssignmentReceipt, OrderApiError> {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await
            .map_err(|e| OrderApiError::DatabaseError(e.to_string()))?
            .ok_or_else(|| OrderApiError::OrderNotFound(order_id.clone()))?;
        let partner = self
            .db
            .fetch_user(partner_id)
            .await
            .map_err(|e| OrderApiError::DatabaseError(e.to_string()))?
            .filter(|u| u.role == Role::DeliveryPartner && u.is_active)
            .ok_or_else(|| OrderApiError::PartnerNotFound(partner_id.to_string()))?;
        debug!("📦️ Assigning order {order_id} (currently {}) to partner {}", order.status, partner.user_id);
        let message = format!("Order assigned to {} by {admin_name}", partner.name);
        let change = StatusChange::new(OrderStatusType::Assigned)
            .with_message(message)
            .by(admin_name)
            .with_partner(partner.user_id.clone(), partner.name.clone());
        let updated = self
            .db
            .assign_delivery_partner(order_id, &partner.user_id, change)
            .await
            .map_err(|e| OrderApiError::DatabaseError(e.to_string()))?;
        if !updated {
            // The order was deleted between the precondition check and the write.
            return Err(OrderApiError::OrderNotFound(order_id.clone()));
        }
        info!("📦️ Assigned partner {} to order {order_id}", partner.user_id);
        Ok(AssignmentReceipt {
            order_id: order_id.clone(),
            delivery_partner_id: partner.user_id,
            delivery_partner_name: partner.name,
            status: OrderStatusType::Assigned,
            timestamp: Utc::now(),
        })
    }

    /// The append-only status trail for one order, oldest first.
    pub async fn status_history(&self, order_id: &OrderId) -> Result<Vec<StatusHistoryEntry>, OrderApiError> {
        self.db.fetch_status_history(order_id).await.map_err(|e| OrderApiError::DatabaseError(e.to_string()))
    }

    /// Resolves all references for a set of orders with one batched lookup per entity kind, then
    /// shapes each order for the frontend. A single order that fails to serialise is skipped with
    /// a log entry; it never sinks the batch.
    async fn build_summaries(
        &self,
        orders: Vec<Order>,
        include_address: bool,
    ) -> Result<Vec<OrderSummary>, OrderApiError> {
        let order_ids: Vec<OrderId> = orders.iter().map(|o| o.order_id.clone()).collect();
        let items = self
            .db
            .fetch_items_for_orders(&order_ids)
            .await
            .map_err(|e| OrderApiError::DatabaseError(e.to_string()))?;
        let mut items_by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
        for item in items {
            items_by_order.entry(item.order_id.as_str().to_string()).or_default().push(item);
        }

        let user_ids: BTreeSet<String> = orders.iter().map(|o| o.user_id.clone()).collect();
        let partner_ids: BTreeSet<String> = orders.iter().filter_map(|o| o.delivery_partner_id.clone()).collect();
        let product_ids: BTreeSet<String> =
            items_by_order.values().flatten().map(|i| i.product_id.clone()).collect();

        let users = self.lookup_users(user_ids).await?;
        let partners = self.lookup_users(partner_ids).await?;
        let products = self.lookup_products(product_ids).await?;

        let mut summaries = Vec::with_capacity(orders.len());
        for order in orders {
            let order_items = items_by_order.remove(order.order_id.as_str()).unwrap_or_default();
            match summarize_order(order, order_items, &users, &partners, &products, include_address) {
                Ok(summary) => summaries.push(summary),
                Err((order_id, e)) => {
                    error!("📦️ Skipping order {order_id} that could not be serialised: {e}");
                },
            }
        }
        Ok(summaries)
    }

    async fn lookup_users(&self, ids: BTreeSet<String>) -> Result<HashMap<String, User>, OrderApiError> {
        let ids: Vec<String> = ids.into_iter().collect();
        let users =
            self.db.fetch_users_by_ids(&ids).await.map_err(|e| OrderApiError::DatabaseError(e.to_string()))?;
        Ok(users.into_iter().map(|u| (u.user_id.clone(), u)).collect())
    }

    async fn lookup_products(&self, ids: BTreeSet<String>) -> Result<HashMap<String, Product>, OrderApiError> {
        let ids: Vec<String> = ids.into_iter().collect();
        let products =
            self.db.fetch_products_by_ids(&ids).await.map_err(|e| OrderApiError::DatabaseError(e.to_string()))?;
        Ok(products.into_iter().map(|p| (p.product_id.clone(), p)).collect())
    }
}

/// Shapes one order for the frontend. Missing references resolve to sentinel display values
/// rather than errors; only an unreadable delivery address fails the order.
fn summarize_order(
    order: Order,
    items: Vec<OrderItem>,
    users: &HashMap<String, User>,
    partners: &HashMap<String, User>,
    products: &HashMap<String, Product>,
    include_address: bool,
) -> Result<OrderSummary, (OrderId, serde_json::Error)> {
    let user = users.get(&order.user_id);
    let partner = order.delivery_partner_id.as_deref().and_then(|id| partners.get(id));

    let items = items
        .into_iter()
        .map(|item| {
            let product = products.get(&item.product_id);
            OrderItemView {
                product_name: product.map(|p| p.name.clone()).unwrap_or_else(|| "Unknown Product".to_string()),
                product_images: product.map(Product::image_list).unwrap_or_default(),
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price.rupees(),
            }
        })
        .collect();

    let delivery_address = if include_address {
        match &order.delivery_address {
            Some(raw) => Some(serde_json::from_str(raw).map_err(|e| (order.order_id.clone(), e))?),
            None => None,
        }
    } else {
        None
    };

    Ok(OrderSummary {
        id: order.order_id.as_str().to_string(),
        user_name: user.map(|u| u.name.clone()).unwrap_or_else(|| "Unknown".to_string()),
        user_email: user.map(|u| u.email.clone()).unwrap_or_default(),
        user_phone: user.and_then(|u| u.phone.clone()).unwrap_or_default(),
        user_id: order.user_id,
        delivery_partner_id: order.delivery_partner_id,
        delivery_partner_name: partner.map(|p| p.name.clone()),
        items,
        total: order.total_amount.rupees(),
        status: order.status,
        status_message: order.status_message,
        delivery_address,
        created_at: order.created_at,
        updated_at: order.updated_at,
    })
}
