use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sag_common::Money;

use crate::{
    admin_api::errors::OrderApiError,
    db_types::{OrderId, OrderStatusType},
};

/// Default number of orders per page when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

//--------------------------------------   OrderQueryFilter    -------------------------------------------------------
/// Typed filter for the order listing and download queries.
///
/// Each populated field contributes an independent predicate; all predicates are combined with
/// logical AND. Absent fields impose no predicate. The filter is constructed at the transport
/// boundary from validated input; malformed values never reach this type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQueryFilter {
    pub status: Option<OrderStatusType>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub min_total: Option<Money>,
    pub max_total: Option<Money>,
    /// Case-insensitive substring match against the external order id.
    pub search: Option<String>,
}

impl OrderQueryFilter {
    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status = Some(status);
        self
    }

    pub fn since<T>(mut self, since: T) -> Result<Self, OrderApiError>
    where
        T: TryInto<DateTime<Utc>>,
        T::Error: Display,
    {
        let dt = since.try_into().map_err(|e| OrderApiError::QueryError(e.to_string()))?;
        self.since = Some(dt);
        Ok(self)
    }

    pub fn until<T>(mut self, until: T) -> Result<Self, OrderApiError>
    where
        T: TryInto<DateTime<Utc>>,
        T::Error: Display,
    {
        let dt = until.try_into().map_err(|e| OrderApiError::QueryError(e.to_string()))?;
        self.until = Some(dt);
        Ok(self)
    }

    pub fn with_min_total(mut self, min_total: Money) -> Self {
        self.min_total = Some(min_total);
        self
    }

    pub fn with_max_total(mut self, max_total: Money) -> Self {
        self.max_total = Some(max_total);
        self
    }

    /// Sets the order-id search term. A leading `#` is stripped, since operators habitually paste
    /// the display form of the id.
    pub fn with_search<S: Into<String>>(mut self, term: S) -> Self {
        let term = term.into();
        let term = term.trim().trim_start_matches('#').to_string();
        if !term.is_empty() {
            self.search = Some(term);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.since.is_none()
            && self.until.is_none()
            && self.min_total.is_none()
            && self.max_total.is_none()
            && self.search.is_none()
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "No filters.")?;
            return Ok(());
        }
        if let Some(status) = &self.status {
            write!(f, "status: {status}. ")?;
        }
        if let Some(since) = &self.since {
            write!(f, "since {since}. ")?;
        }
        if let Some(until) = &self.until {
            write!(f, "until {until}. ")?;
        }
        if let Some(min_total) = &self.min_total {
            write!(f, "total >= {min_total}. ")?;
        }
        if let Some(max_total) = &self.max_total {
            write!(f, "total <= {max_total}. ")?;
        }
        if let Some(search) = &self.search {
            write!(f, "order id contains '{search}'. ")?;
        }
        Ok(())
    }
}

//--------------------------------------     QueryWindow       -------------------------------------------------------
/// A skip/limit window applied after filtering and sorting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QueryWindow {
    pub skip: i64,
    pub limit: i64,
}

impl QueryWindow {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip: skip.max(0), limit: limit.max(0) }
    }
}

//--------------------------------------      Pagination       -------------------------------------------------------
/// Page-number pagination as requested by the admin frontend. Pages are 1-based; out-of-range
/// values are clamped rather than rejected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

impl Pagination {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page: page.max(1), page_size: page_size.max(1) }
    }

    pub fn window(&self) -> QueryWindow {
        QueryWindow::new((self.page - 1) * self.page_size, self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, page_size: DEFAULT_PAGE_SIZE }
    }
}

//--------------------------------------    PaginationInfo     -------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_orders: i64,
    pub has_prev: bool,
    pub has_next: bool,
    pub page_size: i64,
}

impl PaginationInfo {
    /// Derives the page metadata for a result set of `total` matching orders. An empty match set
    /// still reports one (empty) page.
    pub fn for_page(pagination: Pagination, total: i64) -> Self {
        let total_pages = if total > 0 { (total + pagination.page_size - 1) / pagination.page_size } else { 1 };
        Self {
            current_page: pagination.page,
            total_pages,
            total_orders: total,
            has_prev: pagination.page > 1,
            has_next: pagination.page < total_pages,
            page_size: pagination.page_size,
        }
    }
}

//--------------------------------------    OrderItemView      -------------------------------------------------------
/// A line item with its product reference resolved to display fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemView {
    pub product_id: String,
    pub product_name: String,
    pub product_images: Vec<String>,
    pub quantity: i64,
    pub unit_price: f64,
}

//--------------------------------------     OrderSummary      -------------------------------------------------------
/// An order as sent to the admin frontend: the stored fields plus the denormalised user, partner
/// and product display fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub delivery_partner_id: Option<String>,
    pub delivery_partner_name: Option<String>,
    pub items: Vec<OrderItemView>,
    pub total: f64,
    pub status: OrderStatusType,
    pub status_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       OrderPage       -------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<OrderSummary>,
    pub pagination: PaginationInfo,
}

//--------------------------------------     OrderDownload     -------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDownload {
    pub orders: Vec<OrderSummary>,
    pub total_count: usize,
}

//--------------------------------------  AssignmentReceipt    -------------------------------------------------------
/// The payload returned to the caller after a successful delivery-partner assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentReceipt {
    pub order_id: OrderId,
    pub delivery_partner_id: String,
    pub delivery_partner_name: String,
    pub status: OrderStatusType,
    pub timestamp: DateTime<Utc>,
}
