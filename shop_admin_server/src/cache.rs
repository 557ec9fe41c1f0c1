//! In-memory cache for the shop-status read path.
//!
//! The open/closed flag is read far more often than it changes, so reads are served from a small
//! TTL cache and every successful update deletes the cached entry. Cache trouble is never a
//! user-facing error; at worst a read goes to the database.

use std::time::Duration;

use log::debug;
use moka::future::Cache;
use shop_admin_engine::db_types::ShopStatus;

const SHOP_STATUS_KEY: &str = "shop_status";

#[derive(Clone)]
pub struct ShopStatusCache {
    enabled: bool,
    cache: Cache<String, ShopStatus>,
}

impl ShopStatusCache {
    pub fn new(enabled: bool, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(8).time_to_live(ttl).build();
        Self { enabled, cache }
    }

    pub async fn get(&self) -> Option<ShopStatus> {
        if !self.enabled {
            return None;
        }
        self.cache.get(SHOP_STATUS_KEY).await
    }

    pub async fn set(&self, status: ShopStatus) {
        if self.enabled {
            self.cache.insert(SHOP_STATUS_KEY.to_string(), status).await;
        }
    }

    pub async fn invalidate(&self) {
        if self.enabled {
            self.cache.invalidate(SHOP_STATUS_KEY).await;
            debug!("💻️ Shop status cache entry invalidated");
        }
    }
}
