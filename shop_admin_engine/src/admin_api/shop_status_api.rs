use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;

use crate::{
    admin_api::errors::ShopStatusApiError,
    db::traits::ShopStatusManagement,
    db_types::ShopStatus,
    events::{EventProducers, ShopStatusChangedEvent},
};

/// Validated input for a shop status update. Construction from the wire payload (including the
/// `is_open` requiredness check and reopen-time parsing) happens at the transport boundary.
#[derive(Debug, Clone)]
pub struct ShopStatusUpdate {
    pub is_open: bool,
    pub reopen_time: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

/// `ShopStatusApi` owns the open/closed singleton: reads that lazily create the default document,
/// and validated updates that notify event subscribers.
pub struct ShopStatusApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for ShopStatusApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ShopStatusApi")
    }
}

impl<B> ShopStatusApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> ShopStatusApi<B>
where B: ShopStatusManagement
{
    /// Returns the current shop status. If no document has ever been written, the shop defaults
    /// to open: the default document is stored and returned.
    pub async fn get(&self) -> Result<ShopStatus, ShopStatusApiError> {
        let existing =
            self.db.fetch_shop_status().await.map_err(|e| ShopStatusApiError::DatabaseError(e.to_string()))?;
        match existing {
            Some(status) => Ok(status),
            None => {
                info!("🏪️ No shop status on record. Creating the default (open).");
                let status = ShopStatus::default_open();
                self.db
                    .upsert_shop_status(&status)
                    .await
                    .map_err(|e| ShopStatusApiError::DatabaseError(e.to_string()))?;
                Ok(status)
            },
        }
    }

    /// Applies a status update. A scheduled reopen time must lie strictly in the future,
    /// otherwise the update is rejected before any write. On success the new state is published
    /// to event subscribers; event delivery is best-effort and never fails the update.
    pub async fn update(
        &self,
        update: ShopStatusUpdate,
        updated_by: &str,
    ) -> Result<ShopStatus, ShopStatusApiError> {
        if let Some(reopen_time) = update.reopen_time {
            if reopen_time <= Utc::now() {
                return Err(ShopStatusApiError::ReopenTimeNotInFuture);
            }
        }
        let status = ShopStatus {
            is_open: update.is_open,
            reopen_time: update.reopen_time,
            reason: update.reason,
            updated_at: Utc::now(),
            updated_by: updated_by.to_string(),
        };
        self.db.upsert_shop_status(&status).await.map_err(|e| ShopStatusApiError::DatabaseError(e.to_string()))?;
        info!("🏪️ Shop is now {} (updated by {updated_by})", if status.is_open { "open" } else { "closed" });
        for producer in &self.producers.shop_status_producer {
            producer.publish_event(ShopStatusChangedEvent::new(status.clone())).await;
        }
        Ok(status)
    }
}
