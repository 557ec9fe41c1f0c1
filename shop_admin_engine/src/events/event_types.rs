use serde::{Deserialize, Serialize};

use crate::db_types::ShopStatus;

/// Emitted after the shop open/closed singleton has been successfully written. Subscribers
/// typically fan the new state out to other connected admin sessions; delivery is best-effort and
/// failures never reach the caller that toggled the status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopStatusChangedEvent {
    pub status: ShopStatus,
}

impl ShopStatusChangedEvent {
    pub fn new(status: ShopStatus) -> Self {
        Self { status }
    }
}
