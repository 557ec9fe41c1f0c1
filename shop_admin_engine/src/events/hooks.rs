use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, Handler, ShopStatusChangedEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub shop_status_producer: Vec<EventProducer<ShopStatusChangedEvent>>,
}

pub struct EventHandlers {
    pub on_shop_status_changed: Option<EventHandler<ShopStatusChangedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_shop_status_changed = hooks.on_shop_status_changed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_shop_status_changed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_shop_status_changed {
            result.shop_status_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_shop_status_changed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_shop_status_changed: Option<Handler<ShopStatusChangedEvent>>,
}

impl EventHooks {
    pub fn on_shop_status_changed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(ShopStatusChangedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_shop_status_changed = Some(Arc::new(f));
        self
    }
}
