use std::{future::Future, pin::Pin, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::info;
use serde_json::json;
use shop_admin_engine::{
    events::{EventHandlers, EventHooks},
    run_migrations, NotificationApi, OrderAdminApi, ShopStatusApi, SqliteDatabase,
};

use crate::{
    cache::ShopStatusCache,
    config::ServerConfig,
    dispatch::AppState,
    errors::ServerError,
    registry::AdminRegistry,
    routes::{health, ws_entry},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_db_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    run_migrations(db.pool()).await.map_err(|e| ServerError::InitializeError(e.to_string()))?;

    let registry = AdminRegistry::new();
    let shop_cache = ShopStatusCache::new(config.shop_cache_enabled, Duration::from_secs(config.shop_cache_ttl_secs));

    // Shop status changes fan out to every connected admin session via the engine's change event.
    let mut hooks = EventHooks::default();
    let hook_registry = registry.clone();
    hooks.on_shop_status_changed(move |event| {
        let registry = hook_registry.clone();
        Box::pin(async move {
            let status = event.status;
            let payload = json!({
                "type": "shop_status_changed",
                "is_open": status.is_open,
                "reopen_time": status.reopen_time,
                "reason": status.reason,
                "message": format!("Shop status changed by {}", status.updated_by),
            });
            registry.broadcast(&payload).await;
            info!("📢️ Broadcast shop status change to all admin sessions");
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    let handlers = EventHandlers::new(config.event_buffer_size, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;

    let state = AppState {
        orders: OrderAdminApi::new(db.clone()),
        notifications: NotificationApi::new(db.clone()),
        shop_status: ShopStatusApi::new(db, producers),
        registry,
        shop_cache,
    };
    let srv = create_server_instance(config, state)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, state: AppState) -> Result<Server, ServerError> {
    let state = web::Data::new(state);
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sag::access_log"))
            .app_data(state.clone())
            .service(health)
            .service(ws_entry)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
