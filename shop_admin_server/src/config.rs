use std::env;

use log::*;
use sag_common::helpers::parse_boolean_flag;

const DEFAULT_SAG_HOST: &str = "127.0.0.1";
const DEFAULT_SAG_PORT: u16 = 8370;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/shop_admin.db";
const DEFAULT_MAX_DB_CONNECTIONS: u32 = 25;
const DEFAULT_SHOP_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_EVENT_BUFFER_SIZE: usize = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_db_connections: u32,
    /// When false, every shop-status read goes straight to the database.
    pub shop_cache_enabled: bool,
    pub shop_cache_ttl_secs: u64,
    pub event_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SAG_HOST.to_string(),
            port: DEFAULT_SAG_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_db_connections: DEFAULT_MAX_DB_CONNECTIONS,
            shop_cache_enabled: true,
            shop_cache_ttl_secs: DEFAULT_SHOP_CACHE_TTL_SECS,
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SAG_HOST").ok().unwrap_or_else(|| DEFAULT_SAG_HOST.into());
        let port = env::var("SAG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for SAG_PORT. {e} Using the default, {DEFAULT_SAG_PORT}, instead.");
                    DEFAULT_SAG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SAG_PORT);
        let database_url = env::var("SAG_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ SAG_DATABASE_URL is not set. Using the default.");
            DEFAULT_DATABASE_URL.into()
        });
        let max_db_connections = env::var("SAG_MAX_DB_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_DB_CONNECTIONS);
        let shop_cache_enabled = parse_boolean_flag(env::var("SAG_SHOP_CACHE").ok(), true);
        let shop_cache_ttl_secs = env::var("SAG_SHOP_CACHE_TTL")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_SHOP_CACHE_TTL_SECS);
        let event_buffer_size = env::var("SAG_EVENT_BUFFER_SIZE")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_EVENT_BUFFER_SIZE);
        Self {
            host,
            port,
            database_url,
            max_db_connections,
            shop_cache_enabled,
            shop_cache_ttl_secs,
            event_buffer_size,
        }
    }
}
