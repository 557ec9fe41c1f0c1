//! # Shop Admin Server
//!
//! The transport shell of the shop admin gateway. It is responsible for:
//! * Accepting admin WebSocket sessions and tracking them in a registry.
//! * Parsing inbound JSON messages into typed commands at the boundary.
//! * Dispatching commands to the engine's service APIs and pushing the JSON reply back on the
//!   same socket.
//! * Fanning shop-status changes out to every connected session, and caching the status read
//!   path.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config] for the full list.
//!
//! ## Routes
//! * `/health`: a health check returning a 200 OK response.
//! * `/ws`: the WebSocket endpoint every admin session connects to.

pub mod cache;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod messages;
pub mod registry;
pub mod routes;
pub mod server;
