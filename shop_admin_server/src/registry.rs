//! The admin session registry.
//!
//! One process-wide registry tracks every connected admin session so that state changes can be
//! fanned out to all of them. The registry is owned by the transport layer and injected wherever
//! broadcast is needed; nothing reaches it as ambient global state. Sends are best-effort: a
//! session that fails to accept a payload is dropped from the registry and the failure is logged,
//! never propagated.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use actix_ws::Session;
use log::*;
use serde::Deserialize;
use serde_json::Value;

/// Identity of the admin behind a session, as established by the upstream authentication layer.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminInfo {
    #[serde(default = "default_email")]
    pub email: String,
    #[serde(default = "default_name")]
    pub name: String,
}

fn default_email() -> String {
    "admin@example.com".to_string()
}

fn default_name() -> String {
    "Admin".to_string()
}

#[derive(Clone, Default)]
pub struct AdminRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    sessions: HashMap<u64, (Session, AdminInfo)>,
}

impl AdminRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a session and returns its registry id.
    pub fn register(&self, session: Session, admin: AdminInfo) -> u64 {
        let mut inner = self.inner.lock().expect("admin registry lock poisoned");
        inner.next_id += 1;
        let id = inner.next_id;
        inner.sessions.insert(id, (session, admin.clone()));
        info!("💻️ Admin {} connected (session #{id}). {} active sessions", admin.email, inner.sessions.len());
        id
    }

    pub fn unregister(&self, id: u64) {
        let mut inner = self.inner.lock().expect("admin registry lock poisoned");
        if let Some((_, admin)) = inner.sessions.remove(&id) {
            info!("💻️ Admin {} disconnected (session #{id}). {} active sessions", admin.email, inner.sessions.len());
        }
    }

    pub fn active_sessions(&self) -> usize {
        self.inner.lock().expect("admin registry lock poisoned").sessions.len()
    }

    /// Sends the payload to every connected session. Sessions that no longer accept messages are
    /// removed; their failures are logged and swallowed.
    pub async fn broadcast(&self, payload: &Value) {
        let targets: Vec<(u64, Session)> = {
            let inner = self.inner.lock().expect("admin registry lock poisoned");
            inner.sessions.iter().map(|(id, (session, _))| (*id, session.clone())).collect()
        };
        if targets.is_empty() {
            return;
        }
        let text = payload.to_string();
        let mut dead = Vec::new();
        for (id, mut session) in targets {
            if session.text(text.clone()).await.is_err() {
                dead.push(id);
            }
        }
        for id in dead {
            warn!("💻️ Session #{id} did not accept the broadcast. Dropping it from the registry.");
            self.unregister(id);
        }
    }
}
