//! Route handlers: a health check and the single WebSocket endpoint every admin session uses.

use std::sync::Arc;

use actix_web::{get, web, Error, HttpRequest, HttpResponse, Responder};
use actix_ws::{Message, MessageStream, Session};
use futures_util::StreamExt;
use log::*;

use crate::{
    dispatch::{dispatch, AppState},
    registry::AdminInfo,
};

#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

/// Upgrades the request and hands the socket to its own session task. The admin identity rides on
/// the query string; authenticating it is the job of the proxy in front of this server.
#[get("/ws")]
pub async fn ws_entry(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
    admin: web::Query<AdminInfo>,
) -> Result<HttpResponse, Error> {
    let (response, session, msg_stream) = actix_ws::handle(&req, stream)?;
    actix_web::rt::spawn(run_session(state.into_inner(), admin.into_inner(), session, msg_stream));
    Ok(response)
}

/// One loop per connection: read a frame, dispatch it, push the reply back on the same socket.
/// Send failures mean the client is gone; they are logged and end the session, never retried.
pub async fn run_session(
    state: Arc<AppState>,
    admin: AdminInfo,
    mut session: Session,
    mut msg_stream: MessageStream,
) {
    let session_id = state.registry.register(session.clone(), admin.clone());
    while let Some(Ok(msg)) = msg_stream.next().await {
        match msg {
            Message::Ping(bytes) => {
                if session.pong(&bytes).await.is_err() {
                    break;
                }
            },
            Message::Text(text) => {
                let reply = dispatch(&state, &admin, &text).await;
                if session.text(reply.to_string()).await.is_err() {
                    info!("💻️ Could not send response - client disconnected");
                    break;
                }
            },
            Message::Close(reason) => {
                debug!("💻️ Session #{session_id} closed by peer: {reason:?}");
                break;
            },
            _ => {},
        }
    }
    state.registry.unregister(session_id);
}
