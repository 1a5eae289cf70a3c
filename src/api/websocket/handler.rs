// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! WebSocket endpoint: named-message loop over the detection pool

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use tracing::{debug, info, warn};

use super::messages::{InboundEvent, SocketFrame};
use super::session::ClientSession;
use crate::api::http_server::AppState;
use crate::api::pool::DetectionPool;

/// GET /v1/ws
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.max_message_size(state.max_message_bytes)
        .max_frame_size(state.max_message_bytes)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Turn one text frame into at most one reply
///
/// Events we do not answer yield `SocketReply::Ignore`.
pub async fn handle_frame(
    pool: &DetectionPool,
    session: &mut ClientSession,
    text: &str,
) -> SocketReply {
    let frame = match SocketFrame::parse(text) {
        Ok(frame) => frame,
        Err(e) => return SocketReply::Send(session.on_error("frame", &e)),
    };

    let Some(event) = InboundEvent::from_name(&frame.event) else {
        debug!(client_id = %session.id, "Ignoring unhandled event '{}'", frame.event);
        return SocketReply::Ignore;
    };

    session.record_message();
    match pool
        .run(session.id.clone(), frame.data, event.forced_mode())
        .await
    {
        Ok(envelope) => match SocketFrame::reply(event.reply_event(), &envelope) {
            Ok(reply) => SocketReply::Send(reply),
            Err(e) => SocketReply::Send(session.on_error("serialization", &e)),
        },
        Err(e) => SocketReply::Send(session.on_error("worker", &e)),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketReply {
    Send(SocketFrame),
    Ignore,
}

async fn send_frame(socket: &mut WebSocket, session: &ClientSession, frame: &SocketFrame) -> bool {
    let text = match frame.to_text() {
        Ok(text) => text,
        Err(e) => {
            session.on_send_failure(&e);
            return false;
        }
    };
    match socket.send(Message::Text(text)).await {
        Ok(()) => true,
        Err(e) => {
            session.on_send_failure(&e);
            false
        }
    }
}

/// Per-connection loop; messages are handled in arrival order
pub async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut session = ClientSession::new();

    let ack = session.on_connect();
    if !send_frame(&mut socket, &session, &ack).await {
        session.on_disconnect();
        return;
    }

    while let Some(msg) = socket.recv().await {
        let reply = match msg {
            Ok(Message::Text(text)) => handle_frame(&state.pool, &mut session, &text).await,
            Ok(Message::Binary(_)) => {
                SocketReply::Send(session.on_error("frame", &"binary frames are not supported"))
            }
            Ok(Message::Close(_)) => break,
            // ping/pong are answered by the protocol layer
            Ok(_) => SocketReply::Ignore,
            Err(e) => {
                warn!(client_id = %session.id, "WebSocket receive error: {}", e);
                break;
            }
        };

        if let SocketReply::Send(frame) = reply {
            if !send_frame(&mut socket, &session, &frame).await {
                info!(client_id = %session.id, "Ending connection after failed send");
                break;
            }
        }
    }

    session.on_disconnect();
}
