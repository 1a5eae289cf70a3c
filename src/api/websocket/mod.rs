// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod handler;
pub mod messages;
pub mod session;

pub use handler::{handle_frame, handle_socket, websocket_handler, SocketReply};
pub use messages::{InboundEvent, SocketFrame, CONNECTED_MESSAGE, RESPONSE_EVENT};
pub use session::ClientSession;
