// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Live WebSocket round trips against a served router

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use visionaid_node::api::{create_router, AppState};
use visionaid_node::detection::GENERIC_SERVER_ERROR;

use crate::common::{
    app_state, detection, dispatcher, png_base64, FakeObjects, FakeScenes, FakeText,
};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn serve(state: AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_router(state)).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{}/v1/ws", addr)).await.unwrap();
    client
}

async fn next_json(client: &mut Client) -> Value {
    let msg = tokio::time::timeout(Duration::from_secs(5), client.next())
        .await
        .expect("timed out waiting for frame")
        .expect("stream closed")
        .expect("receive failed");
    match msg {
        Message::Text(text) => serde_json::from_str(&text).unwrap(),
        other => panic!("unexpected frame: {:?}", other),
    }
}

async fn send_json(client: &mut Client, value: Value) {
    client.send(Message::Text(value.to_string())).await.unwrap();
}

fn state() -> AppState {
    app_state(dispatcher(
        Arc::new(FakeObjects::new(vec![
            detection("chair", 0.7, [0.1, 0.1, 0.3, 0.5]),
            detection("cup", 0.9, [0.5, 0.5, 0.6, 0.6]),
        ])),
        Arc::new(FakeScenes::new(12)),
        Arc::new(FakeText::new(&["en"], " STOP ")),
    ))
}

#[tokio::test]
async fn test_connect_ack_then_detection() {
    let addr = serve(state()).await;
    let mut client = connect(addr).await;

    let ack = next_json(&mut client).await;
    assert_eq!(
        ack,
        json!({"event": "response", "data": {"result": "Connected to VisionAid backend", "event": "connect"}})
    );

    send_json(
        &mut client,
        json!({"event": "message", "data": {"image": png_base64(8, 8), "type": "object_detection"}}),
    )
    .await;
    let reply = next_json(&mut client).await;
    assert_eq!(reply["event"], "response");
    assert_eq!(reply["data"]["result"]["status"], "ok");
    assert_eq!(reply["data"]["result"]["detections"][0]["name"], "cup");
    assert_eq!(reply["data"]["result"]["detections"][1]["name"], "chair");
}

#[tokio::test]
async fn test_replies_follow_request_order() {
    let addr = serve(state()).await;
    let mut client = connect(addr).await;
    next_json(&mut client).await;

    let image = png_base64(8, 8);
    send_json(
        &mut client,
        json!({"event": "message", "data": {"image": image, "type": "scene_detection"}}),
    )
    .await;
    send_json(
        &mut client,
        json!({"event": "message", "data": {"image": image, "type": "text_detection", "language": "de"}}),
    )
    .await;

    let first = next_json(&mut client).await;
    assert_eq!(first["data"]["result"], json!({"status": "ok", "scene": "Label 12"}));
    let second = next_json(&mut client).await;
    assert_eq!(second["data"]["result"], json!({"status": "ok", "text": "STOP"}));
}

#[tokio::test]
async fn test_alias_events_reply_on_their_own_channel() {
    let addr = serve(state()).await;
    let mut client = connect(addr).await;
    next_json(&mut client).await;

    send_json(
        &mut client,
        json!({"event": "ocr", "data": {"image": png_base64(8, 8)}}),
    )
    .await;
    let reply = next_json(&mut client).await;
    assert_eq!(reply["event"], "ocr-result");
    assert_eq!(reply["data"]["result"]["text"], "STOP");
}

#[tokio::test]
async fn test_bad_frames_get_generic_error_and_connection_survives() {
    let addr = serve(state()).await;
    let mut client = connect(addr).await;
    next_json(&mut client).await;

    client
        .send(Message::Text("{this is not json".to_string()))
        .await
        .unwrap();
    let reply = next_json(&mut client).await;
    assert_eq!(
        reply["data"]["result"],
        json!({"status": "error", "message": GENERIC_SERVER_ERROR})
    );

    client.send(Message::Binary(vec![1, 2, 3])).await.unwrap();
    let reply = next_json(&mut client).await;
    assert_eq!(reply["data"]["result"]["message"], GENERIC_SERVER_ERROR);

    // unknown events produce no reply; the next answer belongs to the scene request
    send_json(&mut client, json!({"event": "typing", "data": {}})).await;
    send_json(
        &mut client,
        json!({"event": "detect-scene", "data": {"image": png_base64(8, 8)}}),
    )
    .await;
    let reply = next_json(&mut client).await;
    assert_eq!(reply["event"], "scene-detection-result");
    assert_eq!(reply["data"]["result"]["scene"], "Label 12");
}

#[tokio::test]
async fn test_two_clients_are_independent() {
    let addr = serve(state()).await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    next_json(&mut a).await;
    next_json(&mut b).await;

    send_json(
        &mut a,
        json!({"event": "message", "data": {"image": "not-base64!!", "type": "object_detection"}}),
    )
    .await;
    send_json(
        &mut b,
        json!({"event": "message", "data": {"image": png_base64(8, 8), "type": "focus_detection", "focus_object": "CUP"}}),
    )
    .await;

    let reply_a = next_json(&mut a).await;
    let reply_b = next_json(&mut b).await;
    assert_eq!(reply_a["data"]["result"]["status"], "error");
    assert_eq!(reply_b["data"]["result"]["status"], "found");
    assert_eq!(reply_b["data"]["result"]["name"], "cup");
}
