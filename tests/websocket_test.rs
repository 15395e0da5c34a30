// End-to-end tests that serve the relay routes in-process and drive them
// with real WebSocket clients

use futures_util::{SinkExt, StreamExt};
use presence_relay::config::ServerConfig;
use presence_relay::core::{create_router, SharedRouter};
use presence_relay::handlers::routes;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

// Serve the routes on an ephemeral port
fn start_relay() -> (SocketAddr, SharedRouter) {
    let router = create_router();
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..ServerConfig::default()
    };
    let (addr, server) =
        warp::serve(routes(router.clone(), &config)).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    (addr, router)
}

async fn connect(addr: SocketAddr) -> WsClient {
    let (ws, _) = connect_async(format!("ws://{}/ws", addr))
        .await
        .expect("Failed to connect");
    ws
}

async fn send(ws: &mut WsClient, payload: &Value) {
    ws.send(Message::Text(payload.to_string()))
        .await
        .expect("Failed to send");
}

// Next text frame, parsed
async fn next_event(ws: &mut WsClient) -> Value {
    loop {
        let msg = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("Timed out waiting for event")
            .expect("Stream ended")
            .expect("WebSocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).expect("Invalid JSON");
        }
    }
}

async fn wait_for_members(router: &SharedRouter, room: &str, expected: usize) {
    for _ in 0..100 {
        if router.room_members(room).await.len() == expected {
            return;
        }
        sleep(Duration::from_millis(50)).await;
    }
    panic!("room {} never reached {} members", room, expected);
}

fn event(user: &str, kind: &str, room: &str) -> Value {
    json!({ "userId": user, "username": user.to_lowercase(), "type": kind, "roomId": room })
}

#[tokio::test]
async fn test_lobby_scenario_over_websocket() {
    let (addr, router) = start_relay();
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;

    // Malformed frames are dropped without a reply
    a.send(Message::Text("garbage".to_string())).await.unwrap();

    send(&mut a, &event("A", "join", "lobby")).await;
    send(&mut b, &event("B", "join", "lobby")).await;
    wait_for_members(&router, "lobby", 2).await;

    let mut hi = event("A", "message", "lobby");
    hi["text"] = json!("hi");
    send(&mut a, &hi).await;
    assert_eq!(next_event(&mut a).await, hi);
    assert_eq!(next_event(&mut b).await, hi);

    let typing = event("A", "typing", "lobby");
    send(&mut a, &typing).await;
    assert_eq!(next_event(&mut b).await, typing);

    // A's next frame is its own follow-up message, not the typing echo
    let mut follow_up = event("A", "message", "lobby");
    follow_up["text"] = json!("still here");
    send(&mut a, &follow_up).await;
    assert_eq!(next_event(&mut a).await, follow_up);
    assert_eq!(next_event(&mut b).await, follow_up);

    // Dropping the socket counts as a disconnect
    b.close(None).await.unwrap();
    wait_for_members(&router, "lobby", 1).await;
    assert!(router.room_members("lobby").await.contains("A"));
    assert!(!router.is_connected("B").await);

    let alone = event("A", "message", "lobby");
    send(&mut a, &alone).await;
    assert_eq!(next_event(&mut a).await, alone);
}

#[tokio::test]
async fn test_explicit_disconnect_event() {
    let (addr, router) = start_relay();
    let mut a = connect(addr).await;

    send(&mut a, &event("A", "join", "room")).await;
    wait_for_members(&router, "room", 1).await;

    send(&mut a, &event("A", "disconnect", "room")).await;
    wait_for_members(&router, "room", 0).await;
    assert!(!router.is_connected("A").await);
}

#[tokio::test]
async fn test_shutdown_closes_clients() {
    let (addr, router) = start_relay();
    let mut a = connect(addr).await;

    send(&mut a, &event("A", "join", "room")).await;
    wait_for_members(&router, "room", 1).await;

    assert_eq!(router.shutdown().await, 1);
    let frame = timeout(Duration::from_secs(5), a.next())
        .await
        .expect("Timed out waiting for close");
    assert!(matches!(frame, None | Some(Ok(Message::Close(_))) | Some(Err(_))));
}

#[tokio::test]
async fn test_health_and_stats_endpoints() {
    let (addr, router) = start_relay();
    let mut a = connect(addr).await;
    send(&mut a, &event("A", "join", "lobby")).await;
    wait_for_members(&router, "lobby", 1).await;

    let health = reqwest::get(format!("http://{}/health", addr))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(health, "OK");

    let stats: Value = reqwest::get(format!("http://{}/stats", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["sessions"], 1);
    assert_eq!(stats["rooms"][0]["roomId"], "lobby");
    assert_eq!(stats["rooms"][0]["members"], 1);
}
