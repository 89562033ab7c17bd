//! Exercises the HTTP `/health` route and a full master/child/controller
//! WebSocket round trip against the real router.

use std::time::Duration;

use airjam::{build_app, AuthMode};
use airjam_auth::DevVerifier;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio_tungstenite::tungstenite::Message;

type Ws = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn start() -> String {
    let (router, shutdown) = build_app(AuthMode::Dev(DevVerifier)).await;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).with_graceful_shutdown(shutdown).await;
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn ws(addr: &str) -> Ws {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await.unwrap();
    ws
}

async fn send(ws: &mut Ws, event: Value) {
    ws.send(Message::Text(event.to_string().into())).await.unwrap();
}

/// Collects every frame that arrives within `window` of the previous one.
/// The ack for a registration-class call and the room-actor broadcasts it
/// triggers travel over two independently scheduled paths (a direct reply
/// vs. the connection's outbound channel), so relative order between them
/// isn't guaranteed — callers match on content, not position.
async fn drain(ws: &mut Ws, window: Duration) -> Vec<Value> {
    let mut out = Vec::new();
    loop {
        match tokio::time::timeout(window, ws.next()).await {
            Ok(Some(Ok(msg))) if !msg.is_close() => out.push(serde_json::from_slice(&msg.into_data()).unwrap()),
            _ => break,
        }
    }
    out
}

fn has_type(frames: &[Value], type_name: &str) -> bool {
    frames.iter().any(|f| f.get("type").and_then(Value::as_str) == Some(type_name))
}

fn find_type<'a>(frames: &'a [Value], type_name: &str) -> &'a Value {
    frames
        .iter()
        .find(|f| f.get("type").and_then(Value::as_str) == Some(type_name))
        .unwrap_or_else(|| panic!("expected a {type_name} frame, got {frames:?}"))
}

fn ack_ok(frames: &[Value]) -> bool {
    frames.iter().any(|f| f.get("ok").and_then(Value::as_bool) == Some(true))
}

#[tokio::test]
async fn health_check_reports_ok() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let addr = start().await;
    let mut stream = tokio::net::TcpStream::connect(&addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    let text = String::from_utf8_lossy(&buf);
    let body = text.split("\r\n\r\n").nth(1).unwrap();
    let response: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(response, json!({"ok": true}));
}

#[tokio::test]
async fn master_launch_and_controller_join_round_trip() {
    let window = Duration::from_millis(300);
    let addr = start().await;
    let room_id = "TEST01";

    let mut master = ws(&addr).await;
    send(
        &mut master,
        json!({"type": "host:registerSystem", "roomId": room_id, "apiKey": "anything-in-dev-mode"}),
    )
    .await;
    let frames = drain(&mut master, window).await;
    assert!(ack_ok(&frames), "expected an ok ack, got {frames:?}");
    assert!(has_type(&frames, "server:roomReady"));

    send(
        &mut master,
        json!({"type": "system:launchGame", "roomId": room_id, "gameId": "demo", "gameUrl": "https://example.test/game"}),
    )
    .await;
    let frames = drain(&mut master, window).await;
    assert!(ack_ok(&frames), "expected an ok ack, got {frames:?}");

    let mut controller = ws(&addr).await;
    send(
        &mut controller,
        json!({"type": "controller:join", "roomId": room_id, "controllerId": "c-1", "nickname": "Ada"}),
    )
    .await;
    let frames = drain(&mut controller, window).await;
    assert!(ack_ok(&frames), "expected an ok ack, got {frames:?}");
    assert!(has_type(&frames, "server:welcome"));
    assert!(has_type(&frames, "server:state"));
    assert!(has_type(&frames, "client:loadUi"));
    let welcome = find_type(&frames, "server:welcome");
    assert_eq!(welcome["player"]["id"], json!("c-1"));

    let frames = drain(&mut master, window).await;
    let joined = find_type(&frames, "server:controllerJoined");
    assert_eq!(joined["controllerId"], json!("c-1"));

    send(
        &mut controller,
        json!({"type": "controller:input", "roomId": room_id, "controllerId": "c-1", "input": {"x": 1}}),
    )
    .await;
    let frames = drain(&mut master, window).await;
    let input = find_type(&frames, "server:input");
    assert_eq!(input["controllerId"], json!("c-1"));
    assert_eq!(input["input"], json!({"x": 1}));
}
