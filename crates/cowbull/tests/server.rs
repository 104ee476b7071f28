//! Integration tests for the Cowbull server, driven by raw WebSocket clients
//! that speak the wire protocol directly.

use std::time::Duration;

use cowbull::game::{AiGuesser, DigitSequence, Guesser, score};
use cowbull::prelude::*;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port and returns the address.
async fn start_server() -> String {
    let server = CowbullServer::builder()
        .bind("127.0.0.1:0")
        .reply_timeout(Duration::from_secs(5))
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/websocket"))
        .await
        .expect("should connect");
    ws
}

/// Sends `{name, data}` where `data` is the JSON text of `payload`, or
/// empty for `Value::Null`.
async fn send(ws: &mut ClientWs, name: &str, payload: Value) {
    let data = match payload {
        Value::Null => String::new(),
        other => other.to_string(),
    };
    let frame = json!({ "name": name, "data": data }).to_string();
    ws.send(Message::Text(frame.into())).await.expect("send");
}

/// Receives the next envelope, returning its name and decoded data
/// (`Value::Null` for empty data).
async fn recv(ws: &mut ClientWs) -> (String, Value) {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for a message")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            let envelope: Value = serde_json::from_str(text.as_str()).expect("envelope json");
            let name = envelope["name"].as_str().expect("name").to_owned();
            let data = envelope["data"].as_str().unwrap_or_default();
            let data = if data.is_empty() {
                Value::Null
            } else {
                serde_json::from_str(data).expect("data json")
            };
            return (name, data);
        }
    }
}

/// Receives envelopes until one named `name` arrives.
async fn recv_named(ws: &mut ClientWs, name: &str) -> Value {
    loop {
        let (got, data) = recv(ws).await;
        if got == name {
            return data;
        }
    }
}

async fn join(ws: &mut ClientWs, name: &str) -> Value {
    send(ws, "name", json!({ "name": name })).await;
    send(ws, "connect", Value::Null).await;
    recv_named(ws, "players").await
}

fn names(players: &Value) -> Vec<&str> {
    players
        .as_array()
        .expect("players array")
        .iter()
        .map(|p| p["name"].as_str().unwrap_or_default())
        .collect()
}

// =========================================================================
// Roster
// =========================================================================

#[tokio::test]
async fn test_connect_broadcasts_roster_to_everyone() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;

    let roster = join(&mut alice, "alice").await;
    assert_eq!(names(&roster), ["alice"]);
    let id = roster[0]["id"].as_str().unwrap();
    assert_eq!(id.len(), 32);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));

    let roster = join(&mut bob, "bob").await;
    assert_eq!(names(&roster), ["alice", "bob"]);
    let roster = recv_named(&mut alice, "players").await;
    assert_eq!(names(&roster), ["alice", "bob"]);
}

#[tokio::test]
async fn test_disconnect_broadcasts_roster_without_player() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;
    join(&mut alice, "alice").await;
    join(&mut bob, "bob").await;
    recv_named(&mut alice, "players").await;

    bob.close(None).await.unwrap();

    let roster = recv_named(&mut alice, "players").await;
    assert_eq!(names(&roster), ["alice"]);
}

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    ws.send(Message::Text("not json".to_string().into()))
        .await
        .unwrap();
    send(&mut ws, "play", json!("nope")).await;
    send(&mut ws, "chat", json!({ "text": "hi" })).await;

    let roster = join(&mut ws, "carol").await;
    assert_eq!(names(&roster), ["carol"]);
}

#[tokio::test]
async fn test_non_utf8_binary_frame_keeps_connection_open() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    ws.send(Message::Binary(vec![0xff, 0xfe, 0xfd].into()))
        .await
        .unwrap();

    let roster = join(&mut ws, "dave").await;
    assert_eq!(names(&roster), ["dave"]);
}

// =========================================================================
// Matches against the AI
// =========================================================================

#[tokio::test]
async fn test_ai_thinker_match_ends_when_guess_is_right() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    join(&mut ws, "guesser").await;

    send(
        &mut ws,
        "play",
        json!({ "AI": true, "digits": 3, "role": "guesser", "opponents": [] }),
    )
    .await;

    let mut solver = AiGuesser::new(3).unwrap();
    for _ in 0..50 {
        let request = recv_named(&mut ws, "guess").await;
        assert_eq!(request["digits"], 3);

        let number = solver.guess(3).await.unwrap();
        send(&mut ws, "guess", json!({ "number": number })).await;

        let told = recv_named(&mut ws, "tell").await;
        let result = Score::new(
            told["cows"].as_u64().unwrap() as usize,
            told["bulls"].as_u64().unwrap() as usize,
        );
        if result.is_win(3) {
            return;
        }
        solver.tell(&number, result).await.unwrap();
    }
    panic!("AI secret not found in 50 guesses");
}

#[tokio::test]
async fn test_ai_guesser_match_finds_raw_thinker_number() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    join(&mut ws, "thinker").await;

    send(
        &mut ws,
        "play",
        json!({ "AI": true, "digits": 3, "role": "thinker", "opponents": [] }),
    )
    .await;

    let request = recv_named(&mut ws, "think").await;
    assert_eq!(request["digits"], 3);
    send(&mut ws, "think", json!({ "digits": 3 })).await;

    let secret: DigitSequence = "507".parse().unwrap();
    for _ in 0..50 {
        let request = recv_named(&mut ws, "try").await;
        let number = request["number"].as_str().unwrap().to_owned();
        let guess: DigitSequence = number.parse().unwrap();
        let result = score(&secret, &guess).unwrap();
        send(
            &mut ws,
            "try",
            json!({ "cows": result.cows, "bulls": result.bulls }),
        )
        .await;
        if number == "507" {
            return;
        }
    }
    panic!("AI guesser did not find the number in 50 guesses");
}

// =========================================================================
// Matches between players
// =========================================================================

#[tokio::test]
async fn test_play_against_player_routes_requests_between_them() {
    let addr = start_server().await;
    let mut alice = connect(&addr).await;
    let mut bob = connect(&addr).await;
    join(&mut alice, "alice").await;
    let roster = join(&mut bob, "bob").await;
    let bob_id = roster[1]["id"].as_str().unwrap().to_owned();

    send(
        &mut alice,
        "play",
        json!({ "AI": false, "digits": 2, "role": "guesser", "opponents": [bob_id] }),
    )
    .await;

    // Bob is asked to think, with the digit count alice asked for.
    let request = recv_named(&mut bob, "think").await;
    assert_eq!(request["digits"], 2);
    send(&mut bob, "think", json!({ "digits": 2 })).await;

    // Alice guesses; bob scores; alice is told.
    let request = recv_named(&mut alice, "guess").await;
    assert_eq!(request["digits"], 2);
    send(&mut alice, "guess", json!({ "number": "12" })).await;

    let request = recv_named(&mut bob, "try").await;
    assert_eq!(request["number"], "12");
    send(&mut bob, "try", json!({ "cows": 1, "bulls": 0 })).await;

    let told = recv_named(&mut alice, "tell").await;
    assert_eq!(told, json!({ "cows": 1, "bulls": 0 }));

    // Winning round.
    recv_named(&mut alice, "guess").await;
    send(&mut alice, "guess", json!({ "number": "21" })).await;
    recv_named(&mut bob, "try").await;
    send(&mut bob, "try", json!({ "cows": 0, "bulls": 2 })).await;
    let told = recv_named(&mut alice, "tell").await;
    assert_eq!(told, json!({ "cows": 0, "bulls": 2 }));
}

#[tokio::test]
async fn test_play_without_connected_opponent_starts_nothing() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    join(&mut ws, "lonely").await;

    send(
        &mut ws,
        "play",
        json!({ "AI": false, "digits": 4, "role": "guesser", "opponents": ["nobody"] }),
    )
    .await;

    let next = tokio::time::timeout(Duration::from_millis(200), ws.next()).await;
    assert!(next.is_err(), "expected silence, got {next:?}");
}
