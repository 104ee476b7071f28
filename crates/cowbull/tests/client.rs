//! Integration tests for the client driver: full matches against a real
//! server, and driver behavior over an in-memory connection.

use std::time::Duration;

use cowbull::game::{AiGuesser, Guesser};
use cowbull::prelude::*;
use cowbull::protocol::JsonCodec;
use cowbull::session::SessionError;
use cowbull::transport::{Connection, ConnectionId, TransportError};
use serde_json::{Value, json};
use tokio::sync::{Mutex, mpsc};

// =========================================================================
// Helpers
// =========================================================================

async fn start_server() -> String {
    let server = CowbullServer::builder()
        .bind("127.0.0.1:0")
        .reply_timeout(Duration::from_secs(5))
        .build()
        .await
        .expect("server should build");
    let url = format!("ws://{}/websocket", server.local_addr().unwrap());
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    url
}

async fn next_event(events: &mut EventReceiver) -> SessionEvent {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event stream ended")
}

/// Waits for a roster that lists `name`.
async fn wait_for_player(events: &mut EventReceiver, name: &str) {
    loop {
        if let SessionEvent::RosterUpdated { players } = next_event(events).await {
            if players.iter().any(|p| p.name == name) {
                return;
            }
        }
    }
}

/// Plays the guesser side with an AI solver until the match ends.
/// Returns whether it was won.
async fn solve(client: &ClientHandle, events: &mut EventReceiver) -> bool {
    let mut solver: Option<AiGuesser> = None;
    let mut last = String::new();
    loop {
        match next_event(events).await {
            SessionEvent::GuessRequested { digits } => {
                let solver = solver.get_or_insert_with(|| AiGuesser::new(digits).unwrap());
                last = solver.guess(digits).await.unwrap();
                client.submit_guess(&last).await.unwrap();
            }
            SessionEvent::ScoreReceived { score, is_win } => {
                if !is_win {
                    solver.as_mut().unwrap().tell(&last, score).await.unwrap();
                }
            }
            SessionEvent::MatchEnded { won } => return won,
            SessionEvent::MatchAbandoned | SessionEvent::Disconnected => return false,
            _ => {}
        }
    }
}

// =========================================================================
// End to end
// =========================================================================

#[tokio::test]
async fn test_client_registers_and_sees_itself_on_roster() {
    let url = start_server().await;
    let (_client, mut events) = Client::builder()
        .url(&url)
        .connect(ScriptedInput::new("alice"))
        .await
        .unwrap();

    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::Registered {
            name: "alice".into()
        }
    );
    wait_for_player(&mut events, "alice").await;
}

#[tokio::test]
async fn test_client_wins_against_ai_thinker() {
    let url = start_server().await;
    let (client, mut events) = Client::builder()
        .url(&url)
        .connect(ScriptedInput::new("alice"))
        .await
        .unwrap();
    wait_for_player(&mut events, "alice").await;

    client.start_match(3, Opponent::Ai).await.unwrap();
    assert!(solve(&client, &mut events).await);
}

#[tokio::test]
async fn test_two_clients_play_a_match() {
    let url = start_server().await;
    let (bob, mut bob_events) = Client::builder()
        .url(&url)
        .connect(ScriptedInput::new("bob").with_secret("4071"))
        .await
        .unwrap();
    wait_for_player(&mut bob_events, "bob").await;

    let (alice, mut alice_events) = Client::builder()
        .url(&url)
        .connect(ScriptedInput::new("alice"))
        .await
        .unwrap();
    wait_for_player(&mut alice_events, "bob").await;

    alice
        .start_match(4, Opponent::Named("bob".into()))
        .await
        .unwrap();
    assert!(solve(&alice, &mut alice_events).await);

    // Bob thought of 4071, answered every guess, and lost.
    let mut started = false;
    loop {
        match next_event(&mut bob_events).await {
            SessionEvent::MatchStarted { role } => {
                assert_eq!(role, Role::Thinker);
                started = true;
            }
            SessionEvent::OpponentScoreSent { is_win: true, .. } => assert!(started),
            SessionEvent::MatchEnded { won } => {
                assert!(!won);
                break;
            }
            _ => {}
        }
    }
    drop(bob);
}

#[tokio::test]
async fn test_start_match_unknown_opponent_returns_error() {
    let url = start_server().await;
    let (client, mut events) = Client::builder()
        .url(&url)
        .connect(ScriptedInput::new("alice"))
        .await
        .unwrap();
    wait_for_player(&mut events, "alice").await;

    let result = client.start_match(4, Opponent::Named("ghost".into())).await;
    assert!(matches!(
        result,
        Err(CowbullError::Session(SessionError::UnknownOpponent(name))) if name == "ghost"
    ));
}

// =========================================================================
// In-memory connection
// =========================================================================

/// A connection whose far end is a pair of channels held by the test.
struct MemoryConnection {
    inbound: Mutex<mpsc::UnboundedReceiver<String>>,
    outbound: mpsc::UnboundedSender<String>,
}

impl Connection for MemoryConnection {
    type Error = TransportError;

    async fn send(&self, text: &str) -> Result<(), TransportError> {
        self.outbound
            .send(text.to_owned())
            .map_err(|_| TransportError::ConnectionClosed("peer gone".into()))
    }

    async fn recv(&self) -> Result<Option<String>, TransportError> {
        Ok(self.inbound.lock().await.recv().await)
    }

    async fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        ConnectionId::new(1)
    }
}

/// The test's end of a [`MemoryConnection`].
struct Server {
    to_client: mpsc::UnboundedSender<String>,
    from_client: mpsc::UnboundedReceiver<String>,
}

impl Server {
    fn push(&self, name: &str, data: Value) {
        let data = match data {
            Value::Null => String::new(),
            other => other.to_string(),
        };
        let frame = json!({ "name": name, "data": data }).to_string();
        self.to_client.send(frame).unwrap();
    }

    async fn next_frame(&mut self) -> Value {
        let text = tokio::time::timeout(Duration::from_secs(5), self.from_client.recv())
            .await
            .expect("timed out waiting for a frame")
            .expect("client closed");
        serde_json::from_str(&text).unwrap()
    }
}

fn spawn_memory_client(
    builder: ClientBuilder,
    input: ScriptedInput,
) -> (ClientHandle, EventReceiver, Server) {
    let (to_client, inbound) = mpsc::unbounded_channel();
    let (outbound, from_client) = mpsc::unbounded_channel();
    let conn = MemoryConnection {
        inbound: Mutex::new(inbound),
        outbound,
    };
    let (handle, events) = builder.spawn(conn, JsonCodec, input);
    (
        handle,
        events,
        Server {
            to_client,
            from_client,
        },
    )
}

#[tokio::test]
async fn test_driver_sends_name_then_connect_on_open() {
    let (_client, _events, mut server) =
        spawn_memory_client(Client::builder(), ScriptedInput::new("dora"));

    let first = server.next_frame().await;
    assert_eq!(first["name"], "name");
    assert_eq!(first["data"], r#"{"name":"dora"}"#);
    let second = server.next_frame().await;
    assert_eq!(second["name"], "connect");
    assert_eq!(second["data"], "");
}

#[tokio::test]
async fn test_driver_drops_malformed_frames_and_keeps_going() {
    let (_client, mut events, server) =
        spawn_memory_client(Client::builder(), ScriptedInput::new("dora"));
    next_event(&mut events).await; // Registered

    server.to_client.send("{{{".into()).unwrap();
    server.push("tell", json!("not a score"));
    server.push("players", json!([{ "id": "x", "name": "xena" }]));

    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::RosterUpdated {
            players: vec![PlayerInfo {
                id: "x".into(),
                name: "xena".into()
            }]
        }
    );
}

#[tokio::test]
async fn test_driver_answers_try_while_thinking() {
    let (_client, mut events, mut server) = spawn_memory_client(
        Client::builder(),
        ScriptedInput::new("dora").with_secret("1234"),
    );
    server.next_frame().await; // name
    server.next_frame().await; // connect

    server.push("think", Value::Null);
    let think = server.next_frame().await;
    assert_eq!(think["name"], "think");
    assert_eq!(think["data"], r#"{"digits":4}"#);

    server.push("try", json!({ "number": "1243" }));
    let answer = server.next_frame().await;
    assert_eq!(answer["name"], "try");
    assert_eq!(answer["data"], r#"{"cows":2,"bulls":2}"#);

    let mut seen = Vec::new();
    while seen.len() < 4 {
        seen.push(next_event(&mut events).await);
    }
    assert_eq!(
        seen[1],
        SessionEvent::MatchStarted {
            role: Role::Thinker
        }
    );
}

#[tokio::test]
async fn test_driver_stall_timeout_abandons_match() {
    let (client, mut events, _server) = spawn_memory_client(
        Client::builder().stall_timeout(Duration::from_millis(50)),
        ScriptedInput::new("dora"),
    );
    next_event(&mut events).await; // Registered

    client.start_match(3, Opponent::Ai).await.unwrap();
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::MatchStarted {
            role: Role::Guesser
        }
    );
    assert_eq!(next_event(&mut events).await, SessionEvent::MatchAbandoned);

    // Back in the lobby: a guess is refused.
    assert!(matches!(
        client.submit_guess("123").await,
        Err(CowbullError::Session(SessionError::InvalidAction { .. }))
    ));
}

#[tokio::test]
async fn test_driver_without_stall_timeout_waits() {
    let (client, mut events, _server) =
        spawn_memory_client(Client::builder(), ScriptedInput::new("dora"));
    next_event(&mut events).await; // Registered

    client.start_match(3, Opponent::Ai).await.unwrap();
    next_event(&mut events).await; // MatchStarted
    let quiet = tokio::time::timeout(Duration::from_millis(100), events.recv()).await;
    assert!(quiet.is_err());
}

#[tokio::test]
async fn test_driver_server_close_disconnects() {
    let (client, mut events, server) =
        spawn_memory_client(Client::builder(), ScriptedInput::new("dora"));
    next_event(&mut events).await; // Registered

    drop(server);
    assert_eq!(next_event(&mut events).await, SessionEvent::Disconnected);
    assert!(events.recv().await.is_none());

    assert!(matches!(
        client.start_match(3, Opponent::Ai).await,
        Err(CowbullError::Session(SessionError::Closed))
    ));
}

#[tokio::test]
async fn test_disconnect_emits_disconnected() {
    let (client, mut events, _server) =
        spawn_memory_client(Client::builder(), ScriptedInput::new("dora"));
    next_event(&mut events).await; // Registered

    client.disconnect().await.unwrap();
    assert_eq!(next_event(&mut events).await, SessionEvent::Disconnected);
}
