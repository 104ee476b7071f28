//! Client driver: one session state machine bound to one connection.
//!
//! The driver runs in its own Tokio task. Inbound frames, local actions
//! from a [`ClientHandle`], and the optional stall timer all feed the same
//! loop, so the [`SessionMachine`] sees them strictly one at a time.
//!
//! ```text
//!   ClientHandle ──(command + oneshot reply)──┐
//!                                             ▼
//!   Connection ──(recv)──→ Driver ──→ SessionMachine ──→ Output
//!        ▲                   │                             │
//!        └────(send)─────────┴─── outbound ◄───────────────┤
//!                                 events ──(unbounded)──→ presentation
//! ```

use std::time::Duration;

use cowbull_protocol::{Codec, Envelope, JsonCodec, ServerMessage};
use cowbull_session::{InputProvider, Opponent, Output, SessionError, SessionEvent, SessionMachine};
use cowbull_transport::{ClientConnection, Connection};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::CowbullError;

/// Events stream for the presentation layer.
pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address.
    ///
    /// Default: `ws://127.0.0.1:8080/websocket`.
    pub url: String,

    /// Abandon a match after this long without hearing from the server.
    ///
    /// Default: `None` (wait forever).
    pub stall_timeout: Option<Duration>,

    /// Capacity of the local action queue.
    ///
    /// Default: 16.
    pub command_channel_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8080/websocket".to_string(),
            stall_timeout: None,
            command_channel_size: 16,
        }
    }
}

/// Builder for a client connection.
///
/// # Example
///
/// ```rust,no_run
/// use cowbull::prelude::*;
///
/// # async fn run() -> Result<(), CowbullError> {
/// let (client, mut events) = Client::builder()
///     .url("ws://127.0.0.1:8080/websocket")
///     .connect(ScriptedInput::new("alice"))
///     .await?;
///
/// client.start_match(4, Opponent::Ai).await?;
/// while let Some(event) = events.recv().await {
///     println!("{event:?}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server URL.
    pub fn url(mut self, url: &str) -> Self {
        self.config.url = url.to_string();
        self
    }

    /// Abandons a match after `timeout` without any inbound message.
    pub fn stall_timeout(mut self, timeout: Duration) -> Self {
        self.config.stall_timeout = Some(timeout);
        self
    }

    /// Replaces the whole client configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Opens a WebSocket connection to the configured URL and starts
    /// the driver on it.
    pub async fn connect<I>(self, input: I) -> Result<(ClientHandle, EventReceiver), CowbullError>
    where
        I: InputProvider + 'static,
    {
        let conn = ClientConnection::connect(&self.config.url).await?;
        Ok(self.spawn(conn, JsonCodec, input))
    }

    /// Starts the driver on an already-open connection.
    pub fn spawn<Conn, C, I>(
        self,
        conn: Conn,
        codec: C,
        input: I,
    ) -> (ClientHandle, EventReceiver)
    where
        Conn: Connection,
        C: Codec,
        I: InputProvider + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel(self.config.command_channel_size);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let driver = Driver {
            conn,
            codec,
            machine: SessionMachine::new(input),
            commands: cmd_rx,
            events: event_tx,
            stall_timeout: self.config.stall_timeout,
            last_inbound: Instant::now(),
        };
        tokio::spawn(driver.run());

        (ClientHandle { sender: cmd_tx }, event_rx)
    }
}

/// Entry point for clients.
pub struct Client;

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Local actions, each with a reply channel.
enum ClientCommand {
    StartMatch {
        digits: usize,
        opponent: Opponent,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    SubmitGuess {
        number: String,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Disconnect {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to a running client driver.
///
/// Cheap to clone. When every handle is dropped the driver disconnects.
#[derive(Clone)]
pub struct ClientHandle {
    sender: mpsc::Sender<ClientCommand>,
}

impl ClientHandle {
    /// Starts a match as the guesser.
    ///
    /// # Errors
    /// Whatever [`SessionMachine::start_match`] refuses with, or
    /// `SessionError::Closed` once the driver has stopped.
    pub async fn start_match(&self, digits: usize, opponent: Opponent) -> Result<(), CowbullError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.call(
            ClientCommand::StartMatch {
                digits,
                opponent,
                reply: reply_tx,
            },
            reply_rx,
        )
        .await?
        .map_err(CowbullError::from)
    }

    /// Sends a guess in the current match.
    pub async fn submit_guess(&self, number: &str) -> Result<(), CowbullError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.call(
            ClientCommand::SubmitGuess {
                number: number.to_owned(),
                reply: reply_tx,
            },
            reply_rx,
        )
        .await?
        .map_err(CowbullError::from)
    }

    /// Closes the connection. A `Disconnected` event follows.
    pub async fn disconnect(&self) -> Result<(), CowbullError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.call(ClientCommand::Disconnect { reply: reply_tx }, reply_rx)
            .await
    }

    async fn call<T>(
        &self,
        command: ClientCommand,
        reply: oneshot::Receiver<T>,
    ) -> Result<T, CowbullError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(reply.await.map_err(|_| SessionError::Closed)?)
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

struct Driver<Conn, C, I> {
    conn: Conn,
    codec: C,
    machine: SessionMachine<I>,
    commands: mpsc::Receiver<ClientCommand>,
    events: mpsc::UnboundedSender<SessionEvent>,
    stall_timeout: Option<Duration>,
    last_inbound: Instant,
}

/// Whether the driver loop keeps going.
enum Flow {
    Continue,
    Stop,
}

impl<Conn, C, I> Driver<Conn, C, I>
where
    Conn: Connection,
    C: Codec,
    I: InputProvider,
{
    async fn run(mut self) {
        let conn_id = self.conn.id();
        tracing::debug!(%conn_id, "client driver started");

        let out = self.machine.on_open().await;
        self.flush(out).await;

        loop {
            let stall_at = self.stall_deadline();
            let flow = tokio::select! {
                inbound = self.conn.recv() => match inbound {
                    Ok(Some(text)) => {
                        self.last_inbound = Instant::now();
                        let out = self.on_frame(&text).await;
                        self.flush(out).await;
                        Flow::Continue
                    }
                    Ok(None) => {
                        tracing::info!(%conn_id, "server closed the connection");
                        Flow::Stop
                    }
                    Err(e) => {
                        tracing::warn!(%conn_id, error = %e, "connection lost");
                        Flow::Stop
                    }
                },
                command = self.commands.recv() => match command {
                    Some(command) => self.on_command(command).await,
                    None => Flow::Stop,
                },
                () = sleep_until_or_forever(stall_at) => {
                    let out = self.machine.abandon_match();
                    self.flush(out).await;
                    Flow::Continue
                }
            };
            if let Flow::Stop = flow {
                break;
            }
        }

        let out = self.machine.on_close();
        self.flush(out).await;
        if let Err(e) = self.conn.close().await {
            tracing::debug!(%conn_id, error = %e, "close failed");
        }
        tracing::debug!(%conn_id, "client driver stopped");
    }

    /// When the current match counts as stalled, if it can.
    fn stall_deadline(&self) -> Option<Instant> {
        let timeout = self.stall_timeout?;
        self.machine
            .phase()
            .in_game()
            .then(|| self.last_inbound + timeout)
    }

    async fn on_frame(&mut self, text: &str) -> Output {
        let msg = match Envelope::from_text(&self.codec, text)
            .and_then(|envelope| ServerMessage::decode(&self.codec, &envelope))
        {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(error = %e, "dropping malformed frame");
                return Output::default();
            }
        };
        self.machine.handle(msg).await
    }

    async fn on_command(&mut self, command: ClientCommand) -> Flow {
        match command {
            ClientCommand::StartMatch {
                digits,
                opponent,
                reply,
            } => {
                let result = self.machine.start_match(digits, opponent);
                if result.is_ok() {
                    // The stall clock starts with the match.
                    self.last_inbound = Instant::now();
                }
                let _ = reply.send(self.apply(result).await);
                Flow::Continue
            }
            ClientCommand::SubmitGuess { number, reply } => {
                let result = self.machine.submit_guess(&number);
                let _ = reply.send(self.apply(result).await);
                Flow::Continue
            }
            ClientCommand::Disconnect { reply } => {
                let _ = reply.send(());
                Flow::Stop
            }
        }
    }

    async fn apply(&mut self, result: Result<Output, SessionError>) -> Result<(), SessionError> {
        let out = result?;
        self.flush(out).await;
        Ok(())
    }

    /// Sends the outbound messages in order, then publishes the events.
    async fn flush(&mut self, out: Output) {
        for msg in out.outbound {
            let text = match msg
                .encode(&self.codec)
                .and_then(|envelope| envelope.to_text(&self.codec))
            {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode message");
                    continue;
                }
            };
            if let Err(e) = self.conn.send(&text).await {
                tracing::warn!(error = %e, name = msg.name(), "send failed");
            }
        }
        for event in out.events {
            // Nobody listening is fine.
            let _ = self.events.send(event);
        }
    }
}

async fn sleep_until_or_forever(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
