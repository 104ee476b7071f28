//! `CowbullServer` builder and server loop.
//!
//! This is the entry point for running a Cowbull game server. It ties
//! together all the layers: transport → protocol → hub → matches.

use std::sync::Arc;
use std::time::Duration;

use cowbull_protocol::{Codec, JsonCodec};
use cowbull_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::hub::spawn_hub;
use crate::{CowbullError, HubHandle};

/// Server tuning knobs.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// How long a match waits for a connected player to answer a
    /// request before giving up on the match.
    ///
    /// Default: 60 seconds.
    pub reply_timeout: Duration,

    /// Capacity of the hub's command queue.
    ///
    /// Default: 64.
    pub hub_channel_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            reply_timeout: Duration::from_secs(60),
            hub_channel_size: 64,
        }
    }
}

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) hub: HubHandle,
    pub(crate) codec: C,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a Cowbull server.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use cowbull::prelude::*;
///
/// # async fn run() -> Result<(), CowbullError> {
/// let server = CowbullServer::builder()
///     .bind("0.0.0.0:8080")
///     .reply_timeout(Duration::from_secs(30))
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct CowbullServerBuilder {
    bind_addr: String,
    config: ServerConfig,
}

impl CowbullServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets how long matches wait for a player's reply.
    pub fn reply_timeout(mut self, timeout: Duration) -> Self {
        self.config.reply_timeout = timeout;
        self
    }

    /// Replaces the whole server configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and starts the hub.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<CowbullServer<JsonCodec>, CowbullError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let hub = spawn_hub(self.config.hub_channel_size);

        let state = Arc::new(ServerState {
            hub,
            codec: JsonCodec,
            config: self.config,
        });

        Ok(CowbullServer { transport, state })
    }
}

impl Default for CowbullServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Cowbull game server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct CowbullServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl CowbullServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> CowbullServerBuilder {
        CowbullServerBuilder::new()
    }
}

impl<C: Codec> CowbullServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// A handle to the server's player hub.
    pub fn hub(&self) -> HubHandle {
        self.state.hub.clone()
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a handler task for each accepted connection. Runs until the
    /// process is terminated.
    pub async fn run(mut self) -> Result<(), CowbullError> {
        tracing::info!(
            reply_timeout_secs = self.state.config.reply_timeout.as_secs_f64(),
            "Cowbull server running"
        );

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
