//! # Cowbull
//!
//! Bulls and cows, played over WebSockets.
//!
//! One player thinks of a number; the other guesses until every digit is
//! a bull. This crate ties the layers together:
//!
//! - [`CowbullServer`]: accepts connections, keeps a roster of players in
//!   a hub, and referees matches between players or against the AI.
//! - [`Client`]: drives one [`SessionMachine`](cowbull_session::SessionMachine)
//!   over a connection and reports [`SessionEvent`]s.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cowbull::prelude::*;
//!
//! # async fn run() -> Result<(), CowbullError> {
//! let server = CowbullServer::builder().bind("0.0.0.0:8080").build().await?;
//! server.run().await
//! # }
//! ```

mod client;
mod error;
mod handler;
mod hub;
mod play;
mod remote;
mod server;

pub use client::{Client, ClientBuilder, ClientConfig, ClientHandle, EventReceiver};
pub use error::CowbullError;
pub use hub::{HubError, HubHandle, PlayerLink, PlayerSender};
pub use play::run_match;
pub use remote::RemotePlayer;
pub use server::{CowbullServer, CowbullServerBuilder, ServerConfig};

pub use cowbull_game as game;
pub use cowbull_protocol as protocol;
pub use cowbull_session as session;
pub use cowbull_transport as transport;

/// The types most programs need.
pub mod prelude {
    pub use crate::{
        Client, ClientBuilder, ClientConfig, ClientHandle, CowbullError, CowbullServer,
        CowbullServerBuilder, EventReceiver, ServerConfig,
    };
    pub use cowbull_protocol::{PlayerId, PlayerInfo, Role, Score};
    pub use cowbull_session::{InputProvider, Opponent, ScriptedInput, SessionEvent};
}
