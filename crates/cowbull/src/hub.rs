//! Player hub actor: the roster of connected players.
//!
//! The hub runs in its own Tokio task and owns the roster. Connection
//! handlers and match tasks talk to it through a [`HubHandle`]. Every
//! change to the roster is broadcast to all members as a `players`
//! message.

use std::sync::Arc;

use cowbull_protocol::{ClientMessage, PlayerId, PlayerInfo, ServerMessage};
use rand::Rng;
use tokio::sync::{Mutex, mpsc, oneshot};

/// Channel sender for delivering outbound messages to a player's
/// connection handler.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Replies a player sent that a match is waiting for.
pub(crate) type ReplyReceiver = mpsc::UnboundedReceiver<ClientMessage>;

/// Errors from the hub.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// The hub task has stopped.
    #[error("player hub unavailable")]
    Unavailable,

    /// A player with this id is already on the roster.
    #[error("player {0} already joined")]
    AlreadyJoined(PlayerId),

    /// None of the requested opponents is connected.
    #[error("no opponent found")]
    NoOpponent,
}

// ---------------------------------------------------------------------------
// PlayerLink
// ---------------------------------------------------------------------------

/// Everything needed to play against one connected player: where to send
/// requests and where their replies arrive.
///
/// Cheap to clone. The connection handler keeps the matching reply
/// sender; once it exits, waiting on the reply receiver yields `None`.
#[derive(Debug, Clone)]
pub struct PlayerLink {
    id: PlayerId,
    name: String,
    outbound: PlayerSender,
    replies: Arc<Mutex<ReplyReceiver>>,
}

impl PlayerLink {
    pub(crate) fn new(id: PlayerId, outbound: PlayerSender, replies: ReplyReceiver) -> Self {
        Self {
            id,
            name: String::new(),
            outbound,
            replies: Arc::new(Mutex::new(replies)),
        }
    }

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// The roster entry for this player.
    pub fn info(&self) -> PlayerInfo {
        PlayerInfo {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }

    /// Queues a message for the player. Returns `false` if their
    /// connection handler is gone.
    pub(crate) fn send(&self, msg: ServerMessage) -> bool {
        self.outbound.send(msg).is_ok()
    }

    pub(crate) fn replies(&self) -> &Mutex<ReplyReceiver> {
        &self.replies
    }
}

/// Generates a player id: 16 random bytes as 32 lowercase hex characters.
pub(crate) fn generate_player_id() -> PlayerId {
    let bytes: [u8; 16] = rand::rng().random();
    PlayerId(bytes.iter().map(|b| format!("{b:02x}")).collect())
}

// ---------------------------------------------------------------------------
// Commands and handle
// ---------------------------------------------------------------------------

/// Commands sent to the hub actor through its channel.
enum HubCommand {
    /// Add a player to the roster.
    Join {
        link: PlayerLink,
        reply: oneshot::Sender<Result<(), HubError>>,
    },

    /// Remove a player. Unknown ids are ignored.
    Leave { id: PlayerId },

    /// Change a player's display name.
    Rename { id: PlayerId, name: String },

    /// Look up connected players by id, in the order asked.
    Find {
        ids: Vec<PlayerId>,
        reply: oneshot::Sender<Vec<PlayerLink>>,
    },

    /// Snapshot the roster.
    Roster {
        reply: oneshot::Sender<Vec<PlayerInfo>>,
    },
}

/// Handle to the running hub actor.
///
/// Cheap to clone: it's just an `mpsc::Sender` wrapper.
#[derive(Clone)]
pub struct HubHandle {
    sender: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    /// Adds a player and broadcasts the new roster.
    pub async fn join(&self, link: PlayerLink) -> Result<(), HubError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(HubCommand::Join {
                link,
                reply: reply_tx,
            })
            .await
            .map_err(|_| HubError::Unavailable)?;
        reply_rx.await.map_err(|_| HubError::Unavailable)?
    }

    /// Removes a player and broadcasts the new roster (fire-and-forget).
    pub async fn leave(&self, id: PlayerId) -> Result<(), HubError> {
        self.sender
            .send(HubCommand::Leave { id })
            .await
            .map_err(|_| HubError::Unavailable)
    }

    /// Renames a player and broadcasts the new roster (fire-and-forget).
    pub async fn rename(&self, id: PlayerId, name: String) -> Result<(), HubError> {
        self.sender
            .send(HubCommand::Rename { id, name })
            .await
            .map_err(|_| HubError::Unavailable)
    }

    /// Returns the connected players among `ids`, in the order given.
    /// Ids that are not connected are skipped.
    pub async fn find(&self, ids: Vec<PlayerId>) -> Result<Vec<PlayerLink>, HubError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(HubCommand::Find {
                ids,
                reply: reply_tx,
            })
            .await
            .map_err(|_| HubError::Unavailable)?;
        reply_rx.await.map_err(|_| HubError::Unavailable)
    }

    /// Returns the current roster in join order.
    pub async fn roster(&self) -> Result<Vec<PlayerInfo>, HubError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(HubCommand::Roster { reply: reply_tx })
            .await
            .map_err(|_| HubError::Unavailable)?;
        reply_rx.await.map_err(|_| HubError::Unavailable)
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// The hub's state. Runs inside a Tokio task.
struct HubActor {
    /// Join order is roster order.
    players: Vec<PlayerLink>,
    receiver: mpsc::Receiver<HubCommand>,
}

impl HubActor {
    async fn run(mut self) {
        tracing::debug!("player hub started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                HubCommand::Join { link, reply } => {
                    let result = self.handle_join(link);
                    let _ = reply.send(result);
                }
                HubCommand::Leave { id } => self.handle_leave(&id),
                HubCommand::Rename { id, name } => self.handle_rename(&id, name),
                HubCommand::Find { ids, reply } => {
                    let found = ids
                        .iter()
                        .filter_map(|id| self.players.iter().find(|p| &p.id == id))
                        .cloned()
                        .collect();
                    let _ = reply.send(found);
                }
                HubCommand::Roster { reply } => {
                    let _ = reply.send(self.roster());
                }
            }
        }

        tracing::debug!("player hub stopped");
    }

    fn handle_join(&mut self, link: PlayerLink) -> Result<(), HubError> {
        if self.players.iter().any(|p| p.id == link.id) {
            return Err(HubError::AlreadyJoined(link.id));
        }
        tracing::info!(
            player_id = %link.id,
            name = %link.name,
            players = self.players.len() + 1,
            "player joined"
        );
        self.players.push(link);
        self.broadcast_roster();
        Ok(())
    }

    fn handle_leave(&mut self, id: &PlayerId) {
        let before = self.players.len();
        self.players.retain(|p| &p.id != id);
        if self.players.len() == before {
            return;
        }
        tracing::info!(player_id = %id, players = self.players.len(), "player left");
        self.broadcast_roster();
    }

    fn handle_rename(&mut self, id: &PlayerId, name: String) {
        let Some(player) = self.players.iter_mut().find(|p| &p.id == id) else {
            return;
        };
        tracing::debug!(player_id = %id, %name, "player renamed");
        player.set_name(name);
        self.broadcast_roster();
    }

    fn roster(&self) -> Vec<PlayerInfo> {
        self.players.iter().map(PlayerLink::info).collect()
    }

    /// Sends the roster to every member. Silently skips players whose
    /// handler is gone; their `Leave` is already on its way.
    fn broadcast_roster(&self) {
        let roster = self.roster();
        for player in &self.players {
            player.send(ServerMessage::Players(roster.clone()));
        }
    }
}

/// Spawns the hub actor task and returns a handle to it.
///
/// `channel_size` bounds the command queue; callers wait when it is full.
pub(crate) fn spawn_hub(channel_size: usize) -> HubHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let actor = HubActor {
        players: Vec::new(),
        receiver: rx,
    };
    tokio::spawn(actor.run());
    HubHandle { sender: tx }
}

// =========================================================================
// Tests
// =========================================================================
