//! Per-connection handler: message routing for one player.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Assign a fresh `PlayerId`
//!   2. Loop: receive frames and route them, and forward queued
//!      outbound messages (roster broadcasts, match requests) to the socket
//!   3. On exit, leave the hub

use std::sync::Arc;

use cowbull_protocol::{ClientMessage, Codec, Envelope, PlayerId, ServerMessage};
use cowbull_transport::Connection;
use tokio::sync::mpsc;

use crate::hub::generate_player_id;
use crate::play::run_match;
use crate::server::ServerState;
use crate::{CowbullError, HubHandle, PlayerLink};

/// Drop guard that removes a player from the hub when the handler exits.
///
/// Since `Drop` is synchronous, we spawn a fire-and-forget task for the
/// async send.
struct HubGuard {
    player_id: PlayerId,
    hub: HubHandle,
}

impl Drop for HubGuard {
    fn drop(&mut self) {
        let player_id = self.player_id.clone();
        let hub = self.hub.clone();
        tokio::spawn(async move {
            let _ = hub.leave(player_id).await;
        });
    }
}

/// What one connection has told us so far.
struct Player {
    link: PlayerLink,
    replies: mpsc::UnboundedSender<ClientMessage>,
    joined: bool,
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<Conn, C>(
    conn: Conn,
    state: Arc<ServerState<C>>,
) -> Result<(), CowbullError>
where
    Conn: Connection,
    C: Codec,
    CowbullError: From<Conn::Error>,
{
    let conn_id = conn.id();
    let player_id = generate_player_id();
    tracing::info!(%conn_id, %player_id, "player connected");

    let (out_tx, mut out_rx) = mpsc::unbounded_channel();
    let (reply_tx, reply_rx) = mpsc::unbounded_channel();
    let mut player = Player {
        link: PlayerLink::new(player_id.clone(), out_tx, reply_rx),
        replies: reply_tx,
        joined: false,
    };
    let _guard = HubGuard {
        player_id: player_id.clone(),
        hub: state.hub.clone(),
    };

    loop {
        tokio::select! {
            inbound = conn.recv() => match inbound {
                Ok(Some(text)) => route_frame(&text, &mut player, &state).await,
                Ok(None) => {
                    tracing::info!(%player_id, "connection closed cleanly");
                    break;
                }
                Err(e) => {
                    tracing::debug!(%player_id, error = %e, "recv error");
                    break;
                }
            },
            Some(msg) = out_rx.recv() => {
                let text = ServerMessage::encode(&msg, &state.codec)?.to_text(&state.codec)?;
                conn.send(&text).await?;
            }
        }
    }

    // _guard drops here → hub leave fires.
    Ok(())
}

/// Decodes one frame and acts on it. Malformed frames are logged and
/// dropped.
async fn route_frame<C: Codec>(text: &str, player: &mut Player, state: &Arc<ServerState<C>>) {
    let player_id = player.link.id().clone();
    let msg = match Envelope::from_text(&state.codec, text)
        .and_then(|envelope| ClientMessage::decode(&state.codec, &envelope))
    {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!(%player_id, error = %e, "dropping malformed frame");
            return;
        }
    };

    match msg {
        ClientMessage::Name { name } => {
            tracing::debug!(%player_id, %name, "name set");
            player.link.set_name(name.clone());
            if player.joined {
                let _ = state.hub.rename(player_id, name).await;
            }
        }
        ClientMessage::Connect => {
            if player.joined {
                tracing::debug!(%player_id, "already connected, ignoring");
                return;
            }
            match state.hub.join(player.link.clone()).await {
                Ok(()) => player.joined = true,
                Err(e) => tracing::warn!(%player_id, error = %e, "join failed"),
            }
        }
        ClientMessage::Play(settings) => {
            tracing::info!(
                %player_id,
                ai = settings.ai,
                digits = settings.digits,
                role = %settings.role,
                opponents = settings.opponents.len(),
                "match requested"
            );
            let requester = player.link.clone();
            let hub = state.hub.clone();
            let reply_timeout = state.config.reply_timeout;
            tokio::spawn(async move {
                match run_match(requester, settings, &hub, reply_timeout).await {
                    Ok(outcome) => tracing::info!(
                        %player_id,
                        digits = outcome.digits,
                        rounds = outcome.rounds,
                        "match finished"
                    ),
                    Err(e) => tracing::warn!(%player_id, error = %e, "match ended without a winner"),
                }
            });
        }
        reply @ (ClientMessage::Think { .. }
        | ClientMessage::Guess { .. }
        | ClientMessage::TryResponse(_)) => {
            let _ = player.replies.send(reply);
        }
        ClientMessage::Unrecognized { name } => {
            tracing::debug!(%player_id, %name, "ignoring unrecognized message");
        }
    }
}
