//! The client's view of who else is connected.

use cowbull_protocol::{PlayerId, PlayerInfo};

/// Player id to display name, as of the last `players` broadcast.
///
/// The registry is a snapshot: [`replace`](Self::replace) throws the
/// previous roster away. Order is kept as received, which matters for
/// [`lookup_id_by_name`](Self::lookup_id_by_name) when names collide.
#[derive(Debug, Clone, Default)]
pub struct PlayerRegistry {
    players: Vec<PlayerInfo>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole roster.
    pub fn replace(&mut self, players: Vec<PlayerInfo>) {
        self.players = players;
    }

    /// Finds the id of the first player whose name is exactly `name`.
    pub fn lookup_id_by_name(&self, name: &str) -> Option<&PlayerId> {
        self.players
            .iter()
            .find(|player| player.name == name)
            .map(|player| &player.id)
    }

    /// The name to show for `id`. Falls back to the id itself when the
    /// player has no name or is not on the roster.
    pub fn display_name<'a>(&'a self, id: &'a PlayerId) -> &'a str {
        self.players
            .iter()
            .find(|player| &player.id == id)
            .map_or(id.as_str(), PlayerInfo::display_name)
    }

    /// The roster in broadcast order.
    pub fn players(&self) -> &[PlayerInfo] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
