//! Where the session gets the values only the user can supply.

use std::collections::VecDeque;
use std::future::{Future, ready};

/// Asks the user for a display name and for secret numbers.
///
/// Both return `None` when the user cancels. The session treats a
/// cancelled name as an empty one and a cancelled secret as declining
/// the challenge.
///
/// The method signatures use `impl Future + Send` instead of `async fn`
/// so a session can run inside `tokio::spawn`.
pub trait InputProvider: Send {
    /// The name to register under.
    fn display_name(&mut self) -> impl Future<Output = Option<String>> + Send;

    /// A secret number for a match where this player thinks. `digits` is
    /// the length the server asked for, when it asked for one.
    fn secret_number(
        &mut self,
        digits: Option<usize>,
    ) -> impl Future<Output = Option<String>> + Send;
}

/// An [`InputProvider`] that answers from a prepared script.
///
/// Useful for bots and tests: the name is fixed, and secrets are handed
/// out in order until the list runs dry, after which every challenge is
/// declined.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    name: Option<String>,
    secrets: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            secrets: VecDeque::new(),
        }
    }

    /// Queues a secret for the next `think` request.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secrets.push_back(secret.into());
        self
    }
}

impl InputProvider for ScriptedInput {
    fn display_name(&mut self) -> impl Future<Output = Option<String>> + Send {
        ready(self.name.clone())
    }

    fn secret_number(
        &mut self,
        _digits: Option<usize>,
    ) -> impl Future<Output = Option<String>> + Send {
        ready(self.secrets.pop_front())
    }
}
