//! Turning a `play` request into a running match.

use std::time::Duration;

use cowbull_game::{AiGuesser, AiThinker, Game, GameError, GameOutcome, Guesser, MultiGuesser};
use cowbull_protocol::{PlaySettings, Role, Score};

use crate::{CowbullError, HubError, HubHandle, PlayerLink, RemotePlayer};

/// Plays the match `settings` describes, with `requester` as the player
/// who asked for it.
///
/// | `AI`  | role    | thinker                | guesser                         |
/// |-------|---------|------------------------|---------------------------------|
/// | true  | guesser | AI                     | requester                       |
/// | true  | thinker | requester              | AI                              |
/// | false | guesser | first opponent found   | requester                       |
/// | false | thinker | requester              | every opponent found, in turns  |
///
/// # Errors
/// [`HubError::NoOpponent`] when none of the listed opponents is
/// connected; otherwise whatever ended the match early.
pub async fn run_match(
    requester: PlayerLink,
    settings: PlaySettings,
    hub: &HubHandle,
    reply_timeout: Duration,
) -> Result<GameOutcome, CowbullError> {
    let digits = settings.digits;
    let remote = |link: PlayerLink| RemotePlayer::new(link, reply_timeout);

    let outcome = match (settings.ai, settings.role) {
        (true, Role::Guesser) => {
            Game::new(AiThinker::new(digits)?, remote(requester))
                .play()
                .await?
        }
        (true, Role::Thinker) => {
            let thinker = remote(requester).with_digits_hint(digits);
            Game::new(thinker, BlockingAi::new(digits).await?)
                .play()
                .await?
        }
        (false, Role::Guesser) => {
            let opponent = find_opponents(&requester, settings.opponents, hub)
                .await?
                .swap_remove(0);
            let thinker = remote(opponent).with_digits_hint(digits);
            Game::new(thinker, remote(requester)).play().await?
        }
        (false, Role::Thinker) => {
            let opponents = find_opponents(&requester, settings.opponents, hub).await?;
            let guessers = MultiGuesser::new(opponents.into_iter().map(remote).collect());
            Game::new(remote(requester), guessers).play().await?
        }
    };
    Ok(outcome)
}

/// Looks up the requested opponents, leaving out the requester. Never
/// returns an empty list.
async fn find_opponents(
    requester: &PlayerLink,
    ids: Vec<cowbull_protocol::PlayerId>,
    hub: &HubHandle,
) -> Result<Vec<PlayerLink>, CowbullError> {
    let mut found = hub.find(ids).await?;
    found.retain(|link| link.id() != requester.id());
    if found.is_empty() {
        return Err(HubError::NoOpponent.into());
    }
    Ok(found)
}

// ---------------------------------------------------------------------------
// BlockingAi
// ---------------------------------------------------------------------------

/// An [`AiGuesser`] whose candidate search runs on the blocking pool.
/// Ten digits means millions of candidates to build and filter.
struct BlockingAi {
    inner: Option<AiGuesser>,
}

impl BlockingAi {
    async fn new(digits: usize) -> Result<Self, GameError> {
        let guesser = tokio::task::spawn_blocking(move || AiGuesser::new(digits))
            .await
            .map_err(ai_failed)??;
        Ok(Self {
            inner: Some(guesser),
        })
    }

    async fn with_guesser<R, F>(&mut self, f: F) -> Result<R, GameError>
    where
        R: Send + 'static,
        F: FnOnce(&mut AiGuesser) -> Result<R, GameError> + Send + 'static,
    {
        // Only empty if an earlier blocking task panicked.
        let mut guesser = self.inner.take().ok_or_else(|| ai_failed("search was lost"))?;
        let (guesser, result) = tokio::task::spawn_blocking(move || {
            let result = f(&mut guesser);
            (guesser, result)
        })
        .await
        .map_err(ai_failed)?;
        self.inner = Some(guesser);
        result
    }
}

fn ai_failed(reason: impl ToString) -> GameError {
    GameError::PlayerFailed {
        player: "AI".into(),
        reason: reason.to_string(),
    }
}

impl Guesser for BlockingAi {
    async fn guess(&mut self, digits: usize) -> Result<String, GameError> {
        self.with_guesser(move |ai| ai.pick(digits)).await
    }

    async fn tell(&mut self, number: &str, score: Score) -> Result<(), GameError> {
        let number = number.to_owned();
        self.with_guesser(move |ai| ai.learn(&number, score)).await
    }
}

// =========================================================================
// Tests
// =========================================================================
