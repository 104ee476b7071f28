//! Several guessers sharing one seat.

use cowbull_protocol::Score;

use crate::{GameError, Guesser};

/// Combines several guessers into one.
///
/// They take turns proposing guesses, in order, wrapping around. Every
/// score is told to all of them so each one learns from every guess.
#[derive(Debug)]
pub struct MultiGuesser<G> {
    players: Vec<G>,
    turn: usize,
}

impl<G: Guesser> MultiGuesser<G> {
    pub fn new(players: Vec<G>) -> Self {
        Self { players, turn: 0 }
    }

    /// Number of guessers in the group.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl<G: Guesser> Guesser for MultiGuesser<G> {
    async fn guess(&mut self, digits: usize) -> Result<String, GameError> {
        if self.players.is_empty() {
            return Err(GameError::NoPlayers);
        }
        if self.turn >= self.players.len() {
            self.turn = 0;
        }
        let current = self.turn;
        self.turn += 1;
        self.players[current].guess(digits).await
    }

    async fn tell(&mut self, number: &str, score: Score) -> Result<(), GameError> {
        for player in &mut self.players {
            player.tell(number, score).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::{Future, ready};
    use std::sync::{Arc, Mutex};

    /// Answers with its own label and records everything it is told.
    struct Labelled {
        label: &'static str,
        told: Arc<Mutex<Vec<(String, Score)>>>,
    }

    impl Guesser for Labelled {
        fn guess(
            &mut self,
            _digits: usize,
        ) -> impl Future<Output = Result<String, GameError>> + Send {
            ready(Ok(self.label.to_owned()))
        }

        fn tell(
            &mut self,
            number: &str,
            score: Score,
        ) -> impl Future<Output = Result<(), GameError>> + Send {
            self.told.lock().unwrap().push((number.to_owned(), score));
            ready(Ok(()))
        }
    }

    type Log = Arc<Mutex<Vec<(String, Score)>>>;

    fn group(labels: &[&'static str]) -> (MultiGuesser<Labelled>, Vec<Log>) {
        let logs: Vec<Log> = labels.iter().map(|_| Log::default()).collect();
        let players = labels
            .iter()
            .zip(&logs)
            .map(|(&label, told)| Labelled {
                label,
                told: Arc::clone(told),
            })
            .collect();
        (MultiGuesser::new(players), logs)
    }

    #[tokio::test]
    async fn test_multi_guesser_takes_turns_and_wraps() {
        let (mut multi, _) = group(&["12", "34", "56"]);
        let mut order = Vec::new();
        for _ in 0..5 {
            order.push(multi.guess(2).await.unwrap());
        }
        assert_eq!(order, ["12", "34", "56", "12", "34"]);
    }

    #[tokio::test]
    async fn test_multi_guesser_tell_reaches_everyone() {
        let (mut multi, logs) = group(&["12", "34"]);
        multi.tell("12", Score::new(1, 0)).await.unwrap();
        for log in logs {
            assert_eq!(*log.lock().unwrap(), vec![("12".to_owned(), Score::new(1, 0))]);
        }
    }

    #[tokio::test]
    async fn test_multi_guesser_empty_returns_no_players() {
        let mut multi: MultiGuesser<Labelled> = MultiGuesser::new(vec![]);
        assert!(multi.is_empty());
        assert!(matches!(multi.guess(2).await, Err(GameError::NoPlayers)));
    }
}
