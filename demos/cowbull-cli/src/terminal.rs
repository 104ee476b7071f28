//! Terminal front end for a client session.

use std::future::{Future, ready};
use std::sync::{Arc, Mutex};

use cowbull::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;

/// Where a pending secret prompt waits for the next stdin line.
type SecretSlot = Arc<Mutex<Option<oneshot::Sender<String>>>>;

/// Answers the session's questions from the command line and stdin.
struct TerminalInput {
    name: Option<String>,
    pending: SecretSlot,
}

impl InputProvider for TerminalInput {
    fn display_name(&mut self) -> impl Future<Output = Option<String>> + Send {
        ready(self.name.clone())
    }

    fn secret_number(
        &mut self,
        digits: Option<usize>,
    ) -> impl Future<Output = Option<String>> + Send {
        let (tx, rx) = oneshot::channel();
        if let Ok(mut slot) = self.pending.lock() {
            *slot = Some(tx);
        }
        match digits {
            Some(n) => println!("You have been challenged! Think of a {n}-digit number:"),
            None => println!("You have been challenged! Think of a number:"),
        }
        async move { rx.await.ok().filter(|line| !line.is_empty()) }
    }
}

/// A line typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Ai { digits: usize },
    Versus { name: String, digits: usize },
    Guess(String),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let command = match words.next()? {
        "ai" => Command::Ai {
            digits: words.next()?.parse().ok()?,
        },
        "vs" => Command::Versus {
            name: words.next()?.to_owned(),
            digits: words.next()?.parse().ok()?,
        },
        "guess" => Command::Guess(words.next()?.to_owned()),
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        number if number.bytes().all(|b| b.is_ascii_digit()) => Command::Guess(number.to_owned()),
        _ => return None,
    };
    words.next().is_none().then_some(command)
}

fn print_help() {
    println!("Commands:");
    println!("  ai <digits>          guess a number the computer thinks of");
    println!("  vs <name> <digits>   guess a number another player thinks of");
    println!("  guess <number>       submit a guess (a bare number works too)");
    println!("  quit                 leave");
}

/// Unnamed players are listed by id.
fn roster_line(players: &[PlayerInfo]) -> String {
    let names: Vec<&str> = players.iter().map(PlayerInfo::display_name).collect();
    format!("Players online: {}", names.join(", "))
}

fn present(event: &SessionEvent) {
    match event {
        SessionEvent::Registered { name } if name.is_empty() => println!("Connected."),
        SessionEvent::Registered { name } => println!("Connected as {name}."),
        SessionEvent::RosterUpdated { players } => println!("{}", roster_line(players)),
        SessionEvent::MatchStarted { role } => println!("Match started. You are the {role}."),
        SessionEvent::GuessRequested { digits } => println!("Your guess ({digits} digits):"),
        SessionEvent::ScoreReceived { score, .. } => println!("You scored {score}."),
        SessionEvent::OpponentGuessReceived { number } => println!("Opponent guessed {number}."),
        SessionEvent::OpponentScoreSent { score, .. } => println!("They scored {score}."),
        SessionEvent::MatchEnded { won: true } => println!("You found it!"),
        SessionEvent::MatchEnded { won: false } => println!("Your number was found."),
        SessionEvent::MatchAbandoned => println!("The match stalled and was abandoned."),
        SessionEvent::Disconnected => println!("Disconnected."),
    }
}

/// Connects, then reads commands from stdin until `quit`, end of input,
/// or the server going away.
pub(crate) async fn play(builder: ClientBuilder, name: Option<String>) -> Result<(), CowbullError> {
    let pending = SecretSlot::default();
    let input = TerminalInput {
        name,
        pending: Arc::clone(&pending),
    };
    let (client, mut events) = builder.connect(input).await?;
    print_help();

    let mut printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            present(&event);
            if event == SessionEvent::Disconnected {
                break;
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = &mut printer => return Ok(()),
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "stdin failed");
                break;
            }
        };
        let line = line.trim();

        let waiting = pending.lock().ok().and_then(|mut slot| slot.take());
        if let Some(secret) = waiting {
            let _ = secret.send(line.to_owned());
            continue;
        }
        if line.is_empty() {
            continue;
        }

        let result = match parse_command(line) {
            Some(Command::Ai { digits }) => client.start_match(digits, Opponent::Ai).await,
            Some(Command::Versus { name, digits }) => {
                client.start_match(digits, Opponent::Named(name)).await
            }
            Some(Command::Guess(number)) => client.submit_guess(&number).await,
            Some(Command::Help) => {
                print_help();
                Ok(())
            }
            Some(Command::Quit) => break,
            None => {
                println!("Unknown command. Type `help` for a list.");
                Ok(())
            }
        };
        if let Err(e) = result {
            println!("error: {e}");
        }
    }

    // The driver may already be gone.
    let _ = client.disconnect().await;
    let _ = printer.await;
    Ok(())
}
