//! `cowbull` command-line tool: run a server, or play from the terminal.

mod terminal;

use std::time::Duration;

use clap::{Parser, Subcommand};
use cowbull::prelude::*;
use tracing_subscriber::EnvFilter;

/// Bulls and cows over WebSockets
#[derive(Parser, Debug)]
#[command(name = "cowbull")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the game server
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        bind: String,

        /// Seconds to wait for a player's reply before ending their match
        #[arg(long, default_value_t = 60)]
        reply_timeout_secs: u64,
    },

    /// Connect to a server and play from the terminal
    Play {
        /// Server WebSocket URL
        #[arg(short, long, default_value = "ws://127.0.0.1:8080/websocket")]
        url: String,

        /// Name shown to other players
        #[arg(short, long)]
        name: Option<String>,

        /// Abandon a match after this many seconds of silence from the server
        #[arg(long)]
        stall_timeout_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Serve {
            bind,
            reply_timeout_secs,
        } => {
            let server = CowbullServer::builder()
                .bind(&bind)
                .reply_timeout(Duration::from_secs(reply_timeout_secs))
                .build()
                .await?;
            tracing::info!(addr = %server.local_addr()?, "listening");
            server.run().await?;
        }
        Command::Play {
            url,
            name,
            stall_timeout_secs,
        } => {
            let mut builder = Client::builder().url(&url);
            if let Some(secs) = stall_timeout_secs {
                builder = builder.stall_timeout(Duration::from_secs(secs));
            }
            terminal::play(builder, name).await?;
        }
    }
    Ok(())
}
