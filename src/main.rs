//! Go-Duel: networked two-player Go.
//!
//! ## Usage
//!
//! - `go-duel serve` - Host matches; the first client plays Black
//! - `go-duel serve --bot` - White is played by the server-side bot
//! - `go-duel play --addr HOST:PORT` - Join a match from the terminal

use std::net::TcpListener;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use go_duel::bot::BotConfig;
use go_duel::client;
use go_duel::constants::{BOT_THINK_DELAY_MS, DEFAULT_BOARD_SIZE, DEFAULT_KOMI, DEFAULT_PORT};
use go_duel::net::{self, Opponent};
use go_duel::session::SessionConfig;

/// Go-Duel: networked two-player Go
#[derive(Parser)]
#[command(name = "go-duel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Host matches over TCP
    Serve {
        /// Port to listen on
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Board size (NxN)
        #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
        size: usize,
        /// Komi credited to White
        #[arg(long, default_value_t = DEFAULT_KOMI)]
        komi: f32,
        /// Let the bot play White instead of waiting for a second client
        #[arg(long)]
        bot: bool,
        /// Bot thinking delay in milliseconds
        #[arg(long, default_value_t = BOT_THINK_DELAY_MS)]
        think_ms: u64,
    },
    /// Join a match from the terminal
    Play {
        /// Server address
        #[arg(long, default_value_t = format!("127.0.0.1:{DEFAULT_PORT}"))]
        addr: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve {
            port,
            size,
            komi,
            bot,
            think_ms,
        } => {
            if !(2..=25).contains(&size) {
                bail!("board size must be between 2 and 25, got {size}");
            }
            let config = SessionConfig { size, komi };
            let opponent = if bot {
                Opponent::Bot(BotConfig {
                    think_delay: Duration::from_millis(think_ms),
                    seed: None,
                })
            } else {
                Opponent::Remote
            };
            let listener = TcpListener::bind(("0.0.0.0", port))
                .with_context(|| format!("binding port {port}"))?;
            net::serve(listener, config, opponent)
        }
        Commands::Play { addr } => client::run(&addr),
    }
}
