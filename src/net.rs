//! TCP transport: newline-delimited JSON.
//!
//! Clients send one [`Move`] per line and receive one [`GameState`] per line.
//! Each connection gets a writer thread fed by a channel, so pushing a state
//! never blocks the session; a reader thread turns incoming lines into
//! [`Session::handle_move`] calls and reports the disconnect when the stream
//! ends.

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::board::Color;
use crate::bot::{BotActor, BotConfig};
use crate::game::{GameState, Move};
use crate::session::{Actor, Session, SessionConfig};

/// Writes `value` as one JSON line and flushes.
pub fn write_json_line<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *writer, value).context("serializing message")?;
    writer.write_all(b"\n").context("writing message")?;
    writer.flush().context("flushing connection")?;
    Ok(())
}

/// A player connected over TCP.
pub struct RemoteActor {
    color: Color,
    outbox: Sender<GameState>,
    reader: Mutex<Option<TcpStream>>,
}

impl RemoteActor {
    pub fn new(stream: TcpStream, color: Color) -> Result<Self> {
        let reader = stream.try_clone().context("cloning client stream")?;
        let (outbox, rx) = mpsc::channel();
        thread::Builder::new()
            .name(format!("writer-{color}"))
            .spawn(move || write_loop(stream, rx, color))
            .context("spawning writer thread")?;
        Ok(Self {
            color,
            outbox,
            reader: Mutex::new(Some(reader)),
        })
    }
}

impl Actor for RemoteActor {
    fn send_state(&self, state: GameState) {
        if self.outbox.send(state).is_err() {
            debug!(color = %self.color, "connection writer has stopped");
        }
    }

    fn color(&self) -> Color {
        self.color
    }

    fn start(&self, session: Session) {
        let stream = match self.reader.lock() {
            Ok(mut reader) => reader.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let Some(stream) = stream else {
            debug!(color = %self.color, "reader already started");
            return;
        };

        let color = self.color;
        let spawned = thread::Builder::new()
            .name(format!("reader-{color}"))
            .spawn(move || read_loop(stream, session, color));
        if let Err(e) = spawned {
            warn!(%color, error = %e, "failed to start reader thread");
        }
    }
}

#[instrument(skip(stream, rx))]
fn write_loop(stream: TcpStream, rx: Receiver<GameState>, color: Color) {
    let mut writer = BufWriter::new(stream);
    for state in rx {
        if let Err(e) = write_json_line(&mut writer, &state) {
            warn!(error = %e, "client unreachable, dropping further updates");
            break;
        }
    }
    debug!("writer finished");
}

#[instrument(skip(stream, session))]
fn read_loop(stream: TcpStream, session: Session, color: Color) {
    let reader = BufReader::new(stream);
    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(error = %e, "read failed");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Move>(line) {
            Ok(mv) => {
                // The session has already replied to a rejected move.
                let _ = session.handle_move(mv, color);
            }
            Err(e) => warn!(error = %e, line, "malformed move"),
        }
    }
    session.disconnected(color);
}

/// Who sits in the White seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opponent {
    /// A second TCP client.
    Remote,
    /// The server-side bot.
    Bot(BotConfig),
}

/// Waits for the players of one match, then starts it.
///
/// The first connection plays Black. White is either the next connection or
/// a bot, depending on `opponent`.
#[instrument(skip(listener))]
pub fn accept_match(
    listener: &TcpListener,
    config: SessionConfig,
    opponent: Opponent,
) -> Result<Session> {
    let (black_stream, addr) = listener.accept().context("accepting black player")?;
    info!(%addr, "black connected");
    let black: Arc<dyn Actor> = Arc::new(RemoteActor::new(black_stream, Color::Black)?);

    let white: Arc<dyn Actor> = match opponent {
        Opponent::Bot(bot) => {
            info!("white is the bot");
            Arc::new(BotActor::new(Color::White, bot))
        }
        Opponent::Remote => {
            info!("waiting for white");
            let (white_stream, addr) = listener.accept().context("accepting white player")?;
            info!(%addr, "white connected");
            Arc::new(RemoteActor::new(white_stream, Color::White)?)
        }
    };

    let session = Session::new(config, black, white);
    session.start();
    Ok(session)
}

/// Runs matches back to back on `listener` until accepting fails.
pub fn serve(listener: TcpListener, config: SessionConfig, opponent: Opponent) -> Result<()> {
    info!(addr = %listener.local_addr()?, "waiting for players");
    loop {
        accept_match(&listener, config, opponent)?;
    }
}
