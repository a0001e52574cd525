//! Line-oriented terminal client.
//!
//! ## Commands
//!
//! - `<x> <y>` - Place a stone (0-based column and row)
//! - `pass` - Pass
//! - `resign` - Resign
//! - `dead <x> <y>` - Remove a dead stone (scoring phase)
//! - `done` - Confirm the dead stones (scoring phase)
//! - `quit` - Disconnect

use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpStream;
use std::thread;

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};

use crate::game::{GameState, Move};
use crate::net::write_json_line;

/// A parsed line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Move),
    Quit,
}

/// Parses one line of input.
pub fn parse_command(line: &str) -> Result<Command> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(first) = parts.first() else {
        bail!("empty command");
    };

    let command = match first.to_lowercase().as_str() {
        "pass" => Command::Move(Move::Pass),
        "resign" => Command::Move(Move::Resign),
        "done" => Command::Move(Move::ConfirmDone),
        "quit" => Command::Quit,
        "dead" => Command::Move(Move::mark_dead(parse_point(&parts[1..])?)),
        _ => Command::Move(Move::place(parse_point(&parts)?)),
    };
    Ok(command)
}

fn parse_point(args: &[&str]) -> Result<(usize, usize)> {
    let [x, y] = args else {
        bail!("expected two coordinates, got {}", args.len());
    };
    let x = x.parse::<usize>().with_context(|| format!("invalid column {x:?}"))?;
    let y = y.parse::<usize>().with_context(|| format!("invalid row {y:?}"))?;
    Ok((x, y))
}

fn render(state: &GameState) -> String {
    let turn = if state.your_turn { "\n> " } else { "" };
    format!("\n{}\n{}{turn}", state.board, state.message)
}

/// Connects to `addr` and plays from stdin until `quit` or the server closes.
pub fn run(addr: &str) -> Result<()> {
    let stream = TcpStream::connect(addr).with_context(|| format!("connecting to {addr}"))?;
    let incoming = stream.try_clone().context("cloning connection")?;

    thread::Builder::new()
        .name("server-updates".into())
        .spawn(move || {
            let mut stdout = io::stdout();
            for line in BufReader::new(incoming).lines() {
                let Ok(line) = line else { break };
                match serde_json::from_str::<GameState>(&line) {
                    Ok(state) => {
                        let _ = write!(stdout, "{}", render(&state));
                        let _ = stdout.flush();
                    }
                    Err(e) => warn!(error = %e, "unreadable update"),
                }
            }
            debug!("server closed the connection");
        })
        .context("spawning update thread")?;

    let mut writer = stream;
    for line in io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_command(line) {
            Ok(Command::Quit) => break,
            Ok(Command::Move(mv)) => write_json_line(&mut writer, &mv)?,
            Err(e) => eprintln!("? {e}"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::game::Phase;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command("pass").unwrap(), Command::Move(Move::Pass));
        assert_eq!(parse_command("RESIGN").unwrap(), Command::Move(Move::Resign));
        assert_eq!(parse_command("done").unwrap(), Command::Move(Move::ConfirmDone));
        assert_eq!(parse_command("quit").unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_coordinates() {
        assert_eq!(parse_command("3 4").unwrap(), Command::Move(Move::place((3, 4))));
        assert_eq!(
            parse_command("dead 0 18").unwrap(),
            Command::Move(Move::mark_dead((0, 18)))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("").is_err());
        assert!(parse_command("3").is_err());
        assert!(parse_command("a b").is_err());
        assert!(parse_command("dead 1").is_err());
        assert!(parse_command("-1 2").is_err());
    }

    #[test]
    fn test_render_prompt_only_on_turn() {
        let board = Board::new(2);
        let waiting = GameState::new(&board, "Move accepted", false, Phase::Play);
        assert!(!render(&waiting).ends_with("> "));
        let turn = GameState::new(&board, "Your turn", true, Phase::Play);
        assert!(render(&turn).ends_with("> "));
    }
}
