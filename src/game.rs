//! Values exchanged between a session and its actors.

use serde::{Deserialize, Serialize};

use crate::board::{Board, Point};

/// One action submitted by a player.
///
/// `MarkDead` and `ConfirmDone` only make sense during the scoring phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Move {
    Place { x: usize, y: usize },
    Pass,
    Resign,
    MarkDead { x: usize, y: usize },
    ConfirmDone,
}

impl Move {
    pub fn place((x, y): Point) -> Self {
        Move::Place { x, y }
    }

    pub fn mark_dead((x, y): Point) -> Self {
        Move::MarkDead { x, y }
    }
}

/// Lifecycle phase of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Play,
    Scoring,
    Ended,
}

/// Snapshot pushed to an actor after every state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Text render of the board, `B`/`W`/`.` per cell, one row per line.
    pub board: String,
    pub message: String,
    pub your_turn: bool,
    pub phase: Phase,
}

impl GameState {
    pub fn new(board: &Board, message: impl Into<String>, your_turn: bool, phase: Phase) -> Self {
        Self {
            board: board.to_string(),
            message: message.into(),
            your_turn,
            phase,
        }
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Ended
    }
}
