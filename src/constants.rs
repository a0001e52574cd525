//! Default settings and protocol message texts.
//!
//! Everything here can be overridden at runtime through [`crate::session::SessionConfig`],
//! [`crate::bot::BotConfig`] or the command line, except the message texts which
//! clients may match on.

// =============================================================================
// Match Defaults
// =============================================================================

/// Default board size (NxN).
pub const DEFAULT_BOARD_SIZE: usize = 19;

/// Default komi, credited to White at the end of the game.
pub const DEFAULT_KOMI: f32 = 6.5;

/// Number of consecutive passes that ends the play phase.
pub const PASSES_TO_SCORE: u32 = 2;

// =============================================================================
// Bot
// =============================================================================

/// Pause before the bot answers, in milliseconds.
pub const BOT_THINK_DELAY_MS: u64 = 800;

// =============================================================================
// Network
// =============================================================================

/// Default TCP port of the game server.
pub const DEFAULT_PORT: u16 = 12345;

// =============================================================================
// Protocol Messages
// =============================================================================

pub const MSG_GAME_STARTED: &str = "Game started. BLACK begins.";
pub const MSG_NOT_YOUR_TURN: &str = "Not your turn";
pub const MSG_INVALID_MOVE: &str = "Invalid move";
pub const MSG_MOVE_ACCEPTED: &str = "Move accepted";
pub const MSG_YOUR_TURN: &str = "Your turn";
pub const MSG_YOU_PASSED: &str = "You passed";
pub const MSG_OPPONENT_PASSED: &str = "Opponent passed. Your turn.";
pub const MSG_SCORING_PHASE: &str =
    "SCORING PHASE. Click DEAD stones to remove them.\nPress DONE when finished.";
pub const MSG_STONE_REMOVED: &str = "Stone removed. Keep marking or press DONE.";
pub const MSG_WAITING: &str = "Waiting for opponent...";
pub const MSG_YOU_RESIGNED: &str = "You resigned. You lose.";
pub const MSG_OPPONENT_RESIGNED: &str = "Opponent resigned. You win.";
pub const MSG_GAME_OVER: &str = "Game is over";
pub const MSG_WRONG_PHASE: &str = "Not allowed in this phase";
