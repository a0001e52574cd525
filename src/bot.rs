//! One-ply greedy bot.
//!
//! Every empty point is tried on a private copy of the board and ko state.
//! Legal candidates are sorted into three buckets, checked in order:
//!
//! 1. capture: the move removes opposing stones
//! 2. pressure: the point touches an opposing stone
//! 3. legal: anything else the rules accept
//!
//! A move is drawn uniformly from the first non-empty bucket. With no legal
//! move at all the bot passes.

use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, instrument};

use crate::board::{Board, Color, Point};
use crate::constants::BOT_THINK_DELAY_MS;
use crate::game::{GameState, Move, Phase};
use crate::rules::{KoState, RulesEngine};
use crate::session::{Actor, Session};

/// Candidate moves grouped by priority.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Candidates {
    pub capture: Vec<Point>,
    pub pressure: Vec<Point>,
    pub legal: Vec<Point>,
}

impl Candidates {
    /// The highest-priority non-empty bucket.
    pub fn best_bucket(&self) -> Option<&[Point]> {
        [&self.capture, &self.pressure, &self.legal]
            .into_iter()
            .find(|b| !b.is_empty())
            .map(Vec::as_slice)
    }

    pub fn total(&self) -> usize {
        self.capture.len() + self.pressure.len() + self.legal.len()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BotStrategy {
    rules: RulesEngine,
}

impl BotStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tries every empty point for `color` and buckets the legal ones.
    /// `board` and `ko` are never modified.
    pub fn classify(&self, board: &Board, color: Color, ko: &KoState) -> Candidates {
        let mut candidates = Candidates::default();
        for (x, y) in board.points() {
            if board.get(x, y).is_some() {
                continue;
            }
            let mut simulation = board.clone();
            let mut sim_ko = ko.clone();
            if self
                .rules
                .apply_move(&mut simulation, (x, y), color, &mut sim_ko)
                .is_err()
            {
                continue;
            }

            if stones_removed(board, &simulation) > 0 {
                candidates.capture.push((x, y));
            } else if is_adjacent_to(board, (x, y), color.opposite()) {
                candidates.pressure.push((x, y));
            } else {
                candidates.legal.push((x, y));
            }
        }
        candidates
    }

    /// Picks the move to play for `color`.
    pub fn choose_move(
        &self,
        board: &Board,
        color: Color,
        ko: &KoState,
        rng: &mut fastrand::Rng,
    ) -> Move {
        let candidates = self.classify(board, color, ko);
        debug!(
            %color,
            capture = candidates.capture.len(),
            pressure = candidates.pressure.len(),
            legal = candidates.legal.len(),
            "classified candidates"
        );
        match candidates.best_bucket() {
            Some(bucket) => Move::place(bucket[rng.usize(..bucket.len())]),
            None => Move::Pass,
        }
    }
}

/// Points that held a stone in `before` and are empty in `after`.
fn stones_removed(before: &Board, after: &Board) -> usize {
    before
        .points()
        .filter(|&(x, y)| before.get(x, y).is_some() && after.get(x, y).is_none())
        .count()
}

fn is_adjacent_to(board: &Board, (x, y): Point, color: Color) -> bool {
    board
        .neighbors(x, y)
        .any(|(nx, ny)| board.get(nx, ny) == Some(color))
}

/// Bot runtime settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotConfig {
    /// Pause before each decision.
    pub think_delay: Duration,
    /// Fixed RNG seed; `None` seeds from the system.
    pub seed: Option<u64>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            think_delay: Duration::from_millis(BOT_THINK_DELAY_MS),
            seed: None,
        }
    }
}

/// What the bot thread is woken up for.
enum BotEvent {
    State(GameState),
    OpponentLeft,
}

/// Server-side bot seat. Updates queue up in a channel drained by the bot's
/// own thread, so the session never waits on the bot's thinking.
pub struct BotActor {
    color: Color,
    config: BotConfig,
    inbox: Sender<BotEvent>,
    pending: Mutex<Option<Receiver<BotEvent>>>,
}

impl BotActor {
    pub fn new(color: Color, config: BotConfig) -> Self {
        let (inbox, rx) = mpsc::channel();
        Self {
            color,
            config,
            inbox,
            pending: Mutex::new(Some(rx)),
        }
    }
}

impl Actor for BotActor {
    fn send_state(&self, state: GameState) {
        if self.inbox.send(BotEvent::State(state)).is_err() {
            debug!(color = %self.color, "bot loop has stopped");
        }
    }

    fn opponent_left(&self) {
        if self.inbox.send(BotEvent::OpponentLeft).is_err() {
            debug!(color = %self.color, "bot loop has stopped");
        }
    }

    fn color(&self) -> Color {
        self.color
    }

    fn start(&self, session: Session) {
        let rx = match self.pending.lock() {
            Ok(mut pending) => pending.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let Some(rx) = rx else {
            debug!(color = %self.color, "bot already started");
            return;
        };

        let color = self.color;
        let config = self.config;
        let spawned = thread::Builder::new()
            .name(format!("bot-{color}"))
            .spawn(move || run_bot(rx, session, color, config));
        if let Err(e) = spawned {
            error!(%color, error = %e, "failed to start bot thread");
        }
    }
}

#[instrument(skip(rx, session, config))]
fn run_bot(rx: Receiver<BotEvent>, session: Session, color: Color, config: BotConfig) {
    info!("bot ready");
    let strategy = BotStrategy::new();
    let mut rng = match config.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };

    for event in rx {
        let state = match event {
            BotEvent::State(state) => state,
            BotEvent::OpponentLeft => {
                info!("opponent left, abandoning match");
                break;
            }
        };
        if state.is_over() {
            break;
        }
        if !state.your_turn {
            continue;
        }

        let mv = match state.phase {
            Phase::Play => {
                thread::sleep(config.think_delay);
                let (board, ko) = session.position();
                strategy.choose_move(&board, color, &ko, &mut rng)
            }
            // The bot never disputes dead stones.
            Phase::Scoring => Move::ConfirmDone,
            Phase::Ended => break,
        };

        debug!(?mv, "bot submits");
        if let Err(rejection) = session.handle_move(mv, color) {
            debug!(%rejection, "bot move refused");
        }
    }
    info!("bot finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_from(rows: &str) -> Board {
        rows.parse().expect("valid board text")
    }

    #[test]
    fn test_capture_has_priority() {
        // White (1,1) has a single liberty at (2,1).
        let board = board_from(
            ". B . . .\n\
             B W . . .\n\
             . B . . .\n\
             . . . . .\n\
             . . . . .\n",
        );
        let strategy = BotStrategy::new();
        let candidates = strategy.classify(&board, Color::Black, &KoState::new());
        assert_eq!(candidates.capture, vec![(2, 1)]);
        assert_eq!(candidates.best_bucket(), Some(&[(2, 1)][..]));

        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..5 {
            assert_eq!(
                strategy.choose_move(&board, Color::Black, &KoState::new(), &mut rng),
                Move::place((2, 1))
            );
        }
    }

    #[test]
    fn test_pressure_before_plain_moves() {
        let board = board_from(
            ". . .\n\
             . W .\n\
             . . .\n",
        );
        let candidates = BotStrategy::new().classify(&board, Color::Black, &KoState::new());
        assert!(candidates.capture.is_empty());
        let mut pressure = candidates.pressure.clone();
        pressure.sort();
        assert_eq!(pressure, vec![(0, 1), (1, 0), (1, 2), (2, 1)]);
        assert_eq!(candidates.legal.len(), 4);
        assert_eq!(candidates.total(), 8);
    }

    #[test]
    fn test_empty_board_all_legal() {
        let board = Board::new(4);
        let candidates = BotStrategy::new().classify(&board, Color::White, &KoState::new());
        assert_eq!(candidates.legal.len(), 16);
        assert!(candidates.capture.is_empty() && candidates.pressure.is_empty());
    }

    #[test]
    fn test_suicide_points_excluded() {
        let board = board_from(
            ". W\n\
             W .\n",
        );
        // Both empty points are suicide for Black.
        let mut rng = fastrand::Rng::with_seed(1);
        let candidates = BotStrategy::new().classify(&board, Color::Black, &KoState::new());
        assert_eq!(candidates.total(), 0);
        assert_eq!(
            BotStrategy::new().choose_move(&board, Color::Black, &KoState::new(), &mut rng),
            Move::Pass
        );
    }

    #[test]
    fn test_ko_retake_excluded() {
        let before = board_from(
            ". B W .\n\
             B W . W\n\
             . B W .\n\
             . . . .\n",
        );
        let mut board = before.clone();
        let mut ko = KoState::new();
        RulesEngine::new()
            .apply_move(&mut board, (2, 1), Color::Black, &mut ko)
            .unwrap();

        let candidates = BotStrategy::new().classify(&board, Color::White, &ko);
        assert!(!candidates.capture.contains(&(1, 1)));
        assert!(!candidates.pressure.contains(&(1, 1)));
        assert!(!candidates.legal.contains(&(1, 1)));
    }

    #[test]
    fn test_classify_leaves_inputs_untouched() {
        let board = board_from(
            ". B .\n\
             B W .\n\
             . B .\n",
        );
        let snapshot = board.clone();
        let ko = KoState::new();
        let _ = BotStrategy::new().classify(&board, Color::Black, &ko);
        assert_eq!(board, snapshot);
        assert_eq!(ko, KoState::new());
    }
}
