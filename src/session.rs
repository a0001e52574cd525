//! One match between two actors.
//!
//! A [`Session`] owns the authoritative board, turn, prisoner counts, ko
//! snapshot and scoring-phase flags behind a single mutex. Every move from
//! either actor goes through [`Session::handle_move`], which runs as one
//! critical section: moves are applied whole and in the order the lock is
//! taken. State updates are pushed to the actors from inside the critical
//! section, so [`Actor::send_state`] must hand the state off without blocking.
//!
//! Lifecycle: `Play -> Scoring -> Ended`, or `Play/Scoring -> Ended` on
//! resignation. Two consecutive passes open the scoring phase, where either
//! side may remove dead stones; once both confirm, the board is scored.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use derive_more::{Display, Error};
use tracing::{debug, info, instrument, warn};

use crate::board::{Board, Color};
use crate::constants::*;
use crate::game::{GameState, Move, Phase};
use crate::rules::{KoState, MoveError, RulesEngine};
use crate::scoring::{Score, ScoringEngine};

/// A participant in a session: a remote client, a bot, or an in-process frontend.
pub trait Actor: Send + Sync {
    /// Delivers a state update. Called with the session lock held, so it must
    /// not block; delivery failures are the actor's own concern.
    fn send_state(&self, state: GameState);

    /// The color this actor plays.
    fn color(&self) -> Color;

    /// Activates the actor, e.g. begins reading from its connection or starts
    /// the bot loop. Moves are submitted through `session`.
    fn start(&self, session: Session);

    /// The other seat's connection is gone. Actors that run their own loop
    /// must let go of their [`Session`] here. Called with the session lock
    /// held.
    fn opponent_left(&self) {}
}

/// Runtime settings for a match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub size: usize,
    pub komi: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
            komi: DEFAULT_KOMI,
        }
    }
}

/// Why a submission was refused. The sender has already been told.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum Rejection {
    #[display("game is over")]
    GameOver,
    #[display("not your turn")]
    NotYourTurn,
    #[display("not allowed in this phase")]
    WrongPhase,
    #[display("illegal move: {_0}")]
    Illegal(MoveError),
}

/// Copy of the session state at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub board: Board,
    pub ko: KoState,
    pub current_turn: Color,
    pub consecutive_passes: u32,
    pub black_prisoners: u32,
    pub white_prisoners: u32,
    pub phase: Phase,
    pub black_done: bool,
    pub white_done: bool,
    pub resigned: Option<Color>,
    pub final_score: Option<Score>,
}

struct Match {
    board: Board,
    ko: KoState,
    current_turn: Color,
    consecutive_passes: u32,
    black_prisoners: u32,
    white_prisoners: u32,
    phase: Phase,
    black_done: bool,
    white_done: bool,
    resigned: Option<Color>,
    final_score: Option<Score>,
    black_connected: bool,
    white_connected: bool,
}

impl Match {
    fn new(size: usize) -> Self {
        Self {
            board: Board::new(size),
            ko: KoState::new(),
            current_turn: Color::Black,
            consecutive_passes: 0,
            black_prisoners: 0,
            white_prisoners: 0,
            phase: Phase::Play,
            black_done: false,
            white_done: false,
            resigned: None,
            final_score: None,
            black_connected: true,
            white_connected: true,
        }
    }

    fn add_prisoners(&mut self, capturer: Color, n: u32) {
        match capturer {
            Color::Black => self.black_prisoners += n,
            Color::White => self.white_prisoners += n,
        }
    }

    fn connected(&self, color: Color) -> bool {
        match color {
            Color::Black => self.black_connected,
            Color::White => self.white_connected,
        }
    }

    fn state(&self, message: impl Into<String>, your_turn: bool) -> GameState {
        GameState::new(&self.board, message, your_turn, self.phase)
    }
}

struct Shared {
    game: Mutex<Match>,
    black: Arc<dyn Actor>,
    white: Arc<dyn Actor>,
    komi: f32,
    rules: RulesEngine,
    scoring: ScoringEngine,
}

/// Handle to a running match. Cloning shares the same match.
#[derive(Clone)]
pub struct Session {
    shared: Arc<Shared>,
}

impl Session {
    /// Creates a session. `black` and `white` are addressed by the seat they
    /// are given here; a mismatching [`Actor::color`] is logged.
    pub fn new(config: SessionConfig, black: Arc<dyn Actor>, white: Arc<dyn Actor>) -> Self {
        if black.color() != Color::Black || white.color() != Color::White {
            warn!(
                black_seat = %black.color(),
                white_seat = %white.color(),
                "actor colors do not match their seats"
            );
        }
        info!(size = config.size, komi = config.komi, "creating session");
        Self {
            shared: Arc::new(Shared {
                game: Mutex::new(Match::new(config.size)),
                black,
                white,
                komi: config.komi,
                rules: RulesEngine::new(),
                scoring: ScoringEngine::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Match> {
        // Every transition either completes or rolls back before unlocking.
        self.shared.game.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn actor(&self, color: Color) -> &Arc<dyn Actor> {
        match color {
            Color::Black => &self.shared.black,
            Color::White => &self.shared.white,
        }
    }

    fn send(&self, game: &Match, color: Color, state: GameState) {
        if game.connected(color) {
            self.actor(color).send_state(state);
        } else {
            debug!(%color, "skipping update to disconnected actor");
        }
    }

    fn broadcast(&self, game: &Match, message: &str, black_turn: bool, white_turn: bool) {
        self.send(game, Color::Black, game.state(message, black_turn));
        self.send(game, Color::White, game.state(message, white_turn));
    }

    /// Activates both actors and announces the first turn.
    #[instrument(skip(self))]
    pub fn start(&self) {
        info!("starting match");
        self.shared.black.start(self.clone());
        self.shared.white.start(self.clone());
        let game = self.lock();
        self.broadcast(&game, MSG_GAME_STARTED, true, false);
    }

    /// Applies one submission from the actor playing `sender`.
    ///
    /// On rejection the sender alone is told why and nothing changes.
    #[instrument(skip(self))]
    pub fn handle_move(&self, mv: Move, sender: Color) -> Result<(), Rejection> {
        let mut game = self.lock();
        let phase = game.phase;
        let result = match phase {
            Phase::Ended => Err(Rejection::GameOver),
            Phase::Play => self.handle_play_move(&mut game, mv, sender),
            Phase::Scoring => self.handle_scoring_move(&mut game, mv, sender),
        };

        if let Err(rejection) = result {
            warn!(%sender, ?mv, %rejection, "move rejected");
            let reply = match rejection {
                Rejection::GameOver => game.state(MSG_GAME_OVER, false),
                Rejection::NotYourTurn => game.state(MSG_NOT_YOUR_TURN, false),
                Rejection::WrongPhase => {
                    let your_turn = game.phase == Phase::Scoring || game.current_turn == sender;
                    game.state(MSG_WRONG_PHASE, your_turn)
                }
                Rejection::Illegal(e) => game.state(format!("{MSG_INVALID_MOVE}: {e}"), true),
            };
            self.send(&game, sender, reply);
        }
        result
    }

    fn handle_play_move(&self, game: &mut Match, mv: Move, sender: Color) -> Result<(), Rejection> {
        if mv != Move::Resign && sender != game.current_turn {
            return Err(Rejection::NotYourTurn);
        }

        match mv {
            Move::Resign => {
                self.end_by_resignation(game, sender);
                Ok(())
            }
            Move::Pass => {
                game.consecutive_passes += 1;
                debug!(%sender, passes = game.consecutive_passes, "pass");
                if game.consecutive_passes >= PASSES_TO_SCORE {
                    self.start_scoring(game);
                } else {
                    self.switch_turn(game, sender, MSG_YOU_PASSED, MSG_OPPONENT_PASSED);
                }
                Ok(())
            }
            Move::Place { x, y } => {
                game.consecutive_passes = 0;
                let color = game.current_turn;
                let Match { board, ko, .. } = &mut *game;
                let placed = self
                    .shared
                    .rules
                    .apply_move(board, (x, y), color, ko)
                    .map_err(Rejection::Illegal)?;
                game.add_prisoners(color, placed.captured as u32);
                debug!(%color, x, y, captured = placed.captured, "move accepted");
                self.switch_turn(game, sender, MSG_MOVE_ACCEPTED, MSG_YOUR_TURN);
                Ok(())
            }
            Move::MarkDead { .. } | Move::ConfirmDone => Err(Rejection::WrongPhase),
        }
    }

    fn handle_scoring_move(
        &self,
        game: &mut Match,
        mv: Move,
        sender: Color,
    ) -> Result<(), Rejection> {
        match mv {
            Move::Resign => {
                self.end_by_resignation(game, sender);
                Ok(())
            }
            Move::ConfirmDone => {
                match sender {
                    Color::Black => game.black_done = true,
                    Color::White => game.white_done = true,
                }
                info!(%sender, "confirmed scoring");
                if game.black_done && game.white_done {
                    self.finish_and_score(game);
                } else {
                    self.send(game, sender, game.state(MSG_WAITING, false));
                }
                Ok(())
            }
            Move::MarkDead { x, y } | Move::Place { x, y } => {
                let Some(stone) = game.board.get(x, y) else {
                    debug!(x, y, "nothing to remove");
                    return Ok(());
                };
                game.board.set(x, y, None);
                game.add_prisoners(stone.opposite(), 1);
                game.black_done = false;
                game.white_done = false;
                info!(%sender, x, y, removed = %stone, "dead stone removed");
                self.broadcast(game, MSG_STONE_REMOVED, true, true);
                Ok(())
            }
            Move::Pass => Err(Rejection::WrongPhase),
        }
    }

    fn switch_turn(&self, game: &mut Match, sender: Color, msg_self: &str, msg_other: &str) {
        game.current_turn = game.current_turn.opposite();
        self.send(game, sender, game.state(msg_self, false));
        self.send(game, sender.opposite(), game.state(msg_other, true));
    }

    fn start_scoring(&self, game: &mut Match) {
        game.phase = Phase::Scoring;
        game.black_done = false;
        game.white_done = false;
        info!("entering scoring phase");
        self.broadcast(game, MSG_SCORING_PHASE, true, true);
    }

    fn finish_and_score(&self, game: &mut Match) {
        let score = self.shared.scoring.score(
            &game.board,
            game.black_prisoners,
            game.white_prisoners,
            self.shared.komi,
        );
        game.phase = Phase::Ended;
        game.final_score = Some(score);
        let winner = score.winner();
        info!(%score, %winner, "game over");
        let message = format!("GAME OVER\n{score}\n{winner}");
        self.broadcast(game, &message, false, false);
    }

    fn end_by_resignation(&self, game: &mut Match, loser: Color) {
        game.phase = Phase::Ended;
        game.resigned = Some(loser);
        info!(%loser, "resignation");
        self.send(game, loser, game.state(MSG_YOU_RESIGNED, false));
        self.send(game, loser.opposite(), game.state(MSG_OPPONENT_RESIGNED, false));
    }

    /// Records that `color`'s connection is gone. The match keeps its state;
    /// further updates to that actor are dropped and the other actor is told
    /// its opponent left.
    #[instrument(skip(self))]
    pub fn disconnected(&self, color: Color) {
        let mut game = self.lock();
        match color {
            Color::Black => game.black_connected = false,
            Color::White => game.white_connected = false,
        }
        warn!(%color, phase = ?game.phase, "actor disconnected");
        if game.connected(color.opposite()) {
            self.actor(color.opposite()).opponent_left();
        }
    }

    /// Copies the current state out of the critical section.
    pub fn snapshot(&self) -> SessionSnapshot {
        let game = self.lock();
        SessionSnapshot {
            board: game.board.clone(),
            ko: game.ko.clone(),
            current_turn: game.current_turn,
            consecutive_passes: game.consecutive_passes,
            black_prisoners: game.black_prisoners,
            white_prisoners: game.white_prisoners,
            phase: game.phase,
            black_done: game.black_done,
            white_done: game.white_done,
            resigned: game.resigned,
            final_score: game.final_score,
        }
    }

    /// Board and ko state, for simulating moves outside the lock.
    pub fn position(&self) -> (Board, KoState) {
        let game = self.lock();
        (game.board.clone(), game.ko.clone())
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }
}

/// Actor that forwards every update into a channel and submits nothing by
/// itself; the receiving side drives it through [`Session::handle_move`].
pub struct ChannelActor {
    color: Color,
    tx: Sender<GameState>,
}

impl ChannelActor {
    pub fn new(color: Color) -> (Self, Receiver<GameState>) {
        let (tx, rx) = mpsc::channel();
        (Self { color, tx }, rx)
    }
}

impl Actor for ChannelActor {
    fn send_state(&self, state: GameState) {
        if self.tx.send(state).is_err() {
            debug!(color = %self.color, "update receiver dropped");
        }
    }

    fn color(&self) -> Color {
        self.color
    }

    fn start(&self, _session: Session) {}
}
