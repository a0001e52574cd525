//! Go-Duel: networked two-player Go.
//!
//! This crate enforces the rules of Go for one match between two actors
//! (remote clients or a server-side bot), scores the final position, and
//! serves matches over TCP.
//!
//! ## Modules
//!
//! - [`constants`] - Defaults and protocol message texts
//! - [`board`] - Board container and stone colors
//! - [`rules`] - Move legality, captures, suicide and ko
//! - [`scoring`] - Territory plus prisoners scoring
//! - [`game`] - Moves and state updates exchanged with actors
//! - [`session`] - The per-match state machine and the [`session::Actor`] trait
//! - [`bot`] - One-ply greedy bot
//! - [`net`] - TCP transport and match acceptance
//! - [`client`] - Terminal client
//!
//! ## Example
//!
//! ```
//! use go_duel::board::{Board, Color};
//! use go_duel::rules::{KoState, RulesEngine};
//! use go_duel::scoring::ScoringEngine;
//!
//! let mut board = Board::new(9);
//! let mut ko = KoState::new();
//! RulesEngine::new()
//!     .apply_move(&mut board, (4, 4), Color::Black, &mut ko)
//!     .unwrap();
//!
//! let score = ScoringEngine::new().score(&board, 0, 0, 6.5);
//! assert_eq!(score.black, 80.0);
//! ```

pub mod board;
pub mod bot;
pub mod client;
pub mod constants;
pub mod game;
pub mod net;
pub mod rules;
pub mod scoring;
pub mod session;
