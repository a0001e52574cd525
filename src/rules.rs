//! Move legality, capture and ko.
//!
//! [`RulesEngine::apply_move`] places one stone, removes every opposing chain
//! left without liberties, then rejects suicide and immediate board repetition
//! (simple ko). A rejected move leaves the board exactly as it was.

use derive_more::{Display, Error};
use tracing::trace;

use crate::board::{Board, Color, Point};

/// Reason a placement was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    /// Point is off the board
    #[display("point is off the board")]
    OutOfBounds,
    /// Point is not empty
    #[display("point not empty")]
    Occupied,
    /// Move would leave its own chain without liberties and captures nothing
    #[display("suicide")]
    Suicide,
    /// Move recreates the position before the previous move
    #[display("retakes ko")]
    Ko,
}

/// Ko bookkeeping for one game: the board as it was before the last move.
///
/// Cloning gives a disposable copy for move simulation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KoState {
    previous: Option<Board>,
}

impl KoState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous_board(&self) -> Option<&Board> {
        self.previous.as_ref()
    }

    pub fn set_previous_board(&mut self, board: Board) {
        self.previous = Some(board);
    }
}

/// Outcome of an accepted placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Opposing stones removed by the move.
    pub captured: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RulesEngine;

impl RulesEngine {
    pub fn new() -> Self {
        Self
    }

    /// Plays `color` at `(x, y)` on `board`.
    ///
    /// On success the board holds the new position and `ko` holds the board as
    /// it was before this move. On failure neither is touched.
    pub fn apply_move(
        &self,
        board: &mut Board,
        (x, y): Point,
        color: Color,
        ko: &mut KoState,
    ) -> Result<Placement, MoveError> {
        if !board.in_bounds(x, y) {
            return Err(MoveError::OutOfBounds);
        }
        if board.get(x, y).is_some() {
            return Err(MoveError::Occupied);
        }

        let before_move = board.clone();
        board.set(x, y, Some(color));

        let opp = color.opposite();
        let mut captured = 0;
        let neighbors: Vec<Point> = board.neighbors(x, y).collect();
        for (nx, ny) in neighbors {
            // A chain already removed through another neighbor reads as empty here.
            if board.get(nx, ny) != Some(opp) {
                continue;
            }
            let chain = collect_chain(board, (nx, ny));
            if !has_liberty(board, &chain) {
                captured += chain.len();
                for &(cx, cy) in &chain {
                    board.set(cx, cy, None);
                }
            }
        }

        if captured == 0 && !has_liberty(board, &collect_chain(board, (x, y))) {
            board.restore_from(&before_move);
            return Err(MoveError::Suicide);
        }

        if ko.previous_board() == Some(&*board) {
            board.restore_from(&before_move);
            return Err(MoveError::Ko);
        }

        trace!(x, y, %color, captured, "stone placed");
        ko.set_previous_board(before_move);
        Ok(Placement { captured })
    }
}

/// The maximal 4-connected chain of same-colored stones containing `start`.
///
/// Returns an empty chain if `start` is empty or off the board.
pub fn collect_chain(board: &Board, start: Point) -> Vec<Point> {
    let Some(color) = board.get(start.0, start.1) else {
        return Vec::new();
    };
    let size = board.size();
    let mut visited = vec![false; size * size];
    let mut stack = vec![start];
    let mut chain = Vec::new();
    visited[start.1 * size + start.0] = true;

    while let Some((cx, cy)) = stack.pop() {
        chain.push((cx, cy));
        for (nx, ny) in board.neighbors(cx, cy) {
            let ni = ny * size + nx;
            if !visited[ni] && board.get(nx, ny) == Some(color) {
                visited[ni] = true;
                stack.push((nx, ny));
            }
        }
    }
    chain
}

/// Whether any stone of `chain` touches an empty point.
pub fn has_liberty(board: &Board, chain: &[Point]) -> bool {
    chain
        .iter()
        .any(|&(x, y)| board.neighbors(x, y).any(|(nx, ny)| board.get(nx, ny).is_none()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_from(rows: &str) -> Board {
        rows.parse().expect("valid board text")
    }

    #[test]
    fn test_valid_move() {
        let mut board = Board::new(9);
        let mut ko = KoState::new();
        let result = RulesEngine::new().apply_move(&mut board, (4, 4), Color::Black, &mut ko);
        assert_eq!(result, Ok(Placement { captured: 0 }));
        assert_eq!(board.get(4, 4), Some(Color::Black));
        assert_eq!(ko.previous_board(), Some(&Board::new(9)));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut board = Board::new(9);
        let mut ko = KoState::new();
        let result = RulesEngine::new().apply_move(&mut board, (9, 0), Color::Black, &mut ko);
        assert_eq!(result, Err(MoveError::OutOfBounds));
        assert_eq!(board, Board::new(9));
        assert_eq!(ko, KoState::new());
    }

    #[test]
    fn test_occupied() {
        let mut board = Board::new(9);
        board.set(2, 2, Some(Color::Black));
        let before = board.clone();
        let mut ko = KoState::new();
        let result = RulesEngine::new().apply_move(&mut board, (2, 2), Color::White, &mut ko);
        assert_eq!(result, Err(MoveError::Occupied));
        assert_eq!(board, before);
    }

    #[test]
    fn test_capture_single_stone() {
        let mut board = Board::new(9);
        board.set(1, 0, Some(Color::Black));
        board.set(0, 1, Some(Color::Black));
        board.set(1, 2, Some(Color::Black));
        board.set(1, 1, Some(Color::White));

        let mut ko = KoState::new();
        let result = RulesEngine::new().apply_move(&mut board, (2, 1), Color::Black, &mut ko);
        assert_eq!(result, Ok(Placement { captured: 1 }));
        assert_eq!(board.get(1, 1), None);
        assert_eq!(board.get(2, 1), Some(Color::Black));
    }

    #[test]
    fn test_capture_chain() {
        let mut board = board_from(
            "B W W . .\n\
             . B B . .\n\
             . . . . .\n\
             . . . . .\n\
             . . . . .\n",
        );
        let mut ko = KoState::new();
        let result = RulesEngine::new().apply_move(&mut board, (3, 0), Color::Black, &mut ko);
        assert_eq!(result, Ok(Placement { captured: 2 }));
        assert_eq!(board.get(1, 0), None);
        assert_eq!(board.get(2, 0), None);
        assert_eq!(board.get(3, 0), Some(Color::Black));
    }

    #[test]
    fn test_capture_two_chains_at_once() {
        let mut board = board_from(
            "B W B . .\n\
             W . . . .\n\
             B . . . .\n\
             . . . . .\n\
             . . . . .\n",
        );
        let mut ko = KoState::new();
        let result = RulesEngine::new().apply_move(&mut board, (1, 1), Color::Black, &mut ko);
        assert_eq!(result, Ok(Placement { captured: 2 }));
        assert_eq!(board.get(1, 0), None);
        assert_eq!(board.get(0, 1), None);
        assert_eq!(board.get(0, 0), Some(Color::Black));
    }

    #[test]
    fn test_suicide_rejected_and_board_unchanged() {
        let mut board = Board::new(9);
        board.set(1, 0, Some(Color::White));
        board.set(0, 1, Some(Color::White));
        board.set(2, 1, Some(Color::White));
        board.set(1, 2, Some(Color::White));
        let before = board.clone();

        let mut ko = KoState::new();
        let result = RulesEngine::new().apply_move(&mut board, (1, 1), Color::Black, &mut ko);
        assert_eq!(result, Err(MoveError::Suicide));
        assert_eq!(board, before);
        assert_eq!(ko.previous_board(), None);
    }

    #[test]
    fn test_multi_stone_suicide() {
        let mut board = board_from(
            "B . W .\n\
             W W . .\n\
             . . . .\n\
             . . . .\n",
        );
        let before = board.clone();
        let mut ko = KoState::new();
        let result = RulesEngine::new().apply_move(&mut board, (1, 0), Color::Black, &mut ko);
        assert_eq!(result, Err(MoveError::Suicide));
        assert_eq!(board, before);
    }

    #[test]
    fn test_capture_is_not_suicide() {
        let mut board = board_from(
            ". W B .\n\
             W B . .\n\
             B . . .\n\
             . . . .\n",
        );
        let mut ko = KoState::new();
        let result = RulesEngine::new().apply_move(&mut board, (0, 0), Color::Black, &mut ko);
        assert_eq!(result, Ok(Placement { captured: 2 }));
        assert_eq!(board.get(0, 0), Some(Color::Black));
        assert_eq!(board.get(1, 0), None);
        assert_eq!(board.get(0, 1), None);
    }

    #[test]
    fn test_ko_recapture_rejected() {
        // Classic ko shape around (1,1)/(2,1).
        let mut board = board_from(
            ". B W .\n\
             B W . W\n\
             . B W .\n\
             . . . .\n",
        );
        let rules = RulesEngine::new();
        let mut ko = KoState::new();

        // Black takes at (2,1), capturing white (1,1).
        assert_eq!(
            rules.apply_move(&mut board, (2, 1), Color::Black, &mut ko),
            Ok(Placement { captured: 1 })
        );
        assert_eq!(board.get(1, 1), None);
        let after_take = board.clone();

        // White retaking at (1,1) would recreate the previous position.
        assert_eq!(
            rules.apply_move(&mut board, (1, 1), Color::White, &mut ko),
            Err(MoveError::Ko)
        );
        assert_eq!(board, after_take);

        // After a move elsewhere the ko reference changes and the retake is legal.
        assert!(rules.apply_move(&mut board, (3, 3), Color::White, &mut ko).is_ok());
        assert!(rules.apply_move(&mut board, (0, 3), Color::Black, &mut ko).is_ok());
        assert_eq!(
            rules.apply_move(&mut board, (1, 1), Color::White, &mut ko),
            Ok(Placement { captured: 1 })
        );
    }

    #[test]
    fn test_collect_chain_and_liberty() {
        let board = board_from(
            "B B .\n\
             . B W\n\
             . . .\n",
        );
        let mut chain = collect_chain(&board, (0, 0));
        chain.sort();
        assert_eq!(chain, vec![(0, 0), (1, 0), (1, 1)]);
        assert!(has_liberty(&board, &chain));
        assert!(collect_chain(&board, (2, 2)).is_empty());
    }
}
