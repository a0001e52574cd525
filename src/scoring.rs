//! Territory scoring.
//!
//! Every maximal empty region is flood-filled once. A region bordered by stones
//! of a single color is that color's territory; a region touching both colors,
//! or none, is neutral. Each side's score is its territory plus the prisoners
//! it took, with komi added to White.
//!
//! Seki is not recognised: an empty region inside a seki that is bordered by one
//! color only still counts as that color's territory.

use std::fmt;

use crate::board::{Board, Color, Point};

/// Final score of a game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub black: f32,
    pub white: f32,
}

/// Result of comparing the two scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Color(Color),
    Draw,
}

impl Score {
    /// Strictly higher score wins; equal scores are a draw.
    pub fn winner(&self) -> Winner {
        if self.black > self.white {
            Winner::Color(Color::Black)
        } else if self.white > self.black {
            Winner::Color(Color::White)
        } else {
            Winner::Draw
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BLACK: {:.1} | WHITE: {:.1}", self.black, self.white)
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::Color(c) => write!(f, "{c} wins!"),
            Winner::Draw => write!(f, "Draw."),
        }
    }
}

/// A maximal connected set of empty points and the colors along its border.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub points: Vec<Point>,
    pub touches_black: bool,
    pub touches_white: bool,
}

impl Region {
    /// The owning color, if exactly one color borders the region.
    pub fn owner(&self) -> Option<Color> {
        match (self.touches_black, self.touches_white) {
            (true, false) => Some(Color::Black),
            (false, true) => Some(Color::White),
            _ => None,
        }
    }
}

/// Splits the empty points of `board` into regions.
pub fn empty_regions(board: &Board) -> Vec<Region> {
    let size = board.size();
    let mut visited = vec![false; size * size];
    let mut regions = Vec::new();

    for (x, y) in board.points() {
        if board.get(x, y).is_some() || visited[y * size + x] {
            continue;
        }
        regions.push(flood_region(board, (x, y), &mut visited));
    }
    regions
}

fn flood_region(board: &Board, start: Point, visited: &mut [bool]) -> Region {
    let size = board.size();
    let mut region = Region {
        points: Vec::new(),
        touches_black: false,
        touches_white: false,
    };
    let mut queue = vec![start];
    visited[start.1 * size + start.0] = true;

    while let Some((x, y)) = queue.pop() {
        region.points.push((x, y));
        for (nx, ny) in board.neighbors(x, y) {
            match board.get(nx, ny) {
                None => {
                    let ni = ny * size + nx;
                    if !visited[ni] {
                        visited[ni] = true;
                        queue.push((nx, ny));
                    }
                }
                Some(Color::Black) => region.touches_black = true,
                Some(Color::White) => region.touches_white = true,
            }
        }
    }
    region
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    /// Scores `board` without modifying it.
    pub fn score(
        &self,
        board: &Board,
        black_prisoners: u32,
        white_prisoners: u32,
        komi: f32,
    ) -> Score {
        let mut black_territory = 0usize;
        let mut white_territory = 0usize;
        for region in empty_regions(board) {
            match region.owner() {
                Some(Color::Black) => black_territory += region.points.len(),
                Some(Color::White) => white_territory += region.points.len(),
                None => {}
            }
        }

        Score {
            black: (black_territory + black_prisoners as usize) as f32,
            white: (white_territory + white_prisoners as usize) as f32 + komi,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_from(rows: &str) -> Board {
        rows.parse().expect("valid board text")
    }

    #[test]
    fn test_empty_board_score() {
        let board = Board::new(5);
        for komi in [0.0, 6.5, 7.5] {
            let score = ScoringEngine::new().score(&board, 0, 0, komi);
            assert_eq!(score, Score { black: 0.0, white: komi });
        }
    }

    #[test]
    fn test_single_color_territory() {
        // Black wall on column 1 owns column 0 (3 points).
        let board = board_from(
            ". B .\n\
             . B .\n\
             . B .\n",
        );
        // Column 2 also borders only black.
        let score = ScoringEngine::new().score(&board, 0, 0, 0.0);
        assert_eq!(score, Score { black: 6.0, white: 0.0 });
    }

    #[test]
    fn test_contested_region_is_neutral() {
        let board = board_from(
            "B . W\n\
             B . W\n\
             B . W\n",
        );
        let score = ScoringEngine::new().score(&board, 0, 0, 0.0);
        assert_eq!(score, Score { black: 0.0, white: 0.0 });
    }

    #[test]
    fn test_territory_plus_prisoners_plus_komi() {
        let board = board_from(
            ". B W .\n\
             . B W .\n\
             . B W .\n\
             . B W .\n",
        );
        let score = ScoringEngine::new().score(&board, 3, 1, 6.5);
        assert_eq!(score, Score { black: 7.0, white: 11.5 });
        assert_eq!(score.winner(), Winner::Color(Color::White));
    }

    #[test]
    fn test_corner_territory() {
        let board = board_from(
            ". B . . .\n\
             B B . . .\n\
             . . . . .\n\
             . . . W W\n\
             . . . W .\n",
        );
        let regions = empty_regions(&board);
        // Corner (0,0), corner (4,4), and the big middle region.
        assert_eq!(regions.len(), 3);
        let score = ScoringEngine::new().score(&board, 0, 0, 0.0);
        assert_eq!(score, Score { black: 1.0, white: 1.0 });
    }

    #[test]
    fn test_score_does_not_mutate_board() {
        let board = board_from(
            ". B\n\
             W .\n",
        );
        let before = board.clone();
        let _ = ScoringEngine::new().score(&board, 0, 0, 0.0);
        assert_eq!(board, before);
    }

    #[test]
    fn test_winner_and_draw() {
        assert_eq!(Score { black: 10.0, white: 9.5 }.winner(), Winner::Color(Color::Black));
        assert_eq!(Score { black: 3.0, white: 3.0 }.winner(), Winner::Draw);
        assert_eq!(Winner::Draw.to_string(), "Draw.");
        assert_eq!(Winner::Color(Color::White).to_string(), "WHITE wins!");
        assert_eq!(
            Score { black: 2.0, white: 6.5 }.to_string(),
            "BLACK: 2.0 | WHITE: 6.5"
        );
    }
}
