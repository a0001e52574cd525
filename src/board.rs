//! Square Go board with value semantics.
//!
//! The board is a plain container: it knows its size and which stone sits on
//! each intersection, nothing about the rules. Cloning yields an independent
//! copy and equality compares size and every cell.

use std::fmt;
use std::str::FromStr;

use derive_more::{Display, Error};

/// Stone color. An empty intersection is `None` on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// The other player's color.
    pub fn opposite(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Single-letter symbol used in the text render.
    pub fn symbol(self) -> char {
        match self {
            Color::Black => 'B',
            Color::White => 'W',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "BLACK"),
            Color::White => write!(f, "WHITE"),
        }
    }
}

/// Board coordinate `(x, y)`, x is the column and y the row.
pub type Point = (usize, usize);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<Option<Color>>,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.size + x
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size
    }

    /// Stone at `(x, y)`; `None` for an empty or off-board point.
    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.cells[self.idx(x, y)]
    }

    /// Writes a cell. Off-board writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, stone: Option<Color>) {
        if self.in_bounds(x, y) {
            let i = self.idx(x, y);
            self.cells[i] = stone;
        }
    }

    /// On-board orthogonal neighbors of `(x, y)`.
    pub fn neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = Point> + '_ {
        let s = self.size;
        let mut v = Vec::with_capacity(4);
        if x > 0 {
            v.push((x - 1, y));
        }
        if x + 1 < s {
            v.push((x + 1, y));
        }
        if y > 0 {
            v.push((x, y - 1));
        }
        if y + 1 < s {
            v.push((x, y + 1));
        }
        v.into_iter()
    }

    /// All intersections in row-major order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        let s = self.size;
        (0..s).flat_map(move |y| (0..s).map(move |x| (x, y)))
    }

    /// Number of stones on the board, both colors.
    pub fn stone_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Overwrites every cell with the content of `other` (same size).
    pub fn restore_from(&mut self, other: &Board) {
        debug_assert_eq!(self.size, other.size);
        self.cells.copy_from_slice(&other.cells);
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size {
            for x in 0..self.size {
                let ch = self.get(x, y).map(Color::symbol).unwrap_or('.');
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Error returned when a board render cannot be parsed back.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ParseBoardError {
    #[display("empty board text")]
    Empty,
    #[display("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[display("unknown cell symbol {symbol:?} at row {row}")]
    BadSymbol { row: usize, symbol: char },
}

impl FromStr for Board {
    type Err = ParseBoardError;

    /// Parses the [`Display`](fmt::Display) render: one line per row, cells
    /// `B`, `W` or `.`, whitespace between cells optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<Vec<char>> = s
            .lines()
            .map(|l| l.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>())
            .filter(|r| !r.is_empty())
            .collect();
        if rows.is_empty() {
            return Err(ParseBoardError::Empty);
        }

        let size = rows.len();
        let mut board = Board::new(size);
        for (y, row) in rows.iter().enumerate() {
            if row.len() != size {
                return Err(ParseBoardError::RaggedRow {
                    row: y,
                    found: row.len(),
                    expected: size,
                });
            }
            for (x, &ch) in row.iter().enumerate() {
                let stone = match ch {
                    'B' => Some(Color::Black),
                    'W' => Some(Color::White),
                    '.' => None,
                    symbol => return Err(ParseBoardError::BadSymbol { row: y, symbol }),
                };
                board.set(x, y, stone);
            }
        }
        Ok(board)
    }
}
