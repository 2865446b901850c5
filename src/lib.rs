//! A game-tree search agent for 'Spin Four', Connect 4 on a 7x7 board
//! where a player may spin the whole board instead of dropping a piece
//!
//! The board tracks the potential of every winning line incrementally, and
//! the move finder runs a depth-bounded alpha-beta search over drops and spins
//! using that potential as its evaluation.
//!
//! # Basic Usage
//!
//! ```
//! use spin_four_ai::{board::Board, move_finder::*, PlayerId};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! // X has three in a row along the bottom
//! let board = Board::from_moves("112233")?;
//!
//! let finder = MoveFinder::with_parameters(MoveParameters {
//!     max_depth: 1,
//!     consider_spins: false,
//!     randomize: false,
//! });
//! let best_move = finder.find_move(PlayerId::One, &board, &mut rand::thread_rng())?;
//!
//! assert_eq!(best_move, Move::Drop(3));
//!# Ok(())
//!# }
//! ```

use static_assertions::*;
pub use anyhow;

pub mod lines;

pub mod board;

pub mod snapshot;

pub mod move_finder;


/// The number of rows on the game board
pub const ROWS: usize = 7;

/// The number of columns on the game board
pub const COLS: usize = 7;

/// The number of cells on the game board
pub const CELLS: usize = ROWS * COLS;

/// The number of pieces in a row needed to win
pub const IN_A_ROW: usize = 4;

/// The number of players in the game
pub const PLAYERS: usize = 2;

// the snapshot format stores the piece count in a single byte
const_assert!(CELLS <= u8::MAX as usize);
// a line must fit on the board in every direction
const_assert!(IN_A_ROW <= ROWS && IN_A_ROW <= COLS);

/// A player identifier, also used for the contents of a cell
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum PlayerId {
    None,
    One,
    Two,
}

impl PlayerId {
    /// Returns the other player, or `PlayerId::None` for `PlayerId::None`
    pub fn opponent(self) -> Self {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
            PlayerId::None => PlayerId::None,
        }
    }

    /// Zero-based index into per-player tables
    pub fn index(self) -> Option<usize> {
        match self {
            PlayerId::One => Some(0),
            PlayerId::Two => Some(1),
            PlayerId::None => None,
        }
    }

    pub fn is_none(self) -> bool {
        self == PlayerId::None
    }

    /// The byte used for this player in saved boards
    pub fn to_byte(self) -> u8 {
        match self {
            PlayerId::None => 0,
            PlayerId::One => 1,
            PlayerId::Two => 2,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(PlayerId::None),
            1 => Some(PlayerId::One),
            2 => Some(PlayerId::Two),
            _ => None,
        }
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        PlayerId::None
    }
}

/// A cell on the board, row 0 is the bottom
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Row-major index of the cell, counting from the bottom left
    pub const fn index(&self) -> usize {
        self.row * COLS + self.col
    }
}
