//! The table of winning lines, generated at compile time

use static_assertions::*;

use crate::{Position, CELLS, COLS, IN_A_ROW, ROWS};

/// The number of winning lines on the board
pub const LINE_COUNT: usize = 88;

/// The most lines that can pass through a single cell (one per offset per direction)
pub const MAX_LINES_PER_CELL: usize = 4 * IN_A_ROW;

/// Four cells that win the game when held by one player
pub type Line = [Position; IN_A_ROW];

// (row step, column step): horizontal, vertical, diagonal up-right, diagonal down-right
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (-1, 1)];

const fn fits(row: usize, col: usize, direction: (isize, isize)) -> bool {
    let end_row = row as isize + direction.0 * (IN_A_ROW as isize - 1);
    let end_col = col as isize + direction.1 * (IN_A_ROW as isize - 1);
    end_row >= 0 && end_row < ROWS as isize && end_col >= 0 && end_col < COLS as isize
}

const fn count_lines() -> usize {
    let mut count = 0;
    let mut d = 0;
    while d < DIRECTIONS.len() {
        let mut row = 0;
        while row < ROWS {
            let mut col = 0;
            while col < COLS {
                if fits(row, col, DIRECTIONS[d]) {
                    count += 1;
                }
                col += 1;
            }
            row += 1;
        }
        d += 1;
    }
    count
}

const_assert_eq!(count_lines(), LINE_COUNT);

const fn generate_lines() -> [Line; LINE_COUNT] {
    let mut lines = [[Position::new(0, 0); IN_A_ROW]; LINE_COUNT];
    let mut n = 0;
    let mut d = 0;
    while d < DIRECTIONS.len() {
        let (dr, dc) = DIRECTIONS[d];
        let mut row = 0;
        while row < ROWS {
            let mut col = 0;
            while col < COLS {
                if fits(row, col, DIRECTIONS[d]) {
                    let mut i = 0;
                    while i < IN_A_ROW {
                        lines[n][i] = Position::new(
                            (row as isize + dr * i as isize) as usize,
                            (col as isize + dc * i as isize) as usize,
                        );
                        i += 1;
                    }
                    n += 1;
                }
                col += 1;
            }
            row += 1;
        }
        d += 1;
    }
    lines
}

// (number of lines through each cell, line indices through each cell)
const fn generate_cell_lines() -> ([usize; CELLS], [[usize; MAX_LINES_PER_CELL]; CELLS]) {
    let lines = generate_lines();
    let mut counts = [0; CELLS];
    let mut table = [[0; MAX_LINES_PER_CELL]; CELLS];
    let mut n = 0;
    while n < LINE_COUNT {
        let mut i = 0;
        while i < IN_A_ROW {
            let cell = lines[n][i].index();
            table[cell][counts[cell]] = n;
            counts[cell] += 1;
            i += 1;
        }
        n += 1;
    }
    (counts, table)
}

const CELL_LINES: ([usize; CELLS], [[usize; MAX_LINES_PER_CELL]; CELLS]) = generate_cell_lines();

/// Every winning line, horizontal lines first, then vertical, then both diagonals
pub static LINES: [Line; LINE_COUNT] = generate_lines();

static CELL_LINE_COUNTS: [usize; CELLS] = CELL_LINES.0;
static CELL_LINE_TABLE: [[usize; MAX_LINES_PER_CELL]; CELLS] = CELL_LINES.1;

/// Indices into [`LINES`] of every line passing through `position`
pub fn lines_through(position: Position) -> &'static [usize] {
    let cell = position.index();
    &CELL_LINE_TABLE[cell][..CELL_LINE_COUNTS[cell]]
}
