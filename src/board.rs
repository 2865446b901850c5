use anyhow::{anyhow, Result};

use std::fmt;

use crate::lines::*;
use crate::{PlayerId, Position, CELLS, COLS, IN_A_ROW, PLAYERS, ROWS};

/// The line potential that wins the game, 2 ^ `IN_A_ROW`
pub const WINNING_POTENTIAL: u32 = 1 << IN_A_ROW;

/// A spin of the board. The named side of the board becomes the new bottom.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Spin {
    /// Rotate 90° clockwise
    Right,
    /// Rotate 180°
    Bottom,
    /// Rotate 90° counter-clockwise
    Left,
}

impl Spin {
    /// All spins, in the order the move finder considers them
    pub const ALL: [Spin; 3] = [Spin::Right, Spin::Bottom, Spin::Left];

    /// Where the piece at `(row, col)` ends up after the rotation
    fn rotate(self, row: usize, col: usize) -> (usize, usize) {
        match self {
            Spin::Right => (COLS - 1 - col, row),
            Spin::Bottom => (ROWS - 1 - row, COLS - 1 - col),
            Spin::Left => (col, ROWS - 1 - row),
        }
    }
}

/// A move in the game
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Move {
    /// Drop a piece in a zero-indexed column
    Drop(usize),
    /// Spin the whole board, letting the pieces fall afterwards
    Spin(Spin),
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Drop(column) => write!(f, "drop in column {}", column + 1),
            Move::Spin(spin) => write!(f, "spin {:?}", spin),
        }
    }
}

/// The (mutable) board state
///
/// # Line Potential
/// Every winning line has a potential for each player. It is 2 ^ (number of the
/// player's pieces in the line) while the line contains none of the opponent's
/// pieces, and 0 once the opponent has blocked it. A player's score is the sum
/// of their potentials, so near-complete lines dominate it. Drops update the
/// potentials of the lines through the new piece only; spins recompute them all.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Board {
    // cells are stored bottom-to-top, left-to-right
    cells: [[PlayerId; COLS]; ROWS],
    pieces: usize,
    game_over: bool,
    winner: PlayerId,
    line_stats: [[u32; LINE_COUNT]; PLAYERS],
    scores: [i32; PLAYERS],
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[PlayerId::None; COLS]; ROWS],
            pieces: 0,
            game_over: false,
            winner: PlayerId::None,
            // an empty line is worth 2 ^ 0 to both players
            line_stats: [[1; LINE_COUNT]; PLAYERS],
            scores: [LINE_COUNT as i32; PLAYERS],
        }
    }

    /// Plays a string of one-indexed column digits, alternating players starting with
    /// `PlayerId::One`
    pub fn from_moves<S: AsRef<str>>(moves: S) -> Result<Self> {
        let mut board = Self::new();
        let mut player = PlayerId::One;

        for column_char in moves.as_ref().chars() {
            match column_char.to_digit(10).map(|c| c as usize) {
                Some(column @ 1..=COLS) => {
                    if board.game_over {
                        return Err(anyhow!("Invalid position, game is over"));
                    }
                    if board.drop(player, column - 1).is_none() {
                        return Err(anyhow!("Invalid move, column {} full", column));
                    }
                    player = player.opponent();
                }
                _ => return Err(anyhow!("could not parse '{}' as a valid move", column_char)),
            }
        }
        Ok(board)
    }

    /// Builds a board from its parts, recomputing all line potentials.
    /// Cells are given top row first, using '.', 'X' and 'O'.
    pub fn from_rows(rows: [&str; ROWS]) -> Result<Self> {
        let mut board = Self::new();
        for (i, text) in rows.iter().enumerate() {
            let row = ROWS - 1 - i;
            let chars: Vec<char> = text.chars().collect();
            if chars.len() != COLS {
                return Err(anyhow!("row '{}' must have {} cells", text, COLS));
            }
            for (col, c) in chars.into_iter().enumerate() {
                let piece = match c {
                    '.' => PlayerId::None,
                    'X' => PlayerId::One,
                    'O' => PlayerId::Two,
                    _ => return Err(anyhow!("could not parse '{}' as a cell", c)),
                };
                board.set_piece(piece, row, col);
            }
        }
        board.recompute();
        Ok(board)
    }

    pub(crate) fn from_parts(
        cells: [[PlayerId; COLS]; ROWS],
        pieces: usize,
        game_over: bool,
        winner: PlayerId,
        line_stats: [[u32; LINE_COUNT]; PLAYERS],
        scores: [i32; PLAYERS],
    ) -> Self {
        Self {
            cells,
            pieces,
            game_over,
            winner,
            line_stats,
            scores,
        }
    }

    pub fn can_drop(&self, column: usize) -> bool {
        column < COLS && self.cells[ROWS - 1][column].is_none()
    }

    /// Drops a piece into a zero-indexed column. Returns the row at which the piece
    /// stopped falling, or `None` if the move was invalid.
    pub fn drop(&mut self, piece: PlayerId, column: usize) -> Option<usize> {
        let player = piece.index()?;
        if !self.can_drop(column) {
            return None;
        }
        let opponent = piece.opponent().index()?;

        let row = (0..ROWS).find(|&row| self.cells[row][column].is_none())?;
        self.cells[row][column] = piece;
        self.pieces += 1;

        let mut won = false;
        for &line in lines_through(Position::new(row, column)) {
            let own = self.line_stats[player][line];
            if own != 0 {
                self.line_stats[player][line] = own << 1;
                self.scores[player] += own as i32;
                won |= own << 1 == WINNING_POTENTIAL;
            }
            // any line we touch is dead for the opponent
            self.scores[opponent] -= self.line_stats[opponent][line] as i32;
            self.line_stats[opponent][line] = 0;
        }

        if !self.game_over {
            if won {
                self.game_over = true;
                self.winner = piece;
            } else if self.pieces == CELLS {
                self.game_over = true;
                self.winner = PlayerId::None;
            }
        }
        Some(row)
    }

    /// Spins the board and lets the pieces fall. Returns the board after the
    /// spin but before the pieces have fallen.
    pub fn spin(&mut self, spin: Spin) -> Board {
        let mut rotated = *self;
        rotated.rotate(spin);
        rotated.recompute();

        *self = rotated;
        self.settle();
        self.recompute();
        rotated
    }

    /// Spins the board and lets the pieces fall, without keeping the intermediate state
    pub fn apply_spin(&mut self, spin: Spin) {
        self.rotate(spin);
        self.settle();
        self.recompute();
    }

    /// Plays `piece`'s move. Returns false if the move was invalid.
    pub fn apply(&mut self, piece: PlayerId, next_move: Move) -> bool {
        match next_move {
            Move::Drop(column) => self.drop(piece, column).is_some(),
            Move::Spin(spin) => {
                self.apply_spin(spin);
                true
            }
        }
    }

    /// The moves available in this position: drops in ascending column order,
    /// then spins in the order of [`Spin::ALL`]
    pub fn legal_moves(&self, consider_spins: bool) -> Vec<Move> {
        if self.game_over {
            return Vec::new();
        }
        let mut moves: Vec<Move> = (0..COLS)
            .filter(|&column| self.can_drop(column))
            .map(Move::Drop)
            .collect();
        if consider_spins {
            moves.extend(Spin::ALL.iter().map(|&spin| Move::Spin(spin)));
        }
        moves
    }

    fn rotate(&mut self, spin: Spin) {
        let mut cells = [[PlayerId::None; COLS]; ROWS];
        for row in 0..ROWS {
            for col in 0..COLS {
                let (new_row, new_col) = spin.rotate(row, col);
                cells[new_row][new_col] = self.cells[row][col];
            }
        }
        self.cells = cells;
    }

    // let every piece fall to the lowest empty cell of its column
    fn settle(&mut self) {
        for col in 0..COLS {
            let mut floor = 0;
            for row in 0..ROWS {
                let piece = self.cells[row][col];
                if !piece.is_none() {
                    self.cells[row][col] = PlayerId::None;
                    self.cells[floor][col] = piece;
                    floor += 1;
                }
            }
        }
    }

    /// Rebuilds the piece count, line potentials, scores and game state from the cells
    pub fn recompute(&mut self) {
        self.pieces = self.cells.iter().flatten().filter(|p| !p.is_none()).count();
        self.line_stats = [[0; LINE_COUNT]; PLAYERS];
        self.scores = [0; PLAYERS];

        let mut complete = [false; PLAYERS];
        for (line, positions) in LINES.iter().enumerate() {
            let mut held = [0; PLAYERS];
            for position in positions.iter() {
                if let Some(player) = self.cells[position.row][position.col].index() {
                    held[player] += 1;
                }
            }
            for player in 0..PLAYERS {
                if held[1 - player] == 0 {
                    let potential = 1 << held[player];
                    self.line_stats[player][line] = potential;
                    self.scores[player] += potential as i32;
                    complete[player] |= potential == WINNING_POTENTIAL;
                }
            }
        }

        let (game_over, winner) = match complete {
            [true, false] => (true, PlayerId::One),
            [false, true] => (true, PlayerId::Two),
            // both players completing a line at once is a tie
            [true, true] => (true, PlayerId::None),
            [false, false] => (self.pieces == CELLS, PlayerId::None),
        };
        self.game_over = game_over;
        self.winner = winner;
    }

    pub fn piece_at(&self, row: usize, col: usize) -> PlayerId {
        self.cells[row][col]
    }

    /// Sets a cell directly. Line potentials and scores are not updated until
    /// [`Board::recompute`] is called.
    pub fn set_piece(&mut self, piece: PlayerId, row: usize, col: usize) {
        self.cells[row][col] = piece;
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// The winner, or `PlayerId::None` for a tie. Only meaningful once the game is over.
    pub fn winner(&self) -> PlayerId {
        self.winner
    }

    pub fn pieces(&self) -> usize {
        self.pieces
    }

    /// Returns every line held entirely by one player
    pub fn full_lines(&self) -> Vec<Line> {
        LINES
            .iter()
            .enumerate()
            .filter(|&(line, _)| {
                (0..PLAYERS).any(|player| self.line_stats[player][line] == WINNING_POTENTIAL)
            })
            .map(|(_, positions)| *positions)
            .collect()
    }

    pub fn score(&self, player: PlayerId) -> i32 {
        player.index().map_or(0, |p| self.scores[p])
    }

    /// Returns the score of the given player relative to that of their opponent
    pub fn relative_score(&self, player: PlayerId) -> i32 {
        self.score(player) - self.score(player.opponent())
    }

    pub fn line_stat(&self, player: PlayerId, line: usize) -> u32 {
        player.index().map_or(0, |p| self.line_stats[p][line])
    }

    pub(crate) fn cells(&self) -> &[[PlayerId; COLS]; ROWS] {
        &self.cells
    }

    pub(crate) fn line_stats(&self) -> &[[u32; LINE_COUNT]; PLAYERS] {
        &self.line_stats
    }

    pub(crate) fn scores(&self) -> &[i32; PLAYERS] {
        &self.scores
    }

    /// Clears all the pieces off the board
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..ROWS).rev() {
            for col in 0..COLS {
                let c = match self.cells[row][col] {
                    PlayerId::None => '.',
                    PlayerId::One => 'X',
                    PlayerId::Two => 'O',
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
