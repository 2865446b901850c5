//! An agent to choose moves in Spin Four

use anyhow::{anyhow, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;

use std::time::Instant;

pub use crate::board::{Move, Spin};
use crate::{board::Board, PlayerId, COLS};

/// The score of a won position, before the bonus for winning sooner
pub const WIN_SCORE: i32 = 1_000_000;

// larger than any score a position can have
const INFINITY: i32 = 2 * WIN_SCORE;

/// Returns a slice ordering the columns from the middle outwards, as
/// the middle columns are often better moves
pub const fn move_order() -> [usize; COLS] {
    let mut move_order = [0; COLS];
    let mut i = 0;
    while i < COLS {
        move_order[i] = (COLS / 2) + (i % 2) * (i / 2 + 1) - (1 - i % 2) * (i / 2);
        i += 1;
    }
    move_order
}

/// Parameters on moves
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct MoveParameters {
    /// Maximum depth in to the game tree to search, in plies. The first ply is always searched.
    pub max_depth: usize,
    /// If spin moves should be considered in the game tree
    pub consider_spins: bool,
    /// If ties between the best moves should be broken at random
    pub randomize: bool,
}

impl Default for MoveParameters {
    fn default() -> Self {
        Self {
            max_depth: 3,
            consider_spins: true,
            randomize: false,
        }
    }
}

/// The outcome of a top-level search
#[derive(Clone, Debug)]
pub struct SearchResult {
    pub best_move: Move,
    /// The value of `best_move` for the searching player
    pub score: i32,
    /// The value of every root move, in the order they were considered
    pub root_scores: Vec<(Move, i32)>,
    /// The number of positions searched (for diagnostics only)
    pub node_count: usize,
}

/// An agent to find good moves in Spin Four positions
///
/// # Position Scoring
/// Positions at the search horizon are scored by the mover's line potential
/// relative to the opponent's (see [`Board::relative_score`]). A won position
/// scores `WIN_SCORE` plus the number of plies left to search, so that faster
/// wins are preferred and every win outweighs any potential. Ties score 0.
#[derive(Clone, Debug, Default)]
pub struct MoveFinder {
    params: MoveParameters,
}

impl MoveFinder {
    /// Creates a move finder with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a move finder with the given parameters
    pub fn with_parameters(params: MoveParameters) -> Self {
        Self { params }
    }

    pub fn parameters(&self) -> &MoveParameters {
        &self.params
    }

    fn terminal_score(board: &Board, player: PlayerId, depth: usize) -> i32 {
        let winner = board.winner();
        if winner == player {
            WIN_SCORE + depth as i32
        } else if winner == player.opponent() {
            -(WIN_SCORE + depth as i32)
        } else {
            0
        }
    }

    /// Performs game tree search for the player to move
    ///
    /// Returns the score of the position from `player`'s point of view (see [Position Scoring])
    ///
    /// [Position Scoring]: #position-scoring
    fn negamax(
        &self,
        board: &Board,
        player: PlayerId,
        depth: usize,
        mut alpha: i32,
        beta: i32,
        node_count: &mut usize,
    ) -> i32 {
        *node_count += 1;

        if board.is_game_over() {
            return Self::terminal_score(board, player, depth);
        }
        if depth == 0 {
            return board.relative_score(player);
        }

        let order = move_order();
        let drops = order
            .iter()
            .copied()
            .filter(|&column| board.can_drop(column))
            .map(Move::Drop);
        let spins: &[Spin] = if self.params.consider_spins {
            &Spin::ALL
        } else {
            &[]
        };
        let spins = spins.iter().map(|&spin| Move::Spin(spin));

        let mut best = None;
        for next_move in drops.chain(spins) {
            let mut next = *board;
            next.apply(player, next_move);

            // the search window is flipped for the other player
            let score = -self.negamax(&next, player.opponent(), depth - 1, -beta, -alpha, node_count);
            // if a child node's score is better than beta, we can prune the tree
            // here because the opponent will not pick this branch
            if score >= beta {
                return score;
            }
            if score > alpha {
                alpha = score;
            }
            if best.map_or(true, |best| score > best) {
                best = Some(score);
            }
        }

        // only a board built by hand can have full columns without being over
        best.unwrap_or_else(|| board.relative_score(player))
    }

    /// Searches every move available to `player`, returning the best one and the
    /// value of each. The board is not modified.
    ///
    /// Fails if the game is already over, if `player` is `PlayerId::None`, or if
    /// there is no legal move.
    pub fn search<R: Rng + ?Sized>(
        &self,
        player: PlayerId,
        board: &Board,
        rng: &mut R,
    ) -> Result<SearchResult> {
        if player.is_none() {
            return Err(anyhow!("cannot search for a move for PlayerId::None"));
        }
        if board.is_game_over() {
            return Err(anyhow!("cannot search for a move, the game is over"));
        }
        let moves = board.legal_moves(self.params.consider_spins);
        if moves.is_empty() {
            return Err(anyhow!("cannot search for a move, no legal moves"));
        }

        let depth = self.params.max_depth.max(1);

        // root moves are searched with a full window so that tied values are exact
        let results: Vec<(Move, i32, usize)> = moves
            .par_iter()
            .map(|&next_move| {
                let mut node_count = 0;
                let mut next = *board;
                next.apply(player, next_move);
                let score = -self.negamax(
                    &next,
                    player.opponent(),
                    depth - 1,
                    -INFINITY,
                    INFINITY,
                    &mut node_count,
                );
                (next_move, score, node_count)
            })
            .collect();

        let score = results
            .iter()
            .map(|&(_, score, _)| score)
            .max()
            .ok_or_else(|| anyhow!("no moves were searched"))?;
        let best_moves: Vec<Move> = results
            .iter()
            .filter(|&&(_, s, _)| s == score)
            .map(|&(next_move, _, _)| next_move)
            .collect();

        let best_move = if self.params.randomize {
            *best_moves
                .choose(rng)
                .ok_or_else(|| anyhow!("no best move found"))?
        } else {
            best_moves[0]
        };

        Ok(SearchResult {
            best_move,
            score,
            node_count: 1 + results.iter().map(|&(_, _, n)| n).sum::<usize>(),
            root_scores: results.into_iter().map(|(m, s, _)| (m, s)).collect(),
        })
    }

    /// Finds, given a board state, the best move for a given player
    pub fn find_move<R: Rng + ?Sized>(
        &self,
        player: PlayerId,
        board: &Board,
        rng: &mut R,
    ) -> Result<Move> {
        self._find_move(player, board, rng, true)
    }

    /// Finds the best move for a given player, logging the search to stdout
    pub fn find_move_verbose<R: Rng + ?Sized>(
        &self,
        player: PlayerId,
        board: &Board,
        rng: &mut R,
    ) -> Result<Move> {
        self._find_move(player, board, rng, false)
    }

    fn _find_move<R: Rng + ?Sized>(
        &self,
        player: PlayerId,
        board: &Board,
        rng: &mut R,
        silent: bool,
    ) -> Result<Move> {
        let start_time = Instant::now();
        let result = self.search(player, board, rng)?;

        if !silent {
            let elapsed = start_time.elapsed();
            for (next_move, score) in result.root_scores.iter() {
                println!("  {:<24} {}", next_move.to_string(), score);
            }
            println!(
                "Searched {} positions to depth {} in {:.3}ms ({} kpos/s), best move: {} ({})",
                result.node_count,
                self.params.max_depth.max(1),
                elapsed.as_secs_f64() * 1000.0,
                (result.node_count as f64 / (1000.0 * elapsed.as_secs_f64())) as usize,
                result.best_move,
                result.score
            );
        }
        Ok(result.best_move)
    }

    /// Returns the searched value of the position for `player`, who is to move
    pub fn evaluate(&self, player: PlayerId, board: &Board) -> Result<i32> {
        if player.is_none() {
            return Err(anyhow!("cannot evaluate a position for PlayerId::None"));
        }
        let mut node_count = 0;
        Ok(self.negamax(
            board,
            player,
            self.params.max_depth,
            -INFINITY,
            INFINITY,
            &mut node_count,
        ))
    }
}
