//! Serialisable board snapshots
//!
//! A [`Snapshot`] is a plain copy of everything a [`Board`] holds. Encoding and
//! decoding only move bytes around; [`Board::restore`] is where a snapshot is
//! checked against the rules before it becomes a board again.

use anyhow::{anyhow, Result};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use std::io::{Read, Write};

use crate::board::{Board, WINNING_POTENTIAL};
use crate::lines::LINE_COUNT;
use crate::{PlayerId, CELLS, COLS, PLAYERS, ROWS};

pub const SNAPSHOT_MAGIC: &[u8; 4] = b"SPN4";
pub const SNAPSHOT_VERSION: u8 = 1;

/// The encoded size of a snapshot in bytes
pub const SNAPSHOT_SIZE: usize = 4 + 1 + CELLS + 3 + PLAYERS * LINE_COUNT * 4 + PLAYERS * 4;

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Snapshot {
    /// Cell contents, bottom row first (0 empty, 1 player one, 2 player two)
    pub cells: [[u8; COLS]; ROWS],
    pub pieces: u8,
    pub game_over: bool,
    pub winner: u8,
    pub line_stats: [[u32; LINE_COUNT]; PLAYERS],
    pub scores: [i32; PLAYERS],
}

impl Snapshot {
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(SNAPSHOT_MAGIC)?;
        writer.write_u8(SNAPSHOT_VERSION)?;
        for row in self.cells.iter() {
            writer.write_all(row)?;
        }
        writer.write_u8(self.pieces)?;
        writer.write_u8(self.game_over as u8)?;
        writer.write_u8(self.winner)?;
        for stats in self.line_stats.iter() {
            for &stat in stats.iter() {
                writer.write_u32::<BigEndian>(stat)?;
            }
        }
        for &score in self.scores.iter() {
            writer.write_i32::<BigEndian>(score)?;
        }
        Ok(())
    }

    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut magic = [0; 4];
        reader.read_exact(&mut magic)?;
        if &magic != SNAPSHOT_MAGIC {
            return Err(anyhow!("not a board snapshot (magic {:?})", magic));
        }
        let version = reader.read_u8()?;
        if version != SNAPSHOT_VERSION {
            return Err(anyhow!("unsupported snapshot version {}", version));
        }

        let mut cells = [[0u8; COLS]; ROWS];
        for row in cells.iter_mut() {
            reader.read_exact(row)?;
        }
        let pieces = reader.read_u8()?;
        let game_over = match reader.read_u8()? {
            0 => false,
            1 => true,
            other => return Err(anyhow!("invalid game over flag {}", other)),
        };
        let winner = reader.read_u8()?;

        let mut line_stats = [[0u32; LINE_COUNT]; PLAYERS];
        for stats in line_stats.iter_mut() {
            reader.read_u32_into::<BigEndian>(stats)?;
        }
        let mut scores = [0i32; PLAYERS];
        reader.read_i32_into::<BigEndian>(&mut scores)?;

        Ok(Self {
            cells,
            pieces,
            game_over,
            winner,
            line_stats,
            scores,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(SNAPSHOT_SIZE);
        // writing to a Vec cannot fail
        let _ = self.write_to(&mut bytes);
        bytes
    }

    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self> {
        let snapshot = Self::read_from(&mut bytes)?;
        if !bytes.is_empty() {
            return Err(anyhow!("{} trailing bytes after snapshot", bytes.len()));
        }
        Ok(snapshot)
    }
}

impl Board {
    pub fn snapshot(&self) -> Snapshot {
        let mut cells = [[0; COLS]; ROWS];
        for (row, pieces) in self.cells().iter().enumerate() {
            for (col, piece) in pieces.iter().enumerate() {
                cells[row][col] = piece.to_byte();
            }
        }
        Snapshot {
            cells,
            pieces: self.pieces() as u8,
            game_over: self.is_game_over(),
            winner: self.winner().to_byte(),
            line_stats: *self.line_stats(),
            scores: *self.scores(),
        }
    }

    /// Rebuilds a board from a snapshot, failing if the snapshot does not
    /// describe a consistent board
    pub fn restore(snapshot: &Snapshot) -> Result<Self> {
        let mut cells = [[PlayerId::None; COLS]; ROWS];
        for row in 0..ROWS {
            for col in 0..COLS {
                let byte = snapshot.cells[row][col];
                cells[row][col] = PlayerId::from_byte(byte)
                    .ok_or_else(|| anyhow!("invalid cell {} at ({}, {})", byte, row, col))?;
            }
        }
        let winner = PlayerId::from_byte(snapshot.winner)
            .ok_or_else(|| anyhow!("invalid winner {}", snapshot.winner))?;

        // derive everything the grid determines and compare
        let mut expected = Board::new();
        for row in 0..ROWS {
            for col in 0..COLS {
                expected.set_piece(cells[row][col], row, col);
            }
        }
        expected.recompute();

        if snapshot.pieces as usize != expected.pieces() {
            return Err(anyhow!(
                "snapshot claims {} pieces but the grid holds {}",
                snapshot.pieces,
                expected.pieces()
            ));
        }
        if &snapshot.line_stats != expected.line_stats() {
            return Err(anyhow!("snapshot line potentials disagree with the grid"));
        }
        if &snapshot.scores != expected.scores() {
            return Err(anyhow!(
                "snapshot scores {:?} disagree with the grid {:?}",
                snapshot.scores,
                expected.scores()
            ));
        }
        if snapshot.game_over != expected.is_game_over() {
            return Err(anyhow!(
                "snapshot game over flag {} disagrees with the grid",
                snapshot.game_over
            ));
        }
        match winner.index() {
            Some(player) => {
                let held = snapshot.line_stats[player]
                    .iter()
                    .any(|&stat| stat == WINNING_POTENTIAL);
                if !snapshot.game_over || !held {
                    return Err(anyhow!("snapshot winner {:?} has no winning line", winner));
                }
            }
            None => {
                if !expected.winner().is_none() {
                    return Err(anyhow!(
                        "snapshot has no winner but {:?} holds a winning line",
                        expected.winner()
                    ));
                }
            }
        }

        Ok(Board::from_parts(
            cells,
            expected.pieces(),
            snapshot.game_over,
            winner,
            snapshot.line_stats,
            snapshot.scores,
        ))
    }
}
