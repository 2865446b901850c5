use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    style::{style, Attribute, Color, PrintStyledContent},
    QueueableCommand,
};

use std::io::{stdout, Write};

use spin_four_ai::{board::Board, PlayerId, COLS, ROWS};

/// Draws the board at the cursor, highlighting any completed lines
pub fn display(board: &Board) -> Result<()> {
    let mut stdout = stdout();

    let cols: String = (1..=COLS).map(|x| x.to_string()).collect();
    stdout.queue(PrintStyledContent(style(cols + "\n")))?;
    for _ in 0..ROWS {
        stdout.queue(PrintStyledContent(style("\n")))?;
    }
    stdout.flush()?;

    let (origin_x, origin_y) = crossterm::cursor::position()?;
    let full_lines = board.full_lines();

    for row in 0..ROWS {
        for col in 0..COLS {
            let (pos_x, pos_y) = (origin_x + col as u16, origin_y - 1 - row as u16);
            let highlighted = full_lines
                .iter()
                .any(|line| line.iter().any(|p| p.row == row && p.col == col));

            stdout
                .queue(MoveTo(pos_x, pos_y))?
                .queue(PrintStyledContent(
                    style("O")
                        .attribute(Attribute::Bold)
                        .on(if highlighted {
                            Color::DarkGreen
                        } else {
                            Color::DarkBlue
                        })
                        .with(match board.piece_at(row, col) {
                            PlayerId::One => Color::Red,
                            PlayerId::Two => Color::Yellow,
                            PlayerId::None => Color::DarkBlue,
                        }),
                ))?;
        }
    }
    stdout
        .queue(MoveTo(origin_x + COLS as u16, origin_y))?
        .queue(PrintStyledContent(style("\n")))?;
    stdout.flush()?;
    Ok(())
}
