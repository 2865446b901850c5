use anyhow::{anyhow, Result};
use byteorder::{ReadBytesExt, WriteBytesExt};
use indicatif::{HumanDuration, ProgressBar};

use std::fs::{File, OpenOptions};
use std::io::{stdin, stdout, BufReader, BufWriter, Stdin, Write};
use std::path::Path;
use std::time::Instant;

use spin_four_ai::{board::Board, move_finder::*, snapshot::Snapshot, PlayerId, COLS};

mod display;
use display::*;

pub const SAVE_PATH: &str = "spin_four_save.bin";

/// AI strength, the value being the search depth
#[derive(Copy, Clone, Debug)]
enum Difficulty {
    Easy = 0,
    Normal = 1,
    Hard = 3,
    Challenge = 5,
}

impl Difficulty {
    fn parameters(self) -> MoveParameters {
        MoveParameters {
            max_depth: self as usize,
            consider_spins: true,
            randomize: true,
        }
    }
}

enum Command {
    Play(Move),
    Save,
    Quit,
}

fn parse_command(input: &str) -> Result<Command> {
    let input = input.trim().to_lowercase();
    match input.as_str() {
        "r" => Ok(Command::Play(Move::Spin(Spin::Right))),
        "b" => Ok(Command::Play(Move::Spin(Spin::Bottom))),
        "l" => Ok(Command::Play(Move::Spin(Spin::Left))),
        "s" => Ok(Command::Save),
        "q" => Ok(Command::Quit),
        _ => match input.parse::<usize>() {
            Ok(column @ 1..=COLS) => Ok(Command::Play(Move::Drop(column - 1))),
            Ok(column) => Err(anyhow!(
                "Invalid move, column {} out of range. Columns must be between 1 and {}",
                column,
                COLS
            )),
            Err(_) => Err(anyhow!("Unknown command: {}", input)),
        },
    }
}

// a saved game is the player to move followed by the board snapshot
fn save_game<P: AsRef<Path>>(path: P, board: &Board, player: PlayerId) -> Result<()> {
    let mut file = BufWriter::new(
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?,
    );
    file.write_u8(player.to_byte())?;
    board.snapshot().write_to(&mut file)?;
    file.flush()?;
    Ok(())
}

fn load_game<P: AsRef<Path>>(path: P) -> Result<(Board, PlayerId)> {
    let mut file = BufReader::new(File::open(path)?);
    let byte = file.read_u8()?;
    let player = match PlayerId::from_byte(byte) {
        Some(PlayerId::None) | None => return Err(anyhow!("invalid player to move {}", byte)),
        Some(player) => player,
    };
    let board = Board::restore(&Snapshot::read_from(&mut file)?)?;
    Ok((board, player))
}

fn ask_yes_no(stdin: &Stdin, question: &str) -> Result<bool> {
    loop {
        let mut buffer = String::new();
        print!("{} y/n: ", question);
        stdout().flush()?;
        stdin.read_line(&mut buffer)?;
        match buffer.to_lowercase().chars().next() {
            Some('y') => return Ok(true),
            Some('n') => return Ok(false),
            _ => println!("Unknown answer given"),
        }
    }
}

fn ask_difficulty(stdin: &Stdin) -> Result<Difficulty> {
    loop {
        let mut buffer = String::new();
        print!("AI difficulty? (e)asy, (n)ormal, (h)ard, (c)hallenge: ");
        stdout().flush()?;
        stdin.read_line(&mut buffer)?;
        match buffer.to_lowercase().chars().next() {
            Some('e') => return Ok(Difficulty::Easy),
            Some('n') => return Ok(Difficulty::Normal),
            Some('h') => return Ok(Difficulty::Hard),
            Some('c') => return Ok(Difficulty::Challenge),
            _ => println!("Unknown answer given"),
        }
    }
}

fn main() -> Result<()> {
    let stdin = stdin();
    let mut rng = rand::thread_rng();

    println!("Welcome to Spin Four\n");

    let mut board = Board::new();
    let mut player = PlayerId::One;

    if Path::new(SAVE_PATH).exists() && ask_yes_no(&stdin, "Resume the saved game?")? {
        match load_game(SAVE_PATH) {
            Ok((saved_board, saved_player)) => {
                board = saved_board;
                player = saved_player;
            }
            Err(err) => println!("Error reading saved game: {}", err),
        }
    }

    let ai_players = (
        ask_yes_no(&stdin, "Is player 1 AI controlled?")?,
        ask_yes_no(&stdin, "Is player 2 AI controlled?")?,
    );
    let (finder, show_analysis) = if ai_players.0 || ai_players.1 {
        (
            MoveFinder::with_parameters(ask_difficulty(&stdin)?.parameters()),
            ask_yes_no(&stdin, "Show AI analysis?")?,
        )
    } else {
        (MoveFinder::new(), false)
    };

    // game loop
    loop {
        display(&board).expect("Failed to draw board!");

        if board.is_game_over() {
            match board.winner() {
                PlayerId::One => println!("Player 1 wins!"),
                PlayerId::Two => println!("Player 2 wins!"),
                PlayerId::None => println!("Draw!"),
            }
            break;
        }

        let is_ai = match player {
            PlayerId::One => ai_players.0,
            _ => ai_players.1,
        };
        let player_number = if player == PlayerId::One { 1 } else { 2 };

        let next_move = if is_ai {
            // slow down play if both players are AI
            if ai_players == (true, true) {
                std::thread::sleep(std::time::Duration::new(2, 0));
            }

            let start_time = Instant::now();
            let next_move = if show_analysis {
                finder.find_move_verbose(player, &board, &mut rng)?
            } else {
                let spinner = ProgressBar::new_spinner();
                spinner.set_message(&format!("Player {} is thinking...", player_number));
                spinner.enable_steady_tick(100);
                let next_move = finder.find_move(player, &board, &mut rng)?;
                spinner.finish_and_clear();
                next_move
            };

            println!(
                "Player {} plays: {} ({})",
                player_number,
                next_move,
                HumanDuration(start_time.elapsed())
            );
            next_move
        } else {
            print!("Player {} move (1-{} drop, r/b/l spin, s save, q quit) > ", player_number, COLS);
            stdout().flush().expect("Failed to flush to stdout!");
            let mut input_str = String::new();
            stdin.read_line(&mut input_str)?;

            match parse_command(&input_str) {
                Err(err) => {
                    println!("{}", err);
                    continue;
                }
                Ok(Command::Save) => {
                    match save_game(SAVE_PATH, &board, player) {
                        Ok(()) => println!("Game saved to {}", SAVE_PATH),
                        Err(err) => println!("Error saving game: {}", err),
                    }
                    continue;
                }
                Ok(Command::Quit) => return Ok(()),
                Ok(Command::Play(next_move)) => next_move,
            }
        };

        if !board.apply(player, next_move) {
            println!("Invalid move, {} is not possible", next_move);
            // try the move again
            continue;
        }
        player = player.opponent();
    }
    Ok(())
}
