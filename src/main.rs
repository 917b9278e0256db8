//! Gomoku CLI
//!
//! Play against the AI in the terminal:
//!
//! ```text
//! gomoku [size] [time_ms]
//! ```
//!
//! Enter moves as `<col> <row>`, e.g. `J 10` or `9 10`. `u` takes back the
//! last turn, `n` starts a new game, `q` or an empty line quits.

use std::env;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::time::Duration;

use gomoku::board::{column_label, Marker};
use gomoku::config::{GameConfig, SearchConfig};
use gomoku::error::{GameError, Result};
use gomoku::game::{parse_coordinate, Game, GameStatus};

const USAGE: &str = "usage: gomoku [size] [time_ms]";

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    let game = parse_args(&args).and_then(Game::new);
    let mut game = match game {
        Ok(game) => game,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match run(&mut game) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: &[String]) -> Result<GameConfig> {
    let mut config = GameConfig::default();

    if let Some(size) = args.first() {
        config.board_size = size.parse().map_err(|_| GameError::Parse {
            input: size.clone(),
            reason: "board size must be a number".to_string(),
        })?;
    }
    if let Some(ms) = args.get(1) {
        let ms: u64 = ms.parse().map_err(|_| GameError::Parse {
            input: ms.clone(),
            reason: "time limit must be a number of milliseconds".to_string(),
        })?;
        config.search = SearchConfig::default().with_time_limit(Duration::from_millis(ms));
    }
    if args.len() > 2 {
        return Err(GameError::Parse {
            input: args.join(" "),
            reason: "too many arguments".to_string(),
        });
    }

    Ok(config)
}

fn run(game: &mut Game) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("You are X, the AI is O. Five in a row wins.");
    println!("{}", game.board());

    loop {
        if game.is_over() {
            report(game);
            return Ok(());
        }

        if game.turn() == Marker::Ai {
            println!("AI is thinking...");
            game.start_ai_search()?;
            let pos = game.wait_ai()?;
            if let Some(result) = game.last_search() {
                println!(
                    "AI plays {}{} (depth {}, {} nodes{})",
                    column_label(pos.col as usize),
                    pos.row,
                    result.depth,
                    result.stats.nodes,
                    if result.timed_out { ", out of time" } else { "" }
                );
            }
            println!("{}", game.board());
            continue;
        }

        print!("Your move: ");
        // A failed flush only loses the prompt
        let _ = io::stdout().flush();

        let Some(Ok(line)) = lines.next() else {
            return Ok(());
        };
        let line = line.trim();

        match line {
            "" | "q" | "quit" => return Ok(()),
            "u" | "undo" => {
                let undone = game.undo_turn()?;
                println!("Took back {undone} move(s)");
                println!("{}", game.board());
            }
            "n" | "new" => {
                game.new_game()?;
                println!("{}", game.board());
            }
            _ => {
                let played = parse_coordinate(line, game.board().size())
                    .and_then(|pos| game.play(i32::from(pos.col), i32::from(pos.row)));
                match played {
                    Ok(_) => println!("{}", game.board()),
                    Err(e) => println!("{e}"),
                }
            }
        }
    }
}

fn report(game: &Game) {
    match game.status() {
        GameStatus::Won(Marker::Player) => println!("You win!"),
        GameStatus::Won(_) => println!("AI wins!"),
        GameStatus::Draw => println!("Draw, the board is full."),
        GameStatus::InProgress => {}
    }
    if let Some(line) = game.board().winning_line() {
        let cells: Vec<String> = line
            .iter()
            .map(|p| format!("{}{}", column_label(p.col as usize), p.row))
            .collect();
        println!("Winning line: {}", cells.join(" "));
    }
}
