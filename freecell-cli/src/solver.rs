mod utils;

use crate::utils::*;

use anyhow::{Context, Result, bail};
use clap::Parser;
use freecell_common::{action::format_actions, board::Board};
use rand::{SeedableRng, rngs::StdRng};

use std::{
    io::{IsTerminal, Read, stdin},
    path::PathBuf,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Microsoft FreeCell deal number (e.g. 11982)
    #[arg(short, long, value_name = "SEED")]
    number: Option<u32>,
    /// Shuffle a random deal, reproducible when a seed is given
    #[arg(short, long, value_name = "SEED", num_args = 0..=1)]
    random: Option<Option<u64>>,
    /// Max states to explore before giving up
    #[arg(short = 's', long, default_value_t = 5_000_000, value_name = "NUM")]
    max_states: usize,
    /// Keep searching after the first solution for a shorter one
    #[arg(short, long)]
    minimal: bool,
    /// Preview initial game state without solving
    #[arg(short, long)]
    preview: bool,
    /// Print the board after every move of the solution
    #[arg(short, long)]
    full: bool,
    /// Solve deals 1..=COUNT and report timings
    #[arg(short, long, value_name = "COUNT", conflicts_with_all = ["file", "number", "random"])]
    batch: Option<u32>,
    /// Log search progress to stderr
    #[arg(short, long)]
    verbose: bool,
    /// Path to a game state file to solve
    file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let Cli {
        number,
        random,
        max_states,
        minimal,
        preview,
        full,
        batch,
        verbose,
        file,
    } = Cli::parse();

    init_logging(verbose);

    if let Some(count) = batch {
        return solve_batch(count, max_states, minimal);
    }

    let board = if let Some(file) = file {
        let content = std::fs::read_to_string(&file)
            .with_context(|| format!("Failed to read '{}'", file.display()))?;
        Board::parse(&content).context("Failed to parse board")?
    } else if let Some(seed) = number {
        Board::new_from_seed(seed)
    } else if let Some(seed) = random {
        match seed {
            Some(seed) => Board::new_random(&mut StdRng::seed_from_u64(seed)),
            None => Board::new_random(&mut rand::rng()),
        }
    } else if !stdin().is_terminal() {
        let mut content = String::new();
        stdin()
            .read_to_string(&mut content)
            .context("Failed to read from stdin")?;
        Board::parse(&content).context("Failed to parse board")?
    } else {
        bail!("No game state `file`, `--number` or `--random` provided.");
    };
    if preview {
        println!("{}", board.to_pretty_string());
        return Ok(());
    }
    let result = do_solve(board, max_states, minimal, verbose)?;
    if full {
        print_full_game(&result);
    } else {
        print!("{}", format_actions(&result.actions));
    }

    Ok(())
}
