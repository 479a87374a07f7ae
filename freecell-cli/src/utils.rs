use anyhow::Result;
use freecell_common::{action::describe_action, board::Board};
use freecell_solver::{SolveError, SolveResult, solve};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use std::{
    io::{IsTerminal, Write, stderr},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

pub fn init_logging(verbose: bool) {
    let env = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env)
        .with_writer(stderr)
        .try_init();
}

pub fn do_solve(board: Board, max_states: usize, minimal: bool, verbose: bool) -> Result<SolveResult> {
    let board_str = board.to_pretty_string();
    println!("{board_str}\n");
    let run = move || solve(board, max_states, minimal);
    // Progress events share stderr with the spinner.
    let result = if verbose {
        run()?
    } else {
        with_spinner("Solving the game...", run)?
    };
    let elapsed_str = format_elapsed(result.elapsed);
    println!(
        "✓ Solved in {} Moves, Minimal: {}, Time: {elapsed_str}, States: {}\n",
        result.actions.len(),
        result.minimal,
        result.states
    );
    Ok(result)
}

/// Solves Microsoft deals `1..=count` one after another.
pub fn solve_batch(count: u32, max_states: usize, minimal: bool) -> Result<()> {
    let mut total_elapsed = Duration::ZERO;
    let mut solved = 0;
    for seed in 1..=count {
        match solve(Board::new_from_seed(seed), max_states, minimal) {
            Ok(result) => {
                solved += 1;
                total_elapsed += result.elapsed;
                let average = total_elapsed / solved;
                println!(
                    "#{seed}: {} Moves, Time: {}, States: {}, Average: {}",
                    result.actions.len(),
                    format_elapsed(result.elapsed),
                    result.states,
                    format_elapsed(average)
                );
            }
            Err(err @ (SolveError::Exhausted { .. } | SolveError::StateLimit { .. })) => {
                println!("#{seed}: {err}");
            }
            Err(err) => {
                warn!(seed, "{err}");
                return Err(err.into());
            }
        }
    }
    println!("✓ Solved {solved} of {count} deals");
    Ok(())
}

pub fn print_full_game(result: &SolveResult) {
    for (step, (action, board)) in result.actions.iter().zip(&result.boards).enumerate() {
        println!("{}: {}", step + 1, describe_action(board, action));
        if let Some(next) = result.boards.get(step + 1) {
            println!("{}\n", next.to_pretty_string());
        }
    }
}

const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];
const SPINNER_TICK: Duration = Duration::from_millis(100);

/// Runs `f` while an animated status line with the elapsed time is drawn on stderr.
fn with_spinner<T, F: FnOnce() -> T>(message: &str, f: F) -> T {
    if !stderr().is_terminal() {
        return f();
    }

    let done = Arc::new(AtomicBool::new(false));
    let spinner = {
        let done = Arc::clone(&done);
        let message = message.to_string();
        std::thread::spawn(move || {
            let started = Instant::now();
            let mut out = stderr().lock();
            let _ = write!(out, "\x1b[?25l"); // hide cursor
            for frame in SPINNER_FRAMES.iter().cycle() {
                if done.load(Ordering::Relaxed) {
                    break;
                }
                let elapsed = format_elapsed(started.elapsed());
                let _ = write!(out, "\r{frame} {message} ({elapsed})");
                let _ = out.flush();
                std::thread::sleep(SPINNER_TICK);
            }
            let _ = write!(out, "\r\x1b[2K\r\x1b[?25h"); // clear line and show cursor
            let _ = out.flush();
        })
    };

    let result = f();
    done.store(true, Ordering::Relaxed);
    let _ = spinner.join();
    result
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 90 {
        let ms = elapsed.subsec_millis();
        format!("{secs}.{ms:03}s")
    } else {
        let minutes = secs / 60;
        let secs = secs % 60;
        format!("{minutes}m {secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(1_234)), "1.234s");
        assert_eq!(format_elapsed(Duration::from_millis(89_005)), "89.005s");
        assert_eq!(format_elapsed(Duration::from_secs(125)), "2m 5s");
    }
}
