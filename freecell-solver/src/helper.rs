use super::*;

// Cumulative reward for a foundation holding ranks up to the index. Each step is worth less than the one before.
const FOUNDATION_REWARD: [i32; MAX_RANK as usize + 1] = [
    0, 1000, 1950, 2850, 3700, 4500, 5250, 5950, 6600, 7200, 7750, 8250, 8700, 9100,
];
// (spread, penalty) pairs, largest spread first.
const SPREAD_PENALTY: [(u8, i32); 3] = [(9, 1200), (6, 600), (3, 200)];
const EMPTY_FREE_CELL_BONUS: i32 = 150;
const EMPTY_CASCADE_BONUS: i32 = 300;
const RUN_BONUS: i32 = 25;
const FULL_RUN_MULTIPLIER: i32 = 3;
const HIGH_BASE_MULTIPLIER: i32 = 3;
const HIGH_BASE_RANK: u8 = 11;
const MOVE_COST: i32 = 3;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Estimate {
    pub current: u16,
    pub remaining: u16,
}

impl Estimate {
    pub fn total(&self) -> u16 {
        self.current.saturating_add(self.remaining)
    }
}

/// Frontier priority of a layout reached in `moves` moves; higher is explored first.
pub fn score(layout: &Layout, moves: u16) -> i32 {
    let mut score: i32 = layout
        .foundations
        .iter()
        .map(|&rank| FOUNDATION_REWARD[rank as usize])
        .sum();

    let highest = layout.foundations.iter().max().copied().unwrap_or_default();
    let lowest = layout.foundations.iter().min().copied().unwrap_or_default();
    if let Some(&(_, penalty)) = SPREAD_PENALTY
        .iter()
        .find(|&&(spread, _)| highest - lowest > spread)
    {
        score -= penalty;
    }

    let empty_free_cells = layout.free_cells.iter().filter(|c| c.is_empty()).count();
    score += EMPTY_FREE_CELL_BONUS * empty_free_cells as i32;

    for pile in &layout.cascades {
        if pile.is_empty() {
            score += EMPTY_CASCADE_BONUS;
            continue;
        }
        let run = pile.ordered_run_len();
        let mut bonus = run as i32 * RUN_BONUS;
        if run == pile.size() {
            bonus *= FULL_RUN_MULTIPLIER;
            if pile.bottom().rank() >= HIGH_BASE_RANK {
                bonus *= HIGH_BASE_MULTIPLIER;
            }
        }
        score += bonus;
    }

    score - MOVE_COST * moves as i32
}

/// Every card still off the foundations costs at least one move.
pub fn minimum_moves_remaining(layout: &Layout) -> u16 {
    (MAX_CARD - layout.foundation_score()) as u16
}
