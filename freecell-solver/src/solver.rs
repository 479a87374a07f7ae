use super::*;

use freecell_common::action::{Action, apply_action};

use smallvec::SmallVec;
use std::{
    collections::{BinaryHeap, HashMap},
    time::{Duration, Instant},
};
use thiserror::Error;
use tracing::{debug, info};

const PROGRESS_INTERVAL: usize = 100_000;

type PossibleMoves = SmallVec<[Move; 64]>;
// Canonical layout -> fewest moves it has been reached in.
type StateMap = HashMap<Layout, u16, ahash::RandomState>;

pub fn solve(board: Board, max_states: usize, minimal: bool) -> Result<SolveResult, SolveError> {
    let mut solver = Solver::new();
    solver.set_board(board);
    solver.solve(max_states, minimal)
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum SearchStatus {
    /// No search has run on the current board, or the board failed validation.
    #[default]
    Pending,
    Won,
    Exhausted,
    /// Stopped at the state ceiling before a solution was found.
    Aborted,
}

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("Invalid initial board: {0:#}")]
    InvalidBoard(anyhow::Error),
    #[error("No solution found after {states} states.")]
    Exhausted { states: usize },
    #[error("Unable to solve the game; reached max states {max_states}.")]
    StateLimit { max_states: usize },
    #[error("Unable to replay solution move {step} on the board.")]
    Replay { step: usize },
}

/// A struct representing the solver for the FreeCell game.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    initial_board: Board,
    initial_layout: Layout,
    status: SearchStatus,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_board(&mut self, board: Board) {
        let mut layout = Layout::from(&board);
        layout.canonicalize();
        self.initial_layout = layout;
        self.initial_board = board;
        self.status = SearchStatus::Pending;
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    /// Runs the best-first search. Without `minimal` the first won layout popped
    /// from the frontier is returned; with it the search drains the frontier,
    /// pruning every branch that cannot beat the best solution found so far.
    pub fn solve(&mut self, max_states: usize, minimal: bool) -> Result<SolveResult, SolveError> {
        self.initial_board
            .validate()
            .map_err(SolveError::InvalidBoard)?;

        let timer = Instant::now();
        let mut search = Search::new(self.initial_layout, minimal, node_limit(max_states));
        let mut possible_moves = PossibleMoves::new();

        let mut best_solution_move_count = u16::MAX;
        let mut solution_node_index = None;
        let mut expanded = 0;
        let mut limit_reached = false;

        'search: while let Some(state) = search.open.pop() {
            let estimate = Estimate {
                current: state.moves,
                remaining: minimum_moves_remaining(&state.layout),
            };
            if estimate.total() >= best_solution_move_count {
                continue;
            }
            if minimal
                && search
                    .closed
                    .get(&state.layout)
                    .is_some_and(|&m| m < state.moves)
            {
                // Superseded by a shorter path to the same layout.
                continue;
            }

            if state.layout.is_won() {
                best_solution_move_count = state.moves;
                solution_node_index = Some(state.node);
                info!(
                    moves = state.moves,
                    states = search.closed.len(),
                    "found a solution"
                );
                if !minimal {
                    break;
                }
                debug!(bound = best_solution_move_count, "tightened solution bound");
                continue;
            }

            expanded += 1;
            if expanded % PROGRESS_INTERVAL == 0 {
                debug!(
                    expanded,
                    open = search.open.len(),
                    states = search.closed.len(),
                    moves = state.moves,
                    score = state.score,
                    "searching"
                );
            }

            possible_moves.clear();
            compute_possible_moves(&state.layout, &mut possible_moves);

            for &mov in possible_moves.iter() {
                if let Successor::LimitReached =
                    search.push_successor(&state, mov, best_solution_move_count)
                {
                    limit_reached = true;
                    break 'search;
                }
            }
        }

        let states = search.closed.len();
        let Some(node_index) = solution_node_index else {
            if limit_reached {
                self.status = SearchStatus::Aborted;
                info!(max_states, "search stopped at the state limit");
                return Err(SolveError::StateLimit { max_states });
            }
            self.status = SearchStatus::Exhausted;
            info!(states, "search exhausted without a solution");
            return Err(SolveError::Exhausted { states });
        };
        self.status = SearchStatus::Won;

        let mut moves = vec![];
        search.node_storage[node_index as usize].copy(&mut moves, &search.node_storage);
        moves.reverse();
        let (actions, boards) = self.export_actions(&moves)?;
        info!(moves = actions.len(), states, "search finished");

        Ok(SolveResult {
            minimal: minimal && !limit_reached,
            states,
            elapsed: timer.elapsed(),
            actions,
            boards,
        })
    }

    /// Replays canonical moves on the caller's board, translating each one to the
    /// physical cascade and free cell it touches.
    fn export_actions(&self, moves: &[Move]) -> Result<(Vec<Action>, Vec<Board>), SolveError> {
        let mut layout = self.initial_layout;
        let mut board = self.initial_board.clone();
        let mut actions = Vec::with_capacity(moves.len());
        let mut boards = Vec::with_capacity(moves.len() + 1);
        boards.push(board.clone());

        for (step, &mov) in moves.iter().enumerate() {
            let action = physical_action(&layout, &board, mov).ok_or(SolveError::Replay { step })?;
            apply_action(&mut board, &action);
            layout.apply(mov);
            layout.canonicalize();
            actions.push(action);
            boards.push(board.clone());
        }

        Ok((actions, boards))
    }
}

#[derive(Debug, Clone)]
pub struct SolveResult {
    pub minimal: bool,
    /// Distinct layouts generated.
    pub states: usize,
    pub elapsed: Duration,
    pub actions: Vec<Action>,
    /// The board before the first action and after each one.
    pub boards: Vec<Board>,
}

/// Node indices are stored as `u32`.
fn node_limit(max_states: usize) -> usize {
    max_states.min(u32::MAX as usize)
}

enum Successor {
    Queued,
    Skipped,
    LimitReached,
}

/// Frontier, transposition cache and move tree of one search run.
struct Search {
    open: BinaryHeap<GameState>,
    closed: StateMap,
    node_storage: Vec<MoveNode>,
    minimal: bool,
    node_limit: usize,
}

impl Search {
    fn new(root: Layout, minimal: bool, node_limit: usize) -> Self {
        let mut closed = StateMap::default();
        closed.insert(root, 0);
        let mut open = BinaryHeap::new();
        open.push(GameState::new(root, 0, 0));
        Search {
            open,
            closed,
            node_storage: vec![MoveNode::default()],
            minimal,
            node_limit,
        }
    }

    /// Plays `mov` on `state` and queues the result unless it is pruned by
    /// `bound` or already cached. The node limit is checked only when a new
    /// node would be created.
    fn push_successor(&mut self, state: &GameState, mov: Move, bound: u16) -> Successor {
        let mut layout = state.layout;
        layout.apply(mov);
        layout.canonicalize();

        let estimate = Estimate {
            current: state.moves.saturating_add(1),
            remaining: minimum_moves_remaining(&layout),
        };
        if estimate.total() >= bound {
            return Successor::Skipped;
        }
        if let Some(&moves) = self.closed.get(&layout) {
            if !self.minimal || moves <= estimate.current {
                return Successor::Skipped;
            }
        }
        if self.node_storage.len() >= self.node_limit {
            return Successor::LimitReached;
        }

        self.closed.insert(layout, estimate.current);
        let node = self.node_storage.len() as u32;
        self.node_storage.push(MoveNode {
            parent: state.node,
            mov,
        });
        self.open.push(GameState::new(layout, estimate.current, node));
        Successor::Queued
    }
}

/// Fills `possible_moves` with every legal move, unless a card can go to its
/// foundation: then that single move is the only one returned.
fn compute_possible_moves(layout: &Layout, possible_moves: &mut PossibleMoves) {
    if compute_move_to_foundation(layout, possible_moves) {
        return;
    }
    compute_move_from_free_cell(layout, possible_moves);
    compute_move_between_cascades(layout, possible_moves);
    compute_move_to_free_cell(layout, possible_moves);
}

fn compute_move_to_foundation(layout: &Layout, possible_moves: &mut PossibleMoves) -> bool {
    for (idx, pile) in layout.cascades.iter().enumerate() {
        if can_move_to_foundation(pile.peek_top(), &layout.foundations) {
            possible_moves.push(Move::new(PILE_CASCADE_START + idx, PILE_FOUNDATION));
            return true;
        }
    }
    for (idx, &card) in layout.free_cells.iter().enumerate() {
        if can_move_to_foundation(card, &layout.foundations) {
            possible_moves.push(Move::new(PILE_FREE_CELL_START + idx, PILE_FOUNDATION));
            return true;
        }
    }
    false
}

fn compute_move_from_free_cell(layout: &Layout, possible_moves: &mut PossibleMoves) {
    for (cell_idx, &card) in layout.free_cells.iter().enumerate() {
        if card.is_empty() {
            continue;
        }
        for (dest_idx, dest_pile) in layout.cascades.iter().enumerate() {
            if !dest_pile.is_full() && can_move(card, dest_pile.peek_top()) {
                possible_moves.push(Move::new(
                    PILE_FREE_CELL_START + cell_idx,
                    PILE_CASCADE_START + dest_idx,
                ));
            }
        }
    }
}

fn compute_move_between_cascades(layout: &Layout, possible_moves: &mut PossibleMoves) {
    for (src_idx, src_pile) in layout.cascades.iter().enumerate() {
        if src_pile.is_empty() {
            continue;
        }
        let src_top_card = src_pile.peek_top();
        for (dest_idx, dest_pile) in layout.cascades.iter().enumerate() {
            if src_idx == dest_idx || dest_pile.is_full() {
                continue;
            }
            if can_move(src_top_card, dest_pile.peek_top()) {
                possible_moves.push(Move::new(
                    PILE_CASCADE_START + src_idx,
                    PILE_CASCADE_START + dest_idx,
                ));
            }
        }
    }
}

fn compute_move_to_free_cell(layout: &Layout, possible_moves: &mut PossibleMoves) {
    // Free cells are interchangeable, so only the first empty one is tried.
    let Some(cell_idx) = layout.empty_free_cell() else {
        return;
    };
    for (src_idx, src_pile) in layout.cascades.iter().enumerate() {
        if !src_pile.is_empty() {
            possible_moves.push(Move::new(
                PILE_CASCADE_START + src_idx,
                PILE_FREE_CELL_START + cell_idx,
            ));
        }
    }
}

fn physical_action(layout: &Layout, board: &Board, mov: Move) -> Option<Action> {
    let (move_from, move_to) = mov.values();

    if (PILE_FREE_CELL_START..=PILE_FREE_CELL_END).contains(&move_from) {
        let card = layout.free_cells[move_from - PILE_FREE_CELL_START];
        let cell_idx = board.find_free_cell(card)?;
        if move_to == PILE_FOUNDATION {
            return Some(Action::FreeCellToFoundation(cell_idx));
        }
        let cascade_idx = physical_cascade(layout, board, move_to)?;
        return Some(Action::FreeCellToCascade(cell_idx, cascade_idx));
    }

    let card = layout.cascades[move_from].peek_top();
    let from_idx = board.find_cascade_top(card)?;
    if move_to == PILE_FOUNDATION {
        Some(Action::CascadeToFoundation(from_idx))
    } else if (PILE_FREE_CELL_START..=PILE_FREE_CELL_END).contains(&move_to) {
        Some(Action::CascadeToFreeCell(
            from_idx,
            board.first_empty_free_cell()?,
        ))
    } else {
        let to_idx = physical_cascade(layout, board, move_to)?;
        Some(Action::CascadeToCascade(from_idx, to_idx))
    }
}

fn physical_cascade(layout: &Layout, board: &Board, cascade_idx: usize) -> Option<usize> {
    let bottom = layout.cascades[cascade_idx].bottom();
    if bottom.is_empty() {
        board.first_empty_cascade()
    } else {
        board.find_cascade_bottom(bottom)
    }
}
