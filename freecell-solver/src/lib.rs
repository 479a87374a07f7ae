//! This crate solves FreeCell deals with a best-first search over canonical layouts.
//!
//! Free cells and cascades are interchangeable slots, so every generated layout is
//! sorted into a canonical form before it is checked against the transposition cache.
mod card;
mod helper;
mod move_;
mod pile;
mod solver;
mod state;

use crate::card::*;
use crate::helper::*;
use crate::move_::*;
use crate::pile::*;
use crate::state::*;

pub use crate::solver::{SearchStatus, SolveError, SolveResult, Solver, solve};
use freecell_common::board::{
    Board, Card, MAX_CARD, MAX_CASCADE_LEN, MAX_RANK, TOTAL_CASCADES, TOTAL_FOUNDATIONS,
    TOTAL_FREE_CELLS,
};
