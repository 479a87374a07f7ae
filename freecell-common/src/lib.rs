//! Cards, boards, deals and moves shared by the FreeCell solver and its front ends.
pub mod action;
pub mod board;
