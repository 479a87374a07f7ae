use super::*;

use std::cmp::Ordering;

/// The board configuration alone, without any path metadata. This is the key
/// of the transposition cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Layout {
    pub free_cells: [Card; TOTAL_FREE_CELLS],
    pub cascades: [Pile; TOTAL_CASCADES],
    pub foundations: [u8; TOTAL_FOUNDATIONS],
}

impl Layout {
    /// Sorts the free cells and orders the cascades by their first dealt card.
    ///
    /// Two non-empty cascades never share a bottom card and empty ones are
    /// identical, so layouts that only differ by slot permutation end up equal.
    pub fn canonicalize(&mut self) {
        self.free_cells.sort_unstable();
        self.cascades.sort_unstable_by_key(|pile| pile.bottom());
    }

    pub fn is_won(&self) -> bool {
        self.foundations.iter().all(|&rank| rank == MAX_RANK)
    }

    pub fn foundation_score(&self) -> u8 {
        self.foundations.iter().sum()
    }

    pub fn empty_free_cell(&self) -> Option<usize> {
        self.free_cells.iter().position(|card| card.is_empty())
    }

    /// Plays `mov` in place. The move must come from the move generator for this layout.
    pub fn apply(&mut self, mov: Move) {
        let (move_from, move_to) = mov.values();

        let card = if (PILE_FREE_CELL_START..=PILE_FREE_CELL_END).contains(&move_from) {
            std::mem::take(&mut self.free_cells[move_from - PILE_FREE_CELL_START])
        } else {
            self.cascades[move_from].pop_card()
        };

        if move_to == PILE_FOUNDATION {
            let foundation = &mut self.foundations[card.suit() as usize];
            debug_assert_eq!(*foundation + 1, card.rank());
            *foundation += 1;
        } else if (PILE_FREE_CELL_START..=PILE_FREE_CELL_END).contains(&move_to) {
            self.free_cells[move_to - PILE_FREE_CELL_START] = card;
        } else {
            self.cascades[move_to].push_card(card);
        }
    }
}

impl From<&Board> for Layout {
    fn from(board: &Board) -> Self {
        Layout {
            free_cells: board.free_cells,
            cascades: std::array::from_fn(|i| Pile::from(&board.cascades[i])),
            foundations: board.foundations,
        }
    }
}

/// A layout in the frontier together with its path metadata.
#[derive(Debug, Clone, Copy)]
pub struct GameState {
    pub layout: Layout,
    pub moves: u16,
    pub score: i32,
    /// This state's entry in the move tree; the entry's parent is the predecessor.
    pub node: u32,
}

impl GameState {
    pub fn new(layout: Layout, moves: u16, node: u32) -> Self {
        GameState {
            layout,
            moves,
            score: score(&layout, moves),
            node,
        }
    }
}

impl Ord for GameState {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.cmp(&other.score)
    }
}

impl PartialOrd for GameState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GameState {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score
    }
}

impl Eq for GameState {}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::{BinaryHeap, HashSet};

    const DEAL: &str = r#"
JD KD 2S 4C 3S 6D 6S
2D KC KS 5C TD 8S 9C
9H 9S 9D TS 4S 8D 2H
JC 5S QD QH TH QS 6H
5D AD JS 4H 8H 6C
7H QC AS AC 2C 3D
7C KH AH 4D JH 8C
5H 3H 3C 7S 7D TC
"#;

    fn layout(content: &str) -> Layout {
        let mut layout = Layout::from(&Board::parse(content).unwrap());
        layout.canonicalize();
        layout
    }

    #[test]
    fn test_canonicalize_idempotent() {
        let canonical = layout(DEAL);
        let mut again = canonical;
        again.canonicalize();
        assert_eq!(again, canonical);
        assert!(
            canonical
                .cascades
                .windows(2)
                .all(|w| w[0].bottom() <= w[1].bottom())
        );
    }

    #[test]
    fn test_canonicalize_permutations() {
        let mut board = Board::parse(DEAL).unwrap();
        board.move_cascade_to_free_cell(2, 0);
        board.move_cascade_to_free_cell(5, 3);
        let mut a = Layout::from(&board);

        board.cascades.swap(0, 7);
        board.cascades.swap(1, 4);
        board.free_cells.swap(0, 1);
        board.free_cells.swap(2, 3);
        let mut b = Layout::from(&board);
        assert_ne!(a, b);

        a.canonicalize();
        b.canonicalize();
        assert_eq!(a, b);
        assert_eq!(a.free_cells[..2], [Card::EMPTY, Card::EMPTY]);
    }

    #[test]
    fn test_move_orders_share_one_entry() {
        let root = layout(DEAL);
        let mut seen = HashSet::new();
        seen.insert(root);

        let mut a = root;
        a.apply(Move::new(0, PILE_FREE_CELL_START));
        a.canonicalize();
        a.apply(Move::new(1, PILE_FREE_CELL_START));
        a.canonicalize();

        let mut b = root;
        b.apply(Move::new(1, PILE_FREE_CELL_START));
        b.canonicalize();
        b.apply(Move::new(0, PILE_FREE_CELL_START));
        b.canonicalize();

        assert!(seen.insert(a));
        assert!(!seen.insert(b));
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_apply_foundation() {
        let mut state = layout("Foundation: QS KH KD KC\nKS");
        assert!(!state.is_won());
        let idx = state.cascades.iter().position(|p| !p.is_empty()).unwrap();
        state.apply(Move::new(idx, PILE_FOUNDATION));
        assert!(state.is_won());
        assert_eq!(state.foundation_score(), MAX_CARD);
        assert!(state.cascades.iter().all(|p| p.is_empty()));
    }

    #[test]
    fn test_frontier_order() {
        let state = layout(DEAL);
        let mut heap = BinaryHeap::new();
        for (moves, node) in [(5, 1), (0, 2), (9, 3)] {
            heap.push(GameState::new(state, moves, node));
        }
        let order: Vec<_> = std::iter::from_fn(|| heap.pop()).map(|s| s.node).collect();
        assert_eq!(order, [2, 1, 3]);
    }
}
