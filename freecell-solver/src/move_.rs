use super::*;

pub const PILE_CASCADE_START: usize = 0;
pub const PILE_CASCADE_END: usize = PILE_CASCADE_START + TOTAL_CASCADES - 1;
pub const PILE_FREE_CELL_START: usize = PILE_CASCADE_END + 1;
pub const PILE_FREE_CELL_END: usize = PILE_FREE_CELL_START + TOTAL_FREE_CELLS - 1;
pub const PILE_FOUNDATION: usize = PILE_FREE_CELL_END + 1;

/// A single-card move packed as `from | to << 4`, addressed to the slots of a
/// canonical layout. A cascade never moves onto itself, so zero is the null move.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Move {
    value: u8,
}

impl Move {
    pub fn new(from: usize, to: usize) -> Self {
        Move {
            value: (from as u8) | ((to as u8) << 4),
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.value == 0
    }

    #[inline]
    pub fn from(&self) -> usize {
        (self.value & 0x0f) as usize
    }

    #[inline]
    pub fn to(&self) -> usize {
        (self.value >> 4) as usize
    }

    #[inline]
    pub fn values(&self) -> (usize, usize) {
        (self.from(), self.to())
    }
}

/// One edge of the search tree. The root sits at index zero with a null move.
#[derive(Debug, Copy, Clone, Default)]
pub struct MoveNode {
    pub parent: u32,
    pub mov: Move,
}

impl MoveNode {
    /// Pushes the moves leading to this node onto `destination`, last move first.
    pub fn copy(&self, destination: &mut Vec<Move>, nodes: &[MoveNode]) -> usize {
        let start = destination.len();
        if self.mov.is_null() {
            return 0;
        }

        destination.push(self.mov);
        let mut current_parent = self.parent;
        while current_parent > 0 {
            let parent = nodes[current_parent as usize];
            if parent.mov.is_null() {
                break;
            }

            destination.push(parent.mov);
            current_parent = parent.parent;
        }
        destination.len() - start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_packing() {
        let mov = Move::new(PILE_FREE_CELL_END, PILE_FOUNDATION);
        assert_eq!(mov.values(), (11, 12));
        assert!(!mov.is_null());
        assert!(Move::default().is_null());
        assert!(!Move::new(0, PILE_FREE_CELL_START).is_null());
    }

    #[test]
    fn test_copy_path() {
        let nodes = [
            MoveNode::default(),
            MoveNode {
                parent: 0,
                mov: Move::new(0, PILE_FREE_CELL_START),
            },
            MoveNode {
                parent: 1,
                mov: Move::new(1, PILE_FOUNDATION),
            },
            MoveNode {
                parent: 2,
                mov: Move::new(2, 3),
            },
        ];

        let mut moves = vec![];
        assert_eq!(nodes[3].copy(&mut moves, &nodes), 3);
        assert_eq!(
            moves,
            [
                Move::new(2, 3),
                Move::new(1, PILE_FOUNDATION),
                Move::new(0, PILE_FREE_CELL_START)
            ]
        );

        moves.clear();
        assert_eq!(nodes[0].copy(&mut moves, &nodes), 0);
        assert!(moves.is_empty());
    }
}
