use crate::board::{Board, Card};

/// A single-card move addressed to physical cascade and free cell indices.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    CascadeToFoundation(usize),
    FreeCellToFoundation(usize),
    FreeCellToCascade(usize, usize), // (cell_index, cascade_index)
    CascadeToCascade(usize, usize),  // (from_index, to_index)
    CascadeToFreeCell(usize, usize), // (cascade_index, cell_index)
}

impl Action {
    pub fn is_foundation(&self) -> bool {
        matches!(
            self,
            Action::CascadeToFoundation(_) | Action::FreeCellToFoundation(_)
        )
    }
}

/// Formats actions in standard FreeCell notation: cascades `1`-`8`, free cells `a`-`d`, foundation `h`.
pub fn format_actions(actions: &[Action]) -> String {
    let cell = |idx: usize| (b'a' + idx as u8) as char;
    let list: Vec<String> = actions
        .iter()
        .map(|action| match *action {
            Action::CascadeToFoundation(idx) => format!("{}h", idx + 1),
            Action::FreeCellToFoundation(idx) => format!("{}h", cell(idx)),
            Action::FreeCellToCascade(cell_idx, idx) => format!("{}{}", cell(cell_idx), idx + 1),
            Action::CascadeToCascade(from_idx, to_idx) => format!("{}{}", from_idx + 1, to_idx + 1),
            Action::CascadeToFreeCell(idx, cell_idx) => format!("{}{}", idx + 1, cell(cell_idx)),
        })
        .collect();

    let mut output = String::new();
    for chunk in list.chunks(10) {
        output.push_str(&chunk.join(" "));
        output.push('\n');
    }

    output
}

pub fn apply_action(board: &mut Board, action: &Action) {
    match action {
        Action::CascadeToFoundation(cascade_index) => {
            board.move_cascade_to_foundation(*cascade_index);
        }
        Action::FreeCellToFoundation(cell_index) => {
            board.move_free_cell_to_foundation(*cell_index);
        }
        Action::FreeCellToCascade(cell_index, cascade_index) => {
            board.move_free_cell_to_cascade(*cell_index, *cascade_index);
        }
        Action::CascadeToCascade(from_index, to_index) => {
            board.move_cascade_to_cascade(*from_index, *to_index);
        }
        Action::CascadeToFreeCell(cascade_index, cell_index) => {
            board.move_cascade_to_free_cell(*cascade_index, *cell_index);
        }
    }
}

pub fn describe_action(board: &Board, action: &Action) -> String {
    let format_card = |card: Option<&Card>| -> String {
        card.map(|c| c.to_string())
            .unwrap_or_else(|| Card::EMPTY.to_string())
    };
    let cascade_top = |idx: usize| format_card(board.cascades[idx].peek_top());
    let free_cell = |idx: usize| format_card(Some(&board.free_cells[idx]));

    match *action {
        Action::CascadeToFoundation(cascade_index) => {
            format!(
                "(Cascade{}) {} -> (Foundation)",
                cascade_index + 1,
                cascade_top(cascade_index)
            )
        }
        Action::FreeCellToFoundation(cell_index) => {
            format!(
                "(FreeCell{}) {} -> (Foundation)",
                cell_index + 1,
                free_cell(cell_index)
            )
        }
        Action::FreeCellToCascade(cell_index, cascade_index) => {
            format!(
                "(FreeCell{}) {} -> (Cascade{}) {}",
                cell_index + 1,
                free_cell(cell_index),
                cascade_index + 1,
                cascade_top(cascade_index)
            )
        }
        Action::CascadeToCascade(from_index, to_index) => {
            format!(
                "(Cascade{}) {} -> (Cascade{}) {}",
                from_index + 1,
                cascade_top(from_index),
                to_index + 1,
                cascade_top(to_index)
            )
        }
        Action::CascadeToFreeCell(cascade_index, cell_index) => {
            format!(
                "(Cascade{}) {} -> (FreeCell{})",
                cascade_index + 1,
                cascade_top(cascade_index),
                cell_index + 1
            )
        }
    }
}
