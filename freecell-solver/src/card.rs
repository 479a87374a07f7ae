use super::*;

/// Whether `from` may be placed on `to`: `to` is an empty slot, or one rank
/// higher than `from` and of the opposite color.
#[inline]
pub fn can_move(from: Card, to: Card) -> bool {
    if to.is_empty() {
        return true;
    }
    from.rank() + 1 == to.rank() && from.is_black() != to.is_black()
}

#[inline]
pub fn can_move_to_foundation(card: Card, foundations: &[u8; TOTAL_FOUNDATIONS]) -> bool {
    !card.is_empty() && foundations[card.suit() as usize] + 1 == card.rank()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(token: &str) -> Card {
        Card::parse(token).unwrap()
    }

    #[test]
    fn test_can_move() {
        assert!(can_move(card("9H"), card("TS")));
        assert!(can_move(card("9C"), card("TD")));
        assert!(can_move(card("KD"), Card::EMPTY));
        assert!(!can_move(card("9S"), card("TS")));
        assert!(!can_move(card("9H"), card("TD")));
        assert!(!can_move(card("8H"), card("TS")));
        assert!(!can_move(card("TH"), card("9S")));
    }

    #[test]
    fn test_can_move_to_foundation() {
        let foundations = [0, 3, 12, 13];
        assert!(can_move_to_foundation(card("AS"), &foundations));
        assert!(can_move_to_foundation(card("4H"), &foundations));
        assert!(can_move_to_foundation(card("KD"), &foundations));
        assert!(!can_move_to_foundation(card("2S"), &foundations));
        assert!(!can_move_to_foundation(card("5H"), &foundations));
        assert!(!can_move_to_foundation(Card::EMPTY, &foundations));
    }
}
