use super::*;

use freecell_common::board::Cascade;

/// A cascade packed into a fixed array. Slots at or past `size` always hold
/// `Card::EMPTY`, so the derived equality and hash only see the live cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pile {
    cards: [Card; MAX_CASCADE_LEN],
    size: u8,
}

impl Pile {
    #[inline]
    pub fn size(&self) -> usize {
        self.size as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.size() == MAX_CASCADE_LEN
    }

    #[inline]
    pub fn push_card(&mut self, card: Card) {
        let index = self.size();
        self.cards[index] = card;
        self.size += 1;
    }

    #[inline]
    pub fn pop_card(&mut self) -> Card {
        self.size -= 1;
        let index = self.size();
        std::mem::take(&mut self.cards[index])
    }

    #[inline]
    pub fn peek_top(&self) -> Card {
        if self.size > 0 {
            self.cards[self.size() - 1]
        } else {
            Card::EMPTY
        }
    }

    /// The first dealt card, or `Card::EMPTY` for an empty cascade.
    #[inline]
    pub fn bottom(&self) -> Card {
        self.cards[0]
    }

    /// Length of the descending, alternating-color run at the top of the pile.
    pub fn ordered_run_len(&self) -> usize {
        let size = self.size();
        if size == 0 {
            return 0;
        }
        let mut run = 1;
        while run < size && can_move(self.cards[size - run], self.cards[size - run - 1]) {
            run += 1;
        }
        run
    }
}

impl Default for Pile {
    fn default() -> Self {
        Pile {
            cards: [Card::EMPTY; MAX_CASCADE_LEN],
            size: 0,
        }
    }
}

impl From<&Cascade> for Pile {
    fn from(cascade: &Cascade) -> Self {
        let mut pile = Pile::default();
        for &card in cascade.cards.iter().take(MAX_CASCADE_LEN) {
            pile.push_card(card);
        }
        pile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pile(tokens: &str) -> Pile {
        let mut pile = Pile::default();
        for token in tokens.split_whitespace() {
            pile.push_card(Card::parse(token).unwrap());
        }
        pile
    }

    #[test]
    fn test_push_pop() {
        let mut a = pile("KS QH JC");
        assert_eq!(a.size(), 3);
        assert_eq!(a.peek_top().to_string(), "JC");
        assert_eq!(a.bottom().to_string(), "KS");
        assert_eq!(a.pop_card().to_string(), "JC");
        assert_eq!(a.size(), 2);
        assert_eq!(a, pile("KS QH"));

        a.pop_card();
        a.pop_card();
        assert!(a.is_empty());
        assert_eq!(a.peek_top(), Card::EMPTY);
        assert_eq!(a.bottom(), Card::EMPTY);
        assert_eq!(a, Pile::default());
    }

    #[test]
    fn test_ordered_run_len() {
        assert_eq!(Pile::default().ordered_run_len(), 0);
        assert_eq!(pile("4C").ordered_run_len(), 1);
        assert_eq!(pile("KS QH JC").ordered_run_len(), 3);
        assert_eq!(pile("2D KS QH JC").ordered_run_len(), 3);
        assert_eq!(pile("KS QH JH").ordered_run_len(), 1);
        assert_eq!(pile("KS QH 5D 4S 3H").ordered_run_len(), 3);
    }

    #[test]
    fn test_full() {
        let mut a = Pile::default();
        for id in 0..MAX_CASCADE_LEN as u8 {
            a.push_card(Card::new(id % MAX_RANK + 1, id / MAX_RANK));
        }
        assert!(a.is_full());
        assert_eq!(a.peek_top(), Card::new(MAX_CASCADE_LEN as u8 % MAX_RANK, 1));
    }
}
