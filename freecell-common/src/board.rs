use anyhow::{Context, Result, bail};
use rand::{Rng, seq::SliceRandom};
use smallvec::SmallVec;

use std::fmt;

pub const TOTAL_FREE_CELLS: usize = 4;
pub const TOTAL_CASCADES: usize = 8;
pub const TOTAL_FOUNDATIONS: usize = 4;
pub const MAX_CASCADE_LEN: usize = 19;
pub const MAX_RANK: u8 = 13;
pub const MAX_SUIT: u8 = 4;
pub const MAX_CARD: u8 = MAX_SUIT * MAX_RANK;

const SUITS: [char; MAX_SUIT as usize] = ['S', 'H', 'D', 'C'];
const RANKS: [char; MAX_RANK as usize + 1] = [
    '-', 'A', '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K',
];
const EMPTY_SLOT: &str = "--";

// Microsoft deals number their deck rank-major in club, diamond, heart, spade order.
const MS_SUITS: [u8; MAX_SUIT as usize] = [3, 2, 1, 0];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    pub free_cells: [Card; TOTAL_FREE_CELLS],
    pub cascades: [Cascade; TOTAL_CASCADES],
    /// Highest rank placed on each suit's foundation, indexed by suit.
    pub foundations: [u8; TOTAL_FOUNDATIONS],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deals the numbered game from the Microsoft FreeCell collection.
    pub fn new_from_seed(seed: u32) -> Self {
        let mut current_seed = seed;
        let mut rnd = || {
            current_seed = current_seed.wrapping_mul(214013).wrapping_add(2531011);
            (current_seed >> 16) & 0x7fff
        };
        let mut deck: [u8; MAX_CARD as usize] = std::array::from_fn(|i| MAX_CARD - 1 - i as u8);
        for i in 0..(MAX_CARD as usize - 1) {
            let j = MAX_CARD as usize - 1 - (rnd() as usize % (MAX_CARD as usize - i));
            deck.swap(i, j);
        }

        let mut board = Board::new();
        for (i, id) in deck.into_iter().enumerate() {
            let card = Card::new(id / MAX_SUIT + 1, MS_SUITS[(id % MAX_SUIT) as usize]);
            board.cascades[i % TOTAL_CASCADES].push(card);
        }
        board
    }

    /// Shuffles a full deck and deals seven cards to the first four cascades, six to the rest.
    pub fn new_random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck: Vec<Card> = (0..MAX_SUIT)
            .flat_map(|suit| (1..=MAX_RANK).map(move |rank| Card::new(rank, suit)))
            .collect();
        deck.shuffle(rng);

        let mut board = Board::new();
        let mut cards = deck.into_iter();
        for (i, cascade) in board.cascades.iter_mut().enumerate() {
            let count = if i < TOTAL_CASCADES / 2 { 7 } else { 6 };
            cascade.cards.extend(cards.by_ref().take(count));
        }
        board
    }

    pub fn foundation_score(&self) -> u8 {
        self.foundations.iter().sum()
    }

    pub fn is_won(&self) -> bool {
        self.foundations.iter().all(|&rank| rank == MAX_RANK)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Checks that the board holds each of the 52 cards exactly once.
    pub fn validate(&self) -> Result<()> {
        let mut seen = [false; MAX_CARD as usize];
        let mut count = 0;
        let mut check_card = |card: Card| -> Result<()> {
            if card.rank() == 0 || card.rank() > MAX_RANK {
                bail!("Invalid card id {}", card.id());
            }
            let index = card.index();
            if seen[index] {
                bail!("Duplicate card {card}");
            }
            seen[index] = true;
            count += 1;
            Ok(())
        };

        for (suit, &rank) in self.foundations.iter().enumerate() {
            if rank > MAX_RANK {
                bail!("Invalid foundation rank {rank}");
            }
            for r in 1..=rank {
                check_card(Card::new(r, suit as u8))?;
            }
        }
        for &card in self.free_cells.iter().filter(|c| !c.is_empty()) {
            check_card(card)?;
        }
        for (i, cascade) in self.cascades.iter().enumerate() {
            if cascade.len() > MAX_CASCADE_LEN {
                bail!("Cascade {} holds more than {MAX_CASCADE_LEN} cards", i + 1);
            }
            for &card in &cascade.cards {
                check_card(card)?;
            }
        }

        if count != MAX_CARD as usize {
            bail!("Not all cards passed; found {count} of {MAX_CARD}");
        }
        Ok(())
    }

    /// Parses a deal: one line per cascade, bottom card first, plus optional
    /// `Foundation:` and `FreeCells:` lines where `--` marks an empty slot.
    pub fn parse(content: &str) -> Result<Self> {
        let mut board = Self::new();
        let mut cascade_count = 0;

        for line in content.lines().map(|l| l.trim()).filter(|l| !l.is_empty()) {
            let line_context = || format!("Failed to parse at '{line}'");
            if let Some(rest) = line.strip_prefix("Foundation:") {
                for card in Self::parse_slots(rest).with_context(line_context)? {
                    if card.is_empty() {
                        continue;
                    }
                    let suit = card.suit() as usize;
                    if board.foundations[suit] != 0 {
                        bail!("Duplicate card {card} on foundation");
                    }
                    board.foundations[suit] = card.rank();
                }
            } else if let Some(rest) = line.strip_prefix("FreeCells:") {
                let cards = Self::parse_slots(rest).with_context(line_context)?;
                if cards.len() > TOTAL_FREE_CELLS {
                    bail!("Too many free cells; at most {TOTAL_FREE_CELLS} are allowed");
                }
                board.free_cells[..cards.len()].copy_from_slice(&cards);
            } else {
                if cascade_count >= TOTAL_CASCADES {
                    bail!("Too many cascades; at most {TOTAL_CASCADES} are allowed");
                }
                let cards = Self::parse_cards(line).with_context(line_context)?;
                board.cascades[cascade_count].cards.extend(cards);
                cascade_count += 1;
            }
        }

        board.validate()?;
        Ok(board)
    }

    fn parse_cards(s: &str) -> Result<Vec<Card>> {
        s.split_whitespace().map(Card::parse).collect()
    }

    fn parse_slots(s: &str) -> Result<Vec<Card>> {
        s.split_whitespace()
            .map(|token| match token {
                EMPTY_SLOT => Ok(Card::EMPTY),
                _ => Card::parse(token),
            })
            .collect()
    }

    pub fn to_pretty_string(&self) -> String {
        let mut output = String::new();

        output.push_str("Foundation:");
        for (suit, &rank) in self.foundations.iter().enumerate() {
            let card = match rank {
                0 => Card::EMPTY,
                _ => Card::new(rank, suit as u8),
            };
            output.push_str(&format!(" {card}"));
        }
        output.push('\n');

        output.push_str("FreeCells:");
        for card in &self.free_cells {
            output.push_str(&format!(" {card}"));
        }

        let rows = self.cascades.iter().map(|c| c.len()).max().unwrap_or_default();
        for row in 0..rows {
            let line = self
                .cascades
                .iter()
                .map(|cascade| match cascade.cards.get(row) {
                    Some(card) => card.to_string(),
                    None => "  ".to_string(),
                })
                .collect::<Vec<_>>()
                .join(" ");
            output.push('\n');
            output.push_str(line.trim_end());
        }

        output
    }

    pub fn move_cascade_to_foundation(&mut self, cascade_idx: usize) {
        if let Some(card) = self.cascades[cascade_idx].pop() {
            self.foundations[card.suit() as usize] = card.rank();
        }
    }

    pub fn move_free_cell_to_foundation(&mut self, cell_idx: usize) {
        let card = std::mem::take(&mut self.free_cells[cell_idx]);
        if !card.is_empty() {
            self.foundations[card.suit() as usize] = card.rank();
        }
    }

    pub fn move_free_cell_to_cascade(&mut self, cell_idx: usize, cascade_idx: usize) {
        let card = std::mem::take(&mut self.free_cells[cell_idx]);
        if !card.is_empty() {
            self.cascades[cascade_idx].push(card);
        }
    }

    pub fn move_cascade_to_cascade(&mut self, from_idx: usize, to_idx: usize) {
        if let Some(card) = self.cascades[from_idx].pop() {
            self.cascades[to_idx].push(card);
        }
    }

    pub fn move_cascade_to_free_cell(&mut self, cascade_idx: usize, cell_idx: usize) {
        if let Some(card) = self.cascades[cascade_idx].pop() {
            self.free_cells[cell_idx] = card;
        }
    }

    pub fn find_free_cell(&self, card: Card) -> Option<usize> {
        self.free_cells.iter().position(|&c| c == card)
    }

    pub fn find_cascade_top(&self, card: Card) -> Option<usize> {
        self.cascades
            .iter()
            .position(|c| c.peek_top() == Some(&card))
    }

    pub fn find_cascade_bottom(&self, card: Card) -> Option<usize> {
        self.cascades.iter().position(|c| c.bottom() == Some(&card))
    }

    pub fn first_empty_free_cell(&self) -> Option<usize> {
        self.free_cells.iter().position(|c| c.is_empty())
    }

    pub fn first_empty_cascade(&self) -> Option<usize> {
        self.cascades.iter().position(|c| c.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cascade {
    pub cards: SmallVec<[Card; MAX_CASCADE_LEN]>,
}

impl Cascade {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn peek_top(&self) -> Option<&Card> {
        self.cards.last()
    }

    pub fn bottom(&self) -> Option<&Card> {
        self.cards.first()
    }

    pub fn pop(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }
}

/// A card packed as `rank << 2 | suit`. Zero is the empty slot, so the
/// derived ordering puts empty slots first and orders cards by rank, then suit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Card(u8);

impl Card {
    pub const EMPTY: Self = Self(0);

    /// `rank` runs from 1 (ace) to 13 (king); suits are spades, hearts, diamonds, clubs.
    pub fn new(rank: u8, suit: u8) -> Self {
        Self((rank << 2) | (suit & 3))
    }

    pub fn parse(token: &str) -> Result<Self> {
        let mut chars = token.chars();
        let (Some(rank_char), Some(suit_char), None) = (chars.next(), chars.next(), chars.next())
        else {
            bail!("Invalid card '{token}'; expected rank and suit");
        };
        let rank = RANKS[1..]
            .iter()
            .position(|&r| r == rank_char.to_ascii_uppercase())
            .with_context(|| format!("Invalid rank at card {token}"))?;
        let suit = SUITS
            .iter()
            .position(|&s| s == suit_char.to_ascii_uppercase())
            .with_context(|| format!("Invalid suit at card {token}"))?;
        Ok(Card::new(rank as u8 + 1, suit as u8))
    }

    pub fn id(&self) -> u8 {
        self.0
    }

    pub fn rank(&self) -> u8 {
        self.0 >> 2
    }

    pub fn suit(&self) -> u8 {
        self.0 & 3
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn is_black(&self) -> bool {
        matches!(self.suit(), 0 | 3)
    }

    /// Dense position of the card in a 52 card deck.
    pub fn index(&self) -> usize {
        self.suit() as usize * MAX_RANK as usize + self.rank() as usize - 1
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str(EMPTY_SLOT);
        }
        write!(
            f,
            "{}{}",
            RANKS[self.rank() as usize],
            SUITS[self.suit() as usize]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rand::{SeedableRng, rngs::StdRng};

    const DEAL_ONE: &str = r#"
JD KD 2S 4C 3S 6D 6S
2D KC KS 5C TD 8S 9C
9H 9S 9D TS 4S 8D 2H
JC 5S QD QH TH QS 6H
5D AD JS 4H 8H 6C
7H QC AS AC 2C 3D
7C KH AH 4D JH 8C
5H 3H 3C 7S 7D TC
"#;

    fn card(token: &str) -> Card {
        Card::parse(token).unwrap()
    }

    #[test]
    fn test_card_encoding() {
        let card = card("qh");
        assert_eq!(card.rank(), 12);
        assert_eq!(card.suit(), 1);
        assert!(!card.is_black());
        assert!(Card::parse("KC").unwrap().is_black());
        assert_eq!(card.to_string(), "QH");
        assert_eq!(Card::EMPTY.to_string(), "--");
        assert!(Card::EMPTY < Card::parse("AS").unwrap());
        assert!(Card::parse("AC").unwrap() < Card::parse("2S").unwrap());
    }

    #[test]
    fn test_parse_bad_tokens() {
        for (token, message) in [
            ("10S", "expected rank and suit"),
            ("A", "expected rank and suit"),
            ("1S", "Invalid rank"),
            ("AX", "Invalid suit"),
        ] {
            let err = Card::parse(token).unwrap_err();
            assert!(err.to_string().contains(message), "{token}: {err}");
        }
    }

    #[test]
    fn test_parse_deal() {
        let board = Board::parse(DEAL_ONE).unwrap();
        assert!(board.is_valid());
        assert_eq!(board.cascades[0].len(), 7);
        assert_eq!(board.cascades[7].len(), 6);
        assert_eq!(board.cascades[0].bottom(), Some(&card("JD")));
        assert_eq!(board.cascades[7].peek_top(), Some(&card("TC")));
        assert_eq!(board.foundation_score(), 0);
        assert_eq!(Board::parse(&DEAL_ONE.to_lowercase()).unwrap(), board);
    }

    #[test]
    fn test_parse_incomplete_deal() {
        let err = Board::parse("AS 2S\n3S 4S").unwrap_err();
        assert!(format!("{err:#}").contains("Not all cards passed"));
    }

    #[test]
    fn test_parse_duplicate_card() {
        let err = Board::parse("AS AS 2S").unwrap_err();
        assert!(format!("{err:#}").contains("Duplicate card AS"));
    }

    #[test]
    fn test_parse_too_many_cascades() {
        let deal = format!("{DEAL_ONE}\nKS");
        let err = Board::parse(&deal).unwrap_err();
        assert!(format!("{err:#}").contains("Too many cascades"));
    }

    #[test]
    fn test_parse_invalid_token_context() {
        let err = Board::parse("AS 2S 3Z").unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("Failed to parse at 'AS 2S 3Z'"));
        assert!(message.contains("Invalid suit at card 3Z"));
    }

    #[test]
    fn test_parse_position() {
        let board = Board::parse("Foundation: KS KH KD KC").unwrap();
        assert!(board.is_won());
        assert_eq!(board.foundation_score(), MAX_CARD);

        let board = Board::parse("Foundation: JS JH KD KC\nFreeCells: -- KH\nQS KS\nQH").unwrap();
        assert!(!board.is_won());
        assert_eq!(board.free_cells[1], card("KH"));
        assert_eq!(board.foundations, [11, 11, 13, 13]);
    }

    #[test]
    fn test_new_from_seed() {
        let board = Board::new_from_seed(1);
        assert!(board.is_valid());
        assert_eq!(board, Board::parse(DEAL_ONE).unwrap());
        assert_ne!(Board::new_from_seed(2), board);
    }

    #[test]
    fn test_new_random() {
        let mut rng = StdRng::seed_from_u64(7);
        let board = Board::new_random(&mut rng);
        assert!(board.is_valid());
        let lens: Vec<_> = board.cascades.iter().map(|c| c.len()).collect();
        assert_eq!(lens, [7, 7, 7, 7, 6, 6, 6, 6]);
        assert_eq!(board, Board::new_random(&mut StdRng::seed_from_u64(7)));
    }

    #[test]
    fn test_pretty_string() {
        let mut board = Board::parse("Foundation: JS KH KD KC\nQS KS").unwrap();
        board.move_cascade_to_cascade(0, 2);
        assert_eq!(
            board.to_pretty_string(),
            "Foundation: JS KH KD KC\nFreeCells: -- -- -- --\nQS    KS"
        );
        board.move_cascade_to_free_cell(2, 1);
        assert_eq!(
            board.to_pretty_string(),
            "Foundation: JS KH KD KC\nFreeCells: -- KS -- --\nQS"
        );
    }

    #[test]
    fn test_moves() {
        let mut board = Board::parse("Foundation: JS JH KD KC\nQS KH\nQH KS").unwrap();
        board.move_cascade_to_free_cell(0, 0);
        board.move_cascade_to_foundation(0);
        assert_eq!(board.foundations[0], 12);
        board.move_cascade_to_free_cell(1, 1);
        board.move_cascade_to_foundation(1);
        board.move_free_cell_to_cascade(1, 0);
        board.move_cascade_to_foundation(0);
        board.move_free_cell_to_foundation(0);
        assert!(board.is_won());
        assert!(board.is_valid());
    }
}
