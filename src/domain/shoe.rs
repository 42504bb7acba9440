use serde::{Deserialize, Serialize};

use crate::domain::card::{Card, Rank, Suit};
use crate::engine::errors::EngineError;
use crate::engine::RandomSource;

/// Карт в одной колоде.
pub const CARDS_PER_DECK: usize = 52;

/// Шу: несколько колод, перемешанных вместе. Верх шу – конец вектора.
///
/// Шу принадлежит ровно одному столу, и меняет её только машина раундов этого стола.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Shoe {
    cards: Vec<Card>,
    deck_count: u8,
}

impl Shoe {
    /// `deck_count` колод подряд в порядке Clubs A..K, Diamonds A..K, Hearts, Spades.
    /// Без перемешивания – это делает `build`.
    pub fn ordered(deck_count: u8) -> Result<Self, EngineError> {
        if deck_count == 0 {
            return Err(EngineError::InvalidConfig(
                "в шу должна быть хотя бы одна колода".into(),
            ));
        }

        let mut cards = Vec::with_capacity(CARDS_PER_DECK * deck_count as usize);
        for _ in 0..deck_count {
            for suit in Suit::ALL {
                for rank in Rank::ALL {
                    cards.push(Card::new(rank, suit));
                }
            }
        }

        Ok(Self { cards, deck_count })
    }

    /// Собрать шу и равномерно перемешать её.
    pub fn build<R: RandomSource>(deck_count: u8, rng: &mut R) -> Result<Self, EngineError> {
        let mut shoe = Self::ordered(deck_count)?;
        rng.shuffle(&mut shoe.cards);
        Ok(shoe)
    }

    /// Заранее сложенная шу: первая карта списка выйдет первой.
    /// Нужна для тестов и воспроизведения раундов.
    pub fn from_draw_order(cards: Vec<Card>, deck_count: u8) -> Self {
        let mut cards = cards;
        cards.reverse();
        Self { cards, deck_count }
    }

    pub fn deck_count(&self) -> u8 {
        self.deck_count
    }

    /// Полный размер шу сразу после сборки.
    pub fn full_size(&self) -> usize {
        CARDS_PER_DECK * self.deck_count as usize
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Снять верхнюю карту.
    pub fn draw(&mut self) -> Result<Card, EngineError> {
        self.cards.pop().ok_or(EngineError::EmptyShoe)
    }

    /// Нужна ли пересборка: осталось меньше `floor` карт.
    ///
    /// Проверяется только перед раздачей нового раунда, никогда посреди раунда.
    pub fn needs_reshuffle(&self, floor: usize) -> bool {
        self.cards.len() < floor
    }

    /// Карты в порядке выхода (для снапшотов и отладки).
    pub fn draw_order(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().rev()
    }
}
