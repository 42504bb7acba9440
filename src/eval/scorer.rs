use serde::{Deserialize, Serialize};

use crate::domain::card::{Card, Rank};

/// Набор правил подсчёта очков.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Ruleset {
    /// Сумма по модулю 10.
    Baccarat,
    /// Тузы 11 или 1, картинки 10.
    Blackjack,
}

/// Очки руки по выбранным правилам. Порядок карт не влияет на результат.
pub fn score(cards: &[Card], ruleset: Ruleset) -> u32 {
    match ruleset {
        Ruleset::Baccarat => baccarat_total(cards) as u32,
        Ruleset::Blackjack => blackjack_total(cards),
    }
}

/// Баккара: сумма очков карт по модулю 10, любое число карт.
pub fn baccarat_total(cards: &[Card]) -> u8 {
    let sum: u32 = cards.iter().map(|c| c.baccarat_points() as u32).sum();
    (sum % 10) as u8
}

/// Блэкджек: все тузы по 11, затем по одному понижаем до 1,
/// пока сумма больше 21 и есть что понижать. Результат может быть > 21 (перебор).
pub fn blackjack_total(cards: &[Card]) -> u32 {
    let mut total: u32 = cards.iter().map(|c| c.rank.blackjack_points() as u32).sum();
    let mut soft_aces = cards.iter().filter(|c| c.rank == Rank::Ace).count();

    while total > 21 && soft_aces > 0 {
        total -= 10;
        soft_aces -= 1;
    }
    total
}

/// Натуральная рука баккары: ровно две карты и 8 или 9 очков.
pub fn is_natural(cards: &[Card]) -> bool {
    cards.len() == 2 && baccarat_total(cards) >= 8
}

/// Пара: первые две карты одного ранга (масть не важна).
pub fn is_pair(cards: &[Card]) -> bool {
    cards.len() >= 2 && cards[0].rank == cards[1].rank
}

/// Блэкджек: ровно две карты и 21.
pub fn is_blackjack(cards: &[Card]) -> bool {
    cards.len() == 2 && blackjack_total(cards) == 21
}

pub fn is_bust(cards: &[Card]) -> bool {
    blackjack_total(cards) > 21
}
