use serde::{Deserialize, Serialize};

use crate::domain::bet::MainBet;
use crate::domain::card::Card;
use crate::domain::RoundNo;
use crate::eval::{self, Ruleset};

/// Рука одного участника (или дома). Очки не хранятся – всегда считаются из карт.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hand {
    pub cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn score(&self, ruleset: Ruleset) -> u32 {
        eval::score(&self.cards, ruleset)
    }

    /// Очки по правилам баккары (0..=9).
    pub fn baccarat_score(&self) -> u8 {
        eval::baccarat_total(&self.cards)
    }

    pub fn is_natural(&self) -> bool {
        eval::is_natural(&self.cards)
    }

    pub fn is_pair(&self) -> bool {
        eval::is_pair(&self.cards)
    }

    pub fn is_blackjack(&self) -> bool {
        eval::is_blackjack(&self.cards)
    }

    pub fn is_bust(&self) -> bool {
        eval::is_bust(&self.cards)
    }
}

/// Две руки баккары: Player и Banker.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BaccaratHands {
    pub player: Hand,
    pub banker: Hand,
}

impl BaccaratHands {
    pub fn new(player: Hand, banker: Hand) -> Self {
        Self { player, banker }
    }

    /// Итог раунда по финальным рукам.
    pub fn outcome(&self) -> BaccaratOutcome {
        let player_score = self.player.baccarat_score();
        let banker_score = self.banker.baccarat_score();
        let winner = if player_score > banker_score {
            MainBet::Player
        } else if banker_score > player_score {
            MainBet::Banker
        } else {
            MainBet::Tie
        };

        BaccaratOutcome {
            player_score,
            banker_score,
            winner,
            player_pair: self.player.is_pair(),
            banker_pair: self.banker.is_pair(),
        }
    }
}

/// Результат раунда баккары.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BaccaratOutcome {
    pub player_score: u8,
    pub banker_score: u8,
    /// Ничья – отдельный исход, на который можно ставить, а не «возврат всем».
    pub winner: MainBet,
    pub player_pair: bool,
    pub banker_pair: bool,
}

/// Снимок шоудауна, который попадает в каждую запись расчёта (для истории/аудита).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShowdownSnapshot {
    pub round_no: RoundNo,
    pub player_cards: Vec<Card>,
    pub banker_cards: Vec<Card>,
    pub outcome: BaccaratOutcome,
}

impl ShowdownSnapshot {
    pub fn new(round_no: RoundNo, hands: &BaccaratHands) -> Self {
        Self {
            round_no,
            player_cards: hands.player.cards.clone(),
            banker_cards: hands.banker.cards.clone(),
            outcome: hands.outcome(),
        }
    }
}
