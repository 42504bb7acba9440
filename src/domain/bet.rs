use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::hand::BaccaratOutcome;

/// Основной исход раунда баккары. Исходы взаимоисключающие.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[derive(async_graphql::Enum)]
pub enum MainBet {
    Player,
    Banker,
    Tie,
}

impl MainBet {
    pub const ALL: [MainBet; 3] = [MainBet::Player, MainBet::Banker, MainBet::Tie];
}

/// Побочная ставка: независимое условие «да/нет».
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[derive(async_graphql::Enum)]
pub enum SideBet {
    PlayerPair,
    BankerPair,
}

impl SideBet {
    pub const ALL: [SideBet; 2] = [SideBet::PlayerPair, SideBet::BankerPair];

    /// Выполнено ли условие побочной ставки.
    pub fn hits(self, outcome: &BaccaratOutcome) -> bool {
        match self {
            SideBet::PlayerPair => outcome.player_pair,
            SideBet::BankerPair => outcome.banker_pair,
        }
    }
}

/// Категория ставки: основная или побочная.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum BetCategory {
    Main(MainBet),
    Side(SideBet),
}

impl BetCategory {
    pub const ALL: [BetCategory; 5] = [
        BetCategory::Main(MainBet::Player),
        BetCategory::Main(MainBet::Banker),
        BetCategory::Main(MainBet::Tie),
        BetCategory::Side(SideBet::PlayerPair),
        BetCategory::Side(SideBet::BankerPair),
    ];

    /// Стабильный ключ категории: `PLAYER`, `BANKER_PAIR` и т.д.
    pub const fn key(self) -> &'static str {
        match self {
            BetCategory::Main(MainBet::Player) => "PLAYER",
            BetCategory::Main(MainBet::Banker) => "BANKER",
            BetCategory::Main(MainBet::Tie) => "TIE",
            BetCategory::Side(SideBet::PlayerPair) => "PLAYER_PAIR",
            BetCategory::Side(SideBet::BankerPair) => "BANKER_PAIR",
        }
    }

    /// Выиграла ли ставка этой категории при данном исходе.
    pub fn wins(self, outcome: &BaccaratOutcome) -> bool {
        match self {
            BetCategory::Main(main) => main == outcome.winner,
            BetCategory::Side(side) => side.hits(outcome),
        }
    }
}

impl From<MainBet> for BetCategory {
    fn from(m: MainBet) -> Self {
        BetCategory::Main(m)
    }
}

impl From<SideBet> for BetCategory {
    fn from(s: SideBet) -> Self {
        BetCategory::Side(s)
    }
}

impl fmt::Display for BetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Ключ из кнопки/формы: регистр и пробелы не важны.
impl FromStr for BetCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        BetCategory::ALL
            .into_iter()
            .find(|c| c.key() == normalized)
            .ok_or_else(|| format!("Неизвестная категория ставки: {s:?}"))
    }
}
