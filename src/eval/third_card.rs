//! Правило третьей карты в баккаре. Таблица фиксированная и не настраивается.

use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::hand::BaccaratHands;
use crate::domain::shoe::Shoe;
use crate::engine::errors::EngineError;

/// Что произошло при доборе.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrawReport {
    /// На первых двух картах у кого-то 8 или 9 – добора нет.
    pub natural: bool,
    pub player_third: Option<Card>,
    pub banker_third: Option<Card>,
}

/// Натуральная раздача: у любой стороны 8 или 9 на двух картах.
pub fn is_natural_deal(player_total: u8, banker_total: u8) -> bool {
    player_total >= 8 || banker_total >= 8
}

/// Player добирает при 0..=5 и стоит при 6..=7.
pub fn player_should_draw(player_total: u8) -> bool {
    player_total <= 5
}

/// Решение банкира.
///
/// `player_third` – очки третьей карты игрока, `None` если игрок стоял.
pub fn banker_should_draw(banker_total: u8, player_third: Option<u8>) -> bool {
    let Some(p3) = player_third else {
        return banker_total <= 5;
    };

    match banker_total {
        0..=2 => true,
        3 => p3 != 8,
        4 => (2..=7).contains(&p3),
        5 => (4..=7).contains(&p3),
        6 => p3 == 6 || p3 == 7,
        _ => false,
    }
}

/// Доиграть розданные руки (по две карты у каждой стороны) по таблице третьей карты.
pub fn play_out(hands: &mut BaccaratHands, shoe: &mut Shoe) -> Result<DrawReport, EngineError> {
    if hands.player.len() != 2 || hands.banker.len() != 2 {
        return Err(EngineError::Internal("добор возможен только после раздачи двух карт"));
    }

    let player_total = hands.player.baccarat_score();
    let banker_total = hands.banker.baccarat_score();

    let mut report = DrawReport::default();
    if is_natural_deal(player_total, banker_total) {
        report.natural = true;
        return Ok(report);
    }

    if player_should_draw(player_total) {
        let card = shoe.draw()?;
        hands.player.push(card);
        report.player_third = Some(card);
    }

    let p3 = report.player_third.map(|c| c.baccarat_points());
    if banker_should_draw(banker_total, p3) {
        let card = shoe.draw()?;
        hands.banker.push(card);
        report.banker_third = Some(card);
    }

    Ok(report)
}
