use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::hand::ShowdownSnapshot;
use crate::domain::{RoundNo, TableId};
use crate::engine::round_state::PendingSettlement;
use crate::engine::settlement::{BalanceDelta, Cancellation, WinnerLine};
use crate::eval::DrawReport;

/// Тип события стола. Ядро только сообщает факты – форматирует и отправляет их
/// слой представления.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum TableEventKind {
    /// Открыто окно ставок.
    RoundOpened { deadline_ms: u64 },

    /// Шу пересобрана перед раздачей.
    ShoeReshuffled { cards_in_shoe: usize },

    /// Ставки закрыты, розданы первые карты.
    DealingStarted {
        player_cards: Vec<Card>,
        banker_cards: Vec<Card>,
    },

    /// Руки финальные: карты, очки, победитель, пары.
    HandsRevealed {
        snapshot: ShowdownSnapshot,
        draws: DrawReport,
    },

    /// Раунд рассчитан.
    RoundSettled {
        winners: Vec<WinnerLine>,
        deltas: Vec<BalanceDelta>,
        cancellations: Vec<Cancellation>,
        house_net: i64,
    },

    /// Пауза до следующего раунда.
    CooldownStarted { resume_at_ms: u64 },

    /// Раунд прерван без выплат (пустая шу, сбой хранилища). Нужен оператор:
    /// `pending` – ставки, руки или непринятый пакет расчёта.
    RoundAborted {
        reason: String,
        pending: PendingSettlement,
    },

    /// Участников меньше минимума – стол вернулся в Open.
    TableIdle { occupancy: usize },
}

/// Событие стола с порядковым номером внутри раунда.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TableEvent {
    pub index: u32,
    pub table_id: TableId,
    pub round_no: RoundNo,
    pub at_ms: u64,
    pub kind: TableEventKind,
}

/// История текущего раунда (сбрасывается при открытии следующего окна ставок).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RoundHistory {
    pub events: Vec<TableEvent>,
}

impl RoundHistory {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Записать событие и вернуть его копию для рассылки.
    pub fn push(
        &mut self,
        table_id: TableId,
        round_no: RoundNo,
        at_ms: u64,
        kind: TableEventKind,
    ) -> TableEvent {
        let event = TableEvent {
            index: self.events.len() as u32,
            table_id,
            round_no,
            at_ms,
            kind,
        };
        self.events.push(event.clone());
        event
    }
}
