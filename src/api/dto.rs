use serde::{Deserialize, Serialize};

use crate::domain::bet::MainBet;
use crate::domain::chips::{Chips, PayoutMultiplier};
use crate::domain::table::TableStatus;
use crate::domain::{ParticipantId, RoundNo, TableId};
use crate::engine::round_state::RoundPhase;

/// Сумма ставок по одной категории.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, async_graphql::SimpleObject)]
pub struct BetTotalDto {
    /// Ключ категории: PLAYER, BANKER, TIE, PLAYER_PAIR, BANKER_PAIR.
    pub category: String,
    pub total: Chips,
}

/// Рука на столе: карты в виде "Ah", "Td" и очки.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, async_graphql::SimpleObject)]
pub struct HandDto {
    pub cards: Vec<String>,
    pub score: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, async_graphql::SimpleObject)]
pub struct OutcomeDto {
    pub player_score: u32,
    pub banker_score: u32,
    pub winner: MainBet,
    pub player_pair: bool,
    pub banker_pair: bool,
}

/// DTO стола для лобби и живого экрана.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, async_graphql::SimpleObject)]
pub struct TableViewDto {
    pub table_id: TableId,
    pub name: String,
    pub status: TableStatus,
    /// None – раунда нет.
    pub phase: Option<RoundPhase>,
    pub round_no: Option<RoundNo>,
    pub last_round_no: RoundNo,
    pub participants: Vec<ParticipantId>,
    pub min_participants: u32,
    pub max_participants: u32,
    /// Сколько секунд до дедлайна ставок или до конца паузы (округление вверх).
    pub seconds_left: Option<u64>,
    pub deck_count: u32,
    pub cards_in_shoe: u32,
    /// Суммы по категориям, пока журнал ставок жив.
    pub bet_totals: Vec<BetTotalDto>,
    pub total_wagered: Chips,
    pub bettors: u32,
    pub player_hand: Option<HandDto>,
    pub banker_hand: Option<HandDto>,
    pub outcome: Option<OutcomeDto>,
    /// Прерванные раунды, ждущие оператора.
    pub aborted_rounds: Vec<RoundNo>,
}

/// Подтверждение ставки.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, async_graphql::SimpleObject)]
pub struct BetReceiptDto {
    pub table_id: TableId,
    pub participant: ParticipantId,
    pub category: String,
    /// Сумма в категории после изменения.
    pub total: Chips,
}

/// Одна строка истории ставок участника.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, async_graphql::SimpleObject)]
pub struct SettlementRecordDto {
    pub table_id: TableId,
    pub round_no: RoundNo,
    pub participant: ParticipantId,
    pub category: String,
    pub wager: Chips,
    pub multiplier: PayoutMultiplier,
    pub payout: Chips,
    pub delta: i64,
    pub winner: MainBet,
    pub player_score: u32,
    pub banker_score: u32,
}

/// Ответ API на команду.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommandResponse {
    /// Создан новый стол.
    TableCreated(TableViewDto),

    /// Обновлённое состояние стола.
    TableState(TableViewDto),

    /// Ставка принята или скорректирована.
    BetAccepted(BetReceiptDto),

    /// Ставки участника сняты (false – снимать было нечего).
    BetsCleared { participant: ParticipantId, removed: bool },

    /// Прерванный раунд рассчитан повторно (None – повторять было нечего).
    AbortedRoundRetried {
        table_id: TableId,
        round_no: Option<RoundNo>,
    },

    /// Стол закрыт.
    TableClosed { table_id: TableId, last_round_no: RoundNo },
}
