use serde::{Deserialize, Serialize};

use crate::domain::hand::{BaccaratHands, BaccaratOutcome};
use crate::domain::RoundNo;
use crate::engine::ledger::BetLedger;
use crate::engine::settlement::SettlementBatch;

/// Фаза раунда без данных (для DTO, логов и сравнений).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, async_graphql::Enum)]
pub enum RoundPhase {
    Betting,
    Dealing,
    Showdown,
    Settling,
    Cooldown,
}

/// Состояние текущего раунда стола. Единственный источник правды о том, что делает стол.
///
/// Переходы только вперёд: Betting -> Dealing -> Showdown -> Settling -> Cooldown.
/// Новый раунд – новое значение `Betting` с пустым журналом.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoundState {
    /// Окно ставок открыто до `deadline_ms`.
    Betting {
        round_no: RoundNo,
        deadline_ms: u64,
        ledger: BetLedger,
    },
    /// Розданы первые карты, добор ещё не применён.
    /// Журнал заморожен и едет дальше до расчёта.
    Dealing {
        round_no: RoundNo,
        ledger: BetLedger,
        hands: BaccaratHands,
    },
    /// Руки финальные.
    Showdown {
        round_no: RoundNo,
        ledger: BetLedger,
        hands: BaccaratHands,
        outcome: BaccaratOutcome,
    },
    /// Дельты применены (или раунд прерван), ждём переход в кулдаун.
    Settling { round_no: RoundNo, resume_at_ms: u64 },
    /// Пауза между раундами до `resume_at_ms`.
    Cooldown { round_no: RoundNo, resume_at_ms: u64 },
}

impl RoundState {
    pub fn phase(&self) -> RoundPhase {
        match self {
            RoundState::Betting { .. } => RoundPhase::Betting,
            RoundState::Dealing { .. } => RoundPhase::Dealing,
            RoundState::Showdown { .. } => RoundPhase::Showdown,
            RoundState::Settling { .. } => RoundPhase::Settling,
            RoundState::Cooldown { .. } => RoundPhase::Cooldown,
        }
    }

    pub fn round_no(&self) -> RoundNo {
        match self {
            RoundState::Betting { round_no, .. }
            | RoundState::Dealing { round_no, .. }
            | RoundState::Showdown { round_no, .. }
            | RoundState::Settling { round_no, .. }
            | RoundState::Cooldown { round_no, .. } => *round_no,
        }
    }

    /// Журнал ставок, пока он существует (до расчёта).
    pub fn ledger(&self) -> Option<&BetLedger> {
        match self {
            RoundState::Betting { ledger, .. }
            | RoundState::Dealing { ledger, .. }
            | RoundState::Showdown { ledger, .. } => Some(ledger),
            RoundState::Settling { .. } | RoundState::Cooldown { .. } => None,
        }
    }

    pub fn hands(&self) -> Option<&BaccaratHands> {
        match self {
            RoundState::Dealing { hands, .. } | RoundState::Showdown { hands, .. } => Some(hands),
            _ => None,
        }
    }

    /// Ближайший момент, когда состояние само сменится (для таймеров/UI).
    pub fn wake_at_ms(&self) -> Option<u64> {
        match self {
            RoundState::Betting { deadline_ms, .. } => Some(*deadline_ms),
            RoundState::Settling { resume_at_ms, .. } | RoundState::Cooldown { resume_at_ms, .. } => {
                Some(*resume_at_ms)
            }
            RoundState::Dealing { .. } | RoundState::Showdown { .. } => None,
        }
    }
}

/// Что осталось от прерванного раунда. Автоматически расчёт не повторяется.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum PendingSettlement {
    /// Раунд не дошёл до финальных рук. Списаний не было, рассчитывать нечего.
    Unfinished {
        ledger: BetLedger,
        hands: Option<BaccaratHands>,
    },
    /// Руки финальные, но пакет не посчитан (не прочитались балансы).
    Uncomputed { ledger: BetLedger, hands: BaccaratHands },
    /// Пакет посчитан, хранилище его не приняло.
    Unapplied(SettlementBatch),
}

/// Прерванный раунд, ждущий оператора: повторить расчёт или забрать на разбор.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AbortedRound {
    pub round_no: RoundNo,
    pub reason: String,
    pub pending: PendingSettlement,
}

impl AbortedRound {
    /// Можно ли довести раунд до выплат повтором.
    pub fn is_retryable(&self) -> bool {
        !matches!(self.pending, PendingSettlement::Unfinished { .. })
    }
}
