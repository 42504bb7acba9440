//! Движок раундов баккары: ставки, раздача, шоудаун, расчёт.
//!
//! Высокоуровневый объект: `RoundMachine`
//! Основные операции:
//!   - `place_bet` / `adjust_last_bet` / `clear_participant` – ставки в окне BETTING
//!   - `step` – один переход фаз, если он назрел
//!   - `advance` – все назревшие переходы подряд

pub mod dealing;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod round_machine;
pub mod round_state;
pub mod settlement;

pub use errors::EngineError;
pub use events::{RoundHistory, TableEvent, TableEventKind};
pub use ledger::{BetLedger, ParticipantBets};
pub use round_machine::{RoundMachine, RoundRules};
pub use round_state::{AbortedRound, PendingSettlement, RoundPhase, RoundState};
pub use settlement::{
    compute_settlement, BalanceDelta, CancelReason, Cancellation, PayoutTable, SettlementBatch,
    SettlementRecord, WinnerLine,
};

/// RNG интерфейс для engine.
/// Реализации – в infra (обёртки над `rand`).
pub trait RandomSource {
    fn shuffle<T>(&mut self, slice: &mut [T]);
}
