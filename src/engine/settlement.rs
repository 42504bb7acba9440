//! Расчёт раунда: из финальных рук и журнала ставок получаем дельты балансов.
//!
//! Модель – «только чистая дельта»: при ставке ничего не списывается,
//! при расчёте каждому участнику начисляется одна суммарная дельта
//! `Σ (выплата − ставка)` по всем его категориям.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::bet::{BetCategory, MainBet, SideBet};
use crate::domain::chips::{Chips, PayoutMultiplier};
use crate::domain::hand::{BaccaratHands, ShowdownSnapshot};
use crate::domain::{ParticipantId, RoundNo, TableId};
use crate::engine::errors::EngineError;
use crate::engine::ledger::BetLedger;
use crate::infra::persistence::StoreError;

/// Множители полной выплаты по категориям (с учётом ставки).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PayoutTable {
    pub player: PayoutMultiplier,
    pub banker: PayoutMultiplier,
    pub tie: PayoutMultiplier,
    pub player_pair: PayoutMultiplier,
    pub banker_pair: PayoutMultiplier,
}

impl PayoutTable {
    /// Player 1:1, Banker 19:20 (5% комиссии), Tie 8:1, пары 11:1.
    pub const fn standard() -> Self {
        Self {
            player: PayoutMultiplier::from_basis_points(20_000),
            banker: PayoutMultiplier::from_basis_points(19_500),
            tie: PayoutMultiplier::from_basis_points(90_000),
            player_pair: PayoutMultiplier::from_basis_points(120_000),
            banker_pair: PayoutMultiplier::from_basis_points(120_000),
        }
    }

    pub fn multiplier(&self, category: BetCategory) -> PayoutMultiplier {
        match category {
            BetCategory::Main(MainBet::Player) => self.player,
            BetCategory::Main(MainBet::Banker) => self.banker,
            BetCategory::Main(MainBet::Tie) => self.tie,
            BetCategory::Side(SideBet::PlayerPair) => self.player_pair,
            BetCategory::Side(SideBet::BankerPair) => self.banker_pair,
        }
    }

    /// Каждый множитель должен быть не меньше 1.0.
    pub fn validate(&self) -> Result<(), EngineError> {
        for category in BetCategory::ALL {
            let m = self.multiplier(category);
            if m < PayoutMultiplier::ONE {
                return Err(EngineError::InvalidConfig(format!(
                    "множитель {category} = {m} меньше 1.0"
                )));
            }
        }
        Ok(())
    }
}

impl Default for PayoutTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Запись истории по одной ненулевой ставке.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettlementRecord {
    pub table_id: TableId,
    pub round_no: RoundNo,
    pub participant: ParticipantId,
    pub category: BetCategory,
    pub wager: Chips,
    pub multiplier: PayoutMultiplier,
    /// Полная выплата (0 при проигрыше).
    pub payout: Chips,
    /// `payout − wager`.
    pub delta: i64,
    pub snapshot: ShowdownSnapshot,
}

/// Итоговая дельта баланса участника за раунд.
///
/// `stake` нужен хранилищу: оно повторно проверяет покрытие ставок
/// под своей блокировкой, в момент применения.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceDelta {
    pub participant: ParticipantId,
    pub stake: Chips,
    pub delta: i64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CancelReason {
    /// Баланс на момент расчёта меньше суммы ставок.
    InsufficientFunds { balance: i64 },
    /// Хранилище балансов не знает такого участника.
    UnknownAccount,
}

/// Ставки участника аннулированы целиком: ни списаний, ни выплат.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cancellation {
    pub participant: ParticipantId,
    pub stake: Chips,
    pub reason: CancelReason,
}

/// Строка в списке победителей раунда.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WinnerLine {
    pub participant: ParticipantId,
    pub net: i64,
}

/// Всё, что нужно применить за раунд одной атомарной операцией.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettlementBatch {
    pub table_id: TableId,
    pub round_no: RoundNo,
    pub records: Vec<SettlementRecord>,
    /// По одной записи на рассчитанного участника, в порядке id.
    pub deltas: Vec<BalanceDelta>,
    pub cancellations: Vec<Cancellation>,
}

impl SettlementBatch {
    pub fn delta_for(&self, participant: ParticipantId) -> i64 {
        self.deltas
            .iter()
            .find(|d| d.participant == participant)
            .map(|d| d.delta)
            .unwrap_or(0)
    }

    pub fn records_for(&self, participant: ParticipantId) -> impl Iterator<Item = &SettlementRecord> {
        self.records.iter().filter(move |r| r.participant == participant)
    }

    /// Участники в плюсе, от большего выигрыша к меньшему.
    pub fn winners(&self) -> Vec<WinnerLine> {
        let mut winners: Vec<WinnerLine> = self
            .deltas
            .iter()
            .filter(|d| d.delta > 0)
            .map(|d| WinnerLine {
                participant: d.participant,
                net: d.delta,
            })
            .collect();
        winners.sort_by(|a, b| b.net.cmp(&a.net).then(a.participant.cmp(&b.participant)));
        winners
    }

    pub fn total_wagered(&self) -> Chips {
        self.records.iter().fold(Chips::ZERO, |acc, r| acc + r.wager)
    }

    pub fn total_paid(&self) -> Chips {
        self.records.iter().fold(Chips::ZERO, |acc, r| acc + r.payout)
    }

    /// Результат дома за раунд: поставлено минус выплачено.
    pub fn house_net(&self) -> i64 {
        self.total_wagered().as_signed() - self.total_paid().as_signed()
    }

    /// Перенести участников, аннулированных хранилищем при применении, из расчёта
    /// в аннулирования. Их записи и дельты из пакета убираются.
    pub fn apply_cancellations(&mut self, voided: Vec<Cancellation>) {
        for cancel in voided {
            self.records.retain(|r| r.participant != cancel.participant);
            self.deltas.retain(|d| d.participant != cancel.participant);
            if !self.cancellations.iter().any(|c| c.participant == cancel.participant) {
                self.cancellations.push(cancel);
            }
        }
        self.cancellations.sort_by_key(|c| c.participant);
    }
}

/// Рассчитать раунд.
///
/// `balance_of` – чтение баланса участника из внешнего хранилища
/// (`None` – участник неизвестен). Функция ничего не пишет: результат – пакет
/// для `BalanceStore::apply_settlement`. Проверка покрытия здесь предварительная,
/// окончательно её делает хранилище в момент применения.
/// Ошибка чтения баланса прерывает расчёт всего раунда.
pub fn compute_settlement<F>(
    table_id: TableId,
    round_no: RoundNo,
    ledger: &BetLedger,
    hands: &BaccaratHands,
    payouts: &PayoutTable,
    mut balance_of: F,
) -> Result<SettlementBatch, EngineError>
where
    F: FnMut(ParticipantId) -> Result<Option<i64>, StoreError>,
{
    let snapshot = ShowdownSnapshot::new(round_no, hands);
    let outcome = snapshot.outcome;

    let mut batch = SettlementBatch {
        table_id,
        round_no,
        records: Vec::new(),
        deltas: Vec::new(),
        cancellations: Vec::new(),
    };

    for (&participant, bets) in ledger.iter() {
        let stake = bets.total_stake();
        if stake.is_zero() {
            continue;
        }

        // Баланс проверяем один раз на участника: ставки могли накопиться
        // до того, как стало известно, что денег не хватает.
        let reason = match balance_of(participant)? {
            None => Some(CancelReason::UnknownAccount),
            Some(balance) if balance < stake.as_signed() => {
                Some(CancelReason::InsufficientFunds { balance })
            }
            Some(_) => None,
        };
        if let Some(reason) = reason {
            warn!(table_id, round_no, participant, %stake, ?reason, "ставки участника аннулированы");
            batch.cancellations.push(Cancellation {
                participant,
                stake,
                reason,
            });
            continue;
        }

        let mut net: i64 = 0;
        for (category, wager) in bets.wagers() {
            let multiplier = payouts.multiplier(category);
            let payout = if category.wins(&outcome) {
                multiplier.payout(wager)
            } else {
                Chips::ZERO
            };
            let delta = payout.as_signed() - wager.as_signed();
            net = net.saturating_add(delta);

            batch.records.push(SettlementRecord {
                table_id,
                round_no,
                participant,
                category,
                wager,
                multiplier,
                payout,
                delta,
                snapshot: snapshot.clone(),
            });
        }

        debug!(table_id, round_no, participant, net, "участник рассчитан");
        batch.deltas.push(BalanceDelta {
            participant,
            stake,
            delta: net,
        });
    }

    Ok(batch)
}
