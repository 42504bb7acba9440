use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::domain::bet::BetCategory;
use crate::domain::chips::Chips;
use crate::domain::hand::{BaccaratHands, ShowdownSnapshot};
use crate::domain::shoe::Shoe;
use crate::domain::table::{Table, TableStatus};
use crate::domain::{ParticipantId, RoundNo, TableId};
use crate::engine::dealing::{deal_initial, reshuffle_if_needed};
use crate::engine::errors::EngineError;
use crate::engine::events::{RoundHistory, TableEvent, TableEventKind};
use crate::engine::ledger::BetLedger;
use crate::engine::round_state::{AbortedRound, PendingSettlement, RoundPhase, RoundState};
use crate::engine::settlement::{compute_settlement, PayoutTable, SettlementBatch};
use crate::engine::RandomSource;
use crate::eval::third_card;
use crate::infra::persistence::BalanceStore;
use crate::time_ctrl::RoundTimings;

/// Самый большой расход карт за раунд баккары: по три карты на сторону.
pub const MAX_CARDS_PER_ROUND: usize = 6;

/// Правила раунда. Снимаются с конфигурации при открытии стола и дальше не меняются.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundRules {
    pub timings: RoundTimings,
    /// Пересобираем шу, когда в ней осталось меньше стольких карт.
    pub reshuffle_floor: usize,
    pub payouts: PayoutTable,
}

impl RoundRules {
    pub const fn standard() -> Self {
        Self {
            timings: RoundTimings::standard(),
            reshuffle_floor: 12,
            payouts: PayoutTable::standard(),
        }
    }

    pub fn validate(&self, deck_count: u8) -> Result<(), EngineError> {
        if self.timings.bet_window_secs == 0 {
            return Err(EngineError::InvalidConfig(
                "окно ставок должно длиться хотя бы секунду".into(),
            ));
        }
        if self.reshuffle_floor < MAX_CARDS_PER_ROUND {
            return Err(EngineError::InvalidConfig(format!(
                "порог пересборки {} меньше расхода карт за раунд ({MAX_CARDS_PER_ROUND})",
                self.reshuffle_floor
            )));
        }
        let full = deck_count as usize * crate::domain::shoe::CARDS_PER_DECK;
        if self.reshuffle_floor >= full {
            return Err(EngineError::InvalidConfig(format!(
                "порог пересборки {} не меньше размера шу ({full})",
                self.reshuffle_floor
            )));
        }
        self.payouts.validate()
    }
}

impl Default for RoundRules {
    fn default() -> Self {
        Self::standard()
    }
}

/// Машина раундов одного стола.
///
/// Единственный владелец шу и состояния раунда: менять их может только она.
/// Сериализацию вызовов (один шаг за раз, ставки по очереди) обеспечивает
/// тот, кто держит машину, – см. `runtime::TableDriver`.
#[derive(Clone, Debug)]
pub struct RoundMachine {
    pub table: Table,
    pub shoe: Shoe,
    /// None – раунда нет, стол в статусе Open.
    pub state: Option<RoundState>,
    pub rules: RoundRules,
    pub history: RoundHistory,
    /// Прерванные раунды, которые ещё не разобрал оператор (старые первыми).
    pub aborted: Vec<AbortedRound>,
}

impl RoundMachine {
    /// Новый стол со свежей перемешанной шу.
    pub fn new<R: RandomSource>(
        table: Table,
        deck_count: u8,
        rules: RoundRules,
        rng: &mut R,
    ) -> Result<Self, EngineError> {
        rules.validate(deck_count)?;
        let shoe = Shoe::build(deck_count, rng)?;
        Ok(Self::assemble(table, shoe, None, rules))
    }

    /// Собрать машину из готовых частей (восстановление из снапшота, тесты со сложенной шу).
    pub fn restore(
        table: Table,
        shoe: Shoe,
        state: Option<RoundState>,
        rules: RoundRules,
    ) -> Result<Self, EngineError> {
        rules.validate(shoe.deck_count())?;
        Ok(Self::assemble(table, shoe, state, rules))
    }

    fn assemble(table: Table, shoe: Shoe, state: Option<RoundState>, rules: RoundRules) -> Self {
        Self {
            table,
            shoe,
            state,
            rules,
            history: RoundHistory::new(),
            aborted: Vec::new(),
        }
    }

    pub fn table_id(&self) -> TableId {
        self.table.id
    }

    pub fn phase(&self) -> Option<RoundPhase> {
        self.state.as_ref().map(RoundState::phase)
    }

    pub fn round_no(&self) -> Option<RoundNo> {
        self.state.as_ref().map(RoundState::round_no)
    }

    // ---------- ростер ----------

    pub fn join(&mut self, participant: ParticipantId) -> Result<(), EngineError> {
        self.table.join(participant)?;
        info!(table_id = self.table.id, participant, occupancy = self.table.occupancy(), "участник сел за стол");
        Ok(())
    }

    /// Уход не откатывает идущий раунд: ставки ушедшего будут рассчитаны.
    pub fn leave(&mut self, participant: ParticipantId) -> Result<(), EngineError> {
        self.table.leave(participant)?;
        info!(table_id = self.table.id, participant, occupancy = self.table.occupancy(), "участник ушёл из-за стола");
        Ok(())
    }

    // ---------- ставки ----------

    /// Журнал открытого окна ставок. Вне BETTING или после дедлайна – `NotAcceptingBets`.
    fn open_ledger(&mut self, now_ms: u64) -> Result<&mut BetLedger, EngineError> {
        match self.state.as_mut() {
            Some(RoundState::Betting {
                deadline_ms,
                ledger,
                ..
            }) if now_ms < *deadline_ms => Ok(ledger),
            _ => Err(EngineError::NotAcceptingBets),
        }
    }

    fn ensure_seated(&self, participant: ParticipantId) -> Result<(), EngineError> {
        if self.table.is_seated(participant) {
            Ok(())
        } else {
            Err(EngineError::NotSeated(participant))
        }
    }

    pub fn place_bet(
        &mut self,
        now_ms: u64,
        participant: ParticipantId,
        category: BetCategory,
        amount: i64,
    ) -> Result<Chips, EngineError> {
        self.ensure_seated(participant)?;
        let table_id = self.table.id;
        let total = self.open_ledger(now_ms)?.place_bet(participant, category, amount)?;
        debug!(table_id, participant, %category, amount, %total, "ставка принята");
        Ok(total)
    }

    pub fn place_bet_by_key(
        &mut self,
        now_ms: u64,
        participant: ParticipantId,
        key: &str,
        amount: i64,
    ) -> Result<Chips, EngineError> {
        let category: BetCategory = key.parse().map_err(EngineError::InvalidAmount)?;
        self.place_bet(now_ms, participant, category, amount)
    }

    pub fn adjust_last_bet(
        &mut self,
        now_ms: u64,
        participant: ParticipantId,
        delta: i64,
    ) -> Result<(BetCategory, Chips), EngineError> {
        self.ensure_seated(participant)?;
        self.open_ledger(now_ms)?.adjust_last_bet(participant, delta)
    }

    pub fn clear_participant(
        &mut self,
        now_ms: u64,
        participant: ParticipantId,
    ) -> Result<bool, EngineError> {
        Ok(self.open_ledger(now_ms)?.clear_participant(participant))
    }

    // ---------- переходы ----------

    /// Выполнить один назревший переход. Пустой результат – переходить пока некуда.
    ///
    /// Ошибки внутри раунда (пустая шу, сбой хранилища) не всплывают наружу:
    /// раунд прерывается событием `RoundAborted`, стол уходит в кулдаун.
    pub fn step<R, S>(&mut self, now_ms: u64, rng: &mut R, store: &S) -> Vec<TableEvent>
    where
        R: RandomSource,
        S: BalanceStore + ?Sized,
    {
        match self.state.take() {
            None => {
                if self.table.has_minimum() {
                    self.open_round(now_ms)
                } else {
                    Vec::new()
                }
            }

            Some(RoundState::Betting {
                round_no,
                deadline_ms,
                ledger,
            }) => {
                if now_ms < deadline_ms {
                    self.state = Some(RoundState::Betting {
                        round_no,
                        deadline_ms,
                        ledger,
                    });
                    return Vec::new();
                }
                if !self.table.has_minimum() {
                    return self.go_idle(now_ms, round_no);
                }
                self.begin_dealing(now_ms, round_no, ledger, rng)
            }

            Some(RoundState::Dealing {
                round_no,
                ledger,
                mut hands,
            }) => match third_card::play_out(&mut hands, &mut self.shoe) {
                Ok(draws) => {
                    let snapshot = ShowdownSnapshot::new(round_no, &hands);
                    let outcome = snapshot.outcome;
                    info!(
                        table_id = self.table.id,
                        round_no,
                        player = outcome.player_score,
                        banker = outcome.banker_score,
                        winner = ?outcome.winner,
                        "шоудаун"
                    );
                    self.state = Some(RoundState::Showdown {
                        round_no,
                        ledger,
                        hands,
                        outcome,
                    });
                    vec![self.emit(now_ms, round_no, TableEventKind::HandsRevealed { snapshot, draws })]
                }
                Err(err) => self.abort(
                    now_ms,
                    round_no,
                    err,
                    PendingSettlement::Unfinished {
                        ledger,
                        hands: Some(hands),
                    },
                ),
            },

            Some(RoundState::Showdown {
                round_no,
                ledger,
                hands,
                ..
            }) => self.settle(now_ms, round_no, ledger, hands, store),

            Some(RoundState::Settling {
                round_no,
                resume_at_ms,
            }) => {
                self.state = Some(RoundState::Cooldown {
                    round_no,
                    resume_at_ms,
                });
                vec![self.emit(now_ms, round_no, TableEventKind::CooldownStarted { resume_at_ms })]
            }

            Some(RoundState::Cooldown {
                round_no,
                resume_at_ms,
            }) => {
                if now_ms < resume_at_ms {
                    self.state = Some(RoundState::Cooldown {
                        round_no,
                        resume_at_ms,
                    });
                    Vec::new()
                } else if self.table.has_minimum() {
                    self.open_round(now_ms)
                } else {
                    self.go_idle(now_ms, round_no)
                }
            }
        }
    }

    /// Выполнить все назревшие переходы подряд.
    /// Шаг, обнаруживший прошедший дедлайн, переходит сразу, без ожидания следующего тика.
    pub fn advance<R, S>(&mut self, now_ms: u64, rng: &mut R, store: &S) -> Vec<TableEvent>
    where
        R: RandomSource,
        S: BalanceStore + ?Sized,
    {
        let mut all = Vec::new();
        loop {
            let events = self.step(now_ms, rng, store);
            if events.is_empty() {
                return all;
            }
            all.extend(events);
        }
    }

    fn emit(&mut self, now_ms: u64, round_no: RoundNo, kind: TableEventKind) -> TableEvent {
        self.history.push(self.table.id, round_no, now_ms, kind)
    }

    fn open_round(&mut self, now_ms: u64) -> Vec<TableEvent> {
        let round_no = self.table.last_round_no + 1;
        let deadline_ms = now_ms + self.rules.timings.bet_window_ms();

        self.table.last_round_no = round_no;
        self.table.status = TableStatus::Running;
        self.history.clear();
        self.state = Some(RoundState::Betting {
            round_no,
            deadline_ms,
            ledger: BetLedger::new(),
        });

        info!(table_id = self.table.id, round_no, deadline_ms, "окно ставок открыто");
        vec![self.emit(now_ms, round_no, TableEventKind::RoundOpened { deadline_ms })]
    }

    fn go_idle(&mut self, now_ms: u64, round_no: RoundNo) -> Vec<TableEvent> {
        let occupancy = self.table.occupancy();
        self.table.status = TableStatus::Open;
        self.state = None;

        info!(table_id = self.table.id, round_no, occupancy, "участников меньше минимума, стол ждёт");
        vec![self.emit(now_ms, round_no, TableEventKind::TableIdle { occupancy })]
    }

    fn begin_dealing<R: RandomSource>(
        &mut self,
        now_ms: u64,
        round_no: RoundNo,
        ledger: BetLedger,
        rng: &mut R,
    ) -> Vec<TableEvent> {
        let mut events = Vec::new();

        // Шу меняем только здесь – до первой карты раунда.
        match reshuffle_if_needed(&mut self.shoe, self.rules.reshuffle_floor, rng) {
            Ok(true) => {
                let cards_in_shoe = self.shoe.len();
                info!(table_id = self.table.id, round_no, cards_in_shoe, "шу пересобрана");
                events.push(self.emit(now_ms, round_no, TableEventKind::ShoeReshuffled { cards_in_shoe }));
            }
            Ok(false) => {}
            Err(err) => {
                let pending = PendingSettlement::Unfinished { ledger, hands: None };
                events.extend(self.abort(now_ms, round_no, err, pending));
                return events;
            }
        }

        match deal_initial(&mut self.shoe) {
            Ok(hands) => {
                info!(
                    table_id = self.table.id,
                    round_no,
                    bettors = ledger.len(),
                    wagered = %ledger.total_wagered(),
                    "ставки закрыты, раздача"
                );
                let kind = TableEventKind::DealingStarted {
                    player_cards: hands.player.cards.clone(),
                    banker_cards: hands.banker.cards.clone(),
                };
                self.state = Some(RoundState::Dealing {
                    round_no,
                    ledger,
                    hands,
                });
                events.push(self.emit(now_ms, round_no, kind));
            }
            Err(err) => {
                let pending = PendingSettlement::Unfinished { ledger, hands: None };
                events.extend(self.abort(now_ms, round_no, err, pending));
            }
        }
        events
    }

    fn settle<S: BalanceStore + ?Sized>(
        &mut self,
        now_ms: u64,
        round_no: RoundNo,
        ledger: BetLedger,
        hands: BaccaratHands,
        store: &S,
    ) -> Vec<TableEvent> {
        let table_id = self.table.id;
        let batch = match compute_settlement(
            table_id,
            round_no,
            &ledger,
            &hands,
            &self.rules.payouts,
            |p| store.balance(p),
        ) {
            Ok(batch) => batch,
            Err(err) => {
                return self.abort(now_ms, round_no, err, PendingSettlement::Uncomputed { ledger, hands })
            }
        };

        let batch = match apply_batch(batch, store) {
            Ok(batch) => batch,
            Err((err, batch)) => {
                return self.abort(now_ms, round_no, err, PendingSettlement::Unapplied(batch))
            }
        };

        let resume_at_ms = now_ms + self.rules.timings.cooldown_ms();
        self.state = Some(RoundState::Settling {
            round_no,
            resume_at_ms,
        });

        info!(
            table_id,
            round_no,
            records = batch.records.len(),
            cancellations = batch.cancellations.len(),
            house_net = batch.house_net(),
            "раунд рассчитан"
        );
        vec![self.emit(now_ms, round_no, settled_kind(batch))]
    }

    /// Прервать раунд без выплат. Автоматического повтора нет: остаток раунда
    /// кладётся в `aborted` и уходит в событии.
    fn abort(
        &mut self,
        now_ms: u64,
        round_no: RoundNo,
        err: EngineError,
        pending: PendingSettlement,
    ) -> Vec<TableEvent> {
        error!(table_id = self.table.id, round_no, error = %err, "раунд прерван, расчёт не применён");

        let resume_at_ms = now_ms + self.rules.timings.cooldown_ms();
        self.state = Some(RoundState::Settling {
            round_no,
            resume_at_ms,
        });

        let reason = err.to_string();
        self.aborted.push(AbortedRound {
            round_no,
            reason: reason.clone(),
            pending: pending.clone(),
        });
        vec![self.emit(now_ms, round_no, TableEventKind::RoundAborted { reason, pending })]
    }

    // ---------- прерванные раунды ----------

    /// Повторить расчёт самого старого прерванного раунда, который можно довести до выплат.
    ///
    /// `Ok(None)` – повторять нечего. При ошибке раунд остаётся в `aborted`.
    pub fn retry_aborted<S>(&mut self, now_ms: u64, store: &S) -> Result<Option<TableEvent>, EngineError>
    where
        S: BalanceStore + ?Sized,
    {
        let Some(idx) = self.aborted.iter().position(AbortedRound::is_retryable) else {
            return Ok(None);
        };
        let round_no = self.aborted[idx].round_no;

        let batch = match &self.aborted[idx].pending {
            PendingSettlement::Uncomputed { ledger, hands } => compute_settlement(
                self.table.id,
                round_no,
                ledger,
                hands,
                &self.rules.payouts,
                |p| store.balance(p),
            )?,
            PendingSettlement::Unapplied(batch) => batch.clone(),
            PendingSettlement::Unfinished { .. } => return Ok(None),
        };
        let batch = apply_batch(batch, store).map_err(|(err, _)| err)?;

        self.aborted.remove(idx);
        info!(table_id = self.table.id, round_no, house_net = batch.house_net(), "прерванный раунд рассчитан повторно");
        Ok(Some(self.emit(now_ms, round_no, settled_kind(batch))))
    }

    /// Забрать все прерванные раунды (передать на ручной разбор).
    pub fn take_aborted(&mut self) -> Vec<AbortedRound> {
        std::mem::take(&mut self.aborted)
    }
}

/// Отдать пакет хранилищу и учесть участников, которых оно аннулировало.
/// При сбое хранилища пакет возвращается вместе с ошибкой.
fn apply_batch<S: BalanceStore + ?Sized>(
    mut batch: SettlementBatch,
    store: &S,
) -> Result<SettlementBatch, (EngineError, SettlementBatch)> {
    match store.apply_settlement(&batch) {
        Ok(voided) => {
            batch.apply_cancellations(voided);
            Ok(batch)
        }
        Err(err) => Err((err.into(), batch)),
    }
}

fn settled_kind(batch: SettlementBatch) -> TableEventKind {
    TableEventKind::RoundSettled {
        winners: batch.winners(),
        house_net: batch.house_net(),
        deltas: batch.deltas,
        cancellations: batch.cancellations,
    }
}
