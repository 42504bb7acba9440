// src/runtime/driver.rs
//! Драйвер одного стола: машина раундов за мьютексом + периодический тик.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, info_span, warn, Instrument};

use crate::domain::bet::BetCategory;
use crate::domain::chips::Chips;
use crate::domain::{ParticipantId, TableId};
use crate::engine::errors::EngineError;
use crate::engine::events::TableEvent;
use crate::engine::round_machine::RoundMachine;
use crate::engine::round_state::AbortedRound;
use crate::engine::RandomSource;
use crate::infra::persistence::{BalanceStore, TableStore};
use crate::state::TableSnapshot;
use crate::time_ctrl::Clock;

/// Общие для всех столов менеджера зависимости.
#[derive(Clone)]
pub struct DriverDeps {
    pub balances: Arc<dyn BalanceStore>,
    pub tables: Option<Arc<dyn TableStore>>,
    pub clock: Arc<dyn Clock>,
    pub events: broadcast::Sender<TableEvent>,
}

struct TableCore<R> {
    machine: RoundMachine,
    rng: R,
}

/// Всё, что меняет стол (тик, ставки, ростер), идёт через один мьютекс.
pub struct TableDriver<R> {
    table_id: TableId,
    core: Arc<Mutex<TableCore<R>>>,
    deps: DriverDeps,
    tick: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<R> TableDriver<R>
where
    R: RandomSource + Send + 'static,
{
    pub fn new(machine: RoundMachine, rng: R, deps: DriverDeps, tick: Duration) -> Self {
        Self {
            table_id: machine.table_id(),
            core: Arc::new(Mutex::new(TableCore { machine, rng })),
            deps,
            tick,
            task: Mutex::new(None),
        }
    }

    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    /// Запустить периодический тик. Повторный запуск ничего не делает и возвращает false.
    pub async fn start(&self) -> bool {
        let mut task = self.task.lock().await;
        if task.as_ref().is_some_and(|h| !h.is_finished()) {
            return false;
        }

        let core = Arc::clone(&self.core);
        let deps = self.deps.clone();
        let period = self.tick;
        let span = info_span!("table", table_id = self.table_id);

        *task = Some(tokio::spawn(
            async move {
                info!(tick_ms = period.as_millis() as u64, "драйвер стола запущен");
                let mut interval = time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    interval.tick().await;
                    run_tick(&core, &deps).await;
                }
            }
            .instrument(span),
        ));
        true
    }

    /// Остановить тик. Состояние стола не трогается.
    pub async fn stop(&self) -> bool {
        match self.task.lock().await.take() {
            Some(handle) => {
                handle.abort();
                info!(table_id = self.table_id, "драйвер стола остановлен");
                true
            }
            None => false,
        }
    }

    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Внеочередной тик (тесты, ручное управление).
    pub async fn tick_now(&self) -> Vec<TableEvent> {
        run_tick(&self.core, &self.deps).await
    }

    pub async fn join(&self, participant: ParticipantId) -> Result<(), EngineError> {
        self.core.lock().await.machine.join(participant)
    }

    pub async fn leave(&self, participant: ParticipantId) -> Result<(), EngineError> {
        self.core.lock().await.machine.leave(participant)
    }

    pub async fn place_bet(
        &self,
        participant: ParticipantId,
        category: BetCategory,
        amount: i64,
    ) -> Result<Chips, EngineError> {
        let now = self.deps.clock.now_ms();
        let result = self
            .core
            .lock()
            .await
            .machine
            .place_bet(now, participant, category, amount);
        if let Err(err) = &result {
            info!(table_id = self.table_id, participant, %category, amount, error = %err, "ставка отклонена");
        }
        result
    }

    pub async fn place_bet_by_key(
        &self,
        participant: ParticipantId,
        key: &str,
        amount: i64,
    ) -> Result<Chips, EngineError> {
        let category: BetCategory = key.parse().map_err(EngineError::InvalidAmount)?;
        self.place_bet(participant, category, amount).await
    }

    pub async fn adjust_last_bet(
        &self,
        participant: ParticipantId,
        delta: i64,
    ) -> Result<(BetCategory, Chips), EngineError> {
        let now = self.deps.clock.now_ms();
        self.core
            .lock()
            .await
            .machine
            .adjust_last_bet(now, participant, delta)
    }

    pub async fn clear_participant(&self, participant: ParticipantId) -> Result<bool, EngineError> {
        let now = self.deps.clock.now_ms();
        self.core
            .lock()
            .await
            .machine
            .clear_participant(now, participant)
    }

    /// Повторить расчёт самого старого прерванного раунда. Событие расчёта
    /// рассылается подписчикам, снапшот обновляется.
    pub async fn retry_aborted(&self) -> Result<Option<TableEvent>, EngineError> {
        let mut guard = self.core.lock().await;
        let now = self.deps.clock.now_ms();
        let event = guard.machine.retry_aborted(now, self.deps.balances.as_ref())?;
        if let Some(event) = &event {
            publish(&guard.machine, &self.deps, now, std::slice::from_ref(event));
        }
        Ok(event)
    }

    /// Забрать прерванные раунды на ручной разбор.
    pub async fn take_aborted(&self) -> Vec<AbortedRound> {
        let mut guard = self.core.lock().await;
        let taken = guard.machine.take_aborted();
        if !taken.is_empty() {
            info!(table_id = self.table_id, rounds = taken.len(), "прерванные раунды переданы оператору");
            publish(&guard.machine, &self.deps, self.deps.clock.now_ms(), &[]);
        }
        taken
    }

    /// Прочитать машину под мьютексом.
    pub async fn with_machine<T>(&self, f: impl FnOnce(&RoundMachine) -> T) -> T {
        f(&self.core.lock().await.machine)
    }

    pub async fn snapshot(&self) -> TableSnapshot {
        let now = self.deps.clock.now_ms();
        TableSnapshot::from_machine(&self.core.lock().await.machine, now)
    }

    pub fn now_ms(&self) -> u64 {
        self.deps.clock.now_ms()
    }
}

impl<R> Drop for TableDriver<R> {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}

/// Один тик: все назревшие переходы, рассылка событий, снапшот.
async fn run_tick<R: RandomSource>(core: &Mutex<TableCore<R>>, deps: &DriverDeps) -> Vec<TableEvent> {
    let mut guard = core.lock().await;
    let TableCore { machine, rng } = &mut *guard;

    let now = deps.clock.now_ms();
    let events = machine.advance(now, rng, deps.balances.as_ref());
    if !events.is_empty() {
        publish(machine, deps, now, &events);
    }
    events
}

/// Разослать события и сохранить снапшот стола.
fn publish(machine: &RoundMachine, deps: &DriverDeps, now: u64, events: &[TableEvent]) {
    for event in events {
        // Нет подписчиков – не ошибка.
        let _ = deps.events.send(event.clone());
    }

    if let Some(store) = &deps.tables {
        let snapshot = TableSnapshot::from_machine(machine, now);
        if let Err(err) = store.save_table(&snapshot) {
            warn!(table_id = machine.table_id(), error = %err, "не удалось сохранить снапшот стола");
        }
    }
}
