// src/runtime/manager.rs

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::info;

use crate::config::CasinoConfig;
use crate::domain::table::{Table, TableConfig};
use crate::domain::TableId;
use crate::engine::errors::EngineError;
use crate::engine::events::TableEvent;
use crate::engine::round_machine::RoundMachine;
use crate::engine::RandomSource;
use crate::infra::ids::IdGenerator;
use crate::infra::persistence::{BalanceStore, TableStore};
use crate::infra::rng::SystemRng;
use crate::state::TableSnapshot;
use crate::time_ctrl::Clock;

use super::driver::{DriverDeps, TableDriver};

/// Ёмкость канала событий: отстающий подписчик теряет старые события.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Менеджер столов:
/// - владеет драйверами столов по TableId;
/// - раздаёт им общие зависимости (балансы, снапшоты, часы, канал событий);
/// - открывает новые столы по конфигурации и поднимает сохранённые.
pub struct TableManager<R = SystemRng> {
    config: CasinoConfig,
    ids: IdGenerator,
    drivers: HashMap<TableId, TableDriver<R>>,
    deps: DriverDeps,
}

impl<R> TableManager<R>
where
    R: RandomSource + Send + 'static,
{
    /// Конфигурация проверяется здесь: дальше столы открываются без ошибок конфигурации.
    pub fn new(
        config: CasinoConfig,
        balances: Arc<dyn BalanceStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, EngineError> {
        config
            .validate()
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            config,
            ids: IdGenerator::new(),
            drivers: HashMap::new(),
            deps: DriverDeps {
                balances,
                tables: None,
                clock,
                events,
            },
        })
    }

    /// Сохранять снапшоты столов после каждого тика с событиями.
    pub fn with_table_store(mut self, store: Arc<dyn TableStore>) -> Self {
        self.deps.tables = Some(store);
        self
    }

    pub fn config(&self) -> &CasinoConfig {
        &self.config
    }

    pub fn balances(&self) -> &Arc<dyn BalanceStore> {
        &self.deps.balances
    }

    pub fn now_ms(&self) -> u64 {
        self.deps.clock.now_ms()
    }

    /// Подписка на события всех столов менеджера.
    pub fn subscribe(&self) -> broadcast::Receiver<TableEvent> {
        self.deps.events.subscribe()
    }

    fn tick(&self) -> Duration {
        Duration::from_millis(self.config.tick_ms)
    }

    /// Открыть новый стол баккары по текущей конфигурации. Драйвер не запускается.
    pub fn open_table(&mut self, name: impl Into<String>, mut rng: R) -> Result<TableId, EngineError> {
        let id = self.ids.next_table_id();
        let bac = &self.config.baccarat;
        let table = Table::new(
            id,
            name.into(),
            TableConfig::new(bac.min_participants, bac.max_participants),
        );
        let machine = RoundMachine::new(table, bac.deck_count, self.config.round_rules(), &mut rng)?;

        let deck_count = bac.deck_count;
        self.insert(machine, rng)?;
        info!(table_id = id, decks = deck_count, "стол открыт");
        Ok(id)
    }

    /// Поднять стол из сохранённого снапшота. Правила берутся из снапшота, не из конфигурации.
    pub fn resume_table(&mut self, id: TableId, rng: R) -> Result<TableId, EngineError> {
        let store = self
            .deps
            .tables
            .as_ref()
            .ok_or_else(|| EngineError::InvalidConfig("хранилище снапшотов не подключено".into()))?;
        let snapshot = store.load_table(id)?.ok_or(EngineError::TableNotFound(id))?;
        self.restore_table(snapshot, rng)
    }

    /// Поднять стол из готового снапшота (например, прочитанного из файла).
    pub fn restore_table(&mut self, snapshot: TableSnapshot, rng: R) -> Result<TableId, EngineError> {
        let machine = snapshot.into_machine()?;
        let id = machine.table_id();
        let (round_no, phase) = (machine.table.last_round_no, machine.phase());
        self.insert(machine, rng)?;
        self.ids.observe_table_id(id);

        info!(table_id = id, round_no, phase = ?phase, "стол восстановлен");
        Ok(id)
    }

    /// Открытый стол с тем же id не заменяется.
    fn insert(&mut self, machine: RoundMachine, rng: R) -> Result<(), EngineError> {
        let id = machine.table_id();
        if self.drivers.contains_key(&id) {
            return Err(EngineError::TableAlreadyOpen(id));
        }
        let driver = TableDriver::new(machine, rng, self.deps.clone(), self.tick());
        self.drivers.insert(id, driver);
        Ok(())
    }

    pub fn driver(&self, id: TableId) -> Result<&TableDriver<R>, EngineError> {
        self.drivers.get(&id).ok_or(EngineError::TableNotFound(id))
    }

    pub fn has_table(&self, id: TableId) -> bool {
        self.drivers.contains_key(&id)
    }

    /// Id столов по возрастанию.
    pub fn table_ids(&self) -> Vec<TableId> {
        let mut ids: Vec<TableId> = self.drivers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Запустить драйвер стола. false – уже работал.
    pub async fn start_table(&self, id: TableId) -> Result<bool, EngineError> {
        Ok(self.driver(id)?.start().await)
    }

    pub async fn start_all(&self) {
        for id in self.table_ids() {
            if let Some(driver) = self.drivers.get(&id) {
                driver.start().await;
            }
        }
    }

    pub async fn stop_all(&self) {
        for driver in self.drivers.values() {
            driver.stop().await;
        }
    }

    /// Закрыть стол: остановить драйвер и вернуть последний снапшот.
    pub async fn close_table(&mut self, id: TableId) -> Result<TableSnapshot, EngineError> {
        let driver = self.drivers.remove(&id).ok_or(EngineError::TableNotFound(id))?;
        driver.stop().await;
        let snapshot = driver.snapshot().await;
        if let Some(store) = &self.deps.tables {
            store.save_table(&snapshot)?;
        }
        info!(table_id = id, "стол закрыт");
        Ok(snapshot)
    }
}
