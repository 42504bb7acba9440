use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{ParticipantId, TableId};
use crate::engine::settlement::{CancelReason, Cancellation, SettlementBatch, SettlementRecord};
use crate::state::TableSnapshot;

/// Ошибки внешних хранилищ.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("баланс участника {participant} переполнился бы: {balance} {delta:+}")]
    BalanceOverflow {
        participant: ParticipantId,
        balance: i64,
        delta: i64,
    },

    #[error("хранилище недоступно: {0}")]
    Unavailable(String),

    #[error("ошибка сериализации: {0}")]
    Serialization(String),
}

/// Балансы участников. Движок только читает баланс и отдаёт пакет расчёта.
///
/// Столы делят одно хранилище, поэтому покрытие ставок окончательно проверяется
/// в `apply_settlement`, под той же блокировкой, что и запись:
/// - участник неизвестен или его баланс меньше `stake` – он аннулируется,
///   его дельта и записи не применяются, остальные применяются;
/// - аннулирования возвращаются вызывающему;
/// - `Err` – сбой самого хранилища, тогда не применяется ничего.
pub trait BalanceStore: Send + Sync {
    /// `Ok(None)` – участник хранилищу неизвестен.
    fn balance(&self, participant: ParticipantId) -> Result<Option<i64>, StoreError>;

    fn apply_settlement(&self, batch: &SettlementBatch) -> Result<Vec<Cancellation>, StoreError>;

    /// Записи расчётов участника, самые свежие в конце.
    /// Хранилище без истории возвращает пустой список.
    fn history_for(&self, _participant: ParticipantId) -> Result<Vec<SettlementRecord>, StoreError> {
        Ok(Vec::new())
    }
}

/// Снапшоты столов для восстановления после рестарта.
pub trait TableStore: Send + Sync {
    fn save_table(&self, snapshot: &TableSnapshot) -> Result<(), StoreError>;

    fn load_table(&self, id: TableId) -> Result<Option<TableSnapshot>, StoreError>;
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Unavailable("мьютекс хранилища отравлен".into()))
}

#[derive(Debug, Default)]
struct Accounts {
    balances: HashMap<ParticipantId, i64>,
    history: Vec<SettlementRecord>,
}

/// In-memory балансы для тестов и локального запуска. Хранит историю расчётов.
#[derive(Debug, Default)]
pub struct InMemoryBalanceStore {
    inner: Mutex<Accounts>,
}

impl InMemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Завести счёт (если его нет) и пополнить его. Возвращает новый баланс.
    pub fn deposit(&self, participant: ParticipantId, amount: i64) -> Result<i64, StoreError> {
        let mut accounts = lock(&self.inner)?;
        let balance = accounts.balances.entry(participant).or_insert(0);
        *balance = balance.saturating_add(amount);
        Ok(*balance)
    }

    /// Все записи расчётов в порядке применения.
    pub fn history(&self) -> Result<Vec<SettlementRecord>, StoreError> {
        Ok(lock(&self.inner)?.history.clone())
    }
}

impl BalanceStore for InMemoryBalanceStore {
    fn balance(&self, participant: ParticipantId) -> Result<Option<i64>, StoreError> {
        Ok(lock(&self.inner)?.balances.get(&participant).copied())
    }

    fn apply_settlement(&self, batch: &SettlementBatch) -> Result<Vec<Cancellation>, StoreError> {
        let mut accounts = lock(&self.inner)?;

        // Сначала проверяем весь пакет, потом пишем.
        let mut voided = Vec::new();
        let mut updated = Vec::with_capacity(batch.deltas.len());
        for d in &batch.deltas {
            let reason = match accounts.balances.get(&d.participant).copied() {
                None => Some(CancelReason::UnknownAccount),
                Some(balance) => {
                    let next = balance.checked_add(d.delta).ok_or(StoreError::BalanceOverflow {
                        participant: d.participant,
                        balance,
                        delta: d.delta,
                    })?;
                    if balance < d.stake.as_signed() || next < 0 {
                        Some(CancelReason::InsufficientFunds { balance })
                    } else {
                        updated.push((d.participant, next));
                        None
                    }
                }
            };
            if let Some(reason) = reason {
                voided.push(Cancellation {
                    participant: d.participant,
                    stake: d.stake,
                    reason,
                });
            }
        }

        for (participant, next) in updated {
            accounts.balances.insert(participant, next);
        }
        accounts.history.extend(
            batch
                .records
                .iter()
                .filter(|r| !voided.iter().any(|c| c.participant == r.participant))
                .cloned(),
        );

        if !voided.is_empty() {
            warn!(
                table_id = batch.table_id,
                round_no = batch.round_no,
                voided = voided.len(),
                "при применении расчёта аннулированы участники без покрытия"
            );
        }
        debug!(
            table_id = batch.table_id,
            round_no = batch.round_no,
            deltas = batch.deltas.len() - voided.len(),
            "пакет расчёта применён"
        );
        Ok(voided)
    }

    fn history_for(&self, participant: ParticipantId) -> Result<Vec<SettlementRecord>, StoreError> {
        Ok(lock(&self.inner)?
            .history
            .iter()
            .filter(|r| r.participant == participant)
            .cloned()
            .collect())
    }
}

/// In-memory снапшоты столов, хранятся как JSON.
#[derive(Debug, Default)]
pub struct InMemoryTableStore {
    tables: Mutex<HashMap<TableId, String>>,
}

impl InMemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Сырой JSON снапшота (для отладки).
    pub fn raw(&self, id: TableId) -> Result<Option<String>, StoreError> {
        Ok(lock(&self.tables)?.get(&id).cloned())
    }
}

impl TableStore for InMemoryTableStore {
    fn save_table(&self, snapshot: &TableSnapshot) -> Result<(), StoreError> {
        let json = snapshot.to_json()?;
        lock(&self.tables)?.insert(snapshot.table.id, json);
        Ok(())
    }

    fn load_table(&self, id: TableId) -> Result<Option<TableSnapshot>, StoreError> {
        match lock(&self.tables)?.get(&id) {
            Some(json) => TableSnapshot::from_json(json).map(Some),
            None => Ok(None),
        }
    }
}
