use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::{ParticipantId, TableId};

/// Генерация ID на основе монотонных счётчиков.
#[derive(Debug)]
pub struct IdGenerator {
    table_counter: AtomicU64,
    participant_counter: AtomicU64,
}

impl IdGenerator {
    /// Оба счётчика начинаются с 1.
    pub fn new() -> Self {
        Self::starting_at(1, 1)
    }

    /// Продолжить нумерацию после восстановления из снапшотов.
    pub fn starting_at(next_table: TableId, next_participant: ParticipantId) -> Self {
        Self {
            table_counter: AtomicU64::new(next_table),
            participant_counter: AtomicU64::new(next_participant),
        }
    }

    #[inline]
    pub fn next_table_id(&self) -> TableId {
        self.table_counter.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn next_participant_id(&self) -> ParticipantId {
        self.participant_counter.fetch_add(1, Ordering::Relaxed)
    }

    /// Не выдавать id меньше `id + 1` (после загрузки существующего стола).
    pub fn observe_table_id(&self, id: TableId) {
        self.table_counter.fetch_max(id + 1, Ordering::Relaxed);
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
