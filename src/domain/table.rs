use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{ParticipantId, RoundNo, TableId};
use crate::engine::errors::EngineError;

/// Статус стола.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, async_graphql::Enum)]
pub enum TableStatus {
    /// Стол ждёт минимального числа участников, раунда нет.
    Open,
    /// Идёт раунд (или кулдаун между раундами).
    Running,
}

/// Ограничения по рассадке.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableConfig {
    pub min_participants: usize,
    pub max_participants: usize,
}

impl TableConfig {
    pub fn new(min_participants: usize, max_participants: usize) -> Self {
        Self {
            min_participants,
            max_participants,
        }
    }
}

/// Основное состояние стола: ростер и статус.
/// Шу и состояние раунда живут в `RoundMachine`, который владеет столом.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub config: TableConfig,
    pub status: TableStatus,
    /// Кто сейчас за столом.
    pub participants: BTreeSet<ParticipantId>,
    /// Номер последнего открытого раунда (0 – раундов ещё не было).
    pub last_round_no: RoundNo,
}

impl Table {
    /// Создать пустой стол с заданной конфигурацией.
    pub fn new(id: TableId, name: String, config: TableConfig) -> Self {
        Self {
            id,
            name,
            config,
            status: TableStatus::Open,
            participants: BTreeSet::new(),
            last_round_no: 0,
        }
    }

    pub fn occupancy(&self) -> usize {
        self.participants.len()
    }

    pub fn has_minimum(&self) -> bool {
        self.occupancy() >= self.config.min_participants
    }

    pub fn is_seated(&self, participant: ParticipantId) -> bool {
        self.participants.contains(&participant)
    }

    /// Посадить участника. Полный стол и повторная посадка – ошибки.
    pub fn join(&mut self, participant: ParticipantId) -> Result<(), EngineError> {
        if self.is_seated(participant) {
            return Err(EngineError::AlreadySeated(participant));
        }
        if self.occupancy() >= self.config.max_participants {
            return Err(EngineError::TableFull(self.id));
        }
        self.participants.insert(participant);
        Ok(())
    }

    /// Убрать участника. Его ставки текущего раунда остаются в силе.
    pub fn leave(&mut self, participant: ParticipantId) -> Result<(), EngineError> {
        if !self.participants.remove(&participant) {
            return Err(EngineError::NotSeated(participant));
        }
        Ok(())
    }
}
