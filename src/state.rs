use serde::{Deserialize, Serialize};

use crate::domain::shoe::Shoe;
use crate::domain::table::Table;
use crate::engine::errors::EngineError;
use crate::engine::round_machine::{RoundMachine, RoundRules};
use crate::engine::round_state::{AbortedRound, RoundState};
use crate::infra::persistence::StoreError;

/// Версия формата снапшота. Поднимаем при несовместимых изменениях.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Снапшот стола: всё, что нужно, чтобы восстановить `RoundMachine` после рестарта.
///
/// История событий раунда в снапшот не входит: события уже разосланы.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableSnapshot {
    pub version: u32,
    pub table: Table,
    pub shoe: Shoe,
    pub state: Option<RoundState>,
    pub rules: RoundRules,
    /// Прерванные раунды без разбора оператора.
    #[serde(default)]
    pub aborted: Vec<AbortedRound>,
    pub saved_at_ms: u64,
}

impl TableSnapshot {
    /// Упаковать живую машину в снапшот.
    pub fn from_machine(machine: &RoundMachine, saved_at_ms: u64) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            table: machine.table.clone(),
            shoe: machine.shoe.clone(),
            state: machine.state.clone(),
            rules: machine.rules.clone(),
            aborted: machine.aborted.clone(),
            saved_at_ms,
        }
    }

    /// Развернуть снапшот обратно в машину.
    pub fn into_machine(self) -> Result<RoundMachine, EngineError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(EngineError::InvalidConfig(format!(
                "неподдерживаемая версия снапшота {}",
                self.version
            )));
        }
        let mut machine = RoundMachine::restore(self.table, self.shoe, self.state, self.rules)?;
        machine.aborted = self.aborted;
        Ok(machine)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}
