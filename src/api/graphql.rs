//! GraphQL-схема лобби поверх DTO столов (только чтение).

use async_graphql::{EmptyMutation, EmptySubscription, Object, Schema};

use crate::domain::TableId;
use crate::engine::round_state::RoundPhase;
use crate::engine::RandomSource;
use crate::runtime::TableManager;

use super::dto::TableViewDto;
use super::errors::ApiError;
use super::queries::table_view;

/// Корневой Query: срез всех столов на момент построения схемы.
pub struct LobbyQuery {
    tables: Vec<TableViewDto>,
}

#[Object]
impl LobbyQuery {
    async fn tables(&self) -> Vec<TableViewDto> {
        self.tables.clone()
    }

    async fn table(&self, table_id: TableId) -> Option<TableViewDto> {
        self.tables.iter().find(|t| t.table_id == table_id).cloned()
    }

    /// Столы, где сейчас открыто окно ставок.
    async fn open_for_bets(&self) -> Vec<TableViewDto> {
        self.tables
            .iter()
            .filter(|t| t.phase == Some(RoundPhase::Betting))
            .cloned()
            .collect()
    }
}

pub type LobbySchema = Schema<LobbyQuery, EmptyMutation, EmptySubscription>;

pub fn build_lobby_schema(tables: Vec<TableViewDto>) -> LobbySchema {
    Schema::build(LobbyQuery { tables }, EmptyMutation, EmptySubscription).finish()
}

/// Схема по текущему состоянию всех столов менеджера.
pub async fn lobby_schema<R>(manager: &TableManager<R>) -> Result<LobbySchema, ApiError>
where
    R: RandomSource + Send + 'static,
{
    let mut tables = Vec::new();
    for id in manager.table_ids() {
        tables.push(table_view(manager, id).await?);
    }
    Ok(build_lobby_schema(tables))
}
