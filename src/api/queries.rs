use serde::{Deserialize, Serialize};

use crate::domain::hand::{BaccaratOutcome, Hand};
use crate::domain::{ParticipantId, TableId};
use crate::engine::round_machine::RoundMachine;
use crate::engine::round_state::RoundState;
use crate::engine::settlement::SettlementRecord;
use crate::engine::RandomSource;
use crate::runtime::TableManager;
use crate::time_ctrl::remaining_ms;

use super::dto::{BetTotalDto, HandDto, OutcomeDto, SettlementRecordDto, TableViewDto};
use super::errors::ApiError;

/// Запросы "только чтение".
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Query {
    /// Состояние стола.
    GetTable { table_id: TableId },

    /// Все столы (для лобби).
    ListTables,

    /// Баланс участника.
    GetBalance { participant: ParticipantId },

    /// История ставок участника, самые свежие первыми.
    GetHistory { participant: ParticipantId, limit: usize },
}

/// Результат запроса "только чтение".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum QueryResponse {
    Table(TableViewDto),
    Tables(Vec<TableViewDto>),
    Balance {
        participant: ParticipantId,
        /// None – участник неизвестен.
        balance: Option<i64>,
    },
    History(Vec<SettlementRecordDto>),
}

pub async fn run_query<R>(manager: &TableManager<R>, query: Query) -> Result<QueryResponse, ApiError>
where
    R: RandomSource + Send + 'static,
{
    match query {
        Query::GetTable { table_id } => Ok(QueryResponse::Table(table_view(manager, table_id).await?)),
        Query::ListTables => {
            let mut views = Vec::new();
            for id in manager.table_ids() {
                views.push(table_view(manager, id).await?);
            }
            Ok(QueryResponse::Tables(views))
        }
        Query::GetBalance { participant } => Ok(QueryResponse::Balance {
            participant,
            balance: manager.balances().balance(participant)?,
        }),
        Query::GetHistory { participant, limit } => {
            let records = manager.balances().history_for(participant)?;
            Ok(QueryResponse::History(
                records.iter().rev().take(limit).map(build_record_dto).collect(),
            ))
        }
    }
}

/// DTO стола через его драйвер.
pub async fn table_view<R>(manager: &TableManager<R>, table_id: TableId) -> Result<TableViewDto, ApiError>
where
    R: RandomSource + Send + 'static,
{
    let driver = manager.driver(table_id)?;
    let now = driver.now_ms();
    Ok(driver.with_machine(|m| build_table_view(m, now)).await)
}

/// Сформировать DTO стола по машине раундов на момент `now_ms`.
pub fn build_table_view(machine: &RoundMachine, now_ms: u64) -> TableViewDto {
    let table = &machine.table;
    let state = machine.state.as_ref();

    let ledger = state.and_then(RoundState::ledger);
    let bet_totals = ledger
        .map(|l| {
            l.totals_by_category()
                .into_iter()
                .map(|(category, total)| BetTotalDto {
                    category: category.key().to_string(),
                    total,
                })
                .collect()
        })
        .unwrap_or_default();

    let hands = state.and_then(RoundState::hands);
    let outcome = match state {
        Some(RoundState::Showdown { outcome, .. }) => Some(build_outcome_dto(outcome)),
        _ => None,
    };

    TableViewDto {
        table_id: table.id,
        name: table.name.clone(),
        status: table.status,
        phase: machine.phase(),
        round_no: machine.round_no(),
        last_round_no: table.last_round_no,
        participants: table.participants.iter().copied().collect(),
        min_participants: table.config.min_participants as u32,
        max_participants: table.config.max_participants as u32,
        seconds_left: state
            .and_then(RoundState::wake_at_ms)
            .map(|wake| remaining_ms(wake, now_ms).div_ceil(1_000)),
        deck_count: machine.shoe.deck_count() as u32,
        cards_in_shoe: machine.shoe.len() as u32,
        bet_totals,
        total_wagered: ledger.map(|l| l.total_wagered()).unwrap_or_default(),
        bettors: ledger.map(|l| l.len() as u32).unwrap_or(0),
        player_hand: hands.map(|h| build_hand_dto(&h.player)),
        banker_hand: hands.map(|h| build_hand_dto(&h.banker)),
        outcome,
        aborted_rounds: machine.aborted.iter().map(|a| a.round_no).collect(),
    }
}

fn build_hand_dto(hand: &Hand) -> HandDto {
    HandDto {
        cards: hand.cards.iter().map(|c| c.to_string()).collect(),
        score: hand.baccarat_score() as u32,
    }
}

fn build_outcome_dto(outcome: &BaccaratOutcome) -> OutcomeDto {
    OutcomeDto {
        player_score: outcome.player_score as u32,
        banker_score: outcome.banker_score as u32,
        winner: outcome.winner,
        player_pair: outcome.player_pair,
        banker_pair: outcome.banker_pair,
    }
}

pub fn build_record_dto(record: &SettlementRecord) -> SettlementRecordDto {
    let outcome = &record.snapshot.outcome;
    SettlementRecordDto {
        table_id: record.table_id,
        round_no: record.round_no,
        participant: record.participant,
        category: record.category.key().to_string(),
        wager: record.wager,
        multiplier: record.multiplier,
        payout: record.payout,
        delta: record.delta,
        winner: outcome.winner,
        player_score: outcome.player_score as u32,
        banker_score: outcome.banker_score as u32,
    }
}
