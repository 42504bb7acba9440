use serde::{Deserialize, Serialize};

use crate::domain::bet::BetCategory;
use crate::domain::{ParticipantId, TableId};
use crate::engine::RandomSource;
use crate::runtime::TableManager;

use super::dto::{BetReceiptDto, CommandResponse};
use super::errors::ApiError;
use super::queries::table_view;

/// Команда верхнего уровня.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Command {
    /// Открыть новый стол баккары по текущей конфигурации и запустить его драйвер.
    OpenTable(OpenTableCommand),

    /// Закрыть стол (драйвер останавливается, снапшот сохраняется).
    CloseTable { table_id: TableId },

    /// Операция над существующим столом.
    TableCommand(TableCommand),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OpenTableCommand {
    /// Имя стола (отображается в лобби).
    pub name: String,
}

/// Команды, которые относятся к существующему столу.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TableCommand {
    /// Сесть за стол.
    Join(SeatCommand),

    /// Встать из-за стола. Ставки текущего раунда остаются в силе.
    Leave(SeatCommand),

    /// Поставить на категорию (ставки копятся).
    PlaceBet(PlaceBetCommand),

    /// Изменить последнюю ставку на `delta` (не ниже нуля).
    AdjustLastBet(AdjustLastBetCommand),

    /// Снять все свои ставки текущего раунда.
    ClearBets(SeatCommand),

    /// Операторская: повторить расчёт самого старого прерванного раунда.
    RetryAbortedRound { table_id: TableId },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeatCommand {
    pub table_id: TableId,
    pub participant: ParticipantId,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlaceBetCommand {
    pub table_id: TableId,
    pub participant: ParticipantId,
    /// PLAYER, BANKER, TIE, PLAYER_PAIR, BANKER_PAIR (регистр не важен).
    pub category: String,
    pub amount: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdjustLastBetCommand {
    pub table_id: TableId,
    pub participant: ParticipantId,
    pub delta: i64,
}

/// Выполнить команду на менеджере столов.
/// RNG нового стола создаётся через `Default` (для `SystemRng` – thread RNG).
pub async fn execute<R>(manager: &mut TableManager<R>, command: Command) -> Result<CommandResponse, ApiError>
where
    R: RandomSource + Default + Send + 'static,
{
    match command {
        Command::OpenTable(cmd) => {
            let name = cmd.name.trim();
            if name.is_empty() {
                return Err(ApiError::BadRequest("имя стола не может быть пустым".into()));
            }
            let table_id = manager.open_table(name, R::default())?;
            manager.start_table(table_id).await?;
            Ok(CommandResponse::TableCreated(table_view(manager, table_id).await?))
        }

        Command::CloseTable { table_id } => {
            let snapshot = manager.close_table(table_id).await?;
            Ok(CommandResponse::TableClosed {
                table_id,
                last_round_no: snapshot.table.last_round_no,
            })
        }

        Command::TableCommand(cmd) => execute_table_command(manager, cmd).await,
    }
}

async fn execute_table_command<R>(
    manager: &TableManager<R>,
    command: TableCommand,
) -> Result<CommandResponse, ApiError>
where
    R: RandomSource + Send + 'static,
{
    match command {
        TableCommand::Join(SeatCommand {
            table_id,
            participant,
        }) => {
            manager.driver(table_id)?.join(participant).await?;
            Ok(CommandResponse::TableState(table_view(manager, table_id).await?))
        }

        TableCommand::Leave(SeatCommand {
            table_id,
            participant,
        }) => {
            manager.driver(table_id)?.leave(participant).await?;
            Ok(CommandResponse::TableState(table_view(manager, table_id).await?))
        }

        TableCommand::PlaceBet(PlaceBetCommand {
            table_id,
            participant,
            category,
            amount,
        }) => {
            let driver = manager.driver(table_id)?;
            let parsed: BetCategory = category.parse().map_err(ApiError::InvalidBet)?;
            let total = driver.place_bet(participant, parsed, amount).await?;
            Ok(CommandResponse::BetAccepted(BetReceiptDto {
                table_id,
                participant,
                category: parsed.key().to_string(),
                total,
            }))
        }

        TableCommand::AdjustLastBet(AdjustLastBetCommand {
            table_id,
            participant,
            delta,
        }) => {
            let (category, total) = manager
                .driver(table_id)?
                .adjust_last_bet(participant, delta)
                .await?;
            Ok(CommandResponse::BetAccepted(BetReceiptDto {
                table_id,
                participant,
                category: category.key().to_string(),
                total,
            }))
        }

        TableCommand::ClearBets(SeatCommand {
            table_id,
            participant,
        }) => {
            let removed = manager
                .driver(table_id)?
                .clear_participant(participant)
                .await?;
            Ok(CommandResponse::BetsCleared {
                participant,
                removed,
            })
        }

        TableCommand::RetryAbortedRound { table_id } => {
            let event = manager.driver(table_id)?.retry_aborted().await?;
            Ok(CommandResponse::AbortedRoundRetried {
                table_id,
                round_no: event.map(|e| e.round_no),
            })
        }
    }
}
