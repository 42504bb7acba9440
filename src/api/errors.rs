use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ParticipantId, TableId};
use crate::engine::EngineError;
use crate::infra::persistence::StoreError;

/// Ошибки внешнего API (то, что отдаём фронту / клиенту).
/// У каждого варианта стабильный код, см. `code()`.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApiError {
    /// Неправильные входные данные.
    #[error("неверный запрос: {0}")]
    BadRequest(String),

    #[error("стол {0} не найден")]
    TableNotFound(TableId),

    #[error("стол {0} уже открыт")]
    TableAlreadyOpen(TableId),

    #[error("участник {0} не сидит за столом")]
    NotSeated(ParticipantId),

    #[error("участник {0} уже сидит за столом")]
    AlreadySeated(ParticipantId),

    #[error("стол {0} заполнен")]
    TableFull(TableId),

    /// Окно ставок закрыто.
    #[error("ставки не принимаются")]
    BettingClosed,

    #[error("недопустимая ставка: {0}")]
    InvalidBet(String),

    #[error("у участника {0} нет ставки для корректировки")]
    NoActiveTarget(ParticipantId),


    /// Внешнее хранилище недоступно, можно повторить позже.
    #[error("сервис временно недоступен: {0}")]
    Unavailable(String),

    /// Внутренняя ошибка сервера.
    #[error("внутренняя ошибка: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::TableNotFound(_) => "TABLE_NOT_FOUND",
            ApiError::TableAlreadyOpen(_) => "TABLE_ALREADY_OPEN",
            ApiError::NotSeated(_) => "NOT_SEATED",
            ApiError::AlreadySeated(_) => "ALREADY_SEATED",
            ApiError::TableFull(_) => "TABLE_FULL",
            ApiError::BettingClosed => "BETTING_CLOSED",
            ApiError::InvalidBet(_) => "INVALID_BET",
            ApiError::NoActiveTarget(_) => "NO_ACTIVE_TARGET",
            ApiError::Unavailable(_) => "UNAVAILABLE",
            ApiError::Internal(_) => "INTERNAL",
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::TableNotFound(id) => ApiError::TableNotFound(id),
            EngineError::TableAlreadyOpen(id) => ApiError::TableAlreadyOpen(id),
            EngineError::InvalidAmount(msg) => ApiError::InvalidBet(msg),
            EngineError::NotAcceptingBets => ApiError::BettingClosed,
            EngineError::NoActiveTarget(p) => ApiError::NoActiveTarget(p),
            EngineError::NotSeated(p) => ApiError::NotSeated(p),
            EngineError::AlreadySeated(p) => ApiError::AlreadySeated(p),
            EngineError::TableFull(id) => ApiError::TableFull(id),
            EngineError::InvalidConfig(msg) => ApiError::BadRequest(msg),
            EngineError::Store(e) => e.into(),
            e @ (EngineError::EmptyShoe | EngineError::Internal(_)) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            e @ StoreError::Unavailable(_) => ApiError::Unavailable(e.to_string()),
            e @ (StoreError::BalanceOverflow { .. } | StoreError::Serialization(_)) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}
