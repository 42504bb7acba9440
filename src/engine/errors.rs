use crate::domain::{ParticipantId, TableId};
use crate::infra::persistence::StoreError;

use thiserror::Error;

/// Ошибки движка столов.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Стол {0} не найден")]
    TableNotFound(TableId),

    #[error("Стол {0} уже открыт")]
    TableAlreadyOpen(TableId),

    #[error("Недопустимая ставка: {0}")]
    InvalidAmount(String),

    #[error("Сейчас ставки не принимаются")]
    NotAcceptingBets,

    #[error("У участника {0} нет ставки в этом раунде, нечего корректировать")]
    NoActiveTarget(ParticipantId),

    #[error("Шу пуста")]
    EmptyShoe,

    #[error("Участник {0} не сидит за столом")]
    NotSeated(ParticipantId),

    #[error("Участник {0} уже сидит за столом")]
    AlreadySeated(ParticipantId),

    #[error("Стол {0} заполнен")]
    TableFull(TableId),

    #[error("Некорректная конфигурация: {0}")]
    InvalidConfig(String),

    #[error("Ошибка хранилища: {0}")]
    Store(#[from] StoreError),

    #[error("Внутренняя ошибка: {0}")]
    Internal(&'static str),
}
