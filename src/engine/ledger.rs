use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::bet::{BetCategory, MainBet, SideBet};
use crate::domain::chips::Chips;
use crate::domain::ParticipantId;
use crate::engine::errors::EngineError;

/// Ставки одного участника в текущем раунде.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParticipantBets {
    /// Основные исходы. Можно ставить сразу на несколько (хедж разрешён).
    pub main: BTreeMap<MainBet, Chips>,
    /// Побочные ставки.
    pub side: BTreeMap<SideBet, Chips>,
    /// Последняя тронутая категория – цель для `adjust_last_bet`.
    pub last_target: Option<BetCategory>,
}

impl ParticipantBets {
    pub fn amount(&self, category: BetCategory) -> Chips {
        match category {
            BetCategory::Main(m) => self.main.get(&m).copied().unwrap_or(Chips::ZERO),
            BetCategory::Side(s) => self.side.get(&s).copied().unwrap_or(Chips::ZERO),
        }
    }

    fn slot_mut(&mut self, category: BetCategory) -> &mut Chips {
        match category {
            BetCategory::Main(m) => self.main.entry(m).or_insert(Chips::ZERO),
            BetCategory::Side(s) => self.side.entry(s).or_insert(Chips::ZERO),
        }
    }

    /// Сумма всех ставок участника по всем категориям.
    pub fn total_stake(&self) -> Chips {
        self.main
            .values()
            .chain(self.side.values())
            .fold(Chips::ZERO, |acc, c| acc + *c)
    }

    /// Ненулевые ставки в фиксированном порядке категорий.
    pub fn wagers(&self) -> impl Iterator<Item = (BetCategory, Chips)> + '_ {
        BetCategory::ALL
            .into_iter()
            .map(|c| (c, self.amount(c)))
            .filter(|(_, amount)| !amount.is_zero())
    }
}

/// Журнал ставок одного раунда: участник -> его ставки.
///
/// Создаётся пустым при открытии окна ставок и выбрасывается после расчёта.
/// Проверку фазы делает `RoundMachine`: журнал существует только внутри состояния раунда.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BetLedger {
    entries: BTreeMap<ParticipantId, ParticipantBets>,
}

impl BetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Сколько участников что-то поставили (или хотя бы трогали ставки).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, participant: ParticipantId) -> Option<&ParticipantBets> {
        self.entries.get(&participant)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, &ParticipantBets)> {
        self.entries.iter()
    }

    /// Добавить `amount` к ставке участника в категории. Повторные ставки складываются.
    /// Возвращает новую сумму в этой категории.
    pub fn place_bet(
        &mut self,
        participant: ParticipantId,
        category: BetCategory,
        amount: i64,
    ) -> Result<Chips, EngineError> {
        if amount <= 0 {
            return Err(EngineError::InvalidAmount(format!(
                "сумма должна быть положительной, получено {amount}"
            )));
        }
        let add = Chips(amount as u64);

        // Сначала считаем новое значение, потом пишем: при ошибке журнал не меняется.
        let current = self
            .entries
            .get(&participant)
            .map(|b| b.amount(category))
            .unwrap_or(Chips::ZERO);
        let updated = current
            .checked_add(add)
            .ok_or_else(|| EngineError::InvalidAmount("переполнение суммы ставки".into()))?;

        let bets = self.entries.entry(participant).or_default();
        *bets.slot_mut(category) = updated;
        bets.last_target = Some(category);
        Ok(updated)
    }

    /// То же, что `place_bet`, но категория приходит строкой (`PLAYER`, `BANKER_PAIR`...).
    /// Неизвестный ключ – `InvalidAmount`.
    pub fn place_bet_by_key(
        &mut self,
        participant: ParticipantId,
        key: &str,
        amount: i64,
    ) -> Result<Chips, EngineError> {
        let category: BetCategory = key.parse().map_err(EngineError::InvalidAmount)?;
        self.place_bet(participant, category, amount)
    }

    /// Сдвинуть последнюю тронутую ставку на `delta`, не опускаясь ниже нуля.
    pub fn adjust_last_bet(
        &mut self,
        participant: ParticipantId,
        delta: i64,
    ) -> Result<(BetCategory, Chips), EngineError> {
        let bets = self
            .entries
            .get_mut(&participant)
            .ok_or(EngineError::NoActiveTarget(participant))?;
        let target = bets
            .last_target
            .ok_or(EngineError::NoActiveTarget(participant))?;

        let slot = bets.slot_mut(target);
        *slot = slot.apply_delta_floored(delta);
        Ok((target, *slot))
    }

    /// Убрать все ставки участника. Повторный вызов ничего не меняет.
    /// Возвращает true, если было что убирать.
    pub fn clear_participant(&mut self, participant: ParticipantId) -> bool {
        self.entries.remove(&participant).is_some()
    }

    pub fn total_stake(&self, participant: ParticipantId) -> Chips {
        self.entries
            .get(&participant)
            .map(ParticipantBets::total_stake)
            .unwrap_or(Chips::ZERO)
    }

    /// Суммы по категориям (для живого табло стола).
    pub fn totals_by_category(&self) -> Vec<(BetCategory, Chips)> {
        BetCategory::ALL
            .into_iter()
            .map(|c| {
                let sum = self
                    .entries
                    .values()
                    .fold(Chips::ZERO, |acc, b| acc + b.amount(c));
                (c, sum)
            })
            .collect()
    }

    pub fn total_wagered(&self) -> Chips {
        self.entries
            .values()
            .fold(Chips::ZERO, |acc, b| acc + b.total_stake())
    }
}
