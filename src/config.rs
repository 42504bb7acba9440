//! Конфигурация казино-движка.
//!
//! Источники: переменные окружения (`from_env`), JSON (`from_json_str`)
//! или любая функция-поставщик (`from_lookup`, удобно в тестах).
//! Нераспознанные значения молча заменяются значениями по умолчанию.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::chips::PayoutMultiplier;
use crate::domain::shoe::CARDS_PER_DECK;
use crate::engine::round_machine::{RoundRules, MAX_CARDS_PER_ROUND};
use crate::engine::settlement::PayoutTable;
use crate::time_ctrl::{RoundTimings, TimingProfile};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("не удалось разобрать JSON конфигурации: {0}")]
    Json(String),
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Параметры столов баккары.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BaccaratConfig {
    pub deck_count: u8,
    pub reshuffle_floor: usize,
    pub min_participants: usize,
    pub max_participants: usize,
    pub payouts: PayoutTable,
}

impl Default for BaccaratConfig {
    fn default() -> Self {
        Self {
            deck_count: 8,
            reshuffle_floor: 12,
            min_participants: 1,
            max_participants: 999,
            payouts: PayoutTable::standard(),
        }
    }
}

/// Параметры блэкджека. Пока только размер шу.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BlackjackConfig {
    pub deck_count: u8,
}

impl Default for BlackjackConfig {
    fn default() -> Self {
        Self { deck_count: 6 }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CasinoConfig {
    pub timings: RoundTimings,
    pub baccarat: BaccaratConfig,
    pub blackjack: BlackjackConfig,
    /// Период тика драйвера стола.
    pub tick_ms: u64,
}

impl Default for CasinoConfig {
    fn default() -> Self {
        Self {
            timings: RoundTimings::standard(),
            baccarat: BaccaratConfig::default(),
            blackjack: BlackjackConfig::default(),
            tick_ms: 1_000,
        }
    }
}

impl CasinoConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |keys: &[&str]| keys.iter().find_map(|k| lookup(k));

        // Профиль задаёт базовые тайминги, отдельные ключи их перекрывают.
        let base_timings = read(&["BACCARAT_TIMING_PROFILE"])
            .and_then(|raw| raw.parse::<TimingProfile>().ok())
            .map(RoundTimings::from_profile)
            .unwrap_or(defaults.timings.clone());

        let payouts = &defaults.baccarat.payouts;
        let multiplier = |key: &str, fallback: PayoutMultiplier| {
            read(&[key])
                .and_then(|raw| raw.trim().parse::<f64>().ok())
                .and_then(PayoutMultiplier::from_f64)
                .unwrap_or(fallback)
        };

        Self {
            timings: RoundTimings {
                bet_window_secs: parse_or(
                    read(&["BACCARAT_BET_SECONDS", "BAC_BET_SEC"]),
                    base_timings.bet_window_secs,
                ),
                cooldown_secs: parse_or(
                    read(&["BACCARAT_COOLDOWN_SECONDS"]),
                    base_timings.cooldown_secs,
                ),
            },
            baccarat: BaccaratConfig {
                deck_count: parse_or(
                    read(&["BACCARAT_DECKS", "BAC_DECKS"]),
                    defaults.baccarat.deck_count,
                ),
                reshuffle_floor: parse_or(
                    read(&["BACCARAT_RESHUFFLE_FLOOR"]),
                    defaults.baccarat.reshuffle_floor,
                ),
                min_participants: parse_or(
                    read(&["BACCARAT_MIN_PLAYERS"]),
                    defaults.baccarat.min_participants,
                ),
                max_participants: parse_or(
                    read(&["BACCARAT_MAX_PLAYERS"]),
                    defaults.baccarat.max_participants,
                ),
                payouts: PayoutTable {
                    player: multiplier("BACCARAT_PAYOUT_PLAYER", payouts.player),
                    banker: multiplier("BACCARAT_PAYOUT_BANKER", payouts.banker),
                    tie: multiplier("BACCARAT_PAYOUT_TIE", payouts.tie),
                    player_pair: multiplier("BACCARAT_PAYOUT_PLAYER_PAIR", payouts.player_pair),
                    banker_pair: multiplier("BACCARAT_PAYOUT_BANKER_PAIR", payouts.banker_pair),
                },
            },
            blackjack: BlackjackConfig {
                deck_count: parse_or(
                    read(&["BLACKJACK_DECKS", "BJ_DECKS"]),
                    defaults.blackjack.deck_count,
                ),
            },
            tick_ms: parse_or(read(&["CASINO_TICK_MS"]), defaults.tick_ms),
        }
    }

    /// Отсутствующие поля берутся из значений по умолчанию.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timings.bet_window_secs == 0 {
            return Err(invalid("timings.bet_window_secs", "должно быть больше 0"));
        }
        if self.tick_ms == 0 {
            return Err(invalid("tick_ms", "должно быть больше 0"));
        }

        let bac = &self.baccarat;
        if bac.deck_count == 0 {
            return Err(invalid("baccarat.deck_count", "нужна хотя бы одна колода"));
        }
        if bac.reshuffle_floor < MAX_CARDS_PER_ROUND {
            return Err(invalid(
                "baccarat.reshuffle_floor",
                format!("минимум {MAX_CARDS_PER_ROUND}, получено {}", bac.reshuffle_floor),
            ));
        }
        let shoe_size = bac.deck_count as usize * CARDS_PER_DECK;
        if bac.reshuffle_floor >= shoe_size {
            return Err(invalid(
                "baccarat.reshuffle_floor",
                format!("должен быть меньше размера шу ({shoe_size})"),
            ));
        }
        if bac.min_participants == 0 || bac.min_participants > bac.max_participants {
            return Err(invalid(
                "baccarat.min_participants",
                format!(
                    "нужно 1 <= min <= max, получено min={} max={}",
                    bac.min_participants, bac.max_participants
                ),
            ));
        }
        bac.payouts
            .validate()
            .map_err(|e| invalid("baccarat.payouts", e.to_string()))?;

        if self.blackjack.deck_count == 0 {
            return Err(invalid("blackjack.deck_count", "нужна хотя бы одна колода"));
        }
        Ok(())
    }

    /// Правила раунда, которые машина стола снимет при открытии.
    pub fn round_rules(&self) -> RoundRules {
        RoundRules {
            timings: self.timings.clone(),
            reshuffle_floor: self.baccarat.reshuffle_floor,
            payouts: self.baccarat.payouts.clone(),
        }
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, fallback: T) -> T {
    raw.and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(fallback)
}
