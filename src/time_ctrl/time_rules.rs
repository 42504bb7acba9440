// src/time_ctrl/time_rules.rs
//! Тайминги раунда: окно ставок и пауза между раундами.
//!
//! Только правила, без состояния и без привязки к конкретному столу.

use serde::{Deserialize, Serialize};

/// Профиль тайминга.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimingProfile {
    /// 25 сек на ставки, 5 сек паузы.
    Standard,
    /// Для dev-прогонов и ботов: 3 сек на ставки, 1 сек паузы.
    Fast,
}

impl std::str::FromStr for TimingProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(TimingProfile::Standard),
            "fast" => Ok(TimingProfile::Fast),
            other => Err(format!("неизвестный профиль тайминга: {other:?}")),
        }
    }
}

/// Тайминги одного стола.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RoundTimings {
    /// Длительность окна ставок.
    pub bet_window_secs: u32,
    /// Пауза после расчёта до следующего окна ставок.
    pub cooldown_secs: u32,
}

impl RoundTimings {
    pub const fn new(bet_window_secs: u32, cooldown_secs: u32) -> Self {
        Self {
            bet_window_secs,
            cooldown_secs,
        }
    }

    pub const fn standard() -> Self {
        Self::new(25, 5)
    }

    pub const fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Standard => Self::standard(),
            TimingProfile::Fast => Self::new(3, 1),
        }
    }

    pub const fn bet_window_ms(&self) -> u64 {
        self.bet_window_secs as u64 * 1_000
    }

    pub const fn cooldown_ms(&self) -> u64 {
        self.cooldown_secs as u64 * 1_000
    }
}

impl Default for RoundTimings {
    fn default() -> Self {
        Self::standard()
    }
}
