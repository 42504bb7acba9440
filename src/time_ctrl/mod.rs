// src/time_ctrl/mod.rs
//! Время столов: тайминги раунда и источник текущего времени.

pub mod clock;
pub mod time_rules;

pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use time_rules::{RoundTimings, TimingProfile};

/// Сколько осталось до `deadline_ms` (0, если дедлайн прошёл).
pub fn remaining_ms(deadline_ms: u64, now_ms: u64) -> u64 {
    deadline_ms.saturating_sub(now_ms)
}
