//! Движок живых столов казино: баккара по раундам с таймером,
//! общая шу, журнал ставок, расчёт по таблице выплат.
//!
//! Слои:
//! - `domain` – карты, шу, руки, ставки, стол;
//! - `eval` – подсчёт очков и правило третьей карты;
//! - `engine` – машина раундов и расчёт;
//! - `runtime` – драйверы столов на tokio;
//! - `api` – команды, запросы, DTO, GraphQL-схема лобби.

pub mod api;
pub mod config;
pub mod domain;
pub mod engine;
pub mod eval;
pub mod infra;
pub mod runtime;
pub mod state;
pub mod time_ctrl;
