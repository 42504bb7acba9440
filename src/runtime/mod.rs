//! Рантайм столов на tokio.
//!
//! Каждый стол – `TableDriver`: машина раундов за `tokio::sync::Mutex`
//! и фоновая задача с `interval`, которая её тикает.
//! `TableManager` владеет драйверами и общими зависимостями.

pub mod driver;
pub mod manager;

pub use driver::{DriverDeps, TableDriver};
pub use manager::{TableManager, EVENT_CHANNEL_CAPACITY};
