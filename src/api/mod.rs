//! Внешний API движка столов.
//!
//! Здесь описываются:
//! - команды (commands.rs) – всё, что меняет состояние (открыть стол, сесть, поставить);
//! - запросы (queries.rs) – только чтение;
//! - DTO (dto.rs) – удобные структуры для фронта;
//! - ошибки (errors.rs) – то, что видит клиент, со стабильными кодами;
//! - GraphQL-схема лобби (graphql.rs).

pub mod commands;
pub mod dto;
pub mod errors;
pub mod graphql;
pub mod queries;

pub use commands::*;
pub use dto::*;
pub use errors::*;
pub use graphql::{build_lobby_schema, lobby_schema, LobbyQuery, LobbySchema};
pub use queries::*;
