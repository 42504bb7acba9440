//! Доменная модель казино: карты, шу, руки, ставки, столы.

pub mod bet;
pub mod card;
pub mod chips;
pub mod hand;
pub mod shoe;
pub mod table;

// Базовые идентификаторы.
pub type ParticipantId = u64;
pub type TableId = u64;
/// Порядковый номер раунда внутри стола (начинается с 1).
pub type RoundNo = u64;

// Удобные реэкспорты, чтобы в других модулях писать crate::domain::Card и т.п.
pub use bet::*;
pub use card::*;
pub use chips::*;
pub use hand::*;
pub use shoe::*;
pub use table::*;
