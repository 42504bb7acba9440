//! Подсчёт очков рук и правило третьей карты.
//!
//! Основные функции:
//!   `score(cards, ruleset) -> u32`
//!   `third_card::play_out(hands, shoe)` – добор карт в баккаре

pub mod scorer;
pub mod third_card;

pub use scorer::{baccarat_total, blackjack_total, is_blackjack, is_bust, is_natural, is_pair, score, Ruleset};
pub use third_card::{banker_should_draw, is_natural_deal, play_out, player_should_draw, DrawReport};
