// tests/eval_third_card_tests.rs
//
// Подсчёт очков и таблица третьей карты.

use casino_engine::domain::bet::MainBet;
use casino_engine::domain::card::Card;
use casino_engine::domain::hand::{BaccaratHands, Hand};
use casino_engine::domain::shoe::Shoe;
use casino_engine::engine::EngineError;
use casino_engine::eval::{
    baccarat_total, banker_should_draw, blackjack_total, is_natural_deal, play_out, player_should_draw,
};

fn c(s: &str) -> Card {
    s.parse().unwrap()
}

fn cards(list: &[&str]) -> Vec<Card> {
    list.iter().map(|s| c(s)).collect()
}

fn hands(player: &[&str], banker: &[&str]) -> BaccaratHands {
    BaccaratHands::new(Hand::from_cards(cards(player)), Hand::from_cards(cards(banker)))
}

/// Эталонное решение банкира после добора игрока, строка = очки банкира,
/// столбец = очки третьей карты игрока 0..=9.
const BANKER_DRAWS: [[bool; 10]; 8] = {
    const T: bool = true;
    const F: bool = false;
    [
        [T, T, T, T, T, T, T, T, T, T], // 0
        [T, T, T, T, T, T, T, T, T, T], // 1
        [T, T, T, T, T, T, T, T, T, T], // 2
        [T, T, T, T, T, T, T, T, F, T], // 3
        [F, F, T, T, T, T, T, T, F, F], // 4
        [F, F, F, F, T, T, T, T, F, F], // 5
        [F, F, F, F, F, F, T, T, F, F], // 6
        [F, F, F, F, F, F, F, F, F, F], // 7
    ]
};

//
// scorer.rs
//
#[test]
fn baccarat_total_is_sum_mod_ten_in_any_order() {
    assert_eq!(baccarat_total(&cards(&["9h", "7c"])), 6);
    assert_eq!(baccarat_total(&cards(&["7c", "9h"])), 6);
    assert_eq!(baccarat_total(&cards(&["Kh", "Qd", "Js"])), 0);
    assert_eq!(baccarat_total(&cards(&["Ah", "9d", "5s"])), 5);
    assert_eq!(baccarat_total(&[]), 0);
}

#[test]
fn blackjack_total_downgrades_aces_only_when_needed() {
    assert_eq!(blackjack_total(&cards(&["Ah", "Kd"])), 21);
    assert_eq!(blackjack_total(&cards(&["Ah", "Ad"])), 12);
    assert_eq!(blackjack_total(&cards(&["Ah", "Ad", "9c"])), 21);
    assert_eq!(blackjack_total(&cards(&["Kh", "Qd", "Ac"])), 21);
    assert_eq!(blackjack_total(&cards(&["Kh", "Qd", "5c"])), 25);
}

//
// third_card.rs: решения
//
#[test]
fn player_draws_on_zero_to_five() {
    for total in 0..=5 {
        assert!(player_should_draw(total), "total {total}");
    }
    for total in 6..=9 {
        assert!(!player_should_draw(total), "total {total}");
    }
}

#[test]
fn banker_follows_table_when_player_drew() {
    for (banker_total, row) in BANKER_DRAWS.iter().enumerate() {
        for (p3, expected) in row.iter().enumerate() {
            assert_eq!(
                banker_should_draw(banker_total as u8, Some(p3 as u8)),
                *expected,
                "banker {banker_total}, player third {p3}"
            );
        }
    }
}

#[test]
fn banker_draws_on_zero_to_five_when_player_stood() {
    for total in 0..=5 {
        assert!(banker_should_draw(total, None));
    }
    for total in 6..=7 {
        assert!(!banker_should_draw(total, None));
    }
}

#[test]
fn naturals_on_eight_or_nine() {
    assert!(is_natural_deal(8, 0));
    assert!(is_natural_deal(2, 9));
    assert!(!is_natural_deal(7, 7));
}

//
// third_card.rs: доигрывание
//
#[test]
fn banker_natural_stops_all_draws() {
    // Player 9+7 = 6, Banker 8+K = 8.
    let mut h = hands(&["9h", "7c"], &["8s", "Kd"]);
    let mut shoe = Shoe::from_draw_order(cards(&["2c", "3c"]), 1);

    let report = play_out(&mut h, &mut shoe).unwrap();
    assert!(report.natural);
    assert_eq!(report.player_third, None);
    assert_eq!(report.banker_third, None);
    assert_eq!(shoe.len(), 2);
    assert_eq!(h.outcome().winner, MainBet::Banker);
}

#[test]
fn banker_natural_blocks_player_draw() {
    // Player 2+3 = 5, Banker 4+5 = 9: натуральная у банкира, игрок тоже не добирает.
    let mut h = hands(&["2h", "3c"], &["4s", "5d"]);
    let mut shoe = Shoe::from_draw_order(cards(&["6c"]), 1);

    let report = play_out(&mut h, &mut shoe).unwrap();
    assert!(report.natural);
    assert_eq!(report.player_third, None);
    assert_eq!(shoe.len(), 1);
    assert_eq!(h.outcome().winner, MainBet::Banker);
    assert_eq!(h.outcome().banker_score, 9);
}

#[test]
fn player_third_card_then_banker_decides_by_it() {
    // Player 2+3 = 5 берёт 6 -> 1. Banker K+3 = 3, третья игрока 6 -> добирает 4 -> 7.
    let mut h = hands(&["2h", "3c"], &["Ks", "3d"]);
    let mut shoe = Shoe::from_draw_order(cards(&["6c", "4h"]), 1);

    let report = play_out(&mut h, &mut shoe).unwrap();
    assert!(!report.natural);
    assert_eq!(report.player_third, Some(c("6c")));
    assert_eq!(report.banker_third, Some(c("4h")));

    let outcome = h.outcome();
    assert_eq!(outcome.player_score, 1);
    assert_eq!(outcome.banker_score, 7);
    assert_eq!(outcome.winner, MainBet::Banker);
}

#[test]
fn banker_three_stands_on_player_eight() {
    let mut h = hands(&["Kh", "4c"], &["Ks", "3d"]);
    let mut shoe = Shoe::from_draw_order(cards(&["8c", "9h"]), 1);

    let report = play_out(&mut h, &mut shoe).unwrap();
    assert_eq!(report.player_third, Some(c("8c")));
    assert_eq!(report.banker_third, None);
    assert_eq!(h.banker.len(), 2);
    assert_eq!(shoe.len(), 1);
}

#[test]
fn player_stands_banker_draws_on_five() {
    let mut h = hands(&["Kh", "6c"], &["2s", "3d"]);
    let mut shoe = Shoe::from_draw_order(cards(&["Ah"]), 1);

    let report = play_out(&mut h, &mut shoe).unwrap();
    assert_eq!(report.player_third, None);
    assert_eq!(report.banker_third, Some(c("Ah")));
    assert_eq!(h.outcome().winner, MainBet::Tie);
}

#[test]
fn play_out_requires_two_card_hands() {
    let mut h = hands(&["2h"], &["4s", "5d"]);
    let mut shoe = Shoe::from_draw_order(cards(&["6c"]), 1);
    assert!(matches!(play_out(&mut h, &mut shoe), Err(EngineError::Internal(_))));
}

#[test]
fn play_out_reports_empty_shoe() {
    let mut h = hands(&["2h", "3c"], &["Ks", "3d"]);
    let mut shoe = Shoe::from_draw_order(Vec::new(), 1);
    assert!(matches!(play_out(&mut h, &mut shoe), Err(EngineError::EmptyShoe)));
}
