// tests/domain_test.rs

use casino_engine::domain::{
    bet::{BetCategory, MainBet, SideBet},
    card::{Card, Rank, Suit},
    chips::{Chips, PayoutMultiplier},
    hand::{BaccaratHands, Hand},
    shoe::{Shoe, CARDS_PER_DECK},
    table::{Table, TableConfig, TableStatus},
};
use casino_engine::engine::{EngineError, RandomSource};
use casino_engine::eval::Ruleset;
use casino_engine::infra::DeterministicRng;

/// RNG без перемешивания: шу остаётся в заводском порядке.
#[derive(Default)]
struct DummyRng;

impl RandomSource for DummyRng {
    fn shuffle<T>(&mut self, _slice: &mut [T]) {
        // no-op
    }
}

fn c(s: &str) -> Card {
    s.parse().unwrap()
}

fn hand(cards: &[&str]) -> Hand {
    Hand::from_cards(cards.iter().map(|s| c(s)).collect())
}

//
// card.rs
//
#[test]
fn card_points_follow_baccarat_and_blackjack_values() {
    assert_eq!(Rank::Ace.baccarat_points(), 1);
    assert_eq!(Rank::Seven.baccarat_points(), 7);
    for face in [Rank::Ten, Rank::Jack, Rank::Queen, Rank::King] {
        assert_eq!(face.baccarat_points(), 0);
        assert_eq!(face.blackjack_points(), 10);
    }
    assert_eq!(Rank::Ace.blackjack_points(), 11);
}

#[test]
fn card_parses_and_displays_short_form() {
    assert_eq!(c("Ah"), Card::new(Rank::Ace, Suit::Hearts));
    assert_eq!(c("10d"), Card::new(Rank::Ten, Suit::Diamonds));
    assert_eq!(c("Td"), c("10d"));
    assert_eq!(c("kS").to_string(), "Ks");
    assert!("Zz".parse::<Card>().is_err());
    assert!("h".parse::<Card>().is_err());
}

//
// shoe.rs
//
#[test]
fn shoe_has_every_card_deck_count_times() {
    let shoe = Shoe::build(8, &mut DeterministicRng::from_seed(11)).unwrap();
    assert_eq!(shoe.len(), 8 * CARDS_PER_DECK);
    assert_eq!(shoe.full_size(), 416);

    let aces_of_spades = shoe
        .draw_order()
        .filter(|card| **card == Card::new(Rank::Ace, Suit::Spades))
        .count();
    assert_eq!(aces_of_spades, 8);
}

#[test]
fn shoe_with_zero_decks_is_rejected() {
    let err = Shoe::build(0, &mut DummyRng).unwrap_err();
    assert!(matches!(err, EngineError::InvalidConfig(_)));
}

#[test]
fn same_seed_gives_same_shoe() {
    let a = Shoe::build(6, &mut DeterministicRng::from_seed(99)).unwrap();
    let b = Shoe::build(6, &mut DeterministicRng::from_seed(99)).unwrap();
    let other = Shoe::build(6, &mut DeterministicRng::from_seed(100)).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, other);
}

#[test]
fn stacked_shoe_draws_in_given_order_then_runs_dry() {
    let mut shoe = Shoe::from_draw_order(vec![c("2c"), c("3d")], 1);
    assert_eq!(shoe.draw().unwrap(), c("2c"));
    assert_eq!(shoe.draw().unwrap(), c("3d"));
    assert!(shoe.is_empty());
    assert!(matches!(shoe.draw(), Err(EngineError::EmptyShoe)));
}

#[test]
fn reshuffle_needed_only_below_floor() {
    let shoe = Shoe::from_draw_order(vec![c("2c"); 12], 1);
    assert!(!shoe.needs_reshuffle(12));
    assert!(shoe.needs_reshuffle(13));
}

//
// hand.rs
//
#[test]
fn hand_scores_and_flags() {
    let h = hand(&["9h", "7c"]);
    assert_eq!(h.baccarat_score(), 6);
    assert!(!h.is_natural());
    assert!(!h.is_pair());

    assert!(hand(&["8s", "Kd"]).is_natural());
    assert!(hand(&["5h", "5c"]).is_pair());
    assert!(!hand(&["5h", "6h", "5c"]).is_pair());

    let bj = hand(&["Ah", "Kd"]);
    assert!(bj.is_blackjack());
    assert_eq!(bj.score(Ruleset::Blackjack), 21);
    assert!(hand(&["Kh", "Qd", "5c"]).is_bust());
}

#[test]
fn outcome_picks_higher_score_and_tie_on_equal() {
    let banker_wins = BaccaratHands::new(hand(&["9h", "7c"]), hand(&["8s", "Kd"])).outcome();
    assert_eq!(banker_wins.winner, MainBet::Banker);
    assert_eq!((banker_wins.player_score, banker_wins.banker_score), (6, 8));

    let tie = BaccaratHands::new(hand(&["4h", "3c"]), hand(&["2s", "5d"])).outcome();
    assert_eq!(tie.winner, MainBet::Tie);

    let pairs = BaccaratHands::new(hand(&["4h", "4c"]), hand(&["Js", "Jd"])).outcome();
    assert!(pairs.player_pair && pairs.banker_pair);
    assert_eq!(pairs.winner, MainBet::Player);
}

//
// bet.rs
//
#[test]
fn bet_category_keys_parse_case_insensitively() {
    assert_eq!("player".parse::<BetCategory>().unwrap(), BetCategory::Main(MainBet::Player));
    assert_eq!(" Banker_Pair ".parse::<BetCategory>().unwrap(), BetCategory::Side(SideBet::BankerPair));
    assert!("DRAGON".parse::<BetCategory>().is_err());

    for category in BetCategory::ALL {
        assert_eq!(category.key().parse::<BetCategory>().unwrap(), category);
    }
}

#[test]
fn bet_category_wins_against_outcome() {
    let outcome = BaccaratHands::new(hand(&["4h", "4c"]), hand(&["2s", "5d"])).outcome();
    assert!(BetCategory::Main(MainBet::Player).wins(&outcome));
    assert!(!BetCategory::Main(MainBet::Tie).wins(&outcome));
    assert!(BetCategory::Side(SideBet::PlayerPair).wins(&outcome));
    assert!(!BetCategory::Side(SideBet::BankerPair).wins(&outcome));
}

//
// chips.rs
//
#[test]
fn multiplier_payout_is_exact_floor() {
    let banker = PayoutMultiplier::from_f64(1.95).unwrap();
    assert_eq!(banker, PayoutMultiplier::from_basis_points(19_500));
    assert_eq!(banker.payout(Chips(100)), Chips(195));
    // 7 × 1.95 = 13.65
    assert_eq!(banker.payout(Chips(7)), Chips(13));
    assert_eq!(PayoutMultiplier::from_f64(2.0).unwrap().payout(Chips(100)), Chips(200));
    assert!(PayoutMultiplier::from_f64(-1.0).is_none());
    assert!(PayoutMultiplier::from_f64(f64::NAN).is_none());
}

#[test]
fn chips_delta_is_floored_at_zero() {
    assert_eq!(Chips(100).apply_delta_floored(-30), Chips(70));
    assert_eq!(Chips(100).apply_delta_floored(-500), Chips::ZERO);
    assert_eq!(Chips(100).apply_delta_floored(25), Chips(125));
}

//
// table.rs
//
#[test]
fn table_roster_enforces_capacity_and_membership() {
    let mut table = Table::new(1, "T".to_string(), TableConfig::new(1, 2));
    assert_eq!(table.status, TableStatus::Open);
    assert!(!table.has_minimum());

    table.join(10).unwrap();
    assert!(table.has_minimum());
    assert!(matches!(table.join(10), Err(EngineError::AlreadySeated(10))));

    table.join(11).unwrap();
    assert!(matches!(table.join(12), Err(EngineError::TableFull(1))));

    table.leave(10).unwrap();
    assert!(matches!(table.leave(10), Err(EngineError::NotSeated(10))));
    assert_eq!(table.occupancy(), 1);
}
