// tests/infra_test.rs
//
// Хранилища, генераторы id и RNG, снапшоты столов.

use casino_engine::domain::bet::{BetCategory, MainBet};
use casino_engine::domain::card::Card;
use casino_engine::domain::chips::Chips;
use casino_engine::domain::hand::{BaccaratHands, Hand};
use casino_engine::domain::shoe::Shoe;
use casino_engine::domain::table::{Table, TableConfig};
use casino_engine::engine::{
    compute_settlement, AbortedRound, BetLedger, CancelReason, Cancellation, EngineError, PayoutTable, PendingSettlement,
    RandomSource, RoundMachine, RoundRules, SettlementBatch,
};
use casino_engine::infra::{
    BalanceStore, DeterministicRng, IdGenerator, InMemoryBalanceStore, InMemoryTableStore, NoShuffle,
    StoreError, TableStore,
};
use casino_engine::state::{TableSnapshot, SNAPSHOT_VERSION};

const PLAYER: BetCategory = BetCategory::Main(MainBet::Player);
const BANKER: BetCategory = BetCategory::Main(MainBet::Banker);

/// Player 9, Banker 5.
fn player_wins() -> BaccaratHands {
    let parse = |list: &[&str]| Hand::from_cards(list.iter().map(|s| s.parse::<Card>().unwrap()).collect());
    BaccaratHands::new(parse(&["9h", "Kd"]), parse(&["2s", "3c"]))
}

fn batch(bets: &[(u64, BetCategory, i64)], store: &InMemoryBalanceStore) -> SettlementBatch {
    let mut ledger = BetLedger::new();
    for (p, category, amount) in bets {
        ledger.place_bet(*p, *category, *amount).unwrap();
    }
    compute_settlement(1, 1, &ledger, &player_wins(), &PayoutTable::standard(), |p| store.balance(p)).unwrap()
}

fn betting_machine() -> RoundMachine {
    let mut table = Table::new(5, "SNAP".into(), TableConfig::new(1, 10));
    table.join(1).unwrap();
    let mut machine = RoundMachine::new(table, 8, RoundRules::standard(), &mut NoShuffle).unwrap();
    let store = InMemoryBalanceStore::new();
    machine.advance(0, &mut NoShuffle, &store);
    machine.place_bet(10, 1, PLAYER, 75).unwrap();
    machine
}

//
// persistence.rs: балансы
//
#[test]
fn deposit_creates_and_tops_up_accounts() {
    let store = InMemoryBalanceStore::new();
    assert_eq!(store.balance(1).unwrap(), None);
    assert_eq!(store.deposit(1, 100).unwrap(), 100);
    assert_eq!(store.deposit(1, 50).unwrap(), 150);
    assert_eq!(store.balance(1).unwrap(), Some(150));
}

#[test]
fn settlement_is_applied_with_history() {
    let store = InMemoryBalanceStore::new();
    store.deposit(1, 500).unwrap();
    store.deposit(2, 500).unwrap();

    let b = batch(&[(1, PLAYER, 100), (2, BANKER, 40)], &store);
    store.apply_settlement(&b).unwrap();

    assert_eq!(store.balance(1).unwrap(), Some(600));
    assert_eq!(store.balance(2).unwrap(), Some(460));
    assert_eq!(store.history().unwrap().len(), 2);
    assert_eq!(store.history_for(2).unwrap()[0].delta, -40);
}

#[test]
fn participant_short_at_apply_time_is_voided() {
    let store = InMemoryBalanceStore::new();
    store.deposit(1, 500).unwrap();
    store.deposit(2, 500).unwrap();
    let b = batch(&[(1, PLAYER, 100), (2, BANKER, 400)], &store);

    // Баланс 2 успел уменьшиться между расчётом и применением.
    store.deposit(2, -200).unwrap();

    let voided = store.apply_settlement(&b).unwrap();
    assert_eq!(
        voided,
        vec![Cancellation {
            participant: 2,
            stake: Chips(400),
            reason: CancelReason::InsufficientFunds { balance: 300 },
        }]
    );
    assert_eq!(store.balance(1).unwrap(), Some(600));
    assert_eq!(store.balance(2).unwrap(), Some(300));
    assert!(store.history_for(2).unwrap().is_empty());
    assert_eq!(store.history().unwrap().len(), 1);
}

#[test]
fn unknown_account_is_voided_others_applied() {
    let store = InMemoryBalanceStore::new();
    store.deposit(1, 500).unwrap();
    store.deposit(2, 500).unwrap();
    let b = batch(&[(1, PLAYER, 100), (2, PLAYER, 10)], &store);

    let other = InMemoryBalanceStore::new();
    other.deposit(1, 500).unwrap();

    let voided = other.apply_settlement(&b).unwrap();
    assert_eq!(voided.len(), 1);
    assert_eq!(voided[0].participant, 2);
    assert_eq!(voided[0].reason, CancelReason::UnknownAccount);
    assert_eq!(other.balance(1).unwrap(), Some(600));
    assert_eq!(other.balance(2).unwrap(), None);
    assert_eq!(other.history().unwrap().len(), 1);
}

#[test]
fn overflow_rejects_whole_batch() {
    let store = InMemoryBalanceStore::new();
    store.deposit(1, 500).unwrap();
    store.deposit(2, 500).unwrap();
    let b = batch(&[(1, PLAYER, 100), (2, PLAYER, 100)], &store);

    let rich = InMemoryBalanceStore::new();
    rich.deposit(1, 500).unwrap();
    rich.deposit(2, i64::MAX - 10).unwrap();

    assert_eq!(
        rich.apply_settlement(&b),
        Err(StoreError::BalanceOverflow {
            participant: 2,
            balance: i64::MAX - 10,
            delta: 100
        })
    );
    assert_eq!(rich.balance(1).unwrap(), Some(500));
    assert!(rich.history().unwrap().is_empty());

    // Хранилище остаётся рабочим.
    let small = batch(&[(1, PLAYER, 100)], &store);
    assert!(rich.apply_settlement(&small).unwrap().is_empty());
    assert_eq!(rich.balance(1).unwrap(), Some(600));
}

#[test]
fn default_history_is_empty() {
    struct Ledgerless;
    impl BalanceStore for Ledgerless {
        fn balance(&self, _participant: u64) -> Result<Option<i64>, StoreError> {
            Ok(Some(0))
        }
        fn apply_settlement(&self, _batch: &SettlementBatch) -> Result<Vec<Cancellation>, StoreError> {
            Ok(Vec::new())
        }
    }
    assert!(Ledgerless.history_for(1).unwrap().is_empty());
}

//
// persistence.rs: снапшоты
//
#[test]
fn table_store_round_trips_snapshot() {
    let machine = betting_machine();
    let snapshot = TableSnapshot::from_machine(&machine, 1_234);

    let store = InMemoryTableStore::new();
    assert!(store.load_table(5).unwrap().is_none());
    store.save_table(&snapshot).unwrap();

    assert!(store.raw(5).unwrap().unwrap().contains("\"SNAP\""));
    let loaded = store.load_table(5).unwrap().unwrap();
    assert_eq!(loaded, snapshot);

    let restored = loaded.into_machine().unwrap();
    assert_eq!(restored.round_no(), Some(1));
    assert_eq!(restored.shoe.len(), machine.shoe.len());
    assert_eq!(
        restored.state.as_ref().unwrap().ledger().unwrap().total_stake(1),
        Chips(75)
    );
}

#[test]
fn snapshot_keeps_aborted_rounds() {
    let store = InMemoryBalanceStore::new();
    store.deposit(1, 1_000).unwrap();
    let b = batch(&[(1, PLAYER, 100)], &store);

    let mut machine = betting_machine();
    machine.aborted.push(AbortedRound {
        round_no: 1,
        reason: "хранилище недоступно".into(),
        pending: PendingSettlement::Unapplied(b.clone()),
    });

    let json = TableSnapshot::from_machine(&machine, 0).to_json().unwrap();
    let mut restored = TableSnapshot::from_json(&json).unwrap().into_machine().unwrap();
    assert_eq!(restored.aborted, machine.aborted);

    // После восстановления раунд можно рассчитать.
    let event = restored.retry_aborted(1, &store).unwrap().unwrap();
    assert_eq!(event.round_no, 1);
    assert_eq!(store.balance(1).unwrap(), Some(1_100));
    assert!(restored.aborted.is_empty());
}

#[test]
fn snapshot_with_other_version_is_refused() {
    let mut snapshot = TableSnapshot::from_machine(&betting_machine(), 0);
    assert_eq!(snapshot.version, SNAPSHOT_VERSION);
    snapshot.version = SNAPSHOT_VERSION + 1;
    assert!(matches!(snapshot.into_machine(), Err(EngineError::InvalidConfig(_))));
}

#[test]
fn corrupt_json_is_a_serialization_error() {
    assert!(matches!(
        TableSnapshot::from_json("{\"version\": 1"),
        Err(StoreError::Serialization(_))
    ));
}

//
// ids.rs
//
#[test]
fn ids_are_monotonic_and_respect_observed_tables() {
    let ids = IdGenerator::new();
    assert_eq!(ids.next_table_id(), 1);
    assert_eq!(ids.next_table_id(), 2);

    ids.observe_table_id(10);
    assert_eq!(ids.next_table_id(), 11);
    ids.observe_table_id(3);
    assert_eq!(ids.next_table_id(), 12);

    let resumed = IdGenerator::starting_at(100, 7);
    assert_eq!(resumed.next_participant_id(), 7);
    assert_eq!(resumed.next_participant_id(), 8);
}

//
// rng.rs
//
#[test]
fn same_seed_gives_same_shoe() {
    let a = Shoe::build(8, &mut DeterministicRng::from_seed(42)).unwrap();
    let b = Shoe::build(8, &mut DeterministicRng::from_seed(42)).unwrap();
    let c = Shoe::build(8, &mut DeterministicRng::from_seed(43)).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn no_shuffle_keeps_order() {
    let mut values = [1, 2, 3, 4];
    NoShuffle.shuffle(&mut values);
    assert_eq!(values, [1, 2, 3, 4]);
}
