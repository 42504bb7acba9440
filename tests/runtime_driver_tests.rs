// tests/runtime_driver_tests.rs
//
// Драйверы столов на tokio: тик по интервалу, сериализация ставок, снапшоты.

use std::sync::Arc;
use std::time::Duration;

use casino_engine::config::CasinoConfig;
use casino_engine::domain::bet::{BetCategory, MainBet};
use casino_engine::domain::chips::Chips;
use casino_engine::engine::{EngineError, RoundPhase, TableEventKind};
use casino_engine::infra::{BalanceStore, DeterministicRng, InMemoryBalanceStore, InMemoryTableStore, TableStore};
use casino_engine::runtime::TableManager;
use casino_engine::time_ctrl::{ManualClock, TokioClock};

const PLAYER: BetCategory = BetCategory::Main(MainBet::Player);

fn funded_store(accounts: &[(u64, i64)]) -> Arc<InMemoryBalanceStore> {
    let store = Arc::new(InMemoryBalanceStore::new());
    for (p, amount) in accounts {
        store.deposit(*p, *amount).unwrap();
    }
    store
}

fn manual_manager(
    clock: &ManualClock,
    balances: Arc<InMemoryBalanceStore>,
) -> TableManager<DeterministicRng> {
    TableManager::new(CasinoConfig::default(), balances, Arc::new(clock.clone())).unwrap()
}

#[tokio::test(start_paused = true)]
async fn driver_plays_rounds_on_its_own() {
    let balances = funded_store(&[(1, 10_000)]);
    let mut manager: TableManager<DeterministicRng> =
        TableManager::new(CasinoConfig::default(), balances.clone(), Arc::new(TokioClock::new(0))).unwrap();
    let mut events = manager.subscribe();

    let id = manager.open_table("AUTO", DeterministicRng::from_seed(7)).unwrap();
    manager.driver(id).unwrap().join(1).await.unwrap();

    assert!(manager.start_table(id).await.unwrap());
    assert!(!manager.start_table(id).await.unwrap());

    let first = events.recv().await.unwrap();
    assert!(matches!(first.kind, TableEventKind::RoundOpened { .. }));
    assert_eq!(first.round_no, 1);

    manager.driver(id).unwrap().place_bet(1, PLAYER, 100).await.unwrap();

    let mut seen = Vec::new();
    loop {
        let event = events.recv().await.unwrap();
        let done = matches!(event.kind, TableEventKind::CooldownStarted { .. });
        seen.push(event.kind);
        if done {
            break;
        }
    }
    assert!(seen.iter().any(|k| matches!(k, TableEventKind::HandsRevealed { .. })));
    assert!(seen.iter().any(|k| matches!(k, TableEventKind::RoundSettled { .. })));

    assert_eq!(balances.history_for(1).unwrap().len(), 1);
    assert_ne!(balances.balance(1).unwrap(), Some(10_000));

    // Следующий раунд открывается сам после паузы.
    let next = events.recv().await.unwrap();
    assert!(matches!(next.kind, TableEventKind::RoundOpened { .. }));
    assert_eq!(next.round_no, 2);

    manager.stop_all().await;
    assert!(!manager.driver(id).unwrap().is_running().await);
}

#[tokio::test]
async fn bets_after_deadline_are_rejected_even_before_tick() {
    let clock = ManualClock::new(0);
    let mut manager = manual_manager(&clock, funded_store(&[(1, 1_000)]));
    let id = manager.open_table("T", DeterministicRng::from_seed(1)).unwrap();
    let driver = manager.driver(id).unwrap();

    driver.join(1).await.unwrap();
    driver.tick_now().await;
    assert_eq!(driver.place_bet(1, PLAYER, 10).await.unwrap(), Chips(10));

    clock.advance(25_000);
    assert!(matches!(
        driver.place_bet(1, PLAYER, 10).await,
        Err(EngineError::NotAcceptingBets)
    ));
}

#[tokio::test]
async fn interleaved_bets_are_all_recorded() {
    let clock = ManualClock::new(0);
    let mut manager = manual_manager(&clock, funded_store(&[]));
    let id = manager.open_table("T", DeterministicRng::from_seed(1)).unwrap();
    let driver = manager.driver(id).unwrap();
    for p in 1..=4 {
        driver.join(p).await.unwrap();
    }
    driver.tick_now().await;

    let (a, b, c, d) = tokio::join!(
        driver.place_bet(1, PLAYER, 5),
        driver.place_bet(2, PLAYER, 5),
        driver.place_bet(3, PLAYER, 5),
        driver.place_bet_by_key(4, "tie", 5),
    );
    for result in [a, b, c, d] {
        result.unwrap();
    }

    let total = driver
        .with_machine(|m| m.state.as_ref().and_then(|s| s.ledger()).map(|l| l.total_wagered()))
        .await;
    assert_eq!(total, Some(Chips(20)));
}

#[tokio::test]
async fn events_are_snapshotted_and_table_resumes() {
    let clock = ManualClock::new(0);
    let balances = funded_store(&[(1, 1_000)]);
    let tables = Arc::new(InMemoryTableStore::new());
    let mut manager = manual_manager(&clock, balances.clone()).with_table_store(tables.clone());

    let id = manager.open_table("PERSIST", DeterministicRng::from_seed(3)).unwrap();
    {
        let driver = manager.driver(id).unwrap();
        driver.join(1).await.unwrap();
        driver.tick_now().await;
        driver.place_bet(1, PLAYER, 40).await.unwrap();
    }

    // Ставки после последнего тика в снапшот не попали: он сделан при открытии окна.
    let saved = tables.load_table(id).unwrap().unwrap();
    assert_eq!(saved.table.last_round_no, 1);
    assert!(saved.state.as_ref().unwrap().ledger().unwrap().is_empty());

    let closed = manager.close_table(id).await.unwrap();
    assert!(!manager.has_table(id));
    assert_eq!(closed.state.as_ref().unwrap().ledger().unwrap().total_stake(1), Chips(40));

    let mut revived = manual_manager(&clock, balances).with_table_store(tables);
    let resumed = revived.resume_table(id, DeterministicRng::from_seed(3)).unwrap();
    assert_eq!(resumed, id);

    let driver = revived.driver(id).unwrap();
    assert_eq!(driver.with_machine(|m| m.phase()).await, Some(RoundPhase::Betting));
    assert_eq!(driver.place_bet(1, PLAYER, 10).await.unwrap(), Chips(50));

    // Новые столы получают id после восстановленного.
    let next = revived.open_table("NEXT", DeterministicRng::from_seed(4)).unwrap();
    assert!(next > id);
}

#[tokio::test]
async fn restoring_over_open_table_is_refused() {
    let clock = ManualClock::new(0);
    let mut manager = manual_manager(&clock, funded_store(&[(1, 1_000)]));

    let id = manager.open_table("LIVE", DeterministicRng::from_seed(5)).unwrap();
    let driver = manager.driver(id).unwrap();
    driver.join(1).await.unwrap();
    driver.tick_now().await;
    driver.place_bet(1, PLAYER, 25).await.unwrap();

    let stale = driver.snapshot().await;
    driver.place_bet(1, PLAYER, 25).await.unwrap();

    assert!(matches!(
        manager.restore_table(stale, DeterministicRng::from_seed(5)),
        Err(EngineError::TableAlreadyOpen(t)) if t == id
    ));

    // Живой стол не тронут: ставки после снапшота на месте.
    let driver = manager.driver(id).unwrap();
    assert_eq!(driver.place_bet(1, PLAYER, 10).await.unwrap(), Chips(60));
    assert_eq!(manager.table_ids(), vec![id]);
}

#[tokio::test]
async fn unknown_table_is_reported() {
    let clock = ManualClock::new(0);
    let manager = manual_manager(&clock, funded_store(&[]));
    assert!(matches!(manager.driver(99), Err(EngineError::TableNotFound(99))));
    assert!(matches!(manager.start_table(99).await, Err(EngineError::TableNotFound(99))));
}

#[tokio::test]
async fn resume_without_store_is_a_config_error() {
    let clock = ManualClock::new(0);
    let mut manager = manual_manager(&clock, funded_store(&[]));
    assert!(matches!(
        manager.resume_table(1, DeterministicRng::from_seed(1)),
        Err(EngineError::InvalidConfig(_))
    ));
}

#[tokio::test]
async fn invalid_config_refuses_to_build_manager() {
    let mut config = CasinoConfig::default();
    config.baccarat.reshuffle_floor = 2;
    let result: Result<TableManager<DeterministicRng>, _> =
        TableManager::new(config, funded_store(&[]), Arc::new(ManualClock::new(0)));
    assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
}

#[tokio::test(start_paused = true)]
async fn stopped_driver_no_longer_ticks() {
    let balances = funded_store(&[(1, 1_000)]);
    let mut manager: TableManager<DeterministicRng> =
        TableManager::new(CasinoConfig::default(), balances, Arc::new(TokioClock::new(0))).unwrap();
    let id = manager.open_table("STOP", DeterministicRng::from_seed(2)).unwrap();
    let driver = manager.driver(id).unwrap();
    driver.join(1).await.unwrap();

    assert!(driver.start().await);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(driver.with_machine(|m| m.phase()).await, Some(RoundPhase::Betting));

    assert!(driver.stop().await);
    assert!(!driver.stop().await);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(driver.with_machine(|m| m.phase()).await, Some(RoundPhase::Betting));
}
