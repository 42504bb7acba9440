// src/bin/baccarat_dev_cli.rs
//
// Dev-прогон стола баккары с ботами на ручных часах:
// несколько раундов подряд без ожидания настоящего времени.
//
//   RUST_LOG=debug BACCARAT_DEV_ROUNDS=20 cargo run --bin baccarat_dev_cli

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

use casino_engine::api::build_table_view;
use casino_engine::config::CasinoConfig;
use casino_engine::domain::bet::BetCategory;
use casino_engine::domain::ParticipantId;
use casino_engine::engine::{EngineError, TableEvent, TableEventKind};
use casino_engine::infra::{BalanceStore, DeterministicRng, IdGenerator, InMemoryBalanceStore};
use casino_engine::runtime::{TableDriver, TableManager};
use casino_engine::time_ctrl::ManualClock;

const BOT_COUNT: usize = 5;
const BOT_BALANCE: i64 = 10_000;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), EngineError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let rounds: u64 = std::env::var("BACCARAT_DEV_ROUNDS")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(10);
    let seed: u64 = std::env::var("BACCARAT_DEV_SEED")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(42);

    // Без явного профиля dev-прогон идёт на быстрых таймингах.
    let config = CasinoConfig::from_lookup(|key| {
        std::env::var(key)
            .ok()
            .or_else(|| (key == "BACCARAT_TIMING_PROFILE").then(|| "fast".to_string()))
    });
    println!("baccarat_dev_cli: {rounds} раундов, seed {seed}, колод {}", config.baccarat.deck_count);

    let clock = ManualClock::new(0);
    let balances = Arc::new(InMemoryBalanceStore::new());
    let mut manager: TableManager<DeterministicRng> =
        TableManager::new(config.clone(), balances.clone(), Arc::new(clock.clone()))?;

    let table_id = manager.open_table("DEV BACCARAT", DeterministicRng::from_seed(seed))?;
    let driver = manager.driver(table_id)?;

    let ids = IdGenerator::new();
    let mut bots: Vec<ParticipantId> = Vec::with_capacity(BOT_COUNT);
    for _ in 0..BOT_COUNT {
        let bot = ids.next_participant_id();
        balances.deposit(bot, BOT_BALANCE)?;
        driver.join(bot).await?;
        bots.push(bot);
    }

    let mut bot_rng = StdRng::seed_from_u64(seed ^ 0x5eed);
    let bet_window_ms = config.timings.bet_window_ms();
    let cooldown_ms = config.timings.cooldown_ms();

    for _ in 0..rounds {
        // Открыть окно ставок.
        print_events(&driver.tick_now().await);

        for &bot in &bots {
            place_bot_bets(driver, bot, &mut bot_rng).await;
        }

        let now = driver.now_ms();
        let view = driver.with_machine(|m| build_table_view(m, now)).await;
        let totals: Vec<String> = view
            .bet_totals
            .iter()
            .filter(|t| !t.total.is_zero())
            .map(|t| format!("{}={}", t.category, t.total))
            .collect();
        println!("  ставки: [{}], всего {}", totals.join(", "), view.total_wagered);

        // Дедлайн ставок: раздача, шоудаун, расчёт, кулдаун.
        clock.advance(bet_window_ms);
        print_events(&driver.tick_now().await);

        clock.advance(cooldown_ms);
    }

    println!();
    println!("================ ИТОГИ =================");
    for bot in &bots {
        let balance = balances.balance(*bot)?.unwrap_or(0);
        println!("бот {bot}: баланс {balance} ({:+})", balance - BOT_BALANCE);
    }
    let history = balances.history()?;
    let house: i64 = history.iter().map(|r| -r.delta).sum();
    println!("записей расчёта: {}, результат дома: {house:+}", history.len());

    manager.stop_all().await;
    Ok(())
}

async fn place_bot_bets(driver: &TableDriver<DeterministicRng>, bot: ParticipantId, rng: &mut StdRng) {
    let bets = rng.gen_range(1..=2);
    for _ in 0..bets {
        let category = BetCategory::ALL[rng.gen_range(0..BetCategory::ALL.len())];
        let amount = rng.gen_range(1..=10) * 50;
        if let Err(err) = driver.place_bet(bot, category, amount).await {
            println!("  бот {bot}: ставка {category} {amount} отклонена: {err}");
        }
    }
}

fn print_events(events: &[TableEvent]) {
    for event in events {
        let line = match &event.kind {
            TableEventKind::RoundOpened { deadline_ms } => {
                format!("раунд #{} открыт, ставки до {deadline_ms} мс", event.round_no)
            }
            TableEventKind::ShoeReshuffled { cards_in_shoe } => {
                format!("шу пересобрана, карт: {cards_in_shoe}")
            }
            TableEventKind::DealingStarted {
                player_cards,
                banker_cards,
            } => format!("раздача: P {} | B {}", join_cards(player_cards), join_cards(banker_cards)),
            TableEventKind::HandsRevealed { snapshot, .. } => {
                let o = &snapshot.outcome;
                format!(
                    "шоудаун: P {} ({}) | B {} ({}) -> {:?}{}{}",
                    join_cards(&snapshot.player_cards),
                    o.player_score,
                    join_cards(&snapshot.banker_cards),
                    o.banker_score,
                    o.winner,
                    if o.player_pair { ", пара игрока" } else { "" },
                    if o.banker_pair { ", пара банкира" } else { "" },
                )
            }
            TableEventKind::RoundSettled {
                winners,
                cancellations,
                house_net,
                ..
            } => {
                let top: Vec<String> = winners
                    .iter()
                    .map(|w| format!("{}:{:+}", w.participant, w.net))
                    .collect();
                format!(
                    "расчёт: победители [{}], аннулировано {}, дом {house_net:+}",
                    top.join(", "),
                    cancellations.len()
                )
            }
            TableEventKind::CooldownStarted { resume_at_ms } => format!("пауза до {resume_at_ms} мс"),
            TableEventKind::RoundAborted { reason, .. } => format!("РАУНД ПРЕРВАН: {reason}"),
            TableEventKind::TableIdle { occupancy } => format!("стол ждёт игроков (сейчас {occupancy})"),
        };
        println!("[стол {} #{}] {line}", event.table_id, event.round_no);
    }
}

fn join_cards(cards: &[casino_engine::domain::card::Card]) -> String {
    cards.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" ")
}
