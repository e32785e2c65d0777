//! Scheduler integration tests
//!
//! Full sessions driven by the bot driver: tick sequencing, observer
//! publication, intent logs and replay determinism.

use std::sync::{Arc, Mutex};

use frontline::bots::BotDriver;
use frontline::core::types::{Owner, PlayerInfo, TileId};
use frontline::core::{Config, Rejection, SessionConfig, TunedPlayerConfig};
use frontline::intent::Intent;
use frontline::scheduler::{
    replay, run_realtime, EngineEvent, IntentLog, SchedulerState, SimulationOutput, TickReport,
    TickScheduler,
};
use frontline::world::GameMap;

const CONTINENTS: &str = "
    ..........~~~~~.........
    ..........~~~~~.........
    ...~~.....~~~~~.........
    ...~~.....~~~~~....~~...
    ..........~~~~~....~~...
    ..........~~~~~.........
";

fn bot_session(map: Arc<GameMap>, bots: usize, ticks: u64, seed: u64) -> TickScheduler {
    let mut scheduler = TickScheduler::with_shared_map(map, Config::default()).unwrap();
    let mut driver = BotDriver::new(seed);
    for i in 0..bots {
        let id = scheduler.add_player(PlayerInfo::bot(format!("Bot {}", i + 1)));
        driver.register(id);
    }
    for _ in 0..ticks {
        for intent in driver.plan(scheduler.world(), scheduler.attacks(), scheduler.config()) {
            scheduler.submit(intent);
        }
        scheduler.step().unwrap();
    }
    scheduler
}

#[test]
fn test_ticks_are_sequential_and_published() {
    let seen: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let mut scheduler = TickScheduler::new(GameMap::land(8, 8), Config::default()).unwrap();
    scheduler.add_observer(move |report: &TickReport| {
        sink.lock().unwrap().push(report.tick);
    });
    let reports = scheduler.run_ticks(5).unwrap();

    assert_eq!(scheduler.tick(), 5);
    assert_eq!(scheduler.state(), SchedulerState::Idle);
    assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4, 5]);
    assert!(reports
        .iter()
        .all(|r| r.session == scheduler.session_id()));
}

#[test]
fn test_intents_wait_for_the_tick_boundary() {
    let mut scheduler = TickScheduler::new(GameMap::land(6, 6), Config::default()).unwrap();
    let a = scheduler.add_player(PlayerInfo::human("a"));
    scheduler.submit(Intent::Spawn {
        player: a,
        tile: TileId(14),
    });

    assert_eq!(scheduler.pending_intents().len(), 1);
    assert_eq!(scheduler.world().owner(TileId(14)), Some(Owner::TerraNullius));

    let report = scheduler.step().unwrap();
    assert!(scheduler.pending_intents().is_empty());
    assert_eq!(scheduler.world().owner(TileId(14)), Some(Owner::Player(a)));
    assert_eq!(report.ownership_changes.len(), 5);
    assert_eq!(report.player(a).map(|p| p.tiles), Some(5));
}

#[test]
fn test_rejections_leave_world_untouched() {
    let mut scheduler = TickScheduler::new(GameMap::land(6, 6), Config::default()).unwrap();
    let a = scheduler.add_player(PlayerInfo::human("a"));
    let before = scheduler.snapshot();

    // Not spawned yet, so it cannot attack or build
    scheduler.submit(Intent::LandAttack {
        player: a,
        target: TileId(0),
        troops: Some(10),
    });
    scheduler.submit(Intent::Spawn {
        player: a,
        tile: TileId(99),
    });
    let report = scheduler.step().unwrap();

    assert_eq!(report.rejections().count(), 2);
    assert!(report.ownership_changes.is_empty());
    assert_eq!(scheduler.snapshot().owners, before.owners);
    assert_eq!(scheduler.stats().intents_rejected, 2);
    assert!(report
        .rejections()
        .any(|(_, reason)| matches!(reason, Rejection::UnknownTile(_))));
}

#[test]
fn test_one_spawn_per_tile() {
    let mut scheduler = TickScheduler::new(GameMap::land(6, 6), Config::default()).unwrap();
    let a = scheduler.add_player(PlayerInfo::human("a"));
    let b = scheduler.add_player(PlayerInfo::human("b"));
    scheduler.submit(Intent::Spawn {
        player: a,
        tile: TileId(14),
    });
    scheduler.submit(Intent::Spawn {
        player: b,
        tile: TileId(14),
    });
    let report = scheduler.step().unwrap();

    assert_eq!(scheduler.world().owner(TileId(14)), Some(Owner::Player(a)));
    let rejected: Vec<_> = report.rejections().map(|(i, _)| i.player()).collect();
    assert_eq!(rejected, vec![b]);
}

#[test]
fn test_bot_session_keeps_ownership_consistent() {
    let map = Arc::new(GameMap::parse(CONTINENTS).unwrap());
    let scheduler = bot_session(Arc::clone(&map), 4, 150, 99);
    let world = scheduler.world();

    for tile in map.tiles() {
        let owner = world.owner(tile).unwrap();
        let holders = world.players().filter(|p| p.owns(tile)).count();
        match owner {
            Owner::Player(id) => {
                assert_eq!(holders, 1);
                assert!(world.player(id).unwrap().owns(tile));
            }
            Owner::TerraNullius => assert_eq!(holders, 0),
        }
    }
    for player in world.players() {
        assert_eq!(player.alive, !player.spawned || player.tile_count() > 0);
    }
    for attack in scheduler.attacks().iter() {
        assert!(attack.losses + attack.remaining <= attack.committed);
    }
}

#[test]
fn test_replay_reproduces_the_session() {
    let map = Arc::new(GameMap::parse(CONTINENTS).unwrap());
    let recorded = bot_session(Arc::clone(&map), 4, 120, 7);
    assert!(recorded.intent_log().intent_count() > 0);

    let json = recorded.intent_log().to_json().unwrap();
    let log = IntentLog::from_json(&json).unwrap();
    assert_eq!(&log, recorded.intent_log());

    let replayed = replay(map, Config::default(), &log).unwrap();
    assert_eq!(replayed.tick(), recorded.tick());
    assert_eq!(replayed.snapshot(), recorded.snapshot());
}

#[test]
fn test_same_seed_same_outcome() {
    let map = Arc::new(GameMap::land(24, 16));
    let first = bot_session(Arc::clone(&map), 6, 100, 3);
    let second = bot_session(map, 6, 100, 3);
    assert_eq!(first.snapshot(), second.snapshot());
    assert_eq!(first.intent_log(), second.intent_log());
}

#[test]
fn test_simulation_output_summarises_session() {
    let map = Arc::new(GameMap::land(16, 16));
    let scheduler = bot_session(map, 3, 60, 11);
    let output = SimulationOutput::new(&scheduler, std::time::Duration::from_millis(5));

    assert_eq!(output.statistics.ticks_simulated, 60);
    assert_eq!(output.statistics.players_at_start, 3);
    let board = output.leaderboard();
    assert!(board.windows(2).all(|w| w[0].tiles >= w[1].tiles));
    assert!(output.to_json().contains("\"final_world\""));
}

#[test]
fn test_invalid_session_config_is_refused() {
    let session = SessionConfig {
        turn_interval_ms: 0,
        ..Default::default()
    };
    let config = Config::new(session, TunedPlayerConfig::default());
    assert!(TickScheduler::new(GameMap::land(4, 4), config).is_err());
}

#[test]
fn test_reports_list_conclusions_once() {
    let mut scheduler = TickScheduler::new(GameMap::land(3, 1), Config::default()).unwrap();
    let a = scheduler.add_player(PlayerInfo::human("a"));
    scheduler.submit(Intent::Spawn {
        player: a,
        tile: TileId(0),
    });
    scheduler.step().unwrap();
    scheduler.submit(Intent::LandAttack {
        player: a,
        target: TileId(2),
        troops: Some(50),
    });
    let reports = scheduler.run_ticks(3).unwrap();

    let concluded: usize = reports.iter().map(|r| r.conclusions().count()).sum();
    assert_eq!(concluded, 1);
    assert!(reports[0].events.iter().any(|e| matches!(
        e,
        EngineEvent::AttackConcluded { refunded: 49, .. }
    )));
    assert_eq!(scheduler.stats().attacks_concluded, 1);
}

#[tokio::test]
async fn test_realtime_session_accepts_intents() {
    let session = SessionConfig {
        turn_interval_ms: 5,
        ..Default::default()
    };
    let config = Config::new(session, TunedPlayerConfig::default());
    let mut scheduler = TickScheduler::new(GameMap::land(8, 8), config).unwrap();
    let a = scheduler.add_player(PlayerInfo::human("a"));

    let (tx, rx) = tokio::sync::mpsc::channel(16);
    tx.send(Intent::Spawn {
        player: a,
        tile: TileId(27),
    })
    .await
    .unwrap();

    let scheduler = run_realtime(scheduler, rx, Some(4)).await.unwrap();
    assert_eq!(scheduler.tick(), 4);
    assert_eq!(scheduler.world().owner(TileId(27)), Some(Owner::Player(a)));
    drop(tx);
}
