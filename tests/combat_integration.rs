//! Combat integration tests
//!
//! End-to-end attack scenarios driven through the scheduler, plus direct
//! checks of the step resolver against hand-built worlds.

use frontline::combat::{commit_step, resolve_step, Attack, Conclusion};
use frontline::core::types::{AttackId, Owner, PlayerId, PlayerInfo, TileId};
use frontline::core::{Config, SessionConfig, TunedPlayerConfig};
use frontline::intent::{Admission, Intent};
use frontline::scheduler::{EngineEvent, TickScheduler};
use frontline::world::{GameMap, UnitKind, WorldModel};

/// Balance table without passive growth, so ledgers only move through combat
fn static_config(tuned: TunedPlayerConfig) -> Config {
    Config::new(
        SessionConfig::default(),
        TunedPlayerConfig {
            growth_base: 0,
            growth_divisor: u64::MAX,
            gold_base: 0,
            gold_per_tile: 0,
            ..tuned
        },
    )
}

fn spawn(s: &mut TickScheduler, name: &str, tile: u32) -> PlayerId {
    let id = s.add_player(PlayerInfo::human(name));
    s.submit(Intent::Spawn {
        player: id,
        tile: TileId(tile),
    });
    id
}

#[test]
fn test_attack_on_terra_nullius_costs_fixed_price() {
    // A (10 troops) takes the single unclaimed tile next to it with 5 committed
    let tuned = TunedPlayerConfig {
        start_troops_human: 10,
        ..Default::default()
    };
    let config = static_config(tuned.clone());
    let mut s = TickScheduler::new(GameMap::land(3, 1), config).unwrap();
    let a = spawn(&mut s, "a", 0);
    s.step().unwrap();
    assert_eq!(s.world().player(a).unwrap().troops, 10);

    s.submit(Intent::LandAttack {
        player: a,
        target: TileId(2),
        troops: Some(5),
    });
    let report = s.step().unwrap();

    assert_eq!(s.world().owner(TileId(2)), Some(Owner::Player(a)));
    assert_eq!(
        s.world().player(a).unwrap().troops,
        10 - tuned.terra_nullius_cost
    );
    assert!(report
        .conclusions()
        .any(|(_, reason)| reason == Conclusion::NoTargets));
}

#[test]
fn test_terra_nullius_step_reports_no_defender_loss() {
    let mut world = WorldModel::new(GameMap::land(3, 1));
    let a = world.add_player(PlayerInfo::human("a"));
    world.claim_spawn(a, TileId(0), 10, 0).unwrap();

    let config = Config::default();
    let attack = Attack::land(AttackId(1), a, Owner::TerraNullius, TileId(2), 5, 1);
    let outcome = resolve_step(&attack, &world, &config).unwrap();
    assert_eq!(outcome.tiles_captured, vec![TileId(2)]);
    assert_eq!(outcome.defender_troop_loss, 0);
    assert_eq!(outcome.attacker_troop_loss, 1);
}

#[test]
fn test_player_contest_applies_loss_function() {
    // A fights with 20 against B's 15 spread over two tiles
    let mut world = WorldModel::new(GameMap::land(4, 1));
    let a = world.add_player(PlayerInfo::human("a"));
    let b = world.add_player(PlayerInfo::human("b"));
    world.claim_spawn(a, TileId(0), 20, 0).unwrap();
    world.claim_spawn(b, TileId(3), 15, 0).unwrap();
    world.commit_troops(a, 20).unwrap();

    let config = Config::default();
    let mut attack = Attack::land(AttackId(1), a, Owner::Player(b), TileId(2), 20, 1);
    let outcome = resolve_step(&attack, &world, &config).unwrap();

    let mut fighter = world.player(a).unwrap().clone();
    fighter.troops = 20;
    let defender = world.player(b).unwrap().clone();
    let tile = world.tile(TileId(2)).unwrap();
    let expected = config.player().attack_logic(
        &fighter,
        frontline::world::Defender::Player(&defender),
        &tile,
    );
    let falls = config
        .player()
        .tile_defeated(&defender, expected.defender_troop_loss);

    assert_eq!(outcome.contests.len(), 1);
    assert_eq!(outcome.attacker_troop_loss, expected.attacker_troop_loss);
    assert_eq!(outcome.defender_troop_loss, expected.defender_troop_loss);
    assert_eq!(outcome.contests[0].captured, falls);

    commit_step(&mut world, &mut attack, &outcome).unwrap();
    assert_eq!(attack.remaining, 20 - expected.attacker_troop_loss);
    assert_eq!(
        world.player(b).unwrap().troops,
        15 - expected.defender_troop_loss
    );
    let expected_owner = if falls { Owner::Player(a) } else { Owner::Player(b) };
    assert_eq!(world.owner(TileId(2)), Some(expected_owner));
}

#[test]
fn test_tile_held_below_defeat_threshold() {
    let config = Config::new(
        SessionConfig::default(),
        TunedPlayerConfig {
            attacker_loss_percent: 10,
            ..Default::default()
        },
    );
    let mut world = WorldModel::new(GameMap::land(4, 1));
    let a = world.add_player(PlayerInfo::human("a"));
    let b = world.add_player(PlayerInfo::human("b"));
    world.claim_spawn(a, TileId(0), 200, 0).unwrap();
    world.claim_spawn(b, TileId(3), 1_000, 0).unwrap();
    world.commit_troops(a, 200).unwrap();

    let mut attack = Attack::land(AttackId(1), a, Owner::Player(b), TileId(2), 200, 1);
    let outcome = resolve_step(&attack, &world, &config).unwrap();
    assert!(outcome.tiles_captured.is_empty());
    assert!(outcome.defender_troop_loss > 0);
    assert!(!outcome.attack_exhausted);

    commit_step(&mut world, &mut attack, &outcome).unwrap();
    assert_eq!(world.owner(TileId(2)), Some(Owner::Player(b)));
    assert_eq!(
        world.player(b).unwrap().troops,
        1_000 - outcome.defender_troop_loss
    );
}

#[test]
fn test_same_tile_same_tick_has_one_winner() {
    let run = |a_first: bool| {
        let mut s = TickScheduler::new(GameMap::land(5, 1), Config::default()).unwrap();
        let a = spawn(&mut s, "a", 0);
        let b = spawn(&mut s, "b", 4);
        s.step().unwrap();

        let attack_a = Intent::LandAttack {
            player: a,
            target: TileId(2),
            troops: Some(50),
        };
        let attack_b = Intent::LandAttack {
            player: b,
            target: TileId(2),
            troops: Some(50),
        };
        if a_first {
            s.submit(attack_a);
            s.submit(attack_b);
        } else {
            s.submit(attack_b);
            s.submit(attack_a);
        }
        let report = s.step().unwrap();
        (a, s, report)
    };

    let (a, first, report) = run(true);
    assert_eq!(first.world().owner(TileId(2)), Some(Owner::Player(a)));
    assert!(report.stale_retries >= 1);

    // Submission order within a tick does not decide the winner
    let (_, second, _) = run(false);
    assert_eq!(first.snapshot(), second.snapshot());
}

#[test]
fn test_attack_exhausted_mid_sequence() {
    let mut world = WorldModel::new(GameMap::land(5, 5));
    let a = world.add_player(PlayerInfo::human("a"));
    world.claim_spawn(a, TileId(12), 100, 0).unwrap();

    // Eight frontier tiles, a budget of four and only three troops
    let attack = Attack::land(AttackId(1), a, Owner::TerraNullius, TileId(6), 3, 1);
    let outcome = resolve_step(&attack, &world, &Config::default()).unwrap();
    assert!(outcome.attack_exhausted);
    assert_eq!(outcome.conclusion, Some(Conclusion::TroopsExhausted));
    assert_eq!(outcome.tiles_captured.len(), 2);
    assert!(outcome.attacker_troop_loss < 3);
}

#[test]
fn test_cancel_refunds_and_keeps_captures() {
    let config = static_config(TunedPlayerConfig::default());
    let mut s = TickScheduler::new(GameMap::land(30, 1), config).unwrap();
    let a = spawn(&mut s, "a", 0);
    s.step().unwrap();

    s.submit(Intent::LandAttack {
        player: a,
        target: TileId(2),
        troops: Some(100),
    });
    let report = s.step().unwrap();
    let attack = report
        .events
        .iter()
        .find_map(|e| match e {
            EngineEvent::IntentAdmitted {
                admission: Admission::AttackLaunched { attack, .. },
                ..
            } => Some(*attack),
            _ => None,
        })
        .unwrap();
    let owned = s.world().player(a).unwrap().tile_count();
    assert!(owned > 2);

    s.submit(Intent::CancelAttack { player: a, attack });
    let report = s.step().unwrap();
    assert!(report
        .conclusions()
        .any(|(id, reason)| id == attack && reason == Conclusion::Cancelled));
    assert_eq!(s.world().player(a).unwrap().tile_count(), owned);
    assert!(s.attacks().is_empty());
    // Every troop not spent on the captured tiles came back
    let spent = (owned - 2) as u64;
    assert_eq!(s.world().player(a).unwrap().troops, 1_000 - spent);
}

#[test]
fn test_defender_wiped_out_is_eliminated() {
    let tuned = TunedPlayerConfig {
        start_troops_human: 5_000,
        ..Default::default()
    };
    let mut s = TickScheduler::new(GameMap::land(5, 1), static_config(tuned)).unwrap();
    let a = spawn(&mut s, "a", 0);
    let b = s.add_player(PlayerInfo::bot("b"));
    s.submit(Intent::Spawn {
        player: b,
        tile: TileId(3),
    });
    s.step().unwrap();

    let mut eliminated = false;
    for _ in 0..10 {
        s.submit(Intent::LandAttack {
            player: a,
            target: TileId(2),
            troops: Some(1_000),
        });
        let report = s.step().unwrap();
        eliminated |= report
            .events
            .iter()
            .any(|e| matches!(e, EngineEvent::PlayerEliminated { player } if *player == b));
        if eliminated {
            break;
        }
    }
    assert!(eliminated);
    assert!(!s.world().player(b).unwrap().alive);
    assert_eq!(s.world().player(a).unwrap().tile_count(), 5);
}

const ISLANDS: &str = "
    ...~~~~...
    ...~~~~...
    ...~~~~...
";

#[test]
fn test_boat_crosses_and_continues_inland() {
    let mut s = TickScheduler::new(GameMap::parse(ISLANDS).unwrap(), Config::default()).unwrap();
    // Tile 12 sits on the west island's coast
    let a = spawn(&mut s, "a", 12);
    s.step().unwrap();

    s.submit(Intent::BoatAttack {
        player: a,
        target: TileId(17),
        troops: Some(200),
    });
    let mut landed = false;
    for _ in 0..10 {
        let report = s.step().unwrap();
        landed |= report
            .events
            .iter()
            .any(|e| matches!(e, EngineEvent::BoatLanded { captured: true, .. }));
    }
    assert!(landed);
    assert_eq!(s.world().owner(TileId(17)), Some(Owner::Player(a)));
    // The landing party kept expanding on the far island
    assert_eq!(s.world().owner(TileId(18)), Some(Owner::Player(a)));
}

#[test]
fn test_boat_needs_sea_path() {
    let mut s = TickScheduler::new(GameMap::land(6, 6), Config::default()).unwrap();
    let a = spawn(&mut s, "a", 14);
    s.step().unwrap();
    s.submit(Intent::BoatAttack {
        player: a,
        target: TileId(0),
        troops: Some(10),
    });
    let report = s.step().unwrap();
    assert_eq!(report.rejections().count(), 1);
}

#[test]
fn test_nuke_clears_territory_and_units() {
    let tuned = TunedPlayerConfig {
        start_gold: 10_000,
        ..Default::default()
    };
    let mut s = TickScheduler::new(GameMap::land(12, 1), static_config(tuned)).unwrap();
    let a = spawn(&mut s, "a", 0);
    let b = spawn(&mut s, "b", 9);
    s.step().unwrap();

    s.submit(Intent::BuildUnit {
        player: a,
        unit: UnitKind::MissileSilo,
        tile: TileId(0),
    });
    s.submit(Intent::BuildUnit {
        player: b,
        unit: UnitKind::MissileSilo,
        tile: TileId(9),
    });
    s.step().unwrap();
    assert_eq!(s.world().units().count(), 2);

    s.submit(Intent::SendNuke {
        player: a,
        target: TileId(9),
    });
    let report = s.step().unwrap();
    assert!(report
        .events
        .iter()
        .any(|e| matches!(e, EngineEvent::NukeDetonated { tiles: 3, .. })));
    assert!(report
        .events
        .iter()
        .any(|e| matches!(e, EngineEvent::PlayerEliminated { player } if *player == b)));
    assert_eq!(s.world().owner(TileId(9)), Some(Owner::TerraNullius));
    assert_eq!(s.world().units().count(), 1);
    assert_eq!(s.world().player(a).unwrap().gold, 10_000 - 1_000 - 2_000);
}

#[test]
fn test_cancelled_boat_refunds_at_next_tick() {
    let tuned = TunedPlayerConfig {
        boat_speed: 1,
        ..Default::default()
    };
    let map = GameMap::parse("..~~~~~~~~~~..").unwrap();
    let mut s = TickScheduler::new(map, static_config(tuned)).unwrap();
    let a = spawn(&mut s, "a", 0);
    s.step().unwrap();

    s.submit(Intent::BoatAttack {
        player: a,
        target: TileId(12),
        troops: Some(200),
    });
    let report = s.step().unwrap();
    let attack = report
        .events
        .iter()
        .find_map(|e| match e {
            EngineEvent::IntentAdmitted {
                admission: Admission::AttackLaunched { attack, .. },
                ..
            } => Some(*attack),
            _ => None,
        })
        .unwrap();
    assert_eq!(s.world().player(a).unwrap().troops, 800);

    // Ten water tiles at one per tick: the boat is far from landing
    s.submit(Intent::CancelAttack { player: a, attack });
    let report = s.step().unwrap();
    assert!(report
        .conclusions()
        .any(|(id, reason)| id == attack && reason == Conclusion::Cancelled));
    assert!(s.attacks().is_empty());
    assert_eq!(s.world().player(a).unwrap().troops, 1_000);
    assert_eq!(s.world().owner(TileId(12)), Some(Owner::TerraNullius));
}
