//! Tick scheduler - the single authority that advances one session
//!
//! Each `step()` resolves one tick on a staged copy of the world:
//!
//! 1. admit queued intents in submission order
//! 2. troop growth and gold income (parallel reads, then applied)
//! 3. cancelled attacks conclude and refund
//! 4. boat landings due this tick
//! 5. land attack steps (parallel reads, sequential commits in priority order)
//! 6. nuke detonations
//! 7. eliminations
//!
//! The staged world replaces the live one only when every phase succeeded,
//! so a failed tick leaves no trace and the tick counter does not move.

use std::collections::BTreeSet;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::combat::{
    commit_detonation, commit_landing, commit_step, resolve_detonation, resolve_landing,
    resolve_step, AttackBook, Conclusion, StepOutcome,
};
use crate::core::config::Config;
use crate::core::error::{EngineError, Result};
use crate::core::types::{AttackId, PlayerId, PlayerInfo, Tick};
use crate::economy::{apply_updates, plan_updates};
use crate::intent::{admit, Admission, Intent};
use crate::scheduler::replay::IntentLog;
use crate::scheduler::report::{EngineEvent, OwnershipChange, TickObserver, TickReport};
use crate::world::{GameMap, WorldModel, WorldSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerState {
    /// Waiting for the next tick boundary
    Idle,
    /// Applying one tick
    Resolving,
}

/// Running totals over the session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub ticks: u64,
    pub intents_admitted: u64,
    pub intents_rejected: u64,
    pub attacks_concluded: u64,
    pub stale_retries: u64,
    pub failed_ticks: u64,
}

/// Result of resolving a tick, not yet published
struct StagedTick {
    world: WorldModel,
    attacks: AttackBook,
    report: TickReport,
}

pub struct TickScheduler {
    session: Uuid,
    config: Config,
    world: WorldModel,
    attacks: AttackBook,
    tick: Tick,
    state: SchedulerState,
    queue: Vec<Intent>,
    log: IntentLog,
    observers: Vec<Box<dyn TickObserver>>,
    stats: SchedulerStats,
}

impl TickScheduler {
    pub fn new(map: GameMap, config: Config) -> Result<Self> {
        Self::with_shared_map(Arc::new(map), config)
    }

    pub fn with_shared_map(map: Arc<GameMap>, config: Config) -> Result<Self> {
        config.session.validate()?;
        let session = Uuid::new_v4();
        info!(%session, tiles = map.tile_count(), "session created");
        Ok(Self {
            session,
            config,
            world: WorldModel::with_shared_map(map),
            attacks: AttackBook::new(),
            tick: 0,
            state: SchedulerState::Idle,
            queue: Vec::new(),
            log: IntentLog::new(),
            observers: Vec::new(),
            stats: SchedulerStats::default(),
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn world(&self) -> &WorldModel {
        &self.world
    }

    pub fn attacks(&self) -> &AttackBook {
        &self.attacks
    }

    /// Last completed tick
    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    pub fn intent_log(&self) -> &IntentLog {
        &self.log
    }

    pub fn pending_intents(&self) -> &[Intent] {
        &self.queue
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        self.world.snapshot(self.tick)
    }

    /// Register a participant; it owns nothing until a `Spawn` intent is admitted
    pub fn add_player(&mut self, info: PlayerInfo) -> PlayerId {
        self.log.register(info.clone());
        let id = self.world.add_player(info);
        info!(player = %id, "player joined");
        id
    }

    pub fn add_observer(&mut self, observer: impl TickObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Queue an intent for admission at the next tick
    pub fn submit(&mut self, intent: Intent) {
        self.queue.push(intent);
    }

    /// Resolve exactly one tick
    pub fn step(&mut self) -> Result<TickReport> {
        let tick = self.tick + 1;
        self.state = SchedulerState::Resolving;

        let staged = match self.resolve(tick) {
            Ok(staged) => staged,
            Err(e) => {
                self.stats.failed_ticks += 1;
                self.state = SchedulerState::Idle;
                error!(tick, error = %e, "tick discarded");
                return Err(e);
            }
        };

        let StagedTick {
            world,
            attacks,
            report,
        } = staged;
        self.world = world;
        self.attacks = attacks;
        self.tick = tick;
        self.log.record(tick, std::mem::take(&mut self.queue));
        self.record_stats(&report);

        for observer in &mut self.observers {
            observer.on_tick(&report);
        }
        self.state = SchedulerState::Idle;

        debug!(
            tick,
            changes = report.ownership_changes.len(),
            attacks = report.active_attacks,
            "tick complete"
        );
        Ok(report)
    }

    /// Resolve `ticks` ticks back to back
    pub fn run_ticks(&mut self, ticks: u64) -> Result<Vec<TickReport>> {
        (0..ticks).map(|_| self.step()).collect()
    }

    fn record_stats(&mut self, report: &TickReport) {
        self.stats.ticks += 1;
        self.stats.stale_retries += u64::from(report.stale_retries);
        for event in &report.events {
            match event {
                EngineEvent::IntentAdmitted { .. } => self.stats.intents_admitted += 1,
                EngineEvent::IntentRejected { .. } => self.stats.intents_rejected += 1,
                EngineEvent::AttackConcluded { .. } => self.stats.attacks_concluded += 1,
                _ => {}
            }
        }
    }

    fn resolve(&self, tick: Tick) -> Result<StagedTick> {
        let config = &self.config;
        let mut world = self.world.clone();
        let mut attacks = self.attacks.clone();
        let mut events = Vec::new();

        // 1. Admission
        let mut nukes = Vec::new();
        for intent in &self.queue {
            match admit(intent, &mut world, &mut attacks, config, tick) {
                Ok(admission) => {
                    if let Admission::NukeLaunched(detonation) = admission {
                        nukes.push(detonation);
                    }
                    events.push(EngineEvent::IntentAdmitted {
                        intent: intent.clone(),
                        admission,
                    });
                }
                Err(reason) => {
                    warn!(
                        tick,
                        player = %intent.player(),
                        kind = intent.kind(),
                        %reason,
                        "intent rejected"
                    );
                    events.push(EngineEvent::IntentRejected {
                        intent: intent.clone(),
                        reason,
                    });
                }
            }
        }

        // 2. Economy
        let updates = plan_updates(&world, config)?;
        apply_updates(&mut world, &updates)?;

        // 3. Cancellations, including boats still at sea
        let cancelled: Vec<AttackId> = attacks
            .in_priority_order()
            .into_iter()
            .filter(|id| attacks.get(*id).is_some_and(|a| a.cancelled))
            .collect();
        for id in cancelled {
            conclude(&mut world, &mut attacks, id, Conclusion::Cancelled, &mut events)?;
        }

        // 4. Boat landings
        let mut landed = BTreeSet::new();
        for id in attacks.in_priority_order() {
            let Some(attack) = attacks.get(id) else {
                continue;
            };
            if !attack.lands_at(tick) {
                continue;
            }
            let outcome = resolve_landing(attack, &world, config)?;
            if let Some(attack) = attacks.get_mut(id) {
                commit_landing(&mut world, attack, &outcome)?;
            }
            events.push(EngineEvent::BoatLanded {
                attack: id,
                tile: outcome.tile,
                captured: outcome.captured,
            });
            landed.insert(id);
            if let Some(reason) = outcome.conclusion {
                conclude(&mut world, &mut attacks, id, reason, &mut events)?;
            }
        }

        // 5. Land attacks
        let order: Vec<AttackId> = attacks
            .in_priority_order()
            .into_iter()
            .filter(|id| !landed.contains(id))
            .collect();
        let snapshot = &world;
        // PARALLEL: every step reads the same staged world
        let planned: Vec<(AttackId, StepOutcome)> = order
            .par_iter()
            .filter_map(|id| attacks.get(*id))
            .filter(|a| a.is_land())
            .map(|a| resolve_step(a, snapshot, config).map(|o| (a.id, o)))
            .collect::<Result<Vec<_>>>()?;

        let mut stale_retries = 0u32;
        for (id, outcome) in planned {
            let Some(outcome) =
                commit_with_retry(&mut world, &mut attacks, id, outcome, config, &mut stale_retries)?
            else {
                continue;
            };
            if let Some(reason) = outcome.conclusion {
                conclude(&mut world, &mut attacks, id, reason, &mut events)?;
            }
        }

        // 6. Nukes
        for nuke in nukes {
            let blast = resolve_detonation(&nuke, &world, config)?;
            let destroyed_units = commit_detonation(&mut world, &nuke, &blast)?;
            events.push(EngineEvent::NukeDetonated {
                launcher: nuke.launcher,
                target: nuke.target,
                tiles: blast.tiles.len(),
                destroyed_units,
            });
        }

        // 7. Eliminations
        let fallen: Vec<PlayerId> = world
            .alive_players()
            .filter(|p| p.spawned && p.tile_count() == 0)
            .map(|p| p.id)
            .collect();
        for player in fallen {
            world.eliminate(player)?;
            info!(tick, %player, "player eliminated");
            events.push(EngineEvent::PlayerEliminated { player });
            for id in attacks.of_player(player) {
                conclude(
                    &mut world,
                    &mut attacks,
                    id,
                    Conclusion::AttackerEliminated,
                    &mut events,
                )?;
            }
        }

        let ownership_changes = world
            .map()
            .tiles()
            .filter_map(|tile| {
                let from = self.world.owner(tile)?;
                let to = world.owner(tile)?;
                (from != to).then_some(OwnershipChange { tile, from, to })
            })
            .collect();

        let report = TickReport {
            session: self.session,
            tick,
            ownership_changes,
            players: world.summaries(),
            events,
            active_attacks: attacks.len(),
            stale_retries,
        };
        Ok(StagedTick {
            world,
            attacks,
            report,
        })
    }
}

/// Commit a planned step, re-resolving it against the staged world while it is stale
///
/// Returns `None` when the attack sits this tick out after running out of
/// retries.
fn commit_with_retry(
    world: &mut WorldModel,
    attacks: &mut AttackBook,
    id: AttackId,
    mut outcome: StepOutcome,
    config: &Config,
    stale_retries: &mut u32,
) -> Result<Option<StepOutcome>> {
    let Some(attack) = attacks.get_mut(id) else {
        return Ok(None);
    };
    let mut attempts = 0;
    loop {
        match commit_step(world, attack, &outcome) {
            Ok(()) => return Ok(Some(outcome)),
            Err(EngineError::StaleWorldState { tile, .. })
                if attempts < config.session.max_stale_retries =>
            {
                attempts += 1;
                *stale_retries += 1;
                debug!(attack = %id, %tile, attempts, "stale step, re-resolving");
                outcome = resolve_step(attack, world, config)?;
            }
            Err(EngineError::StaleWorldState { tile, .. }) => {
                warn!(attack = %id, %tile, "step still stale after retries, skipping tick");
                return Ok(None);
            }
            Err(e) => return Err(e),
        }
    }
}

/// Remove a finished attack, refunding what it did not spend
fn conclude(
    world: &mut WorldModel,
    attacks: &mut AttackBook,
    id: AttackId,
    reason: Conclusion,
    events: &mut Vec<EngineEvent>,
) -> Result<()> {
    let Some(attack) = attacks.remove(id) else {
        return Ok(());
    };
    let refunded = if reason.refunds() {
        attack.remaining
    } else {
        0
    };
    if refunded > 0 {
        world.refund_troops(attack.attacker, refunded)?;
    }
    debug!(attack = %id, ?reason, refunded, "attack concluded");
    events.push(EngineEvent::AttackConcluded {
        attack: id,
        attacker: attack.attacker,
        reason,
        refunded,
    });
    Ok(())
}
