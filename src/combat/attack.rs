//! Attack - an in-flight, troop-funded expansion

use serde::{Deserialize, Serialize};

use crate::core::types::{AttackId, Owner, PlayerId, Tick, TileId, Troops};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackKind {
    /// Expands across the shared border every tick
    Land,
    /// At sea until `arrives_at`, then lands on `landing`
    Boat { landing: TileId, arrives_at: Tick },
}

/// Why an attack ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conclusion {
    /// Committed troops ran out or cannot pay for the next tile
    TroopsExhausted,
    /// Nothing left to capture from the defender
    NoTargets,
    /// The attacker owns no tiles any more
    AttackerEliminated,
    /// Called off by its owner
    Cancelled,
    /// The boat failed to take its beach
    LandingRepelled,
}

impl Conclusion {
    /// Whether unspent troops go back to the attacker
    pub fn refunds(self) -> bool {
        !matches!(
            self,
            Conclusion::AttackerEliminated | Conclusion::LandingRepelled
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attack {
    pub id: AttackId,
    pub attacker: PlayerId,
    pub defender: Owner,
    pub kind: AttackKind,
    /// Tile the order was given on
    pub target: TileId,
    /// Troops originally committed, including reinforcements
    pub committed: Troops,
    pub remaining: Troops,
    /// Cumulative attacker losses
    pub losses: Troops,
    pub issued_at: Tick,
    pub cancelled: bool,
}

impl Attack {
    pub fn land(
        id: AttackId,
        attacker: PlayerId,
        defender: Owner,
        target: TileId,
        troops: Troops,
        issued_at: Tick,
    ) -> Self {
        Self {
            id,
            attacker,
            defender,
            kind: AttackKind::Land,
            target,
            committed: troops,
            remaining: troops,
            losses: 0,
            issued_at,
            cancelled: false,
        }
    }

    pub fn boat(
        id: AttackId,
        attacker: PlayerId,
        defender: Owner,
        landing: TileId,
        troops: Troops,
        issued_at: Tick,
        arrives_at: Tick,
    ) -> Self {
        Self {
            kind: AttackKind::Boat {
                landing,
                arrives_at,
            },
            ..Self::land(id, attacker, defender, landing, troops, issued_at)
        }
    }

    /// Commit order within a tick: earliest issued first, then lower attacker id
    pub fn priority(&self) -> (Tick, PlayerId, AttackId) {
        (self.issued_at, self.attacker, self.id)
    }

    pub fn is_land(&self) -> bool {
        matches!(self.kind, AttackKind::Land)
    }

    /// Boat whose landing resolves at `tick`
    pub fn lands_at(&self, tick: Tick) -> bool {
        matches!(self.kind, AttackKind::Boat { arrives_at, .. } if arrives_at <= tick)
    }

    pub fn reinforce(&mut self, troops: Troops) {
        self.committed += troops;
        self.remaining += troops;
    }

    /// Record losses paid out of the committed pool
    pub fn spend(&mut self, losses: Troops) {
        let paid = losses.min(self.remaining);
        self.remaining -= paid;
        self.losses += paid;
    }
}
