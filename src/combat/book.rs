//! Registry of in-flight attacks

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::combat::attack::Attack;
use crate::core::types::{AttackId, Owner, PlayerId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackBook {
    attacks: BTreeMap<AttackId, Attack>,
    next_id: u32,
}

impl Default for AttackBook {
    fn default() -> Self {
        Self::new()
    }
}

impl AttackBook {
    pub fn new() -> Self {
        Self {
            attacks: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn next_id(&mut self) -> AttackId {
        let id = AttackId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, attack: Attack) {
        self.attacks.insert(attack.id, attack);
    }

    pub fn get(&self, id: AttackId) -> Option<&Attack> {
        self.attacks.get(&id)
    }

    pub fn get_mut(&mut self, id: AttackId) -> Option<&mut Attack> {
        self.attacks.get_mut(&id)
    }

    pub fn remove(&mut self, id: AttackId) -> Option<Attack> {
        self.attacks.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.attacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attacks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attack> {
        self.attacks.values()
    }

    /// Live land attack of `attacker` against `defender`, if one is running
    pub fn land_attack_between(&self, attacker: PlayerId, defender: Owner) -> Option<AttackId> {
        self.attacks
            .values()
            .find(|a| a.attacker == attacker && a.defender == defender && a.is_land() && !a.cancelled)
            .map(|a| a.id)
    }

    /// Ids sorted into commit order
    pub fn in_priority_order(&self) -> Vec<AttackId> {
        let mut order: Vec<&Attack> = self.attacks.values().collect();
        order.sort_by_key(|a| a.priority());
        order.into_iter().map(|a| a.id).collect()
    }

    pub fn of_player(&self, player: PlayerId) -> Vec<AttackId> {
        self.attacks
            .values()
            .filter(|a| a.attacker == player)
            .map(|a| a.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TileId;

    #[test]
    fn test_finds_running_land_attack() {
        let mut book = AttackBook::new();
        let id = book.next_id();
        book.insert(Attack::land(id, PlayerId(1), Owner::TerraNullius, TileId(0), 5, 0));
        assert_eq!(book.land_attack_between(PlayerId(1), Owner::TerraNullius), Some(id));
        assert_eq!(book.land_attack_between(PlayerId(2), Owner::TerraNullius), None);

        book.get_mut(id).unwrap().cancelled = true;
        assert_eq!(book.land_attack_between(PlayerId(1), Owner::TerraNullius), None);
    }
}
