//! Government hostility.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use skirmish_core::types::GovernmentId;

/// Symmetric set of hostile government pairs, plus which one the player flies for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diplomacy {
    pub player: GovernmentId,
    #[serde(default)]
    hostile: BTreeSet<(GovernmentId, GovernmentId)>,
}

impl Diplomacy {
    pub fn new(player: GovernmentId) -> Self {
        Self {
            player,
            hostile: BTreeSet::new(),
        }
    }

    fn key(a: GovernmentId, b: GovernmentId) -> (GovernmentId, GovernmentId) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn is_hostile(&self, a: GovernmentId, b: GovernmentId) -> bool {
        a != b && self.hostile.contains(&Self::key(a, b))
    }

    pub fn set_hostile(&mut self, a: GovernmentId, b: GovernmentId, hostile: bool) {
        if a == b {
            return;
        }
        if hostile {
            self.hostile.insert(Self::key(a, b));
        } else {
            self.hostile.remove(&Self::key(a, b));
        }
    }

    /// The player's government attacked `victim`. Returns true if this
    /// turned a non-hostile government hostile.
    pub fn provoke(&mut self, attacker: GovernmentId, victim: GovernmentId) -> bool {
        if attacker != self.player || attacker == victim || self.is_hostile(attacker, victim) {
            return false;
        }
        self.set_hostile(attacker, victim, true);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostility_is_symmetric() {
        let mut d = Diplomacy::new(GovernmentId(0));
        d.set_hostile(GovernmentId(2), GovernmentId(1), true);
        assert!(d.is_hostile(GovernmentId(1), GovernmentId(2)));
        assert!(!d.is_hostile(GovernmentId(1), GovernmentId(1)));
        d.set_hostile(GovernmentId(1), GovernmentId(2), false);
        assert!(!d.is_hostile(GovernmentId(2), GovernmentId(1)));
    }

    #[test]
    fn test_only_player_provokes() {
        let mut d = Diplomacy::new(GovernmentId(0));
        assert!(!d.provoke(GovernmentId(3), GovernmentId(4)));
        assert!(d.provoke(GovernmentId(0), GovernmentId(4)));
        assert!(!d.provoke(GovernmentId(0), GovernmentId(4)));
        assert!(d.is_hostile(GovernmentId(4), GovernmentId(0)));
    }
}
