use crate::types::Ability;

/// Two one-shot flags armed by the player and consumed by the first tile
/// transition that observes them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AbilityGate {
    revive: bool,
    surround: bool,
}

impl AbilityGate {
    pub fn arm(&mut self, ability: Ability) {
        *self.flag_mut(ability) = true;
    }

    pub fn is_armed(&self, ability: Ability) -> bool {
        match ability {
            Ability::Revive => self.revive,
            Ability::Surround => self.surround,
        }
    }

    /// Take the flag: `true` exactly once per arm.
    pub fn consume(&mut self, ability: Ability) -> bool {
        std::mem::take(self.flag_mut(ability))
    }

    fn flag_mut(&mut self, ability: Ability) -> &mut bool {
        match ability {
            Ability::Revive => &mut self.revive,
            Ability::Surround => &mut self.surround,
        }
    }
}
