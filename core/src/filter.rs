//! Event filters for analyzer subscriptions
//!
//! A filter is a conjunction over a closed set of dimensions: event kind,
//! ability id, source actor and target actor. An unset dimension matches
//! everything.
//!
//! ```
//! use linkcast_core::combat_log::EventKind;
//! use linkcast_core::filter::{Actor, EventFilter};
//!
//! // "damage by the analyzed actor's pet with ability in {A, B}"
//! let filter = EventFilter::of(EventKind::Damage)
//!     .by(Actor::SelectedPlayerPet)
//!     .spells([100, 200]);
//! # let _ = filter;
//! ```

use hashbrown::HashSet;

use crate::combat_log::{CombatEvent, EventKind};

/// Who the analysis is about
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actors {
    pub selected_player: i64,
    pub pets: HashSet<i64>,
}

impl Actors {
    pub fn new(selected_player: i64, pets: impl IntoIterator<Item = i64>) -> Self {
        Self {
            selected_player,
            pets: pets.into_iter().collect(),
        }
    }

    pub fn is_pet(&self, id: i64) -> bool {
        self.pets.contains(&id)
    }
}

/// Actor selector for the source or target dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Actor {
    #[default]
    Any,
    SelectedPlayer,
    SelectedPlayerPet,
    Id(i64),
}

impl Actor {
    fn matches(&self, id: Option<i64>, actors: &Actors) -> bool {
        match (self, id) {
            (Actor::Any, _) => true,
            (_, None) => false,
            (Actor::SelectedPlayer, Some(id)) => id == actors.selected_player,
            (Actor::SelectedPlayerPet, Some(id)) => actors.is_pet(id),
            (Actor::Id(expected), Some(id)) => *expected == id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    kinds: Vec<EventKind>,
    abilities: Vec<i64>,
    source: Actor,
    target: Actor,
}

impl EventFilter {
    /// Events of a single kind
    pub fn of(kind: EventKind) -> Self {
        Self {
            kinds: vec![kind],
            ..Self::default()
        }
    }

    pub fn of_kinds(kinds: impl IntoIterator<Item = EventKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn any_kind() -> Self {
        Self::default()
    }

    pub fn by(mut self, source: Actor) -> Self {
        self.source = source;
        self
    }

    pub fn to(mut self, target: Actor) -> Self {
        self.target = target;
        self
    }

    pub fn spell(self, ability_id: i64) -> Self {
        self.spells([ability_id])
    }

    pub fn spells(mut self, ability_ids: impl IntoIterator<Item = i64>) -> Self {
        self.abilities.extend(ability_ids);
        self
    }

    pub fn matches(&self, event: &CombatEvent, actors: &Actors) -> bool {
        (self.kinds.is_empty() || self.kinds.contains(&event.kind))
            && (self.abilities.is_empty() || self.abilities.contains(&event.ability_id))
            && self.source.matches(Some(event.source_id), actors)
            && self.target.matches(event.target_id, actors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actors() -> Actors {
        Actors::new(1, [50])
    }

    #[test]
    fn empty_filter_matches_everything() {
        let event = CombatEvent::new(EventKind::Death, 0, 9, Some(8), 0);
        assert!(EventFilter::any_kind().matches(&event, &actors()));
    }

    #[test]
    fn dimensions_combine_by_conjunction() {
        let filter = EventFilter::of(EventKind::Cast).by(Actor::SelectedPlayer).spell(115151);

        let hit = CombatEvent::new(EventKind::Cast, 0, 1, Some(3), 115151);
        let wrong_source = CombatEvent::new(EventKind::Cast, 0, 2, Some(3), 115151);
        let wrong_spell = CombatEvent::new(EventKind::Cast, 0, 1, Some(3), 124682);
        let wrong_kind = CombatEvent::new(EventKind::Heal, 0, 1, Some(3), 115151);

        assert!(filter.matches(&hit, &actors()));
        assert!(!filter.matches(&wrong_source, &actors()));
        assert!(!filter.matches(&wrong_spell, &actors()));
        assert!(!filter.matches(&wrong_kind, &actors()));
    }

    #[test]
    fn pet_and_target_selectors() {
        let pet_damage = EventFilter::of(EventKind::Damage)
            .by(Actor::SelectedPlayerPet)
            .spells([10, 11, 12]);
        let damage = |source| CombatEvent::new(EventKind::Damage, 0, source, Some(99), 11);
        assert!(pet_damage.matches(&damage(50), &actors()));
        assert!(!pet_damage.matches(&damage(1), &actors()));

        let pet_death = EventFilter::of(EventKind::Death).to(Actor::SelectedPlayerPet);
        let death = |target| CombatEvent::new(EventKind::Death, 0, 0, target, 0);
        assert!(pet_death.matches(&death(Some(50)), &actors()));
        assert!(!pet_death.matches(&death(None), &actors()));
    }

    #[test]
    fn multiple_kinds_and_explicit_ids() {
        let filter =
            EventFilter::of_kinds([EventKind::ApplyBuff, EventKind::RefreshBuff]).to(Actor::Id(7));
        let buff = |kind, target| CombatEvent::new(kind, 0, 1, Some(target), 1);
        assert!(filter.matches(&buff(EventKind::RefreshBuff, 7), &actors()));
        assert!(!filter.matches(&buff(EventKind::RemoveBuff, 7), &actors()));
        assert!(!filter.matches(&buff(EventKind::ApplyBuff, 6), &actors()));
    }
}
