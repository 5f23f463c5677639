use std::ops::Deref;

use linkcast_types::formatting;

use crate::attribution::{AttributionRules, AttributionScope, resolve};
use crate::combat_log::{CombatEvent, EventId, EventKind, EventStream, FightWindow};
use crate::combatant::Combatant;
use crate::filter::Actors;

/// Everything a module may read during one run.
///
/// Built by the session after normalization, so the stream it borrows is
/// already read-only.
#[derive(Debug, Clone, Copy)]
pub struct RunContext<'a> {
    pub stream: &'a EventStream,
    pub combatant: &'a Combatant,
    pub actors: &'a Actors,
    pub fight: FightWindow,
    pub scope: &'a AttributionScope,
}

impl<'a> RunContext<'a> {
    /// Hardcast-style attribution of `id` under this run's dedup scope
    pub fn is_attributed(&self, rules: &AttributionRules, id: EventId) -> bool {
        resolve(self.stream, rules, self.scope, id)
    }

    /// Fight-relative `M:SS.mmm`
    pub fn format_timestamp(&self, timestamp: i64) -> String {
        formatting::format_timestamp(timestamp, self.fight.start)
    }

    /// Healing plus absorbs done by the selected player and their pets
    pub fn total_healing(&self) -> i64 {
        self.stream
            .iter()
            .filter(|(_, e)| matches!(e.kind, EventKind::Heal | EventKind::Absorbed))
            .filter(|(_, e)| {
                e.source_id == self.actors.selected_player || self.actors.is_pet(e.source_id)
            })
            .map(|(_, e)| e.healing())
            .sum()
    }

    /// `amount` as a fraction of [`RunContext::total_healing`]
    pub fn healing_share(&self, amount: i64) -> f64 {
        match self.total_healing() {
            0 => 0.0,
            total => amount as f64 / total as f64,
        }
    }
}

/// Run context positioned at the event being delivered.
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    run: &'a RunContext<'a>,
    position: EventId,
}

impl<'a> HandlerContext<'a> {
    pub fn new(run: &'a RunContext<'a>, position: EventId) -> Self {
        Self { run, position }
    }

    pub fn position(&self) -> EventId {
        self.position
    }

    pub fn event(&self) -> &'a CombatEvent {
        &self.run.stream[self.position]
    }

    /// Stacks of a buff on the combatant just before the current event
    pub fn buff_stacks(&self, ability_id: i64) -> u32 {
        self.run.combatant.buff_stacks(ability_id, self.position)
    }

    pub fn has_buff(&self, ability_id: i64) -> bool {
        self.run.combatant.has_buff(ability_id, self.position)
    }
}

impl<'a> Deref for HandlerContext<'a> {
    type Target = RunContext<'a>;

    fn deref(&self) -> &RunContext<'a> {
        self.run
    }
}
