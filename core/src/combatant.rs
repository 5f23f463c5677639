//! Read-only loadout and buff state of the analyzed actor.
//!
//! Buff stacks are derived once from the sorted stream at ingestion and
//! queried by stream position afterwards, so every module sees the same
//! answer for the same event regardless of handler order.

use hashbrown::{HashMap, HashSet};

use crate::combat_log::{EventId, EventKind, EventStream};

#[derive(Debug, Clone, Default)]
pub struct Combatant {
    id: i64,
    talents: HashSet<i64>,
    /// buff ability id -> (position of change, stacks after the change)
    buffs: HashMap<i64, Vec<(EventId, u32)>>,
}

impl Combatant {
    pub fn new(id: i64, talents: impl IntoIterator<Item = i64>) -> Self {
        Self {
            id,
            talents: talents.into_iter().collect(),
            buffs: HashMap::new(),
        }
    }

    /// Build the combatant and its buff timeline from an ingested stream.
    pub fn from_stream(
        id: i64,
        talents: impl IntoIterator<Item = i64>,
        stream: &EventStream,
    ) -> Self {
        let mut combatant = Self::new(id, talents);
        for (pos, event) in stream.iter() {
            if event.target_id != Some(id) || stream.is_malformed(pos) {
                continue;
            }
            let current = combatant.latest_stacks(event.ability_id);
            let next = match event.kind {
                EventKind::ApplyBuff => event.details.stacks.unwrap_or(1),
                EventKind::ApplyBuffStack | EventKind::RemoveBuffStack => {
                    event.details.stacks.unwrap_or(current)
                }
                // A refresh without a recorded apply means the buff predates the log
                EventKind::RefreshBuff => current.max(1),
                EventKind::RemoveBuff => 0,
                _ => continue,
            };
            if next != current {
                combatant.buffs.entry(event.ability_id).or_default().push((pos, next));
            }
        }
        combatant
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn has_talent(&self, ability_id: i64) -> bool {
        self.talents.contains(&ability_id)
    }

    /// Stacks of `ability_id` on the combatant just before the event at `position`.
    pub fn buff_stacks(&self, ability_id: i64, position: EventId) -> u32 {
        let Some(changes) = self.buffs.get(&ability_id) else {
            return 0;
        };
        let idx = changes.partition_point(|(pos, _)| *pos < position);
        idx.checked_sub(1).map(|i| changes[i].1).unwrap_or(0)
    }

    pub fn has_buff(&self, ability_id: i64, position: EventId) -> bool {
        self.buff_stacks(ability_id, position) > 0
    }

    fn latest_stacks(&self, ability_id: i64) -> u32 {
        self.buffs
            .get(&ability_id)
            .and_then(|changes| changes.last())
            .map(|(_, stacks)| *stacks)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat_log::CombatEvent;

    const PLAYER: i64 = 1;
    const TOTM: i64 = 202090;

    fn buff(kind: EventKind, ts: i64) -> CombatEvent {
        CombatEvent::new(kind, ts, PLAYER, Some(PLAYER), TOTM)
    }

    #[test]
    fn tracks_stacks_by_position() {
        let stream = EventStream::ingest(vec![
            buff(EventKind::ApplyBuff, 100),
            buff(EventKind::ApplyBuffStack, 200).with_stacks(2),
            CombatEvent::new(EventKind::Cast, 250, PLAYER, None, 100784),
            buff(EventKind::ApplyBuffStack, 300).with_stacks(3),
            buff(EventKind::RemoveBuff, 400),
            CombatEvent::new(EventKind::Cast, 450, PLAYER, None, 100784),
        ]);
        let combatant = Combatant::from_stream(PLAYER, [], &stream);

        assert_eq!(combatant.buff_stacks(TOTM, EventId(0)), 0);
        assert_eq!(combatant.buff_stacks(TOTM, EventId(1)), 1);
        assert_eq!(combatant.buff_stacks(TOTM, EventId(2)), 2);
        assert_eq!(combatant.buff_stacks(TOTM, EventId(4)), 3);
        assert!(!combatant.has_buff(TOTM, EventId(5)));
    }

    #[test]
    fn ignores_buffs_on_other_targets() {
        let stream = EventStream::ingest(vec![
            CombatEvent::new(EventKind::ApplyBuff, 0, PLAYER, Some(9), TOTM),
            CombatEvent::new(EventKind::Cast, 1, PLAYER, None, 1),
        ]);
        let combatant = Combatant::from_stream(PLAYER, [], &stream);
        assert_eq!(combatant.buff_stacks(TOTM, EventId(1)), 0);
    }

    #[test]
    fn refresh_without_apply_counts_as_one_stack() {
        let stream = EventStream::ingest(vec![
            buff(EventKind::RefreshBuff, 0),
            CombatEvent::new(EventKind::Cast, 1, PLAYER, None, 1),
        ]);
        let combatant = Combatant::from_stream(PLAYER, [], &stream);
        assert_eq!(combatant.buff_stacks(TOTM, EventId(1)), 1);
    }

    #[test]
    fn talents() {
        let combatant = Combatant::new(PLAYER, [325197, 191837]);
        assert!(combatant.has_talent(325197));
        assert!(!combatant.has_talent(388031));
        assert_eq!(combatant.id(), PLAYER);
    }
}
