use std::ops::{Index, Range};

use linkcast_types::{Diagnostic, DiagnosticKind};

use super::event::{CombatEvent, EventId};
use super::relations::RelationEdge;

/// Owns every event of a run, sorted by timestamp.
///
/// Ties keep their ingestion order (stable sort), and that order is what
/// [`EventId`]s encode. Relations point into this arena by index.
#[derive(Debug, Clone, Default)]
pub struct EventStream {
    events: Vec<CombatEvent>,
    malformed: Vec<bool>,
    diagnostics: Vec<Diagnostic>,
}

impl EventStream {
    /// Sort and validate raw events. Malformed events stay in the stream but
    /// are excluded from linking; each one produces a diagnostic.
    pub fn ingest(mut events: Vec<CombatEvent>) -> Self {
        let out_of_order = events
            .windows(2)
            .filter(|pair| pair[1].timestamp < pair[0].timestamp)
            .count();
        if out_of_order > 0 {
            tracing::debug!(out_of_order, "Sorting replay events by timestamp");
            events.sort_by_key(|e| e.timestamp);
        }

        let mut malformed = Vec::with_capacity(events.len());
        let mut diagnostics = Vec::new();
        for (idx, event) in events.iter().enumerate() {
            match event.missing_field() {
                Some(field) => {
                    tracing::warn!(
                        index = idx,
                        timestamp = event.timestamp,
                        kind = %event.kind,
                        field,
                        "Malformed event skipped for linking"
                    );
                    diagnostics.push(Diagnostic {
                        kind: DiagnosticKind::MalformedEvent,
                        event_index: Some(idx),
                        timestamp: Some(event.timestamp),
                        message: format!("{} event is missing `{}`", event.kind, field),
                    });
                    malformed.push(true);
                }
                None => malformed.push(false),
            }
        }

        Self {
            events,
            malformed,
            diagnostics,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: EventId) -> Option<&CombatEvent> {
        self.events.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (EventId, &CombatEvent)> {
        self.events.iter().enumerate().map(|(i, e)| (EventId(i), e))
    }

    pub fn is_malformed(&self, id: EventId) -> bool {
        self.malformed.get(id.index()).copied().unwrap_or(false)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Index range of events with `from <= timestamp <= to`
    pub fn window(&self, from: i64, to: i64) -> Range<usize> {
        let start = self.events.partition_point(|e| e.timestamp < from);
        let end = self.events.partition_point(|e| e.timestamp <= to);
        start..end.max(start)
    }

    /// Events related to `id` under `relation`, in relation order
    pub fn related<'a>(
        &'a self,
        id: EventId,
        relation: &'a str,
    ) -> impl Iterator<Item = (EventId, &'a CombatEvent)> + 'a {
        self.get(id)
            .map(|e| e.related(relation))
            .unwrap_or(&[])
            .iter()
            .filter_map(move |rel| self.get(*rel).map(|e| (*rel, e)))
    }

    /// Total number of relation edges
    pub fn relation_count(&self) -> usize {
        self.events.iter().map(|e| e.relations().len()).sum()
    }

    /// Flattened relation graph, ordered by source event then relation name
    pub fn relation_graph(&self) -> Vec<RelationEdge> {
        let mut edges = Vec::with_capacity(self.relation_count());
        for (from, event) in self.iter() {
            for (relation, ids) in event.relations().iter() {
                edges.extend(ids.iter().map(|to| RelationEdge {
                    from,
                    relation: relation.to_string(),
                    to: *to,
                }));
            }
        }
        edges
    }

    /// Add `from -[relation]-> to`. Only the normalizer writes relations.
    pub(crate) fn link(&mut self, from: EventId, relation: &str, to: EventId) -> bool {
        match self.events.get_mut(from.index()) {
            Some(event) => event.relations_mut().insert(relation, to),
            None => false,
        }
    }
}

impl Index<EventId> for EventStream {
    type Output = CombatEvent;

    fn index(&self, id: EventId) -> &CombatEvent {
        &self.events[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat_log::EventKind;

    fn cast(ts: i64, ability: i64) -> CombatEvent {
        CombatEvent::new(EventKind::Cast, ts, 1, Some(2), ability)
    }

    #[test]
    fn ingest_sorts_stably_by_timestamp() {
        let stream = EventStream::ingest(vec![cast(20, 1), cast(10, 2), cast(20, 3), cast(10, 4)]);
        let abilities: Vec<i64> = stream.iter().map(|(_, e)| e.ability_id).collect();
        assert_eq!(abilities, vec![2, 4, 1, 3]);
    }

    #[test]
    fn malformed_events_are_flagged_and_reported() {
        let stream = EventStream::ingest(vec![
            cast(0, 1),
            CombatEvent::new(EventKind::Heal, 5, 1, None, 9),
        ]);
        assert!(!stream.is_malformed(EventId(0)));
        assert!(stream.is_malformed(EventId(1)));
        assert_eq!(stream.diagnostics().len(), 1);
        assert_eq!(stream.diagnostics()[0].kind, DiagnosticKind::MalformedEvent);
        assert_eq!(stream.diagnostics()[0].event_index, Some(1));
    }

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let stream = EventStream::ingest(vec![cast(0, 1), cast(10, 2), cast(20, 3), cast(30, 4)]);
        assert_eq!(stream.window(10, 20), 1..3);
        assert_eq!(stream.window(11, 19), 2..2);
        assert_eq!(stream.window(30, 30), 3..4);
        assert_eq!(stream.window(-5, 100), 0..4);
    }

    #[test]
    fn relation_graph_lists_every_edge() {
        let mut stream = EventStream::ingest(vec![cast(0, 1), cast(10, 2)]);
        assert!(stream.link(EventId(1), "FromHardcast", EventId(0)));
        assert!(stream.link(EventId(0), "AppliedHeal", EventId(1)));
        assert!(!stream.link(EventId(0), "AppliedHeal", EventId(1)));

        let graph = stream.relation_graph();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph[0].from, EventId(0));
        assert_eq!(graph[0].relation, "AppliedHeal");
        assert_eq!(stream.related(EventId(1), "FromHardcast").count(), 1);
        assert_eq!(stream.relation_count(), 2);
    }
}
