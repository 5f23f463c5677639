use std::cell::RefCell;

use hashbrown::HashSet;
use linkcast_types::{Diagnostic, DiagnosticKind};

use crate::combat_log::{EventId, EventStream};

/// Relation names consulted by [`resolve`], in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributionRules {
    /// Any of these marks a proc path and overrides everything else
    pub indirect: Vec<String>,
    /// The second of a same-timestamp duplicated pair is not a fresh action
    pub duplicate: Option<String>,
    pub direct: String,
    /// Followed to the nearest related event when nothing else decides
    pub transfer: Option<String>,
}

impl AttributionRules {
    pub fn new(direct: impl Into<String>) -> Self {
        Self {
            indirect: Vec::new(),
            duplicate: None,
            direct: direct.into(),
            transfer: None,
        }
    }

    pub fn indirect(mut self, relations: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.indirect.extend(relations.into_iter().map(Into::into));
        self
    }

    pub fn duplicate(mut self, relation: impl Into<String>) -> Self {
        self.duplicate = Some(relation.into());
        self
    }

    pub fn transfer(mut self, relation: impl Into<String>) -> Self {
        self.transfer = Some(relation.into());
        self
    }
}

/// Dedup state for one analysis run.
///
/// Created by the session at the start of a run and dropped with it. The
/// seen set is keyed by timestamp alone, so two unrelated duplicate pairs
/// sharing a timestamp suppress each other.
#[derive(Debug, Default)]
pub struct AttributionScope {
    seen_timestamps: RefCell<HashSet<i64>>,
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl AttributionScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen_count(&self) -> usize {
        self.seen_timestamps.borrow().len()
    }

    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.borrow_mut())
    }

    /// Returns false when `timestamp` was already marked
    fn mark_seen(&self, timestamp: i64) -> bool {
        self.seen_timestamps.borrow_mut().insert(timestamp)
    }

    fn record_cycle(&self, start: EventId, at: EventId, timestamp: i64) {
        tracing::warn!(%start, %at, timestamp, "Attribution chain revisits an event");
        self.diagnostics.borrow_mut().push(Diagnostic {
            kind: DiagnosticKind::AttributionCycle,
            event_index: Some(at.index()),
            timestamp: Some(timestamp),
            message: format!("attribution chain from {start} revisits {at}"),
        });
    }
}

/// Outcome of one traced resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub attributed: bool,
    /// Events visited, starting with the queried one
    pub path: Vec<EventId>,
}

/// Whether `id` traces back to a direct action under `rules`.
pub fn resolve(
    stream: &EventStream,
    rules: &AttributionRules,
    scope: &AttributionScope,
    id: EventId,
) -> bool {
    resolve_traced(stream, rules, scope, id).attributed
}

/// [`resolve`], also returning the chain of events it walked.
///
/// Each transfer hop visits a new event, so a chain over N events takes at
/// most N steps. A revisit ends the chain as unattributed and is recorded as
/// a diagnostic on the scope.
pub fn resolve_traced(
    stream: &EventStream,
    rules: &AttributionRules,
    scope: &AttributionScope,
    id: EventId,
) -> Resolution {
    let mut visited = HashSet::new();
    let mut path = Vec::new();
    let mut current = id;

    let attributed = loop {
        let Some(event) = stream.get(current) else {
            break false;
        };
        if !visited.insert(current) {
            scope.record_cycle(id, current, event.timestamp);
            break false;
        }
        path.push(current);

        if rules.indirect.iter().any(|rel| event.has_relation(rel)) {
            break false;
        }
        if let Some(dup) = &rules.duplicate
            && event.has_relation(dup)
            && !scope.mark_seen(event.timestamp)
        {
            break false;
        }
        if event.has_relation(&rules.direct) {
            break true;
        }
        let Some(transfer) = &rules.transfer else {
            break false;
        };
        match nearest(stream, current, transfer) {
            Some(next) => current = next,
            None => break false,
        }
    };

    Resolution { attributed, path }
}

/// Related event closest in time; ties go to the earlier stream position.
fn nearest(stream: &EventStream, id: EventId, relation: &str) -> Option<EventId> {
    let timestamp = stream.get(id)?.timestamp;
    stream
        .related(id, relation)
        .min_by_key(|(rel_id, rel)| ((rel.timestamp - timestamp).abs(), *rel_id))
        .map(|(rel_id, _)| rel_id)
}
