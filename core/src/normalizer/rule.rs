//! Declarative link rule descriptors.

use std::fmt;
use std::sync::Arc;

use crate::combat_log::{CombatEvent, EventKind};

/// Matches events by kind and ability id. An empty set matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventMatcher {
    pub kinds: Vec<EventKind>,
    pub abilities: Vec<i64>,
}

impl EventMatcher {
    pub fn new(
        kinds: impl IntoIterator<Item = EventKind>,
        abilities: impl IntoIterator<Item = i64>,
    ) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            abilities: abilities.into_iter().collect(),
        }
    }

    pub fn matches(&self, event: &CombatEvent) -> bool {
        (self.kinds.is_empty() || self.kinds.contains(&event.kind))
            && (self.abilities.is_empty() || self.abilities.contains(&event.ability_id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetScope {
    /// Both events carry a target and the targets are equal
    #[default]
    SameTarget,
    AnyTarget,
}

impl TargetScope {
    pub fn accepts(&self, linking: &CombatEvent, candidate: &CombatEvent) -> bool {
        match self {
            TargetScope::AnyTarget => true,
            TargetScope::SameTarget => match (linking.target_id, candidate.target_id) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

/// Extra predicate over `(linking, candidate)`
pub type LinkCondition = Arc<dyn Fn(&CombatEvent, &CombatEvent) -> bool + Send + Sync>;

/// One declarative linking rule.
///
/// Windows are `u64` so a negative bound is unrepresentable.
#[derive(Clone)]
pub struct LinkRule {
    pub link_relation: String,
    pub reverse_link_relation: Option<String>,
    pub linking: EventMatcher,
    pub referenced: EventMatcher,
    pub backward_buffer_ms: u64,
    pub forward_buffer_ms: u64,
    pub scope: TargetScope,
    pub condition: Option<LinkCondition>,
}

impl LinkRule {
    /// Zero-width, same-target rule without a reverse link
    pub fn new(
        relation: impl Into<String>,
        linking: EventMatcher,
        referenced: EventMatcher,
    ) -> Self {
        Self {
            link_relation: relation.into(),
            reverse_link_relation: None,
            linking,
            referenced,
            backward_buffer_ms: 0,
            forward_buffer_ms: 0,
            scope: TargetScope::SameTarget,
            condition: None,
        }
    }

    pub fn reverse(mut self, relation: impl Into<String>) -> Self {
        self.reverse_link_relation = Some(relation.into());
        self
    }

    pub fn window(mut self, backward_ms: u64, forward_ms: u64) -> Self {
        self.backward_buffer_ms = backward_ms;
        self.forward_buffer_ms = forward_ms;
        self
    }

    pub fn any_target(mut self) -> Self {
        self.scope = TargetScope::AnyTarget;
        self
    }

    pub fn when(
        mut self,
        condition: impl Fn(&CombatEvent, &CombatEvent) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.condition = Some(Arc::new(condition));
        self
    }

    /// Inclusive timestamp bounds of the candidate window around `timestamp`
    pub fn window_bounds(&self, timestamp: i64) -> (i64, i64) {
        let back = i64::try_from(self.backward_buffer_ms).unwrap_or(i64::MAX);
        let fwd = i64::try_from(self.forward_buffer_ms).unwrap_or(i64::MAX);
        (timestamp.saturating_sub(back), timestamp.saturating_add(fwd))
    }

    /// Scope and custom predicate checks for an in-window candidate
    pub fn accepts(&self, linking: &CombatEvent, candidate: &CombatEvent) -> bool {
        self.referenced.matches(candidate)
            && self.scope.accepts(linking, candidate)
            && self.condition.as_ref().is_none_or(|cond| cond(linking, candidate))
    }
}

impl fmt::Debug for LinkRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkRule")
            .field("link_relation", &self.link_relation)
            .field("reverse_link_relation", &self.reverse_link_relation)
            .field("linking", &self.linking)
            .field("referenced", &self.referenced)
            .field("backward_buffer_ms", &self.backward_buffer_ms)
            .field("forward_buffer_ms", &self.forward_buffer_ms)
            .field("scope", &self.scope)
            .field("condition", &self.condition.is_some())
            .finish()
    }
}
