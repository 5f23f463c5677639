use std::fmt;

use serde::{Deserialize, Serialize};

use super::relations::RelationMap;

/// Stable index of an event inside an [`EventStream`](super::EventStream).
///
/// Indices are assigned after the stream is sorted and never change for the
/// rest of the run, so relations store them instead of references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub usize);

impl EventId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Closed set of event kinds produced by the replay source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Cast,
    BeginCast,
    ApplyBuff,
    ApplyBuffStack,
    RemoveBuffStack,
    RefreshBuff,
    RemoveBuff,
    ApplyDebuff,
    RefreshDebuff,
    RemoveDebuff,
    Heal,
    Absorbed,
    Damage,
    Death,
    Summon,
    GlobalCooldown,
    BeginChannel,
    EndChannel,
}

impl EventKind {
    /// Kinds that are meaningless without a target
    pub const fn is_targeted(self) -> bool {
        matches!(
            self,
            Self::ApplyBuff
                | Self::ApplyBuffStack
                | Self::RemoveBuffStack
                | Self::RefreshBuff
                | Self::RemoveBuff
                | Self::ApplyDebuff
                | Self::RefreshDebuff
                | Self::RemoveDebuff
                | Self::Heal
                | Self::Absorbed
                | Self::Damage
                | Self::Death
                | Self::Summon
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Cast => "cast",
            Self::BeginCast => "begincast",
            Self::ApplyBuff => "applybuff",
            Self::ApplyBuffStack => "applybuffstack",
            Self::RemoveBuffStack => "removebuffstack",
            Self::RefreshBuff => "refreshbuff",
            Self::RemoveBuff => "removebuff",
            Self::ApplyDebuff => "applydebuff",
            Self::RefreshDebuff => "refreshdebuff",
            Self::RemoveDebuff => "removedebuff",
            Self::Heal => "heal",
            Self::Absorbed => "absorbed",
            Self::Damage => "damage",
            Self::Death => "death",
            Self::Summon => "summon",
            Self::GlobalCooldown => "globalcooldown",
            Self::BeginChannel => "beginchannel",
            Self::EndChannel => "endchannel",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind-specific payload. Which fields are present depends on the kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absorbed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overheal: Option<i64>,
    /// GCD length, channel length or buff duration in ms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stacks: Option<u32>,
    /// Channel start timestamp (EndChannel)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
}

/// A single replay event.
///
/// Everything except `relations` is fixed at ingestion. Relations are only
/// ever written by the link normalizer, before any analyzer sees the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub timestamp: i64,
    pub source_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<i64>,
    pub ability_id: i64,
    #[serde(flatten)]
    pub details: EventDetails,
    #[serde(default, skip_deserializing, skip_serializing_if = "RelationMap::is_empty")]
    relations: RelationMap,
}

impl CombatEvent {
    pub fn new(
        kind: EventKind,
        timestamp: i64,
        source_id: i64,
        target_id: Option<i64>,
        ability_id: i64,
    ) -> Self {
        Self {
            kind,
            timestamp,
            source_id,
            target_id,
            ability_id,
            details: EventDetails::default(),
            relations: RelationMap::default(),
        }
    }

    pub fn with_amount(mut self, amount: i64) -> Self {
        self.details.amount = Some(amount);
        self
    }

    pub fn with_absorbed(mut self, absorbed: i64) -> Self {
        self.details.absorbed = Some(absorbed);
        self
    }

    pub fn with_duration(mut self, duration: i64) -> Self {
        self.details.duration = Some(duration);
        self
    }

    pub fn with_stacks(mut self, stacks: u32) -> Self {
        self.details.stacks = Some(stacks);
        self
    }

    pub fn with_start(mut self, start: i64) -> Self {
        self.details.start = Some(start);
        self
    }

    pub fn relations(&self) -> &RelationMap {
        &self.relations
    }

    pub(crate) fn relations_mut(&mut self) -> &mut RelationMap {
        &mut self.relations
    }

    pub fn has_relation(&self, relation: &str) -> bool {
        self.relations.contains(relation)
    }

    pub fn related(&self, relation: &str) -> &[EventId] {
        self.relations.get(relation)
    }

    /// Effective healing including absorbed amount (0 for non-heal payloads)
    pub fn healing(&self) -> i64 {
        self.details.amount.unwrap_or(0) + self.details.absorbed.unwrap_or(0)
    }

    /// Name of the first field this event's kind requires but lacks
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.kind.is_targeted() && self.target_id.is_none() {
            return Some("targetId");
        }
        match self.kind {
            EventKind::GlobalCooldown | EventKind::EndChannel
                if self.details.duration.is_none() =>
            {
                Some("duration")
            }
            EventKind::ApplyBuffStack | EventKind::RemoveBuffStack
                if self.details.stacks.is_none() =>
            {
                Some("stacks")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_replay_event_json() {
        let raw = r#"{
            "type": "heal",
            "timestamp": 1200,
            "sourceId": 1,
            "targetId": 7,
            "abilityId": 343819,
            "amount": 5000,
            "absorbed": 250,
            "overheal": 100
        }"#;
        let event: CombatEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.kind, EventKind::Heal);
        assert_eq!(event.target_id, Some(7));
        assert_eq!(event.healing(), 5250);
        assert!(event.relations().is_empty());
        assert_eq!(event.missing_field(), None);
    }

    #[test]
    fn untargeted_kinds_may_omit_target() {
        let gcd =
            CombatEvent::new(EventKind::GlobalCooldown, 0, 1, None, 101546).with_duration(1500);
        assert_eq!(gcd.missing_field(), None);

        let cast = CombatEvent::new(EventKind::Cast, 0, 1, None, 115151);
        assert_eq!(cast.missing_field(), None);
    }

    #[test]
    fn reports_missing_required_fields() {
        let apply = CombatEvent::new(EventKind::ApplyBuff, 0, 1, None, 119611);
        assert_eq!(apply.missing_field(), Some("targetId"));

        let gcd = CombatEvent::new(EventKind::GlobalCooldown, 0, 1, None, 101546);
        assert_eq!(gcd.missing_field(), Some("duration"));

        let stack = CombatEvent::new(EventKind::ApplyBuffStack, 0, 1, Some(1), 202090);
        assert_eq!(stack.missing_field(), Some("stacks"));
    }

    #[test]
    fn input_relations_are_ignored() {
        let raw =
            r#"{"type":"cast","timestamp":0,"sourceId":1,"abilityId":1,"relations":{"X":[0]}}"#;
        let event: CombatEvent = serde_json::from_str(raw).unwrap();
        assert!(!event.has_relation("X"));
    }
}
