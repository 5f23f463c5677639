use crate::combat_log::{EventId, EventStream};

use super::rule::LinkRule;

/// Link counts produced by one normalizer pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeSummary {
    /// Forward links added per rule, in rule order
    pub links_per_rule: Vec<usize>,
    pub total_links: usize,
}

/// Writes the relation graph onto an ingested stream.
///
/// Takes the stream mutably, so no reader can observe a partially linked
/// graph; everything downstream only ever gets `&EventStream`.
#[derive(Debug, Clone, Default)]
pub struct EventLinkNormalizer {
    rules: Vec<LinkRule>,
}

impl EventLinkNormalizer {
    pub fn new(rules: Vec<LinkRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[LinkRule] {
        &self.rules
    }

    /// Run every rule in declaration order.
    pub fn normalize(&self, stream: &mut EventStream) -> NormalizeSummary {
        let mut summary = NormalizeSummary::default();
        for (idx, rule) in self.rules.iter().enumerate() {
            let pairs = collect_pairs(rule, stream);
            let mut added = 0;
            for (linking, candidate) in pairs {
                if stream.link(linking, &rule.link_relation, candidate) {
                    added += 1;
                }
                if let Some(reverse) = &rule.reverse_link_relation {
                    stream.link(candidate, reverse, linking);
                }
            }
            tracing::debug!(
                rule = idx,
                relation = %rule.link_relation,
                links = added,
                "Applied link rule"
            );
            summary.links_per_rule.push(added);
            summary.total_links += added;
        }
        summary
    }
}

/// Surviving (linking, candidate) pairs for one rule, in stream order.
///
/// Reads relations written by earlier rules but never this rule's own
/// output, since pairs are collected before any of them are attached.
fn collect_pairs(rule: &LinkRule, stream: &EventStream) -> Vec<(EventId, EventId)> {
    let mut pairs = Vec::new();
    for (linking_id, linking) in stream.iter() {
        if stream.is_malformed(linking_id) || !rule.linking.matches(linking) {
            continue;
        }
        let (from, to) = rule.window_bounds(linking.timestamp);
        for idx in stream.window(from, to) {
            let candidate_id = EventId(idx);
            if candidate_id == linking_id || stream.is_malformed(candidate_id) {
                continue;
            }
            if rule.accepts(linking, &stream[candidate_id]) {
                pairs.push((linking_id, candidate_id));
            }
        }
    }
    pairs
}
