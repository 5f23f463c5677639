//! Link rule normalizer
//!
//! Reconstructs causal relations the raw log leaves implicit. Each
//! [`LinkRule`] selects *linking* events, scans a millisecond window around
//! each of them for *referenced* events, filters by target scope and an
//! optional predicate, and attaches every survivor under the rule's relation
//! name (plus a reverse edge when configured).
//!
//! Rules run one full pass each, in declaration order. A later rule's
//! predicate may read relations written by an earlier one, so the order is
//! part of the configuration.

#[allow(clippy::module_inception)]
mod normalizer;
mod rule;


pub use normalizer::{EventLinkNormalizer, NormalizeSummary};
pub use rule::{EventMatcher, LinkCondition, LinkRule, TargetScope};
