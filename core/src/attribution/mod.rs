//! Causal attribution over the relation graph
//!
//! Answers "does this effect trace back to a direct action?" by walking
//! relations with fixed precedence: indirect-proc relations first, then the
//! duplicate dedup, then the direct relation, then the nearest transfer
//! ancestor. Anything else is unattributed.

mod resolver;

#[cfg(test)]
mod resolver_tests;

pub use resolver::{AttributionRules, AttributionScope, Resolution, resolve, resolve_traced};
