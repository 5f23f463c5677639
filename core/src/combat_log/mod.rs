//! Combat replay data model
//!
//! - **event**: typed combat events and their payload
//! - **relations**: named edges between events, keyed by stream index
//! - **stream**: the ordered event arena every other stage reads from
//! - **replay**: the JSON replay document handed over by the report fetcher

mod event;
mod relations;
mod replay;
mod stream;

pub use event::{CombatEvent, EventDetails, EventId, EventKind};
pub use relations::{RelationEdge, RelationMap};
pub use replay::{CombatantInfo, FightWindow, Replay};
pub use stream::EventStream;
