pub mod analyzer;
pub mod attribution;
pub mod combat_log;
pub mod combatant;
pub mod config;
pub mod error;
pub mod filter;
pub mod game_data;
pub mod mistweaver;
pub mod normalizer;
pub mod session;

// Re-exports for convenience
pub use analyzer::{
    AnalysisHarness, Analyzer, HandlerContext, ModuleRef, ModuleRegistry, RunContext, Setup,
};
pub use attribution::{AttributionRules, AttributionScope, resolve};
pub use combat_log::{CombatEvent, EventId, EventKind, EventStream, Replay};
pub use config::AnalysisConfig;
pub use error::{AnalyzerError, HarnessError, IngestError, SessionError};
pub use filter::{Actor, Actors, EventFilter};
pub use normalizer::{EventLinkNormalizer, EventMatcher, LinkRule, TargetScope};
pub use session::{AnalysisSession, PreparedRun};
