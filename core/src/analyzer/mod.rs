//! Analyzer dispatch harness
//!
//! Modules implement [`Analyzer`]. Per run the harness builds them in
//! dependency order, each deciding once whether it is active and which
//! filtered events it wants. The annotated stream is then replayed in
//! order, one handler call at a time, and finally every active module is
//! asked for its output.
//!
//! ```text
//! build ──► Active ──► replay ──► finalize ──► ModuleReport
//!   │                    │
//!   ├─► Dormant ─────────┴──────────────────► dormant list
//!   └─► Failed (constructor error / panic, handler error / panic)
//! ```

mod context;
mod harness;
mod module;


pub use context::{HandlerContext, RunContext};
pub use harness::{AnalysisHarness, HarnessOutcome, ModuleRegistry};
pub use module::{Analyzer, Handler, ModuleRef, Setup};
