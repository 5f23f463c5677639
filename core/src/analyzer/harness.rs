use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use hashbrown::HashMap;
use linkcast_types::{ModuleFailure, ModuleReport};

use super::context::{HandlerContext, RunContext};
use super::module::{Analyzer, BuildFn, ModuleSlot, build_module};
use crate::error::{AnalyzerError, HarnessError};

// ─── Registry ───────────────────────────────────────────────────────────────

struct Registration {
    name: &'static str,
    dependencies: &'static [&'static str],
    build: BuildFn,
}

/// Module types taking part in a run, in registration order.
#[derive(Default)]
pub struct ModuleRegistry {
    entries: Vec<Registration>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<M: Analyzer>(&mut self) -> Result<&mut Self, HarnessError> {
        if self.entries.iter().any(|r| r.name == M::NAME) {
            return Err(HarnessError::DuplicateModule(M::NAME));
        }
        self.entries.push(Registration {
            name: M::NAME,
            dependencies: M::DEPENDENCIES,
            build: build_module::<M>,
        });
        Ok(self)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|r| r.name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Construction order: dependencies first, otherwise registration order.
    pub fn construction_order(&self) -> Result<Vec<&'static str>, HarnessError> {
        self.order()
            .map(|order| order.into_iter().map(|idx| self.entries[idx].name).collect())
    }

    fn order(&self) -> Result<Vec<usize>, HarnessError> {
        for reg in &self.entries {
            for &dep in reg.dependencies {
                if !self.entries.iter().any(|r| r.name == dep) {
                    return Err(HarnessError::UnknownDependency {
                        module: reg.name,
                        dependency: dep,
                    });
                }
            }
        }

        let mut placed = vec![false; self.entries.len()];
        let mut order = Vec::with_capacity(self.entries.len());
        while order.len() < self.entries.len() {
            // Lowest registration index whose dependencies are all placed
            let next = self.entries.iter().enumerate().position(|(idx, reg)| {
                !placed[idx]
                    && reg.dependencies.iter().all(|dep| {
                        self.entries
                            .iter()
                            .position(|r| r.name == *dep)
                            .is_some_and(|d| placed[d])
                    })
            });
            let Some(idx) = next else {
                let stuck = self
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| !placed[*idx])
                    .map(|(_, r)| r.name)
                    .collect();
                return Err(HarnessError::DependencyCycle(stuck));
            };
            placed[idx] = true;
            order.push(idx);
        }
        Ok(order)
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

// ─── Harness ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Constructed,
    Replayed,
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Phase::Constructed => "constructed",
            Phase::Replayed => "replayed",
        }
    }
}

enum ModuleState {
    Active(Box<dyn ModuleSlot>),
    Dormant,
    Failed(ModuleFailure),
}

struct ModuleEntry {
    name: &'static str,
    state: ModuleState,
}

/// Output of [`AnalysisHarness::finalize`]
#[derive(Debug, Clone, Default)]
pub struct HarnessOutcome {
    pub modules: Vec<ModuleReport>,
    pub dormant: Vec<String>,
    pub failures: Vec<ModuleFailure>,
}

/// Owns every module of one run and drives it through
/// construction, replay and finalization.
///
/// Module state never leaves the harness: dependents hold weak references,
/// and `finalize` consumes the harness so nothing runs after it.
pub struct AnalysisHarness {
    modules: Vec<ModuleEntry>,
    /// Keeps dependencies alive for weak references held by dependents
    _built: HashMap<&'static str, Rc<dyn Any>>,
    phase: Phase,
}

impl AnalysisHarness {
    /// Construct every registered module in dependency order.
    ///
    /// A module whose constructor fails or panics is marked failed, and so is
    /// anything that asks for it as a dependency. Modules named in `disabled`
    /// are built (dependents may still read them) but forced dormant.
    pub fn build(
        registry: &ModuleRegistry,
        run: &RunContext<'_>,
        disabled: &[String],
    ) -> Result<Self, HarnessError> {
        let order = registry.order()?;
        let mut built: HashMap<&'static str, Rc<dyn Any>> = HashMap::new();
        let mut modules = Vec::with_capacity(order.len());

        for idx in order {
            let reg = &registry.entries[idx];
            let result = catch_unwind(AssertUnwindSafe(|| (reg.build)(run, &built)))
                .unwrap_or_else(|payload| Err(AnalyzerError::Panicked(panic_message(payload))));

            let state = match result {
                Ok(module) => {
                    built.insert(reg.name, module.erased);
                    let forced_off = disabled.iter().any(|d| d == reg.name);
                    if module.active && !forced_off {
                        tracing::debug!(module = reg.name, "Module active");
                        ModuleState::Active(module.slot)
                    } else {
                        tracing::debug!(module = reg.name, forced_off, "Module dormant");
                        ModuleState::Dormant
                    }
                }
                Err(err) => {
                    tracing::warn!(module = reg.name, error = %err, "Module failed to construct");
                    ModuleState::Failed(ModuleFailure {
                        module: reg.name.to_string(),
                        event_index: None,
                        timestamp: None,
                        message: err.to_string(),
                    })
                }
            };
            modules.push(ModuleEntry { name: reg.name, state });
        }

        Ok(Self {
            modules,
            _built: built,
            phase: Phase::Constructed,
        })
    }

    /// Names of the modules in construction order
    pub fn module_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.modules.iter().map(|m| m.name)
    }

    pub fn active_count(&self) -> usize {
        self.modules
            .iter()
            .filter(|m| matches!(m.state, ModuleState::Active(_)))
            .count()
    }

    /// Deliver every event, in stream order, to every active module whose
    /// filters match. Modules are visited in construction order.
    ///
    /// A handler error or panic fails its module; delivery to that module
    /// stops and everything else carries on.
    pub fn replay(&mut self, run: &RunContext<'_>) -> Result<(), HarnessError> {
        self.expect_phase(Phase::Constructed)?;

        for (position, event) in run.stream.iter() {
            let ctx = HandlerContext::new(run, position);
            for entry in &mut self.modules {
                let ModuleState::Active(slot) = &entry.state else {
                    continue;
                };
                let result = catch_unwind(AssertUnwindSafe(|| slot.dispatch(event, &ctx)))
                    .unwrap_or_else(|payload| Err(AnalyzerError::Panicked(panic_message(payload))));
                if let Err(err) = result {
                    tracing::warn!(
                        module = entry.name,
                        index = position.index(),
                        timestamp = event.timestamp,
                        error = %err,
                        "Module failed during replay"
                    );
                    entry.state = ModuleState::Failed(ModuleFailure {
                        module: entry.name.to_string(),
                        event_index: Some(position.index()),
                        timestamp: Some(event.timestamp),
                        message: err.to_string(),
                    });
                }
            }
        }

        self.phase = Phase::Replayed;
        Ok(())
    }

    /// Collect every active module's output. Consumes the harness.
    pub fn finalize(self, run: &RunContext<'_>) -> Result<HarnessOutcome, HarnessError> {
        self.expect_phase(Phase::Replayed)?;

        let mut outcome = HarnessOutcome::default();
        for entry in self.modules {
            match entry.state {
                ModuleState::Active(slot) => {
                    let result = catch_unwind(AssertUnwindSafe(|| slot.finalize(run)))
                        .unwrap_or_else(|payload| {
                            Err(AnalyzerError::Panicked(panic_message(payload)))
                        });
                    match result {
                        Ok(output) => outcome.modules.push(ModuleReport {
                            module: entry.name.to_string(),
                            output,
                        }),
                        Err(err) => {
                            tracing::warn!(
                                module = entry.name,
                                error = %err,
                                "Module failed to finalize"
                            );
                            outcome.failures.push(ModuleFailure {
                                module: entry.name.to_string(),
                                event_index: None,
                                timestamp: None,
                                message: err.to_string(),
                            });
                        }
                    }
                }
                ModuleState::Dormant => outcome.dormant.push(entry.name.to_string()),
                ModuleState::Failed(failure) => outcome.failures.push(failure),
            }
        }
        Ok(outcome)
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), HarnessError> {
        if self.phase != expected {
            return Err(HarnessError::InvalidPhase {
                expected: expected.name(),
                actual: self.phase.name(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for AnalysisHarness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisHarness")
            .field("modules", &self.module_names().collect::<Vec<_>>())
            .field("phase", &self.phase)
            .finish()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
