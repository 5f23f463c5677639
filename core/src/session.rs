//! One analysis run, end to end
//!
//! ```text
//! Replay ──► ingest (sort, validate) ──► normalize (write relations)
//!        ──► combatant + actors ──► harness build ──► replay ──► finalize
//!        ──► AnalysisReport
//! ```
//!
//! The stream is only mutable up to the end of normalization. Everything
//! after works from a shared borrow, and the attribution scope lives and
//! dies with the run.

use linkcast_types::AnalysisReport;

use crate::analyzer::{AnalysisHarness, ModuleRegistry, RunContext};
use crate::attribution::AttributionScope;
use crate::combat_log::{EventKind, EventStream, FightWindow, Replay};
use crate::combatant::Combatant;
use crate::config::AnalysisConfig;
use crate::error::{HarnessError, IngestError, SessionError};
use crate::filter::Actors;
use crate::mistweaver;
use crate::normalizer::{EventLinkNormalizer, LinkRule, NormalizeSummary};

/// A replay that has been ingested and normalized but not analyzed
#[derive(Debug)]
pub struct PreparedRun {
    pub stream: EventStream,
    pub combatant: Combatant,
    pub actors: Actors,
    pub fight: FightWindow,
    pub summary: NormalizeSummary,
}

impl PreparedRun {
    pub fn context<'a>(&'a self, scope: &'a AttributionScope) -> RunContext<'a> {
        RunContext {
            stream: &self.stream,
            combatant: &self.combatant,
            actors: &self.actors,
            fight: self.fight,
            scope,
        }
    }
}

pub struct AnalysisSession {
    registry: ModuleRegistry,
    normalizer: EventLinkNormalizer,
    config: AnalysisConfig,
}

impl AnalysisSession {
    pub fn new(registry: ModuleRegistry, rules: Vec<LinkRule>, config: AnalysisConfig) -> Self {
        Self {
            registry,
            normalizer: EventLinkNormalizer::new(rules),
            config,
        }
    }

    /// Mistweaver link rules and analyzers
    pub fn mistweaver(config: AnalysisConfig) -> Result<Self, HarnessError> {
        let rules = mistweaver::link_rules(config.normalizer.cast_buffer_ms);
        Ok(Self::new(mistweaver::registry()?, rules, config))
    }

    pub fn rules(&self) -> &[LinkRule] {
        self.normalizer.rules()
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Ingest and normalize without running any analyzer.
    pub fn prepare(&self, replay: Replay) -> Result<PreparedRun, IngestError> {
        replay.validate()?;

        let selected_player = self
            .config
            .analysis
            .selected_player
            .unwrap_or(replay.selected_player);
        let combatant_id = match self.config.analysis.selected_player {
            Some(id) => id,
            None => replay.combatant_id(),
        };
        let Replay {
            fight,
            pets,
            combatant,
            events,
            ..
        } = replay;

        let mut stream = EventStream::ingest(events);
        tracing::info!(
            events = stream.len(),
            malformed = stream.diagnostics().len(),
            "Ingested replay"
        );

        let summary = self.normalizer.normalize(&mut stream);
        tracing::info!(
            rules = self.normalizer.rules().len(),
            links = summary.total_links,
            "Normalized relations"
        );

        let combatant = Combatant::from_stream(combatant_id, combatant.talents, &stream);
        let summoned = stream
            .iter()
            .filter(|(id, e)| {
                e.kind == EventKind::Summon
                    && e.source_id == selected_player
                    && !stream.is_malformed(*id)
            })
            .filter_map(|(_, e)| e.target_id);
        let actors = Actors::new(selected_player, pets.into_iter().chain(summoned));

        Ok(PreparedRun {
            stream,
            combatant,
            actors,
            fight,
            summary,
        })
    }

    /// Analyze one replay. Only ingest and wiring problems abort; module
    /// failures end up in the report.
    pub fn run(&self, replay: Replay) -> Result<AnalysisReport, SessionError> {
        let prepared = self.prepare(replay)?;
        let scope = AttributionScope::new();
        let run = prepared.context(&scope);

        let mut harness =
            AnalysisHarness::build(&self.registry, &run, &self.config.analysis.disabled_modules)?;
        tracing::info!(
            modules = self.registry.len(),
            active = harness.active_count(),
            "Built analyzers"
        );

        harness.replay(&run)?;
        let outcome = harness.finalize(&run)?;
        tracing::info!(
            reported = outcome.modules.len(),
            dormant = outcome.dormant.len(),
            failed = outcome.failures.len(),
            "Finalized analyzers"
        );

        let mut diagnostics = prepared.stream.diagnostics().to_vec();
        diagnostics.extend(scope.take_diagnostics());

        Ok(AnalysisReport {
            fight_start: prepared.fight.start,
            fight_end: prepared.fight.end,
            event_count: prepared.stream.len(),
            relation_count: prepared.stream.relation_count(),
            modules: outcome.modules,
            dormant: outcome.dormant,
            failures: outcome.failures,
            diagnostics,
        })
    }
}

impl std::fmt::Debug for AnalysisSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisSession")
            .field("registry", &self.registry)
            .field("rules", &self.normalizer.rules().len())
            .field("config", &self.config)
            .finish()
    }
}
