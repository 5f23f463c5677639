use linkcast_types::{ModuleOutput, StatisticRecord};

use super::cast_link::hardcast_attribution;
use crate::analyzer::{Analyzer, HandlerContext, RunContext, Setup};
use crate::attribution::AttributionRules;
use crate::combat_log::{CombatEvent, EventKind};
use crate::error::AnalyzerError;
use crate::filter::{Actor, EventFilter};
use crate::game_data::{ENVELOPING_MIST_TALENT, ENVELOPING_MIST_TFT, RENEWING_MIST_HEAL};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HotCounts {
    pub hardcast: u32,
    pub proc: u32,
}

impl HotCounts {
    fn record(&mut self, hardcast: bool) {
        if hardcast {
            self.hardcast += 1;
        } else {
            self.proc += 1;
        }
    }

    pub fn total(&self) -> u32 {
        self.hardcast + self.proc
    }
}

/// Splits Renewing Mist and Enveloping Mist applications into hardcasts and
/// procs.
#[derive(Debug)]
pub struct HotAttribution {
    rules: AttributionRules,
    pub renewing_mist: HotCounts,
    pub enveloping_mist: HotCounts,
}

impl HotAttribution {
    fn on_renewing_mist(
        &mut self,
        _: &CombatEvent,
        ctx: &HandlerContext<'_>,
    ) -> Result<(), AnalyzerError> {
        let hardcast = ctx.is_attributed(&self.rules, ctx.position());
        self.renewing_mist.record(hardcast);
        Ok(())
    }

    fn on_enveloping_mist(
        &mut self,
        _: &CombatEvent,
        ctx: &HandlerContext<'_>,
    ) -> Result<(), AnalyzerError> {
        let hardcast = ctx.is_attributed(&self.rules, ctx.position());
        self.enveloping_mist.record(hardcast);
        Ok(())
    }

    pub fn hardcast_share(&self) -> f64 {
        let total = self.renewing_mist.total() + self.enveloping_mist.total();
        let hardcast = self.renewing_mist.hardcast + self.enveloping_mist.hardcast;
        match total {
            0 => 0.0,
            total => hardcast as f64 / total as f64,
        }
    }
}

impl Analyzer for HotAttribution {
    const NAME: &'static str = "hot_attribution";

    fn create(setup: &mut Setup<'_, Self>) -> Result<Self, AnalyzerError> {
        setup.listen(
            EventFilter::of(EventKind::ApplyBuff)
                .by(Actor::SelectedPlayer)
                .spell(RENEWING_MIST_HEAL),
            Self::on_renewing_mist,
        );
        setup.listen(
            EventFilter::of_kinds([EventKind::ApplyBuff, EventKind::RefreshBuff])
                .by(Actor::SelectedPlayer)
                .spells([ENVELOPING_MIST_TALENT, ENVELOPING_MIST_TFT]),
            Self::on_enveloping_mist,
        );
        Ok(Self {
            rules: hardcast_attribution(),
            renewing_mist: HotCounts::default(),
            enveloping_mist: HotCounts::default(),
        })
    }

    fn finalize(&self, _: &RunContext<'_>) -> ModuleOutput {
        let counts = |label: &str, c: HotCounts| {
            StatisticRecord::new(label, c.total() as f64)
                .with_breakdown("Hardcast", c.hardcast as f64)
                .with_breakdown("Proc", c.proc as f64)
        };
        ModuleOutput {
            statistics: vec![
                counts("Renewing Mist applications", self.renewing_mist),
                counts("Enveloping Mist applications", self.enveloping_mist),
                StatisticRecord::ratio("Hardcast share", self.hardcast_share()),
            ],
            guide: None,
        }
    }
}
