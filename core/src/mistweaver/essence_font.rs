use linkcast_types::{ModuleOutput, StatisticRecord};

use crate::analyzer::{Analyzer, HandlerContext, RunContext, Setup};
use crate::combat_log::{CombatEvent, EventKind};
use crate::error::AnalyzerError;
use crate::filter::{Actor, EventFilter};
use crate::game_data::{ESSENCE_FONT_BUFF, ESSENCE_FONT_TALENT};

/// Live count of Essence Font HoTs out from the selected player.
#[derive(Debug, Default)]
pub struct EssenceFont {
    /// HoTs currently applied
    pub cur_buffs: u32,
    pub total_hots: u32,
    pub casts: u32,
}

impl EssenceFont {
    fn on_apply(&mut self, _: &CombatEvent, _: &HandlerContext<'_>) -> Result<(), AnalyzerError> {
        self.cur_buffs += 1;
        self.total_hots += 1;
        Ok(())
    }

    fn on_remove(&mut self, _: &CombatEvent, _: &HandlerContext<'_>) -> Result<(), AnalyzerError> {
        // HoTs applied before the log started are removed without an apply
        self.cur_buffs = self.cur_buffs.saturating_sub(1);
        Ok(())
    }

    fn on_cast(&mut self, _: &CombatEvent, _: &HandlerContext<'_>) -> Result<(), AnalyzerError> {
        self.casts += 1;
        Ok(())
    }

    pub fn average_hots_per_cast(&self) -> f64 {
        match self.casts {
            0 => 0.0,
            casts => self.total_hots as f64 / casts as f64,
        }
    }
}

impl Analyzer for EssenceFont {
    const NAME: &'static str = "essence_font";

    fn create(setup: &mut Setup<'_, Self>) -> Result<Self, AnalyzerError> {
        let talented = setup.combatant().has_talent(ESSENCE_FONT_TALENT);
        setup.set_active(talented);
        if !talented {
            return Ok(Self::default());
        }
        setup.listen(
            EventFilter::of(EventKind::ApplyBuff)
                .by(Actor::SelectedPlayer)
                .spell(ESSENCE_FONT_BUFF),
            Self::on_apply,
        );
        setup.listen(
            EventFilter::of(EventKind::RemoveBuff)
                .by(Actor::SelectedPlayer)
                .spell(ESSENCE_FONT_BUFF),
            Self::on_remove,
        );
        setup.listen(
            EventFilter::of(EventKind::Cast).by(Actor::SelectedPlayer).spell(ESSENCE_FONT_TALENT),
            Self::on_cast,
        );
        Ok(Self::default())
    }

    fn finalize(&self, _: &RunContext<'_>) -> ModuleOutput {
        ModuleOutput {
            statistics: vec![
                StatisticRecord::new("Essence Font casts", self.casts as f64),
                StatisticRecord::new("Essence Font HoTs applied", self.total_hots as f64),
                StatisticRecord::new("Average HoTs per cast", self.average_hots_per_cast()),
            ],
            guide: None,
        }
    }
}
