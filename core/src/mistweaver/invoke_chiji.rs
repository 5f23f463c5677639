//! Invoke Chi-Ji, the Red Crane
//!
//! Blackout Kick (including Teachings of the Monastery hits), Rising Sun
//! Kick and Spinning Crane Kick generate Chi-Ji stacks, each cutting the
//! cast time and cost of the next Enveloping Mist, up to three. The same
//! kicks heal nearby allies through Gust of Mists, and Enveloping Mist cast
//! while Chi-Ji is out spreads Enveloping Breath.
//!
//! Besides healing and stack usage, every Chi-Ji cast gets a graded
//! breakdown of how well it was prepared and played.

use linkcast_types::{
    ChecklistItem, GuideEntry, GuideRecord, ModuleOutput, QualitativePerformance, StatisticRecord,
};

use super::essence_font::EssenceFont;
use crate::analyzer::{Analyzer, HandlerContext, ModuleRef, RunContext, Setup};
use crate::combat_log::{CombatEvent, EventKind};
use crate::error::AnalyzerError;
use crate::filter::{Actor, EventFilter};
use crate::game_data::*;

/// Essence Font HoTs out at cast time considered a full setup
pub const GOOD_EF_HOTS_ON_CAST: u32 = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChijiCastTracker {
    pub timestamp: i64,
    pub totm_stacks: u32,
    pub num_ef_hots: u32,
    pub overcapped_totm_stacks: u32,
    pub overcapped_chiji_stacks: u32,
    /// Essence Font was cast again during the window
    pub recast_ef: bool,
    /// Chi-Ji died (window ended) at this timestamp
    pub death_timestamp: Option<i64>,
}

#[derive(Debug)]
pub struct InvokeChiJi {
    ef: ModuleRef<EssenceFont>,
    jade_bond: bool,
    celestial_active: bool,
    pub cast_trackers: Vec<ChijiCastTracker>,

    // healing breakdown
    pub gust_healing: i64,
    pub envelop_healing: i64,

    // stack breakdown
    chiji_stack_count: u32,
    pub casts_below_max_stacks: u32,
    pub wasted_stacks: u32,
    pub free_casts: u32,

    // missed GCDs
    pub missed_globals: f64,
    pub chiji_globals: u32,
    pub chiji_uses: u32,
    last_global: i64,
    ef_gcd: i64,
    /// Spinning Crane Kick damage before this timestamp grants a stack
    check_for_sck_damage: Option<i64>,
    cast_bok_in_window: bool,
}

impl InvokeChiJi {
    fn new(ef: ModuleRef<EssenceFont>, jade_bond: bool) -> Self {
        Self {
            ef,
            jade_bond,
            celestial_active: false,
            cast_trackers: Vec::new(),
            gust_healing: 0,
            envelop_healing: 0,
            chiji_stack_count: 0,
            casts_below_max_stacks: 0,
            wasted_stacks: 0,
            free_casts: 0,
            missed_globals: 0.0,
            chiji_globals: 0,
            chiji_uses: 0,
            last_global: 0,
            ef_gcd: 0,
            check_for_sck_damage: None,
            cast_bok_in_window: false,
        }
    }

    pub fn total_healing(&self) -> i64 {
        self.gust_healing + self.envelop_healing
    }

    pub fn average_globals(&self) -> f64 {
        match self.chiji_uses {
            0 => 0.0,
            uses => self.chiji_globals as f64 / uses as f64,
        }
    }

    fn current_tracker(&mut self) -> Result<&mut ChijiCastTracker, AnalyzerError> {
        self.cast_trackers.last_mut().ok_or_else(|| {
            AnalyzerError::Invariant("Chi-Ji window open without a cast tracker".to_string())
        })
    }

    // ─── Window ─────────────────────────────────────────────────────────────

    fn on_chiji_start(
        &mut self,
        event: &CombatEvent,
        ctx: &HandlerContext<'_>,
    ) -> Result<(), AnalyzerError> {
        self.celestial_active = true;
        self.last_global = event.timestamp;
        self.chiji_globals += 1;
        self.chiji_uses += 1;
        self.cast_bok_in_window = false;
        let num_ef_hots = self.ef.with(|ef| ef.cur_buffs)?;
        self.cast_trackers.push(ChijiCastTracker {
            timestamp: event.timestamp,
            totm_stacks: ctx.buff_stacks(TEACHINGS_OF_THE_MONASTERY),
            num_ef_hots,
            ..Default::default()
        });
        Ok(())
    }

    fn on_pet_death(
        &mut self,
        event: &CombatEvent,
        _: &HandlerContext<'_>,
    ) -> Result<(), AnalyzerError> {
        if !self.celestial_active {
            return Ok(());
        }
        self.celestial_active = false;
        self.current_tracker()?.death_timestamp = Some(event.timestamp);
        Ok(())
    }

    fn on_ef_cast(&mut self, _: &CombatEvent, _: &HandlerContext<'_>) -> Result<(), AnalyzerError> {
        if self.celestial_active {
            self.current_tracker()?.recast_ef = true;
        }
        Ok(())
    }

    // ─── Wasted stacks ──────────────────────────────────────────────────────

    fn on_rsk(
        &mut self,
        event: &CombatEvent,
        ctx: &HandlerContext<'_>,
    ) -> Result<(), AnalyzerError> {
        if !self.celestial_active {
            return Ok(());
        }
        if ctx.buff_stacks(INVOKE_CHIJI_BUFF) == MAX_CHIJI_STACKS {
            tracing::debug!(at = %ctx.format_timestamp(event.timestamp), "Wasted Chi-Ji stack");
            self.current_tracker()?.overcapped_chiji_stacks += 1;
        }
        Ok(())
    }

    fn on_bok(
        &mut self,
        event: &CombatEvent,
        ctx: &HandlerContext<'_>,
    ) -> Result<(), AnalyzerError> {
        if !self.celestial_active {
            return Ok(());
        }
        // First kick of the window cannot overcap
        if !self.cast_bok_in_window {
            self.cast_bok_in_window = true;
            return Ok(());
        }
        let stacks_gained = 1 + ctx.buff_stacks(TEACHINGS_OF_THE_MONASTERY);
        let after = ctx.buff_stacks(INVOKE_CHIJI_BUFF) + stacks_gained;
        if after > MAX_CHIJI_STACKS {
            tracing::debug!(at = %ctx.format_timestamp(event.timestamp), "Wasted Chi-Ji stack");
            self.current_tracker()?.overcapped_chiji_stacks += after - MAX_CHIJI_STACKS;
        }
        Ok(())
    }

    fn on_totm_refresh(
        &mut self,
        event: &CombatEvent,
        ctx: &HandlerContext<'_>,
    ) -> Result<(), AnalyzerError> {
        if self.celestial_active {
            tracing::debug!(at = %ctx.format_timestamp(event.timestamp), "Wasted Teachings stack");
            self.current_tracker()?.overcapped_totm_stacks += 1;
        }
        Ok(())
    }

    // ─── Missed GCDs ────────────────────────────────────────────────────────

    fn on_global(
        &mut self,
        event: &CombatEvent,
        _: &HandlerContext<'_>,
    ) -> Result<(), AnalyzerError> {
        if !self.celestial_active {
            return Ok(());
        }
        let Some(duration) = event.details.duration.filter(|d| *d > 0) else {
            return Ok(());
        };
        self.chiji_globals += 1;
        // Essence Font and Faeline Stomp are channels; their GCD is settled at channel end
        if event.ability_id == ESSENCE_FONT_TALENT || event.ability_id == FAELINE_STOMP_TALENT {
            self.ef_gcd = duration;
        } else if event.timestamp - self.last_global > duration {
            let idle = event.timestamp - self.last_global - duration;
            self.missed_globals += idle as f64 / duration as f64;
        }
        self.last_global = event.timestamp;
        Ok(())
    }

    fn on_ef_end(
        &mut self,
        event: &CombatEvent,
        _: &HandlerContext<'_>,
    ) -> Result<(), AnalyzerError> {
        if !self.celestial_active {
            return Ok(());
        }
        let duration = event.details.duration.unwrap_or(0);
        if duration > self.ef_gcd {
            self.last_global = event.timestamp - self.ef_gcd;
        } else {
            let start = event.details.start.unwrap_or(event.timestamp - duration);
            self.last_global = start + self.ef_gcd;
        }
        Ok(())
    }

    // ─── Healing ────────────────────────────────────────────────────────────

    fn on_gust(
        &mut self,
        event: &CombatEvent,
        _: &HandlerContext<'_>,
    ) -> Result<(), AnalyzerError> {
        self.gust_healing += event.healing();
        Ok(())
    }

    fn on_enveloping_breath(
        &mut self,
        event: &CombatEvent,
        _: &HandlerContext<'_>,
    ) -> Result<(), AnalyzerError> {
        self.envelop_healing += event.healing();
        Ok(())
    }

    // ─── Stack generation ───────────────────────────────────────────────────

    fn on_stack_generator(
        &mut self,
        event: &CombatEvent,
        _: &HandlerContext<'_>,
    ) -> Result<(), AnalyzerError> {
        if !self.celestial_active {
            return Ok(());
        }
        if event.ability_id == SPINNING_CRANE_KICK_DAMAGE {
            // One stack per Spinning Crane Kick, not per damage tick
            if self.check_for_sck_damage.is_some_and(|until| until > event.timestamp) {
                self.stack_count();
                self.check_for_sck_damage = None;
            }
        } else {
            self.stack_count();
        }
        Ok(())
    }

    fn on_sck_global(
        &mut self,
        event: &CombatEvent,
        _: &HandlerContext<'_>,
    ) -> Result<(), AnalyzerError> {
        if self.celestial_active {
            let duration = event.details.duration.unwrap_or(0);
            self.check_for_sck_damage = Some(duration + self.last_global);
        }
        Ok(())
    }

    fn on_envelop_cast(
        &mut self,
        _: &CombatEvent,
        ctx: &HandlerContext<'_>,
    ) -> Result<(), AnalyzerError> {
        // The last Enveloping Mist can land after Chi-Ji expires while the buff is still up
        if self.celestial_active || ctx.has_buff(INVOKE_CHIJI_BUFF) {
            if self.chiji_stack_count == MAX_CHIJI_STACKS {
                self.free_casts += 1;
            } else {
                self.casts_below_max_stacks += 1;
            }
            self.chiji_stack_count = 0;
        }
        Ok(())
    }

    fn stack_count(&mut self) {
        if self.chiji_stack_count == MAX_CHIJI_STACKS {
            self.wasted_stacks += 1;
        } else {
            self.chiji_stack_count += 1;
        }
    }

    // ─── Guide ──────────────────────────────────────────────────────────────

    fn guide_entry(&self, cast: &ChijiCastTracker, run: &RunContext<'_>) -> GuideEntry {
        let mut checklist = Vec::new();

        let ef_perf = match cast.num_ef_hots {
            0 => QualitativePerformance::Fail,
            n if n < GOOD_EF_HOTS_ON_CAST => QualitativePerformance::Ok,
            _ => QualitativePerformance::Good,
        };
        checklist.push(ChecklistItem {
            label: "Essence Font HoTs on cast".to_string(),
            performance: ef_perf,
            details: format!("{} HoTs", cast.num_ef_hots),
        });

        let totm_perf = match cast.totm_stacks {
            0 | 1 => QualitativePerformance::Fail,
            2 => QualitativePerformance::Ok,
            _ => QualitativePerformance::Good,
        };
        checklist.push(ChecklistItem {
            label: "Teachings of the Monastery stacks on cast".to_string(),
            performance: totm_perf,
            details: format!("{} stacks", cast.totm_stacks),
        });

        if self.jade_bond {
            checklist.push(ChecklistItem {
                label: "Recast Essence Font during Chi-Ji".to_string(),
                performance: if cast.recast_ef {
                    QualitativePerformance::Good
                } else {
                    QualitativePerformance::Fail
                },
                details: if cast.recast_ef { "Yes" } else { "No" }.to_string(),
            });
        }

        checklist.push(ChecklistItem {
            label: "Wasted Teachings of the Monastery stacks during Chi-Ji".to_string(),
            performance: wasted_perf(cast.overcapped_totm_stacks),
            details: format!("{} wasted stacks", cast.overcapped_totm_stacks),
        });
        checklist.push(ChecklistItem {
            label: "Wasted Chi-Ji stacks".to_string(),
            performance: wasted_perf(cast.overcapped_chiji_stacks),
            details: format!("{} wasted stacks", cast.overcapped_chiji_stacks),
        });

        GuideEntry::from_checklist(
            cast.timestamp,
            format!("@ {} Invoke Chi-Ji, the Red Crane", run.format_timestamp(cast.timestamp)),
            checklist,
        )
    }
}

fn wasted_perf(wasted: u32) -> QualitativePerformance {
    if wasted > 0 {
        QualitativePerformance::Fail
    } else {
        QualitativePerformance::Good
    }
}

const GUIDE_EXPLANATION: &str = "Before casting Invoke Chi-Ji, cast Essence Font to duplicate \
Gust of Mists heals and build 3 stacks of Teachings of the Monastery so one Blackout Kick \
covers the first Enveloping Mist. During Chi-Ji, avoid overcapping Teachings of the Monastery \
and Chi-Ji stacks, recast Essence Font when talented into Jade Bond, and cast Enveloping Mist \
on allies standing near others to maximize Enveloping Breath targets.";

impl Analyzer for InvokeChiJi {
    const NAME: &'static str = "invoke_chiji";
    const DEPENDENCIES: &'static [&'static str] = &[EssenceFont::NAME];

    fn create(setup: &mut Setup<'_, Self>) -> Result<Self, AnalyzerError> {
        let ef = setup.dependency::<EssenceFont>()?;
        let combatant = setup.combatant();
        let module = Self::new(ef, combatant.has_talent(JADE_BOND_TALENT));

        let talented = combatant.has_talent(INVOKE_CHI_JI_TALENT);
        setup.set_active(talented);
        if !talented {
            return Ok(module);
        }

        let by_player = |kind| EventFilter::of(kind).by(Actor::SelectedPlayer);
        setup.listen(by_player(EventKind::Heal).spell(GUST_OF_MISTS_CHIJI), Self::on_gust);
        setup.listen(
            by_player(EventKind::Heal).spell(ENVELOPING_BREATH_HEAL),
            Self::on_enveloping_breath,
        );
        setup.listen(
            by_player(EventKind::Cast).spell(ENVELOPING_MIST_TALENT),
            Self::on_envelop_cast,
        );
        setup.listen(by_player(EventKind::Cast).spell(INVOKE_CHI_JI_TALENT), Self::on_chiji_start);
        setup.listen(
            by_player(EventKind::Damage).spells([
                BLACKOUT_KICK,
                RISING_SUN_KICK_DAMAGE,
                BLACKOUT_KICK_TOTM,
                SPINNING_CRANE_KICK_DAMAGE,
            ]),
            Self::on_stack_generator,
        );
        // Chi-Ji grants one stack per Spinning Crane Kick cast, not per damage event
        setup.listen(
            by_player(EventKind::GlobalCooldown).spell(SPINNING_CRANE_KICK),
            Self::on_sck_global,
        );
        setup.listen(by_player(EventKind::GlobalCooldown), Self::on_global);
        setup.listen(by_player(EventKind::EndChannel).spell(ESSENCE_FONT_TALENT), Self::on_ef_end);
        setup.listen(by_player(EventKind::Cast).spell(RISING_SUN_KICK_TALENT), Self::on_rsk);
        setup.listen(by_player(EventKind::Cast).spell(SPINNING_CRANE_KICK), Self::on_rsk);
        setup.listen(by_player(EventKind::Cast).spell(BLACKOUT_KICK), Self::on_bok);
        setup.listen(by_player(EventKind::Cast).spell(ESSENCE_FONT_TALENT), Self::on_ef_cast);
        setup.listen(
            by_player(EventKind::RefreshBuff).spell(TEACHINGS_OF_THE_MONASTERY),
            Self::on_totm_refresh,
        );
        setup.listen(
            EventFilter::of(EventKind::Death).to(Actor::SelectedPlayerPet),
            Self::on_pet_death,
        );

        Ok(module)
    }

    fn finalize(&self, run: &RunContext<'_>) -> ModuleOutput {
        let total = self.total_healing();
        ModuleOutput {
            statistics: vec![
                StatisticRecord::new("Chi-Ji healing", total as f64)
                    .with_breakdown("Gust of Mists", self.gust_healing as f64)
                    .with_breakdown("Enveloping Breath", self.envelop_healing as f64),
                StatisticRecord::ratio("Share of healing", run.healing_share(total)),
                StatisticRecord::new("Free Enveloping Mist casts", self.free_casts as f64),
                StatisticRecord::new(
                    "Enveloping Mist casts below max stacks",
                    self.casts_below_max_stacks as f64,
                ),
                StatisticRecord::new("Wasted Chi-Ji stacks", self.wasted_stacks as f64),
                StatisticRecord::new("Missed GCDs", self.missed_globals),
                StatisticRecord::new("Average GCDs per Chi-Ji window", self.average_globals()),
            ],
            guide: Some(GuideRecord {
                explanation: GUIDE_EXPLANATION.to_string(),
                entries: self
                    .cast_trackers
                    .iter()
                    .map(|cast| self.guide_entry(cast, run))
                    .collect(),
            }),
        }
    }
}
