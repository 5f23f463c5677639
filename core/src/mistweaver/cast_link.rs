//! Attributes Renewing Mist and Enveloping Mist applications to hardcasts.
//!
//! Talents can proc both HoTs without a cast, and procced copies behave
//! differently from cast ones, so every application is linked back to
//! whatever produced it.

use crate::attribution::AttributionRules;
use crate::combat_log::EventKind;
use crate::game_data::*;
use crate::normalizer::{EventMatcher, LinkRule};

pub const APPLIED_HEAL: &str = "AppliedHeal";
pub const BOUNCED: &str = "Bounced";
pub const FROM_DANCING_MISTS: &str = "FromDM";
pub const FROM_HARDCAST: &str = "FromHardcast";
pub const FROM_MISTY_PEAKS: &str = "FromMistyPeaks";
/// Linked to an Enveloping Mist or Rising Sun Kick cast
pub const FROM_RAPID_DIFFUSION: &str = "FromRD";

/// Renewing Mist jumps to a new target within this window of its removal
pub const BOUNCE_WINDOW_MS: u64 = 500;
/// Longest a Renewing Mist can sit on one target before it is removed
pub const REMOVAL_LOOKBACK_MS: u64 = 65_000;
pub const RAPID_DIFFUSION_WINDOW_MS: u64 = 500;
pub const MISTY_PEAKS_WINDOW_MS: u64 = 50;

/// Link rules in declaration order. `cast_buffer_ms` is the hardcast window.
pub fn link_rules(cast_buffer_ms: u64) -> Vec<LinkRule> {
    vec![
        // renewing mist apply -> its cast
        LinkRule::new(
            FROM_HARDCAST,
            EventMatcher::new([EventKind::ApplyBuff], [RENEWING_MIST_HEAL]),
            EventMatcher::new([EventKind::Cast], [RENEWING_MIST_TALENT]),
        )
        .reverse(APPLIED_HEAL)
        .window(cast_buffer_ms, cast_buffer_ms),
        // enveloping mist apply/refresh -> its cast
        LinkRule::new(
            FROM_HARDCAST,
            EventMatcher::new(
                [EventKind::ApplyBuff, EventKind::RefreshBuff],
                [ENVELOPING_MIST_TALENT, ENVELOPING_MIST_TFT],
            ),
            EventMatcher::new([EventKind::Cast], [ENVELOPING_MIST_TALENT]),
        )
        .reverse(APPLIED_HEAL)
        .window(cast_buffer_ms, cast_buffer_ms),
        // renewing mist apply -> removal on the target it jumped from
        LinkRule::new(
            BOUNCED,
            EventMatcher::new([EventKind::ApplyBuff], [RENEWING_MIST_HEAL]),
            EventMatcher::new([EventKind::RemoveBuff], [RENEWING_MIST_HEAL]),
        )
        .window(BOUNCE_WINDOW_MS, 0)
        .any_target()
        .when(|linking, referenced| linking.target_id != referenced.target_id),
        // renewing mist removal -> its application
        LinkRule::new(
            BOUNCED,
            EventMatcher::new([EventKind::RemoveBuff], [RENEWING_MIST_HEAL]),
            EventMatcher::new([EventKind::ApplyBuff], [RENEWING_MIST_HEAL]),
        )
        .window(REMOVAL_LOOKBACK_MS, 0),
        // renewing mist apply -> enveloping mist / rising sun kick cast
        LinkRule::new(
            FROM_RAPID_DIFFUSION,
            EventMatcher::new([EventKind::ApplyBuff], [RENEWING_MIST_HEAL]),
            EventMatcher::new(
                [EventKind::Cast],
                [RISING_SUN_KICK_TALENT, ENVELOPING_MIST_TALENT, ENVELOPING_MIST_TFT],
            ),
        )
        .window(RAPID_DIFFUSION_WINDOW_MS, RAPID_DIFFUSION_WINDOW_MS)
        .any_target(),
        // dancing mists: a second renewing mist on another target, same timestamp
        LinkRule::new(
            FROM_DANCING_MISTS,
            EventMatcher::new([EventKind::ApplyBuff], [RENEWING_MIST_HEAL]),
            EventMatcher::new([EventKind::ApplyBuff], [RENEWING_MIST_HEAL]),
        )
        .any_target()
        .when(|linking, referenced| linking.target_id != referenced.target_id),
        // misty peaks: enveloping mist procced by a renewing mist tick
        LinkRule::new(
            FROM_MISTY_PEAKS,
            EventMatcher::new([EventKind::ApplyBuff], [ENVELOPING_MIST_TALENT]),
            EventMatcher::new([EventKind::Heal], [RENEWING_MIST_HEAL]),
        )
        .window(MISTY_PEAKS_WINDOW_MS, MISTY_PEAKS_WINDOW_MS)
        .any_target(),
    ]
}

/// Precedence for "was this application a hardcast?"
pub fn hardcast_attribution() -> AttributionRules {
    AttributionRules::new(FROM_HARDCAST)
        .indirect([FROM_RAPID_DIFFUSION, FROM_MISTY_PEAKS])
        .duplicate(FROM_DANCING_MISTS)
        .transfer(BOUNCED)
}
