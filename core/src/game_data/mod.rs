//! Ability ids referenced by the Mistweaver rule set and analyzers.
//!
//! Talent ids double as the cast id of the talented ability.

// ─── Renewing Mist / Enveloping Mist ────────────────────────────────────────

/// Renewing Mist HoT (buff and periodic heal)
pub const RENEWING_MIST_HEAL: i64 = 119611;
pub const RENEWING_MIST_TALENT: i64 = 115151;
pub const ENVELOPING_MIST_TALENT: i64 = 124682;
/// Thunder Focus Tea empowered Enveloping Mist
pub const ENVELOPING_MIST_TFT: i64 = 274062;

// ─── Kicks ──────────────────────────────────────────────────────────────────

pub const RISING_SUN_KICK_TALENT: i64 = 107428;
pub const RISING_SUN_KICK_DAMAGE: i64 = 185099;
pub const BLACKOUT_KICK: i64 = 100784;
/// Extra Blackout Kick hits from Teachings of the Monastery
pub const BLACKOUT_KICK_TOTM: i64 = 228649;
pub const SPINNING_CRANE_KICK: i64 = 101546;
pub const SPINNING_CRANE_KICK_DAMAGE: i64 = 107270;

// ─── Chi-Ji ─────────────────────────────────────────────────────────────────

pub const INVOKE_CHI_JI_TALENT: i64 = 325197;
/// Stacking buff that discounts Enveloping Mist
pub const INVOKE_CHIJI_BUFF: i64 = 343820;
pub const GUST_OF_MISTS_CHIJI: i64 = 343819;
pub const ENVELOPING_BREATH_HEAL: i64 = 325209;
pub const MAX_CHIJI_STACKS: u32 = 3;

// ─── Misc ───────────────────────────────────────────────────────────────────

pub const TEACHINGS_OF_THE_MONASTERY: i64 = 202090;
pub const ESSENCE_FONT_TALENT: i64 = 191837;
/// Essence Font HoT
pub const ESSENCE_FONT_BUFF: i64 = 191840;
pub const FAELINE_STOMP_TALENT: i64 = 388193;
pub const JADE_BOND_TALENT: i64 = 388031;
