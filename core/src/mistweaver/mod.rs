//! Mistweaver Monk rule set and analyzers

pub mod cast_link;
mod essence_font;
mod hot_attribution;
mod invoke_chiji;


pub use cast_link::{hardcast_attribution, link_rules};
pub use essence_font::EssenceFont;
pub use hot_attribution::{HotAttribution, HotCounts};
pub use invoke_chiji::{ChijiCastTracker, GOOD_EF_HOTS_ON_CAST, InvokeChiJi};

use crate::analyzer::ModuleRegistry;
use crate::error::HarnessError;

/// Registry with every Mistweaver analyzer
pub fn registry() -> Result<ModuleRegistry, HarnessError> {
    let mut registry = ModuleRegistry::new();
    registry
        .register::<HotAttribution>()?
        .register::<EssenceFont>()?
        .register::<InvokeChiJi>()?;
    Ok(registry)
}
