use std::path::Path;

use linkcast_core::combat_log::EventId;
use linkcast_core::config::{self, AnalysisConfig};
use linkcast_core::{AnalysisSession, Replay};
use serde_json::json;

use crate::render;

/// Explicit path must exist; the user config file is optional.
pub fn load_config(path: Option<&Path>) -> Result<AnalysisConfig, String> {
    match path {
        Some(path) => config::load_file(path).map_err(|e| e.to_string()),
        None => match config::default_config_path() {
            Some(path) => AnalysisConfig::load_or_default(&path).map_err(|e| e.to_string()),
            None => Ok(AnalysisConfig::default()),
        },
    }
}

fn session(config: AnalysisConfig) -> Result<AnalysisSession, String> {
    AnalysisSession::mistweaver(config).map_err(|e| e.to_string())
}

pub fn analyze(
    replay: &Path,
    config: AnalysisConfig,
    json: bool,
    european: bool,
) -> Result<String, String> {
    let replay = Replay::load(replay).map_err(|e| e.to_string())?;
    let report = session(config)?.run(replay).map_err(|e| e.to_string())?;

    if json {
        serde_json::to_string_pretty(&report).map_err(|e| e.to_string())
    } else {
        Ok(render::report(&report, european))
    }
}

pub fn links(
    replay: &Path,
    config: AnalysisConfig,
    event: Option<usize>,
) -> Result<String, String> {
    let replay = Replay::load(replay).map_err(|e| e.to_string())?;
    let prepared = session(config)?.prepare(replay).map_err(|e| e.to_string())?;
    let stream = &prepared.stream;

    let value = match event {
        Some(index) => {
            let event = stream
                .get(EventId(index))
                .ok_or_else(|| format!("no event at index {index} (stream has {})", stream.len()))?;
            json!({
                "index": index,
                "malformed": stream.is_malformed(EventId(index)),
                "event": event,
                "relations": event.relations(),
            })
        }
        None => json!({
            "events": stream.len(),
            "relations": stream.relation_count(),
            "linksPerRule": prepared.summary.links_per_rule,
            "edges": stream.relation_graph(),
        }),
    };
    serde_json::to_string_pretty(&value).map_err(|e| e.to_string())
}

pub fn rules(config: AnalysisConfig) -> Result<String, String> {
    let session = session(config)?;
    let order = session.registry().construction_order().map_err(|e| e.to_string())?;
    let disabled: Vec<bool> = order.iter().map(|m| session.config().is_disabled(m)).collect();
    Ok(render::rules(session.rules(), &order, &disabled))
}
