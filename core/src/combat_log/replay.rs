use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::event::CombatEvent;
use crate::error::IngestError;

/// Fight boundaries in replay milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FightWindow {
    pub start: i64,
    pub end: i64,
}

impl FightWindow {
    pub fn duration_ms(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }
}

/// Loadout of the analyzed actor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatantInfo {
    /// Defaults to the selected player when absent
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub talents: Vec<i64>,
}

/// Replay document as handed over by the report fetcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Replay {
    pub fight: FightWindow,
    pub selected_player: i64,
    /// Actor ids owned by the selected player
    #[serde(default)]
    pub pets: Vec<i64>,
    #[serde(default)]
    pub combatant: CombatantInfo,
    pub events: Vec<CombatEvent>,
}

impl Replay {
    pub fn from_json(raw: &str) -> Result<Self, IngestError> {
        let replay: Replay = serde_json::from_str(raw)?;
        replay.validate()?;
        Ok(replay)
    }

    pub fn load(path: &Path) -> Result<Self, IngestError> {
        let raw = fs::read_to_string(path).map_err(|e| IngestError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&raw)
    }

    pub fn validate(&self) -> Result<(), IngestError> {
        if self.fight.end < self.fight.start {
            return Err(IngestError::InvalidFightWindow {
                start: self.fight.start,
                end: self.fight.end,
            });
        }
        Ok(())
    }

    pub fn combatant_id(&self) -> i64 {
        self.combatant.id.unwrap_or(self.selected_player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat_log::EventKind;

    #[test]
    fn parses_minimal_replay_with_defaults() {
        let raw = r#"
        {
            "fight": { "start": 0, "end": 60000 },
            "selectedPlayer": 1,
            "events": [
                { "type": "cast", "timestamp": 10, "sourceId": 1, "targetId": 2,
                  "abilityId": 115151 }
            ]
        }
        "#;
        let replay = Replay::from_json(raw).unwrap();
        assert_eq!(replay.selected_player, 1);
        assert!(replay.pets.is_empty());
        assert!(replay.combatant.talents.is_empty());
        assert_eq!(replay.combatant_id(), 1);
        assert_eq!(replay.events[0].kind, EventKind::Cast);
        assert_eq!(replay.fight.duration_ms(), 60_000);
    }

    #[test]
    fn rejects_inverted_fight_window() {
        let raw = r#"{ "fight": { "start": 500, "end": 100 }, "selectedPlayer": 1, "events": [] }"#;
        let err = Replay::from_json(raw).unwrap_err();
        assert!(matches!(err, IngestError::InvalidFightWindow { start: 500, end: 100 }));
    }

    #[test]
    fn extreme_fight_window_duration_saturates() {
        let fight = FightWindow {
            start: i64::MIN,
            end: 1_000,
        };
        assert_eq!(fight.duration_ms(), i64::MAX);
        assert_eq!(FightWindow { start: 0, end: 0 }.duration_ms(), 0);
    }

    #[test]
    fn rejects_unknown_event_kind() {
        let raw = r#"{
            "fight": { "start": 0, "end": 1 },
            "selectedPlayer": 1,
            "events": [ { "type": "teleport", "timestamp": 0, "sourceId": 1, "abilityId": 1 } ]
        }"#;
        assert!(matches!(Replay::from_json(raw), Err(IngestError::Parse(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Replay::load(Path::new("/nonexistent/replay.json")).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }
}
