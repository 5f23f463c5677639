use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use linkcast_types::AnalysisReport;
use serde_json::Value;
use tempfile::TempDir;

const REPLAY: &str = r#"{
    "fight": { "start": 0, "end": 60000 },
    "selectedPlayer": 1,
    "combatant": { "talents": [] },
    "events": [
        { "type": "cast", "timestamp": 980, "sourceId": 1, "targetId": 2, "abilityId": 115151 },
        { "type": "applybuff", "timestamp": 1000, "sourceId": 1, "targetId": 2,
          "abilityId": 119611 },
        { "type": "applybuff", "timestamp": 9000, "sourceId": 1, "targetId": 3,
          "abilityId": 119611 },
        { "type": "heal", "timestamp": 9500, "sourceId": 1, "abilityId": 119611, "amount": 10 }
    ]
}"#;

struct Fixture {
    _dir: TempDir,
    replay: PathBuf,
    config: PathBuf,
}

fn fixture(config: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let replay = dir.path().join("replay.json");
    let config_path = dir.path().join("config.toml");
    fs::write(&replay, REPLAY).unwrap();
    fs::write(&config_path, config).unwrap();
    Fixture {
        _dir: dir,
        replay,
        config: config_path,
    }
}

fn linkcast(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_linkcast"))
        .args(args)
        .arg("--config")
        .arg(config)
        .env("RUST_LOG", "off")
        .env_remove("LINKCAST_LOG_PATH")
        .output()
        .unwrap()
}

#[test]
fn analyze_json_reports_attribution_and_diagnostics() {
    let f = fixture("");
    let out = linkcast(&f.config, &["analyze", "--replay", f.replay.to_str().unwrap(), "--json"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let report: AnalysisReport = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report.event_count, 4);
    assert_eq!(report.dormant, vec!["essence_font".to_string(), "invoke_chiji".to_string()]);

    let rem = report
        .module("hot_attribution")
        .and_then(|m| m.statistic("Renewing Mist applications"))
        .unwrap();
    assert_eq!(rem.breakdown[0].value, 1.0);
    assert_eq!(rem.breakdown[1].value, 1.0);

    // the heal without a target
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].event_index, Some(3));
}

#[test]
fn analyze_text_output() {
    let f = fixture("");
    let out = linkcast(&f.config, &["analyze", "--replay", f.replay.to_str().unwrap()]);
    assert!(out.status.success());

    let text = String::from_utf8(out.stdout).unwrap();
    assert!(text.starts_with("Fight 1:00 (4 events, 2 relations)"));
    assert!(text.contains("== hot_attribution =="));
    assert!(text.contains("  Hardcast share: 50.0%"));
    assert!(text.contains("Dormant: essence_font, invoke_chiji"));
    assert!(text.contains("malformed event #3"));
}

#[test]
fn analyze_text_output_european() {
    let f = fixture("");
    let replay = f.replay.to_str().unwrap();
    let out = linkcast(&f.config, &["analyze", "--replay", replay, "--european"]);
    assert!(out.status.success());

    let text = String::from_utf8(out.stdout).unwrap();
    assert!(text.contains("  Hardcast share: 50,0%"));
}

#[test]
fn links_dumps_one_event() {
    let f = fixture("");
    let replay = f.replay.to_str().unwrap();
    let out = linkcast(&f.config, &["links", "--replay", replay, "--event", "1"]);
    assert!(out.status.success());

    let value: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["index"], 1);
    assert_eq!(value["relations"]["FromHardcast"], serde_json::json!([0]));
}

#[test]
fn links_respects_configured_cast_buffer() {
    let f = fixture("[normalizer]\ncast_buffer_ms = 10\n");
    let out = linkcast(&f.config, &["links", "--replay", f.replay.to_str().unwrap()]);
    assert!(out.status.success());

    let value: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["relations"], 0);
    assert_eq!(value["edges"], serde_json::json!([]));
}

#[test]
fn links_rejects_out_of_range_event() {
    let f = fixture("");
    let replay = f.replay.to_str().unwrap();
    let out = linkcast(&f.config, &["links", "--replay", replay, "--event", "99"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("no event at index 99"));
}

#[test]
fn rules_lists_link_rules_and_disabled_modules() {
    let f = fixture("[analysis]\ndisabled_modules = [\"invoke_chiji\"]\n");
    let out = linkcast(&f.config, &["rules"]);
    assert!(out.status.success());

    let text = String::from_utf8(out.stdout).unwrap();
    assert!(text.contains("1. applybuff[119611] -> cast[115151] as FromHardcast"));
    assert!(text.contains("7. applybuff[124682] -> heal[119611] as FromMistyPeaks"));
    assert!(text.contains("invoke_chiji (disabled)"));
}

#[test]
fn missing_replay_fails() {
    let f = fixture("");
    let out = linkcast(&f.config, &["analyze", "--replay", "/nonexistent/replay.json"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("failed to read replay"));
}

#[test]
fn bad_config_fails() {
    let f = fixture("[normalizer]\ncast_buffer_ms = \"soon\"\n");
    let out = linkcast(&f.config, &["rules"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Parse error"));
}
