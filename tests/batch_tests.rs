//! End-to-end runs over replay exports on disk.
//!
//! These tests verify:
//! - JSON exports flow through the whole pipeline
//! - Unreadable and malformed exports become tagged failures
//! - Result order and JSON shape are stable

use nadestat::source::JsonSource;
use nadestat::*;
use serde_json::{json, Value};
use std::path::Path;

fn write_export(dir: &Path, name: &str, body: &Value) {
    std::fs::write(dir.join(name), serde_json::to_string(body).unwrap()).unwrap();
}

fn inferno_export() -> Value {
    json!({
        "players": ["niko", "m0NESY", "niko"],
        "events": {
            "hegrenade_detonate": [
                { "user_name": "m0NESY", "tick": 1200 }
            ],
            "inferno_startburn": [
                { "user_name": "niko", "tick": 800 },
                { "user_name": "niko", "tick": 2400 }
            ],
            "player_hurt": [
                { "attacker_name": "niko", "weapon": "inferno", "dmg_health": 9 },
                { "attacker_name": "niko", "weapon": "inferno", "dmg_health": 14 },
                { "attacker_name": "m0NESY", "weapon": "awp", "dmg_health": 112 },
                { "attacker_name": null, "weapon": "world", "dmg_health": 3 }
            ]
        }
    })
}

#[test]
fn test_json_exports_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_export(dir.path(), "inferno.json", &inferno_export());

    let source = JsonSource::with_root(dir.path());
    let results = BatchRunner::default().run(&source, &["inferno.json"]);

    let report = results.get("inferno.json").unwrap().report().unwrap();
    assert_eq!(report.len(), 2);

    let niko = report.stat("niko", "incendiary").unwrap();
    assert_eq!((niko.count, niko.damage, niko.average), (2, 23.0, 11.5));

    let monesy = report.stat("m0NESY", "he").unwrap();
    assert_eq!((monesy.count, monesy.damage, monesy.average), (1, 0.0, 0.0));
}

#[test]
fn test_bad_exports_are_tagged_failures() {
    let dir = tempfile::tempdir().unwrap();
    write_export(dir.path(), "good.json", &inferno_export());
    std::fs::write(dir.path().join("truncated.json"), r#"{"players": ["niko"], "eve"#).unwrap();
    write_export(
        dir.path(),
        "schema.json",
        &json!({
            "players": ["niko"],
            "events": { "player_hurt": [ { "attacker_name": "niko", "dmg_health": 4 } ] }
        }),
    );

    let source = JsonSource::with_root(dir.path());
    let ids = ["good.json", "missing.json", "truncated.json", "schema.json"];
    let results = BatchRunner::default().run(&source, &ids);

    assert_eq!(results.len(), 4);
    let kinds: Vec<_> = results
        .iter()
        .map(|entry| entry.outcome.failure().map(|f| f.error.kind()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            None,
            Some("replay_open"),
            Some("replay_open"),
            Some("missing_column")
        ]
    );
}

#[test]
fn test_results_json_shape() {
    let dir = tempfile::tempdir().unwrap();
    write_export(dir.path(), "a.json", &inferno_export());

    let source = JsonSource::with_root(dir.path());
    let results = BatchRunner::default().run(&source, &["a.json", "b.json"]);
    let json = serde_json::to_value(&results).unwrap();

    assert_eq!(json[0]["replay"], "a.json");
    assert_eq!(json[0]["status"], "ok");
    assert_eq!(json[0]["report"]["weapons"], json!(["he", "incendiary"]));
    assert_eq!(json[0]["report"]["players"][0]["player"], "niko");
    assert_eq!(
        json[0]["report"]["players"][0]["utility"]["incendiary"],
        json!({ "count": 2, "damage": 23.0, "average": 11.5 })
    );
    assert_eq!(json[1]["status"], "failed");
    assert_eq!(json[1]["error"]["kind"], "replay_open");
    assert!(json[1]["error"]["message"]
        .as_str()
        .unwrap()
        .contains("b.json"));
}

#[test]
fn test_config_file_drives_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    write_export(dir.path(), "a.json", &inferno_export());
    let config_path = dir.path().join("nadestat.json");
    std::fs::write(
        &config_path,
        r#"{
            "roster": "damage_attackers",
            "weapons": [
                { "label": "molotov", "detonation_event": "inferno_startburn", "weapon_tag": "inferno" }
            ]
        }"#,
    )
    .unwrap();

    let config = PipelineConfig::from_path(&config_path).unwrap();
    let runner = BatchRunner::new(NadePipeline::new(config).unwrap());
    let results = runner.run(&JsonSource::with_root(dir.path()), &["a.json"]);

    let report = results.get("a.json").unwrap().report().unwrap();
    assert_eq!(report.weapons, vec!["molotov"]);
    // Roster from attackers: the null (world) attacker is not a player.
    let names: Vec<_> = report.players.iter().map(|p| p.player.as_str()).collect();
    assert_eq!(names, vec!["niko", "m0NESY"]);
    assert_eq!(report.stat("niko", "molotov").unwrap().average, 11.5);
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_batch_keeps_input_order() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..8 {
        write_export(dir.path(), &format!("m{}.json", i), &inferno_export());
    }
    let ids: Vec<String> = (0..10).map(|i| format!("m{}.json", i)).collect();

    let source = JsonSource::with_root(dir.path());
    let runner = BatchRunner::default();
    let parallel = runner.run_parallel(&source, ids.as_slice());

    let order: Vec<_> = parallel.iter().map(|e| e.replay.clone()).collect();
    assert_eq!(order, ids);
    assert_eq!(parallel.failed_count(), 2);
    assert_eq!(parallel, runner.run(&source, ids.as_slice()));
}
