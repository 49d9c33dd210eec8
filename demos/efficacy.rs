//! Efficacy example: utility stats for a small batch of replays
//!
//! This example demonstrates:
//! - Building in-memory replays from event records
//! - Running a batch with one broken replay
//! - Reading per-player, per-class stats from the reports

use nadestat::source::{MemoryReplay, MemorySource};
use nadestat::*;

fn throw(thrower: &str) -> EventRecord {
    EventRecord::new().with("user_name", thrower)
}

fn hurt(attacker: &str, weapon: &str, dmg: i64) -> EventRecord {
    EventRecord::new()
        .with("attacker_name", attacker)
        .with("weapon", weapon)
        .with("dmg_health", dmg)
}

fn main() {
    let mut mirage = MemoryReplay::new().with_players(["ropz", "frozen", "broky"]);
    for thrower in ["ropz", "ropz", "frozen"] {
        mirage.push_event("hegrenade_detonate", throw(thrower));
    }
    mirage.push_event("inferno_startburn", throw("broky"));
    mirage.push_event("player_hurt", hurt("ropz", "hegrenade", 44));
    mirage.push_event("player_hurt", hurt("frozen", "hegrenade", 71));
    mirage.push_event("player_hurt", hurt("broky", "inferno", 23));

    let mut source = MemorySource::new();
    source.insert("mirage.dem", mirage);
    source.insert_corrupt("inferno.dem", "demo header is truncated");

    let runner = BatchRunner::new(NadePipeline::default());
    let results = runner.run(&source, &["mirage.dem", "inferno.dem"]);

    for entry in &results {
        println!("=== {} ===", entry.replay);
        match &entry.outcome {
            ReplayOutcome::Ok { report } => {
                for row in &report.players {
                    for (label, stat) in &row.utility {
                        println!(
                            "  {:<8} {:<11} throws={} damage={:.0} avg={:.1}",
                            row.player, label, stat.count, stat.damage, stat.average
                        );
                    }
                }
            }
            ReplayOutcome::Failed { error } => {
                println!("  failed ({}): {}", error.error.kind(), error.error);
            }
        }
    }
}
