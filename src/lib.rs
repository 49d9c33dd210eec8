//! # nadestat - Deterministic Grenade Utility Efficacy Stats
//!
//! Computes per-player utility statistics (throws, damage dealt, average
//! damage per throw) from the event tables a replay parser produces:
//! - **Roster-complete**: every player gets a row for every tracked class,
//!   zero-filled when inactive
//! - **Deterministic**: the same event tables always give the same report
//! - **Configurable**: tracked weapon classes are data, not code
//! - **Failure-isolating**: batch runs never lose or corrupt a replay
//!
//! ## Core Concepts
//!
//! ### Pipeline
//!
//! ```text
//! [EventSource] → [Roster] → [Count + Damage per class] → [Combine] → [Merge] → [Report]
//! ```
//!
//! 1. **Sources** open replays and hand out event tables
//! 2. **Roster** fixes the set of players every table is indexed on
//! 3. **Aggregates** count throws and sum damage per weapon class
//! 4. **Combine** joins them and derives the per-throw average
//! 5. **Merge** joins all classes into one per-player [`Report`]
//!
//! Advisory conditions (empty tables, activity outside the roster) go to
//! an injectable [`observer::PipelineObserver`]; they never change values.
//!
//! ## Example
//!
//! ```rust
//! use nadestat::*;
//! use nadestat::source::MemoryReplay;
//!
//! let hurt = |attacker: &str, dmg: i64| {
//!     EventRecord::new()
//!         .with("attacker_name", attacker)
//!         .with("weapon", "hegrenade")
//!         .with("dmg_health", dmg)
//! };
//! let throw = || EventRecord::new().with("user_name", "p1");
//!
//! let replay = MemoryReplay::new()
//!     .with_players(["p1", "p2"])
//!     .with_event("hegrenade_detonate", throw())
//!     .with_event("hegrenade_detonate", throw())
//!     .with_event("hegrenade_detonate", throw())
//!     .with_event("player_hurt", hurt("p1", 40))
//!     .with_event("player_hurt", hurt("p1", 20));
//!
//! let report = NadePipeline::default().analyze(&replay).unwrap();
//!
//! let p1 = report.stat("p1", "he").unwrap();
//! assert_eq!((p1.count, p1.damage, p1.average), (3, 60.0, 20.0));
//!
//! // Zero activity still gets a row, with a 0.0 average.
//! assert_eq!(report.stat("p2", "he"), Some(&CombinedStat::default()));
//! ```
//!
//! ## Modules
//!
//! - [`player`] - Player name type (exact-match join key)
//! - [`event`] - Event records
//! - [`source`] - Event source traits and implementations
//! - [`config`] - Pipeline configuration
//! - [`roster`] - Roster resolution
//! - [`aggregate`] - Per-weapon counts and damage
//! - [`combine`] - Count/damage join and averages
//! - [`report`] - Multi-weapon merge
//! - [`pipeline`] - Per-replay orchestration
//! - [`batch`] - Multi-replay runs with failure isolation
//! - [`observer`] - Diagnostics
//! - [`error`] - Error types

pub mod aggregate;
pub mod batch;
pub mod combine;
pub mod config;
pub mod error;
pub mod event;
pub mod observer;
pub mod pipeline;
pub mod player;
pub mod report;
pub mod roster;
pub mod source;

// Re-export main types for convenience
pub use error::NadeError;
pub use event::EventRecord;
pub use pipeline::NadePipeline;
pub use player::PlayerName;
pub use report::{merge, PlayerReport, Report};

pub use aggregate::{count_events, sum_damage, Aggregator, CountAggregate, DamageAggregate};
pub use batch::{BatchEntry, BatchResults, BatchRunner, ReplayFailure, ReplayOutcome};
pub use combine::{average_per_use, combine, CombinedStat, StatRow, WeaponStats};
pub use config::{ColumnNames, PipelineConfig, WeaponClass};
pub use roster::{resolve_roster, Roster, RosterPolicy};
pub use source::{EventSource, ReplayHandle};
