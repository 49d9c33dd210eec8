//! Pipeline module.
//!
//! Provides `NadePipeline`, the main entry point. It runs every stage for
//! one replay, strictly in data-dependency order:
//!
//! ```text
//! roster ─► per class: count + damage ─► combine ─► merge ─► Report
//! ```
//!
//! All weapon classes go through the same parameterized stages; adding a
//! class is a configuration change.

use crate::aggregate::Aggregator;
use crate::combine::{combine, WeaponStats};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::observer::{Diagnostic, PipelineObserver, TracingObserver};
use crate::report::{merge, Report};
use crate::roster::{resolve_roster, Roster};
use crate::source::{EventSource, ReplayHandle};
use std::sync::Arc;

/// Runs the efficacy pipeline over replays.
///
/// The pipeline holds no per-replay state, so one instance can be reused
/// (and shared across threads) for any number of replays.
///
/// # Examples
///
/// ```rust
/// use nadestat::*;
/// use nadestat::source::MemoryReplay;
///
/// let replay = MemoryReplay::new()
///     .with_players(["p1", "p2"])
///     .with_event("hegrenade_detonate", EventRecord::new().with("user_name", "p1"))
///     .with_event(
///         "player_hurt",
///         EventRecord::new()
///             .with("attacker_name", "p1")
///             .with("weapon", "hegrenade")
///             .with("dmg_health", 57),
///     );
///
/// let pipeline = NadePipeline::default();
/// let report = pipeline.analyze(&replay).unwrap();
///
/// assert_eq!(report.stat("p1", "he").unwrap().average, 57.0);
/// assert_eq!(report.stat("p2", "incendiary").unwrap().count, 0);
/// ```
#[derive(Clone)]
pub struct NadePipeline {
    config: PipelineConfig,
    observer: Arc<dyn PipelineObserver>,
}

impl NadePipeline {
    /// Create a pipeline logging diagnostics through `tracing`.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the configuration fails validation.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            observer: Arc::new(TracingObserver),
        })
    }

    /// Replace the diagnostics observer.
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Open `replay` from `source` and analyze it.
    ///
    /// # Errors
    ///
    /// `ReplayOpen` from the source, plus anything [`NadePipeline::analyze`] returns.
    pub fn analyze_replay(&self, source: &dyn EventSource, replay: &str) -> Result<Report> {
        let span = tracing::debug_span!("replay", replay);
        let _enter = span.enter();

        let handle = source.open_replay(replay)?;
        self.analyze(handle.as_ref())
    }

    /// Analyze an opened replay.
    ///
    /// # Errors
    ///
    /// Source failures and schema mismatches (`MissingColumn`,
    /// `InvalidColumn`) abort the replay. Empty tables do not.
    pub fn analyze(&self, handle: &dyn ReplayHandle) -> Result<Report> {
        let roster = resolve_roster(handle, &self.config)?;
        if roster.is_empty() {
            self.observer.observe(&Diagnostic::EmptyRoster);
        }

        let tables = self.weapon_stats(handle, &roster)?;
        let report = merge(&tables, self.observer.as_ref());

        if report.len() != roster.len() {
            self.observer.observe(&Diagnostic::RowCountMismatch {
                stage: "report".to_owned(),
                expected: roster.len(),
                actual: report.len(),
            });
        }

        tracing::debug!(players = report.len(), classes = tables.len(), "replay analyzed");
        Ok(report)
    }

    /// Combined stats for every configured weapon class, in configuration order.
    pub fn weapon_stats(
        &self,
        handle: &dyn ReplayHandle,
        roster: &Roster,
    ) -> Result<Vec<WeaponStats>> {
        let observer = self.observer.as_ref();
        let aggregator = Aggregator::new(handle, &self.config, observer);

        self.config
            .weapons
            .iter()
            .map(|class| -> Result<WeaponStats> {
                let counts = aggregator.count_for_weapon(&class.detonation_event, roster)?;
                let damage = aggregator.damage_for_weapon(&class.weapon_tag)?;
                Ok(combine(&class.label, &counts, &damage, observer))
            })
            .collect()
    }
}

impl Default for NadePipeline {
    fn default() -> Self {
        Self {
            config: PipelineConfig::default(),
            observer: Arc::new(TracingObserver),
        }
    }
}

impl std::fmt::Debug for NadePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NadePipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
