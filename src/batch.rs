//! Batch processing.
//!
//! Runs the pipeline over many replays. Each replay is independent: a
//! replay that fails to open or aborts on a schema mismatch becomes a
//! tagged failure entry, and every other replay still gets its report.
//! Results always come back in input order.

use crate::error::NadeError;
use crate::pipeline::NadePipeline;
use crate::report::Report;
use crate::source::EventSource;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

#[cfg(feature = "parallel")]
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

/// Why one replay produced no report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayFailure {
    pub error: NadeError,
}

impl Serialize for ReplayFailure {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("ReplayFailure", 2)?;
        state.serialize_field("kind", self.error.kind())?;
        state.serialize_field("message", &self.error.to_string())?;
        state.end()
    }
}

/// Result of running the pipeline on one replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReplayOutcome {
    Ok { report: Report },
    Failed { error: ReplayFailure },
}

impl ReplayOutcome {
    /// Whether a report was produced.
    pub fn is_ok(&self) -> bool {
        matches!(self, ReplayOutcome::Ok { .. })
    }

    /// The report, if any.
    pub fn report(&self) -> Option<&Report> {
        match self {
            ReplayOutcome::Ok { report } => Some(report),
            ReplayOutcome::Failed { .. } => None,
        }
    }

    /// The failure, if any.
    pub fn failure(&self) -> Option<&ReplayFailure> {
        match self {
            ReplayOutcome::Ok { .. } => None,
            ReplayOutcome::Failed { error } => Some(error),
        }
    }
}

impl From<crate::error::Result<Report>> for ReplayOutcome {
    fn from(result: crate::error::Result<Report>) -> Self {
        match result {
            Ok(report) => ReplayOutcome::Ok { report },
            Err(error) => ReplayOutcome::Failed {
                error: ReplayFailure { error },
            },
        }
    }
}

/// One replay identifier and its outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub replay: String,
    #[serde(flatten)]
    pub outcome: ReplayOutcome,
}

/// Outcomes of a batch, one entry per input identifier, in input order.
///
/// # Examples
///
/// ```rust
/// use nadestat::{BatchRunner, NadePipeline};
/// use nadestat::source::{MemoryReplay, MemorySource};
///
/// let mut source = MemorySource::new();
/// source.insert("a", MemoryReplay::new().with_players(["p1"]));
/// source.insert_corrupt("b", "truncated");
///
/// let results = BatchRunner::new(NadePipeline::default()).run(&source, &["a", "b"]);
///
/// assert_eq!(results.len(), 2);
/// assert!(results.get("a").unwrap().is_ok());
/// assert_eq!(results.get("b").unwrap().failure().unwrap().error.kind(), "replay_open");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BatchResults {
    entries: Vec<BatchEntry>,
}

impl BatchResults {
    /// Number of entries (equals the number of input identifiers).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the batch was empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Outcome for an identifier (the first, if it was given twice).
    pub fn get(&self, replay: &str) -> Option<&ReplayOutcome> {
        self.entries
            .iter()
            .find(|entry| entry.replay == replay)
            .map(|entry| &entry.outcome)
    }

    /// All entries in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, BatchEntry> {
        self.entries.iter()
    }

    /// Successful replays and their reports.
    pub fn reports(&self) -> impl Iterator<Item = (&str, &Report)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.outcome.report().map(|r| (entry.replay.as_str(), r)))
    }

    /// Failed replays and their failures.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &ReplayFailure)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.outcome.failure().map(|f| (entry.replay.as_str(), f)))
    }

    /// Number of failed replays.
    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }
}

impl<'a> IntoIterator for &'a BatchResults {
    type Item = &'a BatchEntry;
    type IntoIter = std::slice::Iter<'a, BatchEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Applies a pipeline to a list of replays with per-replay failure isolation.
#[derive(Debug, Clone, Default)]
pub struct BatchRunner {
    pipeline: NadePipeline,
}

impl BatchRunner {
    /// Create a runner around a configured pipeline.
    pub fn new(pipeline: NadePipeline) -> Self {
        Self { pipeline }
    }

    /// Process replays one after another, in order.
    pub fn run<S>(&self, source: &dyn EventSource, replays: &[S]) -> BatchResults
    where
        S: AsRef<str>,
    {
        let entries = replays
            .iter()
            .map(|replay| self.run_one(source, replay.as_ref()))
            .collect();
        self.finish(entries)
    }

    /// Process replays on the rayon thread pool.
    ///
    /// Output order matches input order regardless of completion order.
    #[cfg(feature = "parallel")]
    pub fn run_parallel<S>(&self, source: &dyn EventSource, replays: &[S]) -> BatchResults
    where
        S: AsRef<str> + Sync,
    {
        let entries = replays
            .par_iter()
            .map(|replay| self.run_one(source, replay.as_ref()))
            .collect();
        self.finish(entries)
    }

    fn run_one(&self, source: &dyn EventSource, replay: &str) -> BatchEntry {
        let outcome = ReplayOutcome::from(self.pipeline.analyze_replay(source, replay));
        if let Some(failure) = outcome.failure() {
            tracing::error!(
                replay,
                kind = failure.error.kind(),
                "Error processing replay: {}",
                failure.error
            );
        }
        BatchEntry {
            replay: replay.to_owned(),
            outcome,
        }
    }

    fn finish(&self, entries: Vec<BatchEntry>) -> BatchResults {
        let results = BatchResults { entries };
        tracing::info!(
            replays = results.len(),
            failed = results.failed_count(),
            "batch finished"
        );
        results
    }
}
